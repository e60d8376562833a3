// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Prompt text for the two generation tasks.

pub const TUTOR_SYSTEM_PROMPT: &str = "You are a helpful tutor.";

/// Grade assumed when the client does not send one.
pub const DEFAULT_GRADE: &str = "12";

/// Asks for a Mermaid-only flowchart of the lesson's subtopics and their dependencies.
pub fn flowchart_prompt(lesson_name: &str, grade: &str) -> String {
    format!(
        "Generate only Mermaid.js code (no explanation, no text, no markdown formatting).\n\
         The code should describe a flowchart for the lesson \"{lesson_name}\" for a grade {grade} student\n\
         with all the important subtopics and their dependencies, use upto 3500 tokens only.\n\
         Declare every node as ID[Label].\n\
         Output only the Mermaid code, starting directly with 'graph TD'.",
        grade = grade_or_default(grade),
    )
}

/// Asks for descriptive quick revision notes for one subtopic of a lesson.
pub fn revision_notes_prompt(lesson_name: &str, subtopic_name: &str, grade: &str) -> String {
    format!(
        "Generate the quick revision notes for the lesson \"{lesson_name}\"\n\
         and subtopic \"{subtopic_name}\" for a grade {grade} student\n\
         which contains all the important points and concepts in a descriptive manner.",
        grade = grade_or_default(grade),
    )
}

fn grade_or_default(grade: &str) -> &str {
    let grade = grade.trim();
    if grade.is_empty() {
        DEFAULT_GRADE
    } else {
        grade
    }
}
