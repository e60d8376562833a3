// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Persisted documents: users, lessons, their subtopics and generated notes.
//!
//! Field names follow what the web client reads (`mermaidDiagram`, `model_used`, `timestamp`
//! in Unix milliseconds).

use serde::{Deserialize, Serialize};

use super::ids::{
    ContentId, ContentIdTag, LessonId, LessonIdTag, SubtopicId, SubtopicIdTag, UserId, UserIdTag,
};
use super::record::Record;
use crate::format::mermaid::MermaidNode;
use crate::store::Collection;

/// Milliseconds since the Unix epoch.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub email: String,
    pub name: String,
    pub timestamp: i64,
}

impl Record for User {
    type IdTag = UserIdTag;
    const COLLECTION: Collection = Collection::Users;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lesson {
    pub user_id: UserId,
    pub title: String,
    #[serde(rename = "mermaidDiagram")]
    pub mermaid_diagram: String,
    pub model_used: String,
    pub grade: String,
    #[serde(default)]
    pub subtopics: Vec<SubtopicId>,
    #[serde(default)]
    pub nodes: Vec<MermaidNode>,
    pub timestamp: i64,
}

impl Record for Lesson {
    type IdTag = LessonIdTag;
    const COLLECTION: Collection = Collection::Lessons;
}

/// One node label of a lesson's flowchart; notes are attached once generated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subtopic {
    pub lesson_id: LessonId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_id: Option<ContentId>,
}

impl Record for Subtopic {
    type IdTag = SubtopicIdTag;
    const COLLECTION: Collection = Collection::Subtopics;
}

/// Generated revision notes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    pub title: String,
    pub text: String,
    #[serde(default)]
    pub metadata: serde_json::Value,
}

impl Record for Content {
    type IdTag = ContentIdTag;
    const COLLECTION: Collection = Collection::Contents;
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{Lesson, Subtopic};
    use crate::format::mermaid::MermaidNode;
    use crate::model::ids::{DocumentId, LessonId, UserId};
    use crate::model::record::{Record, Stored};

    fn lesson() -> Lesson {
        Lesson {
            user_id: UserId::new("u1").unwrap(),
            title: "Cells".to_owned(),
            mermaid_diagram: "graph TD\nA[Cell]".to_owned(),
            model_used: "gpt-4o-mini".to_owned(),
            grade: "9".to_owned(),
            subtopics: Vec::new(),
            nodes: vec![MermaidNode::new("A", "Cell")],
            timestamp: 1_700_000_000_000,
        }
    }

    #[test]
    fn lesson_uses_client_field_names() {
        let document = lesson().to_document().unwrap();
        assert_eq!(document["mermaidDiagram"], json!("graph TD\nA[Cell]"));
        assert_eq!(document["model_used"], json!("gpt-4o-mini"));
        assert_eq!(document["nodes"], json!([{ "id": "A", "label": "Cell" }]));
        assert!(!document.contains_key("_id"));
    }

    #[test]
    fn stored_round_trips_through_a_document() {
        let mut document = lesson().to_document().unwrap();
        document.insert("_id".to_owned(), json!("abc123"));

        let stored = Stored::<Lesson>::from_document(document).unwrap();
        assert_eq!(stored.id, LessonId::new("abc123").unwrap());
        assert_eq!(stored.value, lesson());

        let serialized = serde_json::to_value(&stored).unwrap();
        assert_eq!(serialized["_id"], json!("abc123"));
        assert_eq!(serialized["title"], json!("Cells"));
    }

    #[test]
    fn document_without_id_is_rejected() {
        let document = lesson().to_document().unwrap();
        assert!(Stored::<Lesson>::from_document(document).is_err());
    }

    #[test]
    fn subtopic_omits_missing_content() {
        let subtopic = Subtopic {
            lesson_id: LessonId::new("l1").unwrap(),
            name: "Mitosis".to_owned(),
            content_id: None,
        };
        let document = subtopic.to_document().unwrap();
        assert!(!document.contains_key("content_id"));

        let stored = Stored::new(DocumentId::new("s1").unwrap(), subtopic);
        assert_eq!(stored.id.as_str(), "s1");
    }
}
