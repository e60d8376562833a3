// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use serde_json::{json, Map};

use super::{find_records, insert_record, load_record, OpsError};
use crate::format::mermaid::{distinct_labels, extract_nodes, strip_code_fences};
use crate::model::{now_millis, Content, Lesson, LessonId, Record, Stored, Subtopic, UserId};
use crate::provider::prompt::{flowchart_prompt, revision_notes_prompt};
use crate::provider::{resolve_model, CompletionRequest, FragmentStream, Provider};
use crate::store::{DocumentStore, Filter};

/// Minimum similarity for a fuzzy title match when the query is not a substring.
const TITLE_MATCH_THRESHOLD: f64 = 0.7;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LessonRequest {
    pub user_id: UserId,
    pub lesson_name: String,
    pub model: String,
    pub grade: String,
}

impl LessonRequest {
    fn validate(&self) -> Result<&str, OpsError> {
        let name = self.lesson_name.trim();
        if name.is_empty() {
            return Err(OpsError::Invalid("lesson_name must not be empty".to_owned()));
        }
        Ok(name)
    }

    fn completion_request(&self, default_model: &str) -> Result<CompletionRequest, OpsError> {
        let name = self.validate()?;
        Ok(CompletionRequest::tutor(
            resolve_model(&self.model, default_model),
            flowchart_prompt(name, &self.grade),
        ))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtopicRequest {
    pub lesson_name: String,
    pub subtopic_name: String,
    pub model: String,
    pub grade: String,
    pub lesson_id: Option<LessonId>,
}

/// Starts a streaming flowchart generation for the lesson.
pub async fn stream_lesson(
    provider: &dyn Provider,
    request: &LessonRequest,
    default_model: &str,
) -> Result<FragmentStream, OpsError> {
    let completion = request.completion_request(default_model)?;
    tracing::debug!(model = %completion.model, "streaming lesson flowchart");
    Ok(provider.stream(completion).await?)
}

/// Generates the flowchart in one call, then persists it like [`save_lesson`].
pub async fn generate_lesson(
    store: &dyn DocumentStore,
    provider: &dyn Provider,
    request: &LessonRequest,
    default_model: &str,
) -> Result<Stored<Lesson>, OpsError> {
    let completion = provider
        .complete(request.completion_request(default_model)?)
        .await?;
    let mermaid = strip_code_fences(&completion.content);
    save_lesson(store, request, &completion.model_used, &mermaid).await
}

/// Persists a lesson with its diagram, extracted nodes and one subtopic per distinct label.
pub async fn save_lesson(
    store: &dyn DocumentStore,
    request: &LessonRequest,
    model_used: &str,
    mermaid_code: &str,
) -> Result<Stored<Lesson>, OpsError> {
    let title = request.validate()?;
    let nodes = extract_nodes(mermaid_code);
    let labels = distinct_labels(&nodes);

    let lesson = Lesson {
        user_id: request.user_id.clone(),
        title: title.to_owned(),
        mermaid_diagram: mermaid_code.to_owned(),
        model_used: model_used.to_owned(),
        grade: request.grade.trim().to_owned(),
        subtopics: Vec::new(),
        nodes,
        timestamp: now_millis(),
    };
    let mut stored = insert_record(store, lesson).await?;
    let lesson_id: LessonId = stored.id.clone();

    let mut subtopic_ids = Vec::with_capacity(labels.len());
    for name in labels {
        let subtopic = Subtopic {
            lesson_id: lesson_id.clone(),
            name,
            content_id: None,
        };
        subtopic_ids.push(insert_record(store, subtopic).await?.id);
    }

    if !subtopic_ids.is_empty() {
        let mut changes = Map::new();
        changes.insert("subtopics".to_owned(), json!(subtopic_ids));
        store
            .update(Lesson::COLLECTION, &lesson_id.clone().retag(), changes)
            .await?;
        stored.value.subtopics = subtopic_ids;
    }

    tracing::info!(
        lesson_id = %lesson_id,
        nodes = stored.value.nodes.len(),
        subtopics = stored.value.subtopics.len(),
        "saved lesson"
    );
    Ok(stored)
}

/// Generates revision notes for a subtopic.
///
/// When `lesson_id` names one of the user's lessons and the matching subtopic already has notes,
/// those are returned without calling the provider. Newly generated notes are linked to the
/// subtopic.
pub async fn generate_subtopic(
    store: &dyn DocumentStore,
    provider: &dyn Provider,
    user_id: &UserId,
    request: &SubtopicRequest,
    default_model: &str,
) -> Result<Stored<Content>, OpsError> {
    let lesson_name = request.lesson_name.trim();
    let subtopic_name = request.subtopic_name.trim();
    if lesson_name.is_empty() || subtopic_name.is_empty() {
        return Err(OpsError::Invalid(
            "lesson_name and subtopic_name must not be empty".to_owned(),
        ));
    }

    let subtopic = match &request.lesson_id {
        Some(lesson_id) => {
            get_lesson(store, user_id, lesson_id).await?;
            let filter = Filter::new()
                .eq("lesson_id", lesson_id.as_str())
                .eq("name", subtopic_name);
            find_records::<Subtopic>(store, &filter).await?.into_iter().next()
        }
        None => None,
    };

    if let Some(content_id) = subtopic.as_ref().and_then(|s| s.value.content_id.as_ref()) {
        if let Some(content) = load_record::<Content>(store, content_id).await? {
            tracing::debug!(content_id = %content_id, "reusing cached revision notes");
            return Ok(content);
        }
    }

    let completion = provider
        .complete(CompletionRequest::tutor(
            resolve_model(&request.model, default_model),
            revision_notes_prompt(lesson_name, subtopic_name, &request.grade),
        ))
        .await?;

    let content = Content {
        title: subtopic_name.to_owned(),
        text: completion.content,
        metadata: json!({
            "lesson_name": lesson_name,
            "lesson_id": request.lesson_id.as_ref().map(|id| id.as_str()),
            "model_used": completion.model_used,
            "grade": request.grade.trim(),
            "timestamp": now_millis(),
        }),
    };
    let stored = insert_record(store, content).await?;

    if let Some(subtopic) = subtopic {
        let mut changes = Map::new();
        changes.insert("content_id".to_owned(), json!(stored.id.as_str()));
        store
            .update(Subtopic::COLLECTION, &subtopic.id.retag(), changes)
            .await?;
    }

    Ok(stored)
}

/// The user's lessons in creation order, optionally narrowed by a fuzzy title query.
pub async fn list_lessons(
    store: &dyn DocumentStore,
    user_id: &UserId,
    query: Option<&str>,
) -> Result<Vec<Stored<Lesson>>, OpsError> {
    let filter = Filter::new().eq("user_id", user_id.as_str());
    let mut lessons = find_records::<Lesson>(store, &filter).await?;
    if let Some(query) = query.map(str::trim).filter(|q| !q.is_empty()) {
        lessons.retain(|lesson| title_matches(query, &lesson.value.title));
    }
    Ok(lessons)
}

pub fn title_matches(query: &str, title: &str) -> bool {
    let query = query.trim().to_lowercase();
    let title = title.to_lowercase();
    if query.is_empty() || title.contains(&query) {
        return true;
    }
    rapidfuzz::fuzz::ratio(query.chars(), title.chars()) >= TITLE_MATCH_THRESHOLD
}

/// One of the user's lessons. Lessons owned by someone else are reported as missing.
pub async fn get_lesson(
    store: &dyn DocumentStore,
    user_id: &UserId,
    lesson_id: &LessonId,
) -> Result<Stored<Lesson>, OpsError> {
    match load_record::<Lesson>(store, lesson_id).await? {
        Some(lesson) if lesson.value.user_id == *user_id => Ok(lesson),
        _ => Err(OpsError::not_found("lesson", lesson_id)),
    }
}

/// Deletes the lesson together with its subtopics and their notes.
pub async fn delete_lesson(
    store: &dyn DocumentStore,
    user_id: &UserId,
    lesson_id: &LessonId,
) -> Result<(), OpsError> {
    let lesson = get_lesson(store, user_id, lesson_id).await?;
    remove_lesson(store, lesson).await
}

/// Deletes every lesson the user owns; returns how many were removed.
pub async fn clear_history(store: &dyn DocumentStore, user_id: &UserId) -> Result<usize, OpsError> {
    let lessons = list_lessons(store, user_id, None).await?;
    let count = lessons.len();
    for lesson in lessons {
        remove_lesson(store, lesson).await?;
    }
    tracing::info!(user_id = %user_id, lessons = count, "cleared lesson history");
    Ok(count)
}

async fn remove_lesson(store: &dyn DocumentStore, lesson: Stored<Lesson>) -> Result<(), OpsError> {
    let by_lesson = Filter::new().eq("lesson_id", lesson.id.as_str());
    let subtopics = find_records::<Subtopic>(store, &by_lesson).await?;
    for content_id in subtopics.iter().filter_map(|s| s.value.content_id.as_ref()) {
        store
            .delete(Content::COLLECTION, &content_id.clone().retag())
            .await?;
    }
    store.delete_many(Subtopic::COLLECTION, &by_lesson).await?;
    store.delete(Lesson::COLLECTION, &lesson.id.retag()).await?;
    tracing::debug!(subtopics = subtopics.len(), "deleted lesson");
    Ok(())
}

