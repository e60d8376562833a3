// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Document persistence.
//!
//! The store is a plain document store: field maps grouped into collections, looked up by id or
//! by field equality. It generates ids and owns the `_id` field; it knows nothing about lessons.

use std::io;
use std::path::PathBuf;

use async_trait::async_trait;
use serde_json::Value;

use crate::model::{DocumentId, IdError};

pub mod folder;
pub mod memory;
mod table;

pub use folder::{FolderStore, WriteDurability};
pub use memory::MemoryStore;

/// A stored document: an arbitrary JSON field map.
pub type Document = serde_json::Map<String, Value>;

/// Field holding the store-generated id.
pub const ID_FIELD: &str = "_id";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Collection {
    Users,
    Lessons,
    Subtopics,
    Contents,
}

impl Collection {
    pub const ALL: [Collection; 4] = [Self::Users, Self::Lessons, Self::Subtopics, Self::Contents];

    pub fn name(self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Lessons => "lessons",
            Self::Subtopics => "subtopics",
            Self::Contents => "contents",
        }
    }
}

/// Conjunction of field equality conditions. The empty filter matches everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: Vec<(String, Value)>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.push((field.into(), value.into()));
        self
    }

    pub fn matches(&self, document: &Document) -> bool {
        self.conditions
            .iter()
            .all(|(field, expected)| document.get(field) == Some(expected))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("i/o error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid JSON in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid document: {0}")]
    InvalidDocument(String),
    #[error("invalid id {value:?}: {source}")]
    InvalidId {
        value: String,
        #[source]
        source: IdError,
    },
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Inserts `document` (any `_id` it carries is replaced) and returns the generated id.
    async fn insert(
        &self,
        collection: Collection,
        document: Document,
    ) -> Result<DocumentId, StoreError>;

    async fn find_by_id(
        &self,
        collection: Collection,
        id: &DocumentId,
    ) -> Result<Option<Document>, StoreError>;

    /// Matching documents in insertion order.
    async fn find(&self, collection: Collection, filter: &Filter)
        -> Result<Vec<Document>, StoreError>;

    async fn find_one(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<Option<Document>, StoreError> {
        Ok(self.find(collection, filter).await?.into_iter().next())
    }

    /// Overwrites the given fields (shallow merge). Returns whether the document existed.
    async fn update(
        &self,
        collection: Collection,
        id: &DocumentId,
        changes: Document,
    ) -> Result<bool, StoreError>;

    /// Returns whether the document existed.
    async fn delete(&self, collection: Collection, id: &DocumentId) -> Result<bool, StoreError>;

    /// Returns the number of deleted documents.
    async fn delete_many(&self, collection: Collection, filter: &Filter)
        -> Result<usize, StoreError>;
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{Document, Filter};

    fn document(value: serde_json::Value) -> Document {
        value.as_object().cloned().expect("object")
    }

    #[test]
    fn empty_filter_matches_everything() {
        assert!(Filter::new().matches(&Document::new()));
    }

    #[test]
    fn all_conditions_must_hold() {
        let doc = document(json!({ "user_id": "u1", "title": "Cells" }));
        assert!(Filter::new().eq("user_id", "u1").matches(&doc));
        assert!(Filter::new().eq("user_id", "u1").eq("title", "Cells").matches(&doc));
        assert!(!Filter::new().eq("user_id", "u1").eq("title", "Atoms").matches(&doc));
        assert!(!Filter::new().eq("missing", "x").matches(&doc));
    }

    #[test]
    fn equality_is_type_sensitive() {
        let doc = document(json!({ "grade": "12" }));
        assert!(!Filter::new().eq("grade", 12).matches(&doc));
        assert!(Filter::new().eq("grade", "12").matches(&doc));
    }
}
