// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Lesson, subtopic and user operations.
//!
//! These compose the document store, the provider and the node extractor. They are transport
//! agnostic; the HTTP layer maps their errors to status codes.

use crate::model::{Id, Record, Stored};
use crate::provider::ProviderError;
use crate::store::{DocumentStore, Filter, StoreError};

mod lessons;
mod users;

pub use lessons::{
    clear_history, delete_lesson, generate_lesson, generate_subtopic, get_lesson, list_lessons,
    save_lesson, stream_lesson, title_matches, LessonRequest, SubtopicRequest,
};
pub use users::{get_user, update_profile, upsert_user};

#[derive(Debug, thiserror::Error)]
pub enum OpsError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error("{what} not found: {id}")]
    NotFound { what: &'static str, id: String },
    #[error("{0}")]
    Invalid(String),
}

impl OpsError {
    fn not_found<T>(what: &'static str, id: &Id<T>) -> Self {
        Self::NotFound {
            what,
            id: id.to_string(),
        }
    }
}

async fn insert_record<T: Record>(
    store: &dyn DocumentStore,
    value: T,
) -> Result<Stored<T>, StoreError> {
    let id = store.insert(T::COLLECTION, value.to_document()?).await?;
    Ok(Stored::new(id, value))
}

async fn load_record<T: Record>(
    store: &dyn DocumentStore,
    id: &Id<T::IdTag>,
) -> Result<Option<Stored<T>>, StoreError> {
    store
        .find_by_id(T::COLLECTION, &id.clone().retag())
        .await?
        .map(Stored::from_document)
        .transpose()
}

async fn find_records<T: Record>(
    store: &dyn DocumentStore,
    filter: &Filter,
) -> Result<Vec<Stored<T>>, StoreError> {
    store
        .find(T::COLLECTION, filter)
        .await?
        .into_iter()
        .map(Stored::from_document)
        .collect()
}
