// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::table::Table;
use super::{Collection, Document, DocumentStore, Filter, StoreError};
use crate::model::DocumentId;

/// Process-local store; contents are lost on exit.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<BTreeMap<Collection, Table>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn insert(
        &self,
        collection: Collection,
        document: Document,
    ) -> Result<DocumentId, StoreError> {
        let mut tables = self.tables.write().await;
        Ok(tables.entry(collection).or_default().insert(document))
    }

    async fn find_by_id(
        &self,
        collection: Collection,
        id: &DocumentId,
    ) -> Result<Option<Document>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .get(&collection)
            .and_then(|table| table.find_by_id(id))
            .cloned())
    }

    async fn find(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<Vec<Document>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .get(&collection)
            .map(|table| table.find(filter))
            .unwrap_or_default())
    }

    async fn update(
        &self,
        collection: Collection,
        id: &DocumentId,
        changes: Document,
    ) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().await;
        Ok(tables
            .get_mut(&collection)
            .is_some_and(|table| table.update(id, changes)))
    }

    async fn delete(&self, collection: Collection, id: &DocumentId) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().await;
        Ok(tables
            .get_mut(&collection)
            .is_some_and(|table| table.delete(id)))
    }

    async fn delete_many(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<usize, StoreError> {
        let mut tables = self.tables.write().await;
        Ok(tables
            .get_mut(&collection)
            .map(|table| table.delete_many(filter))
            .unwrap_or(0))
    }
}
