// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use serde_json::Value;

use super::{Document, Filter, ID_FIELD};
use crate::model::DocumentId;

/// Documents of one collection, in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Table {
    documents: Vec<Document>,
}

impl Table {
    pub(crate) fn from_documents(documents: Vec<Document>) -> Self {
        Self { documents }
    }

    pub(crate) fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub(crate) fn insert(&mut self, mut document: Document) -> DocumentId {
        let id = DocumentId::generate();
        document.insert(ID_FIELD.to_owned(), Value::String(id.to_string()));
        self.documents.push(document);
        id
    }

    pub(crate) fn find_by_id(&self, id: &DocumentId) -> Option<&Document> {
        self.documents.iter().find(|document| has_id(document, id))
    }

    pub(crate) fn find(&self, filter: &Filter) -> Vec<Document> {
        self.documents
            .iter()
            .filter(|document| filter.matches(document))
            .cloned()
            .collect()
    }

    pub(crate) fn update(&mut self, id: &DocumentId, changes: Document) -> bool {
        let Some(document) = self.documents.iter_mut().find(|document| has_id(document, id)) else {
            return false;
        };
        for (field, value) in changes {
            if field != ID_FIELD {
                document.insert(field, value);
            }
        }
        true
    }

    pub(crate) fn delete(&mut self, id: &DocumentId) -> bool {
        let before = self.documents.len();
        self.documents.retain(|document| !has_id(document, id));
        self.documents.len() != before
    }

    pub(crate) fn delete_many(&mut self, filter: &Filter) -> usize {
        let before = self.documents.len();
        self.documents.retain(|document| !filter.matches(document));
        before - self.documents.len()
    }
}

fn has_id(document: &Document, id: &DocumentId) -> bool {
    document.get(ID_FIELD).and_then(Value::as_str) == Some(id.as_str())
}
