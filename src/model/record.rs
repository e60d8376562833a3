// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Typed views over store documents.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Serialize, Serializer};

use super::ids::{DocumentId, Id};
use crate::store::{Collection, Document, StoreError, ID_FIELD};

/// A document type with a home collection.
pub trait Record: Serialize + DeserializeOwned {
    type IdTag: fmt::Debug + Clone + PartialEq;
    const COLLECTION: Collection;

    /// Field map for insertion; never carries `_id`.
    fn to_document(&self) -> Result<Document, StoreError> {
        match serde_json::to_value(self) {
            Ok(serde_json::Value::Object(mut map)) => {
                map.remove(ID_FIELD);
                Ok(map)
            }
            Ok(other) => Err(StoreError::InvalidDocument(format!(
                "{} record serialized to a non-object: {other}",
                Self::COLLECTION.name()
            ))),
            Err(err) => Err(StoreError::InvalidDocument(err.to_string())),
        }
    }
}

/// A record together with the id the store assigned to it.
///
/// Serializes as the record's fields plus `_id`.
#[derive(Debug, Clone, PartialEq)]
pub struct Stored<T: Record> {
    pub id: Id<T::IdTag>,
    pub value: T,
}

impl<T: Record> Stored<T> {
    pub fn new(id: DocumentId, value: T) -> Self {
        Self {
            id: id.retag(),
            value,
        }
    }

    pub fn from_document(mut document: Document) -> Result<Self, StoreError> {
        let raw_id = match document.remove(ID_FIELD) {
            Some(serde_json::Value::String(raw)) => raw,
            _ => {
                return Err(StoreError::InvalidDocument(format!(
                    "{} document without a string `{ID_FIELD}`",
                    T::COLLECTION.name()
                )))
            }
        };
        let id = Id::new(raw_id.clone()).map_err(|source| StoreError::InvalidId {
            value: raw_id,
            source,
        })?;
        let value = serde_json::from_value(serde_json::Value::Object(document))
            .map_err(|err| StoreError::InvalidDocument(err.to_string()))?;
        Ok(Self { id, value })
    }
}

impl<T: Record> Serialize for Stored<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut document = self.value.to_document().map_err(serde::ser::Error::custom)?;
        document.insert(ID_FIELD.to_owned(), serde_json::Value::String(self.id.to_string()));
        serde_json::Value::Object(document).serialize(serializer)
    }
}
