// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::borrow::Borrow;
use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A document identifier, tagged with the kind of document it names.
///
/// Ids are opaque to callers. The store generates them; the only enforced rule is that an id is
/// a non-empty *path segment* (no `/`), because ids are embedded in request paths.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Id<T> {
    value: String,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Id<T> {
    pub fn new(value: impl Into<String>) -> Result<Self, IdError> {
        let value = value.into();
        validate_id_segment(&value)?;
        Ok(Self {
            value,
            _marker: PhantomData,
        })
    }

    /// A fresh 24-hex-digit id: 8 digits of Unix seconds followed by 16 random digits.
    pub fn generate() -> Self {
        let secs = chrono::Utc::now().timestamp() as u32;
        Self {
            value: format!("{secs:08x}{:016x}", rand::random::<u64>()),
            _marker: PhantomData,
        }
    }

    /// Reinterprets the id under another tag.
    pub fn retag<U>(self) -> Id<U> {
        Id {
            value: self.value,
            _marker: PhantomData,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn into_string(self) -> String {
        self.value
    }
}

impl<T> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl<T> AsRef<str> for Id<T> {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl<T> Borrow<str> for Id<T> {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl<T> FromStr for Id<T> {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.to_owned())
    }
}

impl<T> TryFrom<String> for Id<T> {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl<T> Serialize for Id<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.value)
    }
}

impl<'de, T> Deserialize<'de> for Id<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Self::new(value).map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdError {
    #[error("id must not be empty")]
    Empty,
    #[error("id must not contain '/'")]
    ContainsSlash,
}

fn validate_id_segment(value: &str) -> Result<(), IdError> {
    if value.is_empty() {
        return Err(IdError::Empty);
    }
    if value.contains('/') {
        return Err(IdError::ContainsSlash);
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DocumentIdTag {}
/// Untyped id as seen by the document store.
pub type DocumentId = Id<DocumentIdTag>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum UserIdTag {}
pub type UserId = Id<UserIdTag>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LessonIdTag {}
pub type LessonId = Id<LessonIdTag>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SubtopicIdTag {}
pub type SubtopicId = Id<SubtopicIdTag>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ContentIdTag {}
pub type ContentId = Id<ContentIdTag>;

#[cfg(test)]
mod tests {
    use super::{IdError, LessonId, UserId};

    #[test]
    fn rejects_empty_and_slash() {
        assert_eq!(LessonId::new("").unwrap_err(), IdError::Empty);
        assert_eq!(LessonId::new("a/b").unwrap_err(), IdError::ContainsSlash);
        assert_eq!(LessonId::new("abc").unwrap().as_str(), "abc");
    }

    #[test]
    fn id_errors_are_std_errors() {
        let err: Box<dyn std::error::Error> = Box::new(IdError::ContainsSlash);
        assert_eq!(err.to_string(), "id must not contain '/'");
        assert_eq!(IdError::Empty.to_string(), "id must not be empty");
    }

    #[test]
    fn generated_ids_are_hex_and_distinct() {
        let a = UserId::generate();
        let b = UserId::generate();
        assert_eq!(a.as_str().len(), 24);
        assert!(a.as_str().chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    #[test]
    fn serializes_as_plain_string() {
        let id = LessonId::new("65f0c0ffee").unwrap();
        assert_eq!(serde_json::to_value(&id).unwrap(), serde_json::json!("65f0c0ffee"));
        let back: LessonId = serde_json::from_value(serde_json::json!("65f0c0ffee")).unwrap();
        assert_eq!(back, id);
        assert!(serde_json::from_value::<LessonId>(serde_json::json!("")).is_err());
    }

    #[test]
    fn retag_keeps_value() {
        let id = LessonId::new("x1").unwrap();
        let user: UserId = id.retag();
        assert_eq!(user.as_str(), "x1");
    }
}
