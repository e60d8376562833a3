// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Core data model.
//!
//! Typed document ids plus the user, lesson, subtopic and content records kept in the store.

pub mod ids;
pub mod lesson;
pub mod record;

pub use ids::{ContentId, DocumentId, Id, IdError, LessonId, SubtopicId, UserId};
pub use lesson::{now_millis, Content, Lesson, Subtopic, User};
pub use record::{Record, Stored};
