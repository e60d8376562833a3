// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Lessonmap: backend for an AI-assisted lesson visualizer.
//!
//! A lesson title goes to an LLM provider, which answers with a Mermaid flowchart. The flowchart
//! is streamed to the client as it is generated ([`relay`]), its `ID[Label]` nodes are extracted
//! ([`format::mermaid::extract_nodes`]) and each distinct label becomes a subtopic whose
//! revision notes can be generated on demand.

pub mod auth;
pub mod config;
pub mod format;
pub mod logging;
pub mod model;
pub mod ops;
pub mod provider;
pub mod relay;
pub mod server;
pub mod store;
