// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Node extraction from loosely-structured Mermaid flowchart text.
//!
//! LLM output is not guaranteed to be valid Mermaid, so this is a scan rather than a parse:
//! every `<ident>[<label>]` occurrence is collected, everything else is skipped.

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// `<ident>` is `[A-Za-z0-9_]+`; the label runs to the first `]` (newlines included).
const NODE_PATTERN: &str = r"([A-Za-z0-9_]+)\s*\[([^\]]+)\]";

fn node_regex() -> &'static Regex {
    static NODE_REGEX: OnceLock<Regex> = OnceLock::new();
    NODE_REGEX.get_or_init(|| Regex::new(NODE_PATTERN).expect("valid node pattern"))
}

/// One declared flowchart node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct MermaidNode {
    /// Identifier exactly as written (case-sensitive).
    pub id: String,
    /// Bracket contents with outer whitespace stripped.
    pub label: String,
}

impl MermaidNode {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }
}

/// Returns every `<ident>[<label>]` declaration in `text`, left to right.
///
/// Matches never overlap. Duplicate identifiers produce duplicate entries. A `]` inside a label
/// cannot be represented: the first `]` always closes it. Never fails; text without any match
/// yields an empty vector.
pub fn extract_nodes(text: &str) -> Vec<MermaidNode> {
    node_regex()
        .captures_iter(text)
        .map(|caps| MermaidNode {
            id: caps[1].to_owned(),
            label: caps[2].trim().to_owned(),
        })
        .collect()
}

/// Non-empty labels in first-appearance order, without repeats.
pub fn distinct_labels(nodes: &[MermaidNode]) -> Vec<String> {
    let mut seen = HashSet::new();
    nodes
        .iter()
        .filter(|node| !node.label.is_empty())
        .filter(|node| seen.insert(node.label.as_str()))
        .map(|node| node.label.clone())
        .collect()
}
