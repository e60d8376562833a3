// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Mermaid-ish node extraction and cleanup for generated flowcharts.

mod fence;
pub mod nodes;

pub use fence::strip_code_fences;
pub use nodes::{distinct_labels, extract_nodes, MermaidNode};
