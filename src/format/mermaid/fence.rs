// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

/// Removes Markdown code-fence markers that models wrap around Mermaid output.
///
/// Every "```mermaid" marker goes first, then every remaining "```"; the result is trimmed.
/// Only the complete generation path uses this. Streamed text is forwarded untouched.
pub fn strip_code_fences(text: &str) -> String {
    text.trim().replace("```mermaid", "").replace("```", "").trim().to_owned()
}
