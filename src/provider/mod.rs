// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! LLM provider boundary.
//!
//! The rest of the crate only sees [`Provider`]: a complete call returning one text blob, and a
//! streaming call returning a [`FragmentStream`] of incremental text.

use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;

mod error;
pub mod openrouter;
pub mod prompt;
pub(crate) mod sse;
#[cfg(test)]
pub(crate) mod testing;

pub use error::ProviderError;
pub use openrouter::OpenRouter;

/// Model used when a request leaves the model empty.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Ordered text fragments from a streaming generation call.
///
/// Dropping the stream releases the upstream connection.
pub type FragmentStream = Pin<Box<dyn Stream<Item = Result<String, ProviderError>> + Send>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    pub model: String,
    pub system: Option<String>,
    pub prompt: String,
}

impl CompletionRequest {
    /// A request framed with the tutor system prompt.
    pub fn tutor(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            system: Some(prompt::TUTOR_SYSTEM_PROMPT.to_owned()),
            prompt: prompt.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub model_used: String,
    /// Generated text, trimmed.
    pub content: String,
}

#[async_trait]
pub trait Provider: Send + Sync {
    /// Runs the request to completion and returns the whole generated text.
    async fn complete(&self, request: CompletionRequest) -> Result<Completion, ProviderError>;

    /// Starts a streaming generation. Errors here happen before any fragment is produced.
    async fn stream(&self, request: CompletionRequest) -> Result<FragmentStream, ProviderError>;
}

/// Picks `requested` unless it is blank.
pub fn resolve_model<'a>(requested: &'a str, default_model: &'a str) -> &'a str {
    let requested = requested.trim();
    if requested.is_empty() {
        default_model
    } else {
        requested
    }
}

#[cfg(test)]
mod tests {
    use super::{resolve_model, CompletionRequest, DEFAULT_MODEL};

    #[test]
    fn blank_model_falls_back_to_default() {
        assert_eq!(resolve_model("", DEFAULT_MODEL), DEFAULT_MODEL);
        assert_eq!(resolve_model("   ", DEFAULT_MODEL), DEFAULT_MODEL);
        assert_eq!(resolve_model(" gemini-2.5-flash ", DEFAULT_MODEL), "gemini-2.5-flash");
    }

    #[test]
    fn tutor_request_carries_system_prompt() {
        let request = CompletionRequest::tutor("gpt-4o-mini", "explain");
        assert_eq!(request.system.as_deref(), Some("You are a helpful tutor."));
        assert_eq!(request.prompt, "explain");
    }
}
