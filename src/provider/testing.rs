// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Scripted provider for exercising callers without a network.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use super::{Completion, CompletionRequest, FragmentStream, Provider, ProviderError};

#[derive(Debug, Clone)]
pub(crate) enum StreamEnd {
    Complete,
    Fail(String),
}

#[derive(Debug)]
pub(crate) struct ScriptedProvider {
    completion: Option<String>,
    fragments: Vec<String>,
    end: StreamEnd,
    fragment_delay: Option<Duration>,
    requests: Mutex<Vec<CompletionRequest>>,
    pulled: Arc<AtomicUsize>,
}

impl ScriptedProvider {
    /// Answers complete calls with `completion` and streams `fragments`.
    pub(crate) fn new(completion: &str, fragments: &[&str]) -> Self {
        Self {
            completion: Some(completion.to_owned()),
            fragments: fragments.iter().map(|s| (*s).to_owned()).collect(),
            end: StreamEnd::Complete,
            fragment_delay: None,
            requests: Mutex::new(Vec::new()),
            pulled: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Complete calls fail as if the provider omitted `choices`.
    pub(crate) fn without_choices(mut self) -> Self {
        self.completion = None;
        self
    }

    pub(crate) fn failing_stream_after(mut self, message: &str) -> Self {
        self.end = StreamEnd::Fail(message.to_owned());
        self
    }

    /// Waits `delay` before handing out each fragment.
    pub(crate) fn with_fragment_delay(mut self, delay: Duration) -> Self {
        self.fragment_delay = Some(delay);
        self
    }

    pub(crate) fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().expect("requests lock").clone()
    }

    /// Fragments handed out by streams so far.
    pub(crate) fn pulled(&self) -> usize {
        self.pulled.load(Ordering::SeqCst)
    }

    fn record(&self, request: CompletionRequest) {
        self.requests.lock().expect("requests lock").push(request);
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<Completion, ProviderError> {
        let model_used = request.model.clone();
        self.record(request);
        let content = self.completion.clone().ok_or(ProviderError::MissingField("choices"))?;
        Ok(Completion {
            model_used,
            content: content.trim().to_owned(),
        })
    }

    async fn stream(&self, request: CompletionRequest) -> Result<FragmentStream, ProviderError> {
        self.record(request);
        let fragments = self.fragments.clone();
        let end = self.end.clone();
        let pulled = self.pulled.clone();
        let delay = self.fragment_delay;
        Ok(Box::pin(async_stream::stream! {
            for fragment in fragments {
                if let Some(delay) = delay {
                    tokio::time::sleep(delay).await;
                }
                pulled.fetch_add(1, Ordering::SeqCst);
                yield Ok(fragment);
            }
            if let StreamEnd::Fail(message) = end {
                yield Err(ProviderError::StreamInterrupted(message));
            }
        }))
    }
}
