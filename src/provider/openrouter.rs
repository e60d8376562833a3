// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! OpenRouter chat-completions client.
//!
//! OpenRouter speaks the OpenAI chat completions wire format, both for one-shot responses and
//! for SSE streaming (`"stream": true`).

use async_trait::async_trait;
use futures::StreamExt;
use serde::{Deserialize, Serialize};

use super::error::{map_http_status, map_reqwest_error};
use super::sse::SseDecoder;
use super::{Completion, CompletionRequest, FragmentStream, Provider, ProviderError};

pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api";

/// Client for the OpenRouter chat completions endpoint.
///
/// ```no_run
/// use lessonmap::provider::OpenRouter;
///
/// let client = OpenRouter::new("sk-or-...").base_url("http://localhost:9999");
/// ```
#[derive(Debug, Clone)]
pub struct OpenRouter {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl OpenRouter {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_owned(),
            client: reqwest::Client::new(),
        }
    }

    /// Overrides the API base URL (proxies, local mock servers).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_owned();
        self
    }

    pub(crate) fn completions_url(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url)
    }

    async fn send(
        &self,
        request: &CompletionRequest,
        stream: bool,
    ) -> Result<reqwest::Response, ProviderError> {
        let body = ChatRequest::from_request(request, stream);
        let mut builder = self
            .client
            .post(self.completions_url())
            .bearer_auth(&self.api_key)
            .json(&body);
        if stream {
            builder = builder.header(reqwest::header::ACCEPT, "text/event-stream");
        }

        let response = builder.send().await.map_err(map_reqwest_error)?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(%status, model = %request.model, "provider rejected request");
            return Err(map_http_status(status, &body));
        }
        Ok(response)
    }
}

#[async_trait]
impl Provider for OpenRouter {
    async fn complete(&self, request: CompletionRequest) -> Result<Completion, ProviderError> {
        tracing::debug!(model = %request.model, "requesting completion");
        let response = self.send(&request, false).await?;
        let body = response.text().await.map_err(map_reqwest_error)?;
        let content = parse_completion(&body)?;
        Ok(Completion {
            model_used: request.model,
            content: content.trim().to_owned(),
        })
    }

    async fn stream(&self, request: CompletionRequest) -> Result<FragmentStream, ProviderError> {
        tracing::debug!(model = %request.model, "requesting streamed completion");
        let response = self.send(&request, true).await?;
        Ok(fragments(response))
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "is_false")]
    stream: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

impl<'a> ChatRequest<'a> {
    fn from_request(request: &'a CompletionRequest, stream: bool) -> Self {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = request.system.as_deref() {
            messages.push(ChatMessage {
                role: "system",
                content: system,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: &request.prompt,
        });
        Self {
            model: &request.model,
            messages,
            stream,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    choices: Option<Vec<ChatChoice>>,
    error: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: Option<ChoiceMessage>,
    delta: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

fn upstream_error(error: &serde_json::Value) -> ProviderError {
    let message = error
        .get("message")
        .and_then(serde_json::Value::as_str)
        .map(str::to_owned)
        .unwrap_or_else(|| error.to_string());
    ProviderError::Upstream(message)
}

/// Pulls `choices[0].message.content` out of a complete response body.
fn parse_completion(body: &str) -> Result<String, ProviderError> {
    let parsed: ChatCompletion =
        serde_json::from_str(body).map_err(|err| ProviderError::InvalidResponse(err.to_string()))?;

    let Some(choices) = parsed.choices else {
        return Err(match parsed.error {
            Some(error) => upstream_error(&error),
            None => ProviderError::MissingField("choices"),
        });
    };
    choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message)
        .and_then(|message| message.content)
        .ok_or(ProviderError::MissingField("choices[0].message.content"))
}

#[derive(Debug, PartialEq, Eq)]
enum StreamPayload {
    Fragment(String),
    Skip,
    Done,
}

/// Interprets one SSE data payload of a streamed completion.
fn parse_stream_payload(data: &str) -> Result<StreamPayload, ProviderError> {
    if data.trim() == "[DONE]" {
        return Ok(StreamPayload::Done);
    }
    let parsed: ChatCompletion =
        serde_json::from_str(data).map_err(|err| ProviderError::InvalidResponse(err.to_string()))?;
    if let Some(error) = parsed.error {
        return Err(upstream_error(&error));
    }

    let content = parsed
        .choices
        .and_then(|choices| choices.into_iter().next())
        .and_then(|choice| choice.delta)
        .and_then(|delta| delta.content);
    Ok(match content {
        Some(text) if !text.is_empty() => StreamPayload::Fragment(text),
        _ => StreamPayload::Skip,
    })
}

fn fragments(response: reqwest::Response) -> FragmentStream {
    let bytes = response.bytes_stream();
    Box::pin(async_stream::stream! {
        let mut bytes = std::pin::pin!(bytes);
        let mut decoder = SseDecoder::default();

        loop {
            let (events, exhausted) = match bytes.next().await {
                Some(Ok(chunk)) => (decoder.push(&chunk), false),
                Some(Err(err)) => {
                    yield Err(map_reqwest_error(err));
                    return;
                }
                None => (decoder.finish(), true),
            };

            for data in events {
                match parse_stream_payload(&data) {
                    Ok(StreamPayload::Fragment(text)) => yield Ok(text),
                    Ok(StreamPayload::Skip) => {}
                    Ok(StreamPayload::Done) => return,
                    Err(err) => {
                        yield Err(err);
                        return;
                    }
                }
            }

            if exhausted {
                yield Err(ProviderError::StreamInterrupted(
                    "stream ended without [DONE]".to_owned(),
                ));
                return;
            }
        }
    })
}
