// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! OpenRouter client against a mock chat-completions endpoint.

use futures::StreamExt;
use lessonmap::provider::{CompletionRequest, OpenRouter, Provider, ProviderError};
use lessonmap::relay::{relay, Framing, RelayError};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn request() -> CompletionRequest {
    CompletionRequest::tutor("gpt-4o-mini", "Generate a flowchart")
}

fn sse(events: &[&str]) -> String {
    events.iter().map(|data| format!("data: {data}\n\n")).collect()
}

#[tokio::test]
async fn complete_sends_tutor_messages_and_reads_content() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_partial_json(serde_json::json!({
            "model": "gpt-4o-mini",
            "messages": [
                { "role": "system", "content": "You are a helpful tutor." },
                { "role": "user", "content": "Generate a flowchart" },
            ],
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "gen-1",
            "choices": [{ "message": { "role": "assistant", "content": "  graph TD\nA[x]\n" } }],
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let provider = OpenRouter::new("test-key").base_url(mock_server.uri());
    let completion = provider.complete(request()).await.expect("completion");
    assert_eq!(completion.content, "graph TD\nA[x]");
    assert_eq!(completion.model_used, "gpt-4o-mini");
}

#[tokio::test]
async fn complete_without_choices_is_an_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "id": "x" })))
        .mount(&mock_server)
        .await;

    let provider = OpenRouter::new("k").base_url(mock_server.uri());
    let err = provider.complete(request()).await.unwrap_err();
    assert!(matches!(err, ProviderError::MissingField("choices")), "got {err:?}");
}

fn kind(err: &ProviderError) -> &'static str {
    match err {
        ProviderError::Authentication(_) => "authentication",
        ProviderError::InvalidRequest(_) => "invalid_request",
        ProviderError::ModelNotFound(_) => "model_not_found",
        ProviderError::RateLimit { .. } => "rate_limit",
        ProviderError::ServiceUnavailable(_) => "service_unavailable",
        _ => "other",
    }
}

#[tokio::test]
async fn http_statuses_are_mapped() {
    for (status, expected) in [
        (400, "invalid_request"),
        (401, "authentication"),
        (403, "authentication"),
        (404, "model_not_found"),
        (429, "rate_limit"),
        (503, "service_unavailable"),
    ] {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(status).set_body_string("nope"))
            .mount(&mock_server)
            .await;

        let provider = OpenRouter::new("k").base_url(mock_server.uri());
        let err = provider.complete(request()).await.unwrap_err();
        assert_eq!(kind(&err), expected, "status {status} mapped to {err:?}");
    }
}

#[tokio::test]
async fn stream_yields_delta_fragments_until_done() {
    let mock_server = MockServer::start().await;
    let body = format!(
        ": OPENROUTER PROCESSING\n\n{}",
        sse(&[
            r#"{"choices":[{"delta":{"role":"assistant"}}]}"#,
            r#"{"choices":[{"delta":{"content":"graph TD\n"}}]}"#,
            r#"{"choices":[{"delta":{"content":"A[Cells]"}}]}"#,
            r#"{"choices":[{"delta":{"content":" --> B[DNA]"}}]}"#,
            "[DONE]",
            r#"{"choices":[{"delta":{"content":"ignored"}}]}"#,
        ])
    );

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_partial_json(serde_json::json!({ "stream": true })))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let provider = OpenRouter::new("k").base_url(mock_server.uri());
    let fragments: Vec<String> = provider
        .stream(request())
        .await
        .expect("stream")
        .map(|item| item.expect("fragment"))
        .collect()
        .await;
    assert_eq!(fragments, vec!["graph TD\n", "A[Cells]", " --> B[DNA]"]);
}

#[tokio::test]
async fn stream_error_payload_ends_relay_with_upstream_error() {
    let mock_server = MockServer::start().await;
    let body = sse(&[
        r#"{"choices":[{"delta":{"content":"graph TD\n"}}]}"#,
        r#"{"error":{"message":"model overloaded"}}"#,
    ]);

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
        .mount(&mock_server)
        .await;

    let provider = OpenRouter::new("k").base_url(mock_server.uri());
    let upstream = provider.stream(request()).await.expect("stream");
    let items: Vec<_> = relay(upstream, Framing::Raw).collect().await;

    assert_eq!(items.len(), 2);
    assert_eq!(items[0].as_deref().ok(), Some("graph TD\n"));
    match &items[1] {
        Err(RelayError::Upstream { forwarded, source }) => {
            assert_eq!(*forwarded, 1);
            assert!(matches!(source, ProviderError::Upstream(m) if m == "model overloaded"));
        }
        other => panic!("expected upstream failure, got {other:?}"),
    }
}

#[tokio::test]
async fn stream_closed_without_done_is_interrupted() {
    let mock_server = MockServer::start().await;
    let body = sse(&[r#"{"choices":[{"delta":{"content":"graph TD\n"}}]}"#]);

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
        .mount(&mock_server)
        .await;

    let provider = OpenRouter::new("k").base_url(mock_server.uri());
    let upstream = provider.stream(request()).await.expect("stream");
    let items: Vec<_> = relay(upstream, Framing::Raw).collect().await;

    assert_eq!(items.len(), 2);
    assert_eq!(items[0].as_deref().ok(), Some("graph TD\n"));
    match &items[1] {
        Err(RelayError::Upstream { forwarded, source }) => {
            assert_eq!(*forwarded, 1);
            assert!(matches!(source, ProviderError::StreamInterrupted(_)));
        }
        other => panic!("expected an interrupted stream, got {other:?}"),
    }
}

#[tokio::test]
async fn stream_rejected_before_first_fragment() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
        .mount(&mock_server)
        .await;

    let provider = OpenRouter::new("k").base_url(mock_server.uri());
    let err = match provider.stream(request()).await {
        Ok(_) => panic!("expected the stream call to fail"),
        Err(err) => err,
    };
    assert!(matches!(err, ProviderError::Authentication(_)));
}
