// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::time::Duration;

/// Failures talking to the LLM provider.
///
/// None of these are retried; they surface to the caller as an error payload.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("network error: {0}")]
    Network(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error("request timed out")]
    Timeout,
    #[error("rate limited, retry after {retry_after:?}")]
    RateLimit { retry_after: Option<Duration> },
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
    #[error("authentication failed: {0}")]
    Authentication(String),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("model not found: {0}")]
    ModelNotFound(String),
    /// The provider answered, but not with the fields we need.
    #[error("provider response is missing `{0}`")]
    MissingField(&'static str),
    /// The provider answered with an error object instead of a completion.
    #[error("provider error: {0}")]
    Upstream(String),
    #[error("invalid provider response: {0}")]
    InvalidResponse(String),
    #[error("stream interrupted: {0}")]
    StreamInterrupted(String),
}

/// Maps a non-success HTTP status from the chat completions endpoint.
pub(crate) fn map_http_status(status: reqwest::StatusCode, body: &str) -> ProviderError {
    match status.as_u16() {
        401 | 403 => ProviderError::Authentication(body.to_owned()),
        400 => ProviderError::InvalidRequest(body.to_owned()),
        404 => ProviderError::ModelNotFound(body.to_owned()),
        429 => ProviderError::RateLimit {
            retry_after: parse_retry_after(body),
        },
        500..=599 => ProviderError::ServiceUnavailable(body.to_owned()),
        _ => ProviderError::InvalidRequest(format!("HTTP {status}: {body}")),
    }
}

/// Best-effort "retry after N" extraction from an error body.
fn parse_retry_after(body: &str) -> Option<Duration> {
    let lower = body.to_lowercase();
    let idx = lower.find("retry after ")?;
    let digits: String = lower[idx + "retry after ".len()..]
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse::<u64>().ok().map(Duration::from_secs)
}

pub(crate) fn map_reqwest_error(err: reqwest::Error) -> ProviderError {
    if err.is_timeout() {
        ProviderError::Timeout
    } else {
        ProviderError::Network(Box::new(err))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use reqwest::StatusCode;
    use rstest::rstest;

    use super::{map_http_status, parse_retry_after, ProviderError};

    #[rstest]
    #[case(StatusCode::UNAUTHORIZED)]
    #[case(StatusCode::FORBIDDEN)]
    fn auth_statuses(#[case] status: StatusCode) {
        assert!(matches!(map_http_status(status, "nope"), ProviderError::Authentication(_)));
    }

    #[test]
    fn bad_request_and_missing_model() {
        assert!(matches!(
            map_http_status(StatusCode::BAD_REQUEST, "bad"),
            ProviderError::InvalidRequest(_)
        ));
        assert!(matches!(
            map_http_status(StatusCode::NOT_FOUND, "no such model"),
            ProviderError::ModelNotFound(_)
        ));
    }

    #[rstest]
    #[case(StatusCode::INTERNAL_SERVER_ERROR)]
    #[case(StatusCode::BAD_GATEWAY)]
    #[case(StatusCode::SERVICE_UNAVAILABLE)]
    fn server_statuses(#[case] status: StatusCode) {
        assert!(matches!(map_http_status(status, "down"), ProviderError::ServiceUnavailable(_)));
    }

    #[test]
    fn rate_limit_reads_retry_hint() {
        match map_http_status(StatusCode::TOO_MANY_REQUESTS, "Please retry after 12 seconds") {
            ProviderError::RateLimit { retry_after } => {
                assert_eq!(retry_after, Some(Duration::from_secs(12)));
            }
            other => panic!("expected RateLimit, got {other:?}"),
        }
        assert_eq!(parse_retry_after("slow down"), None);
    }

    #[test]
    fn unknown_status_keeps_code_in_message() {
        let err = map_http_status(StatusCode::IM_A_TEAPOT, "teapot");
        assert!(err.to_string().contains("418"));
    }
}
