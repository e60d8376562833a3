// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Session extraction: `Authorization: Bearer <jwt>` or the `token` cookie.

use std::time::Duration;

use axum::extract::FromRequestParts;
use axum::http::header::{AUTHORIZATION, COOKIE};
use axum::http::request::Parts;
use axum::http::HeaderMap;

use super::error::ApiError;
use super::AppState;
use crate::auth::Claims;
use crate::model::UserId;

pub const TOKEN_COOKIE: &str = "token";

/// The signed-in user behind a request.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub claims: Claims,
}

impl AuthUser {
    pub fn user_id(&self) -> Result<UserId, ApiError> {
        UserId::new(self.claims.sub.as_str())
            .map_err(|_| ApiError::Unauthorized("invalid session subject".to_owned()))
    }

    /// Resolves the `user_id` a request names, defaulting to the signed-in user.
    ///
    /// Naming anyone else is forbidden.
    pub fn resolve_user(&self, requested: Option<&str>) -> Result<UserId, ApiError> {
        match requested.map(str::trim).filter(|id| !id.is_empty()) {
            Some(id) if id != self.claims.sub => Err(ApiError::Forbidden(
                "user_id does not match the signed-in user".to_owned(),
            )),
            _ => self.user_id(),
        }
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)
            .or_else(|| cookie_token(&parts.headers))
            .ok_or_else(|| ApiError::Unauthorized("missing session token".to_owned()))?;
        let claims = state.auth.tokens().verify(token)?;
        Ok(Self { claims })
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

fn cookie_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == TOKEN_COOKIE && !value.is_empty())
        .map(|(_, value)| value)
}

pub(crate) fn session_cookie(token: &str, ttl: Duration) -> String {
    format!(
        "{TOKEN_COOKIE}={token}; Max-Age={}; Path=/; HttpOnly; SameSite=Lax",
        ttl.as_secs()
    )
}

pub(crate) fn cleared_session_cookie() -> String {
    format!("{TOKEN_COOKIE}=; Max-Age=0; Path=/; HttpOnly; SameSite=Lax")
}
