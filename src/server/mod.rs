// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! HTTP surface.
//!
//! Handlers stay thin: they authenticate, validate ids, call into [`crate::ops`] and map errors
//! through [`ApiError`].

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use axum::routing::{delete, get, post, put};
use axum::Router;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::auth::AuthService;
use crate::provider::{Provider, DEFAULT_MODEL};
use crate::relay::Framing;
use crate::store::DocumentStore;

mod auth;
mod error;
mod routes;
pub mod types;

pub use auth::{AuthUser, TOKEN_COOKIE};
pub use error::ApiError;

/// How often expired sign-in codes are dropped.
pub const OTP_SWEEP_PERIOD: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerSettings {
    pub default_model: String,
    pub framing: Framing,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            default_model: DEFAULT_MODEL.to_owned(),
            framing: Framing::Raw,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub provider: Arc<dyn Provider>,
    pub auth: Arc<AuthService>,
    pub settings: Arc<ServerSettings>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(routes::root))
        .route("/schema", get(routes::schema))
        .route("/nodes", post(routes::nodes))
        .route("/initiate-signin", post(routes::initiate_signin))
        .route("/verify-otp", post(routes::verify_otp))
        .route("/logout", post(routes::logout))
        .route("/get-user/{user_id}", get(routes::get_user))
        .route("/update-profile/{user_id}", put(routes::update_profile))
        .route("/lesson/stream", post(routes::stream_lesson))
        .route("/lesson", post(routes::create_lesson))
        .route("/subtopic", post(routes::create_subtopic))
        .route("/lessons", get(routes::list_lessons))
        .route("/lesson/{lesson_id}", get(routes::get_lesson))
        .route("/clear/{lesson_id}", delete(routes::delete_lesson))
        .route("/clear_history", delete(routes::clear_history))
        .with_state(state)
}

/// Serves the API on `listener` until `shutdown` resolves.
pub async fn serve(
    listener: TcpListener,
    state: AppState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        tracing::info!(%addr, "listening");
    }
    let sweeper = spawn_otp_sweeper(state.auth.clone(), OTP_SWEEP_PERIOD);
    let result = axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await;
    sweeper.abort();
    tracing::info!("server stopped");
    result
}

/// Periodically evicts expired sign-in codes until the handle is aborted.
pub fn spawn_otp_sweeper(auth: Arc<AuthService>, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let removed = auth.sweep().await;
            if removed > 0 {
                tracing::debug!(removed, "swept expired sign-in codes");
            }
        }
    })
}
