// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::convert::Infallible;

use axum::body::Body;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::header::{CACHE_CONTROL, CONTENT_TYPE, SET_COOKIE};
use axum::response::{IntoResponse, Response};
use axum::Json;
use futures::{future, Stream, StreamExt};
use schemars::schema_for;
use serde_json::{json, Value};

use super::auth::{cleared_session_cookie, session_cookie, AuthUser};
use super::error::ApiError;
use super::types::{
    ClearedResponse, LessonBody, LessonCreated, MessageResponse, NodesRequest, NodesResponse,
    SessionUser, SignInRequest, SubtopicBody, SubtopicResponse, UpdateProfileRequest, UserQuery,
    UserResponse, VerifyOtpRequest, VerifyOtpResponse,
};
use super::AppState;
use crate::format::mermaid::extract_nodes;
use crate::model::{LessonId, Stored, User, UserId};
use crate::ops::{self, LessonRequest, SubtopicRequest};
use crate::relay::{relay, RelayError};

pub(super) async fn root() -> Json<MessageResponse> {
    Json(MessageResponse::new("Hello World"))
}

pub(super) async fn schema() -> Json<Value> {
    Json(json!({
        "nodes": schema_for!(NodesRequest),
        "initiate-signin": schema_for!(SignInRequest),
        "verify-otp": schema_for!(VerifyOtpRequest),
        "update-profile": schema_for!(UpdateProfileRequest),
        "lesson": schema_for!(LessonBody),
        "subtopic": schema_for!(SubtopicBody),
        "nodes-response": schema_for!(NodesResponse),
    }))
}

pub(super) async fn nodes(
    body: Result<Json<NodesRequest>, JsonRejection>,
) -> Result<Json<NodesResponse>, ApiError> {
    let Json(body) = body?;
    Ok(Json(NodesResponse {
        nodes: extract_nodes(&body.mermaid_code),
    }))
}

pub(super) async fn initiate_signin(
    State(state): State<AppState>,
    body: Result<Json<SignInRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Json(body) = body?;
    let email = validate_email(&body.email)?;
    state.auth.initiate(email, body.name.trim()).await?;
    Ok(Json(MessageResponse::new("OTP sent")))
}

pub(super) async fn verify_otp(
    State(state): State<AppState>,
    body: Result<Json<VerifyOtpRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(body) = body?;
    let email = validate_email(&body.email)?;
    state.auth.verify_code(email, &body.otp).await?;

    let user = ops::upsert_user(state.store.as_ref(), email, &body.name).await?;
    let tokens = state.auth.tokens();
    let token = tokens.issue(user.id.as_str(), &user.value.email, &user.value.name)?;
    tracing::info!(user_id = %user.id, "user signed in");

    let cookie = session_cookie(&token, tokens.ttl());
    let response = VerifyOtpResponse {
        user: SessionUser {
            id: user.id.to_string(),
            name: user.value.name,
            email: user.value.email,
            token,
        },
    };
    Ok(([(SET_COOKIE, cookie)], Json(response)).into_response())
}

pub(super) async fn logout() -> Response {
    (
        [(SET_COOKIE, cleared_session_cookie())],
        Json(MessageResponse::new("Logged out")),
    )
        .into_response()
}

pub(super) async fn get_user(
    State(state): State<AppState>,
    auth: AuthUser,
    user_id: Result<Path<String>, PathRejection>,
) -> Result<Json<UserResponse>, ApiError> {
    let Path(user_id) = user_id?;
    let user_id = auth.resolve_user(Some(&user_id))?;
    let user = ops::get_user(state.store.as_ref(), &user_id).await?;
    Ok(Json(user_response(user)))
}

pub(super) async fn update_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    user_id: Result<Path<String>, PathRejection>,
    body: Result<Json<UpdateProfileRequest>, JsonRejection>,
) -> Result<Json<UserResponse>, ApiError> {
    let Path(user_id) = user_id?;
    let Json(body) = body?;
    let user_id = auth.resolve_user(Some(&user_id))?;
    let user = ops::update_profile(state.store.as_ref(), &user_id, &body.name).await?;
    Ok(Json(user_response(user)))
}

pub(super) async fn stream_lesson(
    State(state): State<AppState>,
    auth: AuthUser,
    body: Result<Json<LessonBody>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(body) = body?;
    let request = lesson_request(&auth, &body)?;
    let upstream = ops::stream_lesson(
        state.provider.as_ref(),
        &request,
        &state.settings.default_model,
    )
    .await?;

    let relayed = relay(upstream, state.settings.framing);
    Ok((
        [
            (CONTENT_TYPE, "text/plain; charset=utf-8"),
            (CACHE_CONTROL, "no-cache"),
        ],
        transcript_body(relayed),
    )
        .into_response())
}

/// Chunked body over the relay. An upstream failure ends the body cleanly so the client keeps
/// the partial transcript.
fn transcript_body<S>(relayed: S) -> Body
where
    S: Stream<Item = Result<String, RelayError>> + Send + 'static,
{
    Body::from_stream(relayed.filter_map(|item| {
        future::ready(match item {
            Ok(fragment) => Some(Ok::<_, Infallible>(fragment)),
            Err(err) => {
                tracing::debug!(error = %err, "closing lesson stream after upstream failure");
                None
            }
        })
    }))
}

pub(super) async fn create_lesson(
    State(state): State<AppState>,
    auth: AuthUser,
    body: Result<Json<LessonBody>, JsonRejection>,
) -> Result<Json<LessonCreated>, ApiError> {
    let Json(body) = body?;
    let request = lesson_request(&auth, &body)?;
    let store = state.store.as_ref();
    let default_model = state.settings.default_model.as_str();

    let lesson = match body.mermaid_code.as_deref() {
        Some(code) if !code.trim().is_empty() => {
            let model_used = crate::provider::resolve_model(&request.model, default_model);
            ops::save_lesson(store, &request, model_used, code).await?
        }
        _ => ops::generate_lesson(store, state.provider.as_ref(), &request, default_model).await?,
    };

    Ok(Json(LessonCreated {
        lesson_name: lesson.value.title.clone(),
        mermaid_code: lesson.value.mermaid_diagram.clone(),
        lesson,
    }))
}

pub(super) async fn create_subtopic(
    State(state): State<AppState>,
    auth: AuthUser,
    body: Result<Json<SubtopicBody>, JsonRejection>,
) -> Result<Json<SubtopicResponse>, ApiError> {
    let Json(body) = body?;
    let user_id = auth.user_id()?;
    let lesson_id = body
        .lesson_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(LessonId::new)
        .transpose()
        .map_err(|err| ApiError::invalid_id("lesson_id", err))?;

    let request = SubtopicRequest {
        lesson_name: body.lesson_name,
        subtopic_name: body.subtopic_name,
        model: body.model,
        grade: body.grade,
        lesson_id,
    };
    let content = ops::generate_subtopic(
        state.store.as_ref(),
        state.provider.as_ref(),
        &user_id,
        &request,
        &state.settings.default_model,
    )
    .await?;

    Ok(Json(SubtopicResponse {
        lesson_name: request.lesson_name.trim().to_owned(),
        subtopic_name: content.value.title,
        subtopic_content: content.value.text,
        content_id: content.id.into_string(),
    }))
}

pub(super) async fn list_lessons(
    State(state): State<AppState>,
    auth: AuthUser,
    query: Result<Query<UserQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(query) = query?;
    let user_id = auth.resolve_user(query.user_id.as_deref())?;
    let lessons = ops::list_lessons(state.store.as_ref(), &user_id, query.q.as_deref()).await?;
    Ok(Json(lessons).into_response())
}

pub(super) async fn get_lesson(
    State(state): State<AppState>,
    auth: AuthUser,
    lesson_id: Result<Path<String>, PathRejection>,
    query: Result<Query<UserQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let (user_id, lesson_id) = lesson_target(&auth, lesson_id, query)?;
    let lesson = ops::get_lesson(state.store.as_ref(), &user_id, &lesson_id).await?;
    Ok(Json(lesson).into_response())
}

pub(super) async fn delete_lesson(
    State(state): State<AppState>,
    auth: AuthUser,
    lesson_id: Result<Path<String>, PathRejection>,
    query: Result<Query<UserQuery>, QueryRejection>,
) -> Result<Json<ClearedResponse>, ApiError> {
    let (user_id, lesson_id) = lesson_target(&auth, lesson_id, query)?;
    ops::delete_lesson(state.store.as_ref(), &user_id, &lesson_id).await?;
    Ok(Json(ClearedResponse {
        message: "Lesson deleted".to_owned(),
        deleted: 1,
    }))
}

pub(super) async fn clear_history(
    State(state): State<AppState>,
    auth: AuthUser,
    query: Result<Query<UserQuery>, QueryRejection>,
) -> Result<Json<ClearedResponse>, ApiError> {
    let Query(query) = query?;
    let user_id = auth.resolve_user(query.user_id.as_deref())?;
    let deleted = ops::clear_history(state.store.as_ref(), &user_id).await?;
    Ok(Json(ClearedResponse {
        message: "History cleared".to_owned(),
        deleted,
    }))
}

fn lesson_request(auth: &AuthUser, body: &LessonBody) -> Result<LessonRequest, ApiError> {
    Ok(LessonRequest {
        user_id: auth.resolve_user(Some(&body.user_id))?,
        lesson_name: body.lesson_name.clone(),
        model: body.model.clone(),
        grade: body.grade.clone(),
    })
}

fn lesson_target(
    auth: &AuthUser,
    lesson_id: Result<Path<String>, PathRejection>,
    query: Result<Query<UserQuery>, QueryRejection>,
) -> Result<(UserId, LessonId), ApiError> {
    let Path(lesson_id) = lesson_id?;
    let Query(query) = query?;
    let user_id = auth.resolve_user(query.user_id.as_deref())?;
    let lesson_id = LessonId::new(lesson_id).map_err(|err| ApiError::invalid_id("lesson_id", err))?;
    Ok((user_id, lesson_id))
}

fn validate_email(raw: &str) -> Result<&str, ApiError> {
    let email = raw.trim();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(email),
        _ => Err(ApiError::BadRequest("a valid email is required".to_owned())),
    }
}

fn user_response(user: Stored<User>) -> UserResponse {
    UserResponse {
        id: user.id.into_string(),
        email: user.value.email,
        name: user.value.name,
    }
}
