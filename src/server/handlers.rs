//! Request handlers: translate inbound parameters into repository calls.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use serde_json::{Map, Value};

use crate::convos::core::convo::NewConvo;
use crate::convos::core::errors::{ConvoError, ConvoResult};
use crate::convos::core::ids::ConvoId;
use crate::convos::core::update::ConvoUpdate;

use super::auth::ActingUser;
use super::envelope::ApiResponse;
use super::state::AppState;

/// Body returned by a successful delete.
pub const DELETE_SUCCESS: &str = "success";

/// Parse a path id. Anything that cannot name a stored convo is not found.
fn parse_id(raw: &str) -> ConvoResult<ConvoId> {
    match raw.parse::<ConvoId>() {
        Ok(id) if id.get() > 0 => Ok(id),
        _ => Err(ConvoError::convo_not_found(raw)),
    }
}

fn invalid_body(rejection: &JsonRejection) -> ConvoError {
    ConvoError::InvalidRequest(rejection.body_text())
}

/// Health check endpoint.
pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "convos",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// `GET /convos`
pub async fn list_convos(
    State(state): State<Arc<AppState>>,
    ActingUser(user): ActingUser,
) -> ApiResponse {
    state.convos.list(user).await.into()
}

/// `GET /convos/{id}`
pub async fn get_convo(
    State(state): State<Arc<AppState>>,
    ActingUser(user): ActingUser,
    Path(raw_id): Path<String>,
) -> ApiResponse {
    let id = match parse_id(&raw_id) {
        Ok(id) => id,
        Err(err) => return ApiResponse::error(&err),
    };
    state.convos.get(user, id).await.into()
}

/// `GET /convos/{id}/thread`
pub async fn get_thread(
    State(state): State<Arc<AppState>>,
    ActingUser(user): ActingUser,
    Path(raw_id): Path<String>,
) -> ApiResponse {
    let id = match parse_id(&raw_id) {
        Ok(id) => id,
        Err(err) => return ApiResponse::error(&err),
    };
    state.convos.thread(user, id).await.into()
}

/// `POST /convos`
pub async fn create_convo(
    State(state): State<Arc<AppState>>,
    ActingUser(user): ActingUser,
    payload: Result<Json<NewConvo>, JsonRejection>,
) -> ApiResponse {
    let mut draft = match payload {
        Ok(Json(draft)) => draft,
        Err(rejection) => return ApiResponse::error(&invalid_body(&rejection)),
    };
    // Threads are only started here; replies go through the reply route.
    draft.parent = ConvoId::default();
    state.convos.create(user, draft).await.into()
}

/// `POST /convos/{id}/reply`
pub async fn reply_convo(
    State(state): State<Arc<AppState>>,
    ActingUser(user): ActingUser,
    Path(raw_id): Path<String>,
    payload: Result<Json<NewConvo>, JsonRejection>,
) -> ApiResponse {
    let parent = match parse_id(&raw_id) {
        Ok(id) => id,
        Err(err) => return ApiResponse::error(&err),
    };
    let draft = match payload {
        Ok(Json(draft)) => draft.in_reply_to(parent),
        Err(rejection) => return ApiResponse::error(&invalid_body(&rejection)),
    };
    state.convos.create(user, draft).await.into()
}

/// `PATCH /convos/{id}`
pub async fn update_convo(
    State(state): State<Arc<AppState>>,
    ActingUser(user): ActingUser,
    Path(raw_id): Path<String>,
    payload: Result<Json<Map<String, Value>>, JsonRejection>,
) -> ApiResponse {
    let id = match parse_id(&raw_id) {
        Ok(id) => id,
        Err(err) => return ApiResponse::error(&err),
    };
    let updates = match payload
        .map_err(|rejection| invalid_body(&rejection))
        .and_then(|Json(patch)| ConvoUpdate::parse_patch(&patch))
    {
        Ok(updates) => updates,
        Err(err) => return ApiResponse::error(&err),
    };
    state.convos.update(user, id, updates).await.into()
}

/// `DELETE /convos/{id}`
pub async fn delete_convo(
    State(state): State<Arc<AppState>>,
    ActingUser(user): ActingUser,
    Path(raw_id): Path<String>,
) -> ApiResponse {
    let id = match parse_id(&raw_id) {
        Ok(id) => id,
        Err(err) => return ApiResponse::error(&err),
    };
    state
        .convos
        .delete(user, id)
        .await
        .map(|()| DELETE_SUCCESS)
        .into()
}
