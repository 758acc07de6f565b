//! HTTP routes for the convos API.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};

use super::handlers::{
    create_convo, delete_convo, get_convo, get_thread, health_check, list_convos, reply_convo,
    update_convo,
};
use super::state::AppState;

/// Create the API router with all routes.
#[allow(clippy::literal_string_with_formatting_args)] // `{id}` is a path capture
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/convos", get(list_convos).post(create_convo))
        .route(
            "/convos/{id}",
            get(get_convo).patch(update_convo).delete(delete_convo),
        )
        .route("/convos/{id}/reply", post(reply_convo))
        .route("/convos/{id}/thread", get(get_thread))
        .with_state(state)
}
