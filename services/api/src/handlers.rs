//! Axum Handlers for the HTTP surface of the voice bridge.

use crate::state::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse},
};
use std::sync::Arc;
use tracing::info;

const VOICE_PAGE: &str = include_str!("../static/index.html");

/// Serves the voice interface page.
pub async fn index() -> Html<&'static str> {
    Html(VOICE_PAGE)
}

/// Asks every connected voice client to start listening.
pub async fn trigger_listen(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let reached = state.multiplexer.trigger_listen().await;
    info!(reached, "Triggered listening on connected clients");
    (StatusCode::OK, "OK")
}
