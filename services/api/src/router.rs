//! Axum Router Configuration
//!
//! This module defines the complete HTTP routing for the voice bridge: the
//! voice page, the WebSocket endpoint and the listen trigger.

use crate::{handlers, state::AppState, ws::ws_handler};

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

/// Creates the main Axum router for the application.
pub fn create_router(app_state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/ws", get(ws_handler))
        .route("/trigger-listen", post(handlers::trigger_listen))
        .with_state(app_state)
}
