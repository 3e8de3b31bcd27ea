//! Shared Application State
//!
//! This module defines the `AppState` struct handed to every HTTP and
//! WebSocket handler.

use crate::multiplexer::Multiplexer;

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub multiplexer: Multiplexer,
}
