//! WebSocket Voice Bridge
//!
//! - `protocol`: the JSON frames exchanged with the voice page.
//! - `connection`: lifecycle of one browser connection, from upgrade to close.

mod connection;
pub mod protocol;

pub use connection::ws_handler;
