//! Deskpilot API Library Crate
//!
//! This library contains the session bridge around `deskpilot-core`: the
//! configuration, the input multiplexer that serializes every turn onto the one
//! conversation, the terminal prompt loop, and the HTTP/WebSocket voice
//! surface. The binaries in `bin/` are thin wrappers around it.

pub mod config;
pub mod connections;
pub mod cycle;
pub mod handlers;
pub mod multiplexer;
pub mod router;
pub mod sink;
pub mod startup;
pub mod state;
pub mod terminal;
pub mod ws;

#[cfg(test)]
mod testing;
