//! Reply sinks for the two kinds of input source.

use crate::{connections::ConnectionSet, ws::protocol::ServerMessage};
use async_trait::async_trait;
use deskpilot_core::dispatcher::ReplySink;
use tracing::{debug, info};

/// Prints agent output on the local terminal only.
pub struct TerminalSink;

#[async_trait]
impl ReplySink for TerminalSink {
    async fn deliver(&self, text: &str) {
        println!("{text}");
    }

    async fn start_listening(&self) {
        info!("Listening was requested, but the terminal has no voice channel");
    }
}

/// Echoes agent output locally and speaks it on every open connection.
pub struct BroadcastSink {
    connections: ConnectionSet,
}

impl BroadcastSink {
    pub fn new(connections: ConnectionSet) -> Self {
        Self { connections }
    }
}

#[async_trait]
impl ReplySink for BroadcastSink {
    async fn deliver(&self, text: &str) {
        println!("{text}");
        let reached = self
            .connections
            .broadcast(ServerMessage::Speak {
                text: text.to_string(),
            })
            .await;
        debug!(reached, "Broadcast speak event");
    }

    async fn start_listening(&self) {
        let reached = self.connections.broadcast(ServerMessage::StartListening).await;
        debug!(reached, "Broadcast startListening event");
    }
}
