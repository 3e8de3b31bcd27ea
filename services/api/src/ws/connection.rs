//! Manages the lifecycle of one voice-client WebSocket connection.

use super::protocol::ClientMessage;
use crate::{multiplexer::Origin, state::AppState};
use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

/// Axum handler to upgrade an HTTP connection to a WebSocket.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> Response {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// Main handler for an individual WebSocket connection.
///
/// The connection is added to the broadcast set for as long as it is open.
/// Outbound frames are drained from its queue by a dedicated writer task;
/// inbound transcripts are queued on the multiplexer without waiting for the
/// turn to finish, so a slow turn never blocks reading close frames.
#[instrument(name = "ws_connection", skip_all, fields(connection_id))]
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let connections = state.multiplexer.connections().clone();
    let (connection_id, mut outbound_rx) = connections.register().await;
    tracing::Span::current().record("connection_id", tracing::field::display(connection_id));
    info!("Voice client connected");

    let (mut socket_tx, mut socket_rx) = socket.split();

    let writer = tokio::spawn(async move {
        while let Some(msg) = outbound_rx.recv().await {
            let serialized = match serde_json::to_string(&msg) {
                Ok(json) => json,
                Err(e) => {
                    error!(error = %e, "Failed to serialize server message");
                    continue;
                }
            };
            if socket_tx.send(Message::Text(serialized.into())).await.is_err() {
                debug!("WebSocket send failed, client disconnected");
                break;
            }
        }
    });

    while let Some(msg_result) = socket_rx.next().await {
        match msg_result {
            Ok(Message::Text(text)) => match ClientMessage::from_frame(text.as_str()) {
                ClientMessage::Speech { text } => {
                    if text.trim().is_empty() {
                        continue;
                    }
                    info!(transcript = %text, "Received speech transcript");
                    if let Err(e) = state
                        .multiplexer
                        .submit(Origin::Connection(connection_id), text)
                        .await
                    {
                        error!(error = %e, "Failed to queue transcript");
                        break;
                    }
                }
                ClientMessage::Unknown => debug!("Ignoring unrecognised frame"),
            },
            Ok(Message::Close(_)) => {
                info!("Client sent close frame");
                break;
            }
            Ok(_) => {}
            Err(e) => {
                warn!(error = %e, "Error receiving from client WebSocket");
                break;
            }
        }
    }

    connections.unregister(connection_id).await;
    writer.abort();
    info!("Voice client disconnected");
}
