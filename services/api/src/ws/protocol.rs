//! Defines the WebSocket message protocol between the voice page and the server.
//!
//! One JSON object per frame, discriminated by `type`.

use serde::{Deserialize, Serialize};

/// Messages sent from the client (browser) to the server.
#[derive(Deserialize, Debug, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum ClientMessage {
    /// A speech-recognized transcript to submit as a conversation turn.
    #[serde(rename = "speech")]
    Speech { text: String },
    /// Any other `type`; ignored.
    #[serde(other)]
    Unknown,
}

/// Messages sent from the server to the client (browser).
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerMessage {
    /// Text the page should read aloud.
    Speak { text: String },
    /// Asks the page to begin speech capture.
    StartListening,
}

impl ClientMessage {
    /// Parses a text frame, treating malformed frames like unknown ones.
    pub fn from_frame(text: &str) -> Self {
        serde_json::from_str(text).unwrap_or(ClientMessage::Unknown)
    }
}
