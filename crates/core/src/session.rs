//! Conversation Session
//!
//! The session owns the ordered, append-only turn history exchanged with the
//! oracle. Sending requires `&mut self`, so only one turn can ever be in flight
//! for a given session; whoever owns the session is the unit of serialization.

use crate::{
    llm_client::LLMClient,
    turn::{Turn, TurnContent},
};
use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info};

pub struct Session {
    client: Arc<dyn LLMClient>,
    history: Vec<Turn>,
}

impl Session {
    /// Opens a session by sending the system instruction as its first turn.
    ///
    /// This is the only way to obtain a `Session`, so no caller-supplied turn
    /// can precede the instruction.
    pub async fn start(client: Arc<dyn LLMClient>, instruction: &str) -> Result<Self> {
        let mut session = Self {
            client,
            history: Vec::new(),
        };
        let ack = session.send(TurnContent::Text(instruction.to_string())).await?;
        debug!(ack = %ack, "System instruction acknowledged");
        info!("Conversation session primed");
        Ok(session)
    }

    /// Submits one turn and returns the oracle's full reply text.
    ///
    /// The turn and its reply are only committed to the history once the reply
    /// has arrived; a failed or abandoned call leaves the history untouched.
    pub async fn send(&mut self, content: impl Into<TurnContent>) -> Result<String> {
        let turn = Turn::user(content);
        let reply = self.client.respond(&self.history, &turn).await?;
        self.history.push(turn);
        self.history.push(Turn::model(reply.clone()));
        Ok(reply)
    }

    /// The committed turns, oldest first.
    pub fn history(&self) -> &[Turn] {
        &self.history
    }
}
