//! Command Dispatcher
//!
//! Executes a parsed command block strictly in order against one session.
//! Actuator failures are logged and the rest of the block still runs. Feedback
//! verbs post their payload as a new session turn and hand the oracle's answer
//! to the reply sink; those answers are not scanned for further commands.

use crate::{
    actuator::{Actuator, WindowAction},
    command::{CommandBlock, CommandLine},
    registry::Verb,
    session::Session,
    turn::TurnContent,
};
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};

pub const SEARCH_URL: &str = "https://www.google.com/search?q=";

/// Where agent output for one turn goes: the local terminal, or every
/// connected voice client.
#[async_trait]
pub trait ReplySink: Send + Sync {
    /// Delivers agent text to the listeners.
    async fn deliver(&self, text: &str);
    /// Asks the listeners to begin capturing speech.
    async fn start_listening(&self);
}

/// Builds the search URL opened by `[search]`.
pub fn search_url(query: &str) -> String {
    format!("{SEARCH_URL}{}", urlencoding::encode(query))
}

pub struct Dispatcher {
    actuator: Arc<dyn Actuator>,
}

impl Dispatcher {
    pub fn new(actuator: Arc<dyn Actuator>) -> Self {
        Self { actuator }
    }

    /// Runs every command of `block` in sequence.
    ///
    /// Only an oracle failure while posting a feedback turn aborts the block;
    /// it is returned to the caller.
    pub async fn dispatch(
        &self,
        block: &CommandBlock,
        session: &mut Session,
        sink: &dyn ReplySink,
    ) -> Result<()> {
        for command in block.iter() {
            self.execute(command, session, sink).await?;
        }
        Ok(())
    }

    async fn execute(
        &self,
        command: &CommandLine,
        session: &mut Session,
        sink: &dyn ReplySink,
    ) -> Result<()> {
        let descriptor = command.verb.descriptor();
        let arg = descriptor.argument_of(&command.arg);
        info!(verb = descriptor.tag, arg, "Executing command");

        let actuator = &self.actuator;
        let outcome = match command.verb {
            Verb::Terminal => actuator.open_terminal().await,
            Verb::AppName => actuator.launch_app(arg).await,
            Verb::Text => actuator.type_text(arg).await,
            Verb::Notify => actuator.notify(arg).await,
            Verb::Search => actuator.open_url(&search_url(arg)).await,
            Verb::File => actuator.open_file(arg).await,
            Verb::KeyPress => actuator.send_keys(arg).await,
            Verb::Window => match arg.parse::<WindowAction>() {
                Ok(action) => actuator.control_window(action).await,
                Err(e) => Err(e),
            },
            Verb::ScreenShot => match actuator.capture().await {
                Ok(image) => {
                    return self
                        .feedback(session, sink, TurnContent::Attachment(image))
                        .await;
                }
                Err(e) => Err(e),
            },
            Verb::ClipBoard => match actuator.read_clipboard().await {
                Ok(contents) => {
                    let turn = TurnContent::Text(format!("Clipboard: {contents}"));
                    return self.feedback(session, sink, turn).await;
                }
                Err(e) => Err(e),
            },
            Verb::Speak => {
                sink.deliver(arg).await;
                Ok(())
            }
            Verb::Listen => {
                sink.start_listening().await;
                Ok(())
            }
        };

        if let Err(e) = outcome {
            warn!(verb = descriptor.tag, error = %e, "Command failed; continuing with block");
        }
        Ok(())
    }

    async fn feedback(
        &self,
        session: &mut Session,
        sink: &dyn ReplySink,
        content: TurnContent,
    ) -> Result<()> {
        let reply = session.send(content).await?;
        sink.deliver(&reply).await;
        Ok(())
    }
}
