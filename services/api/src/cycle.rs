//! Contains the logic for one full conversation turn.

use anyhow::Result;
use deskpilot_core::{
    command,
    dispatcher::{Dispatcher, ReplySink},
    session::Session,
};
use tracing::{debug, info};

/// Handles a single user input, driving it through the send → dispatch cycle.
///
/// This involves:
/// 1.  Sending the input as a session turn and awaiting the reply.
/// 2.  Delivering the reply text to the sink of the input's origin.
/// 3.  Parsing the reply for a command block.
/// 4.  Dispatching the block, which may post further feedback turns.
///
/// Returns the top-level reply text.
pub async fn handle_turn(
    session: &mut Session,
    dispatcher: &Dispatcher,
    sink: &dyn ReplySink,
    input: &str,
) -> Result<String> {
    let reply = session.send(input).await?;
    sink.deliver(&reply).await;

    let block = command::parse(&reply);
    if block.is_empty() {
        debug!("Reply carried no command block");
        return Ok(reply);
    }

    info!(commands = block.len(), "Dispatching command block");
    dispatcher.dispatch(&block, session, sink).await?;
    Ok(reply)
}
