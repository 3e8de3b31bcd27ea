//! The local prompt loops.
//!
//! Each line read is one turn. Both loops return when input is exhausted or
//! the read fails.

use crate::multiplexer::{Multiplexer, Origin, TurnError};
use anyhow::Result;
use deskpilot_core::session::Session;
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, error};

fn prompt() -> Result<()> {
    print!("> ");
    std::io::stdout().flush()?;
    Ok(())
}

async fn next_line<R>(lines: &mut tokio::io::Lines<R>) -> Option<String>
where
    R: AsyncBufRead + Unpin,
{
    match lines.next_line().await {
        Ok(line) => line,
        Err(e) => {
            debug!(error = %e, "Stopped reading input");
            None
        }
    }
}

/// Feeds lines into the multiplexer as terminal turns, waiting for each turn
/// (including its dispatched commands) before reading the next line.
///
/// A failed turn is logged and the loop continues.
pub async fn run_prompt_loop<R>(multiplexer: &Multiplexer, input: R) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    loop {
        prompt()?;
        let Some(line) = next_line(&mut lines).await else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }
        let ticket = match multiplexer.submit(Origin::Terminal, line).await {
            Ok(ticket) => ticket,
            Err(TurnError::Closed) => break,
            Err(e) => {
                error!(error = %e, "Could not submit input");
                continue;
            }
        };
        if let Err(e) = ticket.outcome().await {
            error!(error = %e, "Turn failed");
        }
    }
    Ok(())
}

/// Question-answering loop: replies are printed, never dispatched.
pub async fn run_ask_loop<R>(session: &mut Session, input: R) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    loop {
        prompt()?;
        let Some(question) = next_line(&mut lines).await else {
            break;
        };
        if question.trim().is_empty() {
            continue;
        }
        match session.send(question).await {
            Ok(reply) => println!("{reply}"),
            Err(e) => error!(error = %e, "Question failed"),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        connections::ConnectionSet,
        testing::{ProbeClient, StubActuator},
    };
    use deskpilot_core::dispatcher::Dispatcher;
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn prompt_loop_submits_each_non_blank_line() {
        let client = ProbeClient::new(Duration::ZERO, |turn| match turn.content.as_text() {
            Some("break") => Err(anyhow::anyhow!("oracle down")),
            _ => Ok("ok".to_string()),
        });
        let session = Session::start(client.clone(), "prime").await.unwrap();
        let (mux, _worker) = Multiplexer::spawn(
            session,
            Dispatcher::new(Arc::new(StubActuator::default())),
            ConnectionSet::new(),
            None,
        );

        run_prompt_loop(&mux, &b"hello\n\n   \nbreak\nworld\n"[..])
            .await
            .unwrap();

        assert_eq!(
            client.received_texts(),
            vec!["prime", "hello", "break", "world"]
        );
    }

    #[tokio::test]
    async fn ask_loop_sends_questions_without_dispatch() {
        let client = ProbeClient::new(Duration::ZERO, |_| Ok("[Command]\n[terminal]".to_string()));
        let mut session = Session::start(client.clone(), "context").await.unwrap();

        run_ask_loop(&mut session, &b"what is it?\n"[..]).await.unwrap();

        assert_eq!(client.received_texts(), vec!["context", "what is it?"]);
        assert_eq!(session.history().len(), 4);
    }
}
