//! Input Multiplexer
//!
//! Owns the single conversation session and serializes turns from every input
//! source onto it. Inputs are queued on one FIFO channel drained by a single
//! worker task; a request's whole cycle, feedback turns included, finishes
//! before the next request is taken, so at most one turn is ever in flight.

use crate::{
    connections::{ConnectionId, ConnectionSet},
    cycle::handle_turn,
    sink::{BroadcastSink, TerminalSink},
    ws::protocol::ServerMessage,
};
use deskpilot_core::{
    dispatcher::{Dispatcher, ReplySink},
    session::Session,
};
use std::fmt;
use std::time::Duration;
use tokio::{
    sync::{mpsc, oneshot},
    task::JoinHandle,
};
use tracing::{Instrument, error, info, info_span};

const QUEUE_CAPACITY: usize = 64;

/// Spoken to a connection whose turn failed. Raw errors never reach browsers.
pub const FAILURE_NOTICE: &str = "Sorry, I couldn't complete that request.";

/// Where a turn came from, which decides where its output goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Terminal,
    Connection(ConnectionId),
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Origin::Terminal => write!(f, "terminal"),
            Origin::Connection(id) => write!(f, "connection:{id}"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TurnError {
    #[error("input was empty")]
    EmptyInput,
    #[error("turn failed: {0:#}")]
    Failed(anyhow::Error),
    #[error("turn timed out after {0:?}")]
    TimedOut(Duration),
    #[error("multiplexer is shut down")]
    Closed,
}

struct TurnRequest {
    origin: Origin,
    text: String,
    done: oneshot::Sender<Result<String, TurnError>>,
}

/// Resolves once the submitted turn's full cycle has completed.
pub struct TurnTicket(oneshot::Receiver<Result<String, TurnError>>);

impl TurnTicket {
    /// Waits for the turn and returns its top-level reply.
    pub async fn outcome(self) -> Result<String, TurnError> {
        self.0.await.unwrap_or(Err(TurnError::Closed))
    }
}

/// Cheap-to-clone handle to the multiplexer worker.
#[derive(Clone)]
pub struct Multiplexer {
    queue_tx: mpsc::Sender<TurnRequest>,
    connections: ConnectionSet,
}

impl Multiplexer {
    /// Spawns the worker that owns `session` and returns a handle to it.
    ///
    /// With `turn_timeout` set, a cycle that exceeds it is abandoned before the
    /// next request is dequeued, so later turns never overtake it.
    pub fn spawn(
        session: Session,
        dispatcher: Dispatcher,
        connections: ConnectionSet,
        turn_timeout: Option<Duration>,
    ) -> (Self, JoinHandle<()>) {
        let (queue_tx, queue_rx) = mpsc::channel(QUEUE_CAPACITY);
        let handle = tokio::spawn(worker_loop(
            session,
            dispatcher,
            connections.clone(),
            turn_timeout,
            queue_rx,
        ));
        (
            Self {
                queue_tx,
                connections,
            },
            handle,
        )
    }

    /// Queues one input for the session.
    ///
    /// The returned ticket may be awaited for the outcome or dropped; the turn
    /// runs either way.
    pub async fn submit(
        &self,
        origin: Origin,
        text: impl Into<String>,
    ) -> Result<TurnTicket, TurnError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(TurnError::EmptyInput);
        }
        let (done, ticket) = oneshot::channel();
        self.queue_tx
            .send(TurnRequest { origin, text, done })
            .await
            .map_err(|_| TurnError::Closed)?;
        Ok(TurnTicket(ticket))
    }

    pub fn connections(&self) -> &ConnectionSet {
        &self.connections
    }

    /// Asks every open connection to start listening. Independent of the turn queue.
    pub async fn trigger_listen(&self) -> usize {
        self.connections
            .broadcast(ServerMessage::StartListening)
            .await
    }
}

async fn worker_loop(
    mut session: Session,
    dispatcher: Dispatcher,
    connections: ConnectionSet,
    turn_timeout: Option<Duration>,
    mut queue_rx: mpsc::Receiver<TurnRequest>,
) {
    let terminal = TerminalSink;
    let broadcast = BroadcastSink::new(connections.clone());

    while let Some(request) = queue_rx.recv().await {
        let sink: &dyn ReplySink = match request.origin {
            Origin::Terminal => &terminal,
            Origin::Connection(_) => &broadcast,
        };
        let span = info_span!("turn", origin = %request.origin);

        let outcome = async {
            info!("Processing turn");
            let cycle = handle_turn(&mut session, &dispatcher, sink, &request.text);
            let outcome = match turn_timeout {
                Some(limit) => match tokio::time::timeout(limit, cycle).await {
                    Ok(result) => result.map_err(TurnError::Failed),
                    Err(_) => Err(TurnError::TimedOut(limit)),
                },
                None => cycle.await.map_err(TurnError::Failed),
            };
            if let Err(e) = &outcome {
                error!(error = %e, "Turn failed");
            }
            outcome
        }
        .instrument(span)
        .await;

        if outcome.is_err() {
            if let Origin::Connection(id) = request.origin {
                connections
                    .send_to(
                        id,
                        ServerMessage::Speak {
                            text: FAILURE_NOTICE.to_string(),
                        },
                    )
                    .await;
            }
        }
        // The submitter may have dropped its ticket.
        let _ = request.done.send(outcome);
    }
    info!("Turn queue closed; multiplexer worker exiting");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ProbeClient, StubActuator};
    use std::sync::{Arc, atomic::Ordering};

    async fn spawn_with(
        client: Arc<ProbeClient>,
        actuator: Arc<StubActuator>,
        turn_timeout: Option<Duration>,
    ) -> Multiplexer {
        let session = Session::start(client, "prime").await.unwrap();
        let (mux, _worker) = Multiplexer::spawn(
            session,
            Dispatcher::new(actuator),
            ConnectionSet::new(),
            turn_timeout,
        );
        mux
    }

    fn speak(text: &str) -> ServerMessage {
        ServerMessage::Speak {
            text: text.to_string(),
        }
    }

    #[tokio::test]
    async fn turns_from_all_sources_are_serialized() {
        let client = ProbeClient::new(Duration::from_millis(20), |turn| {
            Ok(match turn.content.as_text() {
                Some("first") => "Taking a look.\n[Command]\n[screenShot]".to_string(),
                Some(text) => format!("ack {text}"),
                None => "I see your desktop.".to_string(),
            })
        });
        let actuator = Arc::new(StubActuator::default());
        let mux = spawn_with(client.clone(), actuator.clone(), None).await;
        let (conn, _rx) = mux.connections().register().await;

        // Queued in this order; the worker drains the queue FIFO.
        let first = mux.submit(Origin::Terminal, "first").await.unwrap();
        let second = mux
            .submit(Origin::Connection(conn), "second")
            .await
            .unwrap();
        let (first, second) = tokio::join!(first.outcome(), second.outcome());
        assert!(first.is_ok());
        assert_eq!(second.unwrap(), "ack second");

        assert_eq!(client.max_in_flight.load(Ordering::SeqCst), 1);
        assert_eq!(actuator.captures.load(Ordering::SeqCst), 1);

        // The screenshot feedback turn belongs to "first" and precedes "second".
        assert_eq!(
            client.received_texts(),
            vec!["prime", "first", "<attachment>", "second"]
        );
    }

    #[tokio::test]
    async fn connection_turns_are_broadcast_to_every_listener() {
        let client = ProbeClient::new(Duration::ZERO, |_| Ok("Hello everyone".to_string()));
        let mux = spawn_with(client, Arc::new(StubActuator::default()), None).await;
        let (_c1, mut rx1) = mux.connections().register().await;
        let (c2, mut rx2) = mux.connections().register().await;
        let (c3, mut rx3) = mux.connections().register().await;

        mux.submit(Origin::Connection(c2), "hi")
            .await
            .unwrap()
            .outcome()
            .await
            .unwrap();

        for rx in [&mut rx1, &mut rx2, &mut rx3] {
            assert_eq!(rx.recv().await, Some(speak("Hello everyone")));
        }

        mux.connections().unregister(c3).await;
        assert_eq!(mux.trigger_listen().await, 2);
        assert_eq!(rx1.recv().await, Some(ServerMessage::StartListening));
        assert_eq!(rx2.recv().await, Some(ServerMessage::StartListening));
        assert_eq!(rx3.recv().await, None);
    }

    #[tokio::test]
    async fn terminal_turns_are_not_broadcast() {
        let client = ProbeClient::new(Duration::ZERO, |_| Ok("local only".to_string()));
        let mux = spawn_with(client, Arc::new(StubActuator::default()), None).await;
        let (_conn, mut rx) = mux.connections().register().await;

        let reply = mux
            .submit(Origin::Terminal, "hello")
            .await
            .unwrap()
            .outcome()
            .await
            .unwrap();
        assert_eq!(reply, "local only");
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn failed_turn_is_reported_to_its_origin_only() {
        let client = ProbeClient::new(Duration::ZERO, |turn| match turn.content.as_text() {
            Some("boom") => Err(anyhow::anyhow!("upstream 503")),
            _ => Ok("fine".to_string()),
        });
        let mux = spawn_with(client, Arc::new(StubActuator::default()), None).await;
        let (origin, mut origin_rx) = mux.connections().register().await;
        let (_other, mut other_rx) = mux.connections().register().await;

        let outcome = mux
            .submit(Origin::Connection(origin), "boom")
            .await
            .unwrap()
            .outcome()
            .await;
        assert!(matches!(outcome, Err(TurnError::Failed(_))));
        assert_eq!(origin_rx.recv().await, Some(speak(FAILURE_NOTICE)));
        assert!(other_rx.try_recv().is_err());

        // The multiplexer keeps serving.
        let reply = mux
            .submit(Origin::Connection(origin), "again")
            .await
            .unwrap()
            .outcome()
            .await
            .unwrap();
        assert_eq!(reply, "fine");
    }

    #[tokio::test]
    async fn timed_out_turns_keep_their_order() {
        let client = ProbeClient::new(Duration::from_millis(200), |turn| {
            Ok(format!("ack {}", turn.content.as_text().unwrap_or_default()))
        });
        let session = Session::start(client.clone(), "prime").await.unwrap();
        let (mux, _worker) = Multiplexer::spawn(
            session,
            Dispatcher::new(Arc::new(StubActuator::default())),
            ConnectionSet::new(),
            Some(Duration::from_millis(50)),
        );

        let slow = mux.submit(Origin::Terminal, "slow").await.unwrap();
        let next = mux.submit(Origin::Terminal, "next").await.unwrap();

        assert!(matches!(slow.outcome().await, Err(TurnError::TimedOut(_))));
        assert!(matches!(next.outcome().await, Err(TurnError::TimedOut(_))));
        assert_eq!(client.received_texts(), vec!["prime", "slow", "next"]);
        assert_eq!(client.max_in_flight.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn blank_input_is_rejected() {
        let client = ProbeClient::new(Duration::ZERO, |_| Ok("ok".to_string()));
        let mux = spawn_with(client.clone(), Arc::new(StubActuator::default()), None).await;

        assert!(matches!(
            mux.submit(Origin::Terminal, "   ").await,
            Err(TurnError::EmptyInput)
        ));
        assert_eq!(client.received_texts(), vec!["prime"]);
    }
}
