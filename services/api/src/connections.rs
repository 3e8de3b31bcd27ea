//! The set of open voice connections and broadcast over it.

use crate::ws::protocol::ServerMessage;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{RwLock, mpsc};
use tracing::{debug, warn};
use uuid::Uuid;

/// Outbound frames buffered per connection before broadcasts start dropping.
const OUTBOUND_CAPACITY: usize = 100;

pub type ConnectionId = Uuid;

/// Shared handle to the open connections. Cheap to clone.
#[derive(Clone, Default)]
pub struct ConnectionSet {
    inner: Arc<RwLock<HashMap<ConnectionId, mpsc::Sender<ServerMessage>>>>,
}

impl ConnectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a connection and returns its id and the receiving end of its outbound queue.
    pub async fn register(&self) -> (ConnectionId, mpsc::Receiver<ServerMessage>) {
        let id = Uuid::new_v4();
        let (tx, rx) = mpsc::channel(OUTBOUND_CAPACITY);
        self.inner.write().await.insert(id, tx);
        debug!(connection_id = %id, "Connection registered");
        (id, rx)
    }

    pub async fn unregister(&self, id: ConnectionId) {
        if self.inner.write().await.remove(&id).is_some() {
            debug!(connection_id = %id, "Connection unregistered");
        }
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }

    /// Sends `msg` to one connection. Returns false if it is gone.
    pub async fn send_to(&self, id: ConnectionId, msg: ServerMessage) -> bool {
        let sender = self.inner.read().await.get(&id).cloned();
        match sender {
            Some(tx) => self.deliver(id, &tx, msg).await,
            None => false,
        }
    }

    /// Sends `msg` to every connection open at the time of the call.
    ///
    /// The senders are snapshotted and the lock released before sending, so
    /// connections may come and go during a broadcast. Connections found closed
    /// are removed. Returns the number of connections the frame was queued for.
    pub async fn broadcast(&self, msg: ServerMessage) -> usize {
        let snapshot: Vec<(ConnectionId, mpsc::Sender<ServerMessage>)> = self
            .inner
            .read()
            .await
            .iter()
            .map(|(id, tx)| (*id, tx.clone()))
            .collect();

        let mut delivered = 0;
        for (id, tx) in snapshot {
            if self.deliver(id, &tx, msg.clone()).await {
                delivered += 1;
            }
        }
        delivered
    }

    async fn deliver(
        &self,
        id: ConnectionId,
        tx: &mpsc::Sender<ServerMessage>,
        msg: ServerMessage,
    ) -> bool {
        match tx.try_send(msg) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!(connection_id = %id, "Outbound queue full; dropping frame");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                self.unregister(id).await;
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn speak(text: &str) -> ServerMessage {
        ServerMessage::Speak {
            text: text.to_string(),
        }
    }

    #[tokio::test]
    async fn broadcast_reaches_every_open_connection() {
        let set = ConnectionSet::new();
        let (_a, mut rx_a) = set.register().await;
        let (_b, mut rx_b) = set.register().await;

        assert_eq!(set.broadcast(speak("hi")).await, 2);
        assert_eq!(rx_a.recv().await, Some(speak("hi")));
        assert_eq!(rx_b.recv().await, Some(speak("hi")));
    }

    #[tokio::test]
    async fn unregistered_connections_receive_nothing() {
        let set = ConnectionSet::new();
        let (a, mut rx_a) = set.register().await;
        let (_b, mut rx_b) = set.register().await;
        set.unregister(a).await;

        assert_eq!(set.broadcast(ServerMessage::StartListening).await, 1);
        assert_eq!(rx_b.recv().await, Some(ServerMessage::StartListening));
        assert!(rx_a.recv().await.is_none());
    }

    #[tokio::test]
    async fn dropped_receivers_are_pruned() {
        let set = ConnectionSet::new();
        let (_a, rx_a) = set.register().await;
        let (b, mut rx_b) = set.register().await;
        drop(rx_a);

        assert_eq!(set.broadcast(speak("x")).await, 1);
        assert_eq!(set.len().await, 1);
        assert!(set.send_to(b, speak("only b")).await);
        assert_eq!(rx_b.recv().await, Some(speak("x")));
        assert_eq!(rx_b.recv().await, Some(speak("only b")));
    }
}
