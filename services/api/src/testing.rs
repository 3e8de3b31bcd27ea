//! Fakes shared by the unit tests of this crate.

use anyhow::Result;
use async_trait::async_trait;
use deskpilot_core::{
    actuator::{Actuator, ActuatorResult, WindowAction},
    llm_client::LLMClient,
    turn::{Attachment, Turn},
};
use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};
use std::time::Duration;

type Responder = dyn Fn(&Turn) -> Result<String> + Send + Sync;

/// An oracle that answers through a closure after a delay, recording every
/// turn and the peak number of concurrent calls.
pub struct ProbeClient {
    delay: Duration,
    responder: Box<Responder>,
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
    received: Mutex<Vec<Turn>>,
}

struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl ProbeClient {
    pub fn new(
        delay: Duration,
        responder: impl Fn(&Turn) -> Result<String> + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            delay,
            responder: Box::new(responder),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            received: Mutex::new(Vec::new()),
        })
    }

    pub fn received(&self) -> Vec<Turn> {
        self.received.lock().unwrap().clone()
    }

    pub fn received_texts(&self) -> Vec<String> {
        self.received()
            .iter()
            .map(|turn| {
                turn.content
                    .as_text()
                    .unwrap_or("<attachment>")
                    .to_string()
            })
            .collect()
    }
}

#[async_trait]
impl LLMClient for ProbeClient {
    async fn respond(&self, _history: &[Turn], turn: &Turn) -> Result<String> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        let _guard = InFlight(&self.in_flight);
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        self.received.lock().unwrap().push(turn.clone());
        tokio::time::sleep(self.delay).await;
        (self.responder)(turn)
    }
}

/// An actuator whose every action succeeds; capture returns a tiny PNG payload.
#[derive(Default)]
pub struct StubActuator {
    pub captures: AtomicUsize,
}

#[async_trait]
impl Actuator for StubActuator {
    async fn open_terminal(&self) -> ActuatorResult<()> {
        Ok(())
    }
    async fn launch_app(&self, _name: &str) -> ActuatorResult<()> {
        Ok(())
    }
    async fn type_text(&self, _text: &str) -> ActuatorResult<()> {
        Ok(())
    }
    async fn capture(&self) -> ActuatorResult<Attachment> {
        self.captures.fetch_add(1, Ordering::SeqCst);
        Ok(Attachment::new("image/png", vec![0x89, b'P', b'N', b'G']))
    }
    async fn read_clipboard(&self) -> ActuatorResult<String> {
        Ok(String::new())
    }
    async fn notify(&self, _message: &str) -> ActuatorResult<()> {
        Ok(())
    }
    async fn open_url(&self, _url: &str) -> ActuatorResult<()> {
        Ok(())
    }
    async fn open_file(&self, _path: &str) -> ActuatorResult<()> {
        Ok(())
    }
    async fn send_keys(&self, _keys: &str) -> ActuatorResult<()> {
        Ok(())
    }
    async fn control_window(&self, _action: WindowAction) -> ActuatorResult<()> {
        Ok(())
    }
}
