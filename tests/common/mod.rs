#![allow(
    clippy::unwrap_used,
    clippy::missing_panics_doc,
    reason = "Do not need additional syntax for setting up tests"
)]
#![allow(
    unused,
    reason = "Not every test binary uses every helper"
)]

use std::time::Duration;

use futures::channel::mpsc as stream_mpsc;
use reconnecting_ws::ws::{Observer, Transport, TransportEvent, TransportStream, WsError};
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite;
use tokio_tungstenite::tungstenite::error::ProtocolError;
use url::Url;

/// Longer than any backoff window, so auto-advancing paused time never fires it first.
pub const PATIENCE: Duration = Duration::from_secs(600);

/// One transport created by [`ScriptedTransport::open`].
pub struct Session {
    pub endpoint: Url,
    events: stream_mpsc::UnboundedSender<TransportEvent>,
}

impl Session {
    pub fn open(&self) {
        self.emit(TransportEvent::Opened);
    }

    pub fn frame(&self, frame: &str) {
        self.emit(TransportEvent::Frame(frame.to_owned()));
    }

    pub fn error(&self) {
        let reset = tungstenite::Error::Protocol(ProtocolError::ResetWithoutClosingHandshake);
        self.emit(TransportEvent::Error(WsError::Connection(reset)));
    }

    pub fn close(&self) {
        self.emit(TransportEvent::Closed);
    }

    /// Whether the connection dropped this transport.
    pub fn is_discarded(&self) -> bool {
        self.events.is_closed()
    }

    fn emit(&self, event: TransportEvent) {
        // The connection may already have dropped this transport
        drop(self.events.unbounded_send(event));
    }
}

/// Transport whose events are pushed by the test.
///
/// Every `open` hands a new [`Session`] to the receiver returned by [`ScriptedTransport::new`].
pub struct ScriptedTransport {
    sessions: mpsc::UnboundedSender<Session>,
}

impl ScriptedTransport {
    pub fn new() -> (Self, Sessions) {
        let (sessions, rx) = mpsc::unbounded_channel();
        (Self { sessions }, Sessions { rx })
    }
}

impl Transport for ScriptedTransport {
    fn open(&self, endpoint: &Url) -> TransportStream {
        let (events, stream) = stream_mpsc::unbounded();
        drop(self.sessions.send(Session {
            endpoint: endpoint.clone(),
            events,
        }));
        Box::pin(stream)
    }
}

pub struct Sessions {
    rx: mpsc::UnboundedReceiver<Session>,
}

impl Sessions {
    /// Wait for the connection to open its next transport.
    pub async fn next(&mut self) -> Session {
        timeout(PATIENCE, self.rx.recv()).await.unwrap().unwrap()
    }

    /// Number of transports opened so far and not yet taken.
    pub fn pending(&mut self) -> usize {
        let mut count = 0;
        while self.rx.try_recv().is_ok() {
            count += 1;
        }
        count
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Observed {
    Waiting { attempt: u32, delay: Duration },
    Succeeded,
    Error,
}

/// Observer forwarding every notification to a channel.
pub struct RecordingObserver {
    tx: mpsc::UnboundedSender<Observed>,
}

impl RecordingObserver {
    pub fn new() -> (Self, Observations) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, Observations { rx })
    }
}

impl Observer for RecordingObserver {
    fn on_reconnect_waiting(&self, attempt: u32, delay: Duration) {
        drop(self.tx.send(Observed::Waiting { attempt, delay }));
    }

    fn on_reconnect_succeeded(&self) {
        drop(self.tx.send(Observed::Succeeded));
    }

    fn on_error(&self, _error: &WsError) {
        drop(self.tx.send(Observed::Error));
    }
}

pub struct Observations {
    rx: mpsc::UnboundedReceiver<Observed>,
}

impl Observations {
    pub async fn next(&mut self) -> Observed {
        timeout(PATIENCE, self.rx.recv()).await.unwrap().unwrap()
    }

    /// Wait for the next retry to be scheduled and return its attempt and delay.
    pub async fn next_waiting(&mut self) -> (u32, Duration) {
        match self.next().await {
            Observed::Waiting { attempt, delay } => (attempt, delay),
            other => panic!("expected a scheduled retry, got {other:?}"),
        }
    }

    pub fn try_next(&mut self) -> Option<Observed> {
        self.rx.try_recv().ok()
    }
}

/// Message handler forwarding to a channel.
pub fn collector<M: Send + 'static>() -> (impl FnMut(M) + Send + 'static, mpsc::UnboundedReceiver<M>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (
        move |message: M| {
            drop(tx.send(message));
        },
        rx,
    )
}

pub async fn recv<M>(rx: &mut mpsc::UnboundedReceiver<M>) -> M {
    timeout(PATIENCE, rx.recv()).await.unwrap().unwrap()
}
