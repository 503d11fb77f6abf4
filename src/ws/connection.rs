#![expect(
    clippy::module_name_repetitions,
    reason = "Connection types expose their domain in the name for clarity"
)]

use std::marker::PhantomData;
use std::time::{Duration, Instant};

use backoff::backoff::Backoff as _;
use futures::StreamExt as _;
use serde_json::Value;
use tokio::sync::watch;
use tokio::time::{self, sleep};
use tokio_util::sync::CancellationToken;
use url::Url;

use super::jitter::FullJitterBackoff;
use super::builder::Builder;
use super::config::Config;
use super::traits::{MessageHandler, MessageParser, Observer};
use super::transport::{Transport, TransportEvent, TransportStream};
use crate::Result;

/// Connection state tracking.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// A transport is being opened
    Connecting {
        /// Attempt number, starting at 1
        attempt: u32,
    },
    /// Successfully connected
    Open {
        /// When the connection was established
        since: Instant,
    },
    /// The transport closed and a retry is scheduled
    WaitingToRetry {
        /// Attempt number whose backoff window produced `delay`
        attempt: u32,
        /// Time until the next transport is opened
        delay: Duration,
    },
    /// Shut down by the caller or out of reconnection attempts
    Closed,
}

impl ConnectionState {
    /// Check if the connection is currently active.
    #[must_use]
    pub const fn is_open(self) -> bool {
        matches!(self, Self::Open { .. })
    }
}

/// A persistent connection that reopens itself after every disconnect.
///
/// Construction validates the endpoint and spawns a background task that owns the
/// transport, the attempt counter and the retry timer. Every transport event is
/// handled by that task, one at a time, in arrival order. Inbound frames are parsed
/// and handed to the message handler only while the connection is open. After any
/// close the task waits a full-jitter backoff delay and opens a new transport to the
/// same endpoint, forever unless [`ReconnectConfig::max_attempts`] says otherwise.
///
/// Dropping the handle shuts the connection down.
///
/// # Example
///
/// ```rust, no_run
/// use reconnecting_ws::ReconnectingConnection;
/// use serde_json::Value;
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let connection = ReconnectingConnection::new("ws://localhost:8080/ws", |message: Value| {
///         println!("{message}");
///     })?;
///
///     let mut state = connection.state_receiver();
///     while state.changed().await.is_ok() {
///         println!("{:?}", *state.borrow());
///     }
///
///     Ok(())
/// }
/// ```
///
/// [`ReconnectConfig::max_attempts`]: super::config::ReconnectConfig::max_attempts
#[derive(Debug)]
pub struct ReconnectingConnection {
    endpoint: Url,
    state_rx: watch::Receiver<ConnectionState>,
    cancel: CancellationToken,
}

impl ReconnectingConnection {
    /// Connect to `endpoint` with the default configuration, decoding every frame as
    /// JSON and passing it to `handler`.
    pub fn new<H>(endpoint: &str, handler: H) -> Result<Self>
    where
        H: MessageHandler<Value>,
    {
        Self::builder::<Value, H>(endpoint, handler).connect()
    }

    /// Start configuring a connection. See [`Builder`].
    pub fn builder<M, H>(endpoint: &str, handler: H) -> Builder<M, H>
    where
        H: MessageHandler<M>,
    {
        Builder::new(endpoint, handler)
    }

    pub(crate) fn spawn<M, H, P, T, O>(
        endpoint: Url,
        config: Config,
        handler: H,
        parser: P,
        transport: T,
        observer: O,
    ) -> Result<Self>
    where
        M: Send + 'static,
        H: MessageHandler<M>,
        P: MessageParser<M>,
        T: Transport,
        O: Observer,
    {
        transport.validate(&endpoint)?;
        let runtime = tokio::runtime::Handle::try_current()?;

        let backoff: FullJitterBackoff = config.reconnect.clone().into();
        let (state_tx, state_rx) = watch::channel(ConnectionState::Connecting {
            attempt: backoff.attempt(),
        });
        let cancel = CancellationToken::new();

        let driver = Driver {
            endpoint: endpoint.clone(),
            config,
            handler,
            parser,
            transport,
            observer,
            backoff,
            state_tx,
            cancel: cancel.clone(),
            reconnecting: false,
            _message: PhantomData,
        };
        runtime.spawn(driver.run());

        Ok(Self {
            endpoint,
            state_rx,
            cancel,
        })
    }

    /// The endpoint every transport is opened to.
    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Get the current connection state.
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        *self.state_rx.borrow()
    }

    /// Subscribe to connection state changes.
    #[must_use]
    pub fn state_receiver(&self) -> watch::Receiver<ConnectionState> {
        self.state_rx.clone()
    }

    /// Shut the connection down.
    ///
    /// A pending retry is cancelled and the active transport is dropped. Once the
    /// background task observes the request no further handler or observer calls are
    /// made. Calling this more than once has no further effect.
    pub fn close(&self) {
        self.cancel.cancel();
    }

    /// Wait until the connection has reached [`ConnectionState::Closed`].
    pub async fn closed(&self) {
        let mut state_rx = self.state_rx.clone();
        _ = state_rx
            .wait_for(|state| matches!(state, ConnectionState::Closed))
            .await;
    }
}

impl Drop for ReconnectingConnection {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Why the current transport stopped being driven.
enum Exit {
    Closed,
    Cancelled,
}

/// State machine owned by the background task.
struct Driver<M, H, P, T, O> {
    endpoint: Url,
    config: Config,
    handler: H,
    parser: P,
    transport: T,
    observer: O,
    backoff: FullJitterBackoff,
    state_tx: watch::Sender<ConnectionState>,
    cancel: CancellationToken,
    /// Set when a retry is scheduled, cleared by the next successful open
    reconnecting: bool,
    _message: PhantomData<fn() -> M>,
}

impl<M, H, P, T, O> Driver<M, H, P, T, O>
where
    M: Send + 'static,
    H: MessageHandler<M>,
    P: MessageParser<M>,
    T: Transport,
    O: Observer,
{
    async fn run(mut self) {
        let cancel = self.cancel.clone();

        loop {
            let attempt = self.backoff.attempt();
            self.set_state(ConnectionState::Connecting { attempt });

            #[cfg(feature = "tracing")]
            tracing::debug!(endpoint = %self.endpoint, attempt, "Opening transport");

            let mut transport = self.transport.open(&self.endpoint);
            let exit = self.drive(&mut transport).await;
            drop(transport);

            if matches!(exit, Exit::Cancelled) {
                break;
            }

            // An open during `drive` resets the counter
            let attempt = self.backoff.attempt();
            let Some(delay) = self.backoff.next_backoff() else {
                #[cfg(feature = "tracing")]
                tracing::warn!(
                    endpoint = %self.endpoint,
                    attempt,
                    "Reconnection attempts exhausted"
                );
                break;
            };

            self.reconnecting = true;
            self.set_state(ConnectionState::WaitingToRetry { attempt, delay });
            self.observer.on_reconnect_waiting(attempt, delay);

            #[cfg(feature = "tracing")]
            tracing::info!(endpoint = %self.endpoint, attempt, ?delay, "Reconnecting after delay");

            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                () = sleep(delay) => {}
            }
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(endpoint = %self.endpoint, "Connection closed");

        self.set_state(ConnectionState::Closed);
    }

    /// Handle events of one transport until it closes or the caller shuts down.
    async fn drive(&mut self, transport: &mut TransportStream) -> Exit {
        let cancel = self.cancel.clone();
        let mut open = false;
        let mut error_deadline: Option<time::Instant> = None;

        loop {
            tokio::select! {
                biased;

                () = cancel.cancelled() => return Exit::Cancelled,

                () = time::sleep_until(error_deadline.unwrap_or_else(time::Instant::now)),
                    if error_deadline.is_some() =>
                {
                    #[cfg(feature = "tracing")]
                    tracing::warn!(
                        endpoint = %self.endpoint,
                        grace = ?self.config.error_grace_period,
                        "No close after transport error, treating as closed"
                    );
                    return Exit::Closed;
                }

                event = transport.next() => match event {
                    Some(TransportEvent::Opened) => {
                        open = true;
                        error_deadline = None;
                        self.on_open();
                    }
                    Some(TransportEvent::Frame(frame)) => {
                        // Only silence after an error counts as a close
                        if let Some(deadline) = error_deadline.as_mut() {
                            *deadline = time::Instant::now() + self.config.error_grace_period;
                        }

                        if open {
                            self.deliver(&frame);
                        } else {
                            #[cfg(feature = "tracing")]
                            tracing::debug!("Ignoring frame received before open");
                        }
                    }
                    Some(TransportEvent::Error(error)) => {
                        #[cfg(feature = "tracing")]
                        tracing::warn!(endpoint = %self.endpoint, %error, "Transport error");
                        self.observer.on_error(&error);
                        error_deadline.get_or_insert_with(|| {
                            time::Instant::now() + self.config.error_grace_period
                        });
                    }
                    Some(TransportEvent::Closed) | None => {
                        #[cfg(feature = "tracing")]
                        tracing::debug!(endpoint = %self.endpoint, was_open = open, "Transport closed");
                        return Exit::Closed;
                    }
                },
            }
        }
    }

    fn on_open(&mut self) {
        self.backoff.reset();
        self.set_state(ConnectionState::Open {
            since: Instant::now(),
        });

        #[cfg(feature = "tracing")]
        tracing::info!(endpoint = %self.endpoint, "Connection open");

        if std::mem::take(&mut self.reconnecting) {
            self.observer.on_reconnect_succeeded();
        }
    }

    fn deliver(&mut self, frame: &str) {
        match self.parser.parse(frame) {
            Ok(message) => self.handler.handle(message),
            Err(e) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(%frame, error = %e, "Dropping malformed frame");
                #[cfg(not(feature = "tracing"))]
                let _ = (&frame, &e);
            }
        }
    }

    fn set_state(&self, state: ConnectionState) {
        self.state_tx.send_replace(state);
    }
}
