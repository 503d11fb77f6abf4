//! Seams between the connection and its caller.

use std::fmt;
use std::marker::PhantomData;
use std::time::Duration;

use serde::de::DeserializeOwned;

use super::error::WsError;

/// Message parser trait for converting raw text frames to messages.
///
/// A parse failure drops the frame; the connection stays open.
///
/// # Example
///
/// ```ignore
/// pub struct UpperParser;
///
/// impl MessageParser<String> for UpperParser {
///     fn parse(&self, frame: &str) -> crate::Result<String> {
///         Ok(frame.to_uppercase())
///     }
/// }
/// ```
pub trait MessageParser<M>: Send + Sync + 'static {
    fn parse(&self, frame: &str) -> crate::Result<M>;
}

/// Parses each frame as a single JSON document.
pub struct JsonParser<M> {
    _message: PhantomData<fn() -> M>,
}

impl<M> JsonParser<M> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            _message: PhantomData,
        }
    }
}

impl<M> Default for JsonParser<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> Clone for JsonParser<M> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<M> fmt::Debug for JsonParser<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("JsonParser")
    }
}

impl<M: DeserializeOwned + 'static> MessageParser<M> for JsonParser<M> {
    fn parse(&self, frame: &str) -> crate::Result<M> {
        let message = serde_json::from_str(frame).map_err(WsError::MessageParse)?;
        Ok(message)
    }
}

/// Receives every successfully parsed message, in arrival order.
///
/// Implemented for any `FnMut(M) + Send + 'static`.
pub trait MessageHandler<M>: Send + 'static {
    fn handle(&mut self, message: M);
}

impl<M, F> MessageHandler<M> for F
where
    F: FnMut(M) + Send + 'static,
{
    fn handle(&mut self, message: M) {
        self(message);
    }
}

/// Lifecycle notifications, typically used to drive a "reconnecting" indicator.
///
/// Every method defaults to a no-op. Implementations run on the connection task and
/// must not block.
pub trait Observer: Send + Sync + 'static {
    /// A retry was scheduled: `attempt` will be made after `delay`.
    fn on_reconnect_waiting(&self, _attempt: u32, _delay: Duration) {}

    /// A connection opened after at least one scheduled retry.
    fn on_reconnect_succeeded(&self) {}

    /// The transport reported an error. Retry is driven by the close that follows.
    fn on_error(&self, _error: &WsError) {}
}

impl Observer for () {}
