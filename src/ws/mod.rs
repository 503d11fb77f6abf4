//! Reconnecting WebSocket infrastructure.
//!
//! # Architecture
//!
//! - [`ReconnectingConnection`]: owns one transport at a time and reopens it with
//!   full-jitter exponential backoff after every close
//! - [`Transport`]: opens a connection and reports its lifecycle as [`TransportEvent`]s
//! - [`MessageParser`]: decodes text frames, [`JsonParser`] by default
//! - [`MessageHandler`]: receives decoded messages
//! - [`Observer`]: "reconnecting" / "reconnected" / error notifications
//!
//! # Example
//!
//! ```ignore
//! let connection = ReconnectingConnection::builder(endpoint, |msg: MyMessage| apply(msg))
//!     .config(config)
//!     .observer(StatusBar::new())
//!     .connect()?;
//! ```

pub mod builder;
pub mod config;
pub mod connection;
pub mod error;
pub mod jitter;
pub mod traits;
pub mod transport;

pub use builder::Builder;
pub use connection::{ConnectionState, ReconnectingConnection};
#[expect(
    clippy::module_name_repetitions,
    reason = "WsError includes module name for clarity when used outside this module"
)]
pub use error::WsError;
pub use traits::*;
pub use transport::{Transport, TransportEvent, TransportStream, WebSocketTransport};
