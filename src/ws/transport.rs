#![expect(
    clippy::module_name_repetitions,
    reason = "Transport types expose their domain in the name for clarity"
)]

use async_stream::stream;
use futures::StreamExt as _;
use futures::stream::BoxStream;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::client::IntoClientRequest as _;
use url::Url;

use super::error::WsError;
use crate::Result;

/// Lifecycle events of a single transport, in the order they happen.
///
/// A transport yields at most one [`TransportEvent::Opened`], any number of frames and
/// errors, and ends with [`TransportEvent::Closed`] (or simply ends). A failed open is
/// reported as an error followed by a close, without `Opened`.
#[non_exhaustive]
#[derive(Debug)]
pub enum TransportEvent {
    /// The connection was established
    Opened,
    /// A text frame arrived
    Frame(String),
    /// The transport failed; a close is expected to follow
    Error(WsError),
    /// The connection is gone
    Closed,
}

pub type TransportStream = BoxStream<'static, TransportEvent>;

/// A duplex message transport that can be opened repeatedly to the same endpoint.
///
/// Every call to [`Transport::open`] must create a brand-new connection.
pub trait Transport: Send + Sync + 'static {
    /// Synchronous check run once at construction. Failure is never retried.
    fn validate(&self, _endpoint: &Url) -> Result<()> {
        Ok(())
    }

    fn open(&self, endpoint: &Url) -> TransportStream;
}

/// [`Transport`] backed by `tokio-tungstenite`.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, Default)]
pub struct WebSocketTransport;

impl Transport for WebSocketTransport {
    fn validate(&self, endpoint: &Url) -> Result<()> {
        match endpoint.scheme() {
            "ws" | "wss" => {}
            scheme => {
                return Err(WsError::InvalidEndpoint(format!("unsupported scheme `{scheme}`")).into());
            }
        }

        endpoint
            .as_str()
            .into_client_request()
            .map_err(|e| WsError::InvalidEndpoint(e.to_string()))?;

        Ok(())
    }

    fn open(&self, endpoint: &Url) -> TransportStream {
        let endpoint = endpoint.to_string();

        Box::pin(stream! {
            match connect_async(endpoint.as_str()).await {
                Ok((mut ws_stream, _)) => {
                    yield TransportEvent::Opened;

                    while let Some(message) = ws_stream.next().await {
                        match message {
                            Ok(Message::Text(text)) => {
                                yield TransportEvent::Frame(text.to_string());
                            }
                            Ok(Message::Close(_)) => break,
                            Err(e) => {
                                yield TransportEvent::Error(WsError::Connection(e));
                                break;
                            }
                            _ => {
                                // Ignore binary frames and control frames.
                            }
                        }
                    }
                }
                Err(e) => {
                    #[cfg(feature = "tracing")]
                    tracing::warn!(%endpoint, error = %e, "Unable to connect");
                    yield TransportEvent::Error(WsError::Connection(e));
                }
            }

            yield TransportEvent::Closed;
        })
    }
}
