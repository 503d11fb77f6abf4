use std::marker::PhantomData;

use url::Url;

use super::config::Config;
use super::connection::ReconnectingConnection;
use super::traits::{JsonParser, MessageHandler, MessageParser, Observer};
use super::transport::{Transport, WebSocketTransport};
use crate::Result;

/// Configures a [`ReconnectingConnection`] before it is started.
///
/// Defaults: [`Config::default`], frames decoded as JSON, the `tokio-tungstenite`
/// transport and no observer.
///
/// ```rust, no_run
/// use std::time::Duration;
///
/// use reconnecting_ws::ReconnectingConnection;
/// use reconnecting_ws::ws::Observer;
/// use serde::Deserialize;
///
/// #[derive(Debug, Deserialize)]
/// struct Event {
///     r#type: u32,
/// }
///
/// struct Indicator;
///
/// impl Observer for Indicator {
///     fn on_reconnect_waiting(&self, attempt: u32, delay: Duration) {
///         println!("reconnecting (attempt {attempt}) in {delay:?}");
///     }
///
///     fn on_reconnect_succeeded(&self) {
///         println!("reconnected");
///     }
/// }
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let connection = ReconnectingConnection::builder::<Event, _>("ws://localhost:8080/ws", |event: Event| {
///         println!("{event:?}");
///     })
///     .observer(Indicator)
///     .connect()?;
///
///     connection.closed().await;
///     Ok(())
/// }
/// ```
#[must_use]
pub struct Builder<M, H, P = JsonParser<M>, T = WebSocketTransport, O = ()> {
    endpoint: String,
    handler: H,
    config: Config,
    parser: P,
    transport: T,
    observer: O,
    _message: PhantomData<fn() -> M>,
}

impl<M, H> Builder<M, H>
where
    H: MessageHandler<M>,
{
    pub(crate) fn new(endpoint: &str, handler: H) -> Self {
        Self {
            endpoint: endpoint.to_owned(),
            handler,
            config: Config::default(),
            parser: JsonParser::new(),
            transport: WebSocketTransport,
            observer: (),
            _message: PhantomData,
        }
    }
}

impl<M, H, P, T, O> Builder<M, H, P, T, O> {
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Replace the frame decoder.
    pub fn parser<P2: MessageParser<M>>(self, parser: P2) -> Builder<M, H, P2, T, O> {
        Builder {
            endpoint: self.endpoint,
            handler: self.handler,
            config: self.config,
            parser,
            transport: self.transport,
            observer: self.observer,
            _message: PhantomData,
        }
    }

    /// Replace the transport every connection attempt is made with.
    pub fn transport<T2: Transport>(self, transport: T2) -> Builder<M, H, P, T2, O> {
        Builder {
            endpoint: self.endpoint,
            handler: self.handler,
            config: self.config,
            parser: self.parser,
            transport,
            observer: self.observer,
            _message: PhantomData,
        }
    }

    /// Receive lifecycle notifications.
    pub fn observer<O2: Observer>(self, observer: O2) -> Builder<M, H, P, T, O2> {
        Builder {
            endpoint: self.endpoint,
            handler: self.handler,
            config: self.config,
            parser: self.parser,
            transport: self.transport,
            observer,
            _message: PhantomData,
        }
    }

    /// Validate the endpoint and start connecting in the background.
    ///
    /// Fails with [`Kind::Construction`](crate::error::Kind::Construction) when the
    /// endpoint is not a URL, the transport rejects it, or no tokio runtime is running.
    /// These failures are never retried.
    pub fn connect(self) -> Result<ReconnectingConnection>
    where
        M: Send + 'static,
        H: MessageHandler<M>,
        P: MessageParser<M>,
        T: Transport,
        O: Observer,
    {
        let endpoint = Url::parse(&self.endpoint)?;

        ReconnectingConnection::spawn(
            endpoint,
            self.config,
            self.handler,
            self.parser,
            self.transport,
            self.observer,
        )
    }
}
