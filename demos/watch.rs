//! Follow a WebSocket status feed and keep following it across server restarts.
//!
//! Every JSON message is logged, along with the reconnect status a dashboard would
//! show while the server is away.
//!
//! Run with tracing enabled:
//! ```sh
//! RUST_LOG=info cargo run --example watch --features tracing -- ws://localhost:8020/websocket
//! ```

use std::time::Duration;

use reconnecting_ws::ReconnectingConnection;
use reconnecting_ws::ws::config::{Config, ReconnectConfig};
use reconnecting_ws::ws::{Observer, WsError};
use serde_json::Value;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Stands in for the "waiting to reconnect" banner of a web dashboard.
struct StatusBanner;

impl Observer for StatusBanner {
    fn on_reconnect_waiting(&self, attempt: u32, delay: Duration) {
        warn!(attempt, ?delay, "Connection lost, waiting to reconnect");
    }

    fn on_reconnect_succeeded(&self) {
        info!("Reconnected");
    }

    fn on_error(&self, error: &WsError) {
        warn!(%error, "Transport error");
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let endpoint = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "ws://localhost:8020/websocket".to_owned());

    let config = Config::builder()
        .reconnect(
            ReconnectConfig::builder()
                .max_interval(Duration::from_secs(30))
                .build(),
        )
        .build();

    let connection = ReconnectingConnection::builder::<Value, _>(&endpoint, |message: Value| {
        let kind = message.get("type").and_then(Value::as_u64);
        info!(?kind, data = %message.get("data").unwrap_or(&Value::Null), "Message");
    })
    .config(config)
    .observer(StatusBanner)
    .connect()?;

    info!(endpoint = %connection.endpoint(), "Watching, press Ctrl-C to stop");

    tokio::signal::ctrl_c().await?;
    connection.close();
    connection.closed().await;

    info!("Stopped");
    Ok(())
}
