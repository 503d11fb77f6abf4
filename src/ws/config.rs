#![expect(
    clippy::module_name_repetitions,
    reason = "Configuration types intentionally mirror the module name for clarity"
)]

use std::time::Duration;

use bon::Builder;

use super::jitter::FullJitterBackoff;

const DEFAULT_ERROR_GRACE_PERIOD: Duration = Duration::from_secs(5);
const DEFAULT_BASE_INTERVAL: Duration = Duration::from_secs(1);
const DEFAULT_MAX_INTERVAL: Duration = Duration::from_secs(30);

/// Configuration for reconnecting connection behavior.
///
/// ```
/// use std::time::Duration;
/// use reconnecting_ws::ws::config::{Config, ReconnectConfig};
///
/// let config = Config::builder()
///     .reconnect(ReconnectConfig::builder().max_attempts(10).build())
///     .error_grace_period(Duration::from_secs(2))
///     .build();
/// assert_eq!(config.reconnect.max_attempts, Some(10));
/// ```
#[non_exhaustive]
#[derive(Debug, Clone, Builder)]
pub struct Config {
    /// Reconnection strategy configuration
    #[builder(default)]
    pub reconnect: ReconnectConfig,
    /// How long the transport may stay silent after reporting an error.
    /// Each frame restarts the wait. When it elapses the transport is treated as closed.
    #[builder(default = DEFAULT_ERROR_GRACE_PERIOD)]
    pub error_grace_period: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            reconnect: ReconnectConfig::default(),
            error_grace_period: DEFAULT_ERROR_GRACE_PERIOD,
        }
    }
}

/// Configuration for automatic reconnection behavior.
///
/// The delay before retry `k` is drawn uniformly from
/// `[0, min((2^k - 1) * base_interval, max_interval))`.
#[non_exhaustive]
#[derive(Debug, Clone, Builder)]
pub struct ReconnectConfig {
    /// Maximum number of reconnection attempts before giving up.
    /// `None` means infinite retries.
    pub max_attempts: Option<u32>,
    /// Unit of the exponential window
    #[builder(default = DEFAULT_BASE_INTERVAL)]
    pub base_interval: Duration,
    /// Ceiling of the backoff window
    #[builder(default = DEFAULT_MAX_INTERVAL)]
    pub max_interval: Duration,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            max_attempts: None, // Infinite reconnection by default
            base_interval: DEFAULT_BASE_INTERVAL,
            max_interval: DEFAULT_MAX_INTERVAL,
        }
    }
}

impl From<ReconnectConfig> for FullJitterBackoff {
    fn from(config: ReconnectConfig) -> Self {
        FullJitterBackoff::new(config.base_interval, config.max_interval)
            .with_max_attempts(config.max_attempts)
    }
}
