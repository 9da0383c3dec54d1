use std::time::Duration;

use serde::Deserialize;

/// Top-level configuration settings for the application.
///
/// Includes settings for the consumer side of a connection and for logging.
/// `Default` gives the application sensible values when nothing is configured.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Settings {
    pub consumer: ConsumerSettings,
    pub logging: LoggingSettings,
}

/// Configuration settings for consuming messages.
///
/// `msg_timeout_ms` enables the client-side message timeout when set. The
/// requeue delays are used when a message is requeued without an explicit
/// delay: `min(requeue_delay_secs * attempts, max_requeue_delay_secs)`.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct ConsumerSettings {
    pub msg_timeout_ms: Option<u64>,
    pub requeue_delay_secs: u64,
    pub max_requeue_delay_secs: u64,
}

impl ConsumerSettings {
    /// Client-side message timeout, if enabled.
    pub fn msg_timeout(&self) -> Option<Duration> {
        self.msg_timeout_ms.map(Duration::from_millis)
    }

    /// Requeue delay in milliseconds derived from the attempt count.
    pub fn requeue_delay_ms(&self, attempts: u16) -> u64 {
        self.requeue_delay_secs
            .saturating_mul(u64::from(attempts))
            .min(self.max_requeue_delay_secs)
            .saturating_mul(1000)
    }
}

impl Default for ConsumerSettings {
    fn default() -> Self {
        Self {
            msg_timeout_ms: None,
            requeue_delay_secs: 90,
            max_requeue_delay_secs: 900,
        }
    }
}

/// Configuration settings for logging.
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingSettings {
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Partial configuration settings loaded from files or environment.
///
/// Allows partial specification of settings. Missing values can be filled using defaults.
#[derive(Debug, Deserialize)]
pub struct PartialSettings {
    pub consumer: Option<PartialConsumerSettings>,
    pub logging: Option<PartialLoggingSettings>,
}

/// Partial consumer settings.
#[derive(Debug, Deserialize)]
pub struct PartialConsumerSettings {
    pub msg_timeout_ms: Option<u64>,
    pub requeue_delay_secs: Option<u64>,
    pub max_requeue_delay_secs: Option<u64>,
}

/// Partial logging settings.
#[derive(Debug, Deserialize)]
pub struct PartialLoggingSettings {
    pub level: Option<String>,
}
