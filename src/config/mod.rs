mod settings;

use crate::config::settings::PartialSettings;
use config::{Config, ConfigError, Environment, File};

pub use settings::{ConsumerSettings, LoggingSettings, Settings};

/// Environment variable prefix, e.g. `NSQMSG_CONSUMER__MSG_TIMEOUT_MS`.
pub const ENV_PREFIX: &str = "NSQMSG";

/// Loads the configuration from the default file and environment variables
/// Merges the configuration with default values
/// Returns a `Settings` struct containing the consumer and logging configurations
pub fn load_config() -> Result<Settings, ConfigError> {
    let builder = Config::builder()
        .add_source(File::with_name("config/default").required(false))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

    let config = builder.build()?;

    // Try to deserialize what is available
    let partial: PartialSettings = config.try_deserialize()?;

    // Merge with defaults
    let default = Settings::default();

    Ok(Settings {
        consumer: ConsumerSettings {
            msg_timeout_ms: partial
                .consumer
                .as_ref()
                .and_then(|c| c.msg_timeout_ms)
                .or(default.consumer.msg_timeout_ms),
            requeue_delay_secs: partial
                .consumer
                .as_ref()
                .and_then(|c| c.requeue_delay_secs)
                .unwrap_or(default.consumer.requeue_delay_secs),
            max_requeue_delay_secs: partial
                .consumer
                .as_ref()
                .and_then(|c| c.max_requeue_delay_secs)
                .unwrap_or(default.consumer.max_requeue_delay_secs),
        },
        logging: LoggingSettings {
            level: partial
                .logging
                .as_ref()
                .and_then(|l| l.level.clone())
                .unwrap_or(default.logging.level),
        },
    })
}

#[cfg(test)]
mod tests;
