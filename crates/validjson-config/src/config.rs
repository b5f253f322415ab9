//! Configuration types.
//!
//! This module provides the root [`ValidJsonConfig`] struct and its sections.

use serde::{Deserialize, Serialize};
use validjson_telemetry::{LogConfig, OutputFormat};

use crate::ConfigError;

/// Complete validjson configuration.
///
/// Use [`ConfigLoader`](crate::ConfigLoader) to load configuration from files
/// and environment variables.
///
/// # Example
///
/// ```
/// use validjson_config::ValidJsonConfig;
///
/// let config = ValidJsonConfig::default();
/// assert_eq!(config.decode.missing_body_message, "missing request body");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct ValidJsonConfig {
    /// Decode pipeline settings.
    #[serde(default)]
    pub decode: DecodeConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ValidJsonConfig {
    /// Development preset: pretty debug logging, rejections logged at `debug`.
    #[must_use]
    pub fn development() -> Self {
        Self {
            decode: DecodeConfig::default(),
            logging: LoggingConfig {
                level: "debug".to_string(),
                format: LogFormat::Pretty,
                ansi_enabled: true,
                include_location: true,
                ..LoggingConfig::default()
            },
        }
    }

    /// Production preset: JSON logging, rejections logged at `info`.
    #[must_use]
    pub fn production() -> Self {
        Self {
            decode: DecodeConfig {
                rejection_log_level: RejectionLogLevel::Info,
                ..DecodeConfig::default()
            },
            logging: LoggingConfig::default(),
        }
    }

    /// Checks the settings the decode pipeline relies on.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for a blank decode message, or for a
    /// log level that is not a filter directive while logging is enabled.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let messages = [
            ("decode.missing_body_message", &self.decode.missing_body_message),
            ("decode.malformed_body_message", &self.decode.malformed_body_message),
        ];
        if let Some((key, _)) = messages.iter().find(|(_, m)| m.trim().is_empty()) {
            return Err(ConfigError::invalid(*key, "must not be blank"));
        }

        if self.logging.enabled {
            validjson_telemetry::create_env_filter(&self.logging.level)
                .map_err(|e| ConfigError::invalid("logging.level", e.to_string()))?;
        }

        Ok(())
    }
}

/// Decode pipeline configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct DecodeConfig {
    /// Message of the error returned for an empty body.
    #[serde(default = "default_missing_body_message")]
    pub missing_body_message: String,

    /// Message of the error returned when the body cannot be read or parsed.
    #[serde(default = "default_malformed_body_message")]
    pub malformed_body_message: String,

    /// Level of the event logged for every rejected body.
    #[serde(default)]
    pub rejection_log_level: RejectionLogLevel,
}

impl Default for DecodeConfig {
    fn default() -> Self {
        Self {
            missing_body_message: default_missing_body_message(),
            malformed_body_message: default_malformed_body_message(),
            rejection_log_level: RejectionLogLevel::default(),
        }
    }
}

fn default_missing_body_message() -> String {
    "missing request body".to_string()
}

fn default_malformed_body_message() -> String {
    "malformed request body".to_string()
}

/// Level at which rejected bodies are logged.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum RejectionLogLevel {
    /// Rejections are not logged.
    Off,
    /// Log at `DEBUG`.
    #[default]
    Debug,
    /// Log at `INFO`.
    Info,
    /// Log at `WARN`.
    Warn,
}

/// Log output format.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON formatted logs (production).
    #[default]
    Json,
    /// Human-readable pretty format (development).
    Pretty,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Enable logging.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Log level (trace, debug, info, warn, error) or filter directive.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log output format.
    #[serde(default)]
    pub format: LogFormat,

    /// Include ANSI color codes in output.
    #[serde(default)]
    pub ansi_enabled: bool,

    /// Include source file and line in logs.
    #[serde(default)]
    pub include_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_log_level(),
            format: LogFormat::default(),
            ansi_enabled: false,
            include_location: false,
        }
    }
}

impl LoggingConfig {
    /// Converts this section into the telemetry crate's [`LogConfig`].
    #[must_use]
    pub fn to_log_config(&self) -> LogConfig {
        LogConfig {
            enabled: self.enabled,
            filter: self.level.clone(),
            format: match self.format {
                LogFormat::Json => OutputFormat::Json,
                LogFormat::Pretty => OutputFormat::Pretty,
            },
            location: self.include_location,
            ansi: self.ansi_enabled,
            ..LogConfig::production()
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}
