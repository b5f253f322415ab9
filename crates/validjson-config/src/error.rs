//! Configuration error types.

use std::path::PathBuf;
use thiserror::Error;

/// A configuration layer could not be applied.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A required configuration file does not exist.
    #[error("no configuration at {}", .0.display())]
    NotFound(PathBuf),

    /// A configuration file exists but could not be read.
    #[error("cannot read {}", path.display())]
    Io {
        /// File being read.
        path: PathBuf,
        /// I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// A TOML document does not match the configuration schema.
    #[error("TOML configuration: {0}")]
    Toml(#[from] toml::de::Error),

    /// A JSON document does not match the configuration schema.
    #[error("JSON configuration: {0}")]
    Json(#[from] serde_json::Error),

    /// The document format is neither TOML nor JSON.
    #[error("cannot tell configuration format of '{0}' (expected toml or json)")]
    UnknownFormat(String),

    /// A setting holds a value the decode pipeline cannot use.
    #[error("{key}: {reason}")]
    Invalid {
        /// Dotted path of the setting, e.g. `decode.missing_body_message`.
        key: &'static str,
        /// What is wrong with it.
        reason: String,
    },

    /// An environment override could not be interpreted.
    #[error("environment override {var}={value:?}: {reason}")]
    Env {
        /// Variable name.
        var: String,
        /// Raw value.
        value: String,
        /// What is wrong with it.
        reason: String,
    },
}

impl ConfigError {
    pub(crate) fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }

    pub(crate) fn env(var: &str, value: &str, reason: impl Into<String>) -> Self {
        Self::Env {
            var: var.to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}
