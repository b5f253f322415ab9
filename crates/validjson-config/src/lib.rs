//! Typed configuration for validjson.
//!
//! Configuration is layered (defaults → file → env) and strict: unknown
//! fields are rejected.
//!
//! # Example
//!
//! ```no_run
//! use validjson_config::ConfigLoader;
//!
//! # fn main() -> Result<(), validjson_config::ConfigError> {
//! let config = ConfigLoader::new()
//!     .with_optional_file("validjson.toml")?
//!     .with_env_prefix("VALIDJSON")
//!     .load()?;
//!
//! println!("Empty bodies report: {}", config.decode.missing_body_message);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration File Format
//!
//! ```toml
//! [decode]
//! missing_body_message = "missing request body"
//! malformed_body_message = "malformed request body"
//! rejection_log_level = "debug"
//!
//! [logging]
//! enabled = true
//! level = "info"
//! format = "json"
//! ```
//!
//! # Environment Variable Overrides
//!
//! Values can be overridden with `PREFIX__SECTION__KEY`, for example
//! `VALIDJSON__DECODE__REJECTION_LOG_LEVEL=warn`.

#![warn(missing_docs)]

mod config;
mod error;
mod loader;

pub use config::{DecodeConfig, LogFormat, LoggingConfig, RejectionLogLevel, ValidJsonConfig};
pub use error::ConfigError;
pub use loader::{ConfigFormat, ConfigLoader};
