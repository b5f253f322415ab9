//! Structured logging for validjson.
//!
//! The decode pipeline emits `tracing` events; this crate wires them to a
//! `tracing-subscriber` formatter and defines the field names those events use.
//!
//! # Example
//!
//! ```rust,ignore
//! use validjson_telemetry::{init_logging, LogConfig};
//!
//! init_logging(&LogConfig::development())?;
//!
//! tracing::info!(request_id = %id, "Decoding request body");
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod logging;

pub use error::TelemetryError;
pub use logging::{create_env_filter, fields, init_logging, LogConfig, OutputFormat};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
