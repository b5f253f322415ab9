//! Structured logging for validjson.
//!
//! Rejection events never include the request body. The body lives in the
//! returned error's field map, and the caller decides whether to log it.

use crate::error::TelemetryError;
use crate::TelemetryResult;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Shape of emitted log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// One JSON object per event.
    #[default]
    Json,
    /// Multi-line human-readable output.
    Pretty,
}

/// Subscriber settings for [`init_logging`].
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// When `false`, [`init_logging`] installs nothing.
    pub enabled: bool,
    /// `EnvFilter` directive, e.g. `"info"` or `"validjson=debug,warn"`.
    pub filter: String,
    /// Output format.
    pub format: OutputFormat,
    /// Emit span open/close events (useful to time `decode_body` spans).
    pub span_events: bool,
    /// Record source file and line.
    pub location: bool,
    /// Record the event target (module path).
    pub target: bool,
    /// Color pretty output. Ignored for JSON.
    pub ansi: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self::production()
    }
}

impl LogConfig {
    /// Pretty, colored `debug` output with span events and locations.
    #[must_use]
    pub fn development() -> Self {
        Self {
            enabled: true,
            filter: "debug".to_string(),
            format: OutputFormat::Pretty,
            span_events: true,
            location: true,
            target: true,
            ansi: true,
        }
    }

    /// JSON `info` output.
    #[must_use]
    pub fn production() -> Self {
        Self {
            enabled: true,
            filter: "info".to_string(),
            format: OutputFormat::Json,
            span_events: false,
            location: false,
            target: true,
            ansi: false,
        }
    }
}

/// Installs the global subscriber described by `config`.
///
/// # Errors
///
/// [`TelemetryError::InvalidConfig`] for a bad filter directive,
/// [`TelemetryError::LoggingInit`] when a global subscriber already exists.
pub fn init_logging(config: &LogConfig) -> TelemetryResult<()> {
    if !config.enabled {
        return Ok(());
    }

    let filter = create_env_filter(&config.filter)?;
    let span_events = if config.span_events {
        FmtSpan::NEW | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    let base = tracing_subscriber::fmt::layer()
        .with_span_events(span_events)
        .with_file(config.location)
        .with_line_number(config.location)
        .with_target(config.target);
    let fmt_layer = match config.format {
        OutputFormat::Json => base.json().with_ansi(false).boxed(),
        OutputFormat::Pretty => base.pretty().with_ansi(config.ansi).boxed(),
    };

    tracing_subscriber::registry()
        .with(fmt_layer.with_filter(filter))
        .try_init()
        .map_err(|e| TelemetryError::LoggingInit(e.to_string()))
}

/// Parses an `EnvFilter` directive.
///
/// # Errors
///
/// [`TelemetryError::InvalidConfig`] if the directive does not parse.
pub fn create_env_filter(directive: &str) -> TelemetryResult<EnvFilter> {
    EnvFilter::try_new(directive)
        .map_err(|e| TelemetryError::InvalidConfig(format!("bad filter '{directive}': {e}")))
}

/// Field names used on pipeline events, for log queries.
pub mod fields {
    /// Request ID.
    pub const REQUEST_ID: &str = "request_id";
    /// `MISSING_BODY`, `MALFORMED_BODY` or `INVALID_BODY`.
    pub const ERROR_CODE: &str = "error.code";
    /// HTTP status of the rejection.
    pub const HTTP_STATUS: &str = "http.status_code";
    /// Raw body length in bytes (on the `decode_body` span).
    pub const BODY_LEN: &str = "body.len";
    /// Rejection message.
    pub const ERROR: &str = "error";
}

/// Logs a rejected request body at `debug`, `info` or `warn`.
///
/// `$error` must expose `code()` and `status_code()`, as `BodyError` does.
/// The event carries the fields named in [`fields`].
#[macro_export]
macro_rules! log_body_rejected {
    ($level:ident, $request_id:expr, $error:expr) => {
        tracing::$level!(
            request_id = %$request_id,
            error.code = %$error.code(),
            http.status_code = $error.status_code().as_u16(),
            error = %$error,
            "Request body rejected"
        )
    };
}
