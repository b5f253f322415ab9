//! Telemetry error types.

use thiserror::Error;

/// Logging could not be set up.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// A global subscriber is already installed, or installation failed.
    #[error("cannot install log subscriber: {0}")]
    LoggingInit(String),

    /// A [`LogConfig`](crate::LogConfig) value is unusable.
    #[error("invalid log configuration: {0}")]
    InvalidConfig(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TelemetryError::LoggingInit("already set".to_string());
        assert_eq!(err.to_string(), "cannot install log subscriber: already set");

        let err = TelemetryError::InvalidConfig("bad filter".to_string());
        assert_eq!(err.to_string(), "invalid log configuration: bad filter");
    }
}
