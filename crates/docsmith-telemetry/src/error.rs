//! Telemetry error types.

use thiserror::Error;

/// Errors that can occur while setting up logging.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// Failed to initialize logging.
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TelemetryError::LoggingInit("failed".to_string());
        assert_eq!(err.to_string(), "Failed to initialize logging: failed");
    }

    #[test]
    fn test_invalid_config_display() {
        let err = TelemetryError::InvalidConfig("unknown format 'xml'".to_string());
        assert!(err.to_string().contains("xml"));
    }
}
