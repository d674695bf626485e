//! Structured logging for docsmith.
//!
//! Library crates only emit `tracing` events; applications call
//! [`init_logging`] once to install a subscriber.
//!
//! # Example
//!
//! ```rust,ignore
//! use docsmith_telemetry::{init_logging, LogConfig};
//!
//! init_logging(&LogConfig::development())?;
//!
//! tracing::debug!(operation_id = "getPetById", "operation assembled");
//! ```

use crate::error::TelemetryError;
use crate::TelemetryResult;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Whether logging is enabled.
    pub enabled: bool,

    /// Log level (e.g., "info", "debug", "warn").
    pub level: String,

    /// Whether to output JSON format.
    pub json_format: bool,

    /// Whether to include span events (enter, exit, close).
    pub span_events: bool,

    /// Whether to include file/line info.
    pub file_line_info: bool,

    /// Whether to include thread IDs.
    pub thread_ids: bool,

    /// Whether to include target (module path).
    pub include_target: bool,

    /// Service name for log fields.
    pub service_name: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: "info".to_string(),
            json_format: true, // JSON by default for production
            span_events: false,
            file_line_info: false,
            thread_ids: false,
            include_target: true,
            service_name: "docsmith".to_string(),
        }
    }
}

impl LogConfig {
    /// Creates a development configuration with human-readable output.
    #[must_use]
    pub fn development() -> Self {
        Self {
            enabled: true,
            level: "debug".to_string(),
            json_format: false,
            span_events: true,
            file_line_info: true,
            thread_ids: false,
            include_target: true,
            service_name: "docsmith".to_string(),
        }
    }

    /// Creates a production configuration with JSON output.
    #[must_use]
    pub fn production() -> Self {
        Self {
            enabled: true,
            level: "info".to_string(),
            json_format: true,
            span_events: false,
            file_line_info: false,
            thread_ids: false,
            include_target: true,
            service_name: "docsmith".to_string(),
        }
    }
}

/// Initializes the logging subsystem.
///
/// # Arguments
///
/// * `config` - Logging configuration
///
/// # Errors
///
/// Returns `TelemetryError::InvalidConfig` for an empty level and
/// `TelemetryError::LoggingInit` if the filter is invalid or a subscriber
/// is already installed.
pub fn init_logging(config: &LogConfig) -> TelemetryResult<()> {
    if !config.enabled {
        return Ok(());
    }
    if config.level.trim().is_empty() {
        return Err(TelemetryError::InvalidConfig(
            "log level must not be empty".to_string(),
        ));
    }

    // Build env filter
    let filter = EnvFilter::try_new(&config.level)
        .map_err(|e| TelemetryError::LoggingInit(format!("Invalid log level: {e}")))?;

    // Determine span events to capture
    let span_events = if config.span_events {
        FmtSpan::NEW | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    if config.json_format {
        // JSON format for production
        let fmt_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_span_events(span_events)
            .with_file(config.file_line_info)
            .with_line_number(config.file_line_info)
            .with_thread_ids(config.thread_ids)
            .with_target(config.include_target)
            .with_filter(filter);

        tracing_subscriber::registry()
            .with(fmt_layer)
            .try_init()
            .map_err(|e| TelemetryError::LoggingInit(e.to_string()))?;
    } else {
        // Pretty format for development
        let fmt_layer = tracing_subscriber::fmt::layer()
            .pretty()
            .with_span_events(span_events)
            .with_file(config.file_line_info)
            .with_line_number(config.file_line_info)
            .with_thread_ids(config.thread_ids)
            .with_target(config.include_target)
            .with_filter(filter);

        tracing_subscriber::registry()
            .with(fmt_layer)
            .try_init()
            .map_err(|e| TelemetryError::LoggingInit(e.to_string()))?;
    }

    tracing::debug!(service.name = %config.service_name, level = %config.level, "logging initialized");
    Ok(())
}

/// Creates an env filter from a string.
///
/// # Arguments
///
/// * `filter` - Filter string (e.g., "info", "docsmith_docs=debug,docsmith_schema=warn")
///
/// # Errors
///
/// Returns error if the filter string is invalid.
pub fn create_env_filter(filter: &str) -> TelemetryResult<EnvFilter> {
    EnvFilter::try_new(filter).map_err(|e| TelemetryError::LoggingInit(e.to_string()))
}

/// Field names used by docsmith log events.
///
/// Use these field names for consistency across logs.
pub mod fields {
    /// Operation ID field name.
    pub const OPERATION_ID: &str = "operation_id";

    /// Path template field name.
    pub const PATH: &str = "path";

    /// HTTP method field name.
    pub const METHOD: &str = "method";

    /// Shape name field name.
    pub const SHAPE: &str = "shape";

    /// Response status code field name.
    pub const STATUS_CODE: &str = "status_code";

    /// Media type field name.
    pub const MEDIA_TYPE: &str = "media_type";

    /// AsyncAPI channel field name.
    pub const CHANNEL: &str = "channel";

    /// Error field name.
    pub const ERROR: &str = "error";

    /// Service name field name.
    pub const SERVICE_NAME: &str = "service.name";
}
