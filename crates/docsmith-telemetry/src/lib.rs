//! Logging setup for docsmith applications.
//!
//! The docsmith library crates emit `tracing` events while shapes are
//! registered and documents are assembled:
//!
//! | Level | Event |
//! |-------|-------|
//! | `debug` | endpoint added, operation assembled, response payload routed |
//! | `warn` | parameter-only shape evicted, undeclared path template parameter |
//!
//! This crate installs a `tracing-subscriber` pipeline that renders those
//! events as JSON or pretty text.
//!
//! # Example
//!
//! ```rust,ignore
//! use docsmith_telemetry::{init_logging, LogConfig};
//!
//! init_logging(&LogConfig::production())?;
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod logging;

pub use error::TelemetryError;
pub use logging::{create_env_filter, fields, init_logging, LogConfig};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
