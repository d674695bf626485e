//! Error types for the shape registry.

use thiserror::Error;

/// Errors that can occur while naming or generating shapes.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// Two different declarations share a name and at least one of them
    /// has no qualified path to disambiguate it.
    #[error("Shape name '{name}' is ambiguous: {reason}")]
    AmbiguousName {
        /// The colliding short name.
        name: String,
        /// Why the collision could not be resolved.
        reason: String,
    },

    /// The generated schema is not an object tree.
    #[error("Invalid schema for shape '{name}': {reason}")]
    InvalidSchema {
        /// The shape whose schema is invalid.
        name: String,
        /// The reason the schema was rejected.
        reason: String,
    },
}

impl SchemaError {
    /// Creates an ambiguous name error.
    pub fn ambiguous(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::AmbiguousName {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Creates an invalid schema error.
    pub fn invalid_schema(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidSchema {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for shape registry operations.
pub type SchemaResult<T> = Result<T, SchemaError>;
