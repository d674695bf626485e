//! Configuration section types.
//!
//! This module defines the structure of all configuration sections.

use serde::{Deserialize, Serialize};

/// Document metadata section.
///
/// # Example
///
/// ```
/// use docsmith_config::DocumentConfig;
///
/// let config = DocumentConfig {
///     title: "Pet Store".to_string(),
///     version: "1.0.0".to_string(),
///     ..Default::default()
/// };
/// assert_eq!(config.openapi_version, "3.0.3");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct DocumentConfig {
    /// Document title.
    #[serde(default = "default_title")]
    pub title: String,

    /// API version (not the OpenAPI version).
    #[serde(default = "default_version")]
    pub version: String,

    /// Markdown description.
    #[serde(default)]
    pub description: Option<String>,

    /// Terms of service URL.
    #[serde(default)]
    pub terms_of_service: Option<String>,

    /// Contact information.
    #[serde(default)]
    pub contact: Option<ContactConfig>,

    /// License information.
    #[serde(default)]
    pub license: Option<LicenseConfig>,

    /// OpenAPI version written to the document (3.0.x).
    #[serde(default = "default_openapi_version")]
    pub openapi_version: String,

    /// External documentation link.
    #[serde(default)]
    pub external_docs: Option<ExternalDocsConfig>,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            version: default_version(),
            description: None,
            terms_of_service: None,
            contact: None,
            license: None,
            openapi_version: default_openapi_version(),
            external_docs: None,
        }
    }
}

fn default_title() -> String {
    "Docsmith".to_string()
}

fn default_version() -> String {
    "0.0.1".to_string()
}

fn default_openapi_version() -> String {
    "3.0.3".to_string()
}

/// Contact information.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ContactConfig {
    /// Contact name.
    #[serde(default)]
    pub name: Option<String>,
    /// Contact URL.
    #[serde(default)]
    pub url: Option<String>,
    /// Contact email.
    #[serde(default)]
    pub email: Option<String>,
}

/// License information.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LicenseConfig {
    /// License name.
    pub name: String,
    /// License URL.
    #[serde(default)]
    pub url: Option<String>,
}

/// External documentation link.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ExternalDocsConfig {
    /// Target URL.
    pub url: String,
    /// Description.
    #[serde(default)]
    pub description: Option<String>,
}

/// A server entry, written as `[[servers]]` in TOML.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ServerEntry {
    /// Server URL.
    pub url: String,
    /// Description.
    #[serde(default)]
    pub description: Option<String>,
}

/// A document-level tag, written as `[[tags]]` in TOML.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct TagEntry {
    /// Tag name.
    pub name: String,
    /// Description.
    #[serde(default)]
    pub description: Option<String>,
}

/// Assembly behavior.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct AssemblerConfig {
    /// Append Swagger UI advisory notes to cookie parameters and multipart
    /// bodies.
    #[serde(default = "default_true")]
    pub swagger_annotations: bool,

    /// Collapse `anyOf: [T, null]` and `type: [T, "null"]` into OpenAPI 3.0
    /// `nullable`.
    #[serde(default = "default_true")]
    pub collapse_nullable: bool,
}

impl Default for AssemblerConfig {
    fn default() -> Self {
        Self {
            swagger_annotations: true,
            collapse_nullable: true,
        }
    }
}

/// Log format.
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

    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log output format.
    #[serde(default)]
    pub format: LogFormat,

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
            include_location: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}
