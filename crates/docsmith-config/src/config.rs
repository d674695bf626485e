//! Main configuration types.
//!
//! This module provides the top-level [`DocsmithConfig`] struct and its builder.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{AssemblerConfig, DocumentConfig, LoggingConfig, ServerEntry, TagEntry};

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Complete docsmith configuration.
///
/// This is the root configuration type that contains all configuration sections.
/// Use [`ConfigLoader`](crate::ConfigLoader) to load configuration from files
/// and environment variables.
///
/// # Example
///
/// ```
/// use docsmith_config::DocsmithConfig;
///
/// let config = DocsmithConfig::default();
/// assert_eq!(config.document.openapi_version, "3.0.3");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct DocsmithConfig {
    /// Document metadata.
    #[serde(default)]
    pub document: DocumentConfig,

    /// Servers listed in the document.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub servers: Vec<ServerEntry>,

    /// Document-level tags.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<TagEntry>,

    /// Assembly behavior.
    #[serde(default)]
    pub assembler: AssemblerConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl DocsmithConfig {
    /// Create a new configuration builder.
    ///
    /// # Example
    ///
    /// ```
    /// use docsmith_config::{DocsmithConfig, DocumentConfig};
    ///
    /// let config = DocsmithConfig::builder()
    ///     .document(DocumentConfig {
    ///         title: "Pet Store".to_string(),
    ///         ..Default::default()
    ///     })
    ///     .build();
    ///
    /// assert_eq!(config.document.title, "Pet Store");
    /// ```
    #[must_use]
    pub fn builder() -> DocsmithConfigBuilder {
        DocsmithConfigBuilder::new()
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - The document title or version is empty
    /// - The OpenAPI version is not a 3.0.x version
    /// - A server URL is empty
    /// - Two tags share a name
    /// - The log level is unknown
    pub fn validate(&self) -> Result<(), crate::ConfigError> {
        if self.document.title.trim().is_empty() {
            return Err(crate::ConfigError::invalid_value(
                "document.title",
                "must not be empty",
            ));
        }
        if self.document.version.trim().is_empty() {
            return Err(crate::ConfigError::invalid_value(
                "document.version",
                "must not be empty",
            ));
        }
        if !self.document.openapi_version.starts_with("3.0.") {
            return Err(crate::ConfigError::invalid_value(
                "document.openapi_version",
                format!(
                    "unsupported OpenAPI version: {} (expected 3.0.x)",
                    self.document.openapi_version
                ),
            ));
        }

        if let Some(index) = self.servers.iter().position(|s| s.url.trim().is_empty()) {
            return Err(crate::ConfigError::invalid_value(
                format!("servers[{index}].url"),
                "must not be empty",
            ));
        }

        let mut seen = HashSet::new();
        for tag in &self.tags {
            if !seen.insert(tag.name.as_str()) {
                return Err(crate::ConfigError::validation_error(format!(
                    "tag '{}' is declared more than once",
                    tag.name
                )));
            }
        }

        if !LOG_LEVELS.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(crate::ConfigError::invalid_value(
                "logging.level",
                format!("unknown log level: {}", self.logging.level),
            ));
        }

        Ok(())
    }

    /// Create a development configuration preset.
    ///
    /// Pretty debug logs with source locations.
    ///
    /// # Example
    ///
    /// ```
    /// use docsmith_config::DocsmithConfig;
    ///
    /// let config = DocsmithConfig::development();
    /// assert_eq!(config.logging.level, "debug");
    /// ```
    #[must_use]
    pub fn development() -> Self {
        let mut config = Self::default();

        config.logging.level = "debug".to_string();
        config.logging.format = crate::LogFormat::Pretty;
        config.logging.include_location = true;

        config
    }

    /// Create a production configuration preset.
    ///
    /// JSON logs at info level, without the Swagger UI advisory notes.
    ///
    /// # Example
    ///
    /// ```
    /// use docsmith_config::DocsmithConfig;
    ///
    /// let config = DocsmithConfig::production();
    /// assert_eq!(config.logging.format, docsmith_config::LogFormat::Json);
    /// ```
    #[must_use]
    pub fn production() -> Self {
        let mut config = Self::default();

        config.logging.level = "info".to_string();
        config.logging.format = crate::LogFormat::Json;
        config.assembler.swagger_annotations = false;

        config
    }
}

/// Builder for [`DocsmithConfig`].
#[derive(Debug, Default)]
pub struct DocsmithConfigBuilder {
    document: Option<DocumentConfig>,
    servers: Vec<ServerEntry>,
    tags: Vec<TagEntry>,
    assembler: Option<AssemblerConfig>,
    logging: Option<LoggingConfig>,
}

impl DocsmithConfigBuilder {
    /// Create a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the document metadata.
    #[must_use]
    pub fn document(mut self, document: DocumentConfig) -> Self {
        self.document = Some(document);
        self
    }

    /// Add a server.
    #[must_use]
    pub fn server(mut self, url: impl Into<String>, description: Option<String>) -> Self {
        self.servers.push(ServerEntry {
            url: url.into(),
            description,
        });
        self
    }

    /// Add a document-level tag.
    #[must_use]
    pub fn tag(mut self, name: impl Into<String>, description: Option<String>) -> Self {
        self.tags.push(TagEntry {
            name: name.into(),
            description,
        });
        self
    }

    /// Set the assembly behavior.
    #[must_use]
    pub fn assembler(mut self, assembler: AssemblerConfig) -> Self {
        self.assembler = Some(assembler);
        self
    }

    /// Set the logging configuration.
    #[must_use]
    pub fn logging(mut self, logging: LoggingConfig) -> Self {
        self.logging = Some(logging);
        self
    }

    /// Build the configuration.
    ///
    /// Any unset sections will use their default values.
    #[must_use]
    pub fn build(self) -> DocsmithConfig {
        DocsmithConfig {
            document: self.document.unwrap_or_default(),
            servers: self.servers,
            tags: self.tags,
            assembler: self.assembler.unwrap_or_default(),
            logging: self.logging.unwrap_or_default(),
        }
    }

    /// Build and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if validation fails.
    pub fn build_validated(self) -> Result<DocsmithConfig, crate::ConfigError> {
        let config = self.build();
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DocsmithConfig::default();
        assert_eq!(config.document.title, "Docsmith");
        assert!(config.servers.is_empty());
        assert!(config.assembler.swagger_annotations);
        assert!(config.logging.enabled);
    }

    #[test]
    fn test_builder_all_sections() {
        let config = DocsmithConfig::builder()
            .document(DocumentConfig {
                title: "Pet Store".to_string(),
                version: "1.0.0".to_string(),
                ..Default::default()
            })
            .server("https://petstore.example.com/v1", Some("production".to_string()))
            .tag("pet", Some("Everything about your Pets".to_string()))
            .assembler(AssemblerConfig {
                swagger_annotations: false,
                ..Default::default()
            })
            .logging(LoggingConfig {
                level: "warn".to_string(),
                ..Default::default()
            })
            .build();

        assert_eq!(config.document.title, "Pet Store");
        assert_eq!(config.servers[0].url, "https://petstore.example.com/v1");
        assert_eq!(config.tags[0].name, "pet");
        assert!(!config.assembler.swagger_annotations);
        assert!(config.assembler.collapse_nullable);
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(DocsmithConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_empty_title() {
        let config = DocsmithConfig::builder()
            .document(DocumentConfig {
                title: "  ".to_string(),
                ..Default::default()
            })
            .build();

        let result = config.validate();
        assert!(result.unwrap_err().to_string().contains("document.title"));
    }

    #[test]
    fn test_validate_openapi_version() {
        let config = DocsmithConfig::builder()
            .document(DocumentConfig {
                openapi_version: "3.1.0".to_string(),
                ..Default::default()
            })
            .build();

        let result = config.validate();
        assert!(result.unwrap_err().to_string().contains("openapi_version"));
    }

    #[test]
    fn test_validate_empty_server_url() {
        let result = DocsmithConfig::builder()
            .server("https://api.example.com", None)
            .server("", None)
            .build_validated();

        assert!(result.unwrap_err().to_string().contains("servers[1].url"));
    }

    #[test]
    fn test_validate_duplicate_tag() {
        let result = DocsmithConfig::builder()
            .tag("pet", None)
            .tag("pet", Some("again".to_string()))
            .build_validated();

        assert!(result.unwrap_err().to_string().contains("'pet'"));
    }

    #[test]
    fn test_validate_log_level() {
        let config = DocsmithConfig::builder()
            .logging(LoggingConfig {
                level: "verbose".to_string(),
                ..Default::default()
            })
            .build();

        assert!(config.validate().unwrap_err().to_string().contains("logging.level"));
    }

    #[test]
    fn test_development_preset() {
        let config = DocsmithConfig::development();
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, crate::LogFormat::Pretty);
        assert!(config.logging.include_location);
        assert!(config.assembler.swagger_annotations);
    }

    #[test]
    fn test_production_preset() {
        let config = DocsmithConfig::production();
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, crate::LogFormat::Json);
        assert!(!config.assembler.swagger_annotations);
    }

    #[test]
    fn test_toml_serialization() {
        let config = DocsmithConfig::builder()
            .server("https://api.example.com", None)
            .build();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[document]"));
        assert!(toml_str.contains("[[servers]]"));
        assert!(toml_str.contains("[assembler]"));
    }

    #[test]
    fn test_toml_deserialization() {
        let toml_str = r#"
            [document]
            title = "Pet Store"
            version = "1.0.0"

            [[servers]]
            url = "https://petstore.example.com/v1"

            [[tags]]
            name = "pet"
            description = "Everything about your Pets"
        "#;

        let config: DocsmithConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.document.title, "Pet Store");
        assert_eq!(config.servers.len(), 1);
        assert_eq!(config.tags[0].description.as_deref(), Some("Everything about your Pets"));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let toml_str = r#"
            [assembler]
            swagger_annotations = true
            unknown_field = "value"
        "#;

        let result: Result<DocsmithConfig, _> = toml::from_str(toml_str);
        assert!(result.is_err());
    }
}
