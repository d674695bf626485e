//! Configuration loader with layered approach.
//!
//! This module provides the [`ConfigLoader`] for loading configuration from
//! multiple sources: defaults, files, and environment variables.

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::Path;

use crate::{ConfigError, DocsmithConfig, LicenseConfig, LogFormat};

/// Configuration loader with layered approach.
///
/// The loader applies configuration in layers, with later layers overriding
/// earlier ones:
/// 1. Default values (built into the code)
/// 2. Configuration file (TOML or JSON)
/// 3. Environment variables
///
/// # Example
///
/// ```no_run
/// use docsmith_config::ConfigLoader;
///
/// # fn main() -> Result<(), docsmith_config::ConfigError> {
/// let config = ConfigLoader::new()
///     .with_defaults()
///     .with_file("config.toml")?
///     .with_env_prefix("DOCSMITH")
///     .load()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ConfigLoader {
    config: DocsmithConfig,
    env_prefix: Option<String>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Create a new configuration loader.
    ///
    /// # Example
    ///
    /// ```
    /// use docsmith_config::ConfigLoader;
    ///
    /// let loader = ConfigLoader::new();
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: DocsmithConfig::default(),
            env_prefix: None,
        }
    }

    /// Start with default configuration values.
    ///
    /// This is called automatically by `new()`, but can be chained for clarity.
    ///
    /// # Example
    ///
    /// ```
    /// use docsmith_config::ConfigLoader;
    ///
    /// let loader = ConfigLoader::new().with_defaults();
    /// ```
    #[must_use]
    pub fn with_defaults(mut self) -> Self {
        self.config = DocsmithConfig::default();
        self
    }

    /// Start with development preset configuration.
    ///
    /// # Example
    ///
    /// ```
    /// use docsmith_config::ConfigLoader;
    ///
    /// let config = ConfigLoader::new()
    ///     .with_development()
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(config.logging.level, "debug");
    /// ```
    #[must_use]
    pub fn with_development(mut self) -> Self {
        self.config = DocsmithConfig::development();
        self
    }

    /// Start with production preset configuration.
    ///
    /// # Example
    ///
    /// ```
    /// use docsmith_config::ConfigLoader;
    ///
    /// let config = ConfigLoader::new()
    ///     .with_production()
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(config.logging.format, docsmith_config::LogFormat::Json);
    /// ```
    #[must_use]
    pub fn with_production(mut self) -> Self {
        self.config = DocsmithConfig::production();
        self
    }

    /// Load configuration from a file.
    ///
    /// Supports TOML (.toml) and JSON (.json) formats.
    /// The file format is determined by the file extension.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - The file does not exist
    /// - The file cannot be read
    /// - The file contains invalid TOML/JSON
    /// - The file contains unknown fields (strict mode)
    ///
    /// # Example
    ///
    /// ```no_run
    /// use docsmith_config::ConfigLoader;
    ///
    /// # fn main() -> Result<(), docsmith_config::ConfigError> {
    /// let loader = ConfigLoader::new()
    ///     .with_file("config.toml")?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }

        let content = fs::read_to_string(path)
            .map_err(|e| ConfigError::read_error(path, e))?;

        let file_config = Self::parse_file(&content, path)?;
        self.merge_config(file_config);

        Ok(self)
    }

    /// Load configuration from an optional file.
    ///
    /// If the file exists, loads it. If not, silently continues.
    /// This is useful for optional configuration files.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file exists but:
    /// - Cannot be read
    /// - Contains invalid TOML/JSON
    /// - Contains unknown fields
    ///
    /// # Example
    ///
    /// ```no_run
    /// use docsmith_config::ConfigLoader;
    ///
    /// # fn main() -> Result<(), docsmith_config::ConfigError> {
    /// let loader = ConfigLoader::new()
    ///     .with_optional_file("config.toml")?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn with_optional_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            self.with_file(path)
        } else {
            Ok(self)
        }
    }

    /// Load configuration from a string.
    ///
    /// # Arguments
    ///
    /// * `content` - Configuration content as a string
    /// * `format` - File format ("toml" or "json")
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if parsing fails.
    ///
    /// # Example
    ///
    /// ```
    /// use docsmith_config::ConfigLoader;
    ///
    /// let toml = r#"
    ///     [document]
    ///     title = "Pet Store"
    /// "#;
    ///
    /// let config = ConfigLoader::new()
    ///     .with_string(toml, "toml")
    ///     .unwrap()
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(config.document.title, "Pet Store");
    /// ```
    pub fn with_string(mut self, content: &str, format: &str) -> Result<Self, ConfigError> {
        let file_config = match format.to_lowercase().as_str() {
            "toml" => toml::from_str(content)?,
            "json" => serde_json::from_str(content)?,
            _ => {
                return Err(ConfigError::validation_error(format!(
                    "unsupported configuration format: {format}"
                )))
            }
        };

        self.merge_config(file_config);
        Ok(self)
    }

    /// Set environment variable prefix for overrides.
    ///
    /// Environment variables use the format `PREFIX__SECTION__KEY`.
    /// For example, with prefix "DOCSMITH":
    /// - `DOCSMITH__DOCUMENT__TITLE=Pet Store`
    /// - `DOCSMITH__LOGGING__LEVEL=debug`
    ///
    /// # Example
    ///
    /// ```
    /// use docsmith_config::ConfigLoader;
    ///
    /// let loader = ConfigLoader::new()
    ///     .with_env_prefix("DOCSMITH");
    /// ```
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_uppercase());
        self
    }

    /// Load a `.env` file from the current directory (or its parents) into
    /// the process environment.
    ///
    /// A missing file is not an error. Variables already set in the
    /// environment are left untouched.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file exists but cannot be parsed.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use docsmith_config::ConfigLoader;
    ///
    /// # fn main() -> Result<(), docsmith_config::ConfigError> {
    /// let loader = ConfigLoader::new()
    ///     .with_dotenv()?
    ///     .with_env_prefix("DOCSMITH");
    /// # Ok(())
    /// # }
    /// ```
    pub fn with_dotenv(self) -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(_) => Ok(self),
            Err(err) if err.not_found() => Ok(self),
            Err(err) => Err(ConfigError::validation_error(format!(
                "failed to load .env file: {err}"
            ))),
        }
    }

    /// Load a specific `.env` file into the process environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file is missing or cannot be parsed.
    pub fn with_dotenv_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        dotenvy::from_path(path).map_err(|err| {
            if err.not_found() {
                ConfigError::file_not_found(path)
            } else {
                ConfigError::validation_error(format!(
                    "failed to load {}: {err}",
                    path.display()
                ))
            }
        })?;
        Ok(self)
    }

    /// Finalize and return the loaded configuration.
    ///
    /// Applies environment variable overrides (if a prefix was set) and
    /// validates the final configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Environment variable parsing fails
    /// - Configuration validation fails
    ///
    /// # Example
    ///
    /// ```
    /// use docsmith_config::ConfigLoader;
    ///
    /// let config = ConfigLoader::new()
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(config.document.openapi_version, "3.0.3");
    /// ```
    pub fn load(mut self) -> Result<DocsmithConfig, ConfigError> {
        // Apply environment variable overrides
        if let Some(prefix) = self.env_prefix.take() {
            self.apply_env_overrides(&prefix)?;
        }

        // Validate the final configuration
        self.config.validate()?;

        Ok(self.config)
    }

    /// Finalize without validation.
    ///
    /// Use this if you want to inspect or modify the configuration
    /// before validation.
    ///
    /// # Example
    ///
    /// ```
    /// use docsmith_config::ConfigLoader;
    ///
    /// let config = ConfigLoader::new()
    ///     .load_unvalidated();
    ///
    /// // Modify and validate later
    /// let _ = config.validate();
    /// ```
    #[must_use]
    pub fn load_unvalidated(self) -> DocsmithConfig {
        self.config
    }

    // Parse configuration file based on extension
    fn parse_file(content: &str, path: &Path) -> Result<DocsmithConfig, ConfigError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase);

        match extension.as_deref() {
            Some("toml") => Ok(toml::from_str(content)?),
            Some("json") => Ok(serde_json::from_str(content)?),
            _ => Err(ConfigError::validation_error(format!(
                "unsupported configuration file format: {}",
                path.display()
            ))),
        }
    }

    // A file replaces the previous layer whole; unset fields take their
    // serde defaults.
    fn merge_config(&mut self, file_config: DocsmithConfig) {
        self.config = file_config;
    }

    // Apply environment variable overrides
    fn apply_env_overrides(&mut self, prefix: &str) -> Result<(), ConfigError> {
        let scoped = format!("{prefix}__");
        let env_vars: HashMap<String, String> = env::vars()
            .filter(|(k, _)| k.starts_with(&scoped))
            .collect();

        for (key, value) in env_vars {
            self.apply_env_var(&key, &value, prefix)?;
        }

        Ok(())
    }

    // Apply a single environment variable
    fn apply_env_var(&mut self, key: &str, value: &str, prefix: &str) -> Result<(), ConfigError> {
        // Remove prefix and split by double underscore
        let key_without_prefix = key.strip_prefix(prefix)
            .and_then(|k| k.strip_prefix("__"))
            .ok_or_else(|| ConfigError::env_parse_error(key, "invalid key format"))?;

        let parts: Vec<&str> = key_without_prefix.split("__").collect();
        let document = &mut self.config.document;

        match parts.as_slice() {
            // Document section
            ["DOCUMENT", "TITLE"] => {
                document.title = value.to_string();
            }
            ["DOCUMENT", "VERSION"] => {
                document.version = value.to_string();
            }
            ["DOCUMENT", "DESCRIPTION"] => {
                document.description = optional(value);
            }
            ["DOCUMENT", "TERMS_OF_SERVICE"] => {
                document.terms_of_service = optional(value);
            }
            ["DOCUMENT", "OPENAPI_VERSION"] => {
                document.openapi_version = value.to_string();
            }

            // Document contact
            ["DOCUMENT", "CONTACT", "NAME"] => {
                document.contact.get_or_insert_with(Default::default).name = optional(value);
            }
            ["DOCUMENT", "CONTACT", "URL"] => {
                document.contact.get_or_insert_with(Default::default).url = optional(value);
            }
            ["DOCUMENT", "CONTACT", "EMAIL"] => {
                document.contact.get_or_insert_with(Default::default).email = optional(value);
            }

            // Document license
            ["DOCUMENT", "LICENSE", "NAME"] => {
                let url = document.license.take().and_then(|license| license.url);
                document.license = Some(LicenseConfig {
                    name: value.to_string(),
                    url,
                });
            }
            ["DOCUMENT", "LICENSE", "URL"] => {
                let license = document.license.as_mut().ok_or_else(|| {
                    ConfigError::env_parse_error(key, "license name must be set before its URL")
                })?;
                license.url = optional(value);
            }

            // Assembler section
            ["ASSEMBLER", "SWAGGER_ANNOTATIONS"] => {
                self.config.assembler.swagger_annotations = parse_bool(value)
                    .ok_or_else(|| ConfigError::env_parse_error(key, "expected boolean"))?;
            }
            ["ASSEMBLER", "COLLAPSE_NULLABLE"] => {
                self.config.assembler.collapse_nullable = parse_bool(value)
                    .ok_or_else(|| ConfigError::env_parse_error(key, "expected boolean"))?;
            }

            // Logging section
            ["LOGGING", "ENABLED"] => {
                self.config.logging.enabled = parse_bool(value)
                    .ok_or_else(|| ConfigError::env_parse_error(key, "expected boolean"))?;
            }
            ["LOGGING", "LEVEL"] => {
                self.config.logging.level = value.to_string();
            }
            ["LOGGING", "FORMAT"] => {
                self.config.logging.format = match value.to_lowercase().as_str() {
                    "json" => LogFormat::Json,
                    "pretty" => LogFormat::Pretty,
                    _ => {
                        return Err(ConfigError::env_parse_error(
                            key,
                            "expected 'json' or 'pretty'",
                        ))
                    }
                };
            }
            ["LOGGING", "INCLUDE_LOCATION"] => {
                self.config.logging.include_location = parse_bool(value)
                    .ok_or_else(|| ConfigError::env_parse_error(key, "expected boolean"))?;
            }

            // Servers and tags are lists and only come from files
            _ => {}
        }

        Ok(())
    }
}

fn optional(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Parse a boolean from a string.
fn parse_bool(s: &str) -> Option<bool> {
    match s.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
