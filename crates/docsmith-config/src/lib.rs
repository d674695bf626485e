//! Typed configuration for docsmith.
//!
//! This crate provides a strongly-typed configuration for document
//! generation with support for:
//! - TOML and JSON configuration files
//! - Environment variable overrides
//! - Strict validation (fails on unknown fields)
//! - Layered configuration (defaults → file → env)
//!
//! # Overview
//!
//! The configuration is built around the [`DocsmithConfig`] struct:
//!
//! - [`DocumentConfig`] - document metadata (title, version, license, ...)
//! - [`ServerEntry`] / [`TagEntry`] - servers and tags listed in the document
//! - [`AssemblerConfig`] - assembly behavior
//! - [`LoggingConfig`] - log level and format
//!
//! # Example
//!
//! ```no_run
//! use docsmith_config::{ConfigLoader, DocsmithConfig};
//!
//! # fn main() -> Result<(), docsmith_config::ConfigError> {
//! let config = ConfigLoader::new()
//!     .with_defaults()
//!     .with_file("docsmith.toml")?
//!     .with_env_prefix("DOCSMITH")
//!     .load()?;
//!
//! println!("Generating {} {}", config.document.title, config.document.version);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration File Format
//!
//! ```toml
//! [document]
//! title = "Pet Store"
//! version = "1.0.0"
//! openapi_version = "3.0.3"
//!
//! [document.license]
//! name = "Apache 2.0"
//! url = "https://www.apache.org/licenses/LICENSE-2.0.html"
//!
//! [[servers]]
//! url = "https://petstore.example.com/v1"
//!
//! [[tags]]
//! name = "pet"
//! description = "Everything about your Pets"
//!
//! [assembler]
//! swagger_annotations = true
//! collapse_nullable = true
//!
//! [logging]
//! level = "info"
//! format = "json"
//! ```
//!
//! # Environment Variable Overrides
//!
//! Scalar values can be overridden via environment variables using the
//! format `PREFIX__SECTION__KEY`. For example:
//!
//! - `DOCSMITH__DOCUMENT__TITLE=Pet Store`
//! - `DOCSMITH__DOCUMENT__LICENSE__NAME=MIT`
//! - `DOCSMITH__LOGGING__FORMAT=pretty`

#![warn(missing_docs)]

mod config;
mod error;
mod loader;
mod sections;

pub use config::*;
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use sections::*;
