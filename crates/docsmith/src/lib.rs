//! # Docsmith
//!
//! **OpenAPI 3.0 and AsyncAPI 2.4 documents from typed descriptors**
//!
//! Docsmith describes an API with endpoint and channel descriptors whose
//! payloads are Rust types implementing [`schemars::JsonSchema`]. The
//! assembler turns those descriptors into a document:
//!
//! - every shape gets one stable component name, promoted to its qualified
//!   path when two different types share a short name
//! - query, header, path and cookie shapes become parameters
//! - bodies and responses reference `components.schemas`
//! - responses sharing a status code and media type fold into `oneOf`
//! - links are validated against the response they start from
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use docsmith::prelude::*;
//!
//! let config = ConfigLoader::new()
//!     .with_defaults()
//!     .with_optional_file("docsmith.toml")?
//!     .with_env_prefix("DOCSMITH")
//!     .load()?;
//! docsmith::init_logging(&config)?;
//!
//! let mut builder = docsmith::openapi_builder(&config)?;
//! builder.add_endpoint(
//!     EndpointDescriptor::builder("/pet/{petId}", "getPetById")
//!         .method(HttpMethod::Get)
//!         .request(RequestDescriptor::path(ShapeDecl::of::<PetPath>()))
//!         .response(ResponseDescriptor::json("PetResponse", ShapeDecl::of::<Pet>()))
//!         .build()?,
//! )?;
//!
//! let mut registry = docsmith::shape_registry(&config);
//! let document = builder.generate(&mut registry)?;
//! let page = SwaggerUi::embedded("/docs", &document)?.html();
//! ```
//!
//! ## Crates
//!
//! ```text
//! docsmith-schema     shape naming and generation
//! docsmith-docs       document model, assemblers, UI pages
//! docsmith-config     layered configuration
//! docsmith-telemetry  logging setup
//! ```

#![doc(html_root_url = "https://docs.rs/docsmith/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export the shape registry
pub use docsmith_schema as schema;

// Re-export document assembly
pub use docsmith_docs as docs;

// Re-export configuration
pub use docsmith_config as config;

// Re-export logging
pub use docsmith_telemetry as telemetry;

use docsmith_config::{DocsmithConfig, LogFormat};
use docsmith_docs::{AssemblerSettings, Contact, DocsResult, OpenApiBuilder, Tag};
use docsmith_schema::{RegistrySettings, ShapeRegistry};
use docsmith_telemetry::{LogConfig, TelemetryResult};

/// Creates an [`OpenApiBuilder`] carrying the document metadata, servers and
/// tags of `config`.
///
/// # Errors
///
/// Returns [`DocsError::TagConflict`](docsmith_docs::DocsError::TagConflict)
/// when two configured tags share a name but not a description.
pub fn openapi_builder(config: &DocsmithConfig) -> DocsResult<OpenApiBuilder> {
    let document = &config.document;
    let mut builder = OpenApiBuilder::new(&document.title, &document.version).settings(
        AssemblerSettings {
            openapi_version: document.openapi_version.clone(),
            swagger_annotations: config.assembler.swagger_annotations,
        },
    );

    if let Some(description) = &document.description {
        builder = builder.description(description);
    }
    if let Some(terms) = &document.terms_of_service {
        builder = builder.terms_of_service(terms);
    }
    if let Some(contact) = &document.contact {
        builder = builder.contact(Contact {
            name: contact.name.clone(),
            url: contact.url.clone(),
            email: contact.email.clone(),
        });
    }
    if let Some(license) = &document.license {
        builder = builder.license(&license.name, license.url.clone());
    }
    if let Some(docs) = &document.external_docs {
        builder = builder.external_docs(&docs.url, docs.description.clone());
    }
    for server in &config.servers {
        builder = builder.server(&server.url, server.description.clone());
    }
    for tag in &config.tags {
        builder.add_tag(&Tag::new(&tag.name, tag.description.as_deref()))?;
    }

    Ok(builder)
}

/// Creates a [`ShapeRegistry`] with the naming settings of `config`.
#[must_use]
pub fn shape_registry(config: &DocsmithConfig) -> ShapeRegistry {
    ShapeRegistry::with_settings(RegistrySettings {
        collapse_nullable: config.assembler.collapse_nullable,
    })
}

/// Translates the logging section of `config` into a [`LogConfig`].
#[must_use]
pub fn log_config(config: &DocsmithConfig) -> LogConfig {
    let logging = &config.logging;
    LogConfig {
        enabled: logging.enabled,
        level: logging.level.clone(),
        json_format: logging.format == LogFormat::Json,
        file_line_info: logging.include_location,
        ..LogConfig::default()
    }
}

/// Installs the global log subscriber described by `config`.
///
/// # Errors
///
/// Returns an error if the level is invalid or a subscriber is already
/// installed.
pub fn init_logging(config: &DocsmithConfig) -> TelemetryResult<()> {
    docsmith_telemetry::init_logging(&log_config(config))
}

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```rust,ignore
/// use docsmith::prelude::*;
/// ```
pub mod prelude {
    pub use docsmith_schema::{SchemaError, SchemaResult, ShapeDecl, ShapeRegistry};

    pub use docsmith_docs::{
        AsyncApi, AsyncApiBuilder, AsyncOperationDescriptor, AsyncServer, ChannelDescriptor,
        DocsError, DocsResult, Encoding, EndpointDescriptor, HttpMethod, LinkDescriptor, OpenApi,
        OpenApiBuilder, ParamLocation, ReDoc, RequestDescriptor, ResponseDescriptor,
        SecurityScheme, SecurityUse, SwaggerUi, Tag, UnionResponse,
    };

    pub use docsmith_config::{ConfigError, ConfigLoader, DocsmithConfig};

    pub use docsmith_telemetry::LogConfig;
}

#[cfg(test)]
mod tests {
    use super::*;
    use docsmith_config::{ContactConfig, DocumentConfig, LoggingConfig};

    #[test]
    fn test_openapi_builder_from_config() {
        let config = DocsmithConfig::builder()
            .document(DocumentConfig {
                title: "Pet Store".to_string(),
                version: "1.0.0".to_string(),
                description: Some("Pets".to_string()),
                contact: Some(ContactConfig {
                    name: Some("API Team".to_string()),
                    url: None,
                    email: Some("team@example.com".to_string()),
                }),
                ..Default::default()
            })
            .server("https://petstore.example.com/v1", None)
            .tag("pet", Some("Everything about your Pets".to_string()))
            .build();

        let builder = openapi_builder(&config).unwrap();
        let document = builder.generate(&mut shape_registry(&config)).unwrap();
        assert_eq!(document.info.title, "Pet Store");
        assert_eq!(document.info.description.as_deref(), Some("Pets"));
        assert_eq!(
            document.info.contact.unwrap().email.as_deref(),
            Some("team@example.com")
        );
        assert_eq!(document.servers[0].url, "https://petstore.example.com/v1");
        assert_eq!(document.tags[0].name, "pet");
    }

    #[test]
    fn test_openapi_builder_settings() {
        let config = DocsmithConfig::production();
        let builder = openapi_builder(&config).unwrap();
        assert!(!builder.assembler_settings().swagger_annotations);
        assert_eq!(builder.assembler_settings().openapi_version, "3.0.3");
    }

    #[test]
    fn test_shape_registry_settings() {
        let mut config = DocsmithConfig::default();
        config.assembler.collapse_nullable = false;
        assert!(!shape_registry(&config).settings().collapse_nullable);
    }

    #[test]
    fn test_log_config_mapping() {
        let config = DocsmithConfig::builder()
            .logging(LoggingConfig {
                level: "warn".to_string(),
                format: LogFormat::Pretty,
                include_location: true,
                ..Default::default()
            })
            .build();
        let log = log_config(&config);
        assert_eq!(log.level, "warn");
        assert!(!log.json_format);
        assert!(log.file_line_info);
        assert_eq!(log.service_name, "docsmith");
    }
}
