//! # Docsmith Docs
//!
//! Assembles OpenAPI 3.0 and AsyncAPI 2.4 documents from typed endpoint and
//! channel descriptors.
//!
//! Endpoints are described with [`EndpointDescriptor`]s whose request and
//! response descriptors carry [`ShapeDecl`](docsmith_schema::ShapeDecl)s.
//! [`OpenApiBuilder::generate`] routes every descriptor into the document:
//!
//! - query, header, path and cookie shapes are expanded field by field into
//!   parameters (path parameters must be required)
//! - body shapes are referenced from `components.schemas`, arrays and unions
//!   included
//! - multipart and file shapes are inlined and merged
//! - responses are grouped by status code, folded into `oneOf` when several
//!   shapes share a media type, and carry merged headers and links
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use docsmith_docs::{EndpointDescriptor, HttpMethod, OpenApiBuilder, RequestDescriptor, ResponseDescriptor};
//! use docsmith_schema::{ShapeDecl, ShapeRegistry};
//!
//! let mut builder = OpenApiBuilder::new("Pet Store", "1.0.0");
//! builder.add_endpoint(
//!     EndpointDescriptor::builder("/pet/{petId}", "getPetById")
//!         .method(HttpMethod::Get)
//!         .request(RequestDescriptor::path(ShapeDecl::of::<PetPath>()))
//!         .response(ResponseDescriptor::json("PetResponse", ShapeDecl::of::<Pet>()))
//!         .build()?,
//! )?;
//!
//! let mut registry = ShapeRegistry::new();
//! let document = builder.generate(&mut registry)?;
//! println!("{}", document.to_yaml()?);
//! ```
//!
//! The generated document can be rendered with [`SwaggerUi`] or [`ReDoc`].

mod asyncapi;
mod body;
mod builder;
mod descriptor;
mod error;
mod links;
mod openapi;
mod params;
mod redoc;
mod responses;
mod security;
mod swagger;
mod tags;
mod xml;

pub use asyncapi::{
    AsyncApi, AsyncApiBuilder, AsyncComponents, AsyncOperation, AsyncOperationDescriptor,
    AsyncServer, Channel, ChannelDescriptor, ChannelParameter, Message, MessageObject,
};
pub use builder::{AssemblerSettings, OpenApiBuilder, COMPONENTS_PREFIX};
pub use descriptor::{
    template_parameters, EndpointBuilder, EndpointDescriptor, HttpMethod, ParamLocation,
    RequestDescriptor, ResponseDescriptor, ResponseEntry, ResponsePayload, ShapeUse, StatusCode,
    UnionResponse,
};
pub use error::{DocsError, DocsResult};
pub use links::{LinkDescriptor, LinkRegistry};
pub use openapi::{
    Components, Contact, Encoding, ExternalDocumentation, Header, Info, License, Link, MediaType,
    OpenApi, Operation, Parameter, ParameterIn, PathItem, RequestBody, Response,
    SecurityRequirement, Server, ServerVariable, Tag,
};
pub use redoc::{ExpandResponses, ReDoc, ReDocTheme};
pub use security::{ApiKeyLocation, OAuthFlow, OAuthFlows, SchemeRegistry, SecurityScheme, SecurityUse};
pub use swagger::{DocExpansion, DocumentSource, SwaggerUi};
pub use tags::TagRegistry;
pub use xml::{annotate as annotate_xml, is_xml_media_type};
