//! # Docsmith Schema
//!
//! The shape registry behind docsmith's document generation.
//!
//! A *shape* is the canonical JSON-Schema tree of a typed declaration. This
//! crate turns Rust types implementing [`schemars::JsonSchema`] (or raw
//! schema values) into shapes, gives every shape a stable, unique name, and
//! flattens nested declarations into a sibling `definitions` map.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use docsmith_schema::{ShapeDecl, ShapeRegistry};
//!
//! #[derive(schemars::JsonSchema)]
//! struct Pet {
//!     id: i64,
//!     name: String,
//! }
//!
//! let mut registry = ShapeRegistry::new();
//! let pet = ShapeDecl::of::<Pet>();
//!
//! assert_eq!(registry.register_and_name(&pet)?, "Pet");
//! let shape = registry.generate_shape(&pet)?;
//! assert_eq!(shape.schema["type"], "object");
//! ```
//!
//! ## Naming
//!
//! - A declaration is named after its short name (`Pet`).
//! - Registering the same declaration again returns the same name.
//! - When two *different* declarations share a short name, both are promoted
//!   to their qualified path (`my_crate__models__Pet`). Declarations without a
//!   qualified path cannot be promoted and fail with
//!   [`SchemaError::AmbiguousName`].
//!
//! Names live as long as the registry: construct one registry per process (or
//! per test) and pass it to every document you build.

mod decl;
mod error;
mod example;
mod normalize;
mod registry;

pub use decl::{ShapeDecl, ShapeKey};
pub use error::{SchemaError, SchemaResult};
pub use example::example_from_schema;
pub use normalize::{
    collapse_nullable, fingerprint, inline_refs, normalize_name, qualified_name, ref_name,
    rewrite_ref_prefix, rewrite_refs, DEFINITIONS_PREFIX,
};
pub use registry::{BulkShapes, GeneratedShape, RegistrySettings, ShapeRegistry};
