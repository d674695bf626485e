//! Shape declarations.
//!
//! A [`ShapeDecl`] is a handle on something that can produce a schema tree:
//! a Rust type implementing [`JsonSchema`], or a raw schema value.

use std::any::TypeId;
use std::fmt;

use schemars::generate::SchemaSettings;
use schemars::{JsonSchema, Schema, SchemaGenerator};
use serde_json::Value;

use crate::normalize::{fingerprint, normalize_name, qualified_name};

/// Stable identity of a declaration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ShapeKey {
    /// A Rust type.
    Type(TypeId),
    /// A declaration identified by an explicit path.
    Path(String),
    /// A declaration identified only by its name and structure.
    Structural {
        /// Short name of the declaration.
        name: String,
        /// Structural fingerprint of its tree.
        fingerprint: String,
    },
}

#[derive(Clone)]
enum ShapeSource {
    Typed(fn(&mut SchemaGenerator) -> Schema),
    Raw(Value),
}

/// A declaration that can be registered as a shape.
#[derive(Clone)]
pub struct ShapeDecl {
    name: String,
    qualified: Option<String>,
    key: ShapeKey,
    source: ShapeSource,
}

impl ShapeDecl {
    /// Declares the shape of a Rust type.
    ///
    /// The short name comes from [`JsonSchema::schema_name`], the qualified
    /// name from the full type path.
    pub fn of<T: JsonSchema + 'static>() -> Self {
        Self {
            name: normalize_name(&T::schema_name()),
            qualified: Some(qualified_name(std::any::type_name::<T>())),
            key: ShapeKey::Type(TypeId::of::<T>()),
            source: ShapeSource::Typed(SchemaGenerator::root_schema_for::<T>),
        }
    }

    /// Declares a shape from a raw schema with an explicit qualified path.
    pub fn with_path(name: &str, path: &str, schema: Value) -> Self {
        Self {
            name: normalize_name(name),
            qualified: Some(qualified_name(path)),
            key: ShapeKey::Path(path.to_string()),
            source: ShapeSource::Raw(schema),
        }
    }

    /// Declares an anonymous shape from a raw schema.
    ///
    /// Anonymous shapes are identified by name and structure only, so they
    /// cannot be disambiguated when a different shape takes the same name.
    pub fn anonymous(name: &str, schema: Value) -> Self {
        let name = normalize_name(name);
        Self {
            key: ShapeKey::Structural {
                name: name.clone(),
                fingerprint: fingerprint(&schema),
            },
            name,
            qualified: None,
            source: ShapeSource::Raw(schema),
        }
    }

    /// Short name of the declaration.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Qualified name, if the declaration has a stable origin path.
    pub fn qualified(&self) -> Option<&str> {
        self.qualified.as_deref()
    }

    /// Identity of the declaration.
    pub fn key(&self) -> &ShapeKey {
        &self.key
    }

    /// Produces the raw root schema, nested definitions included.
    pub(crate) fn raw_schema(&self) -> Value {
        match &self.source {
            ShapeSource::Typed(build) => {
                let mut generator = SchemaSettings::draft07().into_generator();
                Value::from(build(&mut generator))
            }
            ShapeSource::Raw(schema) => schema.clone(),
        }
    }
}

impl fmt::Debug for ShapeDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShapeDecl")
            .field("name", &self.name)
            .field("qualified", &self.qualified)
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

impl PartialEq for ShapeDecl {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for ShapeDecl {}
