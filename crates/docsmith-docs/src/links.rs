//! Cross-operation links.
//!
//! A link states that a value taken from a response (a header, or a field of
//! its body) feeds a parameter of another operation. Link expressions are
//! validated against the response's shapes when the link is declared.
//! Declared links are kept in a [`LinkRegistry`] keyed by response name, and
//! the assembler attaches them to every response object the named response
//! produces.

use docsmith_schema::{ref_name, ShapeRegistry};
use indexmap::IndexMap;
use serde_json::{Map, Value};
use tracing::debug;

use crate::descriptor::{ParamLocation, ResponseDescriptor};
use crate::error::{DocsError, DocsResult};
use crate::openapi::Link;

const HEADER_PREFIX: &str = "$response.header.";
const BODY_PREFIX: &str = "$response.body#";

/// A validated link expression bound to a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkDescriptor {
    response: String,
    expression: String,
    description: Option<String>,
}

impl LinkDescriptor {
    /// Declares a link sourced from `response`.
    ///
    /// `expression` is either `$response.header.<name>` or
    /// `$response.body#/<path>`. The header must be declared by the
    /// response's header shape. Every segment of a body path must name a
    /// field of the response's body shape, and every segment but the last
    /// must be object-shaped.
    pub fn new(
        response: &ResponseDescriptor,
        expression: impl Into<String>,
        description: Option<&str>,
    ) -> DocsResult<Self> {
        let expression = expression.into();
        let mut scratch = ShapeRegistry::new();
        if let Some(header) = expression.strip_prefix(HEADER_PREFIX) {
            validate_header(&mut scratch, response, header)?;
        } else if let Some(path) = expression.strip_prefix(BODY_PREFIX) {
            validate_body(&mut scratch, response, &expression, path)?;
        } else {
            return Err(DocsError::UnsupportedLinkExpression { expression });
        }
        Ok(Self {
            response: response.name().to_string(),
            expression,
            description: description.map(str::to_string),
        })
    }

    /// Name of the source response.
    pub fn response(&self) -> &str {
        &self.response
    }

    /// The runtime expression.
    pub fn expression(&self) -> &str {
        &self.expression
    }
}

fn validate_header(
    registry: &mut ShapeRegistry,
    response: &ResponseDescriptor,
    header: &str,
) -> DocsResult<()> {
    let unknown = || DocsError::UnknownLinkHeader {
        response: response.name().to_string(),
        header: header.to_string(),
    };
    let decl = response.header_shape().ok_or_else(unknown)?;
    let shape = registry.generate_shape(decl)?;
    let declared = shape
        .schema
        .get("properties")
        .and_then(Value::as_object)
        .is_some_and(|properties| properties.contains_key(header));
    if declared {
        Ok(())
    } else {
        Err(unknown())
    }
}

fn validate_body(
    registry: &mut ShapeRegistry,
    response: &ResponseDescriptor,
    expression: &str,
    path: &str,
) -> DocsResult<()> {
    let decl = response
        .body_shape()
        .ok_or_else(|| DocsError::LinkRequiresShape {
            response: response.name().to_string(),
            expression: expression.to_string(),
        })?;
    let shape = registry.generate_shape(decl)?;
    let definitions: Map<String, Value> = shape.definitions.into_iter().collect();

    let mut node = &shape.schema;
    let mut parent = decl.name().to_string();
    for segment in path.split('/').filter(|segment| !segment.is_empty()) {
        let field_error = |reason: String| DocsError::UnknownLinkField {
            response: response.name().to_string(),
            expression: expression.to_string(),
            reason,
        };
        let resolved = resolve(node, &definitions);
        let properties = resolved
            .get("properties")
            .and_then(Value::as_object)
            .ok_or_else(|| field_error(format!("'{parent}' is not an object")))?;
        node = properties
            .get(segment)
            .ok_or_else(|| field_error(format!("field '{segment}' not found in '{parent}'")))?;
        segment.clone_into(&mut parent);
    }
    Ok(())
}

fn resolve<'a>(node: &'a Value, definitions: &'a Map<String, Value>) -> &'a Value {
    node.get("$ref")
        .and_then(Value::as_str)
        .and_then(ref_name)
        .and_then(|name| definitions.get(name))
        .unwrap_or(node)
}

/// Links declared on a document, keyed by source response name.
#[derive(Debug, Clone, Default)]
pub struct LinkRegistry {
    links: IndexMap<String, IndexMap<String, Link>>,
}

impl LinkRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `link` as feeding `param_name` at `location` of the
    /// operation `operation_id`.
    ///
    /// The link key is `operation_id/location/param_name`. Returns `false`
    /// when the key is already registered for the response.
    pub fn register(
        &mut self,
        link: &LinkDescriptor,
        operation_id: &str,
        location: ParamLocation,
        param_name: &str,
    ) -> bool {
        let key = format!("{operation_id}/{}/{param_name}", location.as_str());
        let links = self.links.entry(link.response.clone()).or_default();
        if links.contains_key(&key) {
            debug!(response = %link.response, key = %key, "link already registered");
            return false;
        }
        let mut value = Link {
            operation_id: operation_id.to_string(),
            description: link.description.clone(),
            ..Link::default()
        };
        if location.is_body() {
            value.request_body = Some(link.expression.clone());
        } else {
            value
                .parameters
                .insert(param_name.to_string(), link.expression.clone());
        }
        links.insert(key, value);
        true
    }

    /// Links sourced from the named response.
    pub fn links_for(&self, response: &str) -> Option<&IndexMap<String, Link>> {
        self.links.get(response)
    }

    /// Whether no link is registered.
    pub fn is_empty(&self) -> bool {
        self.links.values().all(IndexMap::is_empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docsmith_schema::ShapeDecl;
    use schemars::JsonSchema;

    #[allow(dead_code)]
    #[derive(JsonSchema)]
    struct Token {
        token: String,
    }

    #[allow(dead_code)]
    #[derive(JsonSchema)]
    struct LoginBody {
        code: i32,
        data: Token,
    }

    #[allow(dead_code)]
    #[derive(JsonSchema)]
    #[schemars(rename_all = "kebab-case")]
    struct LoginHeader {
        x_token: String,
    }

    fn login() -> ResponseDescriptor {
        ResponseDescriptor::json("LoginResponse", ShapeDecl::of::<LoginBody>())
            .header(ShapeDecl::of::<LoginHeader>())
    }

    #[test]
    fn test_body_link_resolves_nested_field() {
        let link = LinkDescriptor::new(&login(), "$response.body#/data/token", None).unwrap();
        assert_eq!(link.response(), "LoginResponse");
        assert_eq!(link.expression(), "$response.body#/data/token");
    }

    #[test]
    fn test_body_link_missing_field() {
        let err = LinkDescriptor::new(&login(), "$response.body#/data/secret", None).unwrap_err();
        assert!(matches!(err, DocsError::UnknownLinkField { .. }));
        assert!(err.to_string().contains("secret"));
    }

    #[test]
    fn test_body_link_through_scalar() {
        let err = LinkDescriptor::new(&login(), "$response.body#/code/value", None).unwrap_err();
        assert!(err.to_string().contains("'code' is not an object"));
    }

    #[test]
    fn test_body_link_requires_shape() {
        let text = ResponseDescriptor::text("Text");
        let err = LinkDescriptor::new(&text, "$response.body#/data", None).unwrap_err();
        assert!(matches!(err, DocsError::LinkRequiresShape { .. }));
    }

    #[test]
    fn test_header_link() {
        assert!(LinkDescriptor::new(&login(), "$response.header.x-token", None).is_ok());
        let err = LinkDescriptor::new(&login(), "$response.header.x-other", None).unwrap_err();
        assert!(matches!(err, DocsError::UnknownLinkHeader { ref header, .. } if header == "x-other"));
    }

    #[test]
    fn test_unsupported_expression() {
        let err = LinkDescriptor::new(&login(), "$request.path.id", None).unwrap_err();
        assert!(matches!(err, DocsError::UnsupportedLinkExpression { .. }));
    }

    #[test]
    fn test_register_builds_link_objects() {
        let mut registry = LinkRegistry::new();
        let token = LinkDescriptor::new(&login(), "$response.body#/data/token", Some("token"))
            .unwrap();
        assert!(registry.register(&token, "getUser", ParamLocation::Query, "token"));
        assert!(!registry.register(&token, "getUser", ParamLocation::Query, "token"));
        assert!(registry.register(&token, "updateUser", ParamLocation::Json, "token"));

        let links = registry.links_for("LoginResponse").unwrap();
        assert_eq!(links.len(), 2);
        let query = &links["getUser/query/token"];
        assert_eq!(query.operation_id, "getUser");
        assert_eq!(query.parameters["token"], "$response.body#/data/token");
        assert_eq!(query.description.as_deref(), Some("token"));
        let body = &links["updateUser/json/token"];
        assert_eq!(body.request_body.as_deref(), Some("$response.body#/data/token"));
        assert!(body.parameters.is_empty());
    }
}
