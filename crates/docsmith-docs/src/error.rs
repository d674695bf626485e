//! Error types for the documentation generation crate.
//!
//! Every invariant violated while describing or assembling a document maps
//! onto one variant here. Assembly stops at the first error.

use docsmith_schema::SchemaError;
use thiserror::Error;

/// Errors that can occur during documentation generation.
#[derive(Debug, Error)]
pub enum DocsError {
    /// Failed to serialize a document to JSON.
    #[error("Failed to serialize document: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Failed to serialize a document to YAML.
    #[error("Failed to serialize document as YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// Shape naming or generation failed.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// Tag redeclared with a different description.
    #[error("Tag '{name}' already exists with a different description")]
    TagConflict {
        /// The tag name.
        name: String,
    },

    /// Security scheme redeclared with a different definition.
    #[error("Security scheme '{name}' already exists with a different definition")]
    SecuritySchemeConflict {
        /// The scheme name.
        name: String,
    },

    /// HTTP method registered twice on the same path.
    #[error("Method {method} already exists on path '{path}'")]
    DuplicateMethod {
        /// The path template.
        path: String,
        /// The duplicated method.
        method: String,
    },

    /// Two declarations produced content for the same status and media type.
    #[error("Media type '{media_type}' already exists for response {status} of '{operation_id}'")]
    DuplicateMediaType {
        /// The operation being assembled.
        operation_id: String,
        /// The response status.
        status: String,
        /// The duplicated media type.
        media_type: String,
    },

    /// Two responses declared the same link key.
    #[error("Link '{key}' already exists on response {status} of '{operation_id}'")]
    DuplicateLink {
        /// The operation being assembled.
        operation_id: String,
        /// The response status.
        status: String,
        /// The duplicated link key.
        key: String,
    },

    /// A response header collides with a different definition.
    #[error("Header '{header}' already exists with a different definition on response {status} of '{operation_id}'")]
    HeaderConflict {
        /// The operation being assembled.
        operation_id: String,
        /// The response status.
        status: String,
        /// The colliding header.
        header: String,
    },

    /// The endpoint path does not start with `/`.
    #[error("Invalid path '{path}': paths must start with '/'")]
    InvalidPath {
        /// The offending path.
        path: String,
    },

    /// A path parameter is not required.
    #[error("Path parameter '{name}' of '{operation_id}' must be required")]
    OptionalPathParameter {
        /// The operation being assembled.
        operation_id: String,
        /// The parameter name.
        name: String,
    },

    /// A multipart body has no encoding directive.
    #[error("Multipart body of '{operation_id}' requires an encoding directive")]
    MissingEncoding {
        /// The operation being assembled.
        operation_id: String,
    },

    /// An array body shares its media type with another body.
    #[error("Array body of '{operation_id}' cannot share media type '{media_type}' with another body")]
    ArrayBodyConflict {
        /// The operation being assembled.
        operation_id: String,
        /// The shared media type.
        media_type: String,
    },

    /// More than one response is marked as core.
    #[error("Endpoint '{operation_id}' marks {count} responses as core, at most one is allowed")]
    MultipleCoreResponses {
        /// The endpoint.
        operation_id: String,
        /// How many responses were marked.
        count: usize,
    },

    /// A body descriptor declares no media type.
    #[error("Body of '{operation_id}' declares no media type")]
    MissingMediaType {
        /// The operation being assembled.
        operation_id: String,
    },

    /// A descriptor uses a shape in a position that does not accept it.
    #[error("Unsupported shape for '{operation_id}': {reason}")]
    UnsupportedShape {
        /// The operation being assembled.
        operation_id: String,
        /// Why the shape was rejected.
        reason: String,
    },

    /// A descriptor is malformed.
    #[error("Invalid descriptor '{name}': {reason}")]
    InvalidDescriptor {
        /// The descriptor name.
        name: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A union response member sets an attribute reserved for the union.
    #[error("Union member '{member}' cannot set its own {attribute}")]
    InvalidUnionMember {
        /// The member response.
        member: String,
        /// The attribute it set.
        attribute: String,
    },

    /// A security scheme definition is invalid.
    #[error("Invalid security scheme: {reason}")]
    InvalidSecurityScheme {
        /// Why the scheme was rejected.
        reason: String,
    },

    /// A requested scope is not offered by the security scheme.
    #[error("Scope '{scope}' is not offered by the security scheme")]
    UnknownScope {
        /// The missing scope.
        scope: String,
    },

    /// A link expression names a header missing from the response.
    #[error("Header '{header}' is not declared on response '{response}'")]
    UnknownLinkHeader {
        /// The target response.
        response: String,
        /// The missing header.
        header: String,
    },

    /// A link expression names a body field missing from the response.
    #[error("Cannot resolve '{expression}' against response '{response}': {reason}")]
    UnknownLinkField {
        /// The target response.
        response: String,
        /// The runtime expression.
        expression: String,
        /// Which segment failed and why.
        reason: String,
    },

    /// A body link targets a response that carries no shape.
    #[error("Link '{expression}' requires response '{response}' to carry a shape")]
    LinkRequiresShape {
        /// The target response.
        response: String,
        /// The runtime expression.
        expression: String,
    },

    /// The runtime expression is neither a header nor a body expression.
    #[error("Unsupported link expression '{expression}': only $response.header.<name> and $response.body#/<path> are supported")]
    UnsupportedLinkExpression {
        /// The runtime expression.
        expression: String,
    },

    /// A channel references a server that is not declared.
    #[error("Channel '{channel}' references unknown server '{server}'")]
    UnknownServer {
        /// The channel name.
        channel: String,
        /// The missing server.
        server: String,
    },

    /// A channel template parameter is not declared.
    #[error("Template parameter '{parameter}' of channel '{channel}' is not declared")]
    MissingChannelParameter {
        /// The channel name.
        channel: String,
        /// The missing parameter.
        parameter: String,
    },
}

/// Result type for documentation operations.
pub type DocsResult<T> = Result<T, DocsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialization_error() {
        let err: DocsError = serde_json::from_str::<String>("invalid")
            .unwrap_err()
            .into();
        assert!(matches!(err, DocsError::SerializationError(_)));
        assert!(err.to_string().contains("serialize"));
    }

    #[test]
    fn test_schema_error_is_transparent() {
        let err: DocsError = SchemaError::ambiguous("Item", "no qualified path").into();
        assert!(matches!(err, DocsError::Schema(_)));
        assert!(err.to_string().contains("'Item'"));
    }

    #[test]
    fn test_duplicate_method_error() {
        let err = DocsError::DuplicateMethod {
            path: "/pet".to_string(),
            method: "GET".to_string(),
        };
        assert!(err.to_string().contains("GET"));
        assert!(err.to_string().contains("/pet"));
    }

    #[test]
    fn test_optional_path_parameter_error() {
        let err = DocsError::OptionalPathParameter {
            operation_id: "getPet".to_string(),
            name: "petId".to_string(),
        };
        assert!(err.to_string().contains("getPet"));
        assert!(err.to_string().contains("petId"));
    }

    #[test]
    fn test_unknown_link_field_error() {
        let err = DocsError::UnknownLinkField {
            response: "LoginResponse".to_string(),
            expression: "$response.body#/data/token".to_string(),
            reason: "field 'token' not found".to_string(),
        };
        assert!(err.to_string().contains("LoginResponse"));
        assert!(err.to_string().contains("token"));
    }
}
