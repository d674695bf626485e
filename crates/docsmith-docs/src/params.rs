//! Parameter and header expansion.
//!
//! Parameter shapes are never referenced: each top-level property becomes
//! its own parameter (or response header).

use std::collections::HashSet;

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::builder::Assembly;
use crate::descriptor::{RequestDescriptor, ShapeUse};
use crate::error::{DocsError, DocsResult};
use crate::openapi::{Header, Operation, Parameter, ParameterIn};

const COOKIE_NOTE: &str = " \n>Note for Swagger UI and Swagger Editor users:  \n>Cookie authentication \
is currently not supported for \"try it out\" requests due to browser security restrictions. \
See [this issue](https://github.com/swagger-api/swagger-js/issues/1163) for more information. \
[SwaggerHub](https://swagger.io/tools/swaggerhub/) does not have this limitation. ";

const PARAMETER_ONLY_KEYS: [&str; 6] = [
    "title",
    "description",
    "explode",
    "example",
    "examples",
    "deprecated",
];

impl Assembly<'_> {
    pub(crate) fn route_parameters(
        &mut self,
        operation: &mut Operation,
        request: &RequestDescriptor,
    ) -> DocsResult<()> {
        let Some(location) = request.location.parameter_in() else {
            return Ok(());
        };
        let ShapeUse::Single(decl) = &request.shape else {
            return Err(DocsError::UnsupportedShape {
                operation_id: operation.operation_id.clone(),
                reason: format!(
                    "{} parameters are expanded from a single shape, not an array or union",
                    request.location.as_str()
                ),
            });
        };
        let name = self.name_of(&operation.operation_id, decl)?;
        let schema = self.schemas.get(&name).cloned().unwrap_or(Value::Null);
        let parameters = expand_parameters(
            &operation.operation_id,
            &schema,
            location,
            self.settings.swagger_annotations,
        )?;
        operation.parameters.extend(parameters);
        Ok(())
    }
}

/// Expands the top-level properties of `schema` into parameters.
pub(crate) fn expand_parameters(
    operation_id: &str,
    schema: &Value,
    location: ParameterIn,
    swagger_annotations: bool,
) -> DocsResult<Vec<Parameter>> {
    let required = required_set(schema);
    let mut parameters = Vec::new();
    for (name, property) in properties(schema) {
        let is_required = required.contains(name.as_str());
        if location == ParameterIn::Path && !is_required {
            return Err(DocsError::OptionalPathParameter {
                operation_id: operation_id.to_string(),
                name: name.clone(),
            });
        }
        let mut description = string_field(property, "description");
        if location == ParameterIn::Cookie && swagger_annotations {
            description = Some(format!("{}{COOKIE_NOTE}", description.unwrap_or_default()));
        }
        parameters.push(Parameter {
            name: name.clone(),
            location,
            description,
            required: is_required,
            deprecated: bool_field(property, "deprecated"),
            explode: bool_field(property, "explode"),
            schema: strip(property, &PARAMETER_ONLY_KEYS),
            example: property.get("example").cloned(),
        });
    }
    Ok(parameters)
}

/// Expands the top-level properties of `schema` into response headers.
pub(crate) fn expand_headers(schema: &Value) -> IndexMap<String, Header> {
    let required = required_set(schema);
    properties(schema)
        .map(|(name, property)| {
            let header = Header {
                description: string_field(property, "description"),
                required: required.contains(name.as_str()),
                deprecated: bool_field(property, "deprecated"),
                example: property.get("example").cloned(),
                schema: Some(strip(property, &PARAMETER_ONLY_KEYS)),
            };
            (name.clone(), header)
        })
        .collect()
}

fn properties(schema: &Value) -> impl Iterator<Item = (&String, &Value)> {
    schema
        .get("properties")
        .and_then(Value::as_object)
        .into_iter()
        .flat_map(Map::iter)
}

fn required_set(schema: &Value) -> HashSet<&str> {
    schema
        .get("required")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_str)
        .collect()
}

fn string_field(property: &Value, key: &str) -> Option<String> {
    property.get(key).and_then(Value::as_str).map(str::to_string)
}

fn bool_field(property: &Value, key: &str) -> bool {
    property.get(key).and_then(Value::as_bool).unwrap_or(false)
}

fn strip(property: &Value, keys: &[&str]) -> Value {
    match property {
        Value::Object(object) => Value::Object(
            object
                .iter()
                .filter(|(key, _)| !keys.contains(&key.as_str()))
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
        ),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pet_query() -> Value {
        json!({
            "title": "PetQuery",
            "type": "object",
            "properties": {
                "status": {
                    "title": "Status",
                    "description": "Status values to filter by",
                    "type": "string",
                    "example": "available"
                },
                "limit": {"type": "integer", "deprecated": true}
            },
            "required": ["status"]
        })
    }

    #[test]
    fn test_expand_query_parameters() {
        let parameters =
            expand_parameters("findPets", &pet_query(), ParameterIn::Query, true).unwrap();
        assert_eq!(parameters.len(), 2);

        let status = &parameters[0];
        assert_eq!(status.name, "status");
        assert!(status.required);
        assert_eq!(status.description.as_deref(), Some("Status values to filter by"));
        assert_eq!(status.example, Some(json!("available")));
        assert_eq!(status.schema, json!({"type": "string"}));

        let limit = &parameters[1];
        assert!(!limit.required);
        assert!(limit.deprecated);
        assert_eq!(limit.schema, json!({"type": "integer"}));
    }

    #[test]
    fn test_optional_path_parameter_rejected() {
        let err = expand_parameters("findPets", &pet_query(), ParameterIn::Path, true).unwrap_err();
        assert!(matches!(
            err,
            DocsError::OptionalPathParameter { ref name, .. } if name == "limit"
        ));
    }

    #[test]
    fn test_cookie_note() {
        let annotated =
            expand_parameters("findPets", &pet_query(), ParameterIn::Cookie, true).unwrap();
        let description = annotated[1].description.as_deref().unwrap();
        assert!(description.contains("Cookie authentication"));

        let plain = expand_parameters("findPets", &pet_query(), ParameterIn::Cookie, false).unwrap();
        assert!(plain[1].description.is_none());
    }

    #[test]
    fn test_expand_headers() {
        let headers = expand_headers(&json!({
            "type": "object",
            "properties": {
                "X-Rate-Limit": {"type": "integer", "description": "calls per hour"}
            },
            "required": ["X-Rate-Limit"]
        }));
        let header = &headers["X-Rate-Limit"];
        assert!(header.required);
        assert_eq!(header.description.as_deref(), Some("calls per hour"));
        assert_eq!(header.schema, Some(json!({"type": "integer"})));
    }
}
