//! Example values derived from shape trees.

use serde_json::{json, Map, Value};

use crate::normalize::ref_name;

const MAX_DEPTH: usize = 8;

/// Builds an example object from a shape tree.
///
/// Each property takes its `example`, then its `default`, then a zero value
/// for its type. References are followed into `definitions`: enums yield
/// their first member and objects are expanded recursively.
///
/// ```
/// use docsmith_schema::example_from_schema;
/// use serde_json::{json, Map};
///
/// let schema = json!({
///     "type": "object",
///     "properties": {
///         "id": {"type": "integer", "example": 7},
///         "name": {"type": "string"}
///     }
/// });
/// let example = example_from_schema(&schema, &Map::new());
/// assert_eq!(example, json!({"id": 7, "name": ""}));
/// ```
pub fn example_from_schema(schema: &Value, definitions: &Map<String, Value>) -> Value {
    object_example(schema, definitions, 0)
}

fn object_example(schema: &Value, definitions: &Map<String, Value>, depth: usize) -> Value {
    let mut example = Map::new();
    let Some(properties) = schema.get("properties").and_then(Value::as_object) else {
        return Value::Object(example);
    };
    for (key, property) in properties {
        example.insert(key.clone(), property_example(property, definitions, depth));
    }
    Value::Object(example)
}

fn property_example(property: &Value, definitions: &Map<String, Value>, depth: usize) -> Value {
    if let Some(example) = property.get("example") {
        return example.clone();
    }
    if let Some(default) = property.get("default") {
        return default.clone();
    }
    if let Some(target) = resolve(property, definitions) {
        return ref_example(target, definitions, depth);
    }
    if property.get("type").is_some_and(|t| t == "array") {
        return match property.get("items").and_then(|items| resolve(items, definitions)) {
            Some(target) => json!([ref_example(target, definitions, depth)]),
            None => json!([]),
        };
    }
    if let Some(first) = property
        .get("enum")
        .and_then(Value::as_array)
        .and_then(|members| members.first())
    {
        return first.clone();
    }
    match property.get("type").and_then(Value::as_str) {
        Some("string") => json!(""),
        Some("integer") => json!(0),
        Some("number") => json!(0.0),
        Some("boolean") => json!(false),
        Some("object") => object_example(property, definitions, depth + 1),
        Some("null") => Value::Null,
        _ => json!("object"),
    }
}

fn ref_example(target: &Value, definitions: &Map<String, Value>, depth: usize) -> Value {
    if let Some(first) = target
        .get("enum")
        .and_then(Value::as_array)
        .and_then(|members| members.first())
    {
        return first.clone();
    }
    if depth >= MAX_DEPTH {
        return json!({});
    }
    object_example(target, definitions, depth + 1)
}

fn resolve<'a>(node: &Value, definitions: &'a Map<String, Value>) -> Option<&'a Value> {
    node.get("$ref")
        .and_then(Value::as_str)
        .and_then(ref_name)
        .and_then(|name| definitions.get(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_example_prefers_example_then_default() {
        let schema = json!({
            "properties": {
                "a": {"type": "integer", "example": 3, "default": 1},
                "b": {"type": "integer", "default": 1},
                "c": {"type": "boolean"}
            }
        });
        assert_eq!(
            example_from_schema(&schema, &Map::new()),
            json!({"a": 3, "b": 1, "c": false})
        );
    }

    #[test]
    fn test_example_follows_refs() {
        let definitions = json!({
            "Status": {"type": "string", "enum": ["available", "sold"]},
            "Tag": {"type": "object", "properties": {"name": {"type": "string"}}}
        });
        let schema = json!({
            "properties": {
                "status": {"$ref": "#/components/schemas/Status"},
                "tag": {"$ref": "#/components/schemas/Tag"},
                "tags": {"type": "array", "items": {"$ref": "#/components/schemas/Tag"}},
                "names": {"type": "array", "items": {"type": "string"}}
            }
        });
        let example = example_from_schema(&schema, definitions.as_object().unwrap());
        assert_eq!(
            example,
            json!({
                "status": "available",
                "tag": {"name": ""},
                "tags": [{"name": ""}],
                "names": []
            })
        );
    }

    #[test]
    fn test_example_stops_on_recursion() {
        let definitions = json!({
            "Node": {"type": "object", "properties": {"next": {"$ref": "#/definitions/Node"}}}
        });
        let schema = json!({"properties": {"next": {"$ref": "#/definitions/Node"}}});
        let example = example_from_schema(&schema, definitions.as_object().unwrap());
        assert!(example["next"]["next"].is_object());
    }
}
