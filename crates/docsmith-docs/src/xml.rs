//! XML annotation of shared shape trees.

use docsmith_schema::ref_name;
use indexmap::IndexMap;
use serde_json::{json, Value};

/// Whether a media type carries XML.
pub fn is_xml_media_type(media_type: &str) -> bool {
    media_type == "application/xml" || media_type == "text/xml" || media_type.ends_with("+xml")
}

/// Annotates the shared shape `name` and every shape it reaches for XML.
///
/// A shape that already has an `xml` key is left untouched, so shapes
/// reached from several endpoints are only annotated once.
pub fn annotate(schemas: &mut IndexMap<String, Value>, name: &str) {
    let Some(Value::Object(schema)) = schemas.get_mut(name) else {
        return;
    };
    if schema.contains_key("xml") {
        return;
    }
    let title = schema
        .get("title")
        .and_then(Value::as_str)
        .unwrap_or(name)
        .to_string();
    schema.insert("xml".to_string(), json!({"name": title}));

    let mut reached = Vec::new();
    if let Some(Value::Object(properties)) = schema.get_mut("properties") {
        for (key, property) in properties.iter_mut() {
            if let Some(target) = ref_target(property) {
                reached.push(target);
                continue;
            }
            if property.get("type").and_then(Value::as_str) != Some("array") {
                continue;
            }
            let Value::Object(property) = property else {
                continue;
            };
            property.insert("xml".to_string(), json!({"wrapped": true}));
            let Some(Value::Object(items)) = property.get_mut("items") else {
                continue;
            };
            let target = items
                .get("$ref")
                .and_then(Value::as_str)
                .and_then(ref_name)
                .map(str::to_string);
            match target {
                Some(target) => reached.push(target),
                None => {
                    items.insert("xml".to_string(), json!({"name": key}));
                }
            }
        }
    }

    for target in reached {
        annotate(schemas, &target);
    }
}

fn ref_target(node: &Value) -> Option<String> {
    node.get("$ref")
        .and_then(Value::as_str)
        .and_then(ref_name)
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schemas() -> IndexMap<String, Value> {
        let mut schemas = IndexMap::new();
        schemas.insert(
            "Pet".to_string(),
            json!({
                "title": "Pet",
                "type": "object",
                "properties": {
                    "category": {"$ref": "#/components/schemas/Category"},
                    "photoUrls": {"type": "array", "items": {"type": "string"}},
                    "tags": {"type": "array", "items": {"$ref": "#/components/schemas/Tag"}}
                }
            }),
        );
        schemas.insert(
            "Category".to_string(),
            json!({"title": "Category", "type": "object", "properties": {"id": {"type": "integer"}}}),
        );
        schemas.insert(
            "Tag".to_string(),
            json!({"type": "object", "properties": {"pet": {"$ref": "#/components/schemas/Pet"}}}),
        );
        schemas
    }

    #[test]
    fn test_annotates_reachable_shapes() {
        let mut schemas = schemas();
        annotate(&mut schemas, "Pet");

        let pet = &schemas["Pet"];
        assert_eq!(pet["xml"], json!({"name": "Pet"}));
        assert_eq!(pet["properties"]["photoUrls"]["xml"], json!({"wrapped": true}));
        assert_eq!(
            pet["properties"]["photoUrls"]["items"]["xml"],
            json!({"name": "photoUrls"})
        );
        assert_eq!(pet["properties"]["tags"]["xml"], json!({"wrapped": true}));
        assert!(pet["properties"]["tags"]["items"].get("xml").is_none());
        assert_eq!(schemas["Category"]["xml"], json!({"name": "Category"}));
        assert_eq!(schemas["Tag"]["xml"], json!({"name": "Tag"}));
    }

    #[test]
    fn test_annotation_is_idempotent() {
        let mut once = schemas();
        annotate(&mut once, "Pet");
        let mut twice = once.clone();
        annotate(&mut twice, "Pet");
        annotate(&mut twice, "Tag");
        assert_eq!(once, twice);
    }

    #[test]
    fn test_xml_media_types() {
        assert!(is_xml_media_type("application/xml"));
        assert!(is_xml_media_type("application/atom+xml"));
        assert!(!is_xml_media_type("application/json"));
    }
}
