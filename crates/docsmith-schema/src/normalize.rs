//! Tree helpers shared by the registry and the document assembler.
//!
//! Everything here works on plain [`serde_json::Value`] trees: reference
//! rewriting, nullable normalization, structural fingerprints and name
//! normalization.

use serde_json::{Map, Value};

/// Prefix used by shape references before they are placed into a document.
pub const DEFINITIONS_PREFIX: &str = "#/definitions/";

/// Keys of a root schema that carry no structural meaning.
const ROOT_ONLY_KEYS: [&str; 5] = ["$schema", "$id", "title", "definitions", "$defs"];

/// Inline depth after which recursive references are cut.
const MAX_INLINE_DEPTH: usize = 16;

/// Replaces every character outside `[A-Za-z0-9.\-_]` with `_`.
///
/// # Example
///
/// ```
/// use docsmith_schema::normalize_name;
///
/// assert_eq!(normalize_name("Page<Pet>"), "Page_Pet_");
/// ```
pub fn normalize_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Turns a Rust type path into a qualified shape name.
///
/// Path separators become `__` and the result is normalized.
///
/// ```
/// use docsmith_schema::qualified_name;
///
/// assert_eq!(qualified_name("app::models::Pet"), "app__models__Pet");
/// ```
pub fn qualified_name(type_path: &str) -> String {
    normalize_name(&type_path.replace("::", "__"))
}

/// Returns the last path segment of a `$ref` value.
pub fn ref_name(reference: &str) -> Option<&str> {
    reference
        .rsplit('/')
        .next()
        .filter(|name| !name.is_empty() && *name != "#")
}

/// Rewrites every `$ref` in the tree for which `map` returns a new value.
pub fn rewrite_refs<F>(value: &mut Value, map: &mut F)
where
    F: FnMut(&str) -> Option<String>,
{
    match value {
        Value::Object(object) => {
            if let Some(Value::String(reference)) = object.get_mut("$ref") {
                if let Some(replacement) = map(reference) {
                    *reference = replacement;
                }
            }
            for (key, child) in object.iter_mut() {
                if key != "$ref" {
                    rewrite_refs(child, map);
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                rewrite_refs(item, map);
            }
        }
        _ => {}
    }
}

/// Moves every reference under `from` to `to`, keeping the shape name.
pub fn rewrite_ref_prefix(value: &mut Value, from: &str, to: &str) {
    rewrite_refs(value, &mut |reference| {
        reference
            .strip_prefix(from)
            .map(|name| format!("{to}{name}"))
    });
}

/// Normalizes nullable constructs into their OpenAPI 3.0 form.
///
/// - `type: [T, "null"]` becomes `type: T, nullable: true`.
/// - `anyOf: [X, {type: null}]` is replaced by `X`, merged into the node.
pub fn collapse_nullable(value: &mut Value) {
    match value {
        Value::Object(object) => {
            collapse_type_array(object);
            collapse_null_variant(object, "anyOf");
            collapse_null_variant(object, "oneOf");
            for child in object.values_mut() {
                collapse_nullable(child);
            }
        }
        Value::Array(items) => {
            for item in items {
                collapse_nullable(item);
            }
        }
        _ => {}
    }
}

fn collapse_type_array(object: &mut Map<String, Value>) {
    let Some(Value::Array(types)) = object.get("type") else {
        return;
    };
    if !types.iter().any(|t| t == "null") {
        return;
    }
    let remaining: Vec<Value> = types.iter().filter(|t| *t != "null").cloned().collect();
    match remaining.len() {
        0 => {}
        1 => {
            object.insert("type".to_string(), remaining[0].clone());
            object.insert("nullable".to_string(), Value::Bool(true));
        }
        _ => {
            object.insert("type".to_string(), Value::Array(remaining));
            object.insert("nullable".to_string(), Value::Bool(true));
        }
    }
}

fn collapse_null_variant(object: &mut Map<String, Value>, key: &str) {
    let Some(Value::Array(variants)) = object.get(key) else {
        return;
    };
    if variants.len() != 2 {
        return;
    }
    let is_null = |v: &Value| v.get("type").is_some_and(|t| t == "null");
    let kept = if is_null(&variants[0]) {
        variants[1].clone()
    } else if is_null(&variants[1]) {
        variants[0].clone()
    } else {
        return;
    };
    let Value::Object(kept) = kept else {
        return;
    };
    object.remove(key);
    for (k, v) in kept {
        object.insert(k, v);
    }
}

/// Computes a structural fingerprint of a shape tree.
///
/// Keys are sorted, so two trees that differ only in key order share a
/// fingerprint. Root-only keys (`title`, `$schema`, `definitions`) are
/// ignored.
pub fn fingerprint(schema: &Value) -> String {
    let mut stripped = schema.clone();
    if let Value::Object(object) = &mut stripped {
        for key in ROOT_ONLY_KEYS {
            object.remove(key);
        }
    }
    canonicalize(&stripped).to_string()
}

fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(object) => {
            let mut keys: Vec<&String> = object.keys().collect();
            keys.sort();
            let mut sorted = Map::new();
            for key in keys {
                sorted.insert(key.clone(), canonicalize(&object[key]));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}

/// Replaces references into `definitions` with the referenced trees.
///
/// References that recurse deeper than a fixed limit are cut to a plain
/// `{"type": "object"}` node. References with unknown targets are kept.
pub fn inline_refs(value: &mut Value, definitions: &Map<String, Value>) {
    inline_at_depth(value, definitions, 0);
}

fn inline_at_depth(value: &mut Value, definitions: &Map<String, Value>, depth: usize) {
    match value {
        Value::Object(object) => {
            let target = object
                .get("$ref")
                .and_then(Value::as_str)
                .and_then(ref_name)
                .and_then(|name| definitions.get(name))
                .cloned();
            if let Some(mut target) = target {
                if depth >= MAX_INLINE_DEPTH {
                    target = serde_json::json!({"type": "object"});
                } else {
                    inline_at_depth(&mut target, definitions, depth + 1);
                }
                object.remove("$ref");
                if let Value::Object(target) = target {
                    for (k, v) in target {
                        object.entry(k).or_insert(v);
                    }
                }
                return;
            }
            for child in object.values_mut() {
                inline_at_depth(child, definitions, depth);
            }
        }
        Value::Array(items) => {
            for item in items {
                inline_at_depth(item, definitions, depth);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("Pet"), "Pet");
        assert_eq!(normalize_name("Page<Pet, Tag>"), "Page_Pet__Tag_");
        assert_eq!(normalize_name("v1.Pet-Item_2"), "v1.Pet-Item_2");
    }

    #[test]
    fn test_qualified_name() {
        assert_eq!(qualified_name("shop::Order"), "shop__Order");
        assert_eq!(
            qualified_name("shop::Page<shop::Order>"),
            "shop__Page_shop__Order_"
        );
    }

    #[test]
    fn test_ref_name() {
        assert_eq!(ref_name("#/definitions/Pet"), Some("Pet"));
        assert_eq!(ref_name("#/components/schemas/Tag"), Some("Tag"));
        assert_eq!(ref_name("#"), None);
        assert_eq!(ref_name("#/definitions/"), None);
    }

    #[test]
    fn test_rewrite_ref_prefix() {
        let mut schema = json!({
            "properties": {
                "tag": {"$ref": "#/definitions/Tag"},
                "tags": {"type": "array", "items": {"$ref": "#/definitions/Tag"}},
                "other": {"$ref": "https://example.com/Other"}
            }
        });
        rewrite_ref_prefix(&mut schema, DEFINITIONS_PREFIX, "#/components/schemas/");

        assert_eq!(schema["properties"]["tag"]["$ref"], "#/components/schemas/Tag");
        assert_eq!(
            schema["properties"]["tags"]["items"]["$ref"],
            "#/components/schemas/Tag"
        );
        assert_eq!(schema["properties"]["other"]["$ref"], "https://example.com/Other");
    }

    #[test]
    fn test_collapse_type_array() {
        let mut schema = json!({"properties": {"age": {"type": ["integer", "null"]}}});
        collapse_nullable(&mut schema);
        assert_eq!(
            schema["properties"]["age"],
            json!({"type": "integer", "nullable": true})
        );
    }

    #[test]
    fn test_collapse_any_of_ref() {
        let mut schema = json!({
            "properties": {
                "owner": {
                    "description": "Current owner",
                    "anyOf": [{"$ref": "#/definitions/User"}, {"type": "null"}]
                }
            }
        });
        collapse_nullable(&mut schema);
        assert_eq!(
            schema["properties"]["owner"],
            json!({"description": "Current owner", "$ref": "#/definitions/User"})
        );
    }

    #[test]
    fn test_collapse_keeps_real_unions() {
        let mut schema = json!({"anyOf": [{"type": "string"}, {"type": "integer"}]});
        let before = schema.clone();
        collapse_nullable(&mut schema);
        assert_eq!(schema, before);
    }

    #[test]
    fn test_fingerprint_ignores_key_order_and_title() {
        let a = json!({"title": "A", "type": "object", "properties": {"x": {"type": "integer"}}});
        let b = json!({"properties": {"x": {"type": "integer"}}, "type": "object", "title": "B"});
        assert_eq!(fingerprint(&a), fingerprint(&b));

        let c = json!({"type": "object", "properties": {"y": {"type": "integer"}}});
        assert_ne!(fingerprint(&a), fingerprint(&c));
    }

    #[test]
    fn test_inline_refs() {
        let definitions = json!({
            "Tag": {"type": "object", "properties": {"name": {"type": "string"}}}
        });
        let mut schema = json!({"properties": {"tag": {"$ref": "#/definitions/Tag"}}});
        inline_refs(&mut schema, definitions.as_object().unwrap());
        assert_eq!(schema["properties"]["tag"]["type"], "object");
        assert!(schema["properties"]["tag"].get("$ref").is_none());
    }

    #[test]
    fn test_inline_refs_cuts_recursion() {
        let definitions = json!({
            "Node": {
                "type": "object",
                "properties": {"next": {"$ref": "#/definitions/Node"}}
            }
        });
        let mut schema = json!({"$ref": "#/definitions/Node"});
        inline_refs(&mut schema, definitions.as_object().unwrap());
        assert_eq!(schema["type"], "object");
        assert!(schema.to_string().len() < 10_000);
        assert!(!schema.to_string().contains("$ref"));
    }
}
