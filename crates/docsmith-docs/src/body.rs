//! Request body routing.

use docsmith_schema::ShapeDecl;
use indexmap::IndexMap;
use serde_json::{json, Map, Value};

use crate::builder::Assembly;
use crate::descriptor::{RequestDescriptor, ShapeUse};
use crate::error::{DocsError, DocsResult};
use crate::openapi::{MediaType, Operation, RequestBody};
use crate::xml;

const MULTIPART_FORM_DATA: &str = "multipart/form-data";
const MULTIPART_NOTE: &str = "     \n >Swagger UI could not support, when media_type is multipart/form-data";

impl Assembly<'_> {
    /// Routes a shared body: every media type references the shape.
    pub(crate) fn route_body(
        &mut self,
        operation: &mut Operation,
        request: &RequestDescriptor,
    ) -> DocsResult<()> {
        let operation_id = operation.operation_id.clone();
        require_media_types(&operation_id, request)?;

        let schema = self.body_schema(&operation_id, request)?;
        if request.media_types.iter().any(|media| xml::is_xml_media_type(media)) {
            for decl in request.shape.decls() {
                let name = self.name_of(&operation_id, decl)?;
                xml::annotate(&mut self.schemas, &name);
            }
        }

        let body = request_body(operation, request);
        for media_type in &request.media_types {
            merge_body_schema(
                &operation_id,
                &mut body.content,
                media_type,
                schema.clone(),
                request.shape.is_array(),
            )?;
        }
        Ok(())
    }

    /// Routes a multipart body generated inline.
    pub(crate) fn route_multiform(
        &mut self,
        operation: &mut Operation,
        request: &RequestDescriptor,
    ) -> DocsResult<()> {
        let operation_id = operation.operation_id.clone();
        let encoding = request
            .encoding
            .clone()
            .ok_or_else(|| DocsError::MissingEncoding {
                operation_id: operation_id.clone(),
            })?;
        require_media_types(&operation_id, request)?;
        let schemas = self.inline_schemas(&operation_id, request)?;

        let annotate = self.settings.swagger_annotations;
        let body = request_body(operation, request);
        for media_type in &request.media_types {
            let entry = body.content.entry(media_type.clone()).or_default();
            for schema in &schemas {
                let mut schema = schema.clone();
                if annotate && media_type == MULTIPART_FORM_DATA {
                    append_multipart_note(&mut schema);
                }
                for name in property_names(&schema) {
                    entry
                        .encoding
                        .entry(name)
                        .or_insert_with(|| encoding.clone());
                }
                merge_object(entry.schema.get_or_insert_with(object_schema), schema);
            }
        }
        Ok(())
    }

    /// Routes a file upload generated inline.
    pub(crate) fn route_file(
        &mut self,
        operation: &mut Operation,
        request: &RequestDescriptor,
    ) -> DocsResult<()> {
        let operation_id = operation.operation_id.clone();
        require_media_types(&operation_id, request)?;
        let schemas = self.inline_schemas(&operation_id, request)?;

        let body = request_body(operation, request);
        for media_type in &request.media_types {
            let entry = body.content.entry(media_type.clone()).or_default();
            for schema in &schemas {
                merge_object(entry.schema.get_or_insert_with(object_schema), file_schema(schema));
            }
        }
        Ok(())
    }

    fn body_schema(&self, operation_id: &str, request: &RequestDescriptor) -> DocsResult<Value> {
        let item = |decl: &ShapeDecl| match &request.nested_key {
            Some(key) => self.nested_property(operation_id, decl, key),
            None => self.reference(operation_id, decl),
        };
        Ok(match &request.shape {
            ShapeUse::Single(decl) => item(decl)?,
            ShapeUse::Array(decl) => json!({"type": "array", "items": item(decl)?}),
            ShapeUse::UnionOf(decls) => {
                let members = decls.iter().map(item).collect::<DocsResult<Vec<_>>>()?;
                json!({ "oneOf": members })
            }
        })
    }

    fn nested_property(
        &self,
        operation_id: &str,
        decl: &ShapeDecl,
        key: &str,
    ) -> DocsResult<Value> {
        let name = self.name_of(operation_id, decl)?;
        self.schemas
            .get(&name)
            .and_then(|schema| schema.get("properties"))
            .and_then(|properties| properties.get(key))
            .cloned()
            .ok_or_else(|| DocsError::InvalidDescriptor {
                name: operation_id.to_string(),
                reason: format!("shape '{name}' has no property '{key}'"),
            })
    }

    /// Generates each shape of an inline body on its own.
    fn inline_schemas(
        &mut self,
        operation_id: &str,
        request: &RequestDescriptor,
    ) -> DocsResult<Vec<Value>> {
        if request.shape.is_array() {
            return Err(DocsError::UnsupportedShape {
                operation_id: operation_id.to_string(),
                reason: format!(
                    "{} bodies cannot carry an array of a shape",
                    request.location.as_str()
                ),
            });
        }
        request
            .shape
            .decls()
            .iter()
            .map(|decl| self.isolated_schema(decl))
            .collect()
    }
}

fn require_media_types(operation_id: &str, request: &RequestDescriptor) -> DocsResult<()> {
    if request.media_types.is_empty() {
        return Err(DocsError::MissingMediaType {
            operation_id: operation_id.to_string(),
        });
    }
    Ok(())
}

/// The operation's request body. The first body descriptor sets its
/// description; any required descriptor makes it required.
fn request_body<'a>(
    operation: &'a mut Operation,
    request: &RequestDescriptor,
) -> &'a mut RequestBody {
    let body = operation
        .request_body
        .get_or_insert_with(RequestBody::default);
    body.required |= request.required;
    if body.description.is_none() {
        body.description.clone_from(&request.description);
    }
    body
}

/// Adds `schema` under `media_type`, folding several bodies into `oneOf`.
fn merge_body_schema(
    operation_id: &str,
    content: &mut IndexMap<String, MediaType>,
    media_type: &str,
    schema: Value,
    is_array: bool,
) -> DocsResult<()> {
    let Some(existing) = content.get_mut(media_type) else {
        content.insert(media_type.to_string(), MediaType::with_schema(schema));
        return Ok(());
    };
    let current = existing.schema.take().unwrap_or(Value::Null);
    if is_array || is_array_schema(&current) {
        return Err(DocsError::ArrayBodyConflict {
            operation_id: operation_id.to_string(),
            media_type: media_type.to_string(),
        });
    }
    let mut members = one_of_members(current);
    for member in one_of_members(schema) {
        if !members.contains(&member) {
            members.push(member);
        }
    }
    existing.schema = Some(if members.len() == 1 {
        members.remove(0)
    } else {
        json!({ "oneOf": members })
    });
    Ok(())
}

fn one_of_members(schema: Value) -> Vec<Value> {
    match schema {
        Value::Null => Vec::new(),
        Value::Object(mut object) if object.len() == 1 && object.contains_key("oneOf") => {
            match object.remove("oneOf") {
                Some(Value::Array(members)) => members,
                Some(other) => vec![other],
                None => Vec::new(),
            }
        }
        other => vec![other],
    }
}

fn is_array_schema(schema: &Value) -> bool {
    schema.get("type").and_then(Value::as_str) == Some("array")
}

fn object_schema() -> Value {
    json!({"type": "object"})
}

/// Merges `source` into `target`: lists are concatenated, maps are merged
/// key-wise and other values already present are kept.
pub(crate) fn merge_object(target: &mut Value, source: Value) {
    let (Value::Object(target), Value::Object(source)) = (target, source) else {
        return;
    };
    for (key, value) in source {
        match (target.get_mut(&key), value) {
            (Some(Value::Array(existing)), Value::Array(items)) => existing.extend(items),
            (Some(Value::Object(existing)), Value::Object(entries)) => existing.extend(entries),
            (Some(_), _) => {}
            (None, value) => {
                target.insert(key, value);
            }
        }
    }
}

fn property_names(schema: &Value) -> Vec<String> {
    schema
        .get("properties")
        .and_then(Value::as_object)
        .map(|properties| properties.keys().cloned().collect())
        .unwrap_or_default()
}

fn append_multipart_note(schema: &mut Value) {
    let Some(Value::Object(properties)) = schema.get_mut("properties") else {
        return;
    };
    for property in properties.values_mut() {
        let Value::Object(property) = property else {
            continue;
        };
        let description = property
            .get("description")
            .and_then(Value::as_str)
            .unwrap_or_default();
        let annotated = format!("{description}{MULTIPART_NOTE}");
        property.insert("description".to_string(), Value::String(annotated));
    }
}

/// Rewrites every top-level property as an uploaded file.
fn file_schema(schema: &Value) -> Value {
    let properties: Map<String, Value> = schema
        .get("properties")
        .and_then(Value::as_object)
        .map(|properties| {
            properties
                .iter()
                .map(|(name, property)| (name.clone(), file_property(property)))
                .collect()
        })
        .unwrap_or_default();
    let mut file = json!({"type": "object", "properties": properties});
    if let Some(required) = schema.get("required") {
        file["required"] = required.clone();
    }
    file
}

/// A declared type and format are kept. Untyped properties and strings
/// without a format become binary strings.
fn file_property(property: &Value) -> Value {
    let declared = property.get("type").and_then(Value::as_str);
    let mut file = Map::new();
    file.insert(
        "type".to_string(),
        Value::String(declared.unwrap_or("string").to_string()),
    );
    match (declared, property.get("format")) {
        (_, Some(format)) => {
            file.insert("format".to_string(), format.clone());
        }
        (None | Some("string"), None) => {
            file.insert("format".to_string(), json!("binary"));
        }
        _ => {}
    }
    if declared == Some("array") {
        if let Some(items) = property.get("items") {
            file.insert("items".to_string(), file_property(items));
        }
    }
    if let Some(description) = property.get("description") {
        file.insert("description".to_string(), description.clone());
    }
    Value::Object(file)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference(name: &str) -> Value {
        json!({ "$ref": format!("#/components/schemas/{name}") })
    }

    #[test]
    fn test_single_body_is_bare() {
        let mut content = IndexMap::new();
        merge_body_schema("addPet", &mut content, "application/json", reference("Pet"), false)
            .unwrap();
        assert_eq!(content["application/json"].schema, Some(reference("Pet")));
    }

    #[test]
    fn test_bodies_fold_into_one_of_once() {
        let mut content = IndexMap::new();
        for name in ["Pet", "Order", "Order"] {
            merge_body_schema("addPet", &mut content, "application/json", reference(name), false)
                .unwrap();
        }
        assert_eq!(
            content["application/json"].schema,
            Some(json!({"oneOf": [reference("Pet"), reference("Order")]}))
        );
    }

    #[test]
    fn test_array_body_conflict() {
        let array = json!({"type": "array", "items": reference("Pet")});
        let mut content = IndexMap::new();
        merge_body_schema("addPet", &mut content, "application/json", array.clone(), true)
            .unwrap();
        let err = merge_body_schema("addPet", &mut content, "application/json", reference("Pet"), false)
            .unwrap_err();
        assert!(matches!(err, DocsError::ArrayBodyConflict { .. }));

        let mut content = IndexMap::new();
        merge_body_schema("addPet", &mut content, "application/json", reference("Pet"), false)
            .unwrap();
        assert!(merge_body_schema("addPet", &mut content, "application/json", array, true).is_err());
    }

    #[test]
    fn test_merge_object_concatenates_required() {
        let mut target = json!({
            "type": "object",
            "properties": {"a": {"type": "string"}},
            "required": ["a"]
        });
        merge_object(
            &mut target,
            json!({
                "type": "object",
                "properties": {"b": {"type": "integer"}},
                "required": ["b", "a"]
            }),
        );
        assert_eq!(
            target,
            json!({
                "type": "object",
                "properties": {"a": {"type": "string"}, "b": {"type": "integer"}},
                "required": ["a", "b", "a"]
            })
        );
    }

    #[test]
    fn test_file_properties() {
        let schema = json!({
            "properties": {
                "upload": {"description": "the file"},
                "name": {"type": "string"},
                "size": {"type": "integer", "format": "int64"},
                "parts": {"type": "array", "items": {"type": "string"}}
            },
            "required": ["upload"]
        });
        let file = file_schema(&schema);
        assert_eq!(
            file["properties"]["upload"],
            json!({"type": "string", "format": "binary", "description": "the file"})
        );
        assert_eq!(file["properties"]["name"], json!({"type": "string", "format": "binary"}));
        assert_eq!(file["properties"]["size"], json!({"type": "integer", "format": "int64"}));
        assert_eq!(
            file["properties"]["parts"],
            json!({"type": "array", "items": {"type": "string", "format": "binary"}})
        );
        assert_eq!(file["required"], json!(["upload"]));
    }

    #[test]
    fn test_multipart_note() {
        let mut schema = json!({"properties": {"a": {"type": "string", "description": "A"}}});
        append_multipart_note(&mut schema);
        let description = schema["properties"]["a"]["description"].as_str().unwrap();
        assert!(description.starts_with('A'));
        assert!(description.contains("multipart/form-data"));
    }
}
