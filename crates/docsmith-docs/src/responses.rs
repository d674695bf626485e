//! Response routing.
//!
//! Shape payloads are collected per `(status, media type)` first and folded
//! once every response of the operation is known: a single reference is used
//! bare, several become a `oneOf`.

use indexmap::IndexMap;
use serde_json::{json, Value};
use tracing::debug;

use crate::builder::Assembly;
use crate::descriptor::{ResponseDescriptor, ResponseEntry, ResponsePayload, ShapeUse, StatusCode};
use crate::error::{DocsError, DocsResult};
use crate::openapi::{Header, MediaType, Operation, Response};
use crate::params::expand_headers;
use crate::xml;

type Pending = IndexMap<(String, String), Vec<Value>>;

impl Assembly<'_> {
    pub(crate) fn route_responses(
        &mut self,
        operation: &mut Operation,
        entries: &[ResponseEntry],
    ) -> DocsResult<()> {
        let operation_id = operation.operation_id.clone();
        let mut pending = Pending::new();

        for entry in entries {
            let headers = match entry.header() {
                Some(decl) => expand_headers(&self.isolated_schema(decl)?),
                None => IndexMap::new(),
            };
            for status in entry.status_codes() {
                let key = status.to_string();
                let response = operation.responses.entry(key.clone()).or_default();
                join_description(response, entry.description().unwrap_or_default());
                merge_headers(&operation_id, &key, response, &headers)?;
                for member in entry.members() {
                    self.merge_links(&operation_id, &key, response, member)?;
                }

                if status == StatusCode::Code(204) {
                    continue;
                }
                for member in entry.members() {
                    self.route_payload(&operation_id, &key, response, member, &mut pending)?;
                }
            }
        }

        for ((status, media_type), mut schemas) in pending {
            let schema = if schemas.len() == 1 {
                schemas.remove(0)
            } else {
                json!({ "oneOf": schemas })
            };
            if let Some(response) = operation.responses.get_mut(&status) {
                response
                    .content
                    .insert(media_type, MediaType::with_schema(schema));
            }
        }
        Ok(())
    }

    fn route_payload(
        &mut self,
        operation_id: &str,
        status: &str,
        response: &mut Response,
        member: &ResponseDescriptor,
        pending: &mut Pending,
    ) -> DocsResult<()> {
        let media_type = member.media_type_str();
        let Some(payload) = member.payload_ref() else {
            return Ok(());
        };
        let slot = (status.to_string(), media_type.to_string());

        if let Some(schema) = payload.explicit_schema() {
            if response.content.contains_key(media_type) || pending.contains_key(&slot) {
                return Err(DocsError::DuplicateMediaType {
                    operation_id: operation_id.to_string(),
                    status: status.to_string(),
                    media_type: media_type.to_string(),
                });
            }
            response
                .content
                .insert(media_type.to_string(), MediaType::with_schema(schema));
            return Ok(());
        }

        let ResponsePayload::Shape(shape) = payload else {
            return Ok(());
        };
        if response.content.contains_key(media_type) {
            return Err(DocsError::DuplicateMediaType {
                operation_id: operation_id.to_string(),
                status: status.to_string(),
                media_type: media_type.to_string(),
            });
        }
        let is_xml = xml::is_xml_media_type(media_type);
        if is_xml {
            for decl in shape.decls() {
                let name = self.name_of(operation_id, decl)?;
                xml::annotate(&mut self.schemas, &name);
            }
        }

        let schemas = match shape {
            ShapeUse::Single(decl) => vec![self.reference(operation_id, decl)?],
            ShapeUse::Array(decl) => {
                let mut array = json!({"type": "array", "items": self.reference(operation_id, decl)?});
                if is_xml {
                    array["xml"] = json!({"name": member.name(), "wrapped": true});
                }
                vec![array]
            }
            ShapeUse::UnionOf(decls) => decls
                .iter()
                .map(|decl| self.reference(operation_id, decl))
                .collect::<DocsResult<_>>()?,
        };
        let folded = pending.entry(slot).or_default();
        for schema in schemas {
            if !folded.contains(&schema) {
                folded.push(schema);
            }
        }
        debug!(
            operation_id,
            status_code = status,
            media_type,
            response = member.name(),
            "response payload routed"
        );
        Ok(())
    }

    fn merge_links(
        &self,
        operation_id: &str,
        status: &str,
        response: &mut Response,
        member: &ResponseDescriptor,
    ) -> DocsResult<()> {
        let Some(links) = self.links.links_for(member.name()) else {
            return Ok(());
        };
        for (key, link) in links {
            if response.links.contains_key(key) {
                return Err(DocsError::DuplicateLink {
                    operation_id: operation_id.to_string(),
                    status: status.to_string(),
                    key: key.clone(),
                });
            }
            response.links.insert(key.clone(), link.clone());
        }
        Ok(())
    }
}

/// Appends a description, joined with `|`, unless it is empty or already
/// part of the response description.
fn join_description(response: &mut Response, description: &str) {
    if description.is_empty() || response.description.split('|').any(|part| part == description)
    {
        return;
    }
    if response.description.is_empty() {
        description.clone_into(&mut response.description);
    } else {
        response.description.push('|');
        response.description.push_str(description);
    }
}

fn merge_headers(
    operation_id: &str,
    status: &str,
    response: &mut Response,
    headers: &IndexMap<String, Header>,
) -> DocsResult<()> {
    for (name, header) in headers {
        match response.headers.get(name) {
            None => {
                response.headers.insert(name.clone(), header.clone());
            }
            Some(existing) if existing == header => {}
            Some(_) => {
                return Err(DocsError::HeaderConflict {
                    operation_id: operation_id.to_string(),
                    status: status.to_string(),
                    header: name.clone(),
                });
            }
        }
    }
    Ok(())
}
