//! AsyncAPI 2.4.0 documents.
//!
//! Channels are declared with [`ChannelDescriptor`]s and checked when they
//! are added: every server a channel names must be declared on the builder,
//! and every `{parameter}` of the channel name must be a field of the
//! channel's parameter shape. Message payloads are shared shapes placed in
//! `components.schemas`, exactly like OpenAPI bodies.

use docsmith_schema::{
    inline_refs, rewrite_ref_prefix, ShapeDecl, ShapeRegistry, DEFINITIONS_PREFIX,
};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::debug;

use crate::builder::COMPONENTS_PREFIX;
use crate::descriptor::{template_parameters, ShapeUse};
use crate::error::{DocsError, DocsResult};
use crate::openapi::{ExternalDocumentation, Info, SecurityRequirement, ServerVariable, Tag};
use crate::tags::TagRegistry;

/// AsyncAPI document root object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AsyncApi {
    /// AsyncAPI version.
    pub asyncapi: String,
    /// Application identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// API metadata.
    pub info: Info,
    /// Servers by name.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub servers: IndexMap<String, AsyncServer>,
    /// Default content type of messages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(rename = "defaultContentType")]
    pub default_content_type: Option<String>,
    /// Channels by name.
    #[serde(default)]
    pub channels: IndexMap<String, Channel>,
    /// Shared shapes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub components: Option<AsyncComponents>,
    /// Tags.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,
    /// External documentation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(rename = "externalDocs")]
    pub external_docs: Option<ExternalDocumentation>,
}

impl AsyncApi {
    /// Converts the document to a JSON value.
    pub fn to_value(&self) -> DocsResult<Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Converts the document to pretty-printed JSON.
    pub fn to_json(&self) -> DocsResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Converts the document to YAML.
    pub fn to_yaml(&self) -> DocsResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

/// A message broker server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AsyncServer {
    /// Server URL.
    pub url: String,
    /// Protocol, e.g. `mqtt` or `kafka`.
    pub protocol: String,
    /// Protocol version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(rename = "protocolVersion")]
    pub protocol_version: Option<String>,
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// URL template variables.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub variables: IndexMap<String, ServerVariable>,
    /// Security requirements.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub security: Vec<SecurityRequirement>,
    /// Protocol-specific bindings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bindings: Option<Value>,
}

impl AsyncServer {
    /// Creates a server.
    pub fn new(url: impl Into<String>, protocol: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            protocol: protocol.into(),
            protocol_version: None,
            description: None,
            variables: IndexMap::new(),
            security: Vec::new(),
            bindings: None,
        }
    }
}

/// A channel item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Names of the servers the channel is available on.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub servers: Vec<String>,
    /// Channel name parameters.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub parameters: IndexMap<String, ChannelParameter>,
    /// Messages the application receives.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscribe: Option<AsyncOperation>,
    /// Messages the application sends.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publish: Option<AsyncOperation>,
    /// Protocol-specific bindings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bindings: Option<Value>,
}

/// A channel name parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelParameter {
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Parameter schema.
    pub schema: Value,
}

/// A publish or subscribe operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AsyncOperation {
    /// Operation identifier.
    #[serde(rename = "operationId")]
    pub operation_id: String,
    /// Summary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Security requirements.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub security: Vec<SecurityRequirement>,
    /// Tags.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,
    /// External documentation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(rename = "externalDocs")]
    pub external_docs: Option<ExternalDocumentation>,
    /// Protocol-specific bindings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bindings: Option<Value>,
    /// The message, or the set of messages, carried.
    pub message: Message,
}

/// Message carried by an operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Message {
    /// A single message.
    Single(MessageObject),
    /// Any one of several messages.
    OneOf {
        /// The alternatives.
        #[serde(rename = "oneOf")]
        one_of: Vec<MessageObject>,
    },
}

/// A message definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageObject {
    /// Message name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Payload schema.
    pub payload: Value,
}

/// Shared components of an AsyncAPI document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AsyncComponents {
    /// Shared shapes.
    #[serde(default)]
    pub schemas: IndexMap<String, Value>,
}

/// A declared publish or subscribe operation.
#[derive(Debug, Clone, PartialEq)]
pub struct AsyncOperationDescriptor {
    operation_id: String,
    summary: Option<String>,
    description: Option<String>,
    tags: Vec<Tag>,
    security: Vec<SecurityRequirement>,
    external_docs: Option<ExternalDocumentation>,
    bindings: Option<Value>,
    message: ShapeUse,
}

impl AsyncOperationDescriptor {
    /// An operation carrying `message`.
    pub fn new(operation_id: impl Into<String>, message: ShapeUse) -> Self {
        Self {
            operation_id: operation_id.into(),
            summary: None,
            description: None,
            tags: Vec::new(),
            security: Vec::new(),
            external_docs: None,
            bindings: None,
            message,
        }
    }

    /// Sets the summary.
    #[must_use]
    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Adds a tag.
    #[must_use]
    pub fn tag(mut self, tag: Tag) -> Self {
        self.tags.push(tag);
        self
    }

    /// Adds a security requirement.
    #[must_use]
    pub fn security(mut self, requirement: SecurityRequirement) -> Self {
        self.security.push(requirement);
        self
    }

    /// Sets the external documentation link.
    #[must_use]
    pub fn external_docs(mut self, docs: ExternalDocumentation) -> Self {
        self.external_docs = Some(docs);
        self
    }

    /// Sets protocol-specific bindings.
    #[must_use]
    pub fn bindings(mut self, bindings: Value) -> Self {
        self.bindings = Some(bindings);
        self
    }
}

/// A declared channel.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelDescriptor {
    name: String,
    description: Option<String>,
    servers: Vec<String>,
    parameters: Option<ShapeDecl>,
    bindings: Option<Value>,
    subscribe: Option<AsyncOperationDescriptor>,
    publish: Option<AsyncOperationDescriptor>,
}

impl ChannelDescriptor {
    /// A channel named `name`, which may contain `{parameter}` templates.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            servers: Vec::new(),
            parameters: None,
            bindings: None,
            subscribe: None,
            publish: None,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Restricts the channel to a declared server.
    #[must_use]
    pub fn server(mut self, name: impl Into<String>) -> Self {
        self.servers.push(name.into());
        self
    }

    /// Declares the channel name parameters as the fields of `decl`.
    #[must_use]
    pub fn parameters(mut self, decl: ShapeDecl) -> Self {
        self.parameters = Some(decl);
        self
    }

    /// Sets protocol-specific bindings.
    #[must_use]
    pub fn bindings(mut self, bindings: Value) -> Self {
        self.bindings = Some(bindings);
        self
    }

    /// Sets the subscribe operation.
    #[must_use]
    pub fn subscribe(mut self, operation: AsyncOperationDescriptor) -> Self {
        self.subscribe = Some(operation);
        self
    }

    /// Sets the publish operation.
    #[must_use]
    pub fn publish(mut self, operation: AsyncOperationDescriptor) -> Self {
        self.publish = Some(operation);
        self
    }

    fn operations(&self) -> impl Iterator<Item = &AsyncOperationDescriptor> {
        self.subscribe.iter().chain(self.publish.iter())
    }
}

/// Builder for AsyncAPI documents.
#[derive(Debug, Clone)]
pub struct AsyncApiBuilder {
    id: Option<String>,
    info: Info,
    servers: IndexMap<String, AsyncServer>,
    default_content_type: Option<String>,
    external_docs: Option<ExternalDocumentation>,
    tags: TagRegistry,
    channels: Vec<ChannelDescriptor>,
}

impl AsyncApiBuilder {
    /// Create a new builder.
    #[must_use]
    pub fn new(title: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            id: None,
            info: Info {
                title: title.into(),
                version: version.into(),
                ..Info::default()
            },
            servers: IndexMap::new(),
            default_content_type: None,
            external_docs: None,
            tags: TagRegistry::new(),
            channels: Vec::new(),
        }
    }

    /// Set the application identifier.
    #[must_use]
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set the API description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.info.description = Some(description.into());
        self
    }

    /// Set the default content type of messages.
    #[must_use]
    pub fn default_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.default_content_type = Some(content_type.into());
        self
    }

    /// Add a server.
    #[must_use]
    pub fn server(mut self, name: impl Into<String>, server: AsyncServer) -> Self {
        self.servers.insert(name.into(), server);
        self
    }

    /// Set the external documentation link.
    #[must_use]
    pub fn external_docs(mut self, url: impl Into<String>, description: Option<String>) -> Self {
        self.external_docs = Some(ExternalDocumentation {
            url: url.into(),
            description,
        });
        self
    }

    /// Registers a document-level tag.
    pub fn add_tag(&mut self, tag: &Tag) -> DocsResult<()> {
        self.tags.add(tag)
    }

    /// Adds a channel.
    pub fn add_channel(&mut self, channel: ChannelDescriptor) -> DocsResult<()> {
        if let Some(server) = channel
            .servers
            .iter()
            .find(|server| !self.servers.contains_key(*server))
        {
            return Err(DocsError::UnknownServer {
                channel: channel.name.clone(),
                server: server.clone(),
            });
        }

        let declared = match &channel.parameters {
            Some(decl) => property_names(&ShapeRegistry::new().generate_shape(decl)?.schema),
            None => Vec::new(),
        };
        if let Some(parameter) = template_parameters(&channel.name)
            .into_iter()
            .find(|parameter| !declared.contains(parameter))
        {
            return Err(DocsError::MissingChannelParameter {
                channel: channel.name.clone(),
                parameter,
            });
        }

        for operation in channel.operations() {
            for tag in &operation.tags {
                self.tags.add(tag)?;
            }
        }
        debug!(channel = %channel.name, "channel added");
        self.channels.push(channel);
        Ok(())
    }

    /// Assembles the document.
    pub fn generate(&self, registry: &mut ShapeRegistry) -> DocsResult<AsyncApi> {
        let decls: Vec<ShapeDecl> = self
            .channels
            .iter()
            .flat_map(ChannelDescriptor::operations)
            .flat_map(|operation| operation.message.decls().iter().cloned())
            .collect();
        let mut bulk = registry.bulk_register(&decls)?;
        let mut schemas = std::mem::take(&mut bulk.definitions);
        for schema in schemas.values_mut() {
            rewrite_ref_prefix(schema, DEFINITIONS_PREFIX, COMPONENTS_PREFIX);
        }
        let reference = |decl: &ShapeDecl| -> DocsResult<Value> {
            let name = bulk.name_of(decl).ok_or_else(|| DocsError::UnsupportedShape {
                operation_id: decl.name().to_string(),
                reason: "message shape was not registered".to_string(),
            })?;
            Ok(json!({ "$ref": format!("{COMPONENTS_PREFIX}{name}") }))
        };

        let mut channels = IndexMap::new();
        for descriptor in &self.channels {
            let mut channel = Channel {
                description: descriptor.description.clone(),
                servers: descriptor.servers.clone(),
                bindings: descriptor.bindings.clone(),
                ..Channel::default()
            };
            if let Some(decl) = &descriptor.parameters {
                channel.parameters = channel_parameters(registry, decl)?;
            }
            if let Some(operation) = &descriptor.subscribe {
                channel.subscribe = Some(async_operation(operation, &reference)?);
            }
            if let Some(operation) = &descriptor.publish {
                channel.publish = Some(async_operation(operation, &reference)?);
            }
            channels.insert(descriptor.name.clone(), channel);
        }

        Ok(AsyncApi {
            asyncapi: "2.4.0".to_string(),
            id: self.id.clone(),
            info: self.info.clone(),
            servers: self.servers.clone(),
            default_content_type: self.default_content_type.clone(),
            channels,
            components: (!schemas.is_empty()).then_some(AsyncComponents { schemas }),
            tags: self.tags.to_vec(),
            external_docs: self.external_docs.clone(),
        })
    }
}

fn async_operation<F>(
    descriptor: &AsyncOperationDescriptor,
    reference: &F,
) -> DocsResult<AsyncOperation>
where
    F: Fn(&ShapeDecl) -> DocsResult<Value>,
{
    let message_for = |decl: &ShapeDecl| -> DocsResult<MessageObject> {
        Ok(MessageObject {
            name: Some(decl.name().to_string()),
            payload: reference(decl)?,
        })
    };
    let message = match &descriptor.message {
        ShapeUse::Single(decl) => Message::Single(message_for(decl)?),
        ShapeUse::Array(decl) => Message::Single(MessageObject {
            name: Some(decl.name().to_string()),
            payload: json!({"type": "array", "items": reference(decl)?}),
        }),
        ShapeUse::UnionOf(decls) => Message::OneOf {
            one_of: decls.iter().map(message_for).collect::<DocsResult<_>>()?,
        },
    };
    Ok(AsyncOperation {
        operation_id: descriptor.operation_id.clone(),
        summary: descriptor.summary.clone(),
        description: descriptor.description.clone(),
        security: descriptor.security.clone(),
        tags: descriptor.tags.clone(),
        external_docs: descriptor.external_docs.clone(),
        bindings: descriptor.bindings.clone(),
        message,
    })
}

fn channel_parameters(
    registry: &mut ShapeRegistry,
    decl: &ShapeDecl,
) -> DocsResult<IndexMap<String, ChannelParameter>> {
    let shape = registry.generate_shape(decl)?;
    let definitions: Map<String, Value> = shape.definitions.into_iter().collect();
    let mut schema = shape.schema;
    inline_refs(&mut schema, &definitions);

    let Some(Value::Object(properties)) = schema.get_mut("properties").map(Value::take) else {
        return Ok(IndexMap::new());
    };
    Ok(properties
        .into_iter()
        .map(|(name, mut property)| {
            let description = property
                .as_object_mut()
                .and_then(|object| {
                    object.remove("title");
                    object.remove("description")
                })
                .and_then(|description| description.as_str().map(str::to_string));
            (
                name,
                ChannelParameter {
                    description,
                    schema: property,
                },
            )
        })
        .collect())
}

fn property_names(schema: &Value) -> Vec<String> {
    schema
        .get("properties")
        .and_then(Value::as_object)
        .map(|properties| properties.keys().cloned().collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use schemars::JsonSchema;

    #[allow(dead_code)]
    #[derive(JsonSchema)]
    struct LightMeasured {
        /// Light intensity measured in lumens.
        lumens: u32,
        sent_at: String,
    }

    #[allow(dead_code)]
    #[derive(JsonSchema)]
    struct TurnOn {
        command: String,
    }

    #[allow(dead_code)]
    #[derive(JsonSchema)]
    #[schemars(rename_all = "camelCase")]
    struct StreetlightParams {
        /// The ID of the streetlight.
        streetlight_id: String,
    }

    fn builder() -> AsyncApiBuilder {
        AsyncApiBuilder::new("Streetlights API", "1.0.0")
            .id("urn:com:smartylighting:streetlights:server")
            .server("production", AsyncServer::new("api.streetlights.io", "mqtt"))
    }

    fn measured_channel() -> ChannelDescriptor {
        ChannelDescriptor::new("light/{streetlightId}/measured")
            .server("production")
            .parameters(ShapeDecl::of::<StreetlightParams>())
            .subscribe(
                AsyncOperationDescriptor::new(
                    "receiveLightMeasurement",
                    ShapeUse::Single(ShapeDecl::of::<LightMeasured>()),
                )
                .tag(Tag::new("light", None)),
            )
    }

    #[test]
    fn test_generate_channels() {
        let mut builder = builder();
        builder.add_channel(measured_channel()).unwrap();
        builder
            .add_channel(ChannelDescriptor::new("light/commands").publish(
                AsyncOperationDescriptor::new(
                    "sendCommand",
                    ShapeUse::UnionOf(vec![
                        ShapeDecl::of::<TurnOn>(),
                        ShapeDecl::of::<LightMeasured>(),
                    ]),
                ),
            ))
            .unwrap();
        let document = builder.generate(&mut ShapeRegistry::new()).unwrap();
        let value = document.to_value().unwrap();

        assert_eq!(value["asyncapi"], "2.4.0");
        let channel = &value["channels"]["light/{streetlightId}/measured"];
        assert_eq!(channel["servers"], json!(["production"]));
        assert_eq!(
            channel["parameters"]["streetlightId"],
            json!({"description": "The ID of the streetlight.", "schema": {"type": "string"}})
        );
        assert_eq!(
            channel["subscribe"]["message"]["payload"],
            json!({"$ref": "#/components/schemas/LightMeasured"})
        );
        let commands = &value["channels"]["light/commands"]["publish"]["message"]["oneOf"];
        assert_eq!(commands.as_array().unwrap().len(), 2);
        assert!(value["components"]["schemas"]["TurnOn"].is_object());
        assert_eq!(value["tags"][0]["name"], "light");
    }

    #[test]
    fn test_unknown_server() {
        let mut builder = builder();
        let err = builder
            .add_channel(ChannelDescriptor::new("light").server("staging"))
            .unwrap_err();
        assert!(matches!(err, DocsError::UnknownServer { ref server, .. } if server == "staging"));
    }

    #[test]
    fn test_undeclared_channel_parameter() {
        let mut builder = builder();
        let err = builder
            .add_channel(ChannelDescriptor::new("light/{lampId}/measured"))
            .unwrap_err();
        assert!(matches!(
            err,
            DocsError::MissingChannelParameter { ref parameter, .. } if parameter == "lampId"
        ));
    }

    #[test]
    fn test_async_document_serializes() {
        let mut builder = builder();
        builder.add_channel(measured_channel()).unwrap();
        let document = builder.generate(&mut ShapeRegistry::new()).unwrap();
        let yaml = document.to_yaml().unwrap();
        assert!(yaml.starts_with("asyncapi:"));
        let json = document.to_json().unwrap();
        let parsed: AsyncApi = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, document);
    }
}
