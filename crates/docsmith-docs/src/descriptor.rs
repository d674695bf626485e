//! Endpoint, request and response descriptors.
//!
//! Descriptors are the input of the assembler: plain records stating what an
//! endpoint accepts and returns. They reference shapes through
//! [`ShapeDecl`]s and carry no document state of their own.

use std::fmt;
use std::slice;

use docsmith_schema::{example_from_schema, ShapeDecl, ShapeRegistry};
use indexmap::IndexMap;
use regex::Regex;
use serde_json::{json, Map, Value};

use crate::error::{DocsError, DocsResult};
use crate::openapi::{Encoding, ParameterIn, Tag};
use crate::security::SecurityUse;

const TEMPLATE_PATTERN: &str = r"\{([^}/]+)\}";

/// Extracts the `{name}` parameters of a path or channel template.
pub fn template_parameters(template: &str) -> Vec<String> {
    let Ok(pattern) = Regex::new(TEMPLATE_PATTERN) else {
        return Vec::new();
    };
    pattern
        .captures_iter(template)
        .filter_map(|captures| captures.get(1))
        .map(|name| name.as_str().to_string())
        .collect()
}

/// HTTP methods an operation can be registered under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HttpMethod {
    /// GET
    Get,
    /// PUT
    Put,
    /// POST
    Post,
    /// DELETE
    Delete,
    /// OPTIONS
    Options,
    /// HEAD
    Head,
    /// PATCH
    Patch,
    /// TRACE
    Trace,
}

impl HttpMethod {
    /// Every method, in path item order.
    pub const ALL: [Self; 8] = [
        Self::Get,
        Self::Put,
        Self::Post,
        Self::Delete,
        Self::Options,
        Self::Head,
        Self::Patch,
        Self::Trace,
    ];

    /// Lowercase method name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Put => "put",
            Self::Post => "post",
            Self::Delete => "delete",
            Self::Options => "options",
            Self::Head => "head",
            Self::Patch => "patch",
            Self::Trace => "trace",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_str().to_uppercase())
    }
}

/// Where a request descriptor's shape is carried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamLocation {
    /// Query string parameters.
    Query,
    /// Header parameters.
    Header,
    /// Path parameters.
    Path,
    /// Cookie parameters.
    Cookie,
    /// Request body under caller-chosen media types.
    Body,
    /// URL-encoded form body.
    Form,
    /// JSON body.
    Json,
    /// Multipart body, generated inline.
    Multiform,
    /// File upload body.
    File,
}

impl ParamLocation {
    /// Name used in link keys.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Query => "query",
            Self::Header => "header",
            Self::Path => "path",
            Self::Cookie => "cookie",
            Self::Body => "body",
            Self::Form => "form",
            Self::Json => "json",
            Self::Multiform => "multiform",
            Self::File => "file",
        }
    }

    /// The parameter location, for locations expanded into parameters.
    pub fn parameter_in(self) -> Option<ParameterIn> {
        match self {
            Self::Query => Some(ParameterIn::Query),
            Self::Header => Some(ParameterIn::Header),
            Self::Path => Some(ParameterIn::Path),
            Self::Cookie => Some(ParameterIn::Cookie),
            _ => None,
        }
    }

    /// Whether values at this location travel in the request body.
    pub fn is_body(self) -> bool {
        self.parameter_in().is_none()
    }
}

/// How many instances of a shape a descriptor carries.
#[derive(Debug, Clone, PartialEq)]
pub enum ShapeUse {
    /// One value of the shape.
    Single(ShapeDecl),
    /// An array of the shape.
    Array(ShapeDecl),
    /// A value of any one of the shapes.
    UnionOf(Vec<ShapeDecl>),
}

impl ShapeUse {
    /// The declarations involved.
    pub fn decls(&self) -> &[ShapeDecl] {
        match self {
            Self::Single(decl) | Self::Array(decl) => slice::from_ref(decl),
            Self::UnionOf(decls) => decls,
        }
    }

    /// Whether this is an array use.
    pub fn is_array(&self) -> bool {
        matches!(self, Self::Array(_))
    }
}

/// One declared input of an endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    pub(crate) location: ParamLocation,
    pub(crate) shape: ShapeUse,
    pub(crate) media_types: Vec<String>,
    pub(crate) required: bool,
    pub(crate) description: Option<String>,
    pub(crate) nested_key: Option<String>,
    pub(crate) encoding: Option<Encoding>,
}

impl RequestDescriptor {
    /// Creates a descriptor for any location.
    pub fn new(location: ParamLocation, shape: ShapeUse) -> Self {
        Self {
            location,
            shape,
            media_types: Vec::new(),
            required: false,
            description: None,
            nested_key: None,
            encoding: None,
        }
    }

    /// Query parameters taken from the fields of `decl`.
    pub fn query(decl: ShapeDecl) -> Self {
        Self::new(ParamLocation::Query, ShapeUse::Single(decl))
    }

    /// Header parameters taken from the fields of `decl`.
    pub fn header(decl: ShapeDecl) -> Self {
        Self::new(ParamLocation::Header, ShapeUse::Single(decl))
    }

    /// Path parameters taken from the fields of `decl`.
    pub fn path(decl: ShapeDecl) -> Self {
        Self::new(ParamLocation::Path, ShapeUse::Single(decl))
    }

    /// Cookie parameters taken from the fields of `decl`.
    pub fn cookie(decl: ShapeDecl) -> Self {
        Self::new(ParamLocation::Cookie, ShapeUse::Single(decl))
    }

    /// A JSON body.
    pub fn json(decl: ShapeDecl) -> Self {
        Self::new(ParamLocation::Json, ShapeUse::Single(decl)).media_type("application/json")
    }

    /// A URL-encoded form body.
    pub fn form(decl: ShapeDecl) -> Self {
        Self::new(ParamLocation::Form, ShapeUse::Single(decl))
            .media_type("application/x-www-form-urlencoded")
    }

    /// A multipart body. Every field is serialized with `encoding`.
    pub fn multiform(decl: ShapeDecl, encoding: Encoding) -> Self {
        Self::new(ParamLocation::Multiform, ShapeUse::Single(decl))
            .media_type("multipart/form-data")
            .encoding(encoding)
    }

    /// A file upload body.
    pub fn file(decl: ShapeDecl) -> Self {
        Self::new(ParamLocation::File, ShapeUse::Single(decl)).media_type("multipart/form-data")
    }

    /// Carries an array of the shape instead of a single value.
    pub fn array(mut self) -> Self {
        self.shape = match self.shape {
            ShapeUse::Single(decl) => ShapeUse::Array(decl),
            other => other,
        };
        self
    }

    /// Adds a media type.
    pub fn media_type(mut self, media_type: impl Into<String>) -> Self {
        let media_type = media_type.into();
        if !self.media_types.contains(&media_type) {
            self.media_types.push(media_type);
        }
        self
    }

    /// Replaces the media types.
    pub fn media_types<I, S>(mut self, media_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.media_types = media_types.into_iter().map(Into::into).collect();
        self
    }

    /// Marks the body as required.
    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Sets the body description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Uses a single property of the shape as the body schema.
    pub fn nested_key(mut self, key: impl Into<String>) -> Self {
        self.nested_key = Some(key.into());
        self
    }

    /// Sets the multipart serialization directive.
    pub fn encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = Some(encoding);
        self
    }

    /// Where the shape is carried.
    pub fn location(&self) -> ParamLocation {
        self.location
    }

    /// The carried shape.
    pub fn shape(&self) -> &ShapeUse {
        &self.shape
    }
}

/// Status code of a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusCode {
    /// A concrete HTTP status.
    Code(u16),
    /// The `default` response.
    Default,
}

impl StatusCode {
    /// Whether this is a 2xx status.
    pub fn is_success(self) -> bool {
        matches!(self, Self::Code(code) if (200..300).contains(&code))
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Code(code) => write!(f, "{code}"),
            Self::Default => f.write_str("default"),
        }
    }
}

/// What a response carries.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponsePayload {
    /// A scalar described inline, with a literal example.
    InlineScalar {
        /// The scalar schema.
        schema: Value,
        /// Example value.
        example: Value,
    },
    /// Raw bytes.
    RawBytes {
        /// Example content.
        example: Vec<u8>,
    },
    /// A registered shape.
    Shape(ShapeUse),
    /// A schema written as-is, bypassing shape registration.
    ExplicitSchema(Value),
}

impl ResponsePayload {
    /// The schema written directly under the media type, if the payload is
    /// not a registered shape.
    pub fn explicit_schema(&self) -> Option<Value> {
        match self {
            Self::InlineScalar { schema, example } => {
                let mut schema = schema.clone();
                if let Value::Object(object) = &mut schema {
                    object
                        .entry("example")
                        .or_insert_with(|| example.clone());
                }
                Some(schema)
            }
            Self::RawBytes { .. } => Some(json!({"type": "string", "format": "binary"})),
            Self::ExplicitSchema(schema) => Some(schema.clone()),
            Self::Shape(_) => None,
        }
    }
}

/// One declared output of an endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseDescriptor {
    name: String,
    status_codes: Option<Vec<StatusCode>>,
    media_type: String,
    description: Option<String>,
    header: Option<ShapeDecl>,
    payload: Option<ResponsePayload>,
    core: bool,
}

impl ResponseDescriptor {
    /// Creates a response with no payload, served as `*/*` under status 200.
    ///
    /// The name identifies the response: links and XML wrappers refer to it.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status_codes: None,
            media_type: "*/*".to_string(),
            description: None,
            header: None,
            payload: None,
            core: false,
        }
    }

    /// A JSON response carrying `decl`.
    pub fn json(name: impl Into<String>, decl: ShapeDecl) -> Self {
        Self::new(name)
            .media_type("application/json")
            .shape(decl)
    }

    /// An XML response carrying `decl`.
    pub fn xml(name: impl Into<String>, decl: ShapeDecl) -> Self {
        Self::new(name).media_type("application/xml").shape(decl)
    }

    /// A plain text response.
    pub fn text(name: impl Into<String>) -> Self {
        Self::new(name)
            .media_type("text/plain")
            .payload(ResponsePayload::InlineScalar {
                schema: json!({"type": "string"}),
                example: json!("example data"),
            })
    }

    /// An HTML response.
    pub fn html(name: impl Into<String>) -> Self {
        Self::new(name)
            .media_type("text/html")
            .payload(ResponsePayload::InlineScalar {
                schema: json!({"type": "string"}),
                example: json!("<h1> example html</h1>"),
            })
    }

    /// A binary file response.
    pub fn file(name: impl Into<String>) -> Self {
        Self::new(name)
            .media_type("application/octet-stream")
            .payload(ResponsePayload::RawBytes {
                example: b" example bytes".to_vec(),
            })
    }

    /// Serves the response under a single status.
    pub fn status(mut self, code: u16) -> Self {
        self.status_codes = Some(vec![StatusCode::Code(code)]);
        self
    }

    /// Serves the response under several statuses.
    pub fn statuses<I: IntoIterator<Item = u16>>(mut self, codes: I) -> Self {
        self.status_codes = Some(codes.into_iter().map(StatusCode::Code).collect());
        self
    }

    /// Serves the response as the `default` response.
    pub fn default_status(mut self) -> Self {
        self.status_codes = Some(vec![StatusCode::Default]);
        self
    }

    /// Sets the media type.
    pub fn media_type(mut self, media_type: impl Into<String>) -> Self {
        self.media_type = media_type.into();
        self
    }

    /// Sets the description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Declares the response headers as the fields of `decl`.
    pub fn header(mut self, decl: ShapeDecl) -> Self {
        self.header = Some(decl);
        self
    }

    /// Sets the payload.
    pub fn payload(mut self, payload: ResponsePayload) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Carries one value of `decl`.
    pub fn shape(self, decl: ShapeDecl) -> Self {
        self.payload(ResponsePayload::Shape(ShapeUse::Single(decl)))
    }

    /// Carries an array of `decl`.
    pub fn array(self, decl: ShapeDecl) -> Self {
        self.payload(ResponsePayload::Shape(ShapeUse::Array(decl)))
    }

    /// Carries one value of any of `decls`.
    pub fn one_of(self, decls: Vec<ShapeDecl>) -> Self {
        self.payload(ResponsePayload::Shape(ShapeUse::UnionOf(decls)))
    }

    /// Marks the response as the endpoint's core response.
    pub fn core(mut self) -> Self {
        self.core = true;
        self
    }

    /// The response identity.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Statuses the response is served under.
    pub fn status_codes(&self) -> Vec<StatusCode> {
        self.status_codes
            .clone()
            .unwrap_or_else(|| vec![StatusCode::Code(200)])
    }

    /// The media type.
    pub fn media_type_str(&self) -> &str {
        &self.media_type
    }

    /// The description, if any.
    pub fn description_str(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// The header shape, if any.
    pub fn header_shape(&self) -> Option<&ShapeDecl> {
        self.header.as_ref()
    }

    /// The payload, if any.
    pub fn payload_ref(&self) -> Option<&ResponsePayload> {
        self.payload.as_ref()
    }

    /// Whether the response is marked as core.
    pub fn is_core(&self) -> bool {
        self.core
    }

    /// The body shape, when the response carries exactly one shape value.
    pub fn body_shape(&self) -> Option<&ShapeDecl> {
        match &self.payload {
            Some(ResponsePayload::Shape(ShapeUse::Single(decl))) => Some(decl),
            _ => None,
        }
    }

    pub(crate) fn shape_decls(&self) -> &[ShapeDecl] {
        match &self.payload {
            Some(ResponsePayload::Shape(shape)) => shape.decls(),
            _ => &[],
        }
    }

    /// Builds an example body for the response.
    pub fn example_value(&self, registry: &mut ShapeRegistry) -> DocsResult<Value> {
        let Some(payload) = &self.payload else {
            return Ok(Value::Null);
        };
        Ok(match payload {
            ResponsePayload::InlineScalar { example, .. } => example.clone(),
            ResponsePayload::RawBytes { example } => {
                Value::String(String::from_utf8_lossy(example).into_owned())
            }
            ResponsePayload::ExplicitSchema(schema) => {
                schema.get("example").cloned().unwrap_or(Value::Null)
            }
            ResponsePayload::Shape(ShapeUse::Array(decl)) => {
                json!([shape_example(registry, decl)?])
            }
            ResponsePayload::Shape(shape) => match shape.decls().first() {
                Some(decl) => shape_example(registry, decl)?,
                None => Value::Null,
            },
        })
    }

    /// Builds an example of the response headers.
    pub fn header_example(&self, registry: &mut ShapeRegistry) -> DocsResult<Value> {
        match &self.header {
            Some(decl) => shape_example(registry, decl),
            None => Ok(Value::Object(Map::new())),
        }
    }
}

fn shape_example(registry: &mut ShapeRegistry, decl: &ShapeDecl) -> DocsResult<Value> {
    let shape = registry.generate_shape(decl)?;
    let definitions: Map<String, Value> = shape.definitions.into_iter().collect();
    Ok(example_from_schema(&shape.schema, &definitions))
}

/// Several responses served together under one status.
#[derive(Debug, Clone, PartialEq)]
pub struct UnionResponse {
    members: Vec<ResponseDescriptor>,
    status_codes: Vec<StatusCode>,
    description: Option<String>,
    header: Option<ShapeDecl>,
}

impl UnionResponse {
    /// Groups `members` under status 200.
    ///
    /// Members may not set their own description, header or status codes.
    pub fn new(members: Vec<ResponseDescriptor>) -> DocsResult<Self> {
        for member in &members {
            let attribute = if member.description.is_some() {
                "description"
            } else if member.header.is_some() {
                "header"
            } else if member.status_codes.is_some() {
                "status codes"
            } else {
                continue;
            };
            return Err(DocsError::InvalidUnionMember {
                member: member.name.clone(),
                attribute: attribute.to_string(),
            });
        }
        Ok(Self {
            members,
            status_codes: vec![StatusCode::Code(200)],
            description: None,
            header: None,
        })
    }

    /// Serves the union under a single status.
    pub fn status(mut self, code: u16) -> Self {
        self.status_codes = vec![StatusCode::Code(code)];
        self
    }

    /// Serves the union as the `default` response.
    pub fn default_status(mut self) -> Self {
        self.status_codes = vec![StatusCode::Default];
        self
    }

    /// Sets the shared description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the shared header shape.
    pub fn header(mut self, decl: ShapeDecl) -> Self {
        self.header = Some(decl);
        self
    }
}

/// A response declared on an endpoint.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseEntry {
    /// A single response.
    Single(ResponseDescriptor),
    /// Several responses sharing status, description and header.
    Union(UnionResponse),
}

impl ResponseEntry {
    /// Statuses the entry is served under.
    pub fn status_codes(&self) -> Vec<StatusCode> {
        match self {
            Self::Single(response) => response.status_codes(),
            Self::Union(union) => union.status_codes.clone(),
        }
    }

    /// The description shared by the members.
    pub fn description(&self) -> Option<&str> {
        match self {
            Self::Single(response) => response.description.as_deref(),
            Self::Union(union) => union.description.as_deref(),
        }
    }

    /// The header shape shared by the members.
    pub fn header(&self) -> Option<&ShapeDecl> {
        match self {
            Self::Single(response) => response.header.as_ref(),
            Self::Union(union) => union.header.as_ref(),
        }
    }

    /// The member responses.
    pub fn members(&self) -> &[ResponseDescriptor] {
        match self {
            Self::Single(response) => slice::from_ref(response),
            Self::Union(union) => &union.members,
        }
    }
}

impl From<ResponseDescriptor> for ResponseEntry {
    fn from(response: ResponseDescriptor) -> Self {
        Self::Single(response)
    }
}

impl From<UnionResponse> for ResponseEntry {
    fn from(union: UnionResponse) -> Self {
        Self::Union(union)
    }
}

/// A declared endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct EndpointDescriptor {
    pub(crate) path: String,
    pub(crate) methods: Vec<HttpMethod>,
    pub(crate) operation_id: String,
    pub(crate) summary: Option<String>,
    pub(crate) description: Option<String>,
    pub(crate) deprecated: bool,
    pub(crate) tags: Vec<Tag>,
    pub(crate) requests: Vec<RequestDescriptor>,
    pub(crate) responses: Vec<ResponseEntry>,
    pub(crate) security: IndexMap<String, SecurityUse>,
}

impl EndpointDescriptor {
    /// Starts describing the endpoint at `path`.
    pub fn builder(path: impl Into<String>, operation_id: impl Into<String>) -> EndpointBuilder {
        EndpointBuilder {
            endpoint: Self {
                path: path.into(),
                methods: Vec::new(),
                operation_id: operation_id.into(),
                summary: None,
                description: None,
                deprecated: false,
                tags: Vec::new(),
                requests: Vec::new(),
                responses: Vec::new(),
                security: IndexMap::new(),
            },
        }
    }

    /// The path template.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The methods the endpoint is registered under.
    pub fn methods(&self) -> &[HttpMethod] {
        &self.methods
    }

    /// The operation identifier.
    pub fn operation_id(&self) -> &str {
        &self.operation_id
    }

    /// The operation identifier used for `method`.
    ///
    /// Endpoints registered under several methods suffix the method name.
    pub fn operation_id_for(&self, method: HttpMethod) -> String {
        if self.methods.len() > 1 {
            format!("{}_{}", self.operation_id, method.as_str())
        } else {
            self.operation_id.clone()
        }
    }

    /// The request descriptors, in declaration order.
    pub fn requests(&self) -> &[RequestDescriptor] {
        &self.requests
    }

    /// The response entries, in declaration order.
    pub fn responses(&self) -> &[ResponseEntry] {
        &self.responses
    }

    /// The response used to pick the endpoint's example value.
    ///
    /// This is the response marked as core, or else the first response
    /// served under a 2xx status.
    pub fn core_response(&self) -> Option<&ResponseDescriptor> {
        let all: Vec<(bool, &ResponseDescriptor)> = self
            .responses
            .iter()
            .flat_map(|entry| {
                let success = entry.status_codes().iter().any(|code| code.is_success());
                entry.members().iter().map(move |member| (success, member))
            })
            .collect();
        all.iter()
            .find(|(_, member)| member.is_core())
            .or_else(|| all.iter().find(|(success, _)| *success))
            .map(|(_, member)| *member)
    }
}

/// Builder for [`EndpointDescriptor`].
#[derive(Debug, Clone)]
pub struct EndpointBuilder {
    endpoint: EndpointDescriptor,
}

impl EndpointBuilder {
    /// Adds a method.
    pub fn method(mut self, method: HttpMethod) -> Self {
        if !self.endpoint.methods.contains(&method) {
            self.endpoint.methods.push(method);
        }
        self
    }

    /// Adds several methods.
    pub fn methods<I: IntoIterator<Item = HttpMethod>>(self, methods: I) -> Self {
        methods.into_iter().fold(self, Self::method)
    }

    /// Sets the summary.
    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.endpoint.summary = Some(summary.into());
        self
    }

    /// Sets the description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.endpoint.description = Some(description.into());
        self
    }

    /// Marks the endpoint as deprecated.
    pub fn deprecated(mut self, deprecated: bool) -> Self {
        self.endpoint.deprecated = deprecated;
        self
    }

    /// Adds a tag.
    pub fn tag(mut self, tag: Tag) -> Self {
        self.endpoint.tags.push(tag);
        self
    }

    /// Adds a request descriptor.
    pub fn request(mut self, request: RequestDescriptor) -> Self {
        self.endpoint.requests.push(request);
        self
    }

    /// Adds a response entry.
    pub fn response(mut self, response: impl Into<ResponseEntry>) -> Self {
        self.endpoint.responses.push(response.into());
        self
    }

    /// Requires a security scheme.
    pub fn security(mut self, name: impl Into<String>, security: SecurityUse) -> Self {
        self.endpoint.security.insert(name.into(), security);
        self
    }

    /// Validates and returns the descriptor.
    pub fn build(self) -> DocsResult<EndpointDescriptor> {
        let endpoint = self.endpoint;
        if !endpoint.path.starts_with('/') {
            return Err(DocsError::InvalidPath {
                path: endpoint.path,
            });
        }
        if endpoint.methods.is_empty() {
            return Err(DocsError::InvalidDescriptor {
                name: endpoint.operation_id,
                reason: "an endpoint needs at least one HTTP method".to_string(),
            });
        }
        let core = endpoint
            .responses
            .iter()
            .flat_map(ResponseEntry::members)
            .filter(|member| member.is_core())
            .count();
        if core > 1 {
            return Err(DocsError::MultipleCoreResponses {
                operation_id: endpoint.operation_id,
                count: core,
            });
        }
        Ok(endpoint)
    }
}
