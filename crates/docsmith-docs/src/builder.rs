//! OpenAPI document assembly.
//!
//! [`OpenApiBuilder`] collects document metadata and endpoint descriptors
//! and turns them into an [`OpenApi`] document. Shapes used by bodies and
//! responses are registered once into `components.schemas` and referenced
//! from every operation. Parameter shapes are expanded field by field and
//! dropped from the components afterwards when nothing else uses them.
//!
//! ## Example
//!
//! ```rust,ignore
//! use docsmith_docs::{EndpointDescriptor, HttpMethod, OpenApiBuilder, RequestDescriptor, ResponseDescriptor};
//! use docsmith_schema::{ShapeDecl, ShapeRegistry};
//!
//! let mut builder = OpenApiBuilder::new("Petstore", "1.0.0");
//! builder.add_endpoint(
//!     EndpointDescriptor::builder("/pet/{petId}", "getPetById")
//!         .method(HttpMethod::Get)
//!         .request(RequestDescriptor::path(ShapeDecl::of::<PetPath>()))
//!         .response(ResponseDescriptor::json("PetResponse", ShapeDecl::of::<Pet>()))
//!         .build()?,
//! )?;
//!
//! let mut registry = ShapeRegistry::new();
//! let document = builder.generate(&mut registry)?;
//! ```

use std::collections::{HashMap, HashSet};

use docsmith_schema::{
    inline_refs, ref_name, rewrite_ref_prefix, ShapeDecl, ShapeKey, ShapeRegistry,
    DEFINITIONS_PREFIX,
};
use indexmap::IndexMap;
use serde_json::{json, Map, Value};
use tracing::{debug, warn};

use crate::descriptor::{
    template_parameters, EndpointDescriptor, HttpMethod, ParamLocation, ResponseEntry,
};
use crate::error::{DocsError, DocsResult};
use crate::links::{LinkDescriptor, LinkRegistry};
use crate::openapi::{
    Components, Contact, ExternalDocumentation, Info, License, OpenApi, Operation, ParameterIn,
    PathItem, SecurityRequirement, Server, Tag,
};
use crate::security::{ApiKeyLocation, SchemeRegistry, SecurityScheme};
use crate::tags::TagRegistry;

/// Prefix of references into the shared components.
pub const COMPONENTS_PREFIX: &str = "#/components/schemas/";

/// Assembly options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssemblerSettings {
    /// Value of the document's `openapi` field.
    pub openapi_version: String,
    /// Append advisory notes for Swagger UI limitations to cookie
    /// parameters and multipart fields.
    pub swagger_annotations: bool,
}

impl Default for AssemblerSettings {
    fn default() -> Self {
        Self {
            openapi_version: "3.0.3".to_string(),
            swagger_annotations: true,
        }
    }
}

/// Builder for OpenAPI documents.
#[derive(Debug, Clone)]
pub struct OpenApiBuilder {
    settings: AssemblerSettings,
    info: Info,
    servers: Vec<Server>,
    external_docs: Option<ExternalDocumentation>,
    tags: TagRegistry,
    schemes: SchemeRegistry,
    links: LinkRegistry,
    endpoints: Vec<EndpointDescriptor>,
}

impl OpenApiBuilder {
    /// Create a new builder.
    #[must_use]
    pub fn new(title: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            settings: AssemblerSettings::default(),
            info: Info {
                title: title.into(),
                version: version.into(),
                ..Info::default()
            },
            servers: Vec::new(),
            external_docs: None,
            tags: TagRegistry::new(),
            schemes: SchemeRegistry::default(),
            links: LinkRegistry::new(),
            endpoints: Vec::new(),
        }
    }

    /// Replace the assembly settings.
    #[must_use]
    pub fn settings(mut self, settings: AssemblerSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Set the API description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.info.description = Some(description.into());
        self
    }

    /// Set the terms of service URL.
    #[must_use]
    pub fn terms_of_service(mut self, url: impl Into<String>) -> Self {
        self.info.terms_of_service = Some(url.into());
        self
    }

    /// Set contact information.
    #[must_use]
    pub fn contact(mut self, contact: Contact) -> Self {
        self.info.contact = Some(contact);
        self
    }

    /// Set license information.
    #[must_use]
    pub fn license(mut self, name: impl Into<String>, url: Option<String>) -> Self {
        self.info.license = Some(License {
            name: name.into(),
            url,
        });
        self
    }

    /// Add a server.
    #[must_use]
    pub fn server(mut self, url: impl Into<String>, description: Option<String>) -> Self {
        self.servers.push(Server::new(url, description));
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

    /// Add a Bearer token security scheme.
    pub fn bearer_auth(mut self, name: &str) -> DocsResult<Self> {
        self.add_security_scheme(name, &SecurityScheme::bearer())?;
        Ok(self)
    }

    /// Add an API key security scheme read from `header_name`.
    pub fn api_key_auth(mut self, name: &str, header_name: &str) -> DocsResult<Self> {
        self.add_security_scheme(
            name,
            &SecurityScheme::api_key(header_name, ApiKeyLocation::Header),
        )?;
        Ok(self)
    }

    /// The assembly settings.
    pub fn assembler_settings(&self) -> &AssemblerSettings {
        &self.settings
    }

    /// Registers a document-level tag.
    pub fn add_tag(&mut self, tag: &Tag) -> DocsResult<()> {
        self.tags.add(tag)
    }

    /// Registers a security scheme.
    pub fn add_security_scheme(&mut self, name: &str, scheme: &SecurityScheme) -> DocsResult<()> {
        self.schemes.register(name, scheme)
    }

    /// Adds an endpoint.
    ///
    /// Its tags and security schemes are registered immediately, and a
    /// method already registered on the same path is rejected.
    pub fn add_endpoint(&mut self, endpoint: EndpointDescriptor) -> DocsResult<()> {
        for existing in self.endpoints.iter().filter(|e| e.path == endpoint.path) {
            if let Some(method) = endpoint
                .methods
                .iter()
                .find(|method| existing.methods.contains(method))
            {
                return Err(DocsError::DuplicateMethod {
                    path: endpoint.path.clone(),
                    method: method.to_string(),
                });
            }
        }
        for tag in &endpoint.tags {
            self.tags.add(tag)?;
        }
        for (name, security) in &endpoint.security {
            self.schemes.register(name, security.scheme())?;
        }
        debug!(
            operation_id = %endpoint.operation_id,
            path = %endpoint.path,
            methods = endpoint.methods.len(),
            "endpoint added"
        );
        self.endpoints.push(endpoint);
        Ok(())
    }

    /// Links the `link` source to the `param_name` parameter at `location`
    /// of `operation_id`.
    ///
    /// Returns `false` when the same link key is already registered on the
    /// source response.
    pub fn add_link(
        &mut self,
        link: &LinkDescriptor,
        operation_id: &str,
        location: ParamLocation,
        param_name: &str,
    ) -> bool {
        self.links.register(link, operation_id, location, param_name)
    }

    /// The registered links.
    pub fn links(&self) -> &LinkRegistry {
        &self.links
    }

    /// The added endpoints.
    pub fn endpoints(&self) -> &[EndpointDescriptor] {
        &self.endpoints
    }

    /// Assembles the document.
    ///
    /// Shape names are taken from `registry`, so documents generated with
    /// the same registry agree on every name.
    pub fn generate(&self, registry: &mut ShapeRegistry) -> DocsResult<OpenApi> {
        for decl in self.isolated_decls() {
            registry.register_and_name(decl)?;
        }
        let bulk = registry.bulk_register(&self.component_decls())?;
        let mut schemas = bulk.definitions;
        for schema in schemas.values_mut() {
            rewrite_ref_prefix(schema, DEFINITIONS_PREFIX, COMPONENTS_PREFIX);
        }
        let usage = self.count_usage(&bulk.names);

        let mut assembly = Assembly {
            settings: &self.settings,
            registry,
            names: bulk.names,
            schemas,
            links: &self.links,
        };
        let mut paths: IndexMap<String, PathItem> = IndexMap::new();
        for endpoint in &self.endpoints {
            for &method in &endpoint.methods {
                let operation = assembly.operation(endpoint, method)?;
                let item = paths.entry(endpoint.path.clone()).or_default();
                if item.set(method, operation).is_some() {
                    return Err(DocsError::DuplicateMethod {
                        path: endpoint.path.clone(),
                        method: method.to_string(),
                    });
                }
            }
            warn_undeclared_path_parameters(endpoint, &paths);
        }

        let mut schemas = assembly.schemas;
        evict_parameter_shapes(&mut schemas, &paths, &usage)?;

        let schemes = self.schemes.schemes().clone();
        let components = (!schemas.is_empty() || !schemes.is_empty()).then(|| Components {
            schemas,
            security_schemes: schemes,
        });
        debug!(
            paths = paths.len(),
            shapes = components.as_ref().map_or(0, |c| c.schemas.len()),
            "document assembled"
        );

        Ok(OpenApi {
            openapi: self.settings.openapi_version.clone(),
            info: self.info.clone(),
            servers: self.servers.clone(),
            paths,
            components,
            tags: self.tags.to_vec(),
            external_docs: self.external_docs.clone(),
        })
    }

    /// Assembles the document as pretty-printed JSON.
    pub fn generate_json(&self, registry: &mut ShapeRegistry) -> DocsResult<String> {
        self.generate(registry)?.to_json()
    }

    /// Assembles the document as YAML.
    pub fn generate_yaml(&self, registry: &mut ShapeRegistry) -> DocsResult<String> {
        self.generate(registry)?.to_yaml()
    }

    /// Shapes that are generated inline and never shared.
    fn isolated_decls(&self) -> impl Iterator<Item = &ShapeDecl> {
        self.endpoints.iter().flat_map(|endpoint| {
            let requests = endpoint
                .requests
                .iter()
                .filter(|request| {
                    matches!(request.location, ParamLocation::Multiform | ParamLocation::File)
                })
                .flat_map(|request| request.shape.decls());
            let headers = endpoint.responses.iter().flat_map(|entry| {
                entry
                    .header()
                    .into_iter()
                    .chain(entry.members().iter().filter_map(|m| m.header_shape()))
            });
            requests.chain(headers)
        })
    }

    /// Shapes registered into the components: parameters, bodies and
    /// response payloads.
    fn component_decls(&self) -> Vec<ShapeDecl> {
        let mut decls = Vec::new();
        for endpoint in &self.endpoints {
            for request in &endpoint.requests {
                if !matches!(request.location, ParamLocation::Multiform | ParamLocation::File) {
                    decls.extend(request.shape.decls().iter().cloned());
                }
            }
            for entry in &endpoint.responses {
                for member in entry.members() {
                    decls.extend(member.shape_decls().iter().cloned());
                }
            }
        }
        decls
    }

    fn count_usage(&self, names: &HashMap<ShapeKey, String>) -> HashMap<String, Usage> {
        let mut usage: HashMap<String, Usage> = HashMap::new();
        let mut record = |decl: &ShapeDecl, inline: bool, count: usize| {
            if let Some(name) = names.get(decl.key()) {
                let entry = usage.entry(name.clone()).or_default();
                if inline {
                    entry.inline += count;
                } else {
                    entry.shared += count;
                }
            }
        };
        for endpoint in &self.endpoints {
            let count = endpoint.methods.len();
            for request in &endpoint.requests {
                let inline = request.location.parameter_in().is_some();
                if matches!(request.location, ParamLocation::Multiform | ParamLocation::File) {
                    continue;
                }
                for decl in request.shape.decls() {
                    record(decl, inline, count);
                }
            }
            for member in endpoint.responses.iter().flat_map(ResponseEntry::members) {
                for decl in member.shape_decls() {
                    record(decl, false, count);
                }
            }
        }
        usage
    }
}

/// Per-kind use counts of a shared shape.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Usage {
    /// Uses expanded field by field (parameter carriers).
    inline: usize,
    /// Uses referenced from bodies and responses.
    shared: usize,
}

/// State shared by the routing steps of one `generate` call.
pub(crate) struct Assembly<'a> {
    pub(crate) settings: &'a AssemblerSettings,
    pub(crate) registry: &'a mut ShapeRegistry,
    pub(crate) names: HashMap<ShapeKey, String>,
    pub(crate) schemas: IndexMap<String, Value>,
    pub(crate) links: &'a LinkRegistry,
}

impl Assembly<'_> {
    fn operation(
        &mut self,
        endpoint: &EndpointDescriptor,
        method: HttpMethod,
    ) -> DocsResult<Operation> {
        let mut operation = Operation {
            operation_id: endpoint.operation_id_for(method),
            summary: endpoint.summary.clone(),
            description: endpoint.description.clone(),
            tags: endpoint.tags.iter().map(|tag| tag.name.clone()).collect(),
            deprecated: endpoint.deprecated,
            security: endpoint
                .security
                .iter()
                .map(|(name, security)| {
                    let mut requirement = SecurityRequirement::new();
                    requirement.insert(name.clone(), security.requirement_scopes());
                    requirement
                })
                .collect(),
            ..Operation::default()
        };

        for request in &endpoint.requests {
            match request.location {
                ParamLocation::Query
                | ParamLocation::Header
                | ParamLocation::Path
                | ParamLocation::Cookie => self.route_parameters(&mut operation, request)?,
                ParamLocation::Body | ParamLocation::Form | ParamLocation::Json => {
                    self.route_body(&mut operation, request)?;
                }
                ParamLocation::Multiform => self.route_multiform(&mut operation, request)?,
                ParamLocation::File => self.route_file(&mut operation, request)?,
            }
        }
        self.route_responses(&mut operation, &endpoint.responses)?;

        debug!(
            operation_id = %operation.operation_id,
            path = %endpoint.path,
            method = %method,
            "operation assembled"
        );
        Ok(operation)
    }

    /// Canonical name of a shape registered into the components.
    pub(crate) fn name_of(&self, operation_id: &str, decl: &ShapeDecl) -> DocsResult<String> {
        self.names
            .get(decl.key())
            .cloned()
            .ok_or_else(|| DocsError::UnsupportedShape {
                operation_id: operation_id.to_string(),
                reason: format!("shape '{}' was not registered", decl.name()),
            })
    }

    /// A `$ref` to a shared shape.
    pub(crate) fn reference(&self, operation_id: &str, decl: &ShapeDecl) -> DocsResult<Value> {
        let name = self.name_of(operation_id, decl)?;
        Ok(json!({ "$ref": format!("{COMPONENTS_PREFIX}{name}") }))
    }

    /// Generates a shape on its own, with every nested shape inlined.
    pub(crate) fn isolated_schema(&mut self, decl: &ShapeDecl) -> DocsResult<Value> {
        let shape = self.registry.generate_shape(decl)?;
        let definitions: Map<String, Value> = shape.definitions.into_iter().collect();
        let mut schema = shape.schema;
        inline_refs(&mut schema, &definitions);
        if let Value::Object(object) = &mut schema {
            object.remove("title");
        }
        Ok(schema)
    }
}

fn warn_undeclared_path_parameters(
    endpoint: &EndpointDescriptor,
    paths: &IndexMap<String, PathItem>,
) {
    let Some(item) = paths.get(&endpoint.path) else {
        return;
    };
    for (method, operation) in item.operations() {
        if !endpoint.methods.contains(&method) {
            continue;
        }
        for name in template_parameters(&endpoint.path) {
            let declared = operation
                .parameters
                .iter()
                .any(|p| p.location == ParameterIn::Path && p.name == name);
            if !declared {
                warn!(
                    operation_id = %operation.operation_id,
                    path = %endpoint.path,
                    parameter = %name,
                    "path template parameter has no declared path parameter"
                );
            }
        }
    }
}

/// Drops shapes used only as parameter carriers from the components.
///
/// A shape is kept while a body or response uses it, or while the paths or
/// another kept shape still reference it.
fn evict_parameter_shapes(
    schemas: &mut IndexMap<String, Value>,
    paths: &IndexMap<String, PathItem>,
    usage: &HashMap<String, Usage>,
) -> DocsResult<()> {
    let candidates: HashSet<&str> = usage
        .iter()
        .filter(|(_, usage)| usage.inline > 0 && usage.shared == 0)
        .map(|(name, _)| name.as_str())
        .collect();
    if candidates.is_empty() {
        return Ok(());
    }

    let mut referenced = HashSet::new();
    collect_refs(&serde_json::to_value(paths)?, &mut referenced);
    for (name, schema) in schemas.iter() {
        if !candidates.contains(name.as_str()) {
            collect_refs(schema, &mut referenced);
        }
    }
    let mut kept: HashSet<&str> = HashSet::new();
    loop {
        let newly: Vec<&str> = candidates
            .iter()
            .copied()
            .filter(|name| referenced.contains(*name) && !kept.contains(name))
            .collect();
        if newly.is_empty() {
            break;
        }
        for name in newly {
            kept.insert(name);
            if let Some(schema) = schemas.get(name) {
                collect_refs(schema, &mut referenced);
            }
        }
    }

    for name in candidates.difference(&kept) {
        if schemas.shift_remove(*name).is_some() {
            warn!(shape = %name, "evicted shape used only as a parameter carrier");
        }
    }
    Ok(())
}

fn collect_refs(value: &Value, names: &mut HashSet<String>) {
    match value {
        Value::Object(object) => {
            if let Some(name) = object
                .get("$ref")
                .and_then(Value::as_str)
                .filter(|reference| reference.starts_with(COMPONENTS_PREFIX))
                .and_then(ref_name)
            {
                names.insert(name.to_string());
            }
            for child in object.values() {
                collect_refs(child, names);
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_refs(item, names);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{RequestDescriptor, ResponseDescriptor};
    use crate::security::SecurityUse;
    use schemars::JsonSchema;

    #[allow(dead_code)]
    #[derive(JsonSchema)]
    struct Pet {
        id: i64,
        name: String,
    }

    #[allow(dead_code)]
    #[derive(JsonSchema)]
    struct PetPath {
        pet_id: i64,
    }

    #[allow(dead_code)]
    #[derive(JsonSchema)]
    struct Paging {
        page: Option<u32>,
    }

    fn get_pet() -> EndpointDescriptor {
        EndpointDescriptor::builder("/pet/{pet_id}", "getPetById")
            .method(HttpMethod::Get)
            .request(RequestDescriptor::path(ShapeDecl::of::<PetPath>()))
            .response(ResponseDescriptor::json("PetResponse", ShapeDecl::of::<Pet>()))
            .build()
            .unwrap()
    }

    #[test]
    fn test_generate_minimal_document() {
        let mut builder = OpenApiBuilder::new("Petstore", "1.0.0").description("Pets");
        builder.add_endpoint(get_pet()).unwrap();
        let document = builder.generate(&mut ShapeRegistry::new()).unwrap();

        assert_eq!(document.openapi, "3.0.3");
        assert_eq!(document.info.title, "Petstore");
        let operation = document.operation("/pet/{pet_id}", HttpMethod::Get).unwrap();
        assert_eq!(operation.operation_id, "getPetById");
        assert_eq!(operation.parameters.len(), 1);
        assert!(document.schema("Pet").is_some());
        assert!(document.schema("PetPath").is_none());
    }

    #[test]
    fn test_duplicate_method_rejected_on_add() {
        let mut builder = OpenApiBuilder::new("Petstore", "1.0.0");
        builder.add_endpoint(get_pet()).unwrap();
        let err = builder.add_endpoint(get_pet()).unwrap_err();
        assert!(matches!(err, DocsError::DuplicateMethod { ref method, .. } if method == "GET"));
    }

    #[test]
    fn test_multi_method_operation_ids() {
        let endpoint = EndpointDescriptor::builder("/pet", "pet")
            .methods([HttpMethod::Get, HttpMethod::Post])
            .response(ResponseDescriptor::json("PetResponse", ShapeDecl::of::<Pet>()))
            .build()
            .unwrap();
        let mut builder = OpenApiBuilder::new("Petstore", "1.0.0");
        builder.add_endpoint(endpoint).unwrap();
        let document = builder.generate(&mut ShapeRegistry::new()).unwrap();
        assert_eq!(
            document.operation("/pet", HttpMethod::Get).unwrap().operation_id,
            "pet_get"
        );
        assert_eq!(
            document.operation("/pet", HttpMethod::Post).unwrap().operation_id,
            "pet_post"
        );
    }

    #[test]
    fn test_parameter_shape_kept_when_shared() {
        let endpoint = EndpointDescriptor::builder("/pets", "listPets")
            .method(HttpMethod::Post)
            .request(RequestDescriptor::query(ShapeDecl::of::<Paging>()))
            .request(RequestDescriptor::json(ShapeDecl::of::<Paging>()))
            .build()
            .unwrap();
        let mut builder = OpenApiBuilder::new("Petstore", "1.0.0");
        builder.add_endpoint(endpoint).unwrap();
        let document = builder.generate(&mut ShapeRegistry::new()).unwrap();
        assert!(document.schema("Paging").is_some());
    }

    #[test]
    fn test_parameter_only_shape_evicted() {
        let endpoint = EndpointDescriptor::builder("/pets", "listPets")
            .method(HttpMethod::Get)
            .request(RequestDescriptor::query(ShapeDecl::of::<Paging>()))
            .build()
            .unwrap();
        let mut builder = OpenApiBuilder::new("Petstore", "1.0.0");
        builder.add_endpoint(endpoint).unwrap();
        let mut registry = ShapeRegistry::new();
        let document = builder.generate(&mut registry).unwrap();
        assert!(document.components.is_none());
        assert!(registry.contains_name("Paging"));
    }

    #[test]
    fn test_security_requirements_and_schemes() {
        let endpoint = EndpointDescriptor::builder("/pet", "addPet")
            .method(HttpMethod::Post)
            .security("bearer", SecurityUse::new(SecurityScheme::bearer()))
            .build()
            .unwrap();
        let mut builder = OpenApiBuilder::new("Petstore", "1.0.0")
            .api_key_auth("api_key", "X-API-Key")
            .unwrap();
        builder.add_endpoint(endpoint).unwrap();
        let document = builder.generate(&mut ShapeRegistry::new()).unwrap();

        let operation = document.operation("/pet", HttpMethod::Post).unwrap();
        assert_eq!(operation.security.len(), 1);
        assert!(operation.security[0]["bearer"].is_empty());
        let schemes = &document.components.unwrap().security_schemes;
        assert!(schemes.contains_key("bearer"));
        assert!(schemes.contains_key("api_key"));
    }

    #[test]
    fn test_conflicting_security_scheme() {
        let endpoint = EndpointDescriptor::builder("/pet", "addPet")
            .method(HttpMethod::Post)
            .security("auth", SecurityUse::new(SecurityScheme::basic()))
            .build()
            .unwrap();
        let mut builder = OpenApiBuilder::new("Petstore", "1.0.0")
            .bearer_auth("auth")
            .unwrap();
        let err = builder.add_endpoint(endpoint).unwrap_err();
        assert!(matches!(err, DocsError::SecuritySchemeConflict { .. }));
    }

    #[test]
    fn test_endpoint_tags_registered() {
        let endpoint = EndpointDescriptor::builder("/pet", "addPet")
            .method(HttpMethod::Post)
            .tag(Tag::new("pet", Some("Everything about your Pets")))
            .build()
            .unwrap();
        let mut builder = OpenApiBuilder::new("Petstore", "1.0.0");
        builder
            .add_tag(&Tag::new("pet", Some("Everything about your Pets")))
            .unwrap();
        builder.add_endpoint(endpoint).unwrap();
        let document = builder.generate(&mut ShapeRegistry::new()).unwrap();
        assert_eq!(document.tags.len(), 1);
        assert_eq!(
            document.operation("/pet", HttpMethod::Post).unwrap().tags,
            vec!["pet"]
        );

        let conflicting = EndpointDescriptor::builder("/store", "order")
            .method(HttpMethod::Get)
            .tag(Tag::new("pet", Some("Animals")))
            .build()
            .unwrap();
        assert!(matches!(
            builder.add_endpoint(conflicting),
            Err(DocsError::TagConflict { .. })
        ));
    }

    #[test]
    fn test_collect_refs_only_components() {
        let mut names = HashSet::new();
        collect_refs(
            &json!({
                "a": {"$ref": "#/components/schemas/Pet"},
                "b": [{"$ref": "#/definitions/Other"}]
            }),
            &mut names,
        );
        assert_eq!(names.len(), 1);
        assert!(names.contains("Pet"));
    }
}
