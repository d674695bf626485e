//! The shape registry.
//!
//! The registry owns the name map of every shape it has seen. Names are
//! additive: a shape that stops being used keeps its name reserved for the
//! registry's lifetime.

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use serde_json::Value;
use tracing::debug;

use crate::decl::{ShapeDecl, ShapeKey};
use crate::error::{SchemaError, SchemaResult};
use crate::normalize::{
    collapse_nullable, fingerprint, normalize_name, ref_name, rewrite_refs, DEFINITIONS_PREFIX,
};

/// Settings applied to every generated shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrySettings {
    /// Rewrite nullable constructs into `nullable: true`.
    pub collapse_nullable: bool,
}

impl Default for RegistrySettings {
    fn default() -> Self {
        Self {
            collapse_nullable: true,
        }
    }
}

/// A shape generated for a single declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedShape {
    /// Canonical name of the declaration.
    pub name: String,
    /// The declaration's tree. References point at `#/definitions/<name>`.
    pub schema: Value,
    /// Nested shapes keyed by canonical name.
    pub definitions: IndexMap<String, Value>,
}

/// Result of registering many declarations at once.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BulkShapes {
    /// Canonical name of each registered declaration.
    pub names: HashMap<ShapeKey, String>,
    /// Every shape, registered roots included, keyed by canonical name.
    pub definitions: IndexMap<String, Value>,
}

impl BulkShapes {
    /// Canonical name of a declaration registered in this batch.
    pub fn name_of(&self, decl: &ShapeDecl) -> Option<&str> {
        self.names.get(decl.key()).map(String::as_str)
    }
}

#[derive(Debug, Clone)]
struct NameEntry {
    short: String,
    /// Names to fall back on, in order, when the short name collides.
    qualified: Vec<String>,
    fingerprint: String,
    /// Whether a type or path declaration owns this name.
    owned: bool,
}

/// A declaration's raw tree with nested definitions split out.
struct Expanded {
    root: Value,
    nested: Vec<(String, Value)>,
}

/// Assigns stable, unique names to shapes.
#[derive(Debug, Default)]
pub struct ShapeRegistry {
    settings: RegistrySettings,
    names: IndexMap<String, NameEntry>,
    keys: HashMap<ShapeKey, String>,
    conflicting: HashSet<String>,
}

impl ShapeRegistry {
    /// Creates an empty registry with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty registry with the given settings.
    pub fn with_settings(settings: RegistrySettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    /// Returns the registry settings.
    pub fn settings(&self) -> &RegistrySettings {
        &self.settings
    }

    /// Number of reserved names.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether no shape has been registered yet.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Whether `name` is currently a canonical shape name.
    pub fn contains_name(&self, name: &str) -> bool {
        self.names.contains_key(name)
    }

    /// Canonical name of an already registered declaration.
    pub fn name_of(&self, decl: &ShapeDecl) -> Option<&str> {
        self.keys.get(decl.key()).map(String::as_str)
    }

    /// Returns the canonical name of a declaration, registering it first
    /// if needed.
    ///
    /// When the short name already denotes a different declaration, both
    /// declarations are promoted to their qualified names.
    pub fn register_and_name(&mut self, decl: &ShapeDecl) -> SchemaResult<String> {
        if let Some(name) = self.keys.get(decl.key()) {
            return Ok(name.clone());
        }
        let expanded = self.expand(decl)?;
        self.name_root(decl, &expanded)?;
        self.name_nested(decl, &expanded)?;
        self.current_name(decl.key(), decl.name())
    }

    /// Generates the tree of a declaration along with its nested shapes.
    pub fn generate_shape(&mut self, decl: &ShapeDecl) -> SchemaResult<GeneratedShape> {
        let expanded = self.expand(decl)?;
        self.name_root(decl, &expanded)?;
        let local = self.name_nested(decl, &expanded)?;

        let name = self.current_name(decl.key(), decl.name())?;
        let mut schema = expanded.root;
        self.resolve_refs(&mut schema, &local, &name);
        ensure_title(&mut schema, decl.name());

        let mut definitions = IndexMap::new();
        for (local_name, mut tree) in expanded.nested {
            let Some(canonical) = local.get(&local_name).and_then(|key| self.keys.get(key)) else {
                continue;
            };
            if *canonical == name || definitions.contains_key(canonical) {
                continue;
            }
            let canonical = canonical.clone();
            self.resolve_refs(&mut tree, &local, &name);
            ensure_title(&mut tree, &normalize_name(&local_name));
            definitions.insert(canonical, tree);
        }

        Ok(GeneratedShape {
            name,
            schema,
            definitions,
        })
    }

    /// Registers many declarations in one pass.
    ///
    /// All names are assigned before any tree is rewritten, so promotions
    /// triggered by a later declaration are reflected in every reference.
    pub fn bulk_register(&mut self, decls: &[ShapeDecl]) -> SchemaResult<BulkShapes> {
        let mut seen = HashSet::new();
        let mut expanded = Vec::with_capacity(decls.len());
        for decl in decls {
            if !seen.insert(decl.key().clone()) {
                continue;
            }
            let tree = self.expand(decl)?;
            self.name_root(decl, &tree)?;
            expanded.push((decl, tree));
        }

        let mut locals = Vec::with_capacity(expanded.len());
        for (decl, tree) in &expanded {
            locals.push(self.name_nested(decl, tree)?);
        }

        let mut shapes = BulkShapes::default();
        for ((decl, tree), local) in expanded.into_iter().zip(locals) {
            let name = self.current_name(decl.key(), decl.name())?;
            let mut root = tree.root;
            self.resolve_refs(&mut root, &local, &name);
            ensure_title(&mut root, decl.name());
            shapes.definitions.entry(name.clone()).or_insert(root);

            for (local_name, mut nested) in tree.nested {
                let Some(canonical) = local.get(&local_name).and_then(|key| self.keys.get(key))
                else {
                    continue;
                };
                if shapes.definitions.contains_key(canonical) {
                    continue;
                }
                let canonical = canonical.clone();
                self.resolve_refs(&mut nested, &local, &name);
                ensure_title(&mut nested, &normalize_name(&local_name));
                shapes.definitions.insert(canonical, nested);
            }
            shapes.names.insert(decl.key().clone(), name);
        }

        debug!(
            shapes = shapes.definitions.len(),
            declarations = shapes.names.len(),
            "bulk registered shapes"
        );
        Ok(shapes)
    }

    fn expand(&self, decl: &ShapeDecl) -> SchemaResult<Expanded> {
        let mut root = decl.raw_schema();
        let Value::Object(object) = &mut root else {
            return Err(SchemaError::invalid_schema(
                decl.name(),
                "the root schema is not an object",
            ));
        };
        object.remove("$schema");
        let mut nested = Vec::new();
        for key in ["definitions", "$defs"] {
            if let Some(Value::Object(defs)) = object.remove(key) {
                nested.extend(defs);
            }
        }

        if self.settings.collapse_nullable {
            collapse_nullable(&mut root);
            for (_, tree) in &mut nested {
                collapse_nullable(tree);
            }
        }
        Ok(Expanded { root, nested })
    }

    fn name_root(&mut self, decl: &ShapeDecl, expanded: &Expanded) -> SchemaResult<String> {
        let qualified: Vec<String> = decl.qualified().map(str::to_string).into_iter().collect();
        self.name_for(
            decl.name(),
            &qualified,
            decl.key(),
            &fingerprint(&expanded.root),
        )
    }

    /// Names every nested definition, returning local name to identity.
    ///
    /// Nested shapes borrow their fallback names from the declaration that
    /// reached them: its module path first, then its own qualified name.
    fn name_nested(
        &mut self,
        decl: &ShapeDecl,
        expanded: &Expanded,
    ) -> SchemaResult<HashMap<String, ShapeKey>> {
        let mut local = HashMap::with_capacity(expanded.nested.len());
        for (local_name, tree) in &expanded.nested {
            let short = normalize_name(local_name);
            let print = fingerprint(tree);
            let key = ShapeKey::Structural {
                name: short.clone(),
                fingerprint: print.clone(),
            };
            let qualified = nested_fallbacks(decl.qualified(), &short);
            self.name_for(&short, &qualified, &key, &print)?;
            local.insert(local_name.clone(), key);
        }
        Ok(local)
    }

    fn name_for(
        &mut self,
        short: &str,
        qualified: &[String],
        key: &ShapeKey,
        print: &str,
    ) -> SchemaResult<String> {
        if let Some(name) = self.keys.get(key) {
            return Ok(name.clone());
        }

        // Distinct types never share a name, even when their trees agree.
        let structural = matches!(key, ShapeKey::Structural { .. });
        let same_shape = self
            .names
            .iter()
            .find(|(_, entry)| {
                entry.short == short && entry.fingerprint == print && (structural || !entry.owned)
            })
            .map(|(name, _)| name.clone());
        if let Some(name) = same_shape {
            if let Some(entry) = self.names.get_mut(&name) {
                if !structural {
                    entry.owned = true;
                    let mut fallbacks = qualified.to_vec();
                    fallbacks.retain(|candidate| !entry.qualified.contains(candidate));
                    fallbacks.append(&mut entry.qualified);
                    entry.qualified = fallbacks;
                }
            }
            self.keys.insert(key.clone(), name.clone());
            return Ok(name);
        }

        if !self.conflicting.contains(short) && !self.names.contains_key(short) {
            self.insert(short.to_string(), short, qualified, key, print);
            return Ok(short.to_string());
        }

        if qualified.is_empty() {
            return Err(SchemaError::ambiguous(
                short,
                "the declaration has no qualified path to disambiguate it",
            ));
        }
        if let Some(existing) = self.names.get(short) {
            if existing.qualified.is_empty() {
                return Err(SchemaError::ambiguous(
                    short,
                    "the registered declaration has no qualified path to disambiguate it",
                ));
            }
            self.promote(short)?;
        }
        self.conflicting.insert(short.to_string());

        let Some(name) = qualified
            .iter()
            .find(|candidate| !self.names.contains_key(candidate.as_str()))
            .cloned()
        else {
            return Err(SchemaError::ambiguous(
                qualified.first().map_or(short, String::as_str),
                "the qualified name already denotes a different declaration",
            ));
        };
        self.insert(name.clone(), short, qualified, key, print);
        Ok(name)
    }

    fn insert(
        &mut self,
        name: String,
        short: &str,
        qualified: &[String],
        key: &ShapeKey,
        print: &str,
    ) {
        debug!(shape = %name, "registered shape");
        self.keys.insert(key.clone(), name.clone());
        self.names.insert(
            name,
            NameEntry {
                short: short.to_string(),
                qualified: qualified.to_vec(),
                fingerprint: print.to_string(),
                owned: !matches!(key, ShapeKey::Structural { .. }),
            },
        );
    }

    fn promote(&mut self, short: &str) -> SchemaResult<()> {
        let Some(entry) = self.names.get(short) else {
            return Ok(());
        };
        let Some(qualified) = entry
            .qualified
            .iter()
            .find(|candidate| !self.names.contains_key(candidate.as_str()))
            .cloned()
        else {
            return Err(SchemaError::ambiguous(
                entry.qualified.first().map_or(short, String::as_str),
                "the qualified name already denotes a different declaration",
            ));
        };
        let Some(entry) = self.names.shift_remove(short) else {
            return Ok(());
        };
        self.names.insert(qualified.clone(), entry);
        for name in self.keys.values_mut() {
            if name == short {
                *name = qualified.clone();
            }
        }
        debug!(shape = short, promoted = %qualified, "promoted colliding shape name");
        Ok(())
    }

    fn current_name(&self, key: &ShapeKey, short: &str) -> SchemaResult<String> {
        self.keys
            .get(key)
            .cloned()
            .ok_or_else(|| SchemaError::ambiguous(short, "the declaration lost its name"))
    }

    fn resolve_refs(&self, tree: &mut Value, local: &HashMap<String, ShapeKey>, root: &str) {
        rewrite_refs(tree, &mut |reference| {
            if reference == "#" {
                return Some(format!("{DEFINITIONS_PREFIX}{root}"));
            }
            if !reference.starts_with('#') {
                return None;
            }
            let name = ref_name(reference)?;
            let canonical = local.get(name).and_then(|key| self.keys.get(key))?;
            Some(format!("{DEFINITIONS_PREFIX}{canonical}"))
        });
    }
}

/// Fallback names for a shape nested under the declaration `root`.
fn nested_fallbacks(root: Option<&str>, short: &str) -> Vec<String> {
    let Some(root) = root else {
        return Vec::new();
    };
    let mut fallbacks = Vec::with_capacity(2);
    if let Some((module, _)) = root.rsplit_once("__") {
        fallbacks.push(format!("{module}__{short}"));
    }
    fallbacks.push(format!("{root}__{short}"));
    fallbacks
}

fn ensure_title(tree: &mut Value, title: &str) {
    if let Value::Object(object) = tree {
        object
            .entry("title")
            .or_insert_with(|| Value::String(title.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use schemars::JsonSchema;
    use serde_json::json;

    #[allow(dead_code)]
    mod store {
        use schemars::JsonSchema;

        #[derive(JsonSchema)]
        pub struct Item {
            pub sku: String,
        }
    }

    #[allow(dead_code)]
    mod legacy {
        use schemars::JsonSchema;

        #[derive(JsonSchema)]
        pub struct Item {
            pub code: i32,
        }

        #[derive(JsonSchema)]
        pub struct Holder {
            pub item: Item,
        }

        #[derive(JsonSchema)]
        pub struct Other {
            pub code: i32,
        }

        #[derive(JsonSchema)]
        pub struct Owner {
            pub other: deep::Other,
        }

        pub mod deep {
            use schemars::JsonSchema;

            #[derive(JsonSchema)]
            pub struct Other {
                pub label: String,
            }
        }
    }

    #[allow(dead_code)]
    mod mirror {
        use schemars::JsonSchema;

        #[derive(JsonSchema)]
        pub struct Item {
            pub sku: String,
        }
    }

    #[allow(dead_code)]
    #[derive(JsonSchema)]
    struct Tag {
        name: String,
    }

    #[allow(dead_code)]
    #[derive(JsonSchema)]
    struct Pet {
        id: i64,
        age: Option<i32>,
        owner: Option<Tag>,
        tags: Vec<Tag>,
    }

    #[test]
    fn test_name_is_stable() {
        let mut registry = ShapeRegistry::new();
        let decl = ShapeDecl::of::<Tag>();
        assert_eq!(registry.register_and_name(&decl).unwrap(), "Tag");
        assert_eq!(registry.register_and_name(&decl).unwrap(), "Tag");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_colliding_names_are_promoted() {
        let mut registry = ShapeRegistry::new();
        let first = ShapeDecl::of::<store::Item>();
        let second = ShapeDecl::of::<legacy::Item>();

        assert_eq!(registry.register_and_name(&first).unwrap(), "Item");
        let second_name = registry.register_and_name(&second).unwrap();
        let first_name = registry.register_and_name(&first).unwrap();

        assert!(first_name.ends_with("store__Item"));
        assert!(second_name.ends_with("legacy__Item"));
        assert_ne!(first_name, second_name);
        assert!(!registry.contains_name("Item"));
        assert_eq!(registry.name_of(&first), Some(first_name.as_str()));
    }

    #[test]
    fn test_identical_types_are_still_promoted() {
        let mut registry = ShapeRegistry::new();
        let first = ShapeDecl::of::<store::Item>();
        let second = ShapeDecl::of::<mirror::Item>();

        registry.register_and_name(&first).unwrap();
        let second_name = registry.register_and_name(&second).unwrap();
        let first_name = registry.register_and_name(&first).unwrap();

        assert_ne!(first_name, second_name);
        assert!(first_name.ends_with("store__Item"));
        assert!(second_name.ends_with("mirror__Item"));
        assert!(!registry.contains_name("Item"));
    }

    #[test]
    fn test_nested_collision_uses_module_path() {
        let mut registry = ShapeRegistry::new();
        registry
            .register_and_name(&ShapeDecl::of::<store::Item>())
            .unwrap();
        let shape = registry
            .generate_shape(&ShapeDecl::of::<legacy::Holder>())
            .unwrap();

        let nested = shape.definitions.keys().next().unwrap().clone();
        assert!(nested.ends_with("tests__legacy__Item"));
        assert_eq!(
            shape.schema["properties"]["item"]["$ref"],
            json!(format!("#/definitions/{nested}"))
        );
        let store_name = registry.name_of(&ShapeDecl::of::<store::Item>()).unwrap();
        assert!(store_name.ends_with("tests__store__Item"));
    }

    #[test]
    fn test_nested_collision_falls_back_to_owner_path() {
        let mut registry = ShapeRegistry::new();
        let other = ShapeDecl::of::<legacy::Other>();
        assert_eq!(registry.register_and_name(&other).unwrap(), "Other");

        let shape = registry
            .generate_shape(&ShapeDecl::of::<legacy::Owner>())
            .unwrap();

        let other_name = registry.name_of(&other).unwrap().to_string();
        assert!(other_name.ends_with("tests__legacy__Other"));
        let nested = shape.definitions.keys().next().unwrap().clone();
        assert!(nested.ends_with("tests__legacy__Owner__Other"));
        assert_eq!(shape.definitions[&nested]["properties"]["label"]["type"], "string");
        assert_eq!(
            shape.schema["properties"]["other"]["$ref"],
            json!(format!("#/definitions/{nested}"))
        );
    }

    #[test]
    fn test_nested_shape_adopted_by_its_type() {
        let mut registry = ShapeRegistry::new();
        registry.generate_shape(&ShapeDecl::of::<Pet>()).unwrap();
        assert_eq!(
            registry.register_and_name(&ShapeDecl::of::<Tag>()).unwrap(),
            "Tag"
        );
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_anonymous_collision_is_ambiguous() {
        let mut registry = ShapeRegistry::new();
        let a = ShapeDecl::anonymous(
            "Dynamic",
            json!({"type": "object", "properties": {"a": {"type": "string"}}}),
        );
        let b = ShapeDecl::anonymous(
            "Dynamic",
            json!({"type": "object", "properties": {"b": {"type": "string"}}}),
        );

        registry.register_and_name(&a).unwrap();
        let err = registry.register_and_name(&b).unwrap_err();
        assert!(matches!(err, SchemaError::AmbiguousName { ref name, .. } if name == "Dynamic"));
    }

    #[test]
    fn test_identical_anonymous_shapes_share_a_name() {
        let mut registry = ShapeRegistry::new();
        let schema = json!({"type": "object", "properties": {"a": {"type": "string"}}});
        let a = ShapeDecl::anonymous("Dynamic", schema.clone());
        let b = ShapeDecl::anonymous("Dynamic", schema);
        assert_eq!(registry.register_and_name(&a).unwrap(), "Dynamic");
        assert_eq!(registry.register_and_name(&b).unwrap(), "Dynamic");
    }

    #[test]
    fn test_typed_collision_with_anonymous_is_ambiguous() {
        let mut registry = ShapeRegistry::new();
        let anonymous = ShapeDecl::anonymous("Item", json!({"type": "object"}));
        registry.register_and_name(&anonymous).unwrap();

        let err = registry
            .register_and_name(&ShapeDecl::of::<store::Item>())
            .unwrap_err();
        assert!(err.to_string().contains("registered declaration"));
    }

    #[test]
    fn test_generate_shape_flattens_nested() {
        let mut registry = ShapeRegistry::new();
        let shape = registry.generate_shape(&ShapeDecl::of::<Pet>()).unwrap();

        assert_eq!(shape.name, "Pet");
        assert_eq!(shape.schema["title"], "Pet");
        assert!(shape.schema.get("definitions").is_none());
        assert!(shape.schema.get("$schema").is_none());
        assert_eq!(
            shape.schema["properties"]["tags"]["items"]["$ref"],
            "#/definitions/Tag"
        );
        assert_eq!(shape.definitions["Tag"]["title"], "Tag");
        assert_eq!(shape.definitions["Tag"]["type"], "object");
        assert!(registry.contains_name("Tag"));
    }

    #[test]
    fn test_generate_shape_collapses_nullable() {
        let mut registry = ShapeRegistry::new();
        let shape = registry.generate_shape(&ShapeDecl::of::<Pet>()).unwrap();

        let age = &shape.schema["properties"]["age"];
        assert_eq!(age["type"], "integer");
        assert_eq!(age["nullable"], true);

        let owner = &shape.schema["properties"]["owner"];
        assert_eq!(owner["$ref"], "#/definitions/Tag");
        assert!(owner.get("anyOf").is_none());
    }

    #[test]
    fn test_nullable_collapse_can_be_disabled() {
        let mut registry = ShapeRegistry::with_settings(RegistrySettings {
            collapse_nullable: false,
        });
        let shape = registry.generate_shape(&ShapeDecl::of::<Pet>()).unwrap();
        assert!(shape.schema["properties"]["owner"].get("anyOf").is_some());
    }

    #[test]
    fn test_bulk_register_dedups_shapes() {
        let mut registry = ShapeRegistry::new();
        let decls = [
            ShapeDecl::of::<Pet>(),
            ShapeDecl::of::<Tag>(),
            ShapeDecl::of::<Pet>(),
        ];
        let shapes = registry.bulk_register(&decls).unwrap();

        assert_eq!(shapes.names.len(), 2);
        assert_eq!(shapes.name_of(&decls[0]), Some("Pet"));
        assert_eq!(shapes.name_of(&decls[1]), Some("Tag"));
        let names: Vec<&String> = shapes.definitions.keys().collect();
        assert_eq!(names, ["Pet", "Tag"]);
    }

    #[test]
    fn test_bulk_register_rewrites_promoted_references() {
        let mut registry = ShapeRegistry::new();
        let decls = [
            ShapeDecl::of::<store::Item>(),
            ShapeDecl::of::<legacy::Holder>(),
            ShapeDecl::of::<legacy::Item>(),
        ];
        let shapes = registry.bulk_register(&decls).unwrap();

        let legacy_name = shapes.name_of(&decls[2]).unwrap().to_string();
        assert!(legacy_name.ends_with("legacy__Item"));
        assert_eq!(
            shapes.definitions["Holder"]["properties"]["item"]["$ref"],
            json!(format!("#/definitions/{legacy_name}"))
        );
        assert!(!shapes.definitions.contains_key("Item"));
    }

    #[test]
    fn test_raw_schema_must_be_an_object() {
        let mut registry = ShapeRegistry::new();
        let err = registry
            .generate_shape(&ShapeDecl::anonymous("Flag", json!(true)))
            .unwrap_err();
        assert!(matches!(err, SchemaError::InvalidSchema { .. }));
    }

    #[test]
    fn test_names_survive_unused_shapes() {
        let mut registry = ShapeRegistry::new();
        registry.register_and_name(&ShapeDecl::of::<Tag>()).unwrap();
        registry.bulk_register(&[ShapeDecl::of::<Pet>()]).unwrap();
        assert!(registry.contains_name("Tag"));
        assert!(!registry.is_empty());
    }

    #[test]
    fn test_json_schema_derive_is_used() {
        assert_eq!(<Tag as JsonSchema>::schema_name(), "Tag");
    }
}
