//! Document-level tag registration.

use indexmap::IndexMap;

use crate::error::{DocsError, DocsResult};
use crate::openapi::Tag;

/// Tags declared on a document, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct TagRegistry {
    tags: IndexMap<String, Tag>,
}

impl TagRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a tag.
    ///
    /// Re-adding a tag with the same description is a no-op. Any other
    /// redeclaration conflicts, including one that adds or drops the
    /// description.
    pub fn add(&mut self, tag: &Tag) -> DocsResult<()> {
        match self.tags.get(&tag.name) {
            None => {
                self.tags.insert(tag.name.clone(), tag.clone());
                Ok(())
            }
            Some(existing) if existing.description == tag.description => Ok(()),
            Some(_) => Err(DocsError::TagConflict {
                name: tag.name.clone(),
            }),
        }
    }

    /// Whether a tag is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.tags.contains_key(name)
    }

    /// The registered tags, in declaration order.
    pub fn to_vec(&self) -> Vec<Tag> {
        self.tags.values().cloned().collect()
    }
}
