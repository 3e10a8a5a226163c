//! Fluid keys. Fluids have no durability, so they never use fuzzy search.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::key::{KeyType, PrimaryKey, ResourceId, StackKey};

/// One exact fluid variant.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FluidKey {
    id: ResourceId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    components: Option<Arc<str>>,
}

impl FluidKey {
    /// A fluid with no components.
    pub const fn of(id: ResourceId) -> Self {
        Self {
            id,
            components: None,
        }
    }

    /// Return a copy of this key carrying the given component string.
    #[must_use]
    pub fn with_components(mut self, components: &str) -> Self {
        self.components = Some(Arc::from(components));
        self
    }

    /// The interned fluid id.
    pub const fn id(&self) -> ResourceId {
        self.id
    }

    /// The opaque component string, if any.
    pub fn components(&self) -> Option<&str> {
        self.components.as_deref()
    }
}

impl StackKey for FluidKey {
    fn primary_key(&self) -> PrimaryKey {
        PrimaryKey::new(KeyType::Fluid, self.id)
    }

    fn key_type(&self) -> KeyType {
        KeyType::Fluid
    }
}
