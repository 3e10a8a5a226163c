//! Item keys.
//!
//! An item key is a resource id plus the variant data that makes two stacks
//! of the same item non-interchangeable: wear (`damage`) and an opaque
//! component string (enchantments, names, ...). Items with a non-zero
//! `max_damage` are damageable and take part in fuzzy search, ordered by
//! damage.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::key::{KeyType, PrimaryKey, ResourceId, StackKey};

/// One exact item variant.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ItemKey {
    id: ResourceId,
    damage: u32,
    max_damage: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    components: Option<Arc<str>>,
}

impl ItemKey {
    /// An undamageable item with no components.
    pub const fn of(id: ResourceId) -> Self {
        Self {
            id,
            damage: 0,
            max_damage: 0,
            components: None,
        }
    }

    /// A pristine damageable item that wears out after `max_damage` uses.
    pub const fn damageable(id: ResourceId, max_damage: u32) -> Self {
        Self {
            id,
            damage: 0,
            max_damage,
            components: None,
        }
    }

    /// Return a copy of this key with the given damage, clamped to
    /// `max_damage`.
    #[must_use]
    pub fn with_damage(mut self, damage: u32) -> Self {
        self.damage = damage.min(self.max_damage);
        self
    }

    /// Return a copy of this key carrying the given component string.
    #[must_use]
    pub fn with_components(mut self, components: &str) -> Self {
        self.components = Some(Arc::from(components));
        self
    }

    /// The interned item id.
    pub const fn id(&self) -> ResourceId {
        self.id
    }

    /// Current wear of this variant.
    pub const fn damage(&self) -> u32 {
        self.damage
    }

    /// Wear at which the item breaks; 0 for undamageable items.
    pub const fn max_damage(&self) -> u32 {
        self.max_damage
    }

    /// Whether this item has a durability dimension.
    pub const fn is_damageable(&self) -> bool {
        self.max_damage > 0
    }

    /// The opaque component string, if any.
    pub fn components(&self) -> Option<&str> {
        self.components.as_deref()
    }
}

impl StackKey for ItemKey {
    fn primary_key(&self) -> PrimaryKey {
        PrimaryKey::new(KeyType::Item, self.id)
    }

    fn key_type(&self) -> KeyType {
        KeyType::Item
    }

    fn fuzzy_search_max_value(&self) -> u64 {
        u64::from(self.max_damage)
    }

    fn fuzzy_search_value(&self) -> u64 {
        u64::from(self.damage)
    }
}
