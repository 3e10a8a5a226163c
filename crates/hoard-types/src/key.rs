//! The key abstraction shared by every resource kind.
//!
//! A key identifies one exact resource variant (one item with one specific
//! damage value and component set, one fluid, ...). Keys are grouped by their
//! [`PrimaryKey`]: every variant of the same base resource shares one primary
//! key, and the storage index keeps one ledger per primary key.
//!
//! Primary keys are plain value handles. They hash and compare by value, so
//! the index never relies on object identity to group variants.

use core::fmt::Debug;
use core::hash::Hash;

use serde::{Deserialize, Serialize};

/// The kind (channel) of a resource key.
///
/// This is the runtime type tag used to filter keys of a heterogeneous
/// index, e.g. "give me the first item in this counter".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyType {
    /// Solid items. Damageable items support fuzzy search.
    Item,
    /// Fluids. Never fuzzy-searchable.
    Fluid,
}

impl core::fmt::Display for KeyType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Item => f.write_str("item"),
            Self::Fluid => f.write_str("fluid"),
        }
    }
}

/// Interned handle for a registered resource name.
///
/// Handles are assigned densely per [`KeyType`] by the
/// [`ResourceRegistry`](crate::ResourceRegistry), so an item and a fluid may
/// share the same numeric id. Only the pair inside a [`PrimaryKey`] is
/// globally unique.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceId(pub u32);

impl ResourceId {
    /// Return the raw numeric id.
    pub const fn into_inner(self) -> u32 {
        self.0
    }
}

impl core::fmt::Display for ResourceId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The coarse grouping token of a key.
///
/// All variants of the same base resource (e.g. every damage level of the
/// same sword) share one primary key. The channel is part of the key, so the
/// item `#0` and the fluid `#0` never share a ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PrimaryKey {
    /// The channel of the resource.
    pub kind: KeyType,
    /// The interned resource id within that channel.
    pub id: ResourceId,
}

impl PrimaryKey {
    /// Build a primary key from its parts.
    pub const fn new(kind: KeyType, id: ResourceId) -> Self {
        Self { kind, id }
    }
}

impl core::fmt::Display for PrimaryKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}{}", self.kind, self.id)
    }
}

/// A value-comparable token for one exact resource variant.
///
/// Two keys are the same variant iff they compare equal. Implementors must
/// keep [`primary_key`](StackKey::primary_key) and
/// [`fuzzy_search_max_value`](StackKey::fuzzy_search_max_value) consistent
/// across all keys sharing a primary key: the index picks a ledger shape once,
/// from the first key it sees for a primary key.
///
/// Within one primary key, fuzzy-searchable keys are ordered by
/// `(fuzzy_search_value, Ord)`. The key's own [`Ord`] only breaks ties.
pub trait StackKey: Clone + Eq + Hash + Ord + Debug {
    /// The grouping token shared by all variants of this resource.
    fn primary_key(&self) -> PrimaryKey;

    /// The channel of this key.
    fn key_type(&self) -> KeyType {
        self.primary_key().kind
    }

    /// Upper bound of the fuzzy ordering attribute, or 0 if this resource
    /// does not take part in fuzzy search.
    fn fuzzy_search_max_value(&self) -> u64 {
        0
    }

    /// The fuzzy ordering attribute of this variant (e.g. damage).
    ///
    /// Only meaningful when [`fuzzy_search_max_value`](StackKey::fuzzy_search_max_value)
    /// is non-zero.
    fn fuzzy_search_value(&self) -> u64 {
        0
    }

    /// Whether this key's primary key is stored in an ordered ledger.
    fn supports_fuzzy_search(&self) -> bool {
        self.fuzzy_search_max_value() > 0
    }
}
