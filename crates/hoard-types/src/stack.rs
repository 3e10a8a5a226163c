//! Heterogeneous keys and amount-carrying stacks.

use serde::{Deserialize, Serialize};

use crate::fluid::FluidKey;
use crate::item::ItemKey;
use crate::key::{KeyType, PrimaryKey, StackKey};

/// A key of any supported channel.
///
/// This is the default key type of the storage index, so one counter can
/// tally items and fluids side by side.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnyKey {
    /// An item variant.
    Item(ItemKey),
    /// A fluid variant.
    Fluid(FluidKey),
}

impl AnyKey {
    /// Return the item key, if this is an item.
    pub const fn as_item(&self) -> Option<&ItemKey> {
        match self {
            Self::Item(item) => Some(item),
            Self::Fluid(_) => None,
        }
    }

    /// Return the fluid key, if this is a fluid.
    pub const fn as_fluid(&self) -> Option<&FluidKey> {
        match self {
            Self::Fluid(fluid) => Some(fluid),
            Self::Item(_) => None,
        }
    }
}

impl StackKey for AnyKey {
    fn primary_key(&self) -> PrimaryKey {
        match self {
            Self::Item(item) => item.primary_key(),
            Self::Fluid(fluid) => fluid.primary_key(),
        }
    }

    fn key_type(&self) -> KeyType {
        match self {
            Self::Item(_) => KeyType::Item,
            Self::Fluid(_) => KeyType::Fluid,
        }
    }

    fn fuzzy_search_max_value(&self) -> u64 {
        match self {
            Self::Item(item) => item.fuzzy_search_max_value(),
            Self::Fluid(fluid) => fluid.fuzzy_search_max_value(),
        }
    }

    fn fuzzy_search_value(&self) -> u64 {
        match self {
            Self::Item(item) => item.fuzzy_search_value(),
            Self::Fluid(fluid) => fluid.fuzzy_search_value(),
        }
    }
}

impl From<ItemKey> for AnyKey {
    fn from(key: ItemKey) -> Self {
        Self::Item(key)
    }
}

impl From<FluidKey> for AnyKey {
    fn from(key: FluidKey) -> Self {
        Self::Fluid(key)
    }
}

/// A key paired with a signed amount.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GenericStack {
    /// What is stacked.
    pub what: AnyKey,
    /// How much of it. May be zero or negative in configuration contexts.
    pub amount: i64,
}

impl GenericStack {
    /// Build a stack from anything convertible into an [`AnyKey`].
    pub fn new(what: impl Into<AnyKey>, amount: i64) -> Self {
        Self {
            what: what.into(),
            amount,
        }
    }

    /// The channel of the stacked key.
    pub fn key_type(&self) -> KeyType {
        self.what.key_type()
    }
}
