//! Name interning for resources.
//!
//! The registry turns resource names (`"iron_sword"`, `"water"`) into compact
//! [`ResourceId`] handles, one id space per [`KeyType`]. Items also record
//! their max damage so that every key built through the registry agrees on
//! fuzzy eligibility for its primary key.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use tracing::trace;

use crate::error::RegistryError;
use crate::fluid::FluidKey;
use crate::item::ItemKey;
use crate::key::{KeyType, PrimaryKey, ResourceId};

/// Interned names of one channel.
#[derive(Debug, Default, Clone)]
struct Channel {
    ids: FxHashMap<Arc<str>, ResourceId>,
    names: Vec<Arc<str>>,
    max_damage: Vec<u32>,
}

impl Channel {
    fn lookup(&self, kind: KeyType, name: &str) -> Result<ResourceId, RegistryError> {
        self.ids
            .get(name)
            .copied()
            .ok_or_else(|| RegistryError::UnknownResource {
                kind,
                name: name.to_owned(),
            })
    }

    fn intern(
        &mut self,
        kind: KeyType,
        name: &str,
        max_damage: u32,
    ) -> Result<ResourceId, RegistryError> {
        let raw = u32::try_from(self.names.len())
            .ok()
            .ok_or(RegistryError::Exhausted(kind))?;
        let id = ResourceId(raw);
        let name: Arc<str> = Arc::from(name);
        self.names.push(Arc::clone(&name));
        self.max_damage.push(max_damage);
        self.ids.insert(name, id);
        trace!(%kind, id = raw, "resource registered");
        Ok(id)
    }

    fn max_damage(&self, id: ResourceId) -> u32 {
        usize::try_from(id.into_inner())
            .ok()
            .and_then(|index| self.max_damage.get(index))
            .copied()
            .unwrap_or(0)
    }

    fn name(&self, id: ResourceId) -> Option<&str> {
        usize::try_from(id.into_inner())
            .ok()
            .and_then(|index| self.names.get(index))
            .map(|name| &**name)
    }
}

/// Maps resource names to interned ids, per channel.
#[derive(Debug, Default, Clone)]
pub struct ResourceRegistry {
    items: Channel,
    fluids: Channel,
}

impl ResourceRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an item, returning its id.
    ///
    /// Registering the same name again with the same `max_damage` returns
    /// the existing id.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::ConflictingMaxDamage`] if the name is already
    /// registered with a different max damage, or
    /// [`RegistryError::Exhausted`] if no ids are left.
    pub fn register_item(
        &mut self,
        name: &str,
        max_damage: u32,
    ) -> Result<ResourceId, RegistryError> {
        if let Some(&id) = self.items.ids.get(name) {
            let registered = self.items.max_damage(id);
            if registered != max_damage {
                return Err(RegistryError::ConflictingMaxDamage {
                    name: name.to_owned(),
                    registered,
                    requested: max_damage,
                });
            }
            return Ok(id);
        }
        self.items.intern(KeyType::Item, name, max_damage)
    }

    /// Register a fluid, returning its id. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Exhausted`] if no ids are left.
    pub fn register_fluid(&mut self, name: &str) -> Result<ResourceId, RegistryError> {
        if let Some(&id) = self.fluids.ids.get(name) {
            return Ok(id);
        }
        self.fluids.intern(KeyType::Fluid, name, 0)
    }

    /// Build the pristine key for a registered item.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownResource`] if the item is unknown.
    pub fn item_key(&self, name: &str) -> Result<ItemKey, RegistryError> {
        let id = self.items.lookup(KeyType::Item, name)?;
        let max_damage = self.items.max_damage(id);
        if max_damage > 0 {
            Ok(ItemKey::damageable(id, max_damage))
        } else {
            Ok(ItemKey::of(id))
        }
    }

    /// Build the key for a registered fluid.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownResource`] if the fluid is unknown.
    pub fn fluid_key(&self, name: &str) -> Result<FluidKey, RegistryError> {
        self.fluids
            .lookup(KeyType::Fluid, name)
            .map(FluidKey::of)
    }

    /// Resolve a primary key back to the registered name.
    pub fn name_of(&self, primary: PrimaryKey) -> Option<&str> {
        match primary.kind {
            KeyType::Item => self.items.name(primary.id),
            KeyType::Fluid => self.fluids.name(primary.id),
        }
    }

    /// Total number of registered resources across all channels.
    pub fn len(&self) -> usize {
        self.items.names.len().saturating_add(self.fluids.names.len())
    }

    /// Whether nothing has been registered yet.
    pub fn is_empty(&self) -> bool {
        self.items.names.is_empty() && self.fluids.names.is_empty()
    }
}
