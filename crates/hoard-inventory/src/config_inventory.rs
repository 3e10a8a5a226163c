//! Slot-based configuration inventory.
//!
//! A configuration inventory records which resources (and optionally how
//! much of each) a device is configured for. It is a fixed row of slots that
//! only accept keys of the supported channels, and it normalizes amounts
//! according to its [`InventoryMode`].
//!
//! Raw contents restored from a snapshot are not filtered; the getters hide
//! stacks of unsupported channels instead.

use hoard_counter::KeyCounter;
use hoard_types::{AnyKey, FuzzyMode, GenericStack, KeyType, StackKey};
use rustc_hash::FxHashSet;
use tracing::{debug, warn};

use crate::error::InventoryError;
use crate::snapshot::InventorySnapshot;

// ---------------------------------------------------------------------------
// Mode
// ---------------------------------------------------------------------------

/// How a configuration inventory normalizes stored amounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InventoryMode {
    /// Only the key matters; every stored amount is 0.
    Types,
    /// Key and amount matter. Amounts `<= 0` toggle the slot: they clear a
    /// slot already holding the same key and store amount 1 otherwise.
    Stacks,
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Builder for [`ConfigInventory`].
///
/// # Examples
///
/// ```
/// use hoard_inventory::ConfigInventory;
/// use hoard_types::KeyType;
///
/// let inv = ConfigInventory::config_stacks(2)
///     .supported_type(KeyType::Item)
///     .build();
/// assert_eq!(inv.size(), 2);
/// assert!(!inv.is_supported(KeyType::Fluid));
/// ```
#[derive(Debug)]
pub struct ConfigInventoryBuilder {
    mode: InventoryMode,
    size: usize,
    supported: FxHashSet<KeyType>,
}

impl ConfigInventoryBuilder {
    /// Accept keys of `kind`.
    #[must_use]
    pub fn supported_type(mut self, kind: KeyType) -> Self {
        self.supported.insert(kind);
        self
    }

    /// Accept keys of every listed channel.
    #[must_use]
    pub fn supported_types(mut self, kinds: impl IntoIterator<Item = KeyType>) -> Self {
        self.supported.extend(kinds);
        self
    }

    /// Build the inventory. With no supported type set, every channel is
    /// accepted.
    pub fn build(self) -> ConfigInventory {
        let supported = if self.supported.is_empty() {
            [KeyType::Item, KeyType::Fluid].into_iter().collect()
        } else {
            self.supported
        };
        ConfigInventory {
            mode: self.mode,
            supported,
            slots: vec![None; self.size],
        }
    }
}

// ---------------------------------------------------------------------------
// Inventory
// ---------------------------------------------------------------------------

/// A fixed row of configuration slots.
#[derive(Debug, Clone)]
pub struct ConfigInventory {
    mode: InventoryMode,
    supported: FxHashSet<KeyType>,
    slots: Vec<Option<GenericStack>>,
}

impl ConfigInventory {
    /// Start building an inventory in [`InventoryMode::Types`] mode.
    pub fn config_types(size: usize) -> ConfigInventoryBuilder {
        Self::builder(InventoryMode::Types, size)
    }

    /// Start building an inventory in [`InventoryMode::Stacks`] mode.
    pub fn config_stacks(size: usize) -> ConfigInventoryBuilder {
        Self::builder(InventoryMode::Stacks, size)
    }

    fn builder(mode: InventoryMode, size: usize) -> ConfigInventoryBuilder {
        ConfigInventoryBuilder {
            mode,
            size,
            supported: FxHashSet::default(),
        }
    }

    /// The normalization mode.
    pub const fn mode(&self) -> InventoryMode {
        self.mode
    }

    /// Number of slots.
    pub const fn size(&self) -> usize {
        self.slots.len()
    }

    /// Whether keys of `kind` may be stored.
    pub fn is_supported(&self, kind: KeyType) -> bool {
        self.supported.contains(&kind)
    }

    /// Write a stack into `slot`, normalizing its amount for the mode.
    ///
    /// `None` clears the slot.
    ///
    /// # Errors
    ///
    /// Returns [`InventoryError::SlotOutOfRange`] if `slot` does not exist,
    /// or [`InventoryError::UnsupportedType`] if the key's channel is not
    /// supported. The slot is unchanged on error.
    pub fn set_stack(
        &mut self,
        slot: usize,
        stack: Option<GenericStack>,
    ) -> Result<(), InventoryError> {
        let size = self.slots.len();
        let normalized = match stack {
            None => None,
            Some(stack) => {
                let kind = stack.key_type();
                if !self.is_supported(kind) {
                    warn!(slot, %kind, "rejected stack of unsupported type");
                    return Err(InventoryError::UnsupportedType { slot, kind });
                }
                let current = self.slots.get(slot).and_then(Option::as_ref);
                self.normalize(current, stack)
            }
        };

        let Some(entry) = self.slots.get_mut(slot) else {
            warn!(slot, size, "rejected write past the last slot");
            return Err(InventoryError::SlotOutOfRange { slot, size });
        };
        *entry = normalized;
        Ok(())
    }

    fn normalize(
        &self,
        current: Option<&GenericStack>,
        stack: GenericStack,
    ) -> Option<GenericStack> {
        match self.mode {
            InventoryMode::Types => Some(GenericStack { amount: 0, ..stack }),
            InventoryMode::Stacks if stack.amount > 0 => Some(stack),
            InventoryMode::Stacks => {
                if current.is_some_and(|current| current.what == stack.what) {
                    None
                } else {
                    Some(GenericStack { amount: 1, ..stack })
                }
            }
        }
    }

    /// The stack in `slot`, unless it is empty, missing, or of an
    /// unsupported channel.
    pub fn get_stack(&self, slot: usize) -> Option<&GenericStack> {
        self.slots
            .get(slot)
            .and_then(Option::as_ref)
            .filter(|stack| self.is_supported(stack.key_type()))
    }

    /// The key in `slot`, see [`get_stack`](Self::get_stack).
    pub fn get_key(&self, slot: usize) -> Option<&AnyKey> {
        self.get_stack(slot).map(|stack| &stack.what)
    }

    /// The amount in `slot`, or 0 if [`get_stack`](Self::get_stack) is `None`.
    pub fn get_amount(&self, slot: usize) -> i64 {
        self.get_stack(slot).map_or(0, |stack| stack.amount)
    }

    /// Empty every slot.
    pub fn clear(&mut self) {
        self.slots.fill(None);
    }

    /// Whether no slot holds a visible stack.
    pub fn is_empty(&self) -> bool {
        self.stacks().next().is_none()
    }

    /// Iterate over the visible stacks with their slot index.
    pub fn stacks(&self) -> impl Iterator<Item = (usize, &GenericStack)> {
        (0..self.slots.len()).filter_map(|slot| self.get_stack(slot).map(|stack| (slot, stack)))
    }

    /// Tally the visible stacks by key.
    pub fn available_stacks(&self) -> KeyCounter {
        self.stacks()
            .map(|(_, stack)| (stack.what.clone(), stack.amount))
            .collect()
    }

    /// Whether `key` is configured in some slot.
    ///
    /// With a fuzzy mode, any configured variant in the same fuzzy bucket
    /// counts.
    pub fn accepts(&self, key: &AnyKey, fuzzy: Option<FuzzyMode>) -> bool {
        if !self.is_supported(key.key_type()) {
            return false;
        }
        match fuzzy {
            None => self.stacks().any(|(_, stack)| &stack.what == key),
            Some(mode) => self.available_stacks().find_fuzzy(key, mode).next().is_some(),
        }
    }

    /// Capture the raw slot contents.
    pub fn snapshot(&self) -> InventorySnapshot {
        InventorySnapshot {
            slots: self.slots.clone(),
        }
    }

    /// Replace the slot contents with those of `snapshot`, without
    /// normalization or channel filtering.
    ///
    /// Slots past the end of the snapshot are cleared; snapshot entries past
    /// the end of the inventory are dropped.
    pub fn restore(&mut self, snapshot: &InventorySnapshot) {
        let size = self.slots.len();
        let mut loaded = snapshot.slots.iter().cloned();
        for slot in &mut self.slots {
            *slot = loaded.next().flatten();
        }
        let dropped = loaded.filter(Option::is_some).count();
        if dropped > 0 {
            warn!(size, dropped, "snapshot holds more slots than the inventory");
        }
        debug!(size, "restored inventory");
    }
}
