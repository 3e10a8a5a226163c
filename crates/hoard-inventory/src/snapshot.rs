//! Persisted form of an inventory.

use hoard_types::GenericStack;
use serde::{Deserialize, Serialize};

/// The raw slot contents of an inventory.
///
/// A snapshot is not filtered by channel: it may hold stacks that the
/// inventory it is restored into does not support.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventorySnapshot {
    /// One entry per slot; `None` for empty slots.
    pub slots: Vec<Option<GenericStack>>,
}

impl InventorySnapshot {
    /// A snapshot of `size` empty slots.
    pub fn empty(size: usize) -> Self {
        Self {
            slots: vec![None; size],
        }
    }

    /// Store `stack` in `slot`, growing the snapshot as needed.
    pub fn set(&mut self, slot: usize, stack: Option<GenericStack>) {
        if slot >= self.slots.len() {
            self.slots.resize(slot.saturating_add(1), None);
        }
        if let Some(entry) = self.slots.get_mut(slot) {
            *entry = stack;
        }
    }
}

#[cfg(test)]
mod tests {
    use hoard_types::{FluidKey, ItemKey, ResourceId};

    use super::*;

    #[test]
    fn set_grows_the_snapshot() {
        let mut snapshot = InventorySnapshot::default();
        snapshot.set(2, Some(GenericStack::new(ItemKey::of(ResourceId(0)), 1)));
        assert_eq!(snapshot.slots.len(), 3);
        assert!(snapshot.slots.first().is_some_and(Option::is_none));
    }

    #[test]
    fn serializes_mixed_channels() {
        let mut snapshot = InventorySnapshot::empty(2);
        snapshot.set(0, Some(GenericStack::new(ItemKey::of(ResourceId(3)), 1)));
        snapshot.set(1, Some(GenericStack::new(FluidKey::of(ResourceId(0)), 1000)));

        let json = serde_json::to_string(&snapshot).ok();
        let back: Option<InventorySnapshot> = json.and_then(|j| serde_json::from_str(&j).ok());
        assert_eq!(back, Some(snapshot));
    }
}
