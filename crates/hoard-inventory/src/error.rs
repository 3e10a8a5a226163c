//! Error types for the `hoard-inventory` crate.

use hoard_types::KeyType;

/// Errors returned when writing to a [`ConfigInventory`](crate::ConfigInventory).
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum InventoryError {
    /// The slot index is past the end of the inventory.
    #[error("slot {slot} out of range for inventory of {size} slots")]
    SlotOutOfRange {
        /// The requested slot.
        slot: usize,
        /// Number of slots in the inventory.
        size: usize,
    },

    /// The stack's key belongs to a channel the inventory does not accept.
    #[error("slot {slot} does not accept {kind} stacks")]
    UnsupportedType {
        /// The requested slot.
        slot: usize,
        /// Channel of the rejected key.
        kind: KeyType,
    },
}
