//! Configuration inventories for the Hoard storage index.
//!
//! A [`ConfigInventory`] is a fixed row of slots describing what a device is
//! configured to handle. It filters by channel, normalizes amounts for its
//! [`InventoryMode`], and can be persisted as an [`InventorySnapshot`].
//!
//! - [`config_inventory`] -- The inventory, its builder, and its mode.
//! - [`snapshot`] -- The raw persisted slot contents.
//! - [`error`] -- [`InventoryError`].

pub mod config_inventory;
pub mod error;
pub mod snapshot;

pub use config_inventory::{ConfigInventory, ConfigInventoryBuilder, InventoryMode};
pub use error::InventoryError;
pub use snapshot::InventorySnapshot;
