//! Error types for the `hoard-types` crate.

use crate::key::KeyType;

/// Errors that can occur while registering or resolving resource names.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RegistryError {
    /// No resource with this name is registered in the channel.
    #[error("unknown {kind} resource: {name}")]
    UnknownResource {
        /// The channel that was searched.
        kind: KeyType,
        /// The requested name.
        name: String,
    },

    /// An item was registered twice with different durability.
    #[error("item {name} already registered with max damage {registered}, got {requested}")]
    ConflictingMaxDamage {
        /// The item name.
        name: String,
        /// Max damage from the first registration.
        registered: u32,
        /// Max damage from the rejected registration.
        requested: u32,
    },

    /// The channel ran out of 32-bit resource ids.
    #[error("resource id space exhausted for {0} channel")]
    Exhausted(KeyType),
}
