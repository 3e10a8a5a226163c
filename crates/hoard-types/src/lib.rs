//! Resource keys and stacks for the Hoard storage index.
//!
//! This crate defines the key abstraction the counting index is generic
//! over, plus the concrete keys used by the rest of the workspace.
//!
//! # Modules
//!
//! - [`key`] -- The [`StackKey`] trait, [`PrimaryKey`] handles, and [`KeyType`] tags
//! - [`item`] -- [`ItemKey`], optionally damageable
//! - [`fluid`] -- [`FluidKey`]
//! - [`stack`] -- [`AnyKey`] and [`GenericStack`]
//! - [`fuzzy`] -- [`FuzzyMode`] bucket granularities
//! - [`registry`] -- [`ResourceRegistry`] name interning
//! - [`error`] -- [`RegistryError`]

pub mod error;
pub mod fluid;
pub mod fuzzy;
pub mod item;
pub mod key;
pub mod registry;
pub mod stack;

// Re-export all public types at crate root for convenience.
pub use error::RegistryError;
pub use fluid::FluidKey;
pub use fuzzy::FuzzyMode;
pub use item::ItemKey;
pub use key::{KeyType, PrimaryKey, ResourceId, StackKey};
pub use registry::ResourceRegistry;
pub use stack::{AnyKey, GenericStack};
