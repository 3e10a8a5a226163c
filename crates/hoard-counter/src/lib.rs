//! Two-tier counting index over resource keys.
//!
//! Every stored key is grouped by its primary key. Each primary key owns one
//! ledger holding a signed amount per exact variant; ledgers of damageable
//! resources keep their variants ordered by damage so that fuzzy searches
//! can extract one damage bucket as a contiguous range.
//!
//! # Architecture
//!
//! - [`counter`] -- The [`KeyCounter`]: routes keys to per-primary ledgers.
//! - [`ledger`] -- The [`VariantCounter`]: one ledger, unordered or fuzzy.
//! - [`fuzzy`] -- [`FuzzyBucket`] arithmetic and the ordered-map key.
//!
//! # Invariants
//!
//! - Every key in a ledger has the primary key the ledger is filed under.
//! - A ledger's shape never changes after it is created.
//! - With drop-zero mode on, no entry at amount 0 survives a mutation.
//! - Merged counters never share storage.
//!
//! # Usage
//!
//! ```
//! use hoard_counter::KeyCounter;
//! use hoard_types::{AnyKey, FuzzyMode, ItemKey, ResourceId};
//!
//! let mut counter: KeyCounter = KeyCounter::new();
//! let sword = |damage| AnyKey::from(ItemKey::damageable(ResourceId(1), 100).with_damage(damage));
//!
//! counter.add(&sword(10), 1);
//! counter.add(&sword(90), 1);
//!
//! // Damage 15 falls in the lower half, together with damage 10.
//! let matches: Vec<_> = counter.find_fuzzy(&sword(15), FuzzyMode::Percent50).collect();
//! assert_eq!(matches.len(), 1);
//! assert_eq!(counter.find_fuzzy(&sword(15), FuzzyMode::IgnoreAll).count(), 2);
//! ```

pub mod counter;
pub mod fuzzy;
pub mod ledger;

// Re-export primary types at crate root.
pub use counter::KeyCounter;
pub use fuzzy::FuzzyBucket;
pub use ledger::{LedgerShape, VariantCounter};
