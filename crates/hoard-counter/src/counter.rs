//! The top-level key counter.
//!
//! [`KeyCounter`] routes every key to the [`VariantCounter`] of its primary
//! key, creating the ledger on first use. The ledger's shape is chosen once,
//! from the first key that creates it, and never changes afterwards.
//!
//! # Pruning
//!
//! - [`remove`](KeyCounter::remove) drops the owning ledger as soon as it
//!   becomes empty.
//! - [`remove_zeros`](KeyCounter::remove_zeros) and
//!   [`remove_empty_submaps`](KeyCounter::remove_empty_submaps) prune on
//!   request.
//! - Everything else leaves empty ledgers in place.
//!
//! # Merging
//!
//! [`add_all`](KeyCounter::add_all) and [`remove_all`](KeyCounter::remove_all)
//! clone ledgers the receiver does not have yet (inverted, for
//! `remove_all`), so the copy keeps the shape of the source ledger. Merged
//! counters never share storage.

use hoard_types::{AnyKey, FuzzyMode, KeyType, PrimaryKey, StackKey};
use indexmap::IndexMap;
use rustc_hash::{FxBuildHasher, FxHashSet};
use tracing::{debug, trace};

use crate::ledger::{self, LedgerShape, VariantCounter};

/// Tallies signed amounts per key, grouped into one ledger per primary key.
///
/// Not internally synchronized: callers serialize mutation.
#[derive(Debug, Clone)]
pub struct KeyCounter<K = AnyKey> {
    ledgers: IndexMap<PrimaryKey, VariantCounter<K>, FxBuildHasher>,
    drop_zeros: bool,
}

impl<K: StackKey> Default for KeyCounter<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: StackKey> KeyCounter<K> {
    /// Create an empty counter whose ledgers keep zero entries.
    pub fn new() -> Self {
        Self::with_drop_zeros(false)
    }

    /// Create an empty counter whose ledgers use the given drop-zero mode.
    pub fn with_drop_zeros(drop_zeros: bool) -> Self {
        Self {
            ledgers: IndexMap::default(),
            drop_zeros,
        }
    }

    /// Whether ledgers created by this counter prune zero entries.
    pub const fn drop_zeros(&self) -> bool {
        self.drop_zeros
    }

    /// Entries considered equivalent to `key` under `mode`.
    ///
    /// Only the ledger of `key`'s primary key is searched; if there is none
    /// the result is empty.
    pub fn find_fuzzy(&self, key: &K, mode: FuzzyMode) -> ledger::Iter<'_, K> {
        self.ledgers
            .get(&key.primary_key())
            .map_or_else(ledger::Iter::empty, |ledger| ledger.find_fuzzy(key, mode))
    }

    /// Remove zero entries from every ledger, then drop ledgers left empty.
    pub fn remove_zeros(&mut self) {
        let mut zeros = 0_usize;
        let before = self.ledgers.len();
        self.ledgers.retain(|_, ledger| {
            zeros = zeros.saturating_add(ledger.remove_zeros());
            !ledger.is_empty()
        });
        debug!(
            zeros,
            ledgers_dropped = before.saturating_sub(self.ledgers.len()),
            "removed zero entries"
        );
    }

    /// Drop every ledger that is currently empty, without touching entries.
    pub fn remove_empty_submaps(&mut self) {
        self.ledgers.retain(|_, ledger| !ledger.is_empty());
    }

    /// Add every amount of `other` into this counter.
    pub fn add_all(&mut self, other: &Self) {
        let drop_zeros = self.drop_zeros;
        let mut adopted = 0_usize;
        for (primary, theirs) in &other.ledgers {
            match self.ledgers.get_mut(primary) {
                Some(ours) => ours.add_all(theirs),
                None => {
                    self.ledgers
                        .insert(*primary, theirs.clone().with_drop_zeros(drop_zeros));
                    adopted = adopted.saturating_add(1);
                }
            }
        }
        debug!(merged = other.ledgers.len(), adopted, "added counter");
    }

    /// Subtract every amount of `other` from this counter.
    pub fn remove_all(&mut self, other: &Self) {
        let drop_zeros = self.drop_zeros;
        let mut adopted = 0_usize;
        for (primary, theirs) in &other.ledgers {
            match self.ledgers.get_mut(primary) {
                Some(ours) => ours.remove_all(theirs),
                None => {
                    let mut copied = theirs.clone().with_drop_zeros(drop_zeros);
                    copied.invert();
                    self.ledgers.insert(*primary, copied);
                    adopted = adopted.saturating_add(1);
                }
            }
        }
        debug!(merged = other.ledgers.len(), adopted, "removed counter");
    }

    /// Add `amount` to the value of `key`.
    pub fn add(&mut self, key: &K, amount: i64) {
        self.ledger_for(key).add(key, amount);
    }

    /// Subtract `amount` from the value of `key`.
    pub fn subtract(&mut self, key: &K, amount: i64) {
        self.add(key, amount.wrapping_neg());
    }

    /// Remove `key`, returning its previous value (0 if absent).
    ///
    /// The owning ledger is dropped if this leaves it empty.
    pub fn remove(&mut self, key: &K) -> i64 {
        let primary = key.primary_key();
        let Some(ledger) = self.ledgers.get_mut(&primary) else {
            return 0;
        };
        let previous = ledger.remove(key);
        if ledger.is_empty() {
            self.ledgers.swap_remove(&primary);
            trace!(%primary, "dropped empty ledger");
        }
        previous
    }

    /// Overwrite the value of `key`.
    pub fn set(&mut self, key: &K, amount: i64) {
        self.ledger_for(key).set(key, amount);
    }

    /// The value of `key`, or 0 if absent.
    pub fn get(&self, key: &K) -> i64 {
        self.ledgers
            .get(&key.primary_key())
            .map_or(0, |ledger| ledger.get(key))
    }

    /// Set every value to 0, in every ledger.
    pub fn reset(&mut self) {
        self.ledgers.values_mut().for_each(VariantCounter::reset);
    }

    /// Remove every entry from every ledger. Ledgers themselves are kept.
    pub fn clear(&mut self) {
        self.ledgers.values_mut().for_each(VariantCounter::clear);
    }

    /// Whether no key has a non-zero value.
    pub fn is_empty(&self) -> bool {
        self.ledgers.values().all(VariantCounter::is_empty)
    }

    /// Number of keys with a non-zero value.
    pub fn len(&self) -> usize {
        self.ledgers
            .values()
            .fold(0_usize, |total, ledger| total.saturating_add(ledger.len()))
    }

    /// Number of per-primary-key ledgers currently held.
    pub fn ledger_count(&self) -> usize {
        self.ledgers.len()
    }

    /// The ledger of a primary key, if one exists.
    pub fn ledger(&self, primary: PrimaryKey) -> Option<&VariantCounter<K>> {
        self.ledgers.get(&primary)
    }

    /// Iterate over every stored `(key, amount)` pair, ledger by ledger.
    ///
    /// The order of ledgers is unspecified. Calling `iter` again starts a
    /// fresh pass.
    pub fn iter(&self) -> Iter<'_, K> {
        Iter {
            ledgers: self.ledgers.values(),
            current: ledger::Iter::empty(),
        }
    }

    /// The first key with a non-zero amount, see [`first_entry`](Self::first_entry).
    pub fn first_key(&self) -> Option<&K> {
        self.first_entry().map(|(key, _)| key)
    }

    /// The first key of the given type, see [`first_entry_of`](Self::first_entry_of).
    pub fn first_key_of(&self, kind: KeyType) -> Option<&K> {
        self.first_entry_of(kind).map(|(key, _)| key)
    }

    /// The leading non-zero entry of the first non-empty ledger.
    ///
    /// `None` exactly when [`is_empty`](Self::is_empty) holds.
    pub fn first_entry(&self) -> Option<(&K, i64)> {
        self.ledgers.values().find_map(leading_entry)
    }

    /// The first entry, among the leading non-zero entries of each ledger,
    /// whose key has the given type.
    pub fn first_entry_of(&self, kind: KeyType) -> Option<(&K, i64)> {
        self.ledgers
            .values()
            .filter_map(leading_entry)
            .find(|(key, _)| key.key_type() == kind)
    }

    /// Every distinct key with a non-zero amount.
    pub fn key_set(&self) -> FxHashSet<K> {
        let mut keys = FxHashSet::with_capacity_and_hasher(self.len(), FxBuildHasher);
        keys.extend(
            self.iter()
                .filter(|&(_, amount)| amount != 0)
                .map(|(key, _)| key.clone()),
        );
        keys
    }

    fn ledger_for(&mut self, key: &K) -> &mut VariantCounter<K> {
        let drop_zeros = self.drop_zeros;
        self.ledgers.entry(key.primary_key()).or_insert_with(|| {
            let shape = LedgerShape::for_key(key);
            trace!(primary = %key.primary_key(), ?shape, "created ledger");
            VariantCounter::new(shape).with_drop_zeros(drop_zeros)
        })
    }
}

fn leading_entry<K: StackKey>(ledger: &VariantCounter<K>) -> Option<(&K, i64)> {
    ledger.iter().find(|&(_, amount)| amount != 0)
}

impl<'a, K: StackKey> IntoIterator for &'a KeyCounter<K> {
    type Item = (&'a K, i64);
    type IntoIter = Iter<'a, K>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K: StackKey> Extend<(K, i64)> for KeyCounter<K> {
    fn extend<I: IntoIterator<Item = (K, i64)>>(&mut self, iter: I) {
        for (key, amount) in iter {
            self.add(&key, amount);
        }
    }
}

impl<K: StackKey> FromIterator<(K, i64)> for KeyCounter<K> {
    fn from_iter<I: IntoIterator<Item = (K, i64)>>(iter: I) -> Self {
        let mut counter = Self::new();
        counter.extend(iter);
        counter
    }
}

/// Iterator over all entries of a [`KeyCounter`].
#[derive(Debug)]
pub struct Iter<'a, K> {
    ledgers: indexmap::map::Values<'a, PrimaryKey, VariantCounter<K>>,
    current: ledger::Iter<'a, K>,
}

impl<'a, K: StackKey> Iterator for Iter<'a, K> {
    type Item = (&'a K, i64);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(entry) = self.current.next() {
                return Some(entry);
            }
            self.current = self.ledgers.next()?.iter();
        }
    }
}

impl<K: StackKey> core::iter::FusedIterator for Iter<'_, K> {}

#[cfg(test)]
mod tests {
    use hoard_types::{FluidKey, ItemKey, ResourceId};

    use super::*;

    fn stick() -> AnyKey {
        ItemKey::of(ResourceId(0)).into()
    }

    fn water() -> AnyKey {
        FluidKey::of(ResourceId(0)).into()
    }

    fn sword(damage: u32) -> AnyKey {
        ItemKey::damageable(ResourceId(1), 100).with_damage(damage).into()
    }

    #[test]
    fn add_subtract_remove_scenario() {
        let mut counter = KeyCounter::new();
        counter.add(&stick(), 5);
        counter.add(&stick(), -2);
        assert_eq!(counter.get(&stick()), 3);
        assert_eq!(counter.remove(&stick()), 3);
        assert_eq!(counter.get(&stick()), 0);
        assert!(counter.is_empty());
        assert_eq!(counter.ledger_count(), 0);
    }

    #[test]
    fn subtract_past_zero_goes_negative() {
        let mut counter = KeyCounter::new();
        counter.subtract(&water(), 250);
        assert_eq!(counter.get(&water()), -250);
        assert_eq!(counter.len(), 1);
    }

    #[test]
    fn remove_of_absent_key_creates_nothing() {
        let mut counter: KeyCounter = KeyCounter::new();
        assert_eq!(counter.remove(&stick()), 0);
        assert_eq!(counter.ledger_count(), 0);
    }

    #[test]
    fn item_and_fluid_with_same_id_stay_apart() {
        let mut counter = KeyCounter::new();
        counter.set(&stick(), 1);
        counter.set(&water(), 1000);
        assert_eq!(counter.ledger_count(), 2);
        assert_eq!(counter.get(&stick()), 1);
        assert_eq!(counter.get(&water()), 1000);
        assert_eq!(counter.remove(&stick()), 1);
        assert_eq!(counter.get(&water()), 1000);
    }

    #[test]
    fn ledger_shape_is_chosen_by_first_key() {
        let mut counter = KeyCounter::new();
        counter.add(&sword(3), 1);
        counter.add(&stick(), 1);
        let sword_ledger = counter.ledger(sword(0).primary_key()).map(VariantCounter::shape);
        let stick_ledger = counter.ledger(stick().primary_key()).map(VariantCounter::shape);
        assert_eq!(sword_ledger, Some(LedgerShape::Fuzzy));
        assert_eq!(stick_ledger, Some(LedgerShape::Unordered));
    }

    #[test]
    fn find_fuzzy_routes_to_one_ledger() {
        let mut counter = KeyCounter::new();
        counter.add(&sword(10), 1);
        counter.add(&sword(90), 2);
        counter.add(&stick(), 3);

        let half: Vec<_> = counter
            .find_fuzzy(&sword(15), FuzzyMode::Percent50)
            .map(|(k, v)| (k.clone(), v))
            .collect();
        assert_eq!(half, vec![(sword(10), 1)]);
        assert_eq!(counter.find_fuzzy(&sword(15), FuzzyMode::IgnoreAll).count(), 2);
        assert_eq!(counter.find_fuzzy(&water(), FuzzyMode::IgnoreAll).count(), 0);
    }

    #[test]
    fn remove_all_into_empty_counter_inverts_copy() {
        let mut source = KeyCounter::new();
        source.add(&sword(20), 4);
        source.add(&water(), 7);

        let mut target = KeyCounter::new();
        target.remove_all(&source);
        assert_eq!(target.get(&sword(20)), -4);
        assert_eq!(target.get(&water()), -7);
        assert_eq!(
            target.ledger(sword(0).primary_key()).map(VariantCounter::shape),
            Some(LedgerShape::Fuzzy)
        );

        // The source is untouched by later mutation of the target.
        target.add(&water(), 100);
        assert_eq!(source.get(&water()), 7);
    }

    #[test]
    fn add_all_then_remove_all_is_zero_net() {
        let mut ours = KeyCounter::new();
        ours.add(&stick(), 2);
        ours.add(&sword(50), -1);

        let mut theirs = KeyCounter::new();
        theirs.add(&stick(), 10);
        theirs.add(&water(), 3);

        ours.add_all(&theirs);
        assert_eq!(ours.get(&stick()), 12);
        assert_eq!(ours.get(&water()), 3);
        ours.remove_all(&theirs);
        assert_eq!(ours.get(&stick()), 2);
        assert_eq!(ours.get(&sword(50)), -1);
        assert_eq!(ours.get(&water()), 0);

        ours.remove_zeros();
        assert_eq!(ours.ledger_count(), 2);
        assert_eq!(ours.len(), 2);
    }

    #[test]
    fn remove_empty_submaps_keeps_zero_entries_elsewhere() {
        let mut counter = KeyCounter::new();
        counter.set(&stick(), 0);
        counter.set(&water(), 5);
        counter.set(&sword(1), 0);
        counter.add(&sword(2), 1);
        counter.remove_empty_submaps();
        assert_eq!(counter.ledger_count(), 2);
        // The zero sword entry survives: no zero scan happens here.
        let swords = counter.ledger(sword(0).primary_key());
        assert_eq!(swords.map(VariantCounter::entry_count), Some(2));
    }

    #[test]
    fn drop_zero_counter_never_keeps_zeros() {
        let mut counter = KeyCounter::with_drop_zeros(true);
        counter.set(&stick(), 0);
        counter.add(&water(), 4);
        counter.subtract(&water(), 4);
        assert_eq!(counter.iter().count(), 0);
        assert!(counter.is_empty());
    }

    #[test]
    fn reset_and_clear_keep_ledgers() {
        let mut counter = KeyCounter::new();
        counter.add(&stick(), 1);
        counter.add(&water(), 1);
        counter.reset();
        assert!(counter.is_empty());
        assert_eq!(counter.iter().count(), 2);
        counter.clear();
        assert_eq!(counter.iter().count(), 0);
        assert_eq!(counter.ledger_count(), 2);
    }

    #[test]
    fn iteration_is_restartable() {
        let counter: KeyCounter = [(stick(), 1), (water(), 2), (sword(5), 3)]
            .into_iter()
            .collect();
        let first: i64 = counter.iter().map(|(_, v)| v).sum();
        let second: i64 = (&counter).into_iter().map(|(_, v)| v).sum();
        assert_eq!(first, 6);
        assert_eq!(second, 6);
    }

    #[test]
    fn first_entry_filters_by_key_type() {
        let mut counter = KeyCounter::new();
        assert!(counter.first_entry().is_none());
        counter.add(&water(), 9);
        counter.add(&stick(), 1);

        assert_eq!(counter.first_entry(), Some((&water(), 9)));
        assert_eq!(counter.first_key_of(KeyType::Item), Some(&stick()));
        assert_eq!(counter.first_key_of(KeyType::Fluid), Some(&water()));

        counter.remove(&stick());
        assert!(counter.first_entry_of(KeyType::Item).is_none());
    }

    #[test]
    fn zero_only_counter_has_no_first_entry() {
        let mut counter = KeyCounter::new();
        counter.set(&stick(), 0);
        counter.add(&water(), 5);
        counter.subtract(&water(), 5);

        assert!(counter.is_empty());
        assert_eq!(counter.first_entry(), None);
        assert_eq!(counter.first_key(), None);
        assert_eq!(counter.first_key_of(KeyType::Item), None);
        assert_eq!(counter.first_entry_of(KeyType::Fluid), None);
        assert!(counter.key_set().is_empty());
    }

    #[test]
    fn first_entry_skips_leading_zeros() {
        let mut counter = KeyCounter::new();
        counter.set(&stick(), 0);
        counter.add(&sword(5), 0);
        counter.add(&sword(60), 2);

        assert_eq!(counter.first_entry(), Some((&sword(60), 2)));
        assert_eq!(counter.first_key_of(KeyType::Item), Some(&sword(60)));
        assert_eq!(counter.first_entry_of(KeyType::Fluid), None);
    }

    #[test]
    fn remove_keeps_ledger_with_other_variants() {
        let mut counter = KeyCounter::new();
        counter.add(&sword(10), 1);
        counter.add(&sword(90), 4);

        assert_eq!(counter.remove(&sword(10)), 1);
        assert_eq!(counter.ledger_count(), 1);
        assert_eq!(counter.get(&sword(90)), 4);
        assert_eq!(counter.len(), 1);

        assert_eq!(counter.remove(&sword(90)), 4);
        assert_eq!(counter.ledger_count(), 0);
    }

    #[test]
    fn key_set_collects_distinct_keys() {
        let mut counter = KeyCounter::new();
        counter.add(&sword(1), 1);
        counter.add(&sword(1), 1);
        counter.add(&sword(2), 1);
        counter.add(&water(), 1);
        let keys = counter.key_set();
        assert_eq!(keys.len(), 3);
        assert!(keys.contains(&sword(2)));
    }
}
