//! Per-primary-key variant ledgers.
//!
//! A [`VariantCounter`] tallies a signed amount for every exact variant that
//! shares one [`PrimaryKey`](hoard_types::PrimaryKey). It comes in two shapes:
//!
//! - [`LedgerShape::Unordered`] -- a hash map, for resources that cannot be
//!   fuzzy-searched. A fuzzy search returns every entry.
//! - [`LedgerShape::Fuzzy`] -- an ordered map sorted by the fuzzy attribute,
//!   for damageable resources. A fuzzy search returns one bucket of it.
//!
//! # Drop-zero mode
//!
//! With drop-zero mode on, no entry at amount 0 survives a mutation: `add`,
//! `set`, `reset`, and turning the mode on all prune zeros. With it off,
//! zeros may linger; [`len`](VariantCounter::len) and
//! [`is_empty`](VariantCounter::is_empty) then count only non-zero entries,
//! and [`compacting_iter`](VariantCounter::compacting_iter) skips zeros while
//! deleting them.
//!
//! # Arithmetic
//!
//! Amounts use two's-complement wrapping arithmetic, so adding and then
//! removing the same ledger always restores the previous amounts exactly.

use std::collections::BTreeMap;
use std::collections::btree_map;

use hoard_types::{FuzzyMode, StackKey};
use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;

use crate::fuzzy::{self, ExactProbe, FuzzyOrdered, FuzzyPosition};

/// The storage strategy of a ledger, fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LedgerShape {
    /// Hash-ordered storage; fuzzy search returns everything.
    Unordered,
    /// Attribute-ordered storage supporting bucketed range search.
    Fuzzy,
}

impl LedgerShape {
    /// The shape a ledger must have to hold `key`.
    pub fn for_key<K: StackKey>(key: &K) -> Self {
        if key.supports_fuzzy_search() {
            Self::Fuzzy
        } else {
            Self::Unordered
        }
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
enum Records<K> {
    Unordered(IndexMap<K, i64, FxBuildHasher>),
    Fuzzy(BTreeMap<FuzzyOrdered<K>, i64>),
}

impl<K: StackKey> Records<K> {
    fn new(shape: LedgerShape) -> Self {
        match shape {
            LedgerShape::Unordered => Self::Unordered(IndexMap::default()),
            LedgerShape::Fuzzy => Self::Fuzzy(BTreeMap::new()),
        }
    }

    fn get(&self, key: &K) -> Option<i64> {
        match self {
            Self::Unordered(map) => map.get(key).copied(),
            Self::Fuzzy(map) => map
                .get(&ExactProbe::new(key) as &dyn FuzzyPosition<K>)
                .copied(),
        }
    }

    fn get_mut(&mut self, key: &K) -> Option<&mut i64> {
        match self {
            Self::Unordered(map) => map.get_mut(key),
            Self::Fuzzy(map) => map.get_mut(&ExactProbe::new(key) as &dyn FuzzyPosition<K>),
        }
    }

    fn insert(&mut self, key: K, amount: i64) {
        match self {
            Self::Unordered(map) => {
                map.insert(key, amount);
            }
            Self::Fuzzy(map) => {
                map.insert(FuzzyOrdered::new(key), amount);
            }
        }
    }

    fn remove(&mut self, key: &K) -> Option<i64> {
        match self {
            Self::Unordered(map) => map.swap_remove(key),
            Self::Fuzzy(map) => map.remove(&ExactProbe::new(key) as &dyn FuzzyPosition<K>),
        }
    }

    fn entry_count(&self) -> usize {
        match self {
            Self::Unordered(map) => map.len(),
            Self::Fuzzy(map) => map.len(),
        }
    }

    fn update_all(&mut self, f: impl Fn(i64) -> i64) {
        match self {
            Self::Unordered(map) => map.values_mut().for_each(|v| *v = f(*v)),
            Self::Fuzzy(map) => map.values_mut().for_each(|v| *v = f(*v)),
        }
    }

    /// Drop zero entries, returning how many were removed.
    fn retain_non_zero(&mut self) -> usize {
        let before = self.entry_count();
        match self {
            Self::Unordered(map) => map.retain(|_, v| *v != 0),
            Self::Fuzzy(map) => map.retain(|_, v| *v != 0),
        }
        before.saturating_sub(self.entry_count())
    }

    fn clear(&mut self) {
        match self {
            Self::Unordered(map) => map.clear(),
            Self::Fuzzy(map) => map.clear(),
        }
    }

    fn iter(&self) -> Iter<'_, K> {
        match self {
            Self::Unordered(map) => Iter {
                inner: IterInner::Unordered(map.iter()),
            },
            Self::Fuzzy(map) => Iter {
                inner: IterInner::Fuzzy(map.iter()),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// VariantCounter
// ---------------------------------------------------------------------------

/// Tallies a positive or negative amount for each variant of one primary
/// key.
#[derive(Debug, Clone)]
pub struct VariantCounter<K> {
    drop_zeros: bool,
    records: Records<K>,
}

impl<K: StackKey> VariantCounter<K> {
    /// Create an empty ledger of the given shape with drop-zero mode off.
    pub fn new(shape: LedgerShape) -> Self {
        Self {
            drop_zeros: false,
            records: Records::new(shape),
        }
    }

    /// Create an empty ledger shaped to hold `key` and its siblings.
    pub fn for_key(key: &K) -> Self {
        Self::new(LedgerShape::for_key(key))
    }

    /// Builder-style [`set_drop_zeros`](Self::set_drop_zeros).
    #[must_use]
    pub fn with_drop_zeros(mut self, drop_zeros: bool) -> Self {
        self.set_drop_zeros(drop_zeros);
        self
    }

    /// Whether entries at amount 0 are pruned on mutation.
    pub const fn drop_zeros(&self) -> bool {
        self.drop_zeros
    }

    /// Switch drop-zero mode. Turning it on prunes existing zero entries.
    pub fn set_drop_zeros(&mut self, drop_zeros: bool) {
        self.drop_zeros = drop_zeros;
        if drop_zeros {
            self.records.retain_non_zero();
        }
    }

    /// The storage shape of this ledger.
    pub const fn shape(&self) -> LedgerShape {
        match self.records {
            Records::Unordered(_) => LedgerShape::Unordered,
            Records::Fuzzy(_) => LedgerShape::Fuzzy,
        }
    }

    /// The stored amount for `key`, or 0 if absent.
    pub fn get(&self, key: &K) -> i64 {
        self.records.get(key).unwrap_or(0)
    }

    /// Add `delta` to the amount stored for `key`.
    pub fn add(&mut self, key: &K, delta: i64) {
        let drop_zeros = self.drop_zeros;
        match self.records.get_mut(key) {
            Some(slot) => {
                let updated = slot.wrapping_add(delta);
                if drop_zeros && updated == 0 {
                    self.records.remove(key);
                } else {
                    *slot = updated;
                }
            }
            None => {
                if !drop_zeros || delta != 0 {
                    self.records.insert(key.clone(), delta);
                }
            }
        }
    }

    /// Overwrite the amount stored for `key`.
    ///
    /// In drop-zero mode, setting 0 removes the entry instead.
    pub fn set(&mut self, key: &K, amount: i64) {
        if self.drop_zeros && amount == 0 {
            self.records.remove(key);
            return;
        }
        match self.records.get_mut(key) {
            Some(slot) => *slot = amount,
            None => self.records.insert(key.clone(), amount),
        }
    }

    /// Remove `key`, returning its previous amount (0 if absent).
    pub fn remove(&mut self, key: &K) -> i64 {
        self.records.remove(key).unwrap_or(0)
    }

    /// Add every amount of `other` into this ledger.
    pub fn add_all(&mut self, other: &Self) {
        for (key, amount) in other.iter() {
            self.add(key, amount);
        }
    }

    /// Subtract every amount of `other` from this ledger.
    pub fn remove_all(&mut self, other: &Self) {
        for (key, amount) in other.iter() {
            self.add(key, amount.wrapping_neg());
        }
    }

    /// Negate every stored amount.
    pub fn invert(&mut self) {
        self.records.update_all(i64::wrapping_neg);
    }

    /// Remove every entry at amount 0, whatever the drop-zero mode.
    ///
    /// Returns how many entries were removed.
    pub fn remove_zeros(&mut self) -> usize {
        self.records.retain_non_zero()
    }

    /// Set every amount to 0. In drop-zero mode this clears the ledger.
    pub fn reset(&mut self) {
        if self.drop_zeros {
            self.records.clear();
        } else {
            self.records.update_all(|_| 0);
        }
    }

    /// Remove every entry.
    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Number of variants with a non-zero amount.
    pub fn len(&self) -> usize {
        if self.drop_zeros {
            self.records.entry_count()
        } else {
            self.iter().filter(|&(_, amount)| amount != 0).count()
        }
    }

    /// Whether no variant has a non-zero amount.
    pub fn is_empty(&self) -> bool {
        if self.drop_zeros {
            self.records.entry_count() == 0
        } else {
            self.iter().all(|(_, amount)| amount == 0)
        }
    }

    /// Number of physically stored entries, zeros included.
    pub fn entry_count(&self) -> usize {
        self.records.entry_count()
    }

    /// Iterate over all stored `(key, amount)` pairs.
    ///
    /// Fuzzy ledgers yield in fuzzy order; unordered ledgers in an
    /// unspecified order.
    pub fn iter(&self) -> Iter<'_, K> {
        self.records.iter()
    }

    /// Entries considered equivalent to `probe` under `mode`.
    ///
    /// Unordered ledgers cannot tell variants apart by attribute and return
    /// every entry. Fuzzy ledgers return the probe's bucket, in order.
    pub fn find_fuzzy(&self, probe: &K, mode: FuzzyMode) -> Iter<'_, K> {
        match &self.records {
            Records::Unordered(map) => Iter {
                inner: IterInner::Unordered(map.iter()),
            },
            Records::Fuzzy(map) => Iter {
                inner: IterInner::FuzzyRange(fuzzy::find_fuzzy(map, probe, mode)),
            },
        }
    }

    /// An explicit cursor that can remove the entry it last yielded.
    pub fn cursor(&mut self) -> Cursor<'_, K> {
        let state = match self.records {
            Records::Unordered(_) => CursorState::Unordered {
                next: 0,
                current: None,
            },
            Records::Fuzzy(_) => CursorState::Fuzzy {
                anchor: None,
                live: false,
            },
        };
        Cursor {
            ledger: self,
            state,
        }
    }

    /// A single forward pass yielding non-zero entries and deleting zero
    /// entries as it passes them.
    pub fn compacting_iter(&mut self) -> Compacting<'_, K> {
        Compacting {
            cursor: self.cursor(),
            removed: 0,
        }
    }
}

impl<'a, K: StackKey> IntoIterator for &'a VariantCounter<K> {
    type Item = (&'a K, i64);
    type IntoIter = Iter<'a, K>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// ---------------------------------------------------------------------------
// Iteration
// ---------------------------------------------------------------------------

/// Lazy iterator over `(key, amount)` pairs of a ledger.
#[derive(Debug)]
pub struct Iter<'a, K> {
    inner: IterInner<'a, K>,
}

#[derive(Debug)]
enum IterInner<'a, K> {
    Empty,
    Unordered(indexmap::map::Iter<'a, K, i64>),
    Fuzzy(btree_map::Iter<'a, FuzzyOrdered<K>, i64>),
    FuzzyRange(btree_map::Range<'a, FuzzyOrdered<K>, i64>),
}

impl<K> Iter<'_, K> {
    /// An iterator that yields nothing.
    pub const fn empty() -> Self {
        Self {
            inner: IterInner::Empty,
        }
    }
}

impl<'a, K> Iterator for Iter<'a, K> {
    type Item = (&'a K, i64);

    fn next(&mut self) -> Option<Self::Item> {
        match &mut self.inner {
            IterInner::Empty => None,
            IterInner::Unordered(it) => it.next().map(|(k, v)| (k, *v)),
            IterInner::Fuzzy(it) => it.next().map(|(k, v)| (k.key(), *v)),
            IterInner::FuzzyRange(it) => it.next().map(|(k, v)| (k.key(), *v)),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match &self.inner {
            IterInner::Empty => (0, Some(0)),
            IterInner::Unordered(it) => it.size_hint(),
            IterInner::Fuzzy(it) => it.size_hint(),
            IterInner::FuzzyRange(it) => it.size_hint(),
        }
    }
}

impl<K> core::iter::FusedIterator for Iter<'_, K> {}

enum CursorState<K> {
    Unordered { next: usize, current: Option<usize> },
    Fuzzy { anchor: Option<K>, live: bool },
}

/// A forward cursor over a ledger with a remove-current operation.
///
/// Removing the entry last returned by [`advance`](Cursor::advance) keeps the
/// cursor's position valid: the next `advance` continues with the entry that
/// would have followed it.
pub struct Cursor<'a, K> {
    ledger: &'a mut VariantCounter<K>,
    state: CursorState<K>,
}

impl<K: StackKey> Cursor<'_, K> {
    /// Move to the next entry and return it, or `None` at the end.
    pub fn advance(&mut self) -> Option<(&K, i64)> {
        match (&mut self.state, &self.ledger.records) {
            (CursorState::Unordered { next, current }, Records::Unordered(map)) => {
                let index = *next;
                let (key, amount) = map.get_index(index)?;
                *current = Some(index);
                *next = index.saturating_add(1);
                Some((key, *amount))
            }
            (CursorState::Fuzzy { anchor, live }, Records::Fuzzy(map)) => {
                let (entry, amount) = fuzzy::next_after(map, anchor.as_ref())?;
                *anchor = Some(entry.key().clone());
                *live = true;
                Some((entry.key(), *amount))
            }
            _ => None,
        }
    }

    /// Remove the entry last returned by [`advance`](Cursor::advance),
    /// returning its amount. Returns `None` if there is no such entry or it
    /// was already removed.
    pub fn remove_current(&mut self) -> Option<i64> {
        match (&mut self.state, &mut self.ledger.records) {
            (CursorState::Unordered { next, current }, Records::Unordered(map)) => {
                let index = current.take()?;
                let (_, amount) = map.swap_remove_index(index)?;
                // The former last entry now sits at `index` and is still unvisited.
                *next = index;
                Some(amount)
            }
            (CursorState::Fuzzy { anchor, live }, Records::Fuzzy(map)) => {
                if !core::mem::take(live) {
                    return None;
                }
                let key = anchor.as_ref()?;
                map.remove(&ExactProbe::new(key) as &dyn FuzzyPosition<K>)
            }
            _ => None,
        }
    }
}

/// Iterator returned by [`VariantCounter::compacting_iter`].
///
/// Yields owned keys because the underlying entries may be deleted during
/// the pass.
pub struct Compacting<'a, K> {
    cursor: Cursor<'a, K>,
    removed: usize,
}

impl<K> Compacting<'_, K> {
    /// Number of zero entries deleted so far.
    pub const fn removed(&self) -> usize {
        self.removed
    }
}

impl<K: StackKey> Iterator for Compacting<'_, K> {
    type Item = (K, i64);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.cursor.advance() {
                None => return None,
                Some((key, amount)) if amount != 0 => return Some((key.clone(), amount)),
                Some(_) => {}
            }
            if self.cursor.remove_current().is_some() {
                self.removed = self.removed.saturating_add(1);
            }
        }
    }
}
