//! Ordered storage and bucketed range search for fuzzy-searchable variants.
//!
//! Fuzzy ledgers keep their variants in a [`BTreeMap`] sorted by
//! `(fuzzy_search_value, key)`. A fuzzy search turns the probe's attribute
//! value into a bucket of the attribute domain `[0, max]` and extracts the
//! matching sub-range with [`BTreeMap::range`], so the cost is logarithmic in
//! the ledger size plus the number of matches.
//!
//! # Bucket arithmetic
//!
//! For a mode with percentage `p` and a domain bound `max`, bucket `k` holds
//! values `v` with `k * max * p <= 100 * v < (k + 1) * max * p`. The last
//! bucket (index `ceil(100 / p) - 1`) extends to `max` and beyond, and the
//! first bucket has no lower bound, so the buckets partition every possible
//! stored value. Bounds are lower-inclusive and upper-exclusive.
//!
//! # Range bounds without constructing keys
//!
//! Range queries need bounds that sort before every variant with a given
//! attribute value. Stored entries and probes are compared through the
//! `FuzzyPosition` trait object: a position is an attribute value plus an
//! optional key, and a missing key sorts before any key with the same value.
//! `FuzzyOrdered` borrows as `dyn FuzzyPosition`, so the map can be searched
//! with either an exact key (`ExactProbe`) or a bare value (`Boundary`).

use core::borrow::Borrow;
use core::cmp::Ordering;
use core::ops::Bound;
use std::collections::BTreeMap;
use std::collections::btree_map::Range;

use hoard_types::{FuzzyMode, StackKey};

// ---------------------------------------------------------------------------
// Ordering
// ---------------------------------------------------------------------------

/// A position in the fuzzy order: an attribute value and, for stored
/// entries and exact probes, the key itself.
pub(crate) trait FuzzyPosition<K> {
    /// The fuzzy attribute value.
    fn fuzzy_value(&self) -> u64;

    /// The exact variant, or `None` for a value boundary.
    fn variant(&self) -> Option<&K>;
}

impl<K: Ord> PartialEq for dyn FuzzyPosition<K> + '_ {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<K: Ord> Eq for dyn FuzzyPosition<K> + '_ {}

impl<K: Ord> PartialOrd for dyn FuzzyPosition<K> + '_ {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<K: Ord> Ord for dyn FuzzyPosition<K> + '_ {
    fn cmp(&self, other: &Self) -> Ordering {
        self.fuzzy_value()
            .cmp(&other.fuzzy_value())
            .then_with(|| self.variant().cmp(&other.variant()))
    }
}

/// A stored fuzzy variant with its attribute value cached.
#[derive(Debug, Clone)]
pub(crate) struct FuzzyOrdered<K> {
    value: u64,
    key: K,
}

impl<K: StackKey> FuzzyOrdered<K> {
    pub(crate) fn new(key: K) -> Self {
        Self {
            value: key.fuzzy_search_value(),
            key,
        }
    }
}

impl<K> FuzzyOrdered<K> {
    pub(crate) const fn key(&self) -> &K {
        &self.key
    }
}

impl<K> FuzzyPosition<K> for FuzzyOrdered<K> {
    fn fuzzy_value(&self) -> u64 {
        self.value
    }

    fn variant(&self) -> Option<&K> {
        Some(&self.key)
    }
}

// Must agree with the `dyn FuzzyPosition` order, see `Borrow` below.
impl<K: Ord> PartialEq for FuzzyOrdered<K> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<K: Ord> Eq for FuzzyOrdered<K> {}

impl<K: Ord> PartialOrd for FuzzyOrdered<K> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<K: Ord> Ord for FuzzyOrdered<K> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.value
            .cmp(&other.value)
            .then_with(|| self.key.cmp(&other.key))
    }
}

impl<'a, K: Ord + 'a> Borrow<dyn FuzzyPosition<K> + 'a> for FuzzyOrdered<K> {
    fn borrow(&self) -> &(dyn FuzzyPosition<K> + 'a) {
        self
    }
}

/// Looks up one exact variant without cloning it.
pub(crate) struct ExactProbe<'k, K> {
    value: u64,
    key: &'k K,
}

impl<'k, K: StackKey> ExactProbe<'k, K> {
    pub(crate) fn new(key: &'k K) -> Self {
        Self {
            value: key.fuzzy_search_value(),
            key,
        }
    }
}

impl<K> FuzzyPosition<K> for ExactProbe<'_, K> {
    fn fuzzy_value(&self) -> u64 {
        self.value
    }

    fn variant(&self) -> Option<&K> {
        Some(self.key)
    }
}

/// Sorts before every variant whose attribute value is `>= self.0`.
struct Boundary(u64);

impl<K> FuzzyPosition<K> for Boundary {
    fn fuzzy_value(&self) -> u64 {
        self.0
    }

    fn variant(&self) -> Option<&K> {
        None
    }
}

// ---------------------------------------------------------------------------
// Buckets
// ---------------------------------------------------------------------------

/// The attribute interval matched by a fuzzy probe.
///
/// `None` on either side means the interval is open on that side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FuzzyBucket {
    /// Inclusive lower bound, or `None` for the first bucket.
    pub lower: Option<u64>,
    /// Exclusive upper bound, or `None` for the last bucket.
    pub upper: Option<u64>,
}

impl FuzzyBucket {
    /// The bucket covering every value.
    pub const ALL: Self = Self {
        lower: None,
        upper: None,
    };

    /// Whether `value` lies in this bucket.
    pub fn contains(&self, value: u64) -> bool {
        self.lower.is_none_or(|lower| value >= lower)
            && self.upper.is_none_or(|upper| value < upper)
    }

    /// Compute the bucket containing `value` under `mode`, for the attribute
    /// domain `[0, max_value]`.
    ///
    /// [`FuzzyMode::IgnoreAll`] and a zero `max_value` both yield
    /// [`FuzzyBucket::ALL`].
    pub fn for_value(value: u64, max_value: u64, mode: FuzzyMode) -> Self {
        let Some(percent) = mode.percentage() else {
            return Self::ALL;
        };
        if max_value == 0 || percent == 0 {
            return Self::ALL;
        }

        // max * p fits in u128 with plenty of room, and so does 100 * v.
        let max = u128::from(max_value);
        let percent = u128::from(percent);
        let width = max.saturating_mul(percent);
        let last_index = 100_u128.div_ceil(percent).saturating_sub(1);
        let index = u128::from(value)
            .saturating_mul(100)
            .checked_div(width)
            .unwrap_or(0)
            .min(last_index);

        let lower = (index > 0).then(|| scaled_ceil(index, width));
        let upper = (index < last_index).then(|| scaled_ceil(index.saturating_add(1), width));
        Self { lower, upper }
    }
}

/// `ceil(index * width / 100)`, saturated into `u64`.
fn scaled_ceil(index: u128, width: u128) -> u64 {
    let bound = index.saturating_mul(width).div_ceil(100);
    u64::try_from(bound).unwrap_or(u64::MAX)
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

/// Return the entries of `records` that fall in the probe's bucket.
///
/// The probe need not be stored in `records`.
pub(crate) fn find_fuzzy<'a, K: StackKey>(
    records: &'a BTreeMap<FuzzyOrdered<K>, i64>,
    probe: &K,
    mode: FuzzyMode,
) -> Range<'a, FuzzyOrdered<K>, i64> {
    let bucket = FuzzyBucket::for_value(
        probe.fuzzy_search_value(),
        probe.fuzzy_search_max_value(),
        mode,
    );
    range_of(records, bucket)
}

fn range_of<K: StackKey>(
    records: &BTreeMap<FuzzyOrdered<K>, i64>,
    bucket: FuzzyBucket,
) -> Range<'_, FuzzyOrdered<K>, i64> {
    let lower = bucket.lower.map(Boundary);
    let upper = bucket.upper.map(Boundary);
    let start: Bound<&dyn FuzzyPosition<K>> = match &lower {
        Some(boundary) => Bound::Included(boundary),
        None => Bound::Unbounded,
    };
    let end: Bound<&dyn FuzzyPosition<K>> = match &upper {
        Some(boundary) => Bound::Excluded(boundary),
        None => Bound::Unbounded,
    };
    records.range::<dyn FuzzyPosition<K> + '_, _>((start, end))
}

/// Return the first entry strictly after `key`, in fuzzy order.
pub(crate) fn next_after<'a, K: StackKey>(
    records: &'a BTreeMap<FuzzyOrdered<K>, i64>,
    key: Option<&K>,
) -> Option<(&'a FuzzyOrdered<K>, &'a i64)> {
    match key {
        Some(key) => {
            let probe = ExactProbe::new(key);
            let start: Bound<&dyn FuzzyPosition<K>> = Bound::Excluded(&probe);
            records
                .range::<dyn FuzzyPosition<K> + '_, _>((start, Bound::Unbounded))
                .next()
        }
        None => records.iter().next(),
    }
}

#[cfg(test)]
mod tests {
    use hoard_types::{ItemKey, ResourceId};

    use super::*;

    const PICKAXE: ResourceId = ResourceId(9);

    fn pickaxe(damage: u32) -> ItemKey {
        ItemKey::damageable(PICKAXE, 100).with_damage(damage)
    }

    fn records(damages: &[u32]) -> BTreeMap<FuzzyOrdered<ItemKey>, i64> {
        damages
            .iter()
            .map(|&d| (FuzzyOrdered::new(pickaxe(d)), i64::from(d).saturating_add(1)))
            .collect()
    }

    const fn bucket(lower: Option<u64>, upper: Option<u64>) -> FuzzyBucket {
        FuzzyBucket { lower, upper }
    }

    fn damages_in(range: Range<'_, FuzzyOrdered<ItemKey>, i64>) -> Vec<u32> {
        range.map(|(k, _)| k.key().damage()).collect()
    }

    #[test]
    fn percent_50_splits_at_half() {
        assert_eq!(
            FuzzyBucket::for_value(49, 100, FuzzyMode::Percent50),
            bucket(None, Some(50))
        );
        assert_eq!(
            FuzzyBucket::for_value(50, 100, FuzzyMode::Percent50),
            bucket(Some(50), None)
        );
    }

    #[test]
    fn percent_25_has_four_buckets() {
        let lowers: Vec<_> = [0, 30, 60, 99, 100]
            .iter()
            .map(|&v| FuzzyBucket::for_value(v, 100, FuzzyMode::Percent25).lower)
            .collect();
        assert_eq!(lowers, vec![None, Some(25), Some(50), Some(75), Some(75)]);
    }

    #[test]
    fn percent_99_isolates_the_top() {
        let top = FuzzyBucket::for_value(99, 100, FuzzyMode::Percent99);
        assert_eq!(top, bucket(Some(99), None));
        assert!(!FuzzyBucket::for_value(98, 100, FuzzyMode::Percent99).contains(99));
    }

    #[test]
    fn uneven_domain_rounds_bounds_up() {
        // 250 * 25% = 62.5: the second bucket starts at 63.
        let second = FuzzyBucket::for_value(63, 250, FuzzyMode::Percent25);
        assert_eq!(second, bucket(Some(63), Some(125)));
        assert!(FuzzyBucket::for_value(62, 250, FuzzyMode::Percent25).contains(62));
        assert!(!FuzzyBucket::for_value(62, 250, FuzzyMode::Percent25).contains(63));
    }

    #[test]
    fn ignore_all_and_zero_max_cover_everything() {
        assert_eq!(FuzzyBucket::for_value(5, 100, FuzzyMode::IgnoreAll), FuzzyBucket::ALL);
        assert_eq!(FuzzyBucket::for_value(5, 0, FuzzyMode::Percent25), FuzzyBucket::ALL);
    }

    #[test]
    fn find_fuzzy_extracts_bucket() {
        let map = records(&[0, 10, 49, 50, 90, 100]);
        assert_eq!(
            damages_in(find_fuzzy(&map, &pickaxe(15), FuzzyMode::Percent50)),
            vec![0, 10, 49]
        );
        assert_eq!(
            damages_in(find_fuzzy(&map, &pickaxe(75), FuzzyMode::Percent50)),
            vec![50, 90, 100]
        );
        assert_eq!(
            damages_in(find_fuzzy(&map, &pickaxe(75), FuzzyMode::IgnoreAll)),
            vec![0, 10, 49, 50, 90, 100]
        );
    }

    #[test]
    fn find_fuzzy_on_empty_map_is_empty() {
        let map = records(&[]);
        assert_eq!(find_fuzzy(&map, &pickaxe(15), FuzzyMode::Percent25).count(), 0);
    }

    #[test]
    fn same_damage_variants_are_ordered_by_key() {
        let plain = pickaxe(30);
        let named = pickaxe(30).with_components("{name:\"Digger\"}");
        let mut map = BTreeMap::new();
        map.insert(FuzzyOrdered::new(named.clone()), 1);
        map.insert(FuzzyOrdered::new(plain.clone()), 2);

        let found: Vec<_> = find_fuzzy(&map, &pickaxe(26), FuzzyMode::Percent25)
            .map(|(k, v)| (k.key().clone(), *v))
            .collect();
        assert_eq!(found, vec![(plain, 2), (named, 1)]);
    }

    #[test]
    fn exact_probe_finds_stored_entry() {
        let map = records(&[10, 20]);
        let key = pickaxe(20);
        let probe = ExactProbe::new(&key);
        assert_eq!(map.get(&probe as &dyn FuzzyPosition<ItemKey>), Some(&21));
    }

    #[test]
    fn next_after_walks_in_order() {
        let map = records(&[5, 10, 20]);
        let first = next_after(&map, None).map(|(k, _)| k.key().clone());
        assert_eq!(first, Some(pickaxe(5)));
        let second = next_after(&map, Some(&pickaxe(5))).map(|(k, _)| k.key().damage());
        assert_eq!(second, Some(10));
        // The anchor does not have to be stored.
        let third = next_after(&map, Some(&pickaxe(12))).map(|(k, _)| k.key().damage());
        assert_eq!(third, Some(20));
        assert!(next_after(&map, Some(&pickaxe(20))).is_none());
    }
}
