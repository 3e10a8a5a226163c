//! Property tests for the counting index.
//!
//! Ledgers are driven with arbitrary sequences of signed deltas over a small
//! key space so that collisions, cancellations, and zero amounts are common.

#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects
)]

use hoard_counter::{FuzzyBucket, KeyCounter, LedgerShape};
use hoard_types::{AnyKey, FluidKey, FuzzyMode, ItemKey, KeyType, ResourceId, StackKey};
use proptest::prelude::*;

const MAX_DAMAGE: u32 = 250;

fn key_strategy() -> impl Strategy<Value = AnyKey> {
    prop_oneof![
        (0_u32..3).prop_map(|id| AnyKey::from(ItemKey::of(ResourceId(id)))),
        (0_u32..3).prop_map(|id| AnyKey::from(FluidKey::of(ResourceId(id)))),
        (0_u32..=MAX_DAMAGE).prop_map(|damage| {
            AnyKey::from(ItemKey::damageable(ResourceId(10), MAX_DAMAGE).with_damage(damage))
        }),
    ]
}

fn ops_strategy() -> impl Strategy<Value = Vec<(AnyKey, i64)>> {
    prop::collection::vec((key_strategy(), -50_i64..50), 0..40)
}

fn mode_strategy() -> impl Strategy<Value = FuzzyMode> {
    prop::sample::select(FuzzyMode::ALL.to_vec())
}

fn snapshot(counter: &KeyCounter) -> Vec<(AnyKey, i64)> {
    let mut entries: Vec<_> = counter
        .iter()
        .filter(|(_, amount)| *amount != 0)
        .map(|(key, amount)| (key.clone(), amount))
        .collect();
    entries.sort();
    entries
}

proptest! {
    #[test]
    fn add_all_then_remove_all_is_identity(ours in ops_strategy(), theirs in ops_strategy()) {
        let mut counter: KeyCounter = ours.into_iter().collect();
        let other: KeyCounter = theirs.into_iter().collect();
        let before = snapshot(&counter);

        counter.add_all(&other);
        counter.remove_all(&other);

        prop_assert_eq!(snapshot(&counter), before);
    }

    #[test]
    fn remove_all_into_empty_negates(ops in ops_strategy()) {
        let source: KeyCounter = ops.into_iter().collect();
        let mut target = KeyCounter::new();
        target.remove_all(&source);

        for (key, amount) in &source {
            prop_assert_eq!(target.get(key), amount.wrapping_neg());
        }
        prop_assert_eq!(target.ledger_count(), source.ledger_count());
    }

    #[test]
    fn drop_zero_counter_holds_no_zeros(ops in ops_strategy()) {
        let mut counter = KeyCounter::with_drop_zeros(true);
        for (key, amount) in &ops {
            counter.add(key, *amount);
        }
        prop_assert!(counter.iter().all(|(_, amount)| amount != 0));
        prop_assert_eq!(counter.len(), counter.iter().count());
    }

    #[test]
    fn len_counts_non_zero_entries(ops in ops_strategy()) {
        let counter: KeyCounter = ops.into_iter().collect();
        let non_zero = counter.iter().filter(|(_, amount)| *amount != 0).count();
        prop_assert_eq!(counter.len(), non_zero);
        prop_assert_eq!(counter.is_empty(), non_zero == 0);
    }

    #[test]
    fn remove_zeros_preserves_non_zero_amounts(ops in ops_strategy()) {
        let mut counter: KeyCounter = ops.into_iter().collect();
        let before = snapshot(&counter);
        counter.remove_zeros();
        prop_assert_eq!(counter.iter().count(), before.len());
        prop_assert_eq!(snapshot(&counter), before);
    }

    #[test]
    fn buckets_partition_the_domain(
        max in 1_u64..10_000,
        a in 0_u64..10_000,
        b in 0_u64..10_000,
        mode in mode_strategy(),
    ) {
        let bucket_a = FuzzyBucket::for_value(a, max, mode);
        let bucket_b = FuzzyBucket::for_value(b, max, mode);
        prop_assert!(bucket_a.contains(a));
        prop_assert_eq!(bucket_a == bucket_b, bucket_a.contains(b));
    }

    #[test]
    fn find_fuzzy_matches_bucket_filter(
        ops in ops_strategy(),
        probe_damage in 0_u32..=MAX_DAMAGE,
        mode in mode_strategy(),
    ) {
        let counter: KeyCounter = ops.into_iter().collect();
        let probe = AnyKey::from(
            ItemKey::damageable(ResourceId(10), MAX_DAMAGE).with_damage(probe_damage),
        );
        let bucket = FuzzyBucket::for_value(
            probe.fuzzy_search_value(),
            probe.fuzzy_search_max_value(),
            mode,
        );

        let mut found: Vec<_> = counter
            .find_fuzzy(&probe, mode)
            .map(|(key, amount)| (key.clone(), amount))
            .collect();
        found.sort();

        let mut expected: Vec<_> = counter
            .iter()
            .filter(|(key, _)| key.primary_key() == probe.primary_key())
            .filter(|(key, _)| bucket.contains(key.fuzzy_search_value()))
            .map(|(key, amount)| (key.clone(), amount))
            .collect();
        expected.sort();

        prop_assert_eq!(found, expected);
    }
}

#[test]
fn channels_are_isolated_under_merges() {
    let mut items = KeyCounter::new();
    items.add(&AnyKey::from(ItemKey::of(ResourceId(0))), 64);
    let mut fluids = KeyCounter::new();
    fluids.add(&AnyKey::from(FluidKey::of(ResourceId(0))), 1000);

    let mut combined = KeyCounter::new();
    combined.add_all(&items);
    combined.add_all(&fluids);

    assert_eq!(combined.ledger_count(), 2);
    assert_eq!(combined.first_entry_of(KeyType::Fluid).map(|(_, amount)| amount), Some(1000));
    assert_eq!(combined.first_entry_of(KeyType::Item).map(|(_, amount)| amount), Some(64));

    combined.remove_all(&items);
    combined.remove_zeros();
    assert_eq!(combined.ledger_count(), 1);
    assert_eq!(combined.first_key().map(AnyKey::key_type), Some(KeyType::Fluid));
}

#[test]
fn damageable_ledgers_are_fuzzy() {
    let sword = AnyKey::from(ItemKey::damageable(ResourceId(10), MAX_DAMAGE));
    let stick = AnyKey::from(ItemKey::of(ResourceId(0)));
    let water = AnyKey::from(FluidKey::of(ResourceId(0)));

    let counter: KeyCounter = [(sword.clone(), 1), (stick.clone(), 1), (water.clone(), 1)]
        .into_iter()
        .collect();

    let shape = |key: &AnyKey| {
        counter
            .ledger(key.primary_key())
            .map(hoard_counter::VariantCounter::shape)
    };
    assert_eq!(shape(&sword), Some(LedgerShape::Fuzzy));
    assert_eq!(shape(&stick), Some(LedgerShape::Unordered));
    assert_eq!(shape(&water), Some(LedgerShape::Unordered));
}
