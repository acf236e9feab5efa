//! Property-based tests for the repetition scheduler and token tracker.
//!
//! Uses proptest to verify invariants across random inputs:
//! - The token counter is monotonic for any sequence of valid deltas
//! - The due set is deterministic and ordered
//! - A second `due` call at the same count returns only always-visible items
//! - Preview never changes the subsequent due set
//! - Guideline validation accepts exactly tiers 1-10

// Property tests use expect/unwrap for simplicity - panics are acceptable in tests
#![allow(clippy::expect_used, clippy::unwrap_used)]

use proptest::prelude::*;
use recue::{Guideline, GuidelineStore, TierIntervals, TokenTracker, scheduler};

/// Builds a store of guidelines with ids `g0..gN` and the given tiers.
fn store_with_tiers(tiers: &[u8]) -> GuidelineStore {
    let mut store = GuidelineStore::new();
    for (i, tier) in tiers.iter().enumerate() {
        store
            .add(Guideline::new(format!("g{i}"), "content", *tier, None).unwrap())
            .unwrap();
    }
    store
}

proptest! {
    /// Property: recording any sequence of non-negative deltas never
    /// decreases the counter, and the final count is the saturating sum.
    #[test]
    fn prop_tracker_is_monotonic(deltas in prop::collection::vec(0i64..=1_000_000, 0..50)) {
        let mut tracker = TokenTracker::new();
        let mut previous = 0u64;
        for delta in &deltas {
            let total = tracker.record(*delta).unwrap();
            prop_assert!(total >= previous);
            previous = total;
        }
        let expected: u64 = deltas.iter().map(|d| u64::try_from(*d).unwrap()).sum();
        prop_assert_eq!(tracker.current(), expected);
    }

    /// Property: a negative delta always fails and leaves the counter alone.
    #[test]
    fn prop_negative_delta_rejected(initial in 0i64..=1_000_000, bad in i64::MIN..0) {
        let mut tracker = TokenTracker::new();
        tracker.record(initial).unwrap();
        let before = tracker.current();
        prop_assert!(tracker.record(bad).is_err());
        prop_assert_eq!(tracker.current(), before);
    }

    /// Property: the first due call returns every guideline, sorted by tier
    /// descending with ties broken by id ascending.
    #[test]
    fn prop_first_due_returns_all_in_order(tiers in prop::collection::vec(1u8..=10, 1..20)) {
        let mut store = store_with_tiers(&tiers);
        let intervals = TierIntervals::default();

        let due = scheduler::due(&mut store, 0, &intervals);
        prop_assert_eq!(due.len(), tiers.len());
        for pair in due.windows(2) {
            let ordered = pair[0].priority_tier > pair[1].priority_tier
                || (pair[0].priority_tier == pair[1].priority_tier && pair[0].id < pair[1].id);
            prop_assert!(ordered, "unsorted pair: {} then {}", pair[0].id, pair[1].id);
        }
    }

    /// Property: immediately re-running the scheduler at the same count
    /// returns only always-visible guidelines.
    #[test]
    fn prop_second_due_is_always_visible_only(
        tiers in prop::collection::vec(1u8..=10, 1..20),
        now in 0u64..=100_000,
    ) {
        let mut store = store_with_tiers(&tiers);
        let intervals = TierIntervals::default();

        scheduler::due(&mut store, now, &intervals);
        let second = scheduler::due(&mut store, now, &intervals);
        prop_assert!(second.iter().all(Guideline::is_always_visible));
    }

    /// Property: preview never changes what a later due call returns.
    #[test]
    fn prop_preview_is_non_mutating(
        tiers in prop::collection::vec(1u8..=10, 1..20),
        now in 0u64..=100_000,
        previews in 1usize..5,
    ) {
        let intervals = TierIntervals::default();
        let mut with_preview = store_with_tiers(&tiers);
        let mut without_preview = store_with_tiers(&tiers);

        for _ in 0..previews {
            scheduler::preview(&with_preview, now, &intervals);
        }

        let a: Vec<String> = scheduler::due(&mut with_preview, now, &intervals)
            .into_iter()
            .map(|g| g.id)
            .collect();
        let b: Vec<String> = scheduler::due(&mut without_preview, now, &intervals)
            .into_iter()
            .map(|g| g.id)
            .collect();
        prop_assert_eq!(a, b);
    }

    /// Property: a guideline shown at count `n` becomes due again exactly at
    /// `n + interval`, never before.
    #[test]
    fn prop_inclusive_threshold(
        tier in 1u8..=9,
        shown_at in 0u64..=50_000,
    ) {
        let intervals = TierIntervals::default();
        let interval = intervals.for_tier(tier);
        let mut store = store_with_tiers(&[tier]);

        scheduler::due(&mut store, shown_at, &intervals);
        let just_before = scheduler::due(&mut store, shown_at + interval - 1, &intervals);
        prop_assert!(just_before.is_empty());

        // Re-mark state is untouched by the miss, so the boundary hits.
        let at_boundary = scheduler::due(&mut store, shown_at + interval, &intervals);
        prop_assert_eq!(at_boundary.len(), 1);
    }

    /// Property: guideline construction accepts exactly tiers 1-10.
    #[test]
    fn prop_tier_validation(tier in 0u8..=255) {
        let result = Guideline::new("id", "content", tier, None);
        prop_assert_eq!(result.is_ok(), (1..=10).contains(&tier));
    }

    /// Property: `for_tier` maps every valid tier into one of the three
    /// configured bands.
    #[test]
    fn prop_tier_bands(tier in 1u8..=10, high in 1u64..10_000, normal in 1u64..10_000, low in 1u64..10_000) {
        let intervals = TierIntervals { high, normal, low };
        let expected = match tier {
            8..=10 => high,
            5..=7 => normal,
            _ => low,
        };
        prop_assert_eq!(intervals.for_tier(tier), expected);
    }
}
