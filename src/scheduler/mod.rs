//! Token-budgeted repetition scheduling.
//!
//! The scheduler is a pure decision function over the guideline store and
//! the current token count. It performs no I/O and cannot fail on its own;
//! the only state it touches is the last-shown marker of the guidelines it
//! returns.
//!
//! Inclusion rules, applied per guideline in insertion order:
//!
//! 1. Always-visible tier (>= 10): included unconditionally. The marker is
//!    still updated, a harmless side effect with no behavioral consequence.
//! 2. Never shown: included, so a newly added guideline is surfaced on the
//!    first pass after being added regardless of the token count.
//! 3. Threshold crossed: `now - last_shown >= interval`, inclusive. A usage
//!    jump larger than the interval cannot silently skip a pass.
//!
//! The returned set is ordered by descending priority tier, then ascending
//! id, which puts always-visible guidelines first and makes repeated calls
//! with identical state produce identical output.

use crate::models::{Guideline, TierIntervals};
use crate::store::GuidelineStore;
use serde::Serialize;
use std::cmp::Reverse;

/// Returns the guidelines due for surfacing at `now_tokens`.
///
/// Marks every returned guideline as shown at `now_tokens`; guidelines not
/// returned are untouched. Calling `due` twice with no intervening token
/// updates returns only the always-visible set on the second call.
pub fn due(
    store: &mut GuidelineStore,
    now_tokens: u64,
    intervals: &TierIntervals,
) -> Vec<Guideline> {
    let mut selected: Vec<Guideline> = store
        .list_all()
        .iter()
        .filter(|g| is_due(g, now_tokens, intervals))
        .cloned()
        .collect();

    selected.sort_by(|a, b| {
        Reverse(a.priority_tier)
            .cmp(&Reverse(b.priority_tier))
            .then_with(|| a.id.cmp(&b.id))
    });

    for guideline in &mut selected {
        guideline.last_shown_token_count = Some(now_tokens);
        // Ids in `selected` came from the store, so this cannot fail.
        let _ = store.mark_shown(&guideline.id, now_tokens);
    }

    selected
}

/// Per-guideline due state, computed without mutating anything.
#[derive(Debug, Clone, Serialize)]
pub struct DuePreview {
    /// Guideline id.
    pub id: String,
    /// Priority tier.
    pub priority_tier: u8,
    /// Whether the guideline would be included in a `due` call right now.
    pub due_now: bool,
    /// Tokens remaining until the guideline becomes due.
    ///
    /// `None` when the guideline is due now or always visible.
    pub tokens_until_due: Option<u64>,
}

/// Computes the due state of every guideline at `now_tokens`.
///
/// This is the non-mutating counterpart of [`due`], used for read-only
/// summaries: last-shown markers are left untouched. Results are in store
/// insertion order.
#[must_use]
pub fn preview(
    store: &GuidelineStore,
    now_tokens: u64,
    intervals: &TierIntervals,
) -> Vec<DuePreview> {
    store
        .list_all()
        .iter()
        .map(|g| {
            let due_now = is_due(g, now_tokens, intervals);
            DuePreview {
                id: g.id.clone(),
                priority_tier: g.priority_tier,
                due_now,
                tokens_until_due: if due_now {
                    None
                } else {
                    tokens_until_due(g, now_tokens, intervals)
                },
            }
        })
        .collect()
}

fn is_due(guideline: &Guideline, now_tokens: u64, intervals: &TierIntervals) -> bool {
    let Some(interval) = guideline.effective_interval(intervals) else {
        return true;
    };
    match guideline.last_shown_token_count {
        None => true,
        // Saturating: a marker from before a session reset must not wrap.
        Some(last) => now_tokens.saturating_sub(last) >= interval,
    }
}

fn tokens_until_due(
    guideline: &Guideline,
    now_tokens: u64,
    intervals: &TierIntervals,
) -> Option<u64> {
    let interval = guideline.effective_interval(intervals)?;
    let last = guideline.last_shown_token_count?;
    // Saturating: a huge interval override must not wrap the due point.
    last.saturating_add(interval).checked_sub(now_tokens)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Guideline;

    fn store_with(guidelines: Vec<Guideline>) -> GuidelineStore {
        let mut store = GuidelineStore::new();
        for g in guidelines {
            store.add(g).unwrap();
        }
        store
    }

    fn ids(guidelines: &[Guideline]) -> Vec<&str> {
        guidelines.iter().map(|g| g.id.as_str()).collect()
    }

    fn g(id: &str, tier: u8) -> Guideline {
        Guideline::new(id, "content", tier, None).unwrap()
    }

    #[test]
    fn test_always_visible_included_at_every_count() {
        let intervals = TierIntervals::default();
        let mut store = store_with(vec![g("a", 10)]);

        for now in [0, 1, 500, 3000, 1_000_000] {
            assert_eq!(ids(&due(&mut store, now, &intervals)), vec!["a"]);
        }
    }

    #[test]
    fn test_first_showing_regardless_of_token_count() {
        let intervals = TierIntervals::default();
        let mut store = store_with(vec![g("late", 1)]);

        // Added deep into the conversation, still surfaced immediately.
        assert_eq!(ids(&due(&mut store, 75_000, &intervals)), vec!["late"]);
    }

    #[test]
    fn test_inclusive_threshold_boundary() {
        let intervals = TierIntervals::default();
        let mut store = store_with(vec![g("b", 8)]);

        // First showing at T=1000.
        assert_eq!(due(&mut store, 1000, &intervals).len(), 1);

        // Absent for all of [T, T+3000).
        assert!(due(&mut store, 1000, &intervals).is_empty());
        assert!(due(&mut store, 3999, &intervals).is_empty());
        // Present at exactly T+3000.
        assert_eq!(ids(&due(&mut store, 4000, &intervals)), vec!["b"]);
    }

    #[test]
    fn test_jump_larger_than_interval_does_not_skip() {
        let intervals = TierIntervals::default();
        let mut store = store_with(vec![g("b", 8)]);

        due(&mut store, 0, &intervals);
        // Usage jumps by far more than the 3000-token interval in one update.
        assert_eq!(ids(&due(&mut store, 50_000, &intervals)), vec!["b"]);
    }

    #[test]
    fn test_due_is_idempotent_without_new_tokens() {
        let intervals = TierIntervals::default();
        let mut store = store_with(vec![g("b", 8), g("c", 5)]);

        assert_eq!(due(&mut store, 100, &intervals).len(), 2);
        // Everything just shown is no longer due.
        assert!(due(&mut store, 100, &intervals).is_empty());
    }

    #[test]
    fn test_mark_shown_only_applied_to_returned_set() {
        let intervals = TierIntervals::default();
        let mut store = store_with(vec![g("b", 8), g("c", 1)]);

        due(&mut store, 0, &intervals);
        // At 3000 only b is due; c's marker must stay at 0.
        assert_eq!(ids(&due(&mut store, 3000, &intervals)), vec!["b"]);
        assert_eq!(store.get("c").unwrap().last_shown_token_count, Some(0));
        assert_eq!(store.get("b").unwrap().last_shown_token_count, Some(3000));
    }

    #[test]
    fn test_ordering_tier_desc_then_id_asc() {
        let intervals = TierIntervals::default();
        let mut store = store_with(vec![g("z", 5), g("m", 10), g("a", 5), g("k", 8)]);

        let result = due(&mut store, 0, &intervals);
        assert_eq!(ids(&result), vec!["m", "k", "a", "z"]);
    }

    #[test]
    fn test_ordering_is_deterministic_across_identical_state() {
        let intervals = TierIntervals::default();
        let mut first = store_with(vec![g("b", 7), g("a", 7), g("c", 9)]);
        let mut second = store_with(vec![g("b", 7), g("a", 7), g("c", 9)]);

        assert_eq!(
            ids(&due(&mut first, 42, &intervals)),
            ids(&due(&mut second, 42, &intervals))
        );
    }

    #[test]
    fn test_spec_scenario_a_b_c() {
        let intervals = TierIntervals::default();
        let mut store = store_with(vec![
            g("A", 10),
            Guideline::new("B", "content", 8, Some(3000)).unwrap(),
            Guideline::new("C", "content", 1, Some(8000)).unwrap(),
        ]);

        // First pass: everything unshown.
        assert_eq!(ids(&due(&mut store, 0, &intervals)), vec!["A", "B", "C"]);
        // Below B's interval: only the always-visible guideline.
        assert_eq!(ids(&due(&mut store, 2999, &intervals)), vec!["A"]);
        // B's threshold is inclusive.
        assert_eq!(ids(&due(&mut store, 3000, &intervals)), vec!["A", "B"]);
        // B's second cycle (6000) already passed; C's first repeat at 8000.
        assert_eq!(ids(&due(&mut store, 8000, &intervals)), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_preview_does_not_mutate() {
        let intervals = TierIntervals::default();
        let mut store = store_with(vec![g("a", 10), g("b", 8)]);
        due(&mut store, 0, &intervals);

        let before: Vec<Option<u64>> = store
            .list_all()
            .iter()
            .map(|g| g.last_shown_token_count)
            .collect();

        let states = preview(&store, 1500, &intervals);

        let after: Vec<Option<u64>> = store
            .list_all()
            .iter()
            .map(|g| g.last_shown_token_count)
            .collect();
        assert_eq!(before, after);

        // a is always visible, b was shown at 0 and has 1500 tokens left.
        assert!(states[0].due_now);
        assert_eq!(states[0].tokens_until_due, None);
        assert!(!states[1].due_now);
        assert_eq!(states[1].tokens_until_due, Some(1500));
    }

    #[test]
    fn test_preview_matches_due_classification() {
        let intervals = TierIntervals::default();
        let mut store = store_with(vec![g("a", 10), g("b", 8), g("c", 1)]);
        due(&mut store, 0, &intervals);

        let states = preview(&store, 3000, &intervals);
        let predicted: Vec<&str> = states
            .iter()
            .filter(|s| s.due_now)
            .map(|s| s.id.as_str())
            .collect();

        let actual = due(&mut store, 3000, &intervals);
        let mut actual_ids = ids(&actual);
        actual_ids.sort_unstable();
        let mut predicted_sorted = predicted;
        predicted_sorted.sort_unstable();
        assert_eq!(predicted_sorted, actual_ids);
    }

    #[test]
    fn test_preview_with_huge_interval_does_not_wrap() {
        let intervals = TierIntervals::default();
        let mut store = store_with(vec![
            Guideline::new("b", "content", 5, Some(u64::MAX)).unwrap(),
        ]);
        due(&mut store, 100, &intervals);

        // The due point saturates instead of wrapping past zero.
        let states = preview(&store, 200, &intervals);
        assert!(!states[0].due_now);
        assert_eq!(states[0].tokens_until_due, Some(u64::MAX - 200));
    }

    #[test]
    fn test_marker_ahead_of_counter_does_not_wrap() {
        let intervals = TierIntervals::default();
        let mut store = store_with(vec![g("b", 8)]);
        // Marker beyond the current counter, as after an external rewind.
        store.mark_shown("b", 10_000).unwrap();

        // saturating_sub keeps the distance at zero: not due.
        assert!(due(&mut store, 500, &intervals).is_empty());
    }
}
