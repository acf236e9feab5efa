//! Session-scoped conversation state.
//!
//! The token tracker and the guideline store have one logical owner per
//! session. Both live inside [`SessionState`], which is passed explicitly
//! into scheduler calls rather than held as ambient globals.

use crate::store::GuidelineStore;
use crate::{Error, Result};

/// Monotonic counter of tokens consumed by the conversation.
#[derive(Debug, Default)]
pub struct TokenTracker {
    cumulative: u64,
}

impl TokenTracker {
    /// Creates a tracker starting at zero.
    #[must_use]
    pub const fn new() -> Self {
        Self { cumulative: 0 }
    }

    /// Adds a token delta and returns the new total.
    ///
    /// The delta arrives signed from the wire; negative values are rejected
    /// and leave the counter unchanged.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if `delta` is negative.
    pub fn record(&mut self, delta: i64) -> Result<u64> {
        let delta = u64::try_from(delta).map_err(|_| {
            Error::InvalidArgument(format!("token delta must be non-negative, got {delta}"))
        })?;
        self.cumulative = self.cumulative.saturating_add(delta);
        Ok(self.cumulative)
    }

    /// Returns the cumulative token count.
    #[must_use]
    pub const fn current(&self) -> u64 {
        self.cumulative
    }

    /// Resets the counter to zero.
    ///
    /// Only reachable from an explicit new-session boundary, never from
    /// normal tool calls.
    pub const fn reset(&mut self) {
        self.cumulative = 0;
    }
}

/// Conversation state owned by a single session.
#[derive(Debug, Default)]
pub struct SessionState {
    /// Cumulative token counter.
    pub tracker: TokenTracker,
    /// Guidelines and their repetition state.
    pub store: GuidelineStore,
}

impl SessionState {
    /// Creates empty session state.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            tracker: TokenTracker::new(),
            store: GuidelineStore::new(),
        }
    }

    /// Creates session state with a pre-populated store.
    #[must_use]
    pub const fn with_store(store: GuidelineStore) -> Self {
        Self {
            tracker: TokenTracker::new(),
            store,
        }
    }

    /// Starts a new session.
    ///
    /// Resets the token counter and clears last-shown markers, so every
    /// guideline is surfaced on the first scheduling pass of the new
    /// session. Guideline definitions are kept.
    pub fn reset_session(&mut self) {
        self.tracker.reset();
        self.store.clear_shown_markers();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Guideline;

    #[test]
    fn test_record_accumulates() {
        let mut tracker = TokenTracker::new();
        assert_eq!(tracker.record(100).unwrap(), 100);
        assert_eq!(tracker.record(0).unwrap(), 100);
        assert_eq!(tracker.record(250).unwrap(), 350);
        assert_eq!(tracker.current(), 350);
    }

    #[test]
    fn test_record_rejects_negative_and_leaves_total_unchanged() {
        let mut tracker = TokenTracker::new();
        tracker.record(500).unwrap();

        let result = tracker.record(-1);
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
        assert_eq!(tracker.current(), 500);
    }

    #[test]
    fn test_reset() {
        let mut tracker = TokenTracker::new();
        tracker.record(999).unwrap();
        tracker.reset();
        assert_eq!(tracker.current(), 0);
    }

    #[test]
    fn test_session_reset_clears_markers_and_counter() {
        let mut session = SessionState::new();
        session
            .store
            .add(Guideline::new("a", "content", 5, None).unwrap())
            .unwrap();
        session.tracker.record(4000).unwrap();
        session.store.mark_shown("a", 4000).unwrap();

        session.reset_session();

        assert_eq!(session.tracker.current(), 0);
        assert_eq!(session.store.get("a").unwrap().last_shown_token_count, None);
        // Definition survives the reset.
        assert!(session.store.contains("a"));
    }
}
