//! Guideline model and tier semantics.

use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Tier at or above which a guideline is included in every scheduling pass.
pub const ALWAYS_VISIBLE_TIER: u8 = 10;

/// Default repeat intervals per priority band, in tokens.
///
/// Tiers at or above [`ALWAYS_VISIBLE_TIER`] are never throttled and have no
/// interval. The three bands below it map to `high` (8-9), `normal` (5-7),
/// and `low` (1-4). All values are overridable through configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TierIntervals {
    /// Interval for tiers 8-9.
    pub high: u64,
    /// Interval for tiers 5-7.
    pub normal: u64,
    /// Interval for tiers 1-4.
    pub low: u64,
}

impl Default for TierIntervals {
    fn default() -> Self {
        Self {
            high: 3000,
            normal: 5000,
            low: 8000,
        }
    }
}

impl TierIntervals {
    /// Returns the default repeat interval for a throttled tier.
    ///
    /// Callers are expected to handle always-visible tiers before consulting
    /// this mapping; for robustness a tier of 10 or above falls into the
    /// `high` band.
    #[must_use]
    pub const fn for_tier(&self, tier: u8) -> u64 {
        match tier {
            8.. => self.high,
            5..=7 => self.normal,
            _ => self.low,
        }
    }
}

/// A reminder unit with a priority tier and a token-based repeat interval.
///
/// Guidelines are created by the directory loader or the `add_guideline`
/// tool, mutated only by the scheduler (last-shown marker) and explicit
/// edit/remove calls, and destroyed on explicit remove.
#[derive(Debug, Clone, Serialize)]
pub struct Guideline {
    /// Unique key, stable for the process lifetime.
    pub id: String,
    /// Text payload to re-surface.
    pub content: String,
    /// Priority tier, 1-10. 8-10 frequent, 5-7 normal, 1-4 low.
    pub priority_tier: u8,
    /// Per-guideline interval override. `None` derives from the tier.
    pub repeat_after_tokens: Option<u64>,
    /// Token count at the moment this guideline was last surfaced.
    pub last_shown_token_count: Option<u64>,
    /// When the guideline was created.
    pub created_at: DateTime<Utc>,
}

impl Guideline {
    /// Creates a validated guideline.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if the id or content is empty, the tier is
    /// outside 1-10, or the interval override is zero.
    pub fn new(
        id: impl Into<String>,
        content: impl Into<String>,
        priority_tier: u8,
        repeat_after_tokens: Option<u64>,
    ) -> Result<Self> {
        let id = id.into();
        let content = content.into();

        if id.trim().is_empty() {
            return Err(Error::InvalidArgument(
                "guideline id must not be empty".to_string(),
            ));
        }
        if content.is_empty() {
            return Err(Error::InvalidArgument(format!(
                "guideline '{id}' has empty content"
            )));
        }
        if !(1..=10).contains(&priority_tier) {
            return Err(Error::InvalidArgument(format!(
                "priority tier must be 1-10, got {priority_tier}"
            )));
        }
        if repeat_after_tokens == Some(0) {
            return Err(Error::InvalidArgument(format!(
                "repeat_after_tokens for '{id}' must be greater than zero"
            )));
        }

        Ok(Self {
            id,
            content,
            priority_tier,
            repeat_after_tokens,
            last_shown_token_count: None,
            created_at: Utc::now(),
        })
    }

    /// Returns true if this guideline is included in every scheduling pass.
    #[must_use]
    pub const fn is_always_visible(&self) -> bool {
        self.priority_tier >= ALWAYS_VISIBLE_TIER
    }

    /// Resolves the effective repeat interval in tokens.
    ///
    /// Returns `None` for always-visible guidelines: they are never
    /// throttled, even when an explicit override was supplied.
    #[must_use]
    pub const fn effective_interval(&self, intervals: &TierIntervals) -> Option<u64> {
        if self.is_always_visible() {
            return None;
        }
        match self.repeat_after_tokens {
            Some(tokens) => Some(tokens),
            None => Some(intervals.for_tier(self.priority_tier)),
        }
    }
}
