//! Core data models.

mod guideline;
mod snapshot;

pub use guideline::{ALWAYS_VISIBLE_TIER, Guideline, TierIntervals};
pub use snapshot::{GitSnapshot, SnapshotStatus};
