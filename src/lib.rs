//! # Recue
//!
//! Token-budgeted guideline reminders and live git status for AI coding
//! assistants.
//!
//! Conversational coding assistants drift away from their instructions as a
//! session grows. Recue counters that by re-surfacing persistent reminders
//! ("guidelines") on a repetition schedule measured in consumed tokens, and
//! by keeping a time-boxed snapshot of the working repository alongside them.
//!
//! ## Features
//!
//! - Repetition scheduler driven by priority tier and per-guideline token
//!   intervals
//! - Guideline discovery from a directory of markdown files, with tiers
//!   inferred from filename prefixes
//! - Background git status polling with TTL, bounded refresh timeout, and
//!   graceful degradation when no repository is present
//! - MCP server over stdio exposing the tool and resource surface
//!
//! ## Example
//!
//! ```rust,ignore
//! use recue::{ContextService, RecueConfig};
//!
//! let service = ContextService::new(&RecueConfig::default())?;
//! let payload = service.track_tokens(1200)?;
//! println!("{}", payload.rendered);
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]
#![allow(clippy::multiple_crate_versions)]

use thiserror::Error as ThisError;

// Module declarations
pub mod config;
pub mod git;
pub mod loader;
pub mod mcp;
pub mod models;
pub mod observability;
pub mod scheduler;
pub mod services;
pub mod session;
pub mod store;

// Re-exports for convenience
pub use config::RecueConfig;
pub use git::{GitPollSettings, GitStatusCache};
pub use models::{GitSnapshot, Guideline, SnapshotStatus, TierIntervals};
pub use scheduler::DuePreview;
pub use services::{ComposedContext, ContextService, ContextSummary};
pub use session::{SessionState, TokenTracker};
pub use store::GuidelineStore;

/// Error type for recue operations.
///
/// Uses `thiserror` for automatic `Display` and `Error` trait implementations.
///
/// # Error Variant Triggers
///
/// | Variant | Raised When |
/// |---------|-------------|
/// | `InvalidArgument` | Negative token delta, priority outside 1-10, empty id |
/// | `DuplicateId` | Adding a guideline whose id is already present |
/// | `NotFound` | Removing, fetching, or marking an unknown guideline |
/// | `Unavailable` | Git snapshot could not be refreshed (non-fatal) |
/// | `OperationFailed` | Filesystem I/O or config parsing fails |
#[derive(Debug, ThisError)]
pub enum Error {
    /// An invalid argument was provided.
    ///
    /// Raised when:
    /// - A token delta is negative
    /// - A priority tier is outside 1-10
    /// - A guideline id or content is empty
    /// - A repeat interval override is zero
    /// - JSON deserialization fails in MCP tool handlers
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A guideline with the same id already exists.
    ///
    /// A failed add leaves the store unchanged.
    #[error("duplicate guideline id: {id}")]
    DuplicateId {
        /// The conflicting guideline id.
        id: String,
    },

    /// A guideline id was not found.
    #[error("guideline not found: {id}")]
    NotFound {
        /// The missing guideline id.
        id: String,
    },

    /// A collaborator is unavailable.
    ///
    /// Raised when a forced git refresh cannot be serviced at all (the
    /// background worker is gone). A merely slow or failed poll degrades to
    /// a stale or unavailable-status snapshot instead of raising.
    #[error("unavailable: {reason}")]
    Unavailable {
        /// Why the collaborator is unavailable.
        reason: String,
    },

    /// An operation failed.
    ///
    /// Raised when:
    /// - Filesystem I/O errors occur (guideline files, config file)
    /// - The config file cannot be parsed
    /// - Writing to stdout fails in the MCP server loop
    #[error("operation '{operation}' failed: {cause}")]
    OperationFailed {
        /// The operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },
}

/// Result type alias for recue operations.
pub type Result<T> = std::result::Result<T, Error>;
