//! Repository snapshot model.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Freshness of a [`GitSnapshot`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "reason", rename_all = "lowercase")]
pub enum SnapshotStatus {
    /// Captured within the TTL window.
    Fresh,
    /// Served past its TTL or after a refresh timed out. Still usable.
    Stale,
    /// The poll itself failed (not a repository, command unavailable).
    Unavailable(String),
}

/// A cached, time-boxed view of repository state.
///
/// Snapshots are replaced wholesale on each refresh, never partially
/// mutated. Poll failures produce a snapshot with
/// [`SnapshotStatus::Unavailable`] rather than an error, so consumers always
/// have something to show.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GitSnapshot {
    /// Current branch name. `None` for detached HEAD or unborn branches.
    pub branch: Option<String>,
    /// Commits ahead of the upstream branch.
    pub ahead: usize,
    /// Commits behind the upstream branch.
    pub behind: usize,
    /// Staged plus unstaged changes to tracked files.
    pub uncommitted_count: usize,
    /// Untracked files in the working tree.
    pub untracked_count: usize,
    /// Lines added across uncommitted changes.
    pub insertions: usize,
    /// Lines removed across uncommitted changes.
    pub deletions: usize,
    /// Summary line of the most recent commit.
    pub last_commit_summary: Option<String>,
    /// One-line descriptions of the most recent commits, newest first.
    pub recent_commits: Vec<String>,
    /// Number of stash entries.
    pub stash_count: usize,
    /// When the snapshot was captured.
    pub captured_at: DateTime<Utc>,
    /// Freshness of this snapshot.
    pub status: SnapshotStatus,
}

impl GitSnapshot {
    /// Creates a snapshot representing a failed poll.
    #[must_use]
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            branch: None,
            ahead: 0,
            behind: 0,
            uncommitted_count: 0,
            untracked_count: 0,
            insertions: 0,
            deletions: 0,
            last_commit_summary: None,
            recent_commits: Vec::new(),
            stash_count: 0,
            captured_at: Utc::now(),
            status: SnapshotStatus::Unavailable(reason.into()),
        }
    }

    /// Returns a copy tagged as possibly stale.
    ///
    /// An unavailable snapshot keeps its status: staleness would hide the
    /// original failure reason.
    #[must_use]
    pub fn tagged_stale(mut self) -> Self {
        if self.status == SnapshotStatus::Fresh {
            self.status = SnapshotStatus::Stale;
        }
        self
    }

    /// Renders the snapshot as a short markdown summary.
    #[must_use]
    pub fn summary_markdown(&self) -> String {
        if let SnapshotStatus::Unavailable(reason) = &self.status {
            return format!("_Repository status unavailable: {reason}_");
        }

        let mut lines = Vec::new();
        lines.push(format!(
            "- Branch: {}",
            self.branch.as_deref().unwrap_or("(detached)")
        ));
        lines.push(format!(
            "- Ahead/behind upstream: +{}/-{}",
            self.ahead, self.behind
        ));
        lines.push(format!(
            "- Uncommitted changes: {} ({} untracked)",
            self.uncommitted_count, self.untracked_count
        ));
        if self.insertions > 0 || self.deletions > 0 {
            lines.push(format!(
                "- Diff: +{} / -{} lines",
                self.insertions, self.deletions
            ));
        }
        if let Some(summary) = &self.last_commit_summary {
            lines.push(format!("- Last commit: {summary}"));
        }
        if self.stash_count > 0 {
            lines.push(format!("- Stashes: {}", self.stash_count));
        }
        if !self.recent_commits.is_empty() {
            lines.push("- Recent commits:".to_string());
            for commit in &self.recent_commits {
                lines.push(format!("  - {commit}"));
            }
        }
        if self.status == SnapshotStatus::Stale {
            lines.push("- _Snapshot may be stale_".to_string());
        }
        lines.join("\n")
    }
}
