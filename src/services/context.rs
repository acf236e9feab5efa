//! Context composition service.
//!
//! [`ContextService`] is the single logical owner of a session: it holds the
//! token tracker and guideline store behind one lock, the git status cache
//! beside them, and assembles the payload the host assistant receives.
//! Composition itself has no decision logic; it sequences the scheduler and
//! the snapshot cache and formats their output.

use crate::config::RecueConfig;
use crate::git::GitStatusCache;
use crate::loader;
use crate::models::{GitSnapshot, Guideline, TierIntervals};
use crate::scheduler;
use crate::session::SessionState;
use crate::store::GuidelineStore;
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Ordered output payload for the host assistant.
#[derive(Debug, Clone, Serialize)]
pub struct ComposedContext {
    /// Rendered markdown: due guidelines in scheduler order, then the
    /// repository summary.
    pub rendered: String,
    /// Ids of the guidelines included, in scheduler order.
    pub due_ids: Vec<String>,
    /// Token count the payload was composed at.
    pub token_count: u64,
    /// When the payload was composed.
    pub composed_at: DateTime<Utc>,
}

/// Upcoming repetition for a single guideline.
#[derive(Debug, Clone, Serialize)]
pub struct NextRepetition {
    /// Guideline id.
    pub id: String,
    /// Tokens remaining until the guideline is due again.
    pub tokens_until_repeat: u64,
    /// Priority tier.
    pub priority: u8,
}

/// Read-only dump of session state and the repetition schedule.
#[derive(Debug, Clone, Serialize)]
pub struct ContextSummary {
    /// Number of guidelines in the store.
    pub total_guidelines: usize,
    /// Cumulative token count.
    pub current_token_count: u64,
    /// Ids that a `due` call would return right now.
    pub due_now: Vec<String>,
    /// Guidelines not yet due, soonest first.
    pub next_repetitions: Vec<NextRepetition>,
}

/// Session-scoped service wiring the store, tracker, scheduler, and git
/// cache together.
pub struct ContextService {
    session: Mutex<SessionState>,
    git: GitStatusCache,
    intervals: TierIntervals,
    guidelines_dir: Option<PathBuf>,
    last_compose: Mutex<Option<ComposedContext>>,
}

impl ContextService {
    /// Creates a service from configuration.
    ///
    /// Loads guidelines from the configured directory and starts the git
    /// poll worker against the configured repository.
    ///
    /// # Errors
    ///
    /// Returns an error if the guidelines directory cannot be read.
    pub fn new(config: &RecueConfig) -> Result<Self> {
        let mut store = GuidelineStore::new();
        for guideline in loader::load_guidelines(&config.guidelines_dir)? {
            store.add(guideline)?;
        }

        let git = GitStatusCache::new(config.repo_path.clone(), config.git);

        Ok(Self {
            session: Mutex::new(SessionState::with_store(store)),
            git,
            intervals: config.intervals,
            guidelines_dir: Some(config.guidelines_dir.clone()),
            last_compose: Mutex::new(None),
        })
    }

    /// Creates a service from pre-built parts. Test seam.
    #[must_use]
    pub fn with_parts(
        session: SessionState,
        git: GitStatusCache,
        intervals: TierIntervals,
        guidelines_dir: Option<PathBuf>,
    ) -> Self {
        Self {
            session: Mutex::new(session),
            git,
            intervals,
            guidelines_dir,
            last_compose: Mutex::new(None),
        }
    }

    /// Adds a guideline at runtime.
    ///
    /// The guideline is persisted to the guidelines directory as `{id}.md`
    /// (best effort) so it survives restarts.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for a malformed guideline or `DuplicateId`
    /// if the id is taken. A failed add leaves everything unchanged.
    pub fn add_guideline(
        &self,
        id: &str,
        content: &str,
        priority_tier: Option<u8>,
        repeat_after_tokens: Option<u64>,
    ) -> Result<Guideline> {
        let guideline = Guideline::new(
            id,
            content,
            priority_tier.unwrap_or(5),
            repeat_after_tokens,
        )?;
        let stored = guideline.clone();

        lock(&self.session).store.add(guideline)?;
        self.persist_guideline(&stored);
        tracing::info!(id = %stored.id, tier = stored.priority_tier, "Added guideline");
        Ok(stored)
    }

    /// Removes a guideline and its backing file, if any.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the id is absent.
    pub fn remove_guideline(&self, id: &str) -> Result<()> {
        lock(&self.session).store.remove(id)?;

        if let Some(dir) = &self.guidelines_dir {
            let path = dir.join(format!("{id}.md"));
            if path.exists() {
                if let Err(e) = std::fs::remove_file(&path) {
                    tracing::warn!(file = %path.display(), error = %e, "Failed to delete guideline file");
                }
            }
        }
        tracing::info!(id, "Removed guideline");
        Ok(())
    }

    /// Returns a guideline by id.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the id is absent.
    pub fn guideline(&self, id: &str) -> Result<Guideline> {
        lock(&self.session)
            .store
            .get(id)
            .cloned()
            .ok_or_else(|| Error::NotFound { id: id.to_string() })
    }

    /// Returns all guidelines in insertion order.
    #[must_use]
    pub fn list_guidelines(&self) -> Vec<Guideline> {
        lock(&self.session).store.list_all().to_vec()
    }

    /// Records a token delta and composes the resulting payload.
    ///
    /// Every tracked exchange re-runs the scheduler, so due guidelines ride
    /// back to the host on the same response.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for a negative delta; the counter and all
    /// markers are left unchanged.
    pub fn track_tokens(&self, delta: i64) -> Result<ComposedContext> {
        let mut session = lock(&self.session);
        let total = session.tracker.record(delta)?;
        tracing::debug!(delta, total, "Tracked tokens");
        Ok(self.compose_locked(&mut session))
    }

    /// Composes the payload at the current token count.
    #[must_use]
    pub fn compose(&self) -> ComposedContext {
        let mut session = lock(&self.session);
        self.compose_locked(&mut session)
    }

    /// Returns the result of the most recent compose, if any.
    #[must_use]
    pub fn last_composed(&self) -> Option<ComposedContext> {
        lock(&self.last_compose).clone()
    }

    /// Builds the non-mutating summary of all guidelines and their
    /// repetition schedule.
    #[must_use]
    pub fn summary(&self) -> ContextSummary {
        let session = lock(&self.session);
        let now = session.tracker.current();
        let states = scheduler::preview(&session.store, now, &self.intervals);

        let due_now: Vec<String> = states
            .iter()
            .filter(|s| s.due_now)
            .map(|s| s.id.clone())
            .collect();

        let mut next_repetitions: Vec<NextRepetition> = states
            .iter()
            .filter_map(|s| {
                s.tokens_until_due.map(|tokens| NextRepetition {
                    id: s.id.clone(),
                    tokens_until_repeat: tokens,
                    priority: s.priority_tier,
                })
            })
            .collect();
        next_repetitions.sort_by(|a, b| {
            a.tokens_until_repeat
                .cmp(&b.tokens_until_repeat)
                .then_with(|| a.id.cmp(&b.id))
        });

        ContextSummary {
            total_guidelines: session.store.len(),
            current_token_count: now,
            due_now,
            next_repetitions,
        }
    }

    /// Returns the current git snapshot, honoring the TTL.
    #[must_use]
    pub fn git_snapshot(&self) -> GitSnapshot {
        self.git.get(false)
    }

    /// Forces a git refresh, bounded by the refresh timeout.
    #[must_use]
    pub fn force_refresh(&self) -> GitSnapshot {
        self.git.get(true)
    }

    /// Starts a new session: zero token counter, cleared markers.
    pub fn reset_session(&self) {
        lock(&self.session).reset_session();
        tracing::info!("Session reset");
    }

    /// Stops the git poll worker. Idempotent; also run on drop.
    pub fn shutdown(&self) {
        self.git.stop();
    }

    fn compose_locked(&self, session: &mut MutexGuard<'_, SessionState>) -> ComposedContext {
        let now = session.tracker.current();
        let due = scheduler::due(&mut session.store, now, &self.intervals);
        let snapshot = self.git.get(false);

        let composed = ComposedContext {
            rendered: render(&due, &snapshot),
            due_ids: due.iter().map(|g| g.id.clone()).collect(),
            token_count: now,
            composed_at: Utc::now(),
        };

        *lock(&self.last_compose) = Some(composed.clone());
        composed
    }

    fn persist_guideline(&self, guideline: &Guideline) {
        let Some(dir) = &self.guidelines_dir else {
            return;
        };
        if let Err(e) = std::fs::create_dir_all(dir) {
            tracing::warn!(dir = %dir.display(), error = %e, "Failed to create guidelines directory");
            return;
        }
        let path = dir.join(format!("{}.md", guideline.id));
        if let Err(e) = std::fs::write(&path, &guideline.content) {
            tracing::warn!(file = %path.display(), error = %e, "Failed to persist guideline");
        }
    }
}

fn render(due: &[Guideline], snapshot: &GitSnapshot) -> String {
    let mut sections: Vec<String> = due
        .iter()
        .map(|g| {
            format!(
                "# {} (priority {})\n\n{}",
                g.id,
                g.priority_tier,
                g.content.trim_end()
            )
        })
        .collect();

    if sections.is_empty() {
        sections.push("_No guidelines due at this point._".to_string());
    }

    sections.push(format!(
        "## Repository status\n\n{}",
        snapshot.summary_markdown()
    ));

    sections.join("\n\n---\n\n")
}

/// Acquires a mutex with poison recovery.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
