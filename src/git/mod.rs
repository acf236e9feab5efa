//! Git status caching.
//!
//! [`GitStatusCache`] serves a time-boxed repository snapshot. A dedicated
//! background worker refreshes it on a fixed cadence; callers on the tool
//! path never poll the repository themselves. A forced refresh blocks with a
//! bounded timeout, after which the previous snapshot is returned tagged
//! stale rather than hanging the caller.

mod poller;

pub use poller::poll_repository;

use crate::models::GitSnapshot;
use std::path::PathBuf;
use std::sync::mpsc::{self, RecvTimeoutError, SyncSender};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

/// Timing settings for the snapshot cache.
#[derive(Debug, Clone, Copy)]
pub struct GitPollSettings {
    /// Age after which a cached snapshot is considered stale.
    pub ttl: Duration,
    /// Cadence of the background refresh worker.
    pub cadence: Duration,
    /// Maximum time a forced refresh may block.
    pub refresh_timeout: Duration,
}

impl Default for GitPollSettings {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(30),
            cadence: Duration::from_secs(30),
            refresh_timeout: Duration::from_secs(5),
        }
    }
}

/// Snapshot producer used by the cache worker.
///
/// Production code polls the repository via libgit2; tests inject
/// counting or blocking functions.
pub type PollFn = Box<dyn Fn() -> GitSnapshot + Send + 'static>;

/// Commands accepted by the refresh worker.
enum Command {
    /// Refresh now; reply on the channel when the snapshot is replaced.
    Refresh(SyncSender<()>),
    /// Stop the worker.
    Shutdown,
}

struct CachedSnapshot {
    snapshot: GitSnapshot,
    taken: Instant,
}

/// Time-boxed cache of a repository snapshot.
///
/// The cached snapshot is replaced wholesale on each refresh, so readers
/// never observe a half-updated value.
pub struct GitStatusCache {
    cached: Arc<Mutex<CachedSnapshot>>,
    settings: GitPollSettings,
    commands: mpsc::Sender<Command>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl GitStatusCache {
    /// Creates a cache polling the repository at `repo_path`.
    ///
    /// Performs an initial synchronous poll so the first read has data,
    /// then starts the background worker.
    #[must_use]
    pub fn new(repo_path: PathBuf, settings: GitPollSettings) -> Self {
        Self::with_poll_fn(Box::new(move || poll_repository(&repo_path)), settings)
    }

    /// Creates a cache with an injected poll function.
    #[must_use]
    pub fn with_poll_fn(poll: PollFn, settings: GitPollSettings) -> Self {
        let cached = Arc::new(Mutex::new(CachedSnapshot {
            snapshot: poll(),
            taken: Instant::now(),
        }));

        let (commands, receiver) = mpsc::channel::<Command>();
        let worker_cache = Arc::clone(&cached);
        let cadence = settings.cadence;

        let worker = std::thread::spawn(move || {
            loop {
                match receiver.recv_timeout(cadence) {
                    Ok(Command::Refresh(reply)) => {
                        refresh(&worker_cache, &poll);
                        // Caller may have timed out and gone away.
                        let _ = reply.try_send(());
                    },
                    Err(RecvTimeoutError::Timeout) => {
                        refresh(&worker_cache, &poll);
                    },
                    Ok(Command::Shutdown) | Err(RecvTimeoutError::Disconnected) => break,
                }
            }
        });

        Self {
            cached,
            settings,
            commands,
            worker: Mutex::new(Some(worker)),
        }
    }

    /// Returns the current snapshot.
    ///
    /// Within the TTL window the cached snapshot is returned as-is. When
    /// forced or past the TTL, this blocks on a fresh poll, bounded by the
    /// refresh timeout; on timeout the previous snapshot is returned tagged
    /// stale.
    #[must_use]
    pub fn get(&self, force_refresh: bool) -> GitSnapshot {
        let (snapshot, age) = {
            let cached = lock(&self.cached);
            (cached.snapshot.clone(), cached.taken.elapsed())
        };

        if !force_refresh && age <= self.settings.ttl {
            return snapshot;
        }

        let (reply, replies) = mpsc::sync_channel(1);
        if self.commands.send(Command::Refresh(reply)).is_err() {
            // Worker already stopped; best effort.
            return snapshot.tagged_stale();
        }

        match replies.recv_timeout(self.settings.refresh_timeout) {
            Ok(()) => lock(&self.cached).snapshot.clone(),
            Err(_) => {
                tracing::warn!(
                    timeout = ?self.settings.refresh_timeout,
                    "Git refresh timed out, serving previous snapshot"
                );
                metrics::counter!("git_refresh_timeouts_total").increment(1);
                snapshot.tagged_stale()
            },
        }
    }

    /// Stops the background worker and waits for it to exit.
    ///
    /// An in-flight forced refresh is abandoned, not awaited. Idempotent.
    pub fn stop(&self) {
        let _ = self.commands.send(Command::Shutdown);
        let handle = lock(&self.worker).take();
        if let Some(handle) = handle {
            let _ = handle.join();
        }
    }
}

impl Drop for GitStatusCache {
    fn drop(&mut self) {
        self.stop();
    }
}

fn refresh(cached: &Arc<Mutex<CachedSnapshot>>, poll: &PollFn) {
    let snapshot = poll();
    let mut guard = lock(cached);
    guard.snapshot = snapshot;
    guard.taken = Instant::now();
}

/// Acquires a mutex with poison recovery.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SnapshotStatus;
    use chrono::Utc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn stamped(counter: usize) -> GitSnapshot {
        GitSnapshot {
            branch: Some("main".to_string()),
            last_commit_summary: Some(format!("poll-{counter}")),
            status: SnapshotStatus::Fresh,
            ahead: 0,
            behind: 0,
            uncommitted_count: 0,
            untracked_count: 0,
            insertions: 0,
            deletions: 0,
            recent_commits: Vec::new(),
            stash_count: 0,
            captured_at: Utc::now(),
        }
    }

    fn counting_cache(settings: GitPollSettings) -> (GitStatusCache, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_in_poll = Arc::clone(&calls);
        let cache = GitStatusCache::with_poll_fn(
            Box::new(move || stamped(calls_in_poll.fetch_add(1, Ordering::SeqCst))),
            settings,
        );
        (cache, calls)
    }

    fn long_settings() -> GitPollSettings {
        GitPollSettings {
            ttl: Duration::from_secs(600),
            cadence: Duration::from_secs(600),
            refresh_timeout: Duration::from_secs(2),
        }
    }

    #[test]
    fn test_get_within_ttl_serves_cached_snapshot() {
        let (cache, calls) = counting_cache(long_settings());

        let first = cache.get(false);
        let second = cache.get(false);

        assert_eq!(first, second);
        // Only the initial synchronous poll ran.
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        cache.stop();
    }

    #[test]
    fn test_force_refresh_advances_snapshot() {
        let (cache, calls) = counting_cache(long_settings());

        let before = cache.get(false);
        let after = cache.get(true);

        assert_ne!(
            before.last_commit_summary,
            after.last_commit_summary,
            "forced refresh must produce a new snapshot"
        );
        assert_eq!(after.status, SnapshotStatus::Fresh);
        assert!(calls.load(Ordering::SeqCst) >= 2);
        cache.stop();
    }

    #[test]
    fn test_stale_after_ttl_triggers_refresh() {
        let settings = GitPollSettings {
            ttl: Duration::from_millis(10),
            cadence: Duration::from_secs(600),
            refresh_timeout: Duration::from_secs(2),
        };
        let (cache, calls) = counting_cache(settings);

        std::thread::sleep(Duration::from_millis(30));
        let snap = cache.get(false);

        assert_eq!(snap.status, SnapshotStatus::Fresh);
        assert!(calls.load(Ordering::SeqCst) >= 2);
        cache.stop();
    }

    #[test]
    fn test_refresh_timeout_returns_previous_tagged_stale() {
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_in_poll = Arc::clone(&calls);
        let cache = GitStatusCache::with_poll_fn(
            Box::new(move || {
                let n = calls_in_poll.fetch_add(1, Ordering::SeqCst);
                if n > 0 {
                    // Subsequent polls exceed the refresh timeout.
                    std::thread::sleep(Duration::from_millis(250));
                }
                stamped(n)
            }),
            GitPollSettings {
                ttl: Duration::from_secs(600),
                cadence: Duration::from_secs(600),
                refresh_timeout: Duration::from_millis(50),
            },
        );

        let snap = cache.get(true);
        assert_eq!(snap.status, SnapshotStatus::Stale);
        assert_eq!(snap.last_commit_summary.as_deref(), Some("poll-0"));
        cache.stop();
    }

    #[test]
    fn test_background_cadence_refreshes() {
        let settings = GitPollSettings {
            ttl: Duration::from_secs(600),
            cadence: Duration::from_millis(20),
            refresh_timeout: Duration::from_secs(2),
        };
        let (cache, calls) = counting_cache(settings);

        std::thread::sleep(Duration::from_millis(200));

        assert!(
            calls.load(Ordering::SeqCst) >= 3,
            "worker should have polled on its cadence"
        );
        // The cached snapshot advanced without any forced refresh.
        assert_ne!(
            cache.get(false).last_commit_summary.as_deref(),
            Some("poll-0")
        );
        cache.stop();
    }

    #[test]
    fn test_stop_is_idempotent_and_joins_worker() {
        let (cache, _calls) = counting_cache(long_settings());
        cache.stop();
        cache.stop();

        // After shutdown a forced refresh degrades to a stale tag.
        assert_eq!(cache.get(true).status, SnapshotStatus::Stale);
    }
}
