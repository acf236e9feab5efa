//! Repository polling via libgit2.

use crate::models::{GitSnapshot, SnapshotStatus};
use chrono::Utc;
use git2::{Repository, StatusOptions};
use std::path::Path;

/// Number of recent commits included in a snapshot.
const RECENT_COMMIT_COUNT: usize = 5;

/// Captures a fresh snapshot of the repository at `path`.
///
/// Never fails: a missing repository or any libgit2 error produces a
/// snapshot with [`SnapshotStatus::Unavailable`] carrying the reason.
#[must_use]
pub fn poll_repository(path: &Path) -> GitSnapshot {
    let mut repo = match Repository::discover(path) {
        Ok(repo) => repo,
        Err(e) => return GitSnapshot::unavailable(e.message().to_string()),
    };

    let branch = detect_branch(&repo);
    let (ahead, behind) = detect_ahead_behind(&repo);
    let (uncommitted_count, untracked_count) = count_changes(&repo);
    let (insertions, deletions) = diff_stats(&repo);
    let last_commit_summary = detect_last_commit(&repo);
    let recent_commits = collect_recent_commits(&repo);
    let stash_count = count_stashes(&mut repo);

    GitSnapshot {
        branch,
        ahead,
        behind,
        uncommitted_count,
        untracked_count,
        insertions,
        deletions,
        last_commit_summary,
        recent_commits,
        stash_count,
        captured_at: Utc::now(),
        status: SnapshotStatus::Fresh,
    }
}

fn detect_branch(repo: &Repository) -> Option<String> {
    let head = repo.head().ok()?;
    if head.is_branch() {
        head.shorthand().map(String::from)
    } else {
        None
    }
}

fn detect_ahead_behind(repo: &Repository) -> (usize, usize) {
    let Ok(head) = repo.head() else {
        return (0, 0);
    };
    if !head.is_branch() {
        return (0, 0);
    }
    let Some(local) = head.target() else {
        return (0, 0);
    };
    let upstream = git2::Branch::wrap(head)
        .upstream()
        .ok()
        .and_then(|u| u.get().target());
    let Some(upstream) = upstream else {
        return (0, 0);
    };
    repo.graph_ahead_behind(local, upstream).unwrap_or((0, 0))
}

fn count_changes(repo: &Repository) -> (usize, usize) {
    let mut options = StatusOptions::new();
    options.include_untracked(true).include_ignored(false);

    let Ok(statuses) = repo.statuses(Some(&mut options)) else {
        return (0, 0);
    };

    let mut uncommitted = 0;
    let mut untracked = 0;
    for entry in statuses.iter() {
        if entry.status().contains(git2::Status::WT_NEW) {
            untracked += 1;
        } else {
            uncommitted += 1;
        }
    }
    (uncommitted, untracked)
}

/// Line counts across all uncommitted changes, staged and unstaged.
fn diff_stats(repo: &Repository) -> (usize, usize) {
    let head_tree = repo.head().ok().and_then(|h| h.peel_to_tree().ok());
    let Ok(diff) = repo.diff_tree_to_workdir_with_index(head_tree.as_ref(), None) else {
        return (0, 0);
    };
    diff.stats()
        .map_or((0, 0), |stats| (stats.insertions(), stats.deletions()))
}

fn detect_last_commit(repo: &Repository) -> Option<String> {
    let commit = repo.head().ok()?.peel_to_commit().ok()?;
    commit.summary().map(String::from)
}

fn collect_recent_commits(repo: &Repository) -> Vec<String> {
    let Ok(mut revwalk) = repo.revwalk() else {
        return Vec::new();
    };
    if revwalk.push_head().is_err() {
        return Vec::new();
    }

    revwalk
        .filter_map(std::result::Result::ok)
        .take(RECENT_COMMIT_COUNT)
        .filter_map(|oid| {
            let commit = repo.find_commit(oid).ok()?;
            let short: String = oid.to_string().chars().take(7).collect();
            Some(format!("{short} {}", commit.summary().unwrap_or("(no summary)")))
        })
        .collect()
}

fn count_stashes(repo: &mut Repository) -> usize {
    let mut count = 0;
    let _ = repo.stash_foreach(|_, _, _| {
        count += 1;
        true
    });
    count
}
