//! Guideline discovery from a directory of markdown files.
//!
//! Filenames carry the priority: `critical_*` files are always visible,
//! `important_*` files repeat frequently, everything else is normal. The
//! mapping is a pure function over the file stem so the rule is testable
//! without touching disk.

use crate::models::Guideline;
use crate::{Error, Result};
use std::path::Path;

/// Maps a guideline key (file stem) to a priority tier.
///
/// `critical_*` -> 10, `important_*` -> 8, anything else -> 5. The scheduler
/// depends on exactly this mapping; the loader applies it before inserting.
#[must_use]
pub fn tier_for_key(key: &str) -> u8 {
    if key.starts_with("critical_") {
        10
    } else if key.starts_with("important_") {
        8
    } else {
        5
    }
}

/// Derives the guideline id for a file stem.
#[must_use]
pub fn guideline_id_for_key(key: &str) -> String {
    format!("guideline_{key}")
}

/// Loads all `*.md` guidelines from a directory.
///
/// Entries are read in filename order so insertion order is deterministic.
/// A missing directory yields an empty set; unreadable files are skipped
/// with a warning rather than failing the whole load.
///
/// # Errors
///
/// Returns `OperationFailed` if the directory itself cannot be listed.
pub fn load_guidelines(dir: &Path) -> Result<Vec<Guideline>> {
    if !dir.is_dir() {
        tracing::debug!(dir = %dir.display(), "Guidelines directory not present");
        return Ok(Vec::new());
    }

    let entries = std::fs::read_dir(dir).map_err(|e| Error::OperationFailed {
        operation: "list_guidelines_dir".to_string(),
        cause: e.to_string(),
    })?;

    let mut paths: Vec<_> = entries
        .filter_map(std::result::Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "md"))
        .collect();
    paths.sort();

    let mut guidelines = Vec::with_capacity(paths.len());
    for path in paths {
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!(file = %path.display(), error = %e, "Skipping unreadable guideline");
                continue;
            },
        };
        if content.is_empty() {
            tracing::warn!(file = %path.display(), "Skipping empty guideline");
            continue;
        }

        let guideline = Guideline::new(
            guideline_id_for_key(stem),
            content,
            tier_for_key(stem),
            None,
        )?;
        tracing::info!(id = %guideline.id, tier = guideline.priority_tier, "Loaded guideline");
        guidelines.push(guideline);
    }

    Ok(guidelines)
}
