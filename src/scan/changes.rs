//! Change detection: re-hash every baseline entry and compare.

use super::{PathList, ScanContext};
use crate::error::ScanResult;
use crate::tracking::{Manifest, WorkingManifest};
use crate::utils::thread_pool::WorkerPool;
use std::path::PathBuf;
use tracing::{debug, trace};

/// Outcome of the change detection phase
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ChangeSet {
    /// Baseline entries whose content digest no longer matches
    pub modified: Vec<PathBuf>,
    /// Baseline entries with no readable regular file behind them
    pub deleted: Vec<PathBuf>,
}

/// Re-hash every path recorded in `baseline`.
///
/// Deleted paths are removed from `working`; modified paths get their new
/// digest recorded in it. Unchanged entries are left alone. Each baseline
/// path is claimed by exactly one worker, so no two workers ever touch the
/// same working entry.
///
/// # Errors
///
/// Returns the first permission or I/O failure hit by any worker; the
/// working manifest must then be discarded.
pub fn detect_changes(
    context: &ScanContext,
    pool: &WorkerPool,
    baseline: &Manifest,
    working: &WorkingManifest,
) -> ScanResult<ChangeSet> {
    let modified = PathList::default();
    let deleted = PathList::default();

    debug!(entries = baseline.len(), "checking recorded files");

    pool.run(baseline.iter().collect(), |(path, recorded)| {
        match context.digest(path)? {
            None => {
                trace!(path = %path.display(), "deleted");
                working.remove(path);
                deleted.push(path.to_path_buf());
            }
            Some(current) if current != *recorded => {
                trace!(path = %path.display(), "modified");
                working.insert(path.to_path_buf(), current);
                modified.push(path.to_path_buf());
            }
            Some(_) => {}
        }
        Ok(())
    })?;

    Ok(ChangeSet {
        modified: modified.into_sorted(),
        deleted: deleted.into_sorted(),
    })
}
