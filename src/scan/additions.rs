//! Addition scanning: digest every file the working manifest does not know.

use super::{PathList, ScanContext};
use crate::error::{ScanError, ScanResult};
use crate::tracking::{TreeScanner, WorkingManifest};
use crate::utils::thread_pool::WorkerPool;
use std::path::PathBuf;
use tracing::{debug, trace};

/// Enumerate the tree and record every untracked regular file.
///
/// Must run after change detection has finished: membership is tested
/// against `working`, which by then reflects deletions. New digests are
/// inserted into `working`. Returns the added paths, sorted.
///
/// # Errors
///
/// Returns enumeration failures from the scanner, the first hashing
/// failure from any worker, or [`ScanError::Vanished`] if a file listed by
/// the scanner disappeared before it could be hashed.
pub fn scan_additions(
    context: &ScanContext,
    pool: &WorkerPool,
    scanner: &TreeScanner,
    working: &WorkingManifest,
) -> ScanResult<Vec<PathBuf>> {
    let candidates: Vec<PathBuf> = scanner
        .scan_files()?
        .into_iter()
        .filter(|path| !working.contains(path))
        .collect();

    debug!(candidates = candidates.len(), "hashing untracked files");

    let added = PathList::default();
    pool.run(candidates, |path| {
        let Some(digest) = context.digest(&path)? else {
            return Err(ScanError::Vanished { path });
        };
        trace!(path = %path.display(), "added");
        working.insert(path.clone(), digest);
        added.push(path);
        Ok(())
    })?;

    Ok(added.into_sorted())
}
