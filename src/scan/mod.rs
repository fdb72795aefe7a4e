//! Scan orchestration.
//!
//! A scan runs in two strictly ordered phases over a working copy of the
//! baseline manifest:
//!
//! 1. [`changes::detect_changes`] re-hashes every recorded path and records
//!    modifications and deletions.
//! 2. [`additions::scan_additions`] walks the tree and hashes every file the
//!    working manifest does not contain yet.
//!
//! Each phase owns its own [`WorkerPool`] run and returns only after every
//! worker has been joined. Nothing touches disk until
//! [`ScanSession::commit`] is called with the resulting [`ScanReport`].

pub mod additions;
pub mod changes;
mod context;

pub use context::{ProgressObserver, ScanContext, is_milestone};

use crate::config::Config;
use crate::error::{ScanError, ScanResult};
use crate::tracking::{Manifest, TreeScanner, WorkingManifest};
use crate::utils::hash::DEFAULT_BUFFER_SIZE;
use crate::utils::thread_pool::{DEFAULT_WORKERS, WorkerPool};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use tracing::{debug, info};

/// Tuning knobs for a scan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanOptions {
    /// Worker pool size for each phase
    pub workers: usize,
    /// Hasher read chunk size in bytes
    pub buffer_size: usize,
    /// Whether enumeration descends into symlinked directories
    pub follow_symlinks: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            buffer_size: DEFAULT_BUFFER_SIZE,
            follow_symlinks: true,
        }
    }
}

impl From<&Config> for ScanOptions {
    fn from(config: &Config) -> Self {
        Self {
            workers: config.scan.workers,
            buffer_size: config.scan.buffer_size,
            follow_symlinks: config.scan.follow_symlinks,
        }
    }
}

/// Result of a completed scan
#[derive(Debug, Clone, Default)]
pub struct ScanReport {
    /// Tracked files whose content changed, sorted
    pub modified: Vec<PathBuf>,
    /// Tracked files that are gone, sorted
    pub deleted: Vec<PathBuf>,
    /// Untracked files found in the tree, sorted
    pub added: Vec<PathBuf>,
    /// Manifest describing the tree as it was observed
    pub manifest: Manifest,
}

impl ScanReport {
    /// Whether anything differs from the baseline
    #[must_use]
    pub fn has_changes(&self) -> bool {
        !(self.modified.is_empty() && self.deleted.is_empty() && self.added.is_empty())
    }

    /// Total number of reported paths
    #[must_use]
    pub fn total_changes(&self) -> usize {
        self.modified.len() + self.deleted.len() + self.added.len()
    }
}

/// A validated scan root together with its baseline manifest
pub struct ScanSession {
    /// Absolute scan root
    root: PathBuf,
    /// Manifest loaded at open time, never modified
    baseline: Manifest,
    /// Pool size and hashing settings
    options: ScanOptions,
    /// Shared by the workers of both phases
    context: ScanContext,
}

impl ScanSession {
    /// Validate `root` and load its baseline manifest.
    ///
    /// # Errors
    ///
    /// - [`ScanError::NotFound`] if the root does not exist
    /// - [`ScanError::NotADirectory`] if it is not a directory
    /// - [`ScanError::PermissionDenied`] if it or the manifest cannot be read
    /// - [`ScanError::Io`] for any other failure
    pub fn open(root: &Path, options: ScanOptions) -> ScanResult<Self> {
        let root = std::path::absolute(root).map_err(|e| ScanError::from_io(root, e))?;

        match fs::metadata(&root) {
            Ok(metadata) if metadata.is_dir() => {}
            Ok(_) => return Err(ScanError::NotADirectory { path: root }),
            Err(e) => return Err(ScanError::from_io(&root, e)),
        }

        let baseline = Manifest::load(&root)?;
        debug!(
            root = %root.display(),
            baseline = baseline.len(),
            workers = options.workers,
            "opened scan session"
        );

        Ok(Self {
            context: ScanContext::new(root.clone(), options.buffer_size),
            root,
            baseline,
            options,
        })
    }

    /// Report hashing milestones to `observer`
    #[must_use]
    pub fn with_observer(mut self, observer: Box<dyn ProgressObserver>) -> Self {
        self.context = self.context.with_observer(observer);
        self
    }

    /// Manifest as it was on disk when the session opened
    #[must_use]
    pub const fn baseline(&self) -> &Manifest {
        &self.baseline
    }

    /// Files digested by this session so far
    #[must_use]
    pub fn files_hashed(&self) -> usize {
        self.context.hashed()
    }

    /// Run change detection followed by addition scanning.
    ///
    /// The baseline is never modified; the returned report carries the
    /// updated manifest.
    ///
    /// # Errors
    ///
    /// Returns the first fatal error from either phase. No partial report
    /// is produced.
    pub fn run(&self) -> ScanResult<ScanReport> {
        let pool = WorkerPool::new(self.options.workers);
        let working = WorkingManifest::from_manifest(&self.baseline);

        let changes = changes::detect_changes(&self.context, &pool, &self.baseline, &working)?;
        debug!(
            modified = changes.modified.len(),
            deleted = changes.deleted.len(),
            "change detection finished"
        );

        let scanner = TreeScanner::new(self.root.clone(), self.options.follow_symlinks);
        let added = additions::scan_additions(&self.context, &pool, &scanner, &working)?;
        debug!(added = added.len(), "addition scan finished");

        let report = ScanReport {
            modified: changes.modified,
            deleted: changes.deleted,
            added,
            manifest: working.to_manifest(),
        };
        info!(
            hashed = self.files_hashed(),
            changes = report.total_changes(),
            "scan complete"
        );
        Ok(report)
    }

    /// Persist the manifest of `report` as the new baseline.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::PermissionDenied`] if the manifest cannot be
    /// written, or [`ScanError::Io`] if writing fails.
    pub fn commit(&self, report: &ScanReport) -> ScanResult<()> {
        report.manifest.save(&self.root)
    }
}

/// Result list appended to by many workers at once
#[derive(Default)]
struct PathList(Mutex<Vec<PathBuf>>);

impl PathList {
    /// Append from any worker
    fn push(&self, path: PathBuf) {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(path);
    }

    /// Take the collected paths once every worker has finished, sorted by
    /// their raw bytes
    fn into_sorted(self) -> Vec<PathBuf> {
        let mut paths = self.0.into_inner().unwrap_or_else(PoisonError::into_inner);
        paths.sort_unstable_by(|a, b| a.as_os_str().cmp(b.as_os_str()));
        paths
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SUMS_FILE_NAME;
    use anyhow::Result;
    use tempfile::TempDir;

    #[test]
    fn test_open_rejects_missing_root() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let result = ScanSession::open(&temp_dir.path().join("nope"), ScanOptions::default());
        assert!(matches!(result, Err(ScanError::NotFound { .. })));
        Ok(())
    }

    #[test]
    fn test_open_rejects_file_root() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let file = temp_dir.path().join("file");
        fs::write(&file, "x")?;
        let result = ScanSession::open(&file, ScanOptions::default());
        assert!(matches!(result, Err(ScanError::NotADirectory { .. })));
        Ok(())
    }

    #[test]
    fn test_run_then_commit_is_stable() -> Result<()> {
        let temp_dir = TempDir::new()?;
        fs::write(temp_dir.path().join("a"), "1")?;

        let session = ScanSession::open(temp_dir.path(), ScanOptions::default())?;
        assert!(session.baseline().is_empty());

        let report = session.run()?;
        assert_eq!(report.added, vec![PathBuf::from("a")]);
        assert!(report.has_changes());
        session.commit(&report)?;
        assert!(temp_dir.path().join(SUMS_FILE_NAME).is_file());

        let rescan = ScanSession::open(temp_dir.path(), ScanOptions::default())?.run()?;
        assert!(!rescan.has_changes());
        assert_eq!(rescan.manifest, report.manifest);
        Ok(())
    }

    #[test]
    fn test_run_leaves_disk_untouched() -> Result<()> {
        let temp_dir = TempDir::new()?;
        fs::write(temp_dir.path().join("a"), "1")?;

        let session = ScanSession::open(temp_dir.path(), ScanOptions::default())?;
        let report = session.run()?;

        assert_eq!(report.total_changes(), 1);
        assert!(!temp_dir.path().join(SUMS_FILE_NAME).exists());
        Ok(())
    }
}
