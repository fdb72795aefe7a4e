use crate::error::ScanResult;
use crate::tracking::Digest;
use crate::utils::hash::compute_digest;
use crate::utils::paths::resolve_under;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::debug;

/// Receives hashing milestones while a scan is running.
///
/// Called from worker threads, so implementations must be thread-safe.
pub trait ProgressObserver: Send + Sync {
    /// `hashed` files have been digested so far and the count just
    /// reached a milestone (see [`is_milestone`]).
    fn milestone(&self, hashed: usize);
}

/// State shared by every worker of a scan.
///
/// Holds the root that relative manifest paths resolve against, the hasher
/// buffer size, and the running count of digested files.
pub struct ScanContext {
    /// Absolute scan root
    root: PathBuf,
    /// Hasher read chunk size
    buffer_size: usize,
    /// Files digested so far, across both phases
    hashed: AtomicUsize,
    /// Notified at milestones
    observer: Option<Box<dyn ProgressObserver>>,
}

impl ScanContext {
    /// Create a context for an absolute scan root
    #[must_use]
    pub fn new(root: PathBuf, buffer_size: usize) -> Self {
        Self {
            root,
            buffer_size,
            hashed: AtomicUsize::new(0),
            observer: None,
        }
    }

    /// Attach an observer notified at every hashing milestone
    #[must_use]
    pub fn with_observer(mut self, observer: Box<dyn ProgressObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Digest the file at `relative` below the root.
    ///
    /// Returns `Ok(None)` if nothing hashable exists there any more, or if
    /// `relative` does not stay below the root. Only successful digests
    /// count towards progress.
    ///
    /// # Errors
    ///
    /// Propagates permission and I/O failures from the hasher.
    pub fn digest(&self, relative: &Path) -> ScanResult<Option<Digest>> {
        let Some(path) = resolve_under(&self.root, relative) else {
            debug!(path = %relative.display(), "entry escapes the scan root");
            return Ok(None);
        };
        let digest = compute_digest(&path, self.buffer_size)?;
        if digest.is_some() {
            self.record_hash();
        }
        Ok(digest)
    }

    /// Count one digested file, notifying the observer on milestones.
    pub fn record_hash(&self) {
        let hashed = self.hashed.fetch_add(1, Ordering::Relaxed) + 1;
        if let Some(observer) = &self.observer
            && is_milestone(hashed)
        {
            observer.milestone(hashed);
        }
    }

    /// Files digested so far
    #[must_use]
    pub fn hashed(&self) -> usize {
        self.hashed.load(Ordering::Relaxed)
    }
}

/// Whether `count` is worth reporting: 10, 20, ..., 90, 100, 200, ...
///
/// A milestone is any count of at least ten whose leading decimal digit
/// differs from that of the count before it.
#[must_use]
pub const fn is_milestone(count: usize) -> bool {
    count >= 10 && leading_digit(count) != leading_digit(count - 1)
}

/// Most significant decimal digit of `n`
const fn leading_digit(mut n: usize) -> usize {
    while n >= 10 {
        n /= 10;
    }
    n
}
