//! Error taxonomy for scans and the process exit statuses derived from it.
//!
//! Every variant of [`ScanError`] is fatal: the scan stops and nothing is
//! committed. Recoverable conditions (a malformed manifest line, a tracked
//! file that disappeared before it was hashed) never become a `ScanError`.

use crate::config::ConfigError;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result alias for core scan operations.
pub type ScanResult<T> = std::result::Result<T, ScanError>;

/// Fatal conditions that abort a scan.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The scan root does not exist.
    #[error("no such directory: {}", .path.display())]
    NotFound {
        /// Path that was looked up
        path: PathBuf,
    },

    /// The scan root exists but is not a directory.
    #[error("not a directory: {}", .path.display())]
    NotADirectory {
        /// Path that was looked up
        path: PathBuf,
    },

    /// A file, directory, or the manifest could not be read or written.
    #[error("permission denied on {}", .path.display())]
    PermissionDenied {
        /// Path the operation failed on
        path: PathBuf,
        /// Underlying OS error
        #[source]
        source: io::Error,
    },

    /// Any other I/O failure.
    #[error("unexpected I/O error on {}: {source}", .path.display())]
    Io {
        /// Path the operation failed on
        path: PathBuf,
        /// Underlying OS error
        #[source]
        source: io::Error,
    },

    /// A file seen during enumeration was gone when it came time to hash it.
    #[error("file vanished during scan: {}", .path.display())]
    Vanished {
        /// Path relative to the scan root
        path: PathBuf,
    },

    /// A pool worker panicked; its share of the queue is unaccounted for.
    #[error("a scan worker terminated unexpectedly")]
    WorkerPanicked,

    /// The worker pool could not be started.
    #[error("failed to start worker pool: {0}")]
    PoolStartup(#[from] rayon::ThreadPoolBuildError),
}

impl ScanError {
    /// Classify an I/O error raised while operating on `path`.
    ///
    /// A path whose parent turned out to be a file counts as not found.
    pub fn from_io(path: &Path, err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound | io::ErrorKind::NotADirectory => Self::NotFound {
                path: path.to_path_buf(),
            },
            io::ErrorKind::PermissionDenied => Self::PermissionDenied {
                path: path.to_path_buf(),
                source: err,
            },
            _ => Self::Io {
                path: path.to_path_buf(),
                source: err,
            },
        }
    }

    /// Exit status the command-line front end reports for this error.
    #[must_use]
    pub const fn exit_status(&self) -> ExitStatus {
        match self {
            Self::NotFound { .. } => ExitStatus::NotFound,
            Self::NotADirectory { .. } => ExitStatus::NotADirectory,
            Self::PermissionDenied { .. } => ExitStatus::PermissionDenied,
            Self::Io { .. }
            | Self::Vanished { .. }
            | Self::WorkerPanicked
            | Self::PoolStartup(_) => ExitStatus::Io,
        }
    }
}

/// Stable process outcomes, numbered after the matching errno values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    /// Scan finished and found nothing to report
    NoChange = 0,
    /// Scan finished and found changes (committed or not)
    Changes = 1,
    /// Target path missing
    NotFound = 2,
    /// Unexpected I/O failure
    Io = 5,
    /// Permission denied on some path
    PermissionDenied = 13,
    /// Target is not a directory
    NotADirectory = 20,
    /// Bad command line or configuration
    InvalidInvocation = 22,
}

impl ExitStatus {
    /// Numeric process exit code.
    #[must_use]
    pub const fn code(self) -> i32 {
        self as i32
    }

    /// Pick the exit status for an error that reached the top level.
    ///
    /// The first [`ScanError`] or [`ConfigError`] in the chain decides;
    /// anything else is reported as an I/O failure.
    #[must_use]
    pub fn for_error(err: &anyhow::Error) -> Self {
        err.chain()
            .find_map(|cause| {
                if let Some(scan) = cause.downcast_ref::<ScanError>() {
                    return Some(scan.exit_status());
                }
                cause.downcast_ref::<ConfigError>().map(|config| match config {
                    ConfigError::Read { .. } => Self::Io,
                    ConfigError::Parse { .. } | ConfigError::Invalid { .. } => {
                        Self::InvalidInvocation
                    }
                })
            })
            .unwrap_or(Self::Io)
    }
}
