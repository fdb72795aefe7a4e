#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]
// Allow pedantic strict lints that create false positives in this codebase
#![allow(clippy::arithmetic_side_effects)] // Counters and chunk sizes cannot overflow
#![allow(clippy::indexing_slicing)] // Bounds checked by logic

//! # ScrubSum - Content-Hash Change Detector
//!
//! ScrubSum records a SHA-1 digest for every regular file under a directory
//! in a plain-text manifest named `SCRUBSUMS` at the top of that directory.
//! Later runs re-hash the tree and report which files were modified,
//! deleted, or added since the manifest was last committed.
//!
//! ## Features
//!
//! - **`sha1sum`-compatible manifest**: `<digest>  <path>` lines, with the
//!   same escaping for names containing newlines
//! - **Parallel hashing**: a fixed-size worker pool per scan phase
//! - **Read-only until committed**: the manifest is only replaced when the
//!   caller accepts the changes
//!
//! ## Architecture
//!
//! - [`tracking`]: Digests, the manifest and its codec, tree enumeration
//! - [`scan`]: Change detection, addition scanning, scan sessions
//! - [`utils`]: Hashing, path conversion, the worker pool
//! - [`config`]: Configuration loading and validation
//! - [`commands`]: The command-line action: report, prompt, commit
//! - [`output`]: Console output and progress milestones
//! - [`error`]: Error taxonomy and process exit statuses
//!
//! ## Example Usage
//!
//! ```no_run
//! use scrubsum::scan::{ScanOptions, ScanSession};
//! use std::path::Path;
//!
//! # fn main() -> anyhow::Result<()> {
//! let session = ScanSession::open(Path::new("/srv/archive"), ScanOptions::default())?;
//! let report = session.run()?;
//!
//! for path in &report.modified {
//!     println!(" M {}", path.display());
//! }
//!
//! if report.has_changes() {
//!     session.commit(&report)?;
//! }
//! # Ok(())
//! # }
//! ```

/// Command-line interface definitions (argument parsing structures).
pub mod cli;

/// The command-line scan action.
pub mod commands;

/// Configuration parsing, validation, and management.
pub mod config;

/// Error types and process exit statuses.
pub mod error;

/// Output formatting and progress display.
pub mod output;

/// Change detection, addition scanning, and scan sessions.
pub mod scan;

/// Manifest data model, on-disk format, and tree enumeration.
pub mod tracking;

/// Utility functions and helpers.
pub mod utils;

/// Current version of the scrubsum binary.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// File name of the manifest kept at the top of every scan root.
pub const SUMS_FILE_NAME: &str = "SCRUBSUMS";

pub use error::{ExitStatus, ScanError, ScanResult};
pub use scan::{ScanOptions, ScanReport, ScanSession};
pub use tracking::{Digest, Manifest};
