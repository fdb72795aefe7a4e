//! Manifest data model, on-disk format, and tree enumeration.
//!
//! # Architecture
//!
//! - [`crate::tracking::Manifest`] - Path to digest mapping, loaded and saved under the scan root
//! - [`crate::tracking::codec`] - The `sha1sum`-compatible line format, including escaping
//! - [`crate::tracking::WorkingManifest`] - Concurrent working copy mutated during a scan
//! - [`crate::tracking::TreeScanner`] - Enumerates every regular file below the root
//!
//! # Usage
//!
//! ```no_run
//! use scrubsum::tracking::{Manifest, TreeScanner, WorkingManifest};
//! use std::path::PathBuf;
//!
//! # fn main() -> anyhow::Result<()> {
//! let root = PathBuf::from("/srv/archive");
//! let baseline = Manifest::load(&root)?;
//! let working = WorkingManifest::from_manifest(&baseline);
//!
//! let scanner = TreeScanner::new(root.clone(), false);
//! let untracked: Vec<_> = scanner
//!     .scan_files()?
//!     .into_iter()
//!     .filter(|path| !working.contains(path))
//!     .collect();
//! # Ok(())
//! # }
//! ```

pub mod codec;
pub mod concurrent;
pub mod manifest;
pub mod scanner;

pub use concurrent::WorkingManifest;
pub use manifest::{DIGEST_LEN, Digest, Manifest};
pub use scanner::TreeScanner;
