//! Persisted mapping from relative path to content digest.
//!
//! The manifest lives at `<root>/SCRUBSUMS` and is the only state scrubsum
//! keeps between runs. It is read once at the start of a scan (the
//! *baseline*) and, only if the caller commits, rewritten wholesale from the
//! scan's working copy.

use super::codec;
use crate::SUMS_FILE_NAME;
use crate::error::{ScanError, ScanResult};
use std::collections::HashMap;
use std::collections::hash_map;
use std::ffi::OsString;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Length of a hex-encoded SHA-1 digest.
pub const DIGEST_LEN: usize = 40;

/// Lowercase hex content digest of a file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Digest(String);

impl Digest {
    /// Validate and wrap a hex digest.
    ///
    /// Accepts exactly [`DIGEST_LEN`] characters from `[0-9a-f]`.
    #[must_use]
    pub fn parse(hex: &[u8]) -> Option<Self> {
        if hex.len() != DIGEST_LEN {
            return None;
        }
        if !hex.iter().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f')) {
            return None;
        }
        // All bytes are ASCII hex digits
        String::from_utf8(hex.to_vec()).ok().map(Self)
    }

    /// Wrap hex the hasher just produced.
    pub(crate) fn from_hex_unchecked(hex: String) -> Self {
        debug_assert_eq!(hex.len(), DIGEST_LEN);
        Self(hex)
    }

    /// Hex representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Mapping from root-relative path to digest.
///
/// Keys compare by their exact bytes, not by path components: `a/b` and
/// `a//b` are two entries, just as they are two lines in the file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    /// Entries keyed by path relative to the scan root
    entries: HashMap<OsString, Digest>,
}

impl Manifest {
    /// Create an empty manifest
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Location of the manifest file for a scan root.
    #[must_use]
    pub fn path_in(root: &Path) -> PathBuf {
        root.join(SUMS_FILE_NAME)
    }

    /// Number of tracked paths
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if nothing is tracked
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Recorded digest for `path`
    #[must_use]
    pub fn get(&self, path: &Path) -> Option<&Digest> {
        self.entries.get(path.as_os_str())
    }

    /// Check if `path` is tracked
    #[must_use]
    pub fn contains(&self, path: &Path) -> bool {
        self.entries.contains_key(path.as_os_str())
    }

    /// Record a digest, returning the previous one if any
    pub fn insert(&mut self, path: PathBuf, digest: Digest) -> Option<Digest> {
        self.entries.insert(path.into_os_string(), digest)
    }

    /// Stop tracking `path`
    pub fn remove(&mut self, path: &Path) -> Option<Digest> {
        self.entries.remove(path.as_os_str())
    }

    /// Iterate over entries in no particular order
    #[must_use]
    pub fn iter(&self) -> Iter<'_> {
        Iter(self.entries.iter())
    }

    /// Load the manifest stored under `root`.
    ///
    /// A missing manifest, or something at that path that is not a regular
    /// file, yields an empty manifest.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::PermissionDenied`] if the file exists but cannot
    /// be read, or [`ScanError::Io`] for any other read failure.
    pub fn load(root: &Path) -> ScanResult<Self> {
        let manifest_path = Self::path_in(root);

        match fs::metadata(&manifest_path) {
            Ok(metadata) if metadata.is_file() => {}
            Ok(_) => return Ok(Self::new()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::new()),
            Err(e) => return Err(ScanError::from_io(&manifest_path, e)),
        }

        let data = match fs::read(&manifest_path) {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::new()),
            Err(e) => return Err(ScanError::from_io(&manifest_path, e)),
        };

        let manifest = codec::decode(&data);
        debug!(
            path = %manifest_path.display(),
            entries = manifest.len(),
            "loaded manifest"
        );
        Ok(manifest)
    }

    /// Replace the manifest stored under `root` with this one.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::PermissionDenied`] if the manifest path exists
    /// but is not a writable regular file or cannot be opened for writing,
    /// or [`ScanError::Io`] if writing fails.
    pub fn save(&self, root: &Path) -> ScanResult<()> {
        let manifest_path = Self::path_in(root);

        if let Ok(metadata) = fs::metadata(&manifest_path)
            && (!metadata.is_file() || metadata.permissions().readonly())
        {
            return Err(ScanError::PermissionDenied {
                path: manifest_path,
                source: io::Error::from(io::ErrorKind::PermissionDenied),
            });
        }

        let data = codec::encode(self);
        fs::write(&manifest_path, &data).map_err(|e| match e.kind() {
            io::ErrorKind::PermissionDenied => ScanError::PermissionDenied {
                path: manifest_path.clone(),
                source: e,
            },
            _ => ScanError::Io {
                path: manifest_path.clone(),
                source: e,
            },
        })?;

        debug!(
            path = %manifest_path.display(),
            entries = self.len(),
            "saved manifest"
        );
        Ok(())
    }
}

impl FromIterator<(PathBuf, Digest)> for Manifest {
    fn from_iter<I: IntoIterator<Item = (PathBuf, Digest)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(path, digest)| (path.into_os_string(), digest))
                .collect(),
        }
    }
}

/// Iterator over `(path, digest)` pairs of a [`Manifest`]
#[derive(Debug, Clone)]
pub struct Iter<'a>(hash_map::Iter<'a, OsString, Digest>);

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a Path, &'a Digest);

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|(name, digest)| (Path::new(name), digest))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl<'a> IntoIterator for &'a Manifest {
    type Item = (&'a Path, &'a Digest);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
