use super::manifest::{Digest, Manifest};
use dashmap::DashMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Thread-safe working copy of a manifest, mutated by pool workers.
///
/// Seeded from the baseline at the start of a scan. Every insert and remove
/// is atomic per key, so workers can update it concurrently without losing
/// writes. Keys compare byte for byte, like [`Manifest`] keys.
#[derive(Debug, Clone, Default)]
pub struct WorkingManifest {
    /// Entries keyed by path relative to the scan root
    entries: Arc<DashMap<OsString, Digest>>,
}

impl WorkingManifest {
    /// Create a new empty working manifest
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a working copy of `manifest`
    #[must_use]
    pub fn from_manifest(manifest: &Manifest) -> Self {
        let working = Self::new();

        for (path, digest) in manifest {
            working
                .entries
                .insert(path.as_os_str().to_os_string(), digest.clone());
        }

        working
    }

    /// Snapshot the current contents as a plain manifest
    #[must_use]
    pub fn to_manifest(&self) -> Manifest {
        self.entries
            .iter()
            .map(|entry| (PathBuf::from(entry.key()), entry.value().clone()))
            .collect()
    }

    /// Record or overwrite a digest
    pub fn insert(&self, path: PathBuf, digest: Digest) -> Option<Digest> {
        self.entries.insert(path.into_os_string(), digest)
    }

    /// Drop an entry
    pub fn remove(&self, path: &Path) -> Option<Digest> {
        self.entries.remove(path.as_os_str()).map(|(_, v)| v)
    }

    /// Current digest for `path`
    #[must_use]
    pub fn get(&self, path: &Path) -> Option<Digest> {
        self.entries.get(path.as_os_str()).map(|e| e.clone())
    }

    /// Check if `path` is tracked
    #[must_use]
    pub fn contains(&self, path: &Path) -> bool {
        self.entries.contains_key(path.as_os_str())
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
}
