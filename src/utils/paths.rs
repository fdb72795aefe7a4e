//! Conversions between manifest paths and their on-disk byte form.
//!
//! Manifest entries are stored as raw bytes so names that are not valid
//! UTF-8 survive a load/save cycle unchanged on Unix.

use std::path::{Component, Path, PathBuf};

/// Raw bytes of a relative path as they appear in the manifest.
#[cfg(unix)]
#[must_use]
pub fn path_to_bytes(path: &Path) -> Vec<u8> {
    use std::os::unix::ffi::OsStrExt;
    path.as_os_str().as_bytes().to_vec()
}

/// Raw bytes of a relative path as they appear in the manifest.
#[cfg(not(unix))]
#[must_use]
pub fn path_to_bytes(path: &Path) -> Vec<u8> {
    path.to_string_lossy().replace('\\', "/").into_bytes()
}

/// Rebuild a relative path from its manifest bytes.
#[cfg(unix)]
#[must_use]
pub fn bytes_to_path(bytes: &[u8]) -> PathBuf {
    use std::os::unix::ffi::OsStrExt;
    PathBuf::from(std::ffi::OsStr::from_bytes(bytes))
}

/// Rebuild a relative path from its manifest bytes.
#[cfg(not(unix))]
#[must_use]
pub fn bytes_to_path(bytes: &[u8]) -> PathBuf {
    PathBuf::from(String::from_utf8_lossy(bytes).into_owned())
}

/// Path of `path` relative to `base`, or `None` if `base` is not a prefix.
#[must_use]
pub fn relative_to(path: &Path, base: &Path) -> Option<PathBuf> {
    path.strip_prefix(base).ok().map(Path::to_path_buf)
}

/// Join a manifest key onto `root`, or `None` if the key could name
/// something outside it.
///
/// Only plain names and `.` are accepted. Absolute keys, drive prefixes and
/// `..` never resolve, so such entries read as absent.
#[must_use]
pub fn resolve_under(root: &Path, relative: &Path) -> Option<PathBuf> {
    let contained = relative
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
    contained.then(|| root.join(relative))
}
