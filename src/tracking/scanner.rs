//! Tree scanner for discovering every regular file under a scan root.
//!
//! Traversal is iterative (walkdir keeps its own stack of open
//! directories), so pathological nesting depth cannot overflow the call
//! stack. A directory that cannot be listed aborts the scan: a partial tree
//! must never pass for a complete one.

use crate::SUMS_FILE_NAME;
use crate::error::{ScanError, ScanResult};
use crate::utils::paths::relative_to;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};
use walkdir::WalkDir;

/// Scanner for enumerating files below a root directory
pub struct TreeScanner {
    /// Absolute scan root
    root: PathBuf,
    /// Whether to descend into symlinked directories
    follow_symlinks: bool,
}

impl TreeScanner {
    /// Create a new tree scanner
    ///
    /// # Arguments
    ///
    /// * `root` - Directory to enumerate
    /// * `follow_symlinks` - Whether to descend into symbolic links to directories
    #[must_use]
    pub const fn new(root: PathBuf, follow_symlinks: bool) -> Self {
        Self {
            root,
            follow_symlinks,
        }
    }

    /// Enumerate all regular files, returning paths relative to the root.
    ///
    /// The manifest file at the top of the root is never returned. Symbolic
    /// links to regular files are reported like the files they point at;
    /// dangling links are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::PermissionDenied`] if a directory cannot be
    /// listed, or [`ScanError::Io`] for any other traversal failure
    /// (including a symlink loop when following links).
    pub fn scan_files(&self) -> ScanResult<Vec<PathBuf>> {
        let mut files = Vec::new();

        for entry in WalkDir::new(&self.root)
            .follow_links(self.follow_symlinks)
            .min_depth(1)
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => match self.classify_walk_error(e) {
                    Some(fatal) => return Err(fatal),
                    None => continue,
                },
            };

            if !Self::is_regular_file(&entry)? {
                continue;
            }

            let Some(relative) = relative_to(entry.path(), &self.root) else {
                continue;
            };

            if relative.as_os_str() == SUMS_FILE_NAME {
                trace!("skipping manifest file");
                continue;
            }

            files.push(relative);
        }

        debug!(root = %self.root.display(), files = files.len(), "enumerated tree");
        Ok(files)
    }

    /// Check whether an entry is (or points at) a regular file
    fn is_regular_file(entry: &walkdir::DirEntry) -> ScanResult<bool> {
        let file_type = entry.file_type();
        if file_type.is_file() {
            return Ok(true);
        }
        if !file_type.is_symlink() {
            return Ok(false);
        }

        match fs::metadata(entry.path()) {
            Ok(metadata) => Ok(metadata.is_file()),
            Err(e)
                if matches!(
                    e.kind(),
                    io::ErrorKind::NotFound | io::ErrorKind::NotADirectory
                ) =>
            {
                trace!(path = %entry.path().display(), "dangling symlink");
                Ok(false)
            }
            Err(e) => Err(ScanError::from_io(entry.path(), e)),
        }
    }

    /// Map a traversal error to a fatal scan error, or `None` if the entry
    /// vanished while the walk was underway.
    fn classify_walk_error(&self, err: walkdir::Error) -> Option<ScanError> {
        let path = err
            .path()
            .map_or_else(|| self.root.clone(), Path::to_path_buf);

        match err.io_error().map(io::Error::kind) {
            Some(io::ErrorKind::NotFound) => {
                debug!(path = %path.display(), "entry vanished during traversal");
                None
            }
            Some(io::ErrorKind::PermissionDenied) => Some(ScanError::PermissionDenied {
                path,
                source: err.into(),
            }),
            _ => Some(ScanError::Io {
                path,
                source: err.into(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::ScanOptions;
    use anyhow::Result;
    use std::collections::HashSet;
    use tempfile::TempDir;

    fn create_test_structure(temp_dir: &Path) -> Result<()> {
        // Create directory structure:
        // temp/
        //   SCRUBSUMS
        //   top.txt
        //   photos/
        //     2019/
        //       a.jpg
        //     b.jpg
        //     SCRUBSUMS
        //   empty/

        let photos = temp_dir.join("photos");
        fs::create_dir_all(photos.join("2019"))?;
        fs::create_dir_all(temp_dir.join("empty"))?;

        fs::write(temp_dir.join(SUMS_FILE_NAME), "")?;
        fs::write(temp_dir.join("top.txt"), "top")?;
        fs::write(photos.join("2019/a.jpg"), "a")?;
        fs::write(photos.join("b.jpg"), "b")?;
        fs::write(photos.join(SUMS_FILE_NAME), "nested")?;

        Ok(())
    }

    fn scan_with(root: &Path, follow_symlinks: bool) -> Result<HashSet<PathBuf>> {
        let scanner = TreeScanner::new(root.to_path_buf(), follow_symlinks);
        Ok(scanner.scan_files()?.into_iter().collect())
    }

    fn scan(root: &Path) -> Result<HashSet<PathBuf>> {
        scan_with(root, ScanOptions::default().follow_symlinks)
    }

    #[test]
    fn test_scan_tree() -> Result<()> {
        let temp_dir = TempDir::new()?;
        create_test_structure(temp_dir.path())?;

        let files = scan(temp_dir.path())?;

        let expected: HashSet<PathBuf> = [
            "top.txt",
            "photos/2019/a.jpg",
            "photos/b.jpg",
            "photos/SCRUBSUMS",
        ]
        .into_iter()
        .map(PathBuf::from)
        .collect();
        assert_eq!(files, expected);

        Ok(())
    }

    #[test]
    fn test_scan_skips_only_root_manifest() -> Result<()> {
        let temp_dir = TempDir::new()?;
        create_test_structure(temp_dir.path())?;

        let files = scan(temp_dir.path())?;
        assert!(!files.contains(Path::new(SUMS_FILE_NAME)));
        assert!(files.contains(Path::new("photos/SCRUBSUMS")));

        Ok(())
    }

    #[test]
    fn test_scan_empty_root() -> Result<()> {
        let temp_dir = TempDir::new()?;
        assert!(scan(temp_dir.path())?.is_empty());
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn test_scan_symlinks() -> Result<()> {
        use std::os::unix::fs::symlink;

        let temp_dir = TempDir::new()?;
        let root = temp_dir.path();
        fs::create_dir(root.join("real"))?;
        fs::write(root.join("real/file.txt"), "data")?;
        symlink(root.join("real/file.txt"), root.join("link.txt"))?;
        symlink(root.join("real"), root.join("linked_dir"))?;
        symlink(root.join("missing"), root.join("dangling"))?;

        let files = scan(root)?;
        assert!(files.contains(Path::new("real/file.txt")));
        assert!(files.contains(Path::new("link.txt")));
        assert!(files.contains(Path::new("linked_dir/file.txt")));
        assert!(!files.contains(Path::new("dangling")));

        let unfollowed = scan_with(root, false)?;
        assert!(unfollowed.contains(Path::new("link.txt")));
        assert!(!unfollowed.contains(Path::new("linked_dir/file.txt")));
        assert!(!unfollowed.contains(Path::new("dangling")));

        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_loop_is_fatal() -> Result<()> {
        use std::os::unix::fs::symlink;

        let temp_dir = TempDir::new()?;
        let root = temp_dir.path();
        fs::create_dir(root.join("sub"))?;
        symlink(root, root.join("sub/back"))?;

        let scanner = TreeScanner::new(root.to_path_buf(), true);
        assert!(matches!(scanner.scan_files(), Err(ScanError::Io { .. })));
        assert!(scan_with(root, false)?.is_empty());

        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn test_unlistable_directory_is_permission_denied() -> Result<()> {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new()?;
        let locked = temp_dir.path().join("locked");
        fs::create_dir(&locked)?;
        fs::write(locked.join("inside.txt"), "x")?;
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000))?;

        // root ignores permission bits
        if fs::read_dir(&locked).is_ok() {
            fs::set_permissions(&locked, fs::Permissions::from_mode(0o755))?;
            return Ok(());
        }

        let scanner = TreeScanner::new(temp_dir.path().to_path_buf(), true);
        let result = scanner.scan_files();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755))?;

        match result {
            Err(ScanError::PermissionDenied { path, .. }) => assert_eq!(path, locked),
            other => panic!("expected PermissionDenied, got {other:?}"),
        }

        Ok(())
    }
}
