use crate::error::{ScanError, ScanResult};
use crate::tracking::Digest;
use sha1::{Digest as _, Sha1};
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::Path;

/// Default chunk size used when streaming file contents into the hasher.
pub const DEFAULT_BUFFER_SIZE: usize = 1_048_576;

/// Digest of an in-memory buffer.
#[must_use]
pub fn hash_bytes(data: &[u8]) -> Digest {
    let mut hasher = Sha1::new();
    hasher.update(data);
    Digest::from_hex_unchecked(format!("{:x}", hasher.finalize()))
}

/// Stream `reader` to end of input in `buffer_size` chunks.
pub fn hash_reader<R: Read>(mut reader: R, buffer_size: usize) -> io::Result<Digest> {
    let mut hasher = Sha1::new();
    let mut buffer = vec![0u8; buffer_size.max(1)];

    loop {
        let bytes_read = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(Digest::from_hex_unchecked(format!("{:x}", hasher.finalize())))
}

/// Digest of the file at `path`, or `None` if it is missing or not a regular file.
///
/// Disappearance is how deletions surface, so "not there" is never an
/// error. Any other failure is fatal: a digest computed from a partial
/// read must never be recorded.
///
/// # Errors
///
/// Returns [`ScanError::PermissionDenied`] if the file cannot be opened or
/// read for lack of permission, and [`ScanError::Io`] for any other failure.
pub fn compute_digest(path: &Path, buffer_size: usize) -> ScanResult<Option<Digest>> {
    let metadata = match fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if is_absent(&e) => return Ok(None),
        Err(e) => return Err(read_error(path, e)),
    };

    if !metadata.is_file() {
        return Ok(None);
    }

    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if is_absent(&e) => return Ok(None),
        Err(e) => return Err(read_error(path, e)),
    };

    hash_reader(file, buffer_size)
        .map(Some)
        .map_err(|e| read_error(path, e))
}

/// Errors that mean the file simply is not there any more.
fn is_absent(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::NotFound | io::ErrorKind::NotADirectory
    )
}

fn read_error(path: &Path, err: io::Error) -> ScanError {
    if err.kind() == io::ErrorKind::PermissionDenied {
        ScanError::PermissionDenied {
            path: path.to_path_buf(),
            source: err,
        }
    } else {
        ScanError::Io {
            path: path.to_path_buf(),
            source: err,
        }
    }
}
