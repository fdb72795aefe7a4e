//! Line-oriented checksum file format.
//!
//! Each record is `<40 hex digest><space><space><path>\n`, the layout
//! written by `sha1sum`. A path containing a newline is stored escaped
//! (`\` becomes `\\`, newline becomes `\n`) and the whole record is then
//! prefixed with a single `\` so readers know to unescape it.
//!
//! Quirks kept for compatibility:
//! - lines are split on `\n` only; a trailing `\r` belongs to the path
//! - the first empty line ends the file, whatever follows it
//! - records that do not parse are skipped with a warning

use super::manifest::{DIGEST_LEN, Digest, Manifest};
use crate::utils::paths::{bytes_to_path, path_to_bytes};
use std::path::PathBuf;
use tracing::{debug, warn};

/// Separator between digest and path.
const FIELD_SEPARATOR: &[u8] = b"  ";

/// Parse a manifest from the raw contents of a checksum file.
#[must_use]
pub fn decode(data: &[u8]) -> Manifest {
    let mut manifest = Manifest::new();
    let mut skipped = 0usize;

    let body = data.strip_suffix(b"\n").unwrap_or(data);
    if body.is_empty() {
        return manifest;
    }

    for line in body.split(|&b| b == b'\n') {
        if line.is_empty() {
            debug!("empty line in manifest, ignoring remainder");
            break;
        }

        match decode_line(line) {
            Some((path, digest)) => {
                manifest.insert(path, digest);
            }
            None => {
                skipped += 1;
                warn!(line = %String::from_utf8_lossy(line), "ignored line");
            }
        }
    }

    debug!(entries = manifest.len(), skipped, "decoded manifest");
    manifest
}

/// Parse a single record (without its terminating newline).
#[must_use]
pub fn decode_line(line: &[u8]) -> Option<(PathBuf, Digest)> {
    let (escaped, record) = match line.split_first() {
        Some((b'\\', rest)) => (true, rest),
        _ => (false, line),
    };

    if record.len() < DIGEST_LEN + FIELD_SEPARATOR.len() {
        return None;
    }

    let (sum, rest) = record.split_at(DIGEST_LEN);
    let digest = Digest::parse(sum)?;
    let name = rest.strip_prefix(FIELD_SEPARATOR)?;

    let name = if escaped {
        unescape_name(name)
    } else {
        name.to_vec()
    };

    Some((bytes_to_path(&name), digest))
}

/// Serialize a manifest, one record per entry, sorted by path.
#[must_use]
pub fn encode(manifest: &Manifest) -> Vec<u8> {
    let mut entries: Vec<(Vec<u8>, &Digest)> = manifest
        .iter()
        .map(|(path, digest)| (path_to_bytes(path), digest))
        .collect();
    entries.sort_unstable_by(|a, b| a.0.cmp(&b.0));

    let mut out = Vec::with_capacity(entries.len() * (DIGEST_LEN + 32));
    for (name, digest) in entries {
        encode_line(&mut out, &name, digest);
    }
    out
}

/// Append one record to `out`.
pub fn encode_line(out: &mut Vec<u8>, name: &[u8], digest: &Digest) {
    if needs_escape(name) {
        out.push(b'\\');
        out.extend_from_slice(digest.as_str().as_bytes());
        out.extend_from_slice(FIELD_SEPARATOR);
        out.extend_from_slice(&escape_name(name));
    } else {
        out.extend_from_slice(digest.as_str().as_bytes());
        out.extend_from_slice(FIELD_SEPARATOR);
        out.extend_from_slice(name);
    }
    out.push(b'\n');
}

/// Only names with an embedded newline are written in escaped form.
#[must_use]
pub fn needs_escape(name: &[u8]) -> bool {
    name.contains(&b'\n')
}

/// `\` to `\\`, then newline to `\n`.
#[must_use]
pub fn escape_name(name: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(name.len() + 8);
    for &b in name {
        match b {
            b'\\' => out.extend_from_slice(b"\\\\"),
            b'\n' => out.extend_from_slice(b"\\n"),
            _ => out.push(b),
        }
    }
    out
}

/// Inverse of [`escape_name`].
///
/// Scans left to right so `\\n` decodes to a backslash followed by `n`,
/// never to a backslash followed by a newline. Unknown escapes are kept
/// verbatim.
#[must_use]
pub fn unescape_name(name: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(name.len());
    let mut bytes = name.iter().copied();

    while let Some(b) = bytes.next() {
        if b != b'\\' {
            out.push(b);
            continue;
        }
        match bytes.next() {
            Some(b'\\') => out.push(b'\\'),
            Some(b'n') => out.push(b'\n'),
            Some(other) => {
                out.push(b'\\');
                out.push(other);
            }
            None => out.push(b'\\'),
        }
    }
    out
}
