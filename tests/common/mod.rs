#![allow(dead_code)]

use anyhow::Result;
use assert_cmd::Command;
use scrubsum::Digest;
use scrubsum::utils::hash::hash_bytes;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Scratch directory tree used as a scan root
pub struct TestTree {
    pub temp_dir: TempDir,
}

impl TestTree {
    /// Create an empty scan root
    pub fn new() -> Result<Self> {
        Ok(Self {
            temp_dir: TempDir::new()?,
        })
    }

    /// Scan root path
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Write `content` to `relative`, creating parent directories
    pub fn write(&self, relative: &str, content: &str) -> Result<PathBuf> {
        let path = self.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, content)?;
        Ok(path)
    }

    /// Delete the file at `relative`
    pub fn remove(&self, relative: &str) -> Result<()> {
        fs::remove_file(self.path().join(relative))?;
        Ok(())
    }

    /// Path of the manifest inside this tree
    pub fn manifest_path(&self) -> PathBuf {
        self.path().join(scrubsum::SUMS_FILE_NAME)
    }

    /// Raw manifest contents, empty if none was written yet
    pub fn manifest_text(&self) -> Result<String> {
        match fs::read_to_string(self.manifest_path()) {
            Ok(text) => Ok(text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(String::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Write a manifest by hand
    pub fn write_manifest(&self, text: &str) -> Result<()> {
        fs::write(self.manifest_path(), text)?;
        Ok(())
    }
}

/// Digest of a string, as it would be recorded in a manifest
pub fn digest_of(content: &str) -> Digest {
    hash_bytes(content.as_bytes())
}

/// `scrubsum` binary isolated from the user's configuration
pub fn scrubsum_cmd(config_dir: &Path) -> Result<Command> {
    let mut cmd = Command::cargo_bin("scrubsum")?;
    cmd.env("SCRUBSUM_CONFIG", config_dir.join("absent.toml"))
        .env_remove("SCRUBSUM_LOG")
        .env("NO_COLOR", "1");
    Ok(cmd)
}
