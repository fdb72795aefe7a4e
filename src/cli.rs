//! Command-line interface definitions for scrubsum.
//!
//! The CLI definition is shared between the main binary and build tools
//! (like xtask) for man page generation.
//!
//! Note: Field-level documentation doubles as clap help text, so we allow
//! missing_docs for this module to avoid redundant documentation.

#![allow(missing_docs)]
#![allow(clippy::missing_docs_in_private_items)]

use clap::{ArgGroup, Parser};
use clap_complete::Shell;
use std::path::PathBuf;

/// Main CLI structure for scrubsum.
#[derive(Parser, Debug)]
#[command(
    name = "scrubsum",
    version = crate::VERSION,
    about = "Detect modified, deleted, and added files with SHA-1 checksums",
    long_about = "Re-hashes every file below TARGET_DIRECTORY, compares the result \
                  with the SCRUBSUMS manifest stored there, reports what changed, \
                  and optionally records the new state.\n\n\
                  Exit status: 0 no changes, 1 changes detected, 2 no such directory, \
                  5 I/O error, 13 permission denied, 20 not a directory, 22 invalid arguments."
)]
#[command(group(ArgGroup::new("commit").args(["verify_only", "commit_changes"])))]
pub struct Cli {
    /// Directory to scan
    #[arg(
        value_name = "TARGET_DIRECTORY",
        required_unless_present = "completions"
    )]
    pub target: Option<PathBuf>,

    /// Report changes but never update SCRUBSUMS
    #[arg(long)]
    pub verify_only: bool,

    /// Update SCRUBSUMS without asking
    #[arg(long)]
    pub commit_changes: bool,

    /// Number of hashing workers per scan phase
    #[arg(short = 'j', long, value_name = "N", value_parser = clap::value_parser!(u16).range(1..))]
    pub workers: Option<u16>,

    /// Configuration file to use
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Do not report hashing progress
    #[arg(long)]
    pub no_progress: bool,

    /// Show verbose output
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Suppress informational messages
    #[arg(short, long)]
    pub quiet: bool,

    /// Print a shell completion script and exit
    #[arg(long, value_name = "SHELL", exclusive = true)]
    pub completions: Option<Shell>,
}

impl Cli {
    /// Commit decision taken on the command line, if any.
    ///
    /// `Some(false)` for `--verify-only`, `Some(true)` for
    /// `--commit-changes`, `None` when the user should be asked.
    #[must_use]
    pub const fn commit_choice(&self) -> Option<bool> {
        if self.verify_only {
            Some(false)
        } else if self.commit_changes {
            Some(true)
        } else {
            None
        }
    }
}
