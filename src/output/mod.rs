//! Output formatting, styling, and progress display for the scrubsum CLI.
//!
//! This module provides:
//! - Dimmed colors for routine messages
//! - Bold colors for warnings and errors
//! - Hashing milestones for long scans
//! - Verbosity control (quiet, normal, verbose)

mod progress;

use crate::config::ColorMode;
use colored::Colorize;
use std::io::IsTerminal;
use std::sync::atomic::{AtomicU8, Ordering};

pub use progress::MilestoneReporter;

/// Verbosity level for output messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    /// Suppress informational messages, show only warnings and errors.
    Quiet = 0,
    /// Default verbosity level, show all standard messages.
    Normal = 1,
    /// Show verbose debug messages in addition to standard output.
    Verbose = 2,
}

/// Global verbosity setting (default: Normal).
static VERBOSITY: AtomicU8 = AtomicU8::new(1);

/// Sets the global verbosity level for all output functions.
pub fn set_verbosity(level: Verbosity) {
    VERBOSITY.store(level as u8, Ordering::Relaxed);
}

/// Gets the current global verbosity level.
pub fn get_verbosity() -> Verbosity {
    match VERBOSITY.load(Ordering::Relaxed) {
        0 => Verbosity::Quiet,
        2 => Verbosity::Verbose,
        _ => Verbosity::Normal,
    }
}

/// Applies a color policy to everything printed through `colored`.
///
/// `Auto` colors only when both stdout and stderr are terminals and
/// `NO_COLOR` is unset.
pub fn set_color_mode(mode: ColorMode) {
    let enabled = match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => {
            std::env::var_os("NO_COLOR").is_none()
                && std::io::stdout().is_terminal()
                && std::io::stderr().is_terminal()
        }
    };
    colored::control::set_override(enabled);
}

/// Prints an error message in bold red (always shown).
pub fn error(message: &str) {
    eprintln!("{}", message.red().bold());
}

/// Prints a verbose debug message (only in verbose mode).
pub fn verbose(message: &str) {
    if get_verbosity() != Verbosity::Verbose {
        return;
    }
    eprintln!("{}", message.dimmed());
}
