//! Hashing progress reported on stderr.

use crate::scan::ProgressObserver;
use colored::Colorize;
use std::io::{self, Write};

/// Prints `scrubsum: N files` whenever the hash count reaches a milestone.
///
/// Each milestone gets a line of its own, so the output stays readable when
/// stderr is redirected to a log.
pub struct MilestoneReporter {
    /// Prefix printed before the count
    label: &'static str,
}

impl Default for MilestoneReporter {
    fn default() -> Self {
        Self::new("scrubsum")
    }
}

impl MilestoneReporter {
    /// Create a reporter whose lines start with `label`
    #[must_use]
    pub const fn new(label: &'static str) -> Self {
        Self { label }
    }

    /// Print the running total once hashing is over
    pub fn finish(&self, hashed: usize) {
        self.print(hashed);
    }

    /// Format a single progress line
    fn line(&self, hashed: usize) -> String {
        format!("{}: {hashed} files", self.label)
    }

    /// Write one progress line to stderr
    fn print(&self, hashed: usize) {
        let mut stderr = io::stderr().lock();
        let _ = writeln!(stderr, "{}", self.line(hashed).dimmed());
        let _ = stderr.flush();
    }
}

impl ProgressObserver for MilestoneReporter {
    fn milestone(&self, hashed: usize) {
        self.print(hashed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_format() {
        let reporter = MilestoneReporter::default();
        assert_eq!(reporter.line(200), "scrubsum: 200 files");
        assert_eq!(MilestoneReporter::new("scrub").line(10), "scrub: 10 files");
    }
}
