use crate::config::Config;
use crate::error::ExitStatus;
use crate::output::{self, MilestoneReporter};
use crate::scan::{ScanOptions, ScanReport, ScanSession};
use crate::tracking::codec::{escape_name, needs_escape};
use crate::utils::paths::path_to_bytes;
use anyhow::{Context, Result};
use colored::{ColoredString, Colorize};
use std::io::{self, BufRead, IsTerminal, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// What the user asked for on the command line
#[derive(Debug, Clone)]
pub struct ScanCommand {
    /// Directory to scan
    pub root: PathBuf,
    /// `Some(true)` commit without asking, `Some(false)` never commit,
    /// `None` ask when interactive
    pub commit: Option<bool>,
    /// Effective configuration, command-line overrides applied
    pub config: Config,
}

/// Scan `command.root`, report the differences, and maybe commit them.
///
/// Returns [`ExitStatus::NoChange`] when the tree matches its manifest and
/// [`ExitStatus::Changes`] otherwise, whether or not the changes were
/// committed.
///
/// # Errors
///
/// Returns an error if:
/// - The root cannot be scanned (see [`crate::error::ScanError`])
/// - The answer to the prompt cannot be read
/// - The manifest cannot be written
pub fn execute(command: &ScanCommand) -> Result<ExitStatus> {
    let mut session = ScanSession::open(&command.root, ScanOptions::from(&command.config))?;

    let show_progress =
        command.config.output.progress && output::get_verbosity() != output::Verbosity::Quiet;
    if show_progress {
        session = session.with_observer(Box::new(MilestoneReporter::default()));
    }

    let report = session.run()?;
    if show_progress {
        MilestoneReporter::default().finish(session.files_hashed());
    }

    print_report(&mut io::stdout().lock(), &report).context("failed to write report")?;
    eprintln!("{}", summary(&report));

    if !report.has_changes() {
        return Ok(ExitStatus::NoChange);
    }

    let accepted = match command.commit {
        Some(choice) => choice,
        None if is_interactive() => {
            prompt(&mut io::stdin().lock(), &mut io::stderr()).context("error reading response")?
        }
        None => {
            debug!("no terminal attached, not asking");
            false
        }
    };

    if accepted {
        session.commit(&report)?;
        eprintln!("SCRUBSUMS updated.");
    } else {
        eprintln!("Exiting without changes...");
    }

    Ok(ExitStatus::Changes)
}

/// Whether a human can answer the prompt
fn is_interactive() -> bool {
    io::stdin().is_terminal() && io::stdout().is_terminal()
}

/// Write one ` M `, ` D `, or ` A ` line per changed path.
///
/// # Errors
///
/// Returns an error if writing to `out` fails.
pub fn print_report<W: Write>(out: &mut W, report: &ScanReport) -> io::Result<()> {
    print_paths(out, &report.modified, "M".yellow())?;
    print_paths(out, &report.deleted, "D".red())?;
    print_paths(out, &report.added, "A".green())?;
    out.flush()
}

/// Write `paths` with the given status letter
fn print_paths<W: Write>(out: &mut W, paths: &[PathBuf], letter: ColoredString) -> io::Result<()> {
    for path in paths {
        write!(out, " {letter} ")?;
        out.write_all(&display_name(path))?;
        out.write_all(b"\n")?;
    }
    Ok(())
}

/// Path bytes as shown in the report, escaped if they contain a newline
fn display_name(path: &Path) -> Vec<u8> {
    let name = path_to_bytes(path);
    if needs_escape(&name) {
        escape_name(&name)
    } else {
        name
    }
}

/// One-line summary of a report, e.g. `2 files modified. 1 files added. `
#[must_use]
pub fn summary(report: &ScanReport) -> String {
    if !report.has_changes() {
        return "No changes detected.".to_string();
    }

    let mut line = String::new();
    for (count, what) in [
        (report.modified.len(), "modified"),
        (report.deleted.len(), "deleted"),
        (report.added.len(), "added"),
    ] {
        if count > 0 {
            line.push_str(&format!("{count} files {what}. "));
        }
    }
    line
}

/// Ask whether to accept the changes until the answer is `y` or `n`.
///
/// End of input counts as `n`.
///
/// # Errors
///
/// Returns an error if reading the answer or writing the question fails.
pub fn prompt<R: BufRead, W: Write>(input: &mut R, err: &mut W) -> io::Result<bool> {
    loop {
        write!(err, "Accept these changes [yn]? ")?;
        err.flush()?;

        let mut reply = String::new();
        if input.read_line(&mut reply)? == 0 {
            writeln!(err)?;
            return Ok(false);
        }

        match reply.trim_end_matches(['\n', '\r']) {
            "y" => return Ok(true),
            "n" => return Ok(false),
            _ => writeln!(err, "Please choose either 'y' or 'n'.")?,
        }
    }
}
