use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use clap_complete::{Generator, generate};
use scrubsum::cli::Cli;
use scrubsum::commands::{self, ScanCommand};
use scrubsum::config::Config;
use scrubsum::output::{self, Verbosity};
use scrubsum::ExitStatus;
use std::io;
use std::process;
use tracing_subscriber::EnvFilter;

/// Environment variable holding a `tracing` filter directive.
const LOG_ENV: &str = "SCRUBSUM_LOG";

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let status = match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitStatus::NoChange,
                _ => ExitStatus::InvalidInvocation,
            };
            let _ = e.print();
            process::exit(status.code());
        }
    };

    init_logging(&cli);

    match run(cli) {
        Ok(status) => process::exit(status.code()),
        Err(e) => {
            output::error(&format!("scrubsum: {e}"));
            process::exit(ExitStatus::for_error(&e).code());
        }
    }
}

fn run(cli: Cli) -> Result<ExitStatus> {
    if let Some(shell) = cli.completions {
        print_completions(shell, &mut Cli::command());
        return Ok(ExitStatus::NoChange);
    }

    output::set_verbosity(if cli.quiet {
        Verbosity::Quiet
    } else if cli.verbose {
        Verbosity::Verbose
    } else {
        Verbosity::Normal
    });

    let mut config = Config::discover(cli.config.as_deref())?;
    if let Some(workers) = cli.workers {
        config.set_workers(usize::from(workers))?;
    }
    if cli.no_progress {
        config.output.progress = false;
    }
    output::set_color_mode(config.output.color);
    output::verbose(&format!(
        "scanning with {} workers, {} byte buffers",
        config.scan.workers, config.scan.buffer_size
    ));

    let commit = cli.commit_choice();
    let root = cli.target.context("missing TARGET_DIRECTORY")?;
    commands::scan::execute(&ScanCommand {
        root,
        commit,
        config,
    })
}

/// Install the stderr log subscriber.
///
/// `--verbose` forces debug output; otherwise `SCRUBSUM_LOG` decides,
/// falling back to warnings only.
fn init_logging(cli: &Cli) {
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else if cli.quiet {
        EnvFilter::new("error")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn print_completions<G: Generator>(g: G, cmd: &mut clap::Command) {
    generate(g, cmd, cmd.get_name().to_string(), &mut io::stdout());
}
