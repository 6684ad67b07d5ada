//! The treecheck Command-Line Interface.
//!
//! Loads every testcase first, then runs them all against the calculator
//! reducer and prints the report. The process exits with the number of
//! failed testcases, or 1 if loading failed.

use std::path::Path;
use std::process;

use clap::Parser;
use termcolor::{ColorChoice, StandardStream};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::cli::args::{CliArgs, ColorMode};
use crate::errors::{io_failure, print_error};
use crate::reducer::{Calculator, CalculatorReducer};
use crate::test::{load_path, TestRunner};
use crate::HarnessError;

pub mod args;
pub mod output;

/// Resolved run options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunConfig {
    pub quiet: bool,
    pub color: ColorChoice,
    /// List testcases instead of running them.
    pub dump_only: bool,
}

impl RunConfig {
    pub fn from_args(args: &CliArgs) -> Self {
        Self {
            quiet: args.quiet,
            color: resolve_color(args.color),
            dump_only: args.dump,
        }
    }
}

fn resolve_color(mode: ColorMode) -> ColorChoice {
    match mode {
        ColorMode::Always => ColorChoice::Always,
        ColorMode::Never => ColorChoice::Never,
        ColorMode::Auto if atty::is(atty::Stream::Stdout) => ColorChoice::Auto,
        ColorMode::Auto => ColorChoice::Never,
    }
}

/// The main entry point for the CLI.
pub fn run() {
    let args = CliArgs::parse();
    init_tracing(args.verbose);

    let config = RunConfig::from_args(&args);
    match execute(&args.path, &config) {
        Ok(status) => process::exit(status),
        Err(e) => {
            print_error(e);
            process::exit(1);
        }
    }
}

/// Loads and runs everything under `path`. Returns the exit status.
pub fn execute(path: &Path, config: &RunConfig) -> Result<i32, HarnessError> {
    let testcases = load_path(path)?;
    let mut stdout = StandardStream::stdout(config.color);

    if config.dump_only {
        output::report_testcases(&mut stdout, &testcases).map_err(|e| io_failure("<stdout>", e))?;
        return Ok(0);
    }

    let mut reducer = CalculatorReducer::new();
    let summary = TestRunner::new(&mut reducer, &Calculator).run_all(&testcases);
    output::report_run(&mut stdout, &summary, config.quiet).map_err(|e| io_failure("<stdout>", e))?;
    Ok(summary.exit_status())
}

/// Logs go to stderr so stdout carries only the report.
fn init_tracing(verbose: bool) {
    let fallback = if verbose { "treecheck=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .try_init();
}
