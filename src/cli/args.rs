//! Defines the command-line arguments for the treecheck CLI.
//!
//! This module uses the `clap` crate with its "derive" feature to create a
//! declarative and type-safe argument parsing structure.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// The main CLI argument structure.
#[derive(Debug, Parser)]
#[command(
    name = "treecheck",
    version,
    about = "Checks a tree reducer against tag-notation testcase files."
)]
pub struct CliArgs {
    /// A testcase file, or a directory searched recursively for `.xml` files.
    #[arg(required = true)]
    pub path: PathBuf,

    /// Print only failures and the summary.
    #[arg(short, long)]
    pub quiet: bool,

    /// When to color the report.
    #[arg(long, value_enum, default_value_t = ColorMode::Auto)]
    pub color: ColorMode,

    /// Log loading and run details to stderr. `RUST_LOG` takes precedence.
    #[arg(short, long)]
    pub verbose: bool,

    /// Print each loaded testcase and its tree instead of running them.
    #[arg(long)]
    pub dump: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    Auto,
    Always,
    Never,
}
