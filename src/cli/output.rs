//! Handles all user-facing output for the CLI.
//!
//! Every function writes to a [`WriteColor`], so the same code renders to the
//! terminal and to an in-memory buffer in tests. Logs never come through
//! here; they go to stderr through `tracing`.

use std::io;

use termcolor::{Color, ColorSpec, WriteColor};

use crate::ast::dump::to_xml;
use crate::test::{Expectation, RunSummary, TestOutcome, Testcase};

// ============================================================================
// RUN REPORT
// ============================================================================

/// Writes one line per outcome, then the summary.
pub fn report_run<W: WriteColor>(out: &mut W, summary: &RunSummary, quiet: bool) -> io::Result<()> {
    for outcome in &summary.outcomes {
        report_outcome(out, outcome, quiet)?;
    }
    report_summary(out, summary)
}

/// `Succeeded: <name>`, or a `FAILED` line followed by the tree dump.
pub fn report_outcome<W: WriteColor>(out: &mut W, outcome: &TestOutcome, quiet: bool) -> io::Result<()> {
    match outcome {
        TestOutcome::Succeeded { name } => {
            if quiet {
                return Ok(());
            }
            status(out, Color::Green, "Succeeded")?;
            writeln!(out, ": {}", name)
        }
        TestOutcome::Mismatch {
            name,
            expected,
            actual,
            dump,
        } => {
            status(out, Color::Red, "FAILED")?;
            writeln!(out, ": {}, expected {} != actual {}", name, expected, actual)?;
            writeln!(out, "{}", dump)
        }
        TestOutcome::ReductionFailed { name, error, dump } => {
            status(out, Color::Red, "FAILED")?;
            writeln!(out, ": {}, exception {}", name, error)?;
            writeln!(out, "{}", dump)
        }
    }
}

/// `Test summary: N total, S succeeded, K failed`
pub fn report_summary<W: WriteColor>(out: &mut W, summary: &RunSummary) -> io::Result<()> {
    write!(
        out,
        "Test summary: {} total, {} succeeded, ",
        summary.total(),
        summary.succeeded()
    )?;
    let failed = format!("{} failed", summary.failed());
    if summary.has_failures() {
        out.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true))?;
        write!(out, "{}", failed)?;
        out.reset()?;
    } else {
        write!(out, "{}", failed)?;
    }
    writeln!(out)
}

// ============================================================================
// TESTCASE LISTING
// ============================================================================

/// Lists loaded testcases without running them.
pub fn report_testcases<W: WriteColor>(out: &mut W, testcases: &[Testcase]) -> io::Result<()> {
    for testcase in testcases {
        out.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)).set_bold(true))?;
        write!(out, "{}", testcase.name)?;
        out.reset()?;
        writeln!(
            out,
            " ({}): {}",
            testcase.origin,
            describe_expectation(&testcase.expectation)
        )?;
        writeln!(out, "{}", to_xml(testcase.root.as_ref()))?;
    }
    Ok(())
}

fn describe_expectation(expectation: &Expectation) -> String {
    match expectation {
        Expectation::Value { kind, expected } => format!("{} = {}", kind, expected),
        Expectation::CanProduce(kind) => format!("can produce {}", kind),
        Expectation::CannotProduce(kind) => format!("cannot produce {}", kind),
    }
}

// ============================================================================
// PRIVATE HELPERS
// ============================================================================

fn status<W: WriteColor>(out: &mut W, color: Color, label: &str) -> io::Result<()> {
    out.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true))?;
    write!(out, "{}", label)?;
    out.reset()
}
