//! Handles all user-facing output for the CLI.
//!
//! Colored summaries go to stdout; errors are rendered as miette reports on
//! stderr.

use std::io::Write;
use std::path::PathBuf;

use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::errors::GenError;
use crate::pipeline::{PlannedContract, Suite};

// ============================================================================
// CORE OUTPUT FUNCTIONS
// ============================================================================

/// Prints what a `generate` run wrote.
pub fn print_generated(suite: &Suite, written: &[PathBuf]) {
    let mut stdout = StandardStream::stdout(ColorChoice::Auto);
    for module in &suite.modules {
        let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Green)));
        let _ = write!(stdout, "✓ ");
        let _ = stdout.reset();
        let _ = writeln!(stdout, "{} ({} tests)", module.file_name, module.tests.len());
    }
    let _ = stdout.set_color(ColorSpec::new().set_bold(true));
    let _ = writeln!(
        stdout,
        "Generated {} test(s) in {} file(s)",
        suite.test_count(),
        written.len()
    );
    let _ = stdout.reset();
}

/// Prints every generated file to stdout, each preceded by its name.
pub fn print_dry_run(suite: &Suite) {
    let mut stdout = StandardStream::stdout(ColorChoice::Auto);
    for file in suite.files() {
        let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)).set_bold(true));
        let _ = writeln!(stdout, "--- {} ---", file.file_name);
        let _ = stdout.reset();
        let _ = writeln!(stdout, "{}", file.contents);
    }
}

/// Prints the test plan in human-readable form.
pub fn print_plan(planned: &[PlannedContract]) {
    let mut stdout = StandardStream::stdout(ColorChoice::Auto);
    if planned.is_empty() {
        let _ = writeln!(stdout, "  No test contracts found.");
        return;
    }

    for contract in planned {
        let _ = stdout.set_color(ColorSpec::new().set_bold(true));
        let _ = writeln!(stdout, "{}", contract.contract);
        let _ = stdout.reset();
        for test in &contract.tests {
            let _ = writeln!(stdout, "  {}", test.display_name);
            for (key, value) in test.annotations.iter() {
                let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)));
                let _ = write!(stdout, "    @{key}");
                let _ = stdout.reset();
                match value.as_str() {
                    Some(v) => {
                        let _ = writeln!(stdout, " {v}");
                    }
                    None => {
                        let _ = writeln!(stdout);
                    }
                }
            }
        }
    }
}

/// Renders an error with its diagnostic code, help and source snippet.
pub fn print_error(error: GenError) {
    let report = miette::Report::new(error);
    eprintln!("{report:?}");
}
