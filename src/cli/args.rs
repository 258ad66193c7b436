//! Defines the command-line arguments and subcommands for the generator CLI.
//!
//! This module uses the `clap` crate with its "derive" feature to create a
//! declarative and type-safe argument parsing structure.

use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

/// The main CLI argument structure.
#[derive(Debug, Parser)]
#[command(
    name = "clarity-testgen",
    version,
    about = "Generates Clarinet test suites from annotated Clarity test contracts."
)]
pub struct TestgenArgs {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Options shared by every command that reads a project.
#[derive(Debug, Clone, Args)]
pub struct ProjectArgs {
    /// Configuration file (defaults to ./testgen.yaml when present).
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Directory containing the `.clar` contracts.
    #[arg(long)]
    pub contracts: Option<PathBuf>,
    /// Directory of Clarinet interface JSON files, one `<contract>.json` each.
    #[arg(long)]
    pub interfaces: Option<PathBuf>,
    /// Deployer address used to build contract principals.
    #[arg(long)]
    pub deployer: Option<String>,
}

/// An enumeration of all available CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate one test file per test contract plus the shared deps.ts.
    Generate {
        #[command(flatten)]
        project: ProjectArgs,
        /// Target directory for the generated files.
        #[arg(short, long)]
        out: Option<PathBuf>,
        /// Print the generated files instead of writing them.
        #[arg(long)]
        dry_run: bool,
    },
    /// List test contracts, their test functions and resolved annotations.
    List {
        #[command(flatten)]
        project: ProjectArgs,
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
}
