//! The clarity-testgen command-line interface.
//!
//! This module is the main entry point for all CLI commands and orchestrates
//! the core library functions.

use std::path::Path;
use std::process;

use clap::Parser;

use crate::cli::args::{Command, ProjectArgs, TestgenArgs};
use crate::config::GeneratorConfig;
use crate::discovery::ContractDiscoverer;
use crate::errors::{GenError, Result};
use crate::pipeline::{generate_suite, plan_suite, write_suite};

pub mod args;
pub mod output;

/// The main entry point for the CLI.
pub fn run() {
    let args = TestgenArgs::parse();
    init_logging(args.verbose);

    // Dispatch to the appropriate subcommand handler.
    let result = match args.command {
        Command::Generate {
            project,
            out,
            dry_run,
        } => handle_generate(&project, out.as_deref(), dry_run),
        Command::List { project, json } => handle_list(&project, json),
    };

    if let Err(e) = result {
        output::print_error(e);
        process::exit(1);
    }
}

// ============================================================================
// COMMAND HANDLERS
// ============================================================================

/// Handles the `generate` subcommand.
fn handle_generate(project: &ProjectArgs, out: Option<&Path>, dry_run: bool) -> Result<()> {
    let mut config = load_config(project)?;
    if let Some(out) = out {
        config.target_dir = out.to_path_buf();
    }

    let contracts = ContractDiscoverer::load_project(&config)?;
    let suite = generate_suite(&contracts, &config)?;

    if dry_run {
        output::print_dry_run(&suite);
        return Ok(());
    }

    let written = write_suite(&suite, &config.target_dir)?;
    output::print_generated(&suite, &written);
    Ok(())
}

/// Handles the `list` subcommand.
fn handle_list(project: &ProjectArgs, json: bool) -> Result<()> {
    let config = load_config(project)?;
    let contracts = ContractDiscoverer::load_project(&config)?;
    let planned = plan_suite(&contracts, &config)?;

    if json {
        let text = serde_json::to_string_pretty(&planned)
            .map_err(|source| GenError::Render { what: "test plan", source })?;
        println!("{text}");
    } else {
        output::print_plan(&planned);
    }
    Ok(())
}

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

/// Loads the configuration file and applies command-line overrides.
fn load_config(project: &ProjectArgs) -> Result<GeneratorConfig> {
    let mut config = GeneratorConfig::discover(project.config.as_deref(), Path::new("."))?;
    if let Some(contracts) = &project.contracts {
        config.contracts_dir = contracts.clone();
    }
    if let Some(interfaces) = &project.interfaces {
        config.interfaces_dir = Some(interfaces.clone());
    }
    if let Some(deployer) = &project.deployer {
        config.deployer = deployer.clone();
    }
    Ok(config)
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}
