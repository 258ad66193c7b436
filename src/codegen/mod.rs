//! Code generation for Clarinet test suites.
//!
//! # Overview
//!
//! The generator produces TypeScript for the Clarinet Deno harness:
//! - one `<contract>.ts` file per test contract ([`generate_module`])
//! - one shared `deps.ts` with re-exports and the bootstrap routine ([`generate_deps`])
//!
//! Output is a pure function of the contracts and configuration, so running
//! the generator twice on unchanged input yields identical bytes.

mod deps;
mod module;
mod test_case;

pub use deps::generate_deps;
pub use module::{collect_test_functions, generate_module, ModuleOutput, TestFunction};
pub use test_case::{
    apply_prepare_defaults, caller_expression, display_name, generate_test, normal_mine_block,
    prepare_tx, special_mine_block, Caller, TestPlan,
};

pub use crate::interface::{DEFAULT_PREPARE_FUNCTION, TEST_FUNCTION_PREFIX};

/// Header placed at the top of every generated file.
pub const WARNING_HEADER: &str = "// Code generated using `clarity-testgen generate`.
// Manual edits will be lost.";

/// Name of the shared dependency file.
pub const DEPS_FILE_NAME: &str = "deps.ts";

/// Import line of every generated test file.
pub const MODULE_IMPORTS: &str =
    "import { Clarinet, Tx, Chain, Account, types, assertEquals, printEvents, bootstrap } from './deps.ts';";
