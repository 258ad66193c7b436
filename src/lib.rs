//! clarity-testgen: Clarinet test suites from annotated Clarity test contracts.
//!
//! # Architecture
//!
//! ```text
//! .clar sources → discovery → Contract (source + interface)
//!                                 ↓
//!                 annotations → AnnotationMap per test function
//!                                 ↓
//!                   codegen → <contract>.ts + deps.ts → pipeline → target dir
//! ```
//!
//! Only public, zero-argument functions named `test-*` in contracts whose
//! name ends in `_test` become tests. Their behavior is driven by comment
//! tags above the declaration (`@name`, `@caller`, `@prepare`,
//! `@no-prepare`, `@mine-blocks-before`, `@print`).

pub mod annotations;
pub mod cli;
pub mod codegen;
pub mod config;
pub mod discovery;
pub mod errors;
pub mod interface;
pub mod pipeline;

pub use annotations::{extract_test_annotations, AnnotationMap, AnnotationValue, FunctionAnnotations};
pub use codegen::{generate_deps, generate_module, generate_test};
pub use config::GeneratorConfig;
pub use errors::{GenError, Result};
pub use interface::{Contract, ContractId, ContractInterface};
