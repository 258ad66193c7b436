//! Error handling for the test generator.
//!
//! Every fallible operation in the crate returns [`Result<T>`]. Errors are
//! `miette` diagnostics so the CLI can render them with source context and
//! a stable diagnostic code (`testgen::*`).
//!
//! Only configuration problems and I/O failures are reported here. Lenient
//! parse situations (unknown annotations, unparsable numbers, missing
//! comment blocks) are defaulted silently by the parser and generator.

use std::path::PathBuf;
use std::sync::Arc;

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Result type alias for generator operations.
pub type Result<T> = std::result::Result<T, GenError>;

/// Shared source handle attached to diagnostics.
pub type SourceArc = Arc<NamedSource<String>>;

/// All errors produced while discovering contracts and generating tests.
#[derive(Error, Diagnostic, Debug)]
pub enum GenError {
    /// A `test-` function takes arguments; the generated call site cannot supply them.
    #[error("Test functions cannot take arguments (offending function: {function} in {contract})")]
    #[diagnostic(
        code(testgen::config::test_arguments),
        help("test functions are called with no arguments; move inputs into the function body or a prepare function")
    )]
    TestFunctionArguments {
        function: String,
        contract: String,
        arg_count: usize,
        #[source_code]
        src: SourceArc,
        #[label("declared with {arg_count} argument(s)")]
        span: Option<SourceSpan>,
    },

    #[error("Failed to access '{}'", path.display())]
    #[diagnostic(code(testgen::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to walk contracts directory")]
    #[diagnostic(code(testgen::io::walk))]
    Walk(#[from] walkdir::Error),

    #[error("Invalid configuration file '{}'", path.display())]
    #[diagnostic(
        code(testgen::config::invalid),
        help("see the README for the supported `testgen.yaml` keys")
    )]
    Config {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid contract interface '{}'", path.display())]
    #[diagnostic(
        code(testgen::interface::invalid),
        help("interfaces must use the Clarinet `contract_interface` JSON layout")
    )]
    Interface {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Contract {id} is defined twice ('{first}' and '{second}')")]
    #[diagnostic(
        code(testgen::discovery::duplicate),
        help("contract names come from file names; rename one of the files")
    )]
    DuplicateContract {
        id: String,
        first: String,
        second: String,
    },

    #[error("Failed to render {what} as JSON")]
    #[diagnostic(code(testgen::output::json))]
    Render {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid contract identifier '{id}'")]
    #[diagnostic(
        code(testgen::interface::contract_id),
        help("contract identifiers have the form <address>.<contract-name>")
    )]
    InvalidContractId { id: String },
}

impl GenError {
    /// Wraps an I/O failure together with the path that caused it.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        GenError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Builds a named source handle for diagnostics.
pub fn to_error_src(name: impl AsRef<str>, source: &str) -> SourceArc {
    Arc::new(NamedSource::new(name, source.to_string()))
}
