//! Contract model: identifiers, sources and declared function interfaces.
//!
//! Interfaces normally come from Clarinet's `contract_interface` JSON. When
//! none is supplied, [`ContractInterface::from_source`] derives one with a
//! small declaration scanner that only understands what the generator
//! needs: function name, visibility and argument count.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use miette::SourceSpan;
use serde::{Deserialize, Serialize};

use crate::errors::GenError;

/// Prefix that marks a public function as a test.
pub const TEST_FUNCTION_PREFIX: &str = "test-";

/// Name of the module-level setup function injected before every test.
pub const DEFAULT_PREPARE_FUNCTION: &str = "prepare";

// =============================================================================
// SPANS
// =============================================================================

/// Byte range in a contract source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl From<Span> for SourceSpan {
    fn from(span: Span) -> Self {
        (span.start, span.end.saturating_sub(span.start)).into()
    }
}

// =============================================================================
// INTERFACE TYPES
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FunctionAccess {
    Public,
    ReadOnly,
    Private,
}

impl FunctionAccess {
    fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "define-public" => Some(FunctionAccess::Public),
            "define-read-only" => Some(FunctionAccess::ReadOnly),
            "define-private" => Some(FunctionAccess::Private),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionArg {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: serde_json::Value,
}

/// One declared function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractFunction {
    pub name: String,
    pub access: FunctionAccess,
    #[serde(default)]
    pub args: Vec<FunctionArg>,
    /// Location of the declaration in the contract source, when known.
    #[serde(skip)]
    pub span: Option<Span>,
}

impl ContractFunction {
    pub fn is_public(&self) -> bool {
        self.access == FunctionAccess::Public
    }

    /// Public function following the `test-` naming convention.
    pub fn is_test_function(&self) -> bool {
        self.is_public() && self.name.starts_with(TEST_FUNCTION_PREFIX)
    }
}

/// Declared functions of a contract, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContractInterface {
    #[serde(default)]
    pub functions: Vec<ContractFunction>,
}

impl ContractInterface {
    /// Parses a Clarinet `contract_interface` document. Unknown fields are ignored.
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    /// Derives the interface by scanning the contract's declarations.
    pub fn from_source(source: &str) -> Self {
        ContractInterface {
            functions: DeclarationScanner::new(source).scan(),
        }
    }

    pub fn function(&self, name: &str) -> Option<&ContractFunction> {
        self.functions.iter().find(|f| f.name == name)
    }
}

// =============================================================================
// CONTRACTS
// =============================================================================

/// A contract principal, `<address>.<contract-name>`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ContractId {
    pub deployer: String,
    pub name: String,
}

impl ContractId {
    pub fn new(deployer: impl Into<String>, name: impl Into<String>) -> Self {
        ContractId {
            deployer: deployer.into(),
            name: name.into(),
        }
    }
}

impl FromStr for ContractId {
    type Err = GenError;

    fn from_str(id: &str) -> Result<Self, Self::Err> {
        match id.split_once('.') {
            Some((deployer, name)) if !deployer.is_empty() && !name.is_empty() => {
                Ok(ContractId::new(deployer, name))
            }
            _ => Err(GenError::InvalidContractId { id: id.to_string() }),
        }
    }
}

impl fmt::Display for ContractId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.deployer, self.name)
    }
}

/// A contract as handed to the generator.
#[derive(Debug, Clone)]
pub struct Contract {
    pub id: ContractId,
    /// File the source was read from, if any.
    pub path: Option<PathBuf>,
    pub source: String,
    pub interface: ContractInterface,
}

impl Contract {
    /// Builds a contract, filling in declaration spans the interface lacks.
    pub fn new(id: ContractId, source: impl Into<String>, mut interface: ContractInterface) -> Self {
        let source = source.into();
        let scanned = ContractInterface::from_source(&source);
        for function in interface.functions.iter_mut().filter(|f| f.span.is_none()) {
            function.span = scanned.function(&function.name).and_then(|f| f.span);
        }
        Contract {
            id,
            path: None,
            source,
            interface,
        }
    }

    /// Builds a contract whose interface is derived from its own source.
    pub fn from_source(id: ContractId, source: impl Into<String>) -> Self {
        let source = source.into();
        let interface = ContractInterface::from_source(&source);
        Contract {
            id,
            path: None,
            source,
            interface,
        }
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.id.name
    }

    /// Display name used in diagnostics: the file path if known, else the principal.
    pub fn source_name(&self) -> String {
        match &self.path {
            Some(path) => path.display().to_string(),
            None => self.id.to_string(),
        }
    }

    /// Only contracts whose local name ends in `suffix` are test contracts.
    pub fn is_test_contract(&self, suffix: &str) -> bool {
        self.id.name.ends_with(suffix)
    }

    /// True when the contract exposes a public, zero-argument `prepare`.
    pub fn has_default_prepare(&self) -> bool {
        self.interface.functions.iter().any(|f| {
            f.name == DEFAULT_PREPARE_FUNCTION && f.is_public() && f.args.is_empty()
        })
    }

    /// Test functions in reverse interface order.
    pub fn test_functions(&self) -> impl Iterator<Item = &ContractFunction> {
        self.interface
            .functions
            .iter()
            .rev()
            .filter(|f| f.is_test_function())
    }
}

// =============================================================================
// DECLARATION SCANNER
// =============================================================================

/// Finds top-level `define-public` / `define-read-only` / `define-private`
/// forms, skipping comments and string literals.
struct DeclarationScanner<'a> {
    source: &'a str,
    bytes: &'a [u8],
}

impl<'a> DeclarationScanner<'a> {
    fn new(source: &'a str) -> Self {
        DeclarationScanner {
            source,
            bytes: source.as_bytes(),
        }
    }

    fn scan(&self) -> Vec<ContractFunction> {
        let mut functions = Vec::new();
        let mut depth = 0usize;
        let mut position = 0;

        while position < self.bytes.len() {
            match self.bytes[position] {
                b';' => position = self.skip_comment(position),
                b'"' => position = self.skip_string(position),
                b'(' => {
                    if depth == 0 {
                        if let Some(function) = self.read_declaration(position) {
                            functions.push(function);
                        }
                    }
                    depth += 1;
                    position += 1;
                }
                b')' => {
                    depth = depth.saturating_sub(1);
                    position += 1;
                }
                _ => position += 1,
            }
        }

        functions
    }

    /// Reads `(define-xxx (name (arg type)...)` starting at the opening parenthesis.
    fn read_declaration(&self, open: usize) -> Option<ContractFunction> {
        let keyword_start = open + 1;
        let keyword_end = self.token_end(keyword_start);
        let access = FunctionAccess::from_keyword(&self.source[keyword_start..keyword_end])?;

        let signature = self.skip_whitespace(keyword_end);
        if signature == keyword_end || self.bytes.get(signature) != Some(&b'(') {
            return None;
        }

        let name_start = self.skip_whitespace(signature + 1);
        let name_end = self.token_end(name_start);
        if name_end == name_start {
            return None;
        }

        let (args, signature_end) = self.read_args(name_end)?;
        Some(ContractFunction {
            name: self.source[name_start..name_end].to_string(),
            access,
            args,
            span: Some(Span {
                start: open,
                end: signature_end,
            }),
        })
    }

    /// Reads argument groups up to the signature's closing parenthesis.
    /// Returns the arguments and the offset just past that parenthesis.
    fn read_args(&self, mut position: usize) -> Option<(Vec<FunctionArg>, usize)> {
        let mut args = Vec::new();
        loop {
            position = self.skip_whitespace(position);
            match self.bytes.get(position)? {
                b')' => return Some((args, position + 1)),
                b';' => position = self.skip_comment(position),
                b'(' => {
                    let close = self.matching_paren(position)?;
                    args.push(Self::parse_arg(&self.source[position + 1..close]));
                    position = close + 1;
                }
                _ => position = self.token_end(position).max(position + 1),
            }
        }
    }

    fn parse_arg(text: &str) -> FunctionArg {
        let text = text.trim();
        let (name, ty) = text
            .split_once(char::is_whitespace)
            .unwrap_or((text, ""));
        FunctionArg {
            name: name.to_string(),
            ty: serde_json::Value::String(ty.trim().to_string()),
        }
    }

    fn matching_paren(&self, open: usize) -> Option<usize> {
        let mut depth = 0usize;
        let mut position = open;
        while position < self.bytes.len() {
            match self.bytes[position] {
                b';' => {
                    position = self.skip_comment(position);
                    continue;
                }
                b'"' => {
                    position = self.skip_string(position);
                    continue;
                }
                b'(' => depth += 1,
                b')' => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(position);
                    }
                }
                _ => {}
            }
            position += 1;
        }
        None
    }

    fn token_end(&self, mut position: usize) -> usize {
        while let Some(&b) = self.bytes.get(position) {
            if b.is_ascii_whitespace() || b == b'(' || b == b')' || b == b'|' || b == b';' {
                break;
            }
            position += 1;
        }
        position
    }

    fn skip_whitespace(&self, mut position: usize) -> usize {
        while self.bytes.get(position).is_some_and(u8::is_ascii_whitespace) {
            position += 1;
        }
        position
    }

    fn skip_comment(&self, mut position: usize) -> usize {
        while self.bytes.get(position).is_some_and(|&b| b != b'\n') {
            position += 1;
        }
        position
    }

    fn skip_string(&self, open: usize) -> usize {
        let mut position = open + 1;
        while let Some(&b) = self.bytes.get(position) {
            match b {
                b'\\' => position += 2,
                b'"' => return position + 1,
                _ => position += 1,
            }
        }
        position
    }
}
