//! Orchestration: contracts in, generated files out.
//!
//! Generation and writing are separate steps. [`generate_suite`] builds
//! every file in memory and fails as a whole on the first configuration
//! error, so a broken test contract never leaves a partially written
//! target directory behind. [`write_suite`] is the only step that touches
//! the filesystem.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::annotations::FunctionAnnotations;
use crate::codegen::{
    collect_test_functions, display_name, generate_deps, generate_module, ModuleOutput,
    DEPS_FILE_NAME,
};
use crate::config::GeneratorConfig;
use crate::errors::{GenError, Result};
use crate::interface::{Contract, ContractId};

/// A file ready to be written into the target directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    /// Path relative to the target directory.
    pub file_name: String,
    pub contents: String,
}

/// Everything one generation run produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suite {
    pub deps: GeneratedFile,
    pub modules: Vec<ModuleOutput>,
}

impl Suite {
    /// All files, the dependency file first.
    pub fn files(&self) -> Vec<GeneratedFile> {
        let modules = self.modules.iter().map(|m| GeneratedFile {
            file_name: m.file_name.clone(),
            contents: m.contents.clone(),
        });
        std::iter::once(self.deps.clone()).chain(modules).collect()
    }

    pub fn test_count(&self) -> usize {
        self.modules.iter().map(|m| m.tests.len()).sum()
    }
}

/// Generates the dependency file and one test file per test contract.
pub fn generate_suite(contracts: &[Contract], config: &GeneratorConfig) -> Result<Suite> {
    ensure_unique_contracts(contracts)?;
    let mut modules = Vec::new();
    for contract in contracts {
        match generate_module(contract, &config.test_suffix)? {
            Some(module) => {
                log::info!("{}: {} test(s)", module.contract, module.tests.len());
                modules.push(module);
            }
            None => log::debug!("{}: not a test contract, skipped", contract.id),
        }
    }

    Ok(Suite {
        deps: GeneratedFile {
            file_name: DEPS_FILE_NAME.to_string(),
            contents: generate_deps(&config.harness, &config.bootstrap),
        },
        modules,
    })
}

/// The test functions of one test contract, as the generator sees them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedContract {
    pub contract: String,
    pub file_name: String,
    pub tests: Vec<PlannedTest>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedTest {
    pub function: String,
    pub display_name: String,
    pub annotations: FunctionAnnotations,
}

/// Lists every test contract and its test functions without generating code.
///
/// Applies the same validation as [`generate_suite`].
pub fn plan_suite(contracts: &[Contract], config: &GeneratorConfig) -> Result<Vec<PlannedContract>> {
    ensure_unique_contracts(contracts)?;
    let mut planned = Vec::new();
    for contract in contracts {
        if !contract.is_test_contract(&config.test_suffix) {
            continue;
        }
        let tests = collect_test_functions(contract)?
            .into_iter()
            .map(|f| PlannedTest {
                display_name: display_name(&f.name, &f.annotations),
                function: f.name,
                annotations: f.annotations,
            })
            .collect();
        planned.push(PlannedContract {
            contract: contract.id.to_string(),
            file_name: format!("{}.ts", contract.name()),
            tests,
        });
    }
    Ok(planned)
}

/// Rejects two contracts sharing one principal; their test files would collide.
fn ensure_unique_contracts(contracts: &[Contract]) -> Result<()> {
    let mut seen: BTreeMap<&ContractId, &Contract> = BTreeMap::new();
    for contract in contracts {
        if let Some(first) = seen.insert(&contract.id, contract) {
            return Err(GenError::DuplicateContract {
                id: contract.id.to_string(),
                first: first.source_name(),
                second: contract.source_name(),
            });
        }
    }
    Ok(())
}

/// Writes every file of `suite` into `target_dir`, creating it if needed.
///
/// Returns the written paths in write order.
pub fn write_suite(suite: &Suite, target_dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(target_dir).map_err(|e| GenError::io(target_dir, e))?;
    let mut written = Vec::new();
    for file in suite.files() {
        let path = target_dir.join(&file.file_name);
        fs::write(&path, &file.contents).map_err(|e| GenError::io(&path, e))?;
        log::debug!("Wrote {}", path.display());
        written.push(path);
    }
    Ok(written)
}
