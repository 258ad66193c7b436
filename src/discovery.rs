use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::config::GeneratorConfig;
use crate::errors::{GenError, Result};
use crate::interface::{Contract, ContractId, ContractInterface};

/// Discovers and loads Clarity contracts from a project directory.
///
/// The discovery process follows this flow:
/// 1. Scan the contracts directory for `.clar` files
/// 2. Read each source and derive its principal from the file stem
/// 3. Attach an interface, from `<interfaces_dir>/<name>.json` when present,
///    otherwise scanned from the source
#[derive(Debug)]
pub struct ContractDiscoverer;

impl ContractDiscoverer {
    // =====================
    // Public API - File Discovery
    // =====================

    /// Recursively scans a directory for `.clar` files.
    ///
    /// The returned list of files is sorted to ensure deterministic output order.
    pub fn discover_contract_files<P: AsRef<Path>>(root: P) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in WalkDir::new(root) {
            let entry = entry?;

            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            if !Self::is_clarity_file(path) {
                continue;
            }

            files.push(path.to_path_buf());
        }
        files.sort();
        Ok(files)
    }

    /// Reads one contract source and its interface.
    pub fn load_contract<P: AsRef<Path>>(
        path: P,
        deployer: &str,
        interfaces_dir: Option<&Path>,
    ) -> Result<Contract> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|e| GenError::io(path, e))?;
        let name = Self::contract_name(path)?;
        let id = ContractId::new(deployer, name);

        let contract = match Self::interface_file(interfaces_dir, &id.name) {
            Some(interface_path) => {
                log::debug!("{}: interface from {}", id, interface_path.display());
                let interface = Self::load_interface(&interface_path)?;
                Contract::new(id, source, interface)
            }
            None => {
                log::debug!("{}: interface scanned from source", id);
                Contract::from_source(id, source)
            }
        };
        Ok(contract.with_path(path))
    }

    /// Loads every contract under the configured contracts directory.
    pub fn load_project(config: &GeneratorConfig) -> Result<Vec<Contract>> {
        let files = Self::discover_contract_files(&config.contracts_dir)?;
        log::info!(
            "Found {} contract(s) in {}",
            files.len(),
            config.contracts_dir.display()
        );
        files
            .iter()
            .map(|path| {
                Self::load_contract(path, &config.deployer, config.interfaces_dir.as_deref())
            })
            .collect()
    }

    // =====================
    // Internal - Interfaces
    // =====================

    fn interface_file(interfaces_dir: Option<&Path>, name: &str) -> Option<PathBuf> {
        let candidate = interfaces_dir?.join(format!("{name}.json"));
        candidate.is_file().then_some(candidate)
    }

    fn load_interface(path: &Path) -> Result<ContractInterface> {
        let text = fs::read_to_string(path).map_err(|e| GenError::io(path, e))?;
        ContractInterface::from_json(&text).map_err(|source| GenError::Interface {
            path: path.to_path_buf(),
            source,
        })
    }

    // =====================
    // Internal - File System Utilities
    // =====================

    /// Returns true if the given path has a .clar extension.
    fn is_clarity_file(path: &Path) -> bool {
        path.extension().is_some_and(|ext| ext == "clar")
    }

    fn contract_name(path: &Path) -> Result<String> {
        path.file_stem()
            .and_then(|stem| stem.to_str())
            .filter(|stem| !stem.is_empty())
            .map(str::to_string)
            .ok_or_else(|| GenError::InvalidContractId {
                id: path.display().to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discovers_sorted_clarity_files_only() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("b_test.clar"), "").unwrap();
        fs::write(dir.path().join("nested/a_test.clar"), "").unwrap();
        fs::write(dir.path().join("notes.md"), "").unwrap();

        let files = ContractDiscoverer::discover_contract_files(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().to_path_buf())
            .collect();
        assert_eq!(
            names,
            vec![PathBuf::from("b_test.clar"), PathBuf::from("nested/a_test.clar")]
        );
    }

    #[test]
    fn test_load_contract_prefers_interface_json() {
        let dir = tempfile::tempdir().unwrap();
        let source = "(define-public (test-a) (ok true))\n(define-public (test-b) (ok true))";
        fs::write(dir.path().join("x_test.clar"), source).unwrap();
        let interfaces = dir.path().join("interfaces");
        fs::create_dir(&interfaces).unwrap();
        fs::write(
            interfaces.join("x_test.json"),
            r#"{"functions":[{"name":"test-b","access":"public","args":[]}]}"#,
        )
        .unwrap();

        let contract = ContractDiscoverer::load_contract(
            dir.path().join("x_test.clar"),
            "ST1",
            Some(&interfaces),
        )
        .unwrap();
        assert_eq!(contract.id.to_string(), "ST1.x_test");
        assert_eq!(contract.interface.functions.len(), 1);
        assert!(contract.interface.functions[0].span.is_some());

        let scanned =
            ContractDiscoverer::load_contract(dir.path().join("x_test.clar"), "ST1", None).unwrap();
        assert_eq!(scanned.interface.functions.len(), 2);
    }

    #[test]
    fn test_missing_file_reports_io_error() {
        let err = ContractDiscoverer::load_contract("does/not/exist.clar", "ST1", None).unwrap_err();
        assert!(matches!(err, GenError::Io { .. }));
    }
}
