//! Generator configuration.
//!
//! Loaded from an optional `testgen.yaml`; every key has a default so an
//! empty file (or no file) reproduces the stock sBTC layout:
//!
//! ```yaml
//! contracts_dir: contracts
//! target_dir: .test
//! deployer: ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM
//! test_suffix: _test
//! harness:
//!   clarinet_url: https://deno.land/x/clarinet@v1.5.4/index.ts
//!   asserts_url: https://deno.land/std@0.170.0/testing/asserts.ts
//! bootstrap:
//!   controller: sbtc-controller
//!   function: upgrade
//!   contracts:
//!     - .sbtc-token
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::{GenError, Result};

/// File picked up from the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "testgen.yaml";

/// Clarinet devnet deployer address.
pub const DEFAULT_DEPLOYER: &str = "ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Directory scanned for `.clar` sources.
    pub contracts_dir: PathBuf,
    /// Optional directory of `<contract-name>.json` interface files.
    pub interfaces_dir: Option<PathBuf>,
    /// Directory the generated files are written to.
    pub target_dir: PathBuf,
    /// Address the contracts are deployed under.
    pub deployer: String,
    /// Suffix that marks a contract as a test contract.
    pub test_suffix: String,
    pub harness: HarnessConfig,
    pub bootstrap: BootstrapConfig,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            contracts_dir: PathBuf::from("contracts"),
            interfaces_dir: None,
            target_dir: PathBuf::from(".test"),
            deployer: DEFAULT_DEPLOYER.to_string(),
            test_suffix: "_test".to_string(),
            harness: HarnessConfig::default(),
            bootstrap: BootstrapConfig::default(),
        }
    }
}

/// Where the generated code imports the simulation harness from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    pub clarinet_url: String,
    pub asserts_url: String,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        HarnessConfig {
            clarinet_url: "https://deno.land/x/clarinet@v1.5.4/index.ts".to_string(),
            asserts_url: "https://deno.land/std@0.170.0/testing/asserts.ts".to_string(),
        }
    }
}

/// The administrative call every generated test issues before it runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BootstrapConfig {
    /// Contract name of the controller, deployed by the deployer.
    pub controller: String,
    /// Public function on the controller that enables contracts.
    pub function: String,
    /// Contracts passed to the controller; an empty list disables bootstrapping.
    pub contracts: Vec<String>,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        BootstrapConfig {
            controller: "sbtc-controller".to_string(),
            function: "upgrade".to_string(),
            contracts: [
                ".sbtc-token",
                ".sbtc-peg-in-processor",
                ".sbtc-peg-out-processor",
                ".sbtc-registry",
                ".sbtc-stacking-pool",
                ".sbtc-testnet-debug-controller",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        }
    }
}

impl BootstrapConfig {
    pub fn is_enabled(&self) -> bool {
        !self.contracts.is_empty()
    }
}

impl GeneratorConfig {
    /// Parses a YAML configuration document.
    pub fn from_yaml(text: &str, path: &Path) -> Result<Self> {
        // An empty document deserializes as unit, not as a mapping.
        if text.trim().is_empty() {
            return Ok(GeneratorConfig::default());
        }
        serde_yaml::from_str(text).map_err(|source| GenError::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| GenError::io(path, e))?;
        Self::from_yaml(&text, path)
    }

    /// Loads `explicit` if given, else `testgen.yaml` in `dir` when present,
    /// else the defaults.
    pub fn discover(explicit: Option<&Path>, dir: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        let candidate = dir.join(DEFAULT_CONFIG_FILE);
        if candidate.is_file() {
            log::debug!("Using configuration {}", candidate.display());
            return Self::load(&candidate);
        }
        Ok(GeneratorConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = GeneratorConfig::from_yaml("", Path::new("testgen.yaml")).unwrap();
        assert_eq!(config, GeneratorConfig::default());
        assert_eq!(config.bootstrap.contracts.len(), 6);
    }

    #[test]
    fn test_partial_document_keeps_other_defaults() {
        let yaml = "target_dir: out\nbootstrap:\n  contracts: []\n";
        let config = GeneratorConfig::from_yaml(yaml, Path::new("testgen.yaml")).unwrap();
        assert_eq!(config.target_dir, PathBuf::from("out"));
        assert_eq!(config.bootstrap.controller, "sbtc-controller");
        assert!(!config.bootstrap.is_enabled());
        assert_eq!(config.deployer, DEFAULT_DEPLOYER);
    }

    #[test]
    fn test_invalid_document_reports_path() {
        let err = GeneratorConfig::from_yaml("target_dir: [1, 2", Path::new("bad.yaml")).unwrap_err();
        assert!(matches!(err, GenError::Config { .. }));
        assert!(err.to_string().contains("bad.yaml"));
    }
}
