//! # Generator Test Fixtures
//!
//! Builds throwaway Clarity projects in temporary directories.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

pub const DEPLOYER: &str = "ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM";

/// Annotated transfer test from the token suite.
pub const TRANSFER_TEST: &str = r#"(define-constant owner tx-sender)

;; @name Transfers tokens
;; @caller 'STOWNERADDR
(define-public (test-transfer)
  (begin
    (try! (contract-call? .token transfer u100 tx-sender 'ST2 none))
    (ok true)))
"#;

pub const DELAYED_TEST: &str = r#"(define-public (prepare)
  (ok true))

;; @name Unlocks later
;; @mine-blocks-before 3
;; @print events
(define-public (test-unlock)
  (ok true))

;; @no-prepare
(define-public (test-without-setup)
  (ok true))
"#;

/// Declaration split across lines, with a module-level prepare.
pub const SPLIT_DECLARATION_TEST: &str = r#";; @caller wallet_1
;; @no-prepare
(define-public
  (test-split)
  (ok true))

(define-public (prepare)
  (ok true))
"#;

pub const BROKEN_TEST: &str = r#";; @name Needs input
(define-public (test-broken (amount uint))
  (ok amount))
"#;

/// A project directory holding `contracts/` and, optionally, `testgen.yaml`.
pub struct Project {
    pub dir: TempDir,
}

impl Project {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        fs::create_dir_all(dir.path().join("contracts")).expect("failed to create contracts dir");
        Project { dir }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn contracts_dir(&self) -> PathBuf {
        self.root().join("contracts")
    }

    pub fn target_dir(&self) -> PathBuf {
        self.root().join(".test")
    }

    /// Writes `contracts/<name>.clar`.
    pub fn contract(self, name: &str, source: &str) -> Self {
        let path = self.contracts_dir().join(format!("{name}.clar"));
        fs::write(path, source).expect("failed to write contract");
        self
    }

    /// Writes `contracts/<dir>/<name>.clar`, creating `dir`.
    pub fn nested_contract(self, dir: &str, name: &str, source: &str) -> Self {
        let dir = self.contracts_dir().join(dir);
        fs::create_dir_all(&dir).expect("failed to create nested dir");
        fs::write(dir.join(format!("{name}.clar")), source).expect("failed to write contract");
        self
    }

    pub fn config(self, yaml: &str) -> Self {
        fs::write(self.root().join("testgen.yaml"), yaml).expect("failed to write config");
        self
    }

    pub fn read_target(&self, file_name: &str) -> String {
        fs::read_to_string(self.target_dir().join(file_name))
            .unwrap_or_else(|e| panic!("missing generated file {file_name}: {e}"))
    }
}
