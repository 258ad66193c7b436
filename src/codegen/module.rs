//! Generation of one test file per test contract.

use crate::annotations::{extract_test_annotations, FunctionAnnotations};
use crate::errors::{to_error_src, GenError, Result};
use crate::interface::{Contract, ContractId};

use super::test_case::{apply_prepare_defaults, generate_test};
use super::{MODULE_IMPORTS, WARNING_HEADER};

/// The generated test file of one contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleOutput {
    pub contract: ContractId,
    /// File name inside the target directory, `<contract-name>.ts`.
    pub file_name: String,
    /// Test functions in emission order.
    pub tests: Vec<String>,
    pub contents: String,
}

/// A test function with its defaulted annotations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestFunction {
    pub name: String,
    pub annotations: FunctionAnnotations,
}

/// Collects the test functions of `contract` in emission order, with the
/// prepare defaults applied.
///
/// Fails if any test function declares arguments.
pub fn collect_test_functions(contract: &Contract) -> Result<Vec<TestFunction>> {
    let has_default_prepare = contract.has_default_prepare();
    let mut annotations = extract_test_annotations(&contract.source);

    let mut functions = Vec::new();
    for function in contract.test_functions() {
        if !function.args.is_empty() {
            return Err(GenError::TestFunctionArguments {
                function: function.name.clone(),
                contract: contract.id.to_string(),
                arg_count: function.args.len(),
                src: to_error_src(contract.source_name(), &contract.source),
                span: function.span.map(Into::into),
            });
        }

        let own = annotations.remove(&function.name).unwrap_or_default();
        functions.push(TestFunction {
            name: function.name.clone(),
            annotations: apply_prepare_defaults(own, has_default_prepare),
        });
    }
    Ok(functions)
}

/// Generates the test file for `contract`.
///
/// Returns `Ok(None)` when the contract's name does not end in
/// `test_suffix`. Fails if any test function declares arguments.
pub fn generate_module(contract: &Contract, test_suffix: &str) -> Result<Option<ModuleOutput>> {
    if !contract.is_test_contract(test_suffix) {
        return Ok(None);
    }

    let principal = contract.id.to_string();
    let functions = collect_test_functions(contract)?;

    let mut blocks = Vec::with_capacity(functions.len());
    for function in &functions {
        log::debug!(
            "{}: generating {} with {} annotation(s)",
            contract.name(),
            function.name,
            function.annotations.len()
        );
        blocks.push(generate_test(&principal, &function.name, &function.annotations));
    }

    let mut contents = String::new();
    contents.push_str(WARNING_HEADER);
    contents.push_str("\n\n");
    contents.push_str(MODULE_IMPORTS);
    contents.push_str("\n\n");
    contents.push_str(&blocks.join("\n"));

    Ok(Some(ModuleOutput {
        contract: contract.id.clone(),
        file_name: format!("{}.ts", contract.name()),
        tests: functions.into_iter().map(|f| f.name).collect(),
        contents,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contract(name: &str, source: &str) -> Contract {
        Contract::from_source(ContractId::new("ST1", name), source)
    }

    #[test]
    fn test_non_test_contract_is_skipped() {
        let c = contract("token", "(define-public (test-a) (ok true))");
        assert_eq!(generate_module(&c, "_test").unwrap(), None);
    }

    #[test]
    fn test_tests_emitted_in_reverse_declaration_order() {
        let source = "(define-public (test-a) (ok true))\n(define-public (helper) (ok true))\n(define-public (test-b) (ok true))\n(define-read-only (test-c) (ok true))";
        let output = generate_module(&contract("suite_test", source), "_test").unwrap().unwrap();
        assert_eq!(output.tests, vec!["test-b", "test-a"]);
        assert_eq!(output.file_name, "suite_test.ts");
        assert!(output.contents.starts_with(WARNING_HEADER));
        assert!(output.contents.contains(MODULE_IMPORTS));
        let b = output.contents.find("name: \"test-b\"").unwrap();
        let a = output.contents.find("name: \"test-a\"").unwrap();
        assert!(b < a);
    }

    #[test]
    fn test_default_prepare_applied_per_function() {
        let source = "\
(define-public (prepare) (ok true))

(define-public (test-with) (ok true))

;; @no-prepare
(define-public (test-without) (ok true))
";
        let output = generate_module(&contract("p_test", source), "_test").unwrap().unwrap();
        let with = &output.contents[output.contents.find("test-with\"").unwrap()..];
        let with = &with[..with.find("});").unwrap()];
        assert!(with.contains("'prepare', [], deployer.address"));
        let without = &output.contents[output.contents.find("test-without\"").unwrap()..];
        let without = &without[..without.find("});").unwrap()];
        assert!(!without.contains("'prepare'"));
    }

    #[test]
    fn test_function_with_arguments_is_fatal() {
        let source = "(define-public (test-ok) (ok true))\n(define-public (test-broken (n uint)) (ok n))";
        let err = generate_module(&contract("bad_test", source), "_test").unwrap_err();
        match err {
            GenError::TestFunctionArguments {
                function,
                arg_count,
                span,
                ..
            } => {
                assert_eq!(function, "test-broken");
                assert_eq!(arg_count, 1);
                assert!(span.is_some());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
