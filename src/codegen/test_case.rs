//! Generation of a single `Clarinet.test` block.
//!
//! Annotations are first resolved into a [`TestPlan`], then rendered with
//! one of two block strategies:
//!
//! - **normal** (`mine-blocks-before` absent or 0): one block holding the
//!   optional prepare call followed by the test call.
//! - **special** (`mine-blocks-before` >= 1): a dedicated prepare block that
//!   must fully succeed, `n - 1` empty blocks, then a block holding only the
//!   test call.
//!
//! Every test asserts that all receipts of its final block succeeded.

use crate::annotations::{Annotation, AnnotationMap, AnnotationValue};
use crate::interface::DEFAULT_PREPARE_FUNCTION;

const PRINT_EVENTS: &str = "events";
const DEFAULT_ACCOUNT: &str = "deployer";

// =============================================================================
// ANNOTATION DEFAULTS
// =============================================================================

/// Applies the prepare defaulting rules to one function's annotations.
///
/// A module-level `prepare` is injected unless the function names its own;
/// `no-prepare` then removes any prepare, however it was set.
pub fn apply_prepare_defaults(mut annotations: AnnotationMap, has_default_prepare: bool) -> AnnotationMap {
    if has_default_prepare && !annotations.contains(Annotation::Prepare) {
        annotations.insert(
            Annotation::Prepare.as_str(),
            AnnotationValue::Value(DEFAULT_PREPARE_FUNCTION.to_string()),
        );
    }
    if annotations.contains(Annotation::NoPrepare) {
        annotations.remove(Annotation::Prepare);
    }
    annotations
}

// =============================================================================
// TEST PLAN
// =============================================================================

/// Identity the test call is sent from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Caller {
    /// The canonical `deployer` account.
    Deployer,
    /// A literal address, given as `'ST...`.
    Address(String),
    /// A named test account, looked up when the test runs.
    Account(String),
}

impl Caller {
    fn from_annotation(value: Option<&AnnotationValue>) -> Self {
        match value {
            None => Caller::Deployer,
            Some(AnnotationValue::Flag) => {
                log::warn!("@caller without a value; using the deployer");
                Caller::Deployer
            }
            Some(AnnotationValue::Value(v)) => match v.strip_prefix('\'') {
                Some(address) => Caller::Address(address.to_string()),
                None => Caller::Account(v.clone()),
            },
        }
    }
}

/// Typed view of one test function's annotations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestPlan {
    pub function: String,
    pub display_name: String,
    pub caller: Caller,
    pub prepare: Option<String>,
    pub mine_blocks_before: u64,
    pub print_events: bool,
}

impl TestPlan {
    pub fn resolve(function: &str, annotations: &AnnotationMap) -> Self {
        for (key, _) in annotations.iter() {
            if Annotation::from_key(key).is_none() {
                log::debug!("{function}: ignoring unknown annotation @{key}");
            }
        }

        let print_events = match annotations.get(Annotation::Print) {
            None => false,
            Some(value) if value.as_str() == Some(PRINT_EVENTS) => true,
            Some(value) => {
                log::warn!("{function}: unsupported @print value {value:?}");
                false
            }
        };

        TestPlan {
            function: function.to_string(),
            display_name: display_name(function, annotations),
            caller: Caller::from_annotation(annotations.get(Annotation::Caller)),
            prepare: annotations.get(Annotation::Prepare).map(|value| {
                value.as_str().unwrap_or(DEFAULT_PREPARE_FUNCTION).to_string()
            }),
            mine_blocks_before: annotations
                .value(Annotation::MineBlocksBefore)
                .map(parse_block_count)
                .unwrap_or(0),
            print_events,
        }
    }

    /// True when the test needs its own block after a separate prepare block.
    pub fn uses_special_strategy(&self) -> bool {
        self.mine_blocks_before >= 1
    }

    /// Empty blocks mined between the prepare block and the test block.
    pub fn empty_blocks(&self) -> u64 {
        self.mine_blocks_before.saturating_sub(1)
    }

    pub fn render(&self, principal: &str) -> String {
        let blocks = if self.uses_special_strategy() {
            special_mine_block(principal, self)
        } else {
            normal_mine_block(principal, self)
        };

        let mut code = String::new();
        code.push_str("Clarinet.test({\n");
        code.push_str(&format!("\tname: \"{}\",\n", escape_js(&self.display_name)));
        code.push_str("\tasync fn(chain: Chain, accounts: Map<string, Account>) {\n");
        code.push_str(&format!("\t\tconst deployer = accounts.get(\"{DEFAULT_ACCOUNT}\")!;\n"));
        code.push_str("\t\tbootstrap(chain, deployer);\n");
        code.push_str(&format!(
            "\t\tconst callerAddress = {};\n",
            caller_expression(&self.caller)
        ));
        code.push_str(&blocks);
        code.push_str("\t\tblock.receipts.map(({result}) => result.expectOk());\n");
        code.push_str("\t}\n");
        code.push_str("});\n");
        code
    }
}

// =============================================================================
// PUBLIC API
// =============================================================================

/// Generates the source of one test case.
///
/// `annotations` must already have the prepare defaults applied
/// (see [`apply_prepare_defaults`]).
pub fn generate_test(principal: &str, function: &str, annotations: &AnnotationMap) -> String {
    TestPlan::resolve(function, annotations).render(principal)
}

/// The test's display name: the function name, plus `: <name>` when annotated.
pub fn display_name(function: &str, annotations: &AnnotationMap) -> String {
    match annotations.value(Annotation::Name) {
        Some(name) => format!("{function}: {name}"),
        None => function.to_string(),
    }
}

/// Expression evaluating to the caller's address inside the generated test.
pub fn caller_expression(caller: &Caller) -> String {
    match caller {
        Caller::Deployer => format!("accounts.get('{DEFAULT_ACCOUNT}')!.address"),
        Caller::Address(address) => format!("\"{}\"", escape_js(address)),
        Caller::Account(name) => format!("accounts.get('{}')!.address", escape_js(name)),
    }
}

pub fn prepare_tx(principal: &str, prepare: &str) -> String {
    contract_call(principal, prepare, "deployer.address")
}

pub fn normal_mine_block(principal: &str, plan: &TestPlan) -> String {
    let mut calls = Vec::with_capacity(2);
    if let Some(prepare) = &plan.prepare {
        calls.push(prepare_tx(principal, prepare));
    }
    calls.push(contract_call(principal, &plan.function, "callerAddress"));
    mine_block("block", &calls)
}

pub fn special_mine_block(principal: &str, plan: &TestPlan) -> String {
    let mut code = String::new();
    if let Some(prepare) = &plan.prepare {
        code.push_str(&mine_block("prepareBlock", &[prepare_tx(principal, prepare)]));
        code.push_str("\t\tprepareBlock.receipts.map(({result}) => result.expectOk());\n");
        if plan.print_events {
            code.push_str("\t\tprintEvents(prepareBlock);\n");
        }
    }
    if plan.empty_blocks() > 0 {
        code.push_str(&format!("\t\tchain.mineEmptyBlock({});\n", plan.empty_blocks()));
    }
    code.push_str(&mine_block(
        "block",
        &[contract_call(principal, &plan.function, "callerAddress")],
    ));
    if plan.print_events {
        code.push_str("\t\tprintEvents(block);\n");
    }
    code
}

// =============================================================================
// INTERNAL HELPERS
// =============================================================================

fn contract_call(principal: &str, function: &str, sender: &str) -> String {
    format!(
        "Tx.contractCall('{}', '{}', [], {sender})",
        escape_js(principal),
        escape_js(function)
    )
}

fn mine_block(binding: &str, calls: &[String]) -> String {
    let mut code = format!("\t\tconst {binding} = chain.mineBlock([\n");
    code.push_str(
        &calls
            .iter()
            .map(|call| format!("\t\t\t{call}"))
            .collect::<Vec<_>>()
            .join(",\n"),
    );
    code.push_str("\n\t\t]);\n");
    code
}

/// Leading-digit integer parse; anything unparsable (or negative) is 0.
///
/// Counts too large for `u64` saturate.
fn parse_block_count(value: &str) -> u64 {
    let digits: String = value
        .trim_start()
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    if digits.is_empty() {
        return 0;
    }
    digits.parse().unwrap_or_else(|_| {
        log::warn!("@mine-blocks-before {digits} is out of range; using {}", u64::MAX);
        u64::MAX
    })
}

/// Escapes a value for a quoted or template JavaScript string literal.
pub(crate) fn escape_js(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\'' => escaped.push_str("\\'"),
            '`' => escaped.push_str("\\`"),
            '$' => escaped.push_str("\\$"),
            _ => escaped.push(c),
        }
    }
    escaped
}
