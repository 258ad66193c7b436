//! The shared `deps.ts` module every generated test file imports.
//!
//! It re-exports the Clarinet primitives, defines `printEvents`, and defines
//! `bootstrap`, which enables the configured contracts through the
//! controller and asserts every entry of the result list is `true`.

use crate::config::{BootstrapConfig, HarnessConfig};

use super::test_case::escape_js;
use super::WARNING_HEADER;

pub fn generate_deps(harness: &HarnessConfig, bootstrap: &BootstrapConfig) -> String {
    let mut code = String::new();
    code.push_str(WARNING_HEADER);
    code.push_str("\n\n");
    code.push_str(&format!(
        "import {{ Clarinet, Tx, Chain, Account, Block, types }} from '{}';\n",
        escape_js(&harness.clarinet_url)
    ));
    code.push_str(&format!(
        "import {{ assertEquals }} from '{}';\n\n",
        escape_js(&harness.asserts_url)
    ));
    code.push_str("export { Clarinet, Tx, Chain, types, assertEquals };\n");
    code.push_str("export type { Account };\n\n");
    code.push_str(PRINT_EVENTS_HELPER);
    code.push('\n');
    code.push_str(&bootstrap_contracts(bootstrap));
    code.push('\n');
    code.push_str(&bootstrap_function(bootstrap));
    code
}

const PRINT_EVENTS_HELPER: &str = "\
const dirOptions = {strAbbreviateSize: Infinity, depth: Infinity, colors: true};

export function printEvents(block: Block) {
\tblock.receipts.map(({events}) => events && events.map(event => console.log(Deno.inspect(event, dirOptions))));
}
";

fn bootstrap_contracts(bootstrap: &BootstrapConfig) -> String {
    if !bootstrap.is_enabled() {
        return "export const bootstrapContracts: string[] = [];\n".to_string();
    }
    let entries = bootstrap
        .contracts
        .iter()
        .map(|contract| format!("\t'{}'", escape_js(contract)))
        .collect::<Vec<_>>()
        .join(",\n");
    format!("export const bootstrapContracts = [\n{entries}\n];\n")
}

fn bootstrap_function(bootstrap: &BootstrapConfig) -> String {
    if !bootstrap.is_enabled() {
        return "export function bootstrap(_chain: Chain, _deployer: Account) {}\n".to_string();
    }
    format!(
        "export function bootstrap(chain: Chain, deployer: Account) {{
\tconst {{ receipts }} = chain.mineBlock([
\t\tTx.contractCall(
\t\t\t`${{deployer.address}}.{controller}`,
\t\t\t'{function}',
\t\t\t[types.list(bootstrapContracts.map(contract => types.tuple({{ contract, enabled: true }})))],
\t\t\tdeployer.address
\t\t)
\t]);
\treceipts[0].result.expectOk().expectList().map(result => result.expectBool(true));
}}
",
        controller = escape_js(&bootstrap.controller),
        function = escape_js(&bootstrap.function),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deps_lists_bootstrap_contracts_and_helpers() {
        let code = generate_deps(&HarnessConfig::default(), &BootstrapConfig::default());
        assert!(code.starts_with(WARNING_HEADER));
        assert!(code.contains("from 'https://deno.land/x/clarinet@v1.5.4/index.ts';"));
        assert!(code.contains("export function printEvents(block: Block) {"));
        assert!(code.contains("\t'.sbtc-registry',\n"));
        assert!(code.contains("`${deployer.address}.sbtc-controller`,"));
        assert!(code.contains("\t\t\t'upgrade',\n"));
        assert!(code.contains("result.expectBool(true)"));
    }

    #[test]
    fn test_custom_bootstrap_list_is_used() {
        let bootstrap = BootstrapConfig {
            controller: "dao".into(),
            function: "set-extensions".into(),
            contracts: vec![".vault".into()],
        };
        let code = generate_deps(&HarnessConfig::default(), &bootstrap);
        assert!(code.contains("export const bootstrapContracts = [\n\t'.vault'\n];\n"));
        assert!(code.contains("`${deployer.address}.dao`,"));
        assert!(!code.contains("sbtc"));
    }

    #[test]
    fn test_controller_cannot_break_out_of_template_literal() {
        let bootstrap = BootstrapConfig {
            controller: "evil`${x}".into(),
            ..BootstrapConfig::default()
        };
        let code = generate_deps(&HarnessConfig::default(), &bootstrap);
        assert!(code.contains("`${deployer.address}.evil\\`\\${x}`,"));
    }

    #[test]
    fn test_empty_bootstrap_list_makes_bootstrap_a_no_op() {
        let bootstrap = BootstrapConfig {
            contracts: vec![],
            ..BootstrapConfig::default()
        };
        let code = generate_deps(&HarnessConfig::default(), &bootstrap);
        assert!(code.contains("export function bootstrap(_chain: Chain, _deployer: Account) {}"));
        assert!(!code.contains("mineBlock"));
    }
}
