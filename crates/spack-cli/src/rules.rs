//! # Rules Subcommand
//!
//! Prints the rule catalog: each rule id, its description, and the checks
//! reported under it with the severity they resolve to under the active
//! configuration.

use anyhow::Result;
use clap::Args;

use spack_core::{Check, SeverityPolicy, RULE_CATALOG};
use spack_pack::ValidatorConfig;

/// Arguments for the `spatialpack rules` subcommand.
#[derive(Args, Debug)]
pub struct RulesArgs {}

/// Execute the rules subcommand.
pub fn run_rules(_args: &RulesArgs, config: &ValidatorConfig) -> Result<u8> {
    print!("{}", render_rules(&config.severity_policy()));
    Ok(0)
}

/// The catalog listing.
pub fn render_rules(policy: &SeverityPolicy) -> String {
    let mut out = String::new();
    for entry in RULE_CATALOG.iter() {
        out.push_str(&format!("{:<14} {}\n", entry.id.as_str(), entry.description));
        for check in Check::all().iter().filter(|c| c.rule() == entry.id) {
            out.push_str(&format!(
                "    {:<22} {}\n",
                check.as_str(),
                policy.severity_of(*check)
            ));
        }
    }
    out
}
