//! # spack-cli — Spatial Pack Command-Line Interface
//!
//! ## Subcommands
//!
//! - `validate` — validate one pack, print findings, optionally write the
//!   JSON conformance report
//! - `rules` — list the rule catalog and the checks under each rule
//!
//! ## Crate Policy
//!
//! - Argument parsing lives in `main.rs`; handlers here take parsed args
//!   and return an exit code.
//! - Handlers delegate to `spack-pack`; no validation logic here.
//! - Console text is built as a `String` before printing so it can be
//!   tested.
//! - Exit codes: `0` pass, `1` failing pack, `2` operational error.

use std::path::Path;

use anyhow::{Context, Result};

use spack_pack::ValidatorConfig;

pub mod render;
pub mod rules;
pub mod validate;

/// Exit code for a validator that could not do its job.
pub const EXIT_OPERATIONAL_ERROR: u8 = 2;

/// Load the `--config` file, or the defaults when none was given.
pub fn load_config(path: Option<&Path>) -> Result<ValidatorConfig> {
    match path {
        Some(path) => ValidatorConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => Ok(ValidatorConfig::default()),
    }
}
