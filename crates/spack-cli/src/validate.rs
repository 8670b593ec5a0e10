//! # Validate Subcommand
//!
//! Validates one pack directory, prints the findings, and optionally writes
//! the JSON conformance report.
//!
//! Exit code: `0` for pass (or warn without `--strict`), `1` for fail (or
//! warn with `--strict`). Operational errors surface as `Err` and the
//! binary maps them to `2`.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;

use spack_core::{Check, Severity};
use spack_pack::{ConformanceReportBuilder, ManifestValidator, ValidatorConfig};
use spack_schema::absolutize;

use crate::render::{render_header, render_report};

/// Arguments for the `spatialpack validate` subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Pack directory containing spatialpack.json.
    #[arg(value_name = "PACK")]
    pub pack: PathBuf,

    /// Treat warnings as errors.
    #[arg(long)]
    pub strict: bool,

    /// Write the conformance report to this JSON file.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Suppress console output.
    #[arg(short, long)]
    pub quiet: bool,

    /// Override the severity of one check, e.g. `layer-file-missing=error`.
    /// Repeatable; applied after the config file.
    #[arg(long = "severity", value_name = "CHECK=LEVEL", value_parser = parse_severity_override)]
    pub severity: Vec<(Check, Severity)>,
}

/// Parse a `CHECK=LEVEL` override.
pub fn parse_severity_override(raw: &str) -> Result<(Check, Severity), String> {
    let (check, level) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected CHECK=LEVEL, got '{raw}'"))?;
    let check: Check = check.parse().map_err(|e| format!("{e}"))?;
    let level: Severity = level.parse().map_err(|e| format!("{e}"))?;
    Ok((check, level))
}

/// Execute the validate subcommand.
pub fn run_validate(args: &ValidateArgs, config: &ValidatorConfig) -> Result<u8> {
    let pack_path = absolutize(&args.pack)
        .with_context(|| format!("cannot resolve pack path {}", args.pack.display()))?;
    if !pack_path.exists() {
        bail!("pack path does not exist: {}", pack_path.display());
    }

    let strict = args.strict || config.strict;
    let mut policy = config.severity_policy();
    for (check, severity) in &args.severity {
        policy.set(*check, *severity);
    }

    let validator = ManifestValidator::with_source(config.schema_source())
        .context("failed to initialise validator")?
        .with_policy(policy);

    let builder = ConformanceReportBuilder::start(&pack_path).strict(strict);
    if !args.quiet {
        println!("{}", render_header(&pack_path, builder.run_id()));
    }

    let result = validator
        .validate(&pack_path)
        .with_context(|| format!("failed to validate {}", pack_path.display()))?;
    let report = builder.finish(result);

    if !args.quiet {
        print!("{}", render_report(&report));
    }

    if let Some(output) = &args.output {
        let json = report.to_json_pretty()?;
        std::fs::write(output, json)
            .with_context(|| format!("failed to write report to {}", output.display()))?;
        tracing::info!(path = %output.display(), "conformance report written");
        if !args.quiet {
            println!("\nReport written to: {}", output.display());
        }
    }

    Ok(report.exit_code(strict))
}
