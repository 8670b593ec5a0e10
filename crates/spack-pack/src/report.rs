//! # Conformance Report
//!
//! Wraps a [`ValidationResult`] with run metadata and the derived status.
//!
//! ```text
//! errors > 0                 → fail
//! warnings > 0 and strict    → fail
//! warnings > 0               → warn
//! otherwise                  → pass
//! ```

use std::path::{Path, PathBuf};
use std::time::Instant;

use serde::{Deserialize, Serialize};

use spack_core::{Finding, Timestamp, ValidationResult};

use crate::error::ValidatorResult;

/// Overall outcome of a validation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    Pass,
    Warn,
    Fail,
}

impl ReportStatus {
    /// Derive the status from finding counts.
    pub fn derive(errors: usize, warnings: usize, strict: bool) -> Self {
        if errors > 0 || (warnings > 0 && strict) {
            Self::Fail
        } else if warnings > 0 {
            Self::Warn
        } else {
            Self::Pass
        }
    }

    /// Process exit code for this status: `1` for fail, or for warn under
    /// strict mode; `0` otherwise.
    pub fn exit_code(&self, strict: bool) -> u8 {
        match self {
            Self::Pass => 0,
            Self::Warn if strict => 1,
            Self::Warn => 0,
            Self::Fail => 1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pass => "pass",
            Self::Warn => "warn",
            Self::Fail => "fail",
        }
    }
}

impl std::fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Finding counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub errors: usize,
    pub warnings: usize,
    pub layers_validated: usize,
}

/// The persisted outcome of one validation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConformanceReport {
    /// First 8 characters of a random v4 UUID.
    pub run_id: String,
    /// `spatialpack-cli@<version>`.
    pub validator: String,
    /// Absolute path of the validated pack.
    pub pack_path: PathBuf,
    pub status: ReportStatus,
    pub checked_at: Timestamp,
    pub duration_ms: u64,
    pub summary: ReportSummary,
    pub errors: Vec<Finding>,
    pub warnings: Vec<Finding>,
}

impl ConformanceReport {
    /// Pretty-printed JSON, two-space indented.
    pub fn to_json_pretty(&self) -> ValidatorResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Exit code for this report under the given strictness.
    pub fn exit_code(&self, strict: bool) -> u8 {
        self.status.exit_code(strict)
    }
}

/// The identifier written into every report's `validator` field.
pub fn validator_identifier() -> String {
    format!("spatialpack-cli@{}", env!("CARGO_PKG_VERSION"))
}

fn short_run_id() -> String {
    let mut id = uuid::Uuid::new_v4().simple().to_string();
    id.truncate(8);
    id
}

/// Times a run and assembles its [`ConformanceReport`].
///
/// Create the builder before validating so `duration_ms` covers the run.
#[derive(Debug)]
pub struct ConformanceReportBuilder {
    run_id: String,
    pack_path: PathBuf,
    strict: bool,
    started: Instant,
}

impl ConformanceReportBuilder {
    /// Start timing a run over `pack_path`.
    pub fn start(pack_path: impl AsRef<Path>) -> Self {
        Self {
            run_id: short_run_id(),
            pack_path: pack_path.as_ref().to_path_buf(),
            strict: false,
            started: Instant::now(),
        }
    }

    /// Escalate warning-only outcomes to `fail`.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Stamp `checked_at`, measure the duration, and derive the status.
    pub fn finish(self, result: ValidationResult) -> ConformanceReport {
        let duration_ms = u64::try_from(self.started.elapsed().as_millis()).unwrap_or(u64::MAX);
        let summary = ReportSummary {
            errors: result.error_count(),
            warnings: result.warning_count(),
            layers_validated: result.layers_validated,
        };
        let status = ReportStatus::derive(summary.errors, summary.warnings, self.strict);
        tracing::debug!(run_id = %self.run_id, %status, duration_ms, "report assembled");

        ConformanceReport {
            run_id: self.run_id,
            validator: validator_identifier(),
            pack_path: self.pack_path,
            status,
            checked_at: Timestamp::now(),
            duration_ms,
            summary,
            errors: result.errors,
            warnings: result.warnings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spack_core::RuleId;

    fn finding(rule: RuleId) -> Finding {
        Finding {
            rule,
            message: "m".to_string(),
            path: "p".to_string(),
        }
    }

    fn result(errors: usize, warnings: usize) -> ValidationResult {
        ValidationResult {
            errors: (0..errors).map(|_| finding(RuleId::BoundingBox)).collect(),
            warnings: (0..warnings).map(|_| finding(RuleId::IntegrityHashes)).collect(),
            layers_validated: 2,
        }
    }

    #[test]
    fn status_table() {
        let cases = [
            (0, 0, false, ReportStatus::Pass, 0),
            (0, 0, true, ReportStatus::Pass, 0),
            (0, 2, false, ReportStatus::Warn, 0),
            (0, 2, true, ReportStatus::Fail, 1),
            (1, 0, false, ReportStatus::Fail, 1),
            (1, 3, true, ReportStatus::Fail, 1),
        ];
        for (errors, warnings, strict, status, code) in cases {
            let got = ReportStatus::derive(errors, warnings, strict);
            assert_eq!(got, status, "errors={errors} warnings={warnings} strict={strict}");
            assert_eq!(got.exit_code(strict), code);
        }
    }

    #[test]
    fn warn_exit_code_depends_on_strict() {
        assert_eq!(ReportStatus::Warn.exit_code(false), 0);
        assert_eq!(ReportStatus::Warn.exit_code(true), 1);
    }

    #[test]
    fn run_id_is_eight_hex_chars() {
        let builder = ConformanceReportBuilder::start("/packs/a");
        assert_eq!(builder.run_id().len(), 8);
        assert!(builder.run_id().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn finish_fills_summary_and_metadata() {
        let report = ConformanceReportBuilder::start("/packs/a")
            .strict(true)
            .finish(result(0, 1));
        assert_eq!(report.status, ReportStatus::Fail);
        assert_eq!(
            report.summary,
            ReportSummary {
                errors: 0,
                warnings: 1,
                layers_validated: 2
            }
        );
        assert_eq!(report.pack_path, PathBuf::from("/packs/a"));
        assert!(report.validator.starts_with("spatialpack-cli@"));
        assert_eq!(report.exit_code(true), 1);
    }

    #[test]
    fn json_shape() {
        let report = ConformanceReportBuilder::start("/packs/a").finish(result(1, 0));
        let json = report.to_json_pretty().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["status"], "fail");
        assert_eq!(value["summary"]["errors"], 1);
        assert_eq!(value["summary"]["layers_validated"], 2);
        assert_eq!(value["errors"][0]["rule"], "MANIFEST-004");
        assert!(value["checked_at"].as_str().unwrap().ends_with('Z'));
        assert!(value["duration_ms"].is_u64());
        assert!(json.contains("\n  \"run_id\""));
    }

    #[test]
    fn report_deserializes_back() {
        let report = ConformanceReportBuilder::start("/packs/a").finish(result(0, 2));
        let json = report.to_json_pretty().unwrap();
        let back: ConformanceReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back, report);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn errors_always_fail(errors in 1usize..50, warnings in 0usize..50, strict: bool) {
                prop_assert_eq!(ReportStatus::derive(errors, warnings, strict), ReportStatus::Fail);
            }

            #[test]
            fn strict_never_yields_warn(errors in 0usize..50, warnings in 0usize..50) {
                prop_assert_ne!(ReportStatus::derive(errors, warnings, true), ReportStatus::Warn);
            }

            #[test]
            fn exit_zero_iff_not_failing(errors in 0usize..5, warnings in 0usize..5, strict: bool) {
                let status = ReportStatus::derive(errors, warnings, strict);
                let code = status.exit_code(strict);
                prop_assert_eq!(code == 0, status != ReportStatus::Fail);
            }
        }
    }
}
