//! # Findings and Severity Policy
//!
//! A [`Finding`] is one rule violation: `{rule, message, path}`. Findings are
//! split into two disjoint, ordered collections, errors and warnings, and
//! which collection a finding lands in is decided by a [`SeverityPolicy`]
//! rather than by the check that produced it.
//!
//! Each concrete condition the validator tests is a [`Check`]. A check knows
//! its rule and its default severity; the policy may override the latter.
//! The defaults reproduce the published rule semantics:
//!
//! | Check | Rule | Default |
//! |-------|------|---------|
//! | `schema-defect` | `MANIFEST-002` | warning |
//! | `pack-id-convention` | `MANIFEST-003` | warning |
//! | `layer-missing-title` | `LAYER-001` | warning |
//! | `layer-file-missing` | `LAYER-002` | warning |
//! | `folder-missing` | `STRUCTURE-001` | warning |
//! | `integrity-*`, `asset-hashes-empty`, `placeholder-hash` | `INTEGRITY-001` | warning |
//! | everything else | | error |

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::rule::RuleId;

/// Where a finding is classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Blocking: any error fails the pack.
    Error,
    /// Non-blocking unless the caller asks for strict mode.
    #[serde(alias = "warn")]
    Warning,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "error" => Ok(Self::Error),
            "warning" | "warn" => Ok(Self::Warning),
            _ => Err(CoreError::UnknownSeverity(s.to_string())),
        }
    }
}

/// One concrete condition tested by the manifest validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Check {
    ManifestMissing,
    ManifestUnparsable,
    SchemaViolation,
    SchemaDefect,
    PackIdConvention,
    BboxArity,
    BboxNonNumeric,
    BboxMinX,
    BboxMinY,
    CreatedAtFormat,
    LayersEmpty,
    LayerNotObject,
    LayerMissingId,
    LayerMissingType,
    LayerMissingTitle,
    LayerFileMissing,
    FolderMissing,
    IntegrityMissing,
    AssetHashesEmpty,
    PlaceholderHash,
}

impl Check {
    /// Returns every check in pipeline order.
    pub fn all() -> &'static [Check] {
        &[
            Self::ManifestMissing,
            Self::ManifestUnparsable,
            Self::SchemaViolation,
            Self::SchemaDefect,
            Self::PackIdConvention,
            Self::BboxArity,
            Self::BboxNonNumeric,
            Self::BboxMinX,
            Self::BboxMinY,
            Self::CreatedAtFormat,
            Self::LayersEmpty,
            Self::LayerNotObject,
            Self::LayerMissingId,
            Self::LayerMissingType,
            Self::LayerMissingTitle,
            Self::LayerFileMissing,
            Self::FolderMissing,
            Self::IntegrityMissing,
            Self::AssetHashesEmpty,
            Self::PlaceholderHash,
        ]
    }

    /// The kebab-case name used in configuration files.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ManifestMissing => "manifest-missing",
            Self::ManifestUnparsable => "manifest-unparsable",
            Self::SchemaViolation => "schema-violation",
            Self::SchemaDefect => "schema-defect",
            Self::PackIdConvention => "pack-id-convention",
            Self::BboxArity => "bbox-arity",
            Self::BboxNonNumeric => "bbox-non-numeric",
            Self::BboxMinX => "bbox-min-x",
            Self::BboxMinY => "bbox-min-y",
            Self::CreatedAtFormat => "created-at-format",
            Self::LayersEmpty => "layers-empty",
            Self::LayerNotObject => "layer-not-object",
            Self::LayerMissingId => "layer-missing-id",
            Self::LayerMissingType => "layer-missing-type",
            Self::LayerMissingTitle => "layer-missing-title",
            Self::LayerFileMissing => "layer-file-missing",
            Self::FolderMissing => "folder-missing",
            Self::IntegrityMissing => "integrity-missing",
            Self::AssetHashesEmpty => "asset-hashes-empty",
            Self::PlaceholderHash => "placeholder-hash",
        }
    }

    /// The rule a finding from this check is reported under.
    pub fn rule(&self) -> RuleId {
        match self {
            Self::ManifestMissing | Self::ManifestUnparsable => RuleId::ManifestReadable,
            Self::SchemaViolation | Self::SchemaDefect => RuleId::ManifestSchema,
            Self::PackIdConvention => RuleId::PackIdConvention,
            Self::BboxArity | Self::BboxNonNumeric | Self::BboxMinX | Self::BboxMinY => {
                RuleId::BoundingBox
            }
            Self::CreatedAtFormat => RuleId::CreatedAt,
            Self::LayersEmpty
            | Self::LayerNotObject
            | Self::LayerMissingId
            | Self::LayerMissingType
            | Self::LayerMissingTitle => RuleId::LayerDefinition,
            Self::LayerFileMissing => RuleId::LayerFiles,
            Self::FolderMissing => RuleId::PackStructure,
            Self::IntegrityMissing | Self::AssetHashesEmpty | Self::PlaceholderHash => {
                RuleId::IntegrityHashes
            }
        }
    }

    /// Severity applied when no override is configured.
    pub fn default_severity(&self) -> Severity {
        match self {
            Self::SchemaDefect
            | Self::PackIdConvention
            | Self::LayerMissingTitle
            | Self::LayerFileMissing
            | Self::FolderMissing
            | Self::IntegrityMissing
            | Self::AssetHashesEmpty
            | Self::PlaceholderHash => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

impl fmt::Display for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Check {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Check::all()
            .iter()
            .copied()
            .find(|check| check.as_str() == wanted)
            .ok_or_else(|| CoreError::UnknownCheck(s.to_string()))
    }
}

/// Maps each [`Check`] to the severity its findings are recorded with.
///
/// Starts from [`Check::default_severity`]; overrides replace the default
/// for individual checks. Immutable once handed to a validator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeverityPolicy {
    overrides: BTreeMap<Check, Severity>,
}

impl SeverityPolicy {
    /// Builder-style override.
    pub fn with_override(mut self, check: Check, severity: Severity) -> Self {
        self.set(check, severity);
        self
    }

    /// Override the severity for one check. Setting the default clears
    /// the override.
    pub fn set(&mut self, check: Check, severity: Severity) {
        if severity == check.default_severity() {
            self.overrides.remove(&check);
        } else {
            self.overrides.insert(check, severity);
        }
    }

    pub fn severity_of(&self, check: Check) -> Severity {
        self.overrides
            .get(&check)
            .copied()
            .unwrap_or_else(|| check.default_severity())
    }

    /// Checks whose severity differs from the default.
    pub fn overrides(&self) -> impl Iterator<Item = (Check, Severity)> + '_ {
        self.overrides.iter().map(|(c, s)| (*c, *s))
    }
}

/// One validation outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub rule: RuleId,
    pub message: String,
    pub path: String,
}

/// Outcome of validating one pack.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub errors: Vec<Finding>,
    pub warnings: Vec<Finding>,
    pub layers_validated: usize,
}

impl ValidationResult {
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    /// True when neither errors nor warnings were recorded.
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }

    /// All findings reported under `rule`, errors first.
    pub fn findings_for(&self, rule: RuleId) -> impl Iterator<Item = &Finding> {
        self.errors
            .iter()
            .chain(self.warnings.iter())
            .filter(move |f| f.rule == rule)
    }
}

/// Append-only accumulator that routes findings by policy.
///
/// One collector is created per validation run and consumed by
/// [`FindingCollector::finish`].
#[derive(Debug)]
pub struct FindingCollector<'p> {
    policy: &'p SeverityPolicy,
    errors: Vec<Finding>,
    warnings: Vec<Finding>,
}

impl<'p> FindingCollector<'p> {
    pub fn new(policy: &'p SeverityPolicy) -> Self {
        Self {
            policy,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Record a finding for `check`, classified by the policy.
    pub fn record(&mut self, check: Check, message: impl Into<String>, path: impl Into<String>) {
        let finding = Finding {
            rule: check.rule(),
            message: message.into(),
            path: path.into(),
        };
        match self.policy.severity_of(check) {
            Severity::Error => self.errors.push(finding),
            Severity::Warning => self.warnings.push(finding),
        }
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    pub fn finish(self, layers_validated: usize) -> ValidationResult {
        ValidationResult {
            errors: self.errors,
            warnings: self.warnings,
            layers_validated,
        }
    }
}
