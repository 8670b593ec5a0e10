//! # spack-pack — Spatial Pack Validation
//!
//! Validates a pack directory (a `spatialpack.json` manifest plus the layer
//! files it references) and turns the outcome into a conformance report.
//!
//! - **Manifest view** (`manifest.rs`): explicit absent/present accessors
//!   over the parsed JSON, so every check has an "absent" branch.
//! - **Validation** (`validation.rs`): [`ManifestValidator`], a single
//!   linear pass with two gates (manifest exists, manifest parses) followed
//!   by independent checks that always all run.
//! - **Report** (`report.rs`): [`ConformanceReportBuilder`] derives the
//!   pass/warn/fail status and stamps run metadata.
//! - **Config** (`config.rs`): optional YAML file with strictness, schema
//!   install dir, and per-check severity overrides.
//!
//! ## Crate Policy
//!
//! - Manifest problems are findings, never `Err`. `Err` means the validator
//!   itself could not do its job (I/O failure, bad configuration).
//! - No state survives between `validate()` calls.

pub mod config;
pub mod error;
pub mod manifest;
pub mod report;
pub mod validation;

pub use config::ValidatorConfig;
pub use error::{ValidatorError, ValidatorResult};
pub use manifest::{FileField, LayerView, LayersField, ManifestView};
pub use report::{
    validator_identifier, ConformanceReport, ConformanceReportBuilder, ReportStatus, ReportSummary,
};
pub use validation::{FolderTrigger, ManifestValidator, EXPECTED_FOLDERS, MANIFEST_FILE_NAME};
