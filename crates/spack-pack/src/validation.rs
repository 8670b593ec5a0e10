//! # Manifest Validation Pipeline
//!
//! [`ManifestValidator::validate`] is one linear pass over a pack:
//!
//! 1. **Gate: manifest exists** (`MANIFEST-001`). Absent → one error, stop.
//! 2. **Gate: manifest parses** (`MANIFEST-001`). Invalid JSON → one error
//!    carrying the parser message and line, stop.
//! 3. Independent checks, always all run, in this order:
//!    `MANIFEST-002` schema, `MANIFEST-003` pack_id, `MANIFEST-004` bbox,
//!    `MANIFEST-005` created_at, `LAYER-001`/`LAYER-002` layers,
//!    `STRUCTURE-001` folders, `INTEGRITY-001` hashes.
//!
//! Findings are recorded through a [`FindingCollector`] created fresh for
//! every call; where a finding lands (error or warning) is decided by the
//! validator's [`SeverityPolicy`].

use std::path::{Path, PathBuf};
use std::sync::Arc;

use glob::MatchOptions;
use regex::Regex;
use serde_json::Value;

use spack_core::{parse_iso8601, Check, FindingCollector, SeverityPolicy, ValidationResult};
use spack_schema::{ResolvedSchema, SchemaCheck, SchemaSource};

use crate::error::{ValidatorError, ValidatorResult};
use crate::manifest::{FileField, LayerView, LayersField, ManifestView};

/// Manifest file name inside a pack directory.
pub const MANIFEST_FILE_NAME: &str = "spatialpack.json";

/// `{authority}:{geography}:{theme}:v{version}`
const PACK_ID_PATTERN: &str = r"^[a-z0-9.-]+:[a-z]{2,3}:[a-z0-9-]+:v[0-9]+$";

/// When a missing expected folder produces a `STRUCTURE-001` warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FolderTrigger {
    /// Some layer's `parquet` or `pmtiles` points under `./layers/`.
    LocalLayerRefs,
    /// Checked, but never reported.
    Never,
}

/// Folders a pack is expected to contain, with their warning trigger.
///
/// `metadata/` is probed but never reported.
pub const EXPECTED_FOLDERS: [(&str, FolderTrigger); 2] = [
    ("layers", FolderTrigger::LocalLayerRefs),
    ("metadata", FolderTrigger::Never),
];

/// Where the validator gets its schema from.
#[derive(Debug, Clone)]
enum SchemaProvider {
    /// Resolve per pack by searching candidate locations.
    Search(SchemaSource),
    /// One pre-resolved schema shared by every run.
    Fixed(Arc<ResolvedSchema>),
}

/// Validates Spatial Pack directories.
///
/// A validator holds only immutable configuration; every call to
/// [`validate`](Self::validate) owns its own findings, so one instance can
/// check any number of packs.
#[derive(Debug, Clone)]
pub struct ManifestValidator {
    schemas: SchemaProvider,
    policy: SeverityPolicy,
    pack_id_pattern: Regex,
}

impl ManifestValidator {
    /// A validator that searches the default schema locations.
    pub fn new() -> ValidatorResult<Self> {
        Self::with_source(SchemaSource::default())
    }

    /// A validator that searches `source`'s candidate locations per pack.
    pub fn with_source(source: SchemaSource) -> ValidatorResult<Self> {
        Self::build(SchemaProvider::Search(source))
    }

    /// A validator that checks every pack against `schema`.
    pub fn with_schema(schema: Arc<ResolvedSchema>) -> ValidatorResult<Self> {
        Self::build(SchemaProvider::Fixed(schema))
    }

    fn build(schemas: SchemaProvider) -> ValidatorResult<Self> {
        Ok(Self {
            schemas,
            policy: SeverityPolicy::default(),
            pack_id_pattern: Regex::new(PACK_ID_PATTERN)?,
        })
    }

    /// Replace the severity policy.
    pub fn with_policy(mut self, policy: SeverityPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> &SeverityPolicy {
        &self.policy
    }

    /// Validate the pack at `pack_path`.
    ///
    /// # Errors
    ///
    /// Only operational failures (permission denied, unreadable schema
    /// candidate) are returned as `Err`. Every manifest problem is a finding.
    pub fn validate(&self, pack_path: &Path) -> ValidatorResult<ValidationResult> {
        let mut findings = FindingCollector::new(&self.policy);
        let manifest_path = pack_path.join(MANIFEST_FILE_NAME);
        tracing::debug!(pack = %pack_path.display(), "validating pack");

        // Gate 1: the manifest exists.
        let exists = manifest_path
            .try_exists()
            .map_err(|e| ValidatorError::io(&manifest_path, e))?;
        if !exists {
            findings.record(
                Check::ManifestMissing,
                format!("spatialpack.json not found at {}", manifest_path.display()),
                manifest_path.display().to_string(),
            );
            return Ok(findings.finish(0));
        }

        // Gate 2: the manifest is JSON.
        let bytes =
            std::fs::read(&manifest_path).map_err(|e| ValidatorError::io(&manifest_path, e))?;
        let manifest: Value = match serde_json::from_slice(&bytes) {
            Ok(value) => value,
            Err(e) => {
                findings.record(
                    Check::ManifestUnparsable,
                    format!("Invalid JSON: {e}"),
                    manifest_path.display().to_string(),
                );
                return Ok(findings.finish(0));
            }
        };
        let view = ManifestView::new(&manifest);

        self.check_schema(pack_path, &manifest, &mut findings)?;
        self.check_pack_id(view, &mut findings);
        check_bbox(view, &mut findings);
        check_created_at(view, &mut findings);
        let layers_validated = check_layers(pack_path, view, &mut findings)?;
        check_structure(pack_path, view, &mut findings)?;
        check_integrity(view, &mut findings);

        let result = findings.finish(layers_validated);
        tracing::info!(
            pack = %pack_path.display(),
            errors = result.error_count(),
            warnings = result.warning_count(),
            layers = result.layers_validated,
            "pack validated"
        );
        Ok(result)
    }

    /// MANIFEST-002
    fn check_schema(
        &self,
        pack_path: &Path,
        manifest: &Value,
        findings: &mut FindingCollector<'_>,
    ) -> ValidatorResult<()> {
        let resolved;
        let schema: &ResolvedSchema = match &self.schemas {
            SchemaProvider::Fixed(schema) => schema,
            SchemaProvider::Search(source) => {
                resolved = source.resolve(pack_path)?;
                &resolved
            }
        };
        tracing::debug!(schema = %schema.origin(), "checking manifest schema");
        if let Some(reason) = schema.defect() {
            tracing::warn!(schema = %schema.origin(), reason, "schema unusable; skipping schema check");
        }

        match schema.check(manifest) {
            SchemaCheck::Conforms => {}
            SchemaCheck::Violation { path, message } => {
                findings.record(
                    Check::SchemaViolation,
                    format!("Schema validation failed: {message}"),
                    path,
                );
            }
            SchemaCheck::Defect { reason } => {
                findings.record(
                    Check::SchemaDefect,
                    format!("Schema error (validation skipped): {reason}"),
                    "",
                );
            }
        }
        Ok(())
    }

    /// MANIFEST-003
    fn check_pack_id(&self, view: ManifestView<'_>, findings: &mut FindingCollector<'_>) {
        let pack_id = view.str_field("pack_id").unwrap_or("");
        if !self.pack_id_pattern.is_match(pack_id) {
            findings.record(
                Check::PackIdConvention,
                format!(
                    "pack_id '{pack_id}' does not follow convention: \
                     {{authority}}:{{geography}}:{{theme}}:v{{version}}"
                ),
                "pack_id",
            );
        }
    }
}

/// MANIFEST-004
fn check_bbox(view: ManifestView<'_>, findings: &mut FindingCollector<'_>) {
    let values: &[Value] = match view.get("bbox") {
        Some(Value::Array(items)) => items.as_slice(),
        _ => &[],
    };
    if values.len() != 4 {
        findings.record(
            Check::BboxArity,
            format!("bbox must have exactly 4 values, got {}", values.len()),
            "bbox",
        );
        return;
    }

    let mut numbers = [0f64; 4];
    let mut all_numeric = true;
    for (i, value) in values.iter().enumerate() {
        match value.as_f64() {
            Some(n) => numbers[i] = n,
            None => {
                all_numeric = false;
                findings.record(
                    Check::BboxNonNumeric,
                    format!("bbox value at index {i} is not a number: {value}"),
                    "bbox",
                );
            }
        }
    }
    if !all_numeric {
        return;
    }

    let [min_x, min_y, max_x, max_y] = numbers;
    if min_x >= max_x {
        findings.record(
            Check::BboxMinX,
            format!(
                "bbox minX ({}) must be less than maxX ({})",
                values[0], values[2]
            ),
            "bbox",
        );
    }
    if min_y >= max_y {
        findings.record(
            Check::BboxMinY,
            format!(
                "bbox minY ({}) must be less than maxY ({})",
                values[1], values[3]
            ),
            "bbox",
        );
    }
}

/// MANIFEST-005
fn check_created_at(view: ManifestView<'_>, findings: &mut FindingCollector<'_>) {
    let literal = match view.get("created_at") {
        None => String::new(),
        Some(Value::String(s)) => {
            if parse_iso8601(s).is_ok() {
                return;
            }
            s.clone()
        }
        Some(other) => other.to_string(),
    };
    findings.record(
        Check::CreatedAtFormat,
        format!("created_at '{literal}' is not valid ISO 8601"),
        "created_at",
    );
}

/// LAYER-001 and LAYER-002. Returns the number of layer elements processed.
fn check_layers(
    pack_path: &Path,
    view: ManifestView<'_>,
    findings: &mut FindingCollector<'_>,
) -> ValidatorResult<usize> {
    let items = match view.layers() {
        LayersField::Array(items) if !items.is_empty() => items,
        LayersField::NotArray(_) => {
            findings.record(Check::LayersEmpty, "layers must be a non-empty array", "layers");
            return Ok(0);
        }
        _ => {
            findings.record(Check::LayersEmpty, "No layers defined in manifest", "layers");
            return Ok(0);
        }
    };

    let mut processed = 0usize;
    for (index, value) in items.iter().enumerate() {
        let prefix = format!("layers[{index}]");
        match LayerView::from_value(value) {
            Some(layer) => check_layer(pack_path, &layer, &prefix, findings)?,
            None => findings.record(Check::LayerNotObject, "Layer must be an object", prefix),
        }
        processed += 1;
    }
    Ok(processed)
}

fn check_layer(
    pack_path: &Path,
    layer: &LayerView<'_>,
    prefix: &str,
    findings: &mut FindingCollector<'_>,
) -> ValidatorResult<()> {
    if layer.id().is_none() {
        findings.record(Check::LayerMissingId, "Layer missing 'id' field", prefix);
    }
    if layer.layer_type().is_none() {
        findings.record(
            Check::LayerMissingType,
            "Layer missing 'type' field",
            format!("{prefix}.type"),
        );
    }
    if layer.title().is_none() {
        findings.record(
            Check::LayerMissingTitle,
            "Layer missing 'title' field",
            format!("{prefix}.title"),
        );
    }

    for (field, declared, relative) in layer.local_refs() {
        let full_path = pack_path.join(relative);
        if !asset_present(&full_path)? {
            findings.record(
                Check::LayerFileMissing,
                format!("Layer file not found: {declared}"),
                format!("{prefix}.{}", field.key()),
            );
        }
    }
    Ok(())
}

/// True when `path` exists, or when its final component, read as a
/// case-sensitive glob, matches an entry of the parent directory.
///
/// `path` comes from the manifest, so lookup failures caused by the path
/// itself (through a regular file, NUL byte, symlink loop) mean "absent".
/// Only environment failures such as permission denied are errors.
fn asset_present(path: &Path) -> ValidatorResult<bool> {
    match path.try_exists() {
        Ok(true) => return Ok(true),
        Ok(false) => {}
        Err(e) if is_unresolvable_path(&e) => {
            tracing::debug!(path = %path.display(), error = %e, "layer reference cannot resolve");
            return Ok(false);
        }
        Err(e) => return Err(ValidatorError::io(path, e)),
    }

    let (Some(parent), Some(name)) = (path.parent(), path.file_name().and_then(|n| n.to_str()))
    else {
        return Ok(false);
    };
    let parent_pattern = glob::Pattern::escape(&parent.to_string_lossy());
    let pattern = if parent_pattern.is_empty() {
        name.to_string()
    } else {
        format!("{parent_pattern}/{name}")
    };
    let options = MatchOptions {
        case_sensitive: true,
        require_literal_separator: true,
        require_literal_leading_dot: false,
    };

    match glob::glob_with(&pattern, options) {
        Ok(mut entries) => Ok(entries.any(|entry| entry.is_ok())),
        Err(e) => {
            tracing::debug!(pattern = %pattern, error = %e, "layer reference is not a valid glob");
            Ok(false)
        }
    }
}

fn is_unresolvable_path(error: &std::io::Error) -> bool {
    use std::io::ErrorKind;

    let kind = error.kind();
    // `ErrorKind::FilesystemLoop` is unstable (`io_error_more`); std still
    // returns it for ELOOP, so match it by its Debug name on stable.
    matches!(
        kind,
        ErrorKind::NotADirectory | ErrorKind::InvalidInput | ErrorKind::InvalidFilename
    ) || format!("{kind:?}") == "FilesystemLoop"
}

/// STRUCTURE-001
fn check_structure(
    pack_path: &Path,
    view: ManifestView<'_>,
    findings: &mut FindingCollector<'_>,
) -> ValidatorResult<()> {
    let has_local_layer_refs = view.layer_objects().any(|(_, layer)| {
        [FileField::Parquet, FileField::Pmtiles]
            .into_iter()
            .filter_map(|field| layer.file_ref(field))
            .any(|r| r.starts_with("./layers/"))
    });

    for (folder, trigger) in EXPECTED_FOLDERS {
        let folder_path: PathBuf = pack_path.join(folder);
        let exists = folder_path
            .try_exists()
            .map_err(|e| ValidatorError::io(&folder_path, e))?;
        if exists {
            continue;
        }
        let warn = match trigger {
            FolderTrigger::LocalLayerRefs => has_local_layer_refs,
            FolderTrigger::Never => false,
        };
        if warn {
            findings.record(
                Check::FolderMissing,
                format!("Expected folder '{folder}' not found"),
                folder_path.display().to_string(),
            );
        } else {
            tracing::trace!(folder, "expected folder absent; not reported");
        }
    }
    Ok(())
}

/// INTEGRITY-001
fn check_integrity(view: ManifestView<'_>, findings: &mut FindingCollector<'_>) {
    let integrity = match view.object_field("integrity") {
        Some(block) if !block.is_empty() => block,
        _ => {
            findings.record(
                Check::IntegrityMissing,
                "No integrity block found in manifest",
                "integrity",
            );
            return;
        }
    };

    let hashes = integrity
        .get("asset_hashes")
        .and_then(Value::as_object)
        .filter(|hashes| !hashes.is_empty());
    let Some(hashes) = hashes else {
        findings.record(
            Check::AssetHashesEmpty,
            "No asset_hashes defined in integrity block",
            "integrity.asset_hashes",
        );
        return;
    };

    for (asset, hash) in hashes {
        let Some(hash) = hash.as_str() else { continue };
        if hash.to_ascii_uppercase().contains("PLACEHOLDER") {
            findings.record(
                Check::PlaceholderHash,
                format!("Placeholder hash found for {asset}"),
                format!("integrity.asset_hashes.{asset}"),
            );
        }
    }
}
