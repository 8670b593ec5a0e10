//! # Validator Configuration
//!
//! Optional YAML file, typically passed with `--config`:
//!
//! ```yaml
//! install_dir: /opt/spatialpack   # directory holding schemas/
//! strict: false
//! severity:
//!   layer-file-missing: error
//! ```
//!
//! Every key is optional. Unknown keys and unknown check names are
//! rejected so a typo never silently changes what gets enforced.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use spack_core::{Check, Severity, SeverityPolicy};
use spack_schema::SchemaSource;

use crate::error::{ValidatorError, ValidatorResult};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ValidatorConfig {
    /// Install directory searched for `schemas/spatialpack.schema.json`
    /// after the pack-relative candidates. `None` keeps the built-in default.
    pub install_dir: Option<PathBuf>,
    /// Treat warnings as failures.
    pub strict: bool,
    /// Per-check severity overrides.
    pub severity: BTreeMap<Check, Severity>,
}

impl ValidatorConfig {
    /// Load a config file.
    pub fn load(path: &Path) -> ValidatorResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ValidatorError::io(path, e))?;
        let config = Self::from_yaml_str(&content).map_err(|source| ValidatorError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(
            path = %path.display(),
            overrides = config.severity.len(),
            "loaded validator config"
        );
        Ok(config)
    }

    /// Parse YAML text. An empty document yields the defaults.
    pub fn from_yaml_str(content: &str) -> Result<Self, serde_yaml::Error> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }

    /// The severity policy described by this config.
    pub fn severity_policy(&self) -> SeverityPolicy {
        self.severity
            .iter()
            .fold(SeverityPolicy::default(), |policy, (check, severity)| {
                policy.with_override(*check, *severity)
            })
    }

    /// The schema source described by this config.
    pub fn schema_source(&self) -> SchemaSource {
        match &self.install_dir {
            Some(dir) => SchemaSource::with_install_dir(dir),
            None => SchemaSource::default(),
        }
    }
}
