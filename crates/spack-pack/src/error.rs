//! Validator error types.
//!
//! These are operational failures: the validator could not finish. A pack
//! that is merely invalid never produces one of these.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that stop a validation run.
#[derive(Debug, Error)]
pub enum ValidatorError {
    /// Filesystem access failed for a reason other than "not found".
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Schema resolution failed.
    #[error(transparent)]
    Schema(#[from] spack_schema::SchemaSourceError),

    /// The pack_id pattern failed to compile.
    #[error("pack_id pattern error: {0}")]
    Pattern(#[from] regex::Error),

    /// The configuration file is not valid YAML or has unknown keys.
    #[error("invalid validator config at {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// The report could not be serialized.
    #[error("report serialization failed: {0}")]
    Report(#[from] serde_json::Error),
}

impl ValidatorError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for validator operations.
pub type ValidatorResult<T> = Result<T, ValidatorError>;
