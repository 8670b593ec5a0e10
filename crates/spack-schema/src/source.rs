//! # Schema Source
//!
//! Locates and loads the JSON Schema used for `MANIFEST-002`.
//!
//! ## Search Order
//!
//! For a pack at `<root>/packs/my-pack`:
//!
//! 1. `<root>/packs/schemas/spatialpack.schema.json`
//! 2. `<root>/schemas/spatialpack.schema.json`
//! 3. `<install>/schemas/spatialpack.schema.json`
//!
//! The first file that exists wins. A file that exists but is not valid
//! JSON wins too, as a defective schema. Only when no candidate exists is
//! the built-in [`fallback_schema`] used.

use std::io;
use std::path::{Path, PathBuf};

use serde_json::{json, Value};
use thiserror::Error;

use crate::validate::ResolvedSchema;

/// File name searched for in each candidate `schemas/` directory.
pub const SCHEMA_FILE_NAME: &str = "spatialpack.schema.json";

/// Operational failure while resolving a schema.
///
/// "No schema on disk" and "schema is broken" are not errors; they resolve
/// to the fallback and to a defective schema respectively.
#[derive(Error, Debug)]
pub enum SchemaSourceError {
    /// A candidate could not be probed or read.
    #[error("cannot read schema candidate {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The pack path could not be made absolute.
    #[error("cannot resolve pack path {path}: {source}")]
    PackPath {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Where a resolved schema came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaOrigin {
    /// Loaded from a file on disk.
    File(PathBuf),
    /// The built-in fallback.
    BuiltIn,
}

impl std::fmt::Display for SchemaOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::BuiltIn => f.write_str("(built-in fallback)"),
        }
    }
}

/// The minimal schema used when no schema file is found.
pub fn fallback_schema() -> Value {
    json!({
        "type": "object",
        "required": [
            "pack_id",
            "version",
            "created_at",
            "geography",
            "theme",
            "bbox",
            "crs",
            "layers"
        ]
    })
}

/// Make `path` absolute against the current directory without touching
/// the filesystem or resolving symlinks.
pub fn absolutize(path: &Path) -> io::Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

/// Resolves the schema for a pack from a fixed list of candidate locations.
#[derive(Debug, Clone)]
pub struct SchemaSource {
    install_dir: Option<PathBuf>,
}

impl Default for SchemaSource {
    /// Searches the workspace this binary was built from as the install dir.
    fn default() -> Self {
        Self {
            install_dir: Some(default_install_dir()),
        }
    }
}

fn default_install_dir() -> PathBuf {
    let mut dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    dir.pop(); // crates/
    dir.pop(); // workspace root
    dir
}

impl SchemaSource {
    /// Use `dir` (which should contain `schemas/`) as the install directory.
    pub fn with_install_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            install_dir: Some(dir.into()),
        }
    }

    /// Search only the pack-relative candidates.
    pub fn pack_relative_only() -> Self {
        Self { install_dir: None }
    }

    pub fn install_dir(&self) -> Option<&Path> {
        self.install_dir.as_deref()
    }

    /// Candidate schema files for `pack_path`, in search order.
    pub fn candidates(&self, pack_path: &Path) -> Vec<PathBuf> {
        let mut out = Vec::with_capacity(3);
        if let Some(parent) = pack_path.parent() {
            out.push(parent.join("schemas").join(SCHEMA_FILE_NAME));
            if let Some(grandparent) = parent.parent() {
                out.push(grandparent.join("schemas").join(SCHEMA_FILE_NAME));
            }
        }
        if let Some(dir) = &self.install_dir {
            out.push(dir.join("schemas").join(SCHEMA_FILE_NAME));
        }
        out
    }

    /// Resolve and compile the schema governing `pack_path`.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaSourceError`] only for I/O failures other than a
    /// candidate being absent.
    pub fn resolve(&self, pack_path: &Path) -> Result<ResolvedSchema, SchemaSourceError> {
        let absolute = absolutize(pack_path).map_err(|source| SchemaSourceError::PackPath {
            path: pack_path.to_path_buf(),
            source,
        })?;

        for candidate in self.candidates(&absolute) {
            let exists = candidate
                .try_exists()
                .map_err(|source| SchemaSourceError::Io {
                    path: candidate.clone(),
                    source,
                })?;
            if !exists {
                tracing::trace!(candidate = %candidate.display(), "schema candidate absent");
                continue;
            }

            let bytes = std::fs::read(&candidate).map_err(|source| SchemaSourceError::Io {
                path: candidate.clone(),
                source,
            })?;
            let origin = SchemaOrigin::File(candidate.clone());

            return Ok(match serde_json::from_slice::<Value>(&bytes) {
                Ok(document) => {
                    tracing::debug!(schema = %candidate.display(), "loaded manifest schema");
                    ResolvedSchema::compile(origin, &document)
                }
                Err(e) => {
                    tracing::warn!(schema = %candidate.display(), error = %e, "schema file is not valid JSON");
                    ResolvedSchema::defective(origin, format!("invalid JSON: {e}"))
                }
            });
        }

        tracing::debug!(pack = %absolute.display(), "no schema file found; using built-in fallback");
        Ok(ResolvedSchema::compile(SchemaOrigin::BuiltIn, &fallback_schema()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    /// `<tmp>/root/packs/pack`, so every pack-relative candidate stays
    /// inside the temp dir.
    fn pack_layout() -> (tempfile::TempDir, PathBuf) {
        let tmp = tempfile::tempdir().unwrap();
        let pack = tmp.path().join("root").join("packs").join("pack");
        fs::create_dir_all(&pack).unwrap();
        (tmp, pack)
    }

    fn write_schema(dir: &Path, contents: &str) -> PathBuf {
        let schemas = dir.join("schemas");
        fs::create_dir_all(&schemas).unwrap();
        let path = schemas.join(SCHEMA_FILE_NAME);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn candidates_are_ordered_sibling_grandparent_install() {
        let source = SchemaSource::with_install_dir("/opt/spatialpack");
        let got = source.candidates(Path::new("/data/packs/pack"));
        assert_eq!(
            got,
            vec![
                PathBuf::from("/data/packs/schemas/spatialpack.schema.json"),
                PathBuf::from("/data/schemas/spatialpack.schema.json"),
                PathBuf::from("/opt/spatialpack/schemas/spatialpack.schema.json"),
            ]
        );
    }

    #[test]
    fn pack_relative_only_has_no_install_candidate() {
        let source = SchemaSource::pack_relative_only();
        assert_eq!(source.candidates(Path::new("/data/packs/pack")).len(), 2);
        assert!(source.install_dir().is_none());
    }

    #[test]
    fn falls_back_when_nothing_exists() {
        let (tmp, pack) = pack_layout();
        let source = SchemaSource::with_install_dir(tmp.path().join("nowhere"));
        let schema = source.resolve(&pack).unwrap();
        assert_eq!(schema.origin(), &SchemaOrigin::BuiltIn);
        assert!(schema.defect().is_none());
    }

    #[test]
    fn sibling_schema_wins_over_grandparent() {
        let (tmp, pack) = pack_layout();
        let root = tmp.path().join("root");
        write_schema(&root, r#"{"type": "object"}"#);
        let sibling = write_schema(&root.join("packs"), r#"{"type": "object"}"#);

        let schema = SchemaSource::pack_relative_only().resolve(&pack).unwrap();
        assert_eq!(schema.origin(), &SchemaOrigin::File(sibling));
    }

    #[test]
    fn grandparent_schema_is_found() {
        let (tmp, pack) = pack_layout();
        let expected = write_schema(&tmp.path().join("root"), r#"{"type": "object"}"#);
        let schema = SchemaSource::pack_relative_only().resolve(&pack).unwrap();
        assert_eq!(schema.origin(), &SchemaOrigin::File(expected));
    }

    #[test]
    fn install_dir_is_searched_last() {
        let (tmp, pack) = pack_layout();
        let install = tmp.path().join("install");
        let expected = write_schema(&install, r#"{"type": "object"}"#);
        let schema = SchemaSource::with_install_dir(&install).resolve(&pack).unwrap();
        assert_eq!(schema.origin(), &SchemaOrigin::File(expected));
    }

    #[test]
    fn malformed_schema_is_defective_not_replaced() {
        let (tmp, pack) = pack_layout();
        let broken = write_schema(&tmp.path().join("root").join("packs"), "{ not json");
        let schema = SchemaSource::pack_relative_only().resolve(&pack).unwrap();
        assert_eq!(schema.origin(), &SchemaOrigin::File(broken));
        let defect = schema.defect().expect("schema should be defective");
        assert!(defect.contains("invalid JSON"), "got: {defect}");
    }

    #[test]
    fn fallback_requires_top_level_keys() {
        let schema = fallback_schema();
        let required: Vec<&str> = schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|v| v.as_str())
            .collect();
        assert_eq!(
            required,
            vec!["pack_id", "version", "created_at", "geography", "theme", "bbox", "crs", "layers"]
        );
    }

    #[test]
    fn absolutize_keeps_absolute_paths() {
        let p = Path::new("/already/absolute");
        assert_eq!(absolutize(p).unwrap(), p);
        assert!(absolutize(Path::new("relative")).unwrap().is_absolute());
    }

    #[test]
    fn origin_display() {
        assert_eq!(SchemaOrigin::BuiltIn.to_string(), "(built-in fallback)");
        assert_eq!(
            SchemaOrigin::File(PathBuf::from("/s/spatialpack.schema.json")).to_string(),
            "/s/spatialpack.schema.json"
        );
    }
}
