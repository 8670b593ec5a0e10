//! # Schema Validation
//!
//! Compiles a resolved schema document with the `jsonschema` crate and
//! checks manifests against it.
//!
//! Schemas without a `$schema` keyword are compiled as Draft 2020-12.
//! Cross-schema `$ref`s resolve to files next to the schema that declared
//! them; anything else resolves to a permissive empty schema so validation
//! never reaches for the network.

use std::path::{Path, PathBuf};

use jsonschema::{Retrieve, Uri, Validator};
use serde_json::Value;

use crate::source::SchemaOrigin;

/// Path reported when a violation sits at the document root.
pub const ROOT_PATH: &str = "(root)";

/// Resolves `$ref` URIs to sibling files of the governing schema.
struct LocalSchemaRetriever {
    base_dir: Option<PathBuf>,
}

impl Retrieve for LocalSchemaRetriever {
    fn retrieve(
        &self,
        uri: &Uri<&str>,
    ) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        let uri_str = uri.as_str();
        let filename = uri_str.rsplit('/').next().unwrap_or(uri_str);

        if let Some(base) = &self.base_dir {
            let candidate = base.join(filename);
            if candidate.is_file() {
                let bytes = std::fs::read(&candidate)?;
                return Ok(serde_json::from_slice(&bytes)?);
            }
        }

        tracing::debug!(uri = uri_str, "unresolved schema $ref; treating as permissive");
        Ok(serde_json::json!({}))
    }
}

enum SchemaState {
    Ready(Box<Validator>),
    Defective(String),
}

impl std::fmt::Debug for SchemaState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ready(_) => f.write_str("Ready"),
            Self::Defective(reason) => f.debug_tuple("Defective").field(reason).finish(),
        }
    }
}

/// A schema ready to check manifests, or a record of why it cannot.
#[derive(Debug)]
pub struct ResolvedSchema {
    origin: SchemaOrigin,
    state: SchemaState,
}

/// Outcome of checking one manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaCheck {
    /// The manifest conforms.
    Conforms,
    /// The manifest violates the schema; first violation only.
    Violation {
        /// Dotted instance path, or [`ROOT_PATH`].
        path: String,
        message: String,
    },
    /// The schema itself is broken; nothing was checked.
    Defect { reason: String },
}

impl ResolvedSchema {
    /// Compile `document`. A document that does not compile yields a
    /// defective schema.
    pub fn compile(origin: SchemaOrigin, document: &Value) -> Self {
        let base_dir = match &origin {
            SchemaOrigin::File(path) => path.parent().map(Path::to_path_buf),
            SchemaOrigin::BuiltIn => None,
        };

        let mut opts = jsonschema::options();
        if document.get("$schema").is_none() {
            opts.with_draft(jsonschema::Draft::Draft202012);
        }
        opts.with_retriever(LocalSchemaRetriever { base_dir });

        let state = match opts.build(document) {
            Ok(validator) => SchemaState::Ready(Box::new(validator)),
            Err(e) => {
                tracing::warn!(schema = %origin, error = %e, "schema does not compile");
                SchemaState::Defective(e.to_string())
            }
        };
        Self { origin, state }
    }

    /// A schema that was found but could not be loaded.
    pub fn defective(origin: SchemaOrigin, reason: impl Into<String>) -> Self {
        Self {
            origin,
            state: SchemaState::Defective(reason.into()),
        }
    }

    pub fn origin(&self) -> &SchemaOrigin {
        &self.origin
    }

    /// Why the schema cannot be used, if it cannot.
    pub fn defect(&self) -> Option<&str> {
        match &self.state {
            SchemaState::Ready(_) => None,
            SchemaState::Defective(reason) => Some(reason),
        }
    }

    /// Check `instance` and report the first violation.
    pub fn check(&self, instance: &Value) -> SchemaCheck {
        let validator = match &self.state {
            SchemaState::Ready(v) => v,
            SchemaState::Defective(reason) => {
                return SchemaCheck::Defect {
                    reason: reason.clone(),
                }
            }
        };

        match validator.iter_errors(instance).next() {
            None => SchemaCheck::Conforms,
            Some(error) => SchemaCheck::Violation {
                path: dotted_path(&error.instance_path.to_string()),
                message: error.to_string(),
            },
        }
    }
}

/// Convert a JSON Pointer (`/layers/0/id`) into the dotted form used in
/// findings (`layers.0.id`). The empty pointer maps to [`ROOT_PATH`].
pub fn dotted_path(pointer: &str) -> String {
    let segments: Vec<String> = pointer
        .split('/')
        .skip(1)
        .map(|seg| seg.replace("~1", "/").replace("~0", "~"))
        .collect();
    if segments.is_empty() {
        ROOT_PATH.to_string()
    } else {
        segments.join(".")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::fallback_schema;
    use serde_json::json;

    fn manifest() -> Value {
        json!({
            "pack_id": "acme:us:roads:v1",
            "version": "1.0.0",
            "created_at": "2024-01-15T10:00:00Z",
            "geography": "us",
            "theme": "roads",
            "bbox": [0, 0, 10, 10],
            "crs": "EPSG:4326",
            "layers": [{"id": "roads", "type": "vector", "title": "Roads"}]
        })
    }

    #[test]
    fn fallback_accepts_complete_manifest() {
        let schema = ResolvedSchema::compile(SchemaOrigin::BuiltIn, &fallback_schema());
        assert_eq!(schema.check(&manifest()), SchemaCheck::Conforms);
    }

    #[test]
    fn fallback_rejects_missing_key_at_root() {
        let schema = ResolvedSchema::compile(SchemaOrigin::BuiltIn, &fallback_schema());
        let mut doc = manifest();
        doc.as_object_mut().unwrap().remove("crs");
        match schema.check(&doc) {
            SchemaCheck::Violation { path, message } => {
                assert_eq!(path, ROOT_PATH);
                assert!(message.contains("crs"), "got: {message}");
            }
            other => panic!("expected violation, got {other:?}"),
        }
    }

    #[test]
    fn fallback_rejects_non_object() {
        let schema = ResolvedSchema::compile(SchemaOrigin::BuiltIn, &fallback_schema());
        assert!(matches!(
            schema.check(&json!([1, 2, 3])),
            SchemaCheck::Violation { .. }
        ));
    }

    #[test]
    fn nested_violation_reports_dotted_path() {
        let schema_doc = json!({
            "type": "object",
            "properties": {
                "layers": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {"id": {"type": "string"}}
                    }
                }
            }
        });
        let schema = ResolvedSchema::compile(SchemaOrigin::BuiltIn, &schema_doc);
        let doc = json!({"layers": [{"id": "ok"}, {"id": 7}]});
        match schema.check(&doc) {
            SchemaCheck::Violation { path, .. } => assert_eq!(path, "layers.1.id"),
            other => panic!("expected violation, got {other:?}"),
        }
    }

    #[test]
    fn uncompilable_schema_is_a_defect() {
        let schema = ResolvedSchema::compile(SchemaOrigin::BuiltIn, &json!({"type": "not-a-type"}));
        assert!(schema.defect().is_some());
        assert!(matches!(schema.check(&manifest()), SchemaCheck::Defect { .. }));
    }

    #[test]
    fn defective_schema_reports_reason() {
        let schema = ResolvedSchema::defective(SchemaOrigin::BuiltIn, "invalid JSON: eof");
        assert_eq!(
            schema.check(&manifest()),
            SchemaCheck::Defect {
                reason: "invalid JSON: eof".to_string()
            }
        );
    }

    #[test]
    fn sibling_ref_resolves_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("layer.schema.json"),
            r#"{"type": "object", "required": ["id"]}"#,
        )
        .unwrap();
        let main_path = dir.path().join("spatialpack.schema.json");
        let main = json!({
            "type": "object",
            "properties": {
                "layers": {"type": "array", "items": {"$ref": "https://schemas.example/layer.schema.json"}}
            }
        });
        let schema = ResolvedSchema::compile(SchemaOrigin::File(main_path), &main);
        assert!(schema.defect().is_none(), "defect: {:?}", schema.defect());
        match schema.check(&json!({"layers": [{}]})) {
            SchemaCheck::Violation { path, .. } => assert_eq!(path, "layers.0"),
            other => panic!("expected violation, got {other:?}"),
        }
    }

    #[test]
    fn dotted_path_conversion() {
        assert_eq!(dotted_path(""), ROOT_PATH);
        assert_eq!(dotted_path("/bbox"), "bbox");
        assert_eq!(dotted_path("/layers/0/parquet"), "layers.0.parquet");
        assert_eq!(dotted_path("/a~1b/c~0d"), "a/b.c~d");
    }

    #[test]
    fn shipped_schema_compiles_and_accepts_sample() {
        let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        path.pop();
        path.pop();
        let path = path.join("schemas").join(crate::SCHEMA_FILE_NAME);
        let bytes = std::fs::read(&path).unwrap();
        let doc: Value = serde_json::from_slice(&bytes).unwrap();
        let schema = ResolvedSchema::compile(SchemaOrigin::File(path), &doc);
        assert!(schema.defect().is_none(), "defect: {:?}", schema.defect());
        assert_eq!(schema.check(&manifest()), SchemaCheck::Conforms);
    }
}
