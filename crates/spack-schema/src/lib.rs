//! # spack-schema — Manifest Schema Resolution & Validation
//!
//! ## Resolution (`source`)
//!
//! [`SchemaSource`] finds the `spatialpack.schema.json` document that
//! governs a pack. It searches, in order, the pack's sibling `schemas/`
//! directory, the grandparent's `schemas/` directory, and the install
//! directory's `schemas/`. When nothing is found it falls back to a
//! built-in schema that only requires the top-level manifest keys, so
//! schema validation always runs, degraded but never absent.
//!
//! A schema file that exists but cannot be parsed or compiled is *not*
//! replaced by the fallback. It resolves to a defective schema, and the
//! validator reports the defect instead of blaming the manifest.
//!
//! ## Validation (`validate`)
//!
//! [`ResolvedSchema::check`] runs the compiled schema over a manifest and
//! reports the first violation with a dotted instance path.
//!
//! ## Crate Policy
//!
//! - No network access: `$ref`s resolve to sibling schema files only.
//! - A resolved schema is immutable and `Send + Sync`; share it via `Arc`.

pub mod source;
pub mod validate;

pub use source::{
    absolutize, fallback_schema, SchemaOrigin, SchemaSource, SchemaSourceError, SCHEMA_FILE_NAME,
};
pub use validate::{dotted_path, ResolvedSchema, SchemaCheck, ROOT_PATH};
