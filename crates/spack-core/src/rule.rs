//! # Rule Catalog
//!
//! Defines [`RuleId`], the closed set of validation rules a Spatial Pack is
//! checked against, and [`RULE_CATALOG`], the read-only table mapping each
//! rule to its description.
//!
//! Rule identifiers appear verbatim in conformance reports
//! (`"rule": "MANIFEST-004"`), so the serialized form is part of the report
//! contract and must not change.
//!
//! | Rule | Concern |
//! |------|---------|
//! | `MANIFEST-001` | manifest exists and parses |
//! | `MANIFEST-002` | manifest conforms to the JSON Schema |
//! | `MANIFEST-003` | `pack_id` naming convention |
//! | `MANIFEST-004` | bounding box shape and ordering |
//! | `MANIFEST-005` | `created_at` is ISO 8601 |
//! | `LAYER-001` | layers are declared with required fields |
//! | `LAYER-002` | local layer files resolve |
//! | `INTEGRITY-001` | asset hashes are declared and resolved |
//! | `STRUCTURE-001` | pack folder layout |

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A validation rule identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RuleId {
    /// `MANIFEST-001`
    #[serde(rename = "MANIFEST-001")]
    ManifestReadable,
    /// `MANIFEST-002`
    #[serde(rename = "MANIFEST-002")]
    ManifestSchema,
    /// `MANIFEST-003`
    #[serde(rename = "MANIFEST-003")]
    PackIdConvention,
    /// `MANIFEST-004`
    #[serde(rename = "MANIFEST-004")]
    BoundingBox,
    /// `MANIFEST-005`
    #[serde(rename = "MANIFEST-005")]
    CreatedAt,
    /// `LAYER-001`
    #[serde(rename = "LAYER-001")]
    LayerDefinition,
    /// `LAYER-002`
    #[serde(rename = "LAYER-002")]
    LayerFiles,
    /// `INTEGRITY-001`
    #[serde(rename = "INTEGRITY-001")]
    IntegrityHashes,
    /// `STRUCTURE-001`
    #[serde(rename = "STRUCTURE-001")]
    PackStructure,
}

/// One row of the rule catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleEntry {
    pub id: RuleId,
    pub description: &'static str,
}

/// Every rule with its human-readable description, in report order.
pub const RULE_CATALOG: [RuleEntry; 9] = [
    RuleEntry {
        id: RuleId::ManifestReadable,
        description: "spatialpack.json exists and is valid JSON",
    },
    RuleEntry {
        id: RuleId::ManifestSchema,
        description: "Manifest validates against JSON Schema",
    },
    RuleEntry {
        id: RuleId::PackIdConvention,
        description: "pack_id follows naming convention",
    },
    RuleEntry {
        id: RuleId::BoundingBox,
        description: "bbox is valid",
    },
    RuleEntry {
        id: RuleId::CreatedAt,
        description: "created_at is valid ISO 8601",
    },
    RuleEntry {
        id: RuleId::LayerDefinition,
        description: "Each layer has corresponding file reference",
    },
    RuleEntry {
        id: RuleId::LayerFiles,
        description: "Layer files are accessible",
    },
    RuleEntry {
        id: RuleId::IntegrityHashes,
        description: "Integrity hashes are present if integrity.json exists",
    },
    RuleEntry {
        id: RuleId::PackStructure,
        description: "Pack structure is valid",
    },
];

impl RuleId {
    /// Returns every rule in catalog order.
    pub fn all() -> impl Iterator<Item = RuleId> {
        RULE_CATALOG.iter().map(|entry| entry.id)
    }

    /// Returns the report identifier, e.g. `"MANIFEST-001"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ManifestReadable => "MANIFEST-001",
            Self::ManifestSchema => "MANIFEST-002",
            Self::PackIdConvention => "MANIFEST-003",
            Self::BoundingBox => "MANIFEST-004",
            Self::CreatedAt => "MANIFEST-005",
            Self::LayerDefinition => "LAYER-001",
            Self::LayerFiles => "LAYER-002",
            Self::IntegrityHashes => "INTEGRITY-001",
            Self::PackStructure => "STRUCTURE-001",
        }
    }

    /// Looks the rule up in [`RULE_CATALOG`].
    pub fn description(&self) -> &'static str {
        RULE_CATALOG
            .iter()
            .find(|entry| entry.id == *self)
            .map(|entry| entry.description)
            .unwrap_or_default()
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RuleId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_uppercase();
        RuleId::all()
            .find(|id| id.as_str() == wanted)
            .ok_or_else(|| CoreError::UnknownRule(s.to_string()))
    }
}
