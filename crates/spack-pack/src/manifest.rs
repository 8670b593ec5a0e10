//! # Manifest View
//!
//! Read-only accessors over a parsed `spatialpack.json`.
//!
//! The manifest is kept as a generic [`serde_json::Value`] so that a
//! structurally broken manifest can still be checked field by field. Every
//! accessor makes the "field absent" case explicit instead of substituting
//! a default, because several checks treat "absent" and "present but empty"
//! differently.

use serde_json::{Map, Value};

/// File-reference fields a layer may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileField {
    Parquet,
    Pmtiles,
    Cog,
    Copc,
}

impl FileField {
    /// All recognised file fields, in check order.
    pub const ALL: [FileField; 4] = [Self::Parquet, Self::Pmtiles, Self::Cog, Self::Copc];

    /// The manifest key.
    pub fn key(&self) -> &'static str {
        match self {
            Self::Parquet => "parquet",
            Self::Pmtiles => "pmtiles",
            Self::Cog => "cog",
            Self::Copc => "copc",
        }
    }
}

/// Prefix marking a file reference as pack-relative.
pub const LOCAL_PREFIX: &str = "./";

/// Shape of the `layers` field.
#[derive(Debug, Clone, Copy)]
pub enum LayersField<'a> {
    Absent,
    /// Present but not an array.
    NotArray(&'a Value),
    Array(&'a [Value]),
}

/// Borrowed view of a whole manifest.
#[derive(Debug, Clone, Copy)]
pub struct ManifestView<'a> {
    root: &'a Value,
}

impl<'a> ManifestView<'a> {
    pub fn new(root: &'a Value) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &'a Value {
        self.root
    }

    /// The raw value at a top-level key. `None` when the key is absent or
    /// the manifest is not an object.
    pub fn get(&self, key: &str) -> Option<&'a Value> {
        self.root.as_object().and_then(|obj| obj.get(key))
    }

    /// The string at `key`, if present and a string.
    pub fn str_field(&self, key: &str) -> Option<&'a str> {
        self.get(key).and_then(Value::as_str)
    }

    /// The object at `key`, if present and an object.
    pub fn object_field(&self, key: &str) -> Option<&'a Map<String, Value>> {
        self.get(key).and_then(Value::as_object)
    }

    pub fn layers(&self) -> LayersField<'a> {
        match self.get("layers") {
            None => LayersField::Absent,
            Some(Value::Array(items)) => LayersField::Array(items.as_slice()),
            Some(other) => LayersField::NotArray(other),
        }
    }

    /// Layer elements that are objects, with their declared index.
    pub fn layer_objects(&self) -> impl Iterator<Item = (usize, LayerView<'a>)> {
        let items: &'a [Value] = match self.layers() {
            LayersField::Array(items) => items,
            _ => &[],
        };
        items
            .iter()
            .enumerate()
            .filter_map(|(i, v)| LayerView::from_value(v).map(|layer| (i, layer)))
    }
}

/// Borrowed view of one layer object.
#[derive(Debug, Clone, Copy)]
pub struct LayerView<'a> {
    fields: &'a Map<String, Value>,
}

impl<'a> LayerView<'a> {
    /// `None` when `value` is not an object.
    pub fn from_value(value: &'a Value) -> Option<Self> {
        value.as_object().map(|fields| Self { fields })
    }

    /// The value at `key` when it is present and non-empty: not null,
    /// `false`, zero, `""`, `[]` or `{}`.
    fn declared(&self, key: &str) -> Option<&'a Value> {
        self.fields.get(key).filter(|v| is_non_empty(v))
    }

    /// The layer id, if declared.
    pub fn id(&self) -> Option<&'a Value> {
        self.declared("id")
    }

    /// The layer type, if declared.
    pub fn layer_type(&self) -> Option<&'a Value> {
        self.declared("type")
    }

    /// The layer title, if declared.
    pub fn title(&self) -> Option<&'a Value> {
        self.declared("title")
    }

    /// The reference declared for `field`, if it is a string.
    pub fn file_ref(&self, field: FileField) -> Option<&'a str> {
        self.fields.get(field.key()).and_then(Value::as_str)
    }

    /// Pack-relative references: `(field, declared value, path after "./")`.
    pub fn local_refs(&self) -> impl Iterator<Item = (FileField, &'a str, &'a str)> + '_ {
        FileField::ALL.into_iter().filter_map(move |field| {
            let declared = self.file_ref(field)?;
            let relative = declared.strip_prefix(LOCAL_PREFIX)?;
            Some((field, declared, relative))
        })
    }
}

fn is_non_empty(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(fields) => !fields.is_empty(),
    }
}
