//! Typed key/value metadata.
//!
//! The metadata block holds one or more sets. The main header may point at
//! one of them as the file's global metadata; record descriptors may point
//! at others. Each key maps to exactly one typed value and lookups with the
//! wrong accessor fail with [`DaffError::TypeMismatch`] rather than coercing.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::block::BlockReader;
use crate::error::{DaffError, Result};

/// Type tag of a metadata value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetadataType {
    /// Boolean.
    Bool,
    /// 32-bit signed integer.
    Int,
    /// Double precision float.
    Float,
    /// UTF-8 string.
    String,
}

impl MetadataType {
    fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(MetadataType::Bool),
            1 => Some(MetadataType::Int),
            2 => Some(MetadataType::Float),
            3 => Some(MetadataType::String),
            _ => None,
        }
    }
}

impl fmt::Display for MetadataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MetadataType::Bool => "bool",
            MetadataType::Int => "int",
            MetadataType::Float => "float",
            MetadataType::String => "string",
        })
    }
}

/// One metadata value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MetadataValue {
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i32),
    /// Floating point value.
    Float(f64),
    /// String value.
    String(String),
}

impl MetadataValue {
    /// Type tag of this value.
    pub fn value_type(&self) -> MetadataType {
        match self {
            MetadataValue::Bool(_) => MetadataType::Bool,
            MetadataValue::Int(_) => MetadataType::Int,
            MetadataValue::Float(_) => MetadataType::Float,
            MetadataValue::String(_) => MetadataType::String,
        }
    }
}

/// A set of typed key/value pairs.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Metadata {
    entries: BTreeMap<String, MetadataValue>,
}

/// Shared empty set, returned for files without global metadata.
pub(crate) static EMPTY: Metadata = Metadata {
    entries: BTreeMap::new(),
};

impl Metadata {
    /// `true` if `key` exists.
    pub fn has_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Type of the value stored under `key`.
    pub fn key_type(&self, key: &str) -> Result<MetadataType> {
        self.lookup(key).map(MetadataValue::value_type)
    }

    /// Raw value lookup.
    pub fn get(&self, key: &str) -> Option<&MetadataValue> {
        self.entries.get(key)
    }

    /// Boolean value stored under `key`.
    pub fn get_bool(&self, key: &str) -> Result<bool> {
        match self.lookup(key)? {
            MetadataValue::Bool(v) => Ok(*v),
            other => Err(mismatch(key, MetadataType::Bool, other)),
        }
    }

    /// Integer value stored under `key`.
    pub fn get_int(&self, key: &str) -> Result<i32> {
        match self.lookup(key)? {
            MetadataValue::Int(v) => Ok(*v),
            other => Err(mismatch(key, MetadataType::Int, other)),
        }
    }

    /// Float value stored under `key`.
    ///
    /// Integers are not promoted.
    pub fn get_float(&self, key: &str) -> Result<f64> {
        match self.lookup(key)? {
            MetadataValue::Float(v) => Ok(*v),
            other => Err(mismatch(key, MetadataType::Float, other)),
        }
    }

    /// String value stored under `key`.
    pub fn get_string(&self, key: &str) -> Result<&str> {
        match self.lookup(key)? {
            MetadataValue::String(v) => Ok(v),
            other => Err(mismatch(key, MetadataType::String, other)),
        }
    }

    /// All keys in sorted order.
    pub fn keys(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    /// Iterate over `(key, value)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &MetadataValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` if the set holds no keys.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn lookup(&self, key: &str) -> Result<&MetadataValue> {
        self.entries
            .get(key)
            .ok_or_else(|| DaffError::KeyNotFound(key.to_string()))
    }
}

fn mismatch(key: &str, requested: MetadataType, actual: &MetadataValue) -> DaffError {
    DaffError::TypeMismatch {
        key: key.to_string(),
        requested,
        actual: actual.value_type(),
    }
}

/// Decode every metadata set in the metadata block.
pub(crate) fn read_metadata_block(buf: &[u8]) -> Result<Vec<Metadata>> {
    let mut r = BlockReader::new("metadata block", buf);
    let num_sets = r.read_u32()? as usize;
    // each set needs at least its four count bytes
    if num_sets > r.remaining() / 4 {
        return Err(DaffError::Truncated { block: r.name() });
    }

    let mut sets = Vec::with_capacity(num_sets);
    for set in 0..num_sets {
        let num_entries = r.read_u32()?;
        let mut entries = BTreeMap::new();
        for _ in 0..num_entries {
            let code = r.read_u8()?;
            let value_type = MetadataType::from_code(code).ok_or_else(|| {
                DaffError::format(format!("metadata set {set}: unknown value type {code}"))
            })?;
            let key = r.read_string_u16()?;
            let value = match value_type {
                MetadataType::Bool => match r.read_u8()? {
                    0 => MetadataValue::Bool(false),
                    1 => MetadataValue::Bool(true),
                    other => {
                        return Err(DaffError::format(format!(
                            "metadata key '{key}': invalid bool {other}"
                        )));
                    }
                },
                MetadataType::Int => MetadataValue::Int(r.read_i32()?),
                MetadataType::Float => MetadataValue::Float(r.read_f64()?),
                MetadataType::String => MetadataValue::String(r.read_string_u32()?),
            };
            if entries.contains_key(&key) {
                return Err(DaffError::format(format!(
                    "metadata set {set}: duplicate key '{key}'"
                )));
            }
            entries.insert(key, value);
        }
        sets.push(Metadata { entries });
    }

    tracing::debug!(sets = sets.len(), "parsed metadata block");
    Ok(sets)
}
