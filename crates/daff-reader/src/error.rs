//! Error types for DAFF reading.

use std::path::PathBuf;

use thiserror::Error;

use crate::metadata::MetadataType;
use crate::types::ContentType;

/// Errors that can occur while opening or querying a DAFF file.
#[derive(Debug, Error)]
pub enum DaffError {
    /// The file is structurally invalid (bad signature, corrupt header, inconsistent counts).
    #[error("invalid DAFF file: {0}")]
    Format(String),

    /// The file format version is not the one this reader understands.
    #[error("unsupported DAFF file format version {found} (supported: {supported})")]
    UnsupportedVersion {
        /// Version found in the file header.
        found: i32,
        /// Version this reader supports.
        supported: i32,
    },

    /// A read ran past the end of the file or of one of its blocks.
    #[error("unexpected end of data in {block}")]
    Truncated {
        /// Name of the structure being read.
        block: &'static str,
    },

    /// Failed to read a file from disk.
    #[error("failed to read file '{path}': {source}")]
    Io {
        /// Path of the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A typed content accessor was requested for a file of another content type.
    #[error("wrong content type: requested {requested}, file holds {actual}")]
    WrongContentType {
        /// Content type the caller asked for.
        requested: ContentType,
        /// Content type stored in the file.
        actual: ContentType,
    },

    /// A record or channel index is outside the file's range.
    #[error("{what} index {index} out of range (count {count})")]
    IndexOutOfRange {
        /// Which index was rejected ("record" or "channel").
        what: &'static str,
        /// The rejected index.
        index: usize,
        /// Number of valid entries.
        count: usize,
    },

    /// A metadata key does not exist.
    #[error("metadata key not found: {0}")]
    KeyNotFound(String),

    /// A metadata key exists with a different value type.
    #[error("metadata key '{key}' holds a {actual} value, not {requested}")]
    TypeMismatch {
        /// The key that was looked up.
        key: String,
        /// Type the caller asked for.
        requested: MetadataType,
        /// Type actually stored.
        actual: MetadataType,
    },

    /// The operation has no meaning for the file's content type.
    #[error("{operation} is not applicable to {content_type} content")]
    NotApplicable {
        /// Name of the rejected operation.
        operation: &'static str,
        /// Content type of the file.
        content_type: ContentType,
    },

    /// A caller-provided output buffer has the wrong length.
    #[error("output buffer holds {actual} values, expected {expected}")]
    BufferLength {
        /// Required length.
        expected: usize,
        /// Length provided.
        actual: usize,
    },

    /// An orientation with non-finite angles was supplied.
    #[error("invalid orientation: yaw {yaw}, pitch {pitch}, roll {roll}")]
    InvalidOrientation {
        /// Yaw in degrees.
        yaw: f32,
        /// Pitch in degrees.
        pitch: f32,
        /// Roll in degrees.
        roll: f32,
    },

    /// The reader has no open file.
    #[error("no DAFF file is open")]
    NotOpen,

    /// Reader options could not be parsed.
    #[error("failed to parse reader options: {0}")]
    Options(#[from] toml::de::Error),

    /// A property summary could not be rendered as JSON.
    #[error("failed to serialize summary: {0}")]
    Json(#[from] serde_json::Error),
}

impl DaffError {
    /// Create an I/O error for `path`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        DaffError::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a format error.
    pub(crate) fn format(message: impl Into<String>) -> Self {
        DaffError::Format(message.into())
    }
}

/// Convenience result type for DAFF operations.
pub type Result<T> = std::result::Result<T, DaffError>;
