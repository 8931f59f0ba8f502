//! Reader options, loadable from TOML.
//!
//! ```toml
//! max_file_size = 268435456
//!
//! [orientation]
//! yaw = 90.0
//! pitch = 0.0
//! roll = 0.0
//! ```

use std::path::Path;

use daff_core::Orientation;
use serde::Deserialize;

use crate::error::{DaffError, Result};

/// Default upper bound on the size of a file to open (1 GiB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 1 << 30;

/// Options applied when opening a file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReaderOptions {
    /// Files larger than this many bytes are rejected before being read.
    pub max_file_size: u64,
    /// Orientation to use instead of the file's default right after opening.
    pub orientation: Option<OrientationOptions>,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            orientation: None,
        }
    }
}

impl ReaderOptions {
    /// Load options from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| DaffError::io(path, e))?;
        Self::from_toml(&content)
    }

    /// Parse options from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Set the file size limit.
    pub fn with_max_file_size(mut self, bytes: u64) -> Self {
        self.max_file_size = bytes;
        self
    }

    /// Override the orientation applied after opening.
    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = Some(orientation.into());
        self
    }
}

/// Yaw, pitch and roll in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OrientationOptions {
    /// Rotation about the vertical axis in degrees.
    pub yaw: f32,
    /// Elevation of the frontal axis in degrees.
    pub pitch: f32,
    /// Rotation about the frontal axis in degrees.
    pub roll: f32,
}

impl From<OrientationOptions> for Orientation {
    fn from(o: OrientationOptions) -> Self {
        Orientation::new(o.yaw, o.pitch, o.roll)
    }
}

impl From<Orientation> for OrientationOptions {
    fn from(o: Orientation) -> Self {
        Self {
            yaw: o.yaw,
            pitch: o.pitch,
            roll: o.roll,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_toml_gives_defaults() {
        let options = ReaderOptions::from_toml("").unwrap();
        assert_eq!(options, ReaderOptions::default());
        assert_eq!(options.max_file_size, 1024 * 1024 * 1024);
        assert!(options.orientation.is_none());
    }

    #[test]
    fn partial_orientation_defaults_to_zero() {
        let options = ReaderOptions::from_toml(
            r#"
            max_file_size = 4096

            [orientation]
            yaw = 45.0
            "#,
        )
        .unwrap();
        assert_eq!(options.max_file_size, 4096);
        assert_eq!(
            options.orientation.map(Orientation::from),
            Some(Orientation::new(45.0, 0.0, 0.0))
        );
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = ReaderOptions::from_toml("max_size = 1").unwrap_err();
        assert!(matches!(err, DaffError::Options(_)));
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[orientation]\npitch = -10.0").unwrap();
        let options = ReaderOptions::load(file.path()).unwrap();
        assert_eq!(options.orientation.unwrap().pitch, -10.0);
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let err = ReaderOptions::load("/nonexistent/daff-options.toml").unwrap_err();
        assert!(matches!(err, DaffError::Io { .. }));
    }

    #[test]
    fn builder_methods() {
        let options = ReaderOptions::default()
            .with_max_file_size(10)
            .with_orientation(Orientation::new(1.0, 2.0, 3.0));
        assert_eq!(options.max_file_size, 10);
        assert_eq!(
            options.orientation,
            Some(OrientationOptions {
                yaw: 1.0,
                pitch: 2.0,
                roll: 3.0
            })
        );
    }
}
