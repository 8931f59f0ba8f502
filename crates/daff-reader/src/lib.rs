//! Reader for DAFF directional audio files.
//!
//! A DAFF file stores one multi-channel payload per sampled direction
//! ("record") on a sphere. The payload type is fixed per file: impulse
//! responses, magnitude spectra, phase spectra, magnitude-phase spectra or
//! DFT coefficients. This crate provides:
//!
//! - **Opening**: [`DaffFile::open`] and [`DaffFile::from_bytes`] parse and
//!   validate the whole container up front
//! - **Properties and metadata**: [`Properties`] and the typed [`Metadata`] store
//! - **Content views**: [`Content`] and the typed views, sharing the
//!   [`DaffContent`] trait for directional lookups and numeric reads
//! - **Facade**: [`DaffReader`], an open/close/last-error wrapper for bindings
//! - **Configuration**: [`ReaderOptions`], loadable from TOML
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use daff_reader::{DaffContent, DaffFile, View};
//!
//! let file = DaffFile::open("hrtf.daff")?;
//! println!("{}", file.summary().to_json()?);
//!
//! // frontal direction, object view, radians
//! let ir = file.ir()?;
//! let hit = ir.nearest_neighbour(View::Object, 0.0, 0.0);
//! let left = ir.filter_coeffs(hit.record, 0)?;
//! let right = ir.filter_coeffs(hit.record, 1)?;
//! # let _ = (left, right);
//! # Ok::<(), daff_reader::DaffError>(())
//! ```
//!
//! All angles passed to or returned from queries are radians. The grid
//! description and orientation in [`Properties`] are degrees, as stored.
//!
//! ## Logging
//!
//! The crate emits [`tracing`] events (`info` on open, `debug` per parsed
//! block, `warn` for skipped blocks) and never installs a subscriber.

mod block;
mod content;
mod error;
mod header;
mod metadata;
mod options;
mod properties;
mod reader;
mod record;
mod summary;
mod types;

pub use block::{SIGNATURE, SUPPORTED_VERSION};
pub use content::{
    Content, DaffContent, DftContent, IrContent, MpsContent, MsContent, NearestNeighbour,
    PsContent,
};
pub use daff_core::{Orientation, View};
pub use error::{DaffError, Result};
pub use metadata::{Metadata, MetadataType, MetadataValue};
pub use options::{DEFAULT_MAX_FILE_SIZE, OrientationOptions, ReaderOptions};
pub use properties::Properties;
pub use reader::{DaffFile, DaffReader};
pub use summary::{ContentSummary, OrientationSummary, PropertySummary};
pub use types::{ContentType, Quantization};
