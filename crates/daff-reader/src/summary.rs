//! Serializable property summary.
//!
//! Mirrors the properties dictionary that language bindings expose, with
//! the same PascalCase keys.

use daff_core::Orientation;
use serde::Serialize;

use crate::content::Content;
use crate::error::Result;
use crate::reader::DaffFile;

/// Flat summary of a file's properties.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PropertySummary {
    /// Path the file was opened from; `null` for in-memory files.
    pub filename: Option<String>,
    /// File format version.
    pub file_format_version: i32,
    /// Short content type name (`IR`, `MS`, ...).
    pub content_type: String,
    /// Short quantization name (`int16`, `int24`, `float32`).
    pub quantization: String,
    /// Channels per record.
    pub num_channels: usize,
    /// Number of records.
    pub num_records: usize,
    /// Channel labels, empty ones left out.
    pub channel_labels: Vec<String>,
    /// Alpha samples per row.
    pub alpha_points: u32,
    /// Alpha step in degrees.
    pub alpha_resolution: f32,
    /// First and last alpha sample in degrees.
    pub alpha_range: (f32, f32),
    /// Beta rows.
    pub beta_points: u32,
    /// Beta step in degrees.
    pub beta_resolution: f32,
    /// First and last beta row in degrees.
    pub beta_range: (f32, f32),
    /// Current orientation.
    pub orientation: OrientationSummary,
    /// Orientation stored in the file.
    pub orientation_default: OrientationSummary,
    /// Whether the grid covers the whole sphere.
    pub full_sphere: bool,
    /// Content-type specific fields.
    #[serde(flatten)]
    pub content: ContentSummary,
}

/// Orientation angles in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct OrientationSummary {
    /// Yaw in degrees.
    pub yaw_angle: f32,
    /// Pitch in degrees.
    pub pitch_angle: f32,
    /// Roll in degrees.
    pub roll_angle: f32,
}

impl From<Orientation> for OrientationSummary {
    fn from(o: Orientation) -> Self {
        Self {
            yaw_angle: o.yaw,
            pitch_angle: o.pitch,
            roll_angle: o.roll,
        }
    }
}

/// Fields that only exist for some content types.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ContentSummary {
    /// Impulse response fields.
    #[serde(rename_all = "PascalCase")]
    ImpulseResponse {
        /// Sampling rate in Hz.
        samplerate: f32,
        /// Taps per filter.
        filter_length: usize,
    },
    /// Magnitude, phase and magnitude-phase spectrum fields.
    #[serde(rename_all = "PascalCase")]
    Spectrum {
        /// Number of frequency bins.
        num_freqs: usize,
        /// Bin frequencies in Hz.
        frequencies: Vec<f32>,
    },
    /// DFT fields.
    #[serde(rename_all = "PascalCase")]
    Dft {
        /// Transform length.
        transform_size: usize,
        /// Stored coefficients.
        #[serde(rename = "NumDFTCoeffs")]
        num_dft_coeffs: usize,
        /// Half spectrum stored.
        is_symmetric: bool,
        /// Sampling rate in Hz.
        samplerate: f32,
        /// Bin spacing in Hz.
        frequency_bandwidth: f32,
    },
}

impl PropertySummary {
    pub(crate) fn new(file: &DaffFile) -> Self {
        let p = file.properties();
        let content = match file.content() {
            Content::Ir(ir) => ContentSummary::ImpulseResponse {
                samplerate: ir.samplerate(),
                filter_length: ir.filter_length(),
            },
            Content::Ms(ms) => spectrum(ms.frequencies()),
            Content::Ps(ps) => spectrum(ps.frequencies()),
            Content::Mps(mps) => spectrum(mps.frequencies()),
            Content::Dft(dft) => ContentSummary::Dft {
                transform_size: dft.transform_size(),
                num_dft_coeffs: dft.num_dft_coeffs(),
                is_symmetric: dft.is_symmetric(),
                samplerate: dft.samplerate(),
                frequency_bandwidth: dft.frequency_bandwidth(),
            },
        };

        Self {
            filename: file.filename().map(|path| path.display().to_string()),
            file_format_version: file.file_format_version(),
            content_type: p.content_type().short_name().to_string(),
            quantization: p.quantization().short_name().to_string(),
            num_channels: p.num_channels(),
            num_records: p.num_records(),
            channel_labels: p.channel_labels().iter().flatten().cloned().collect(),
            alpha_points: p.alpha_points(),
            alpha_resolution: p.alpha_resolution(),
            alpha_range: p.alpha_range(),
            beta_points: p.beta_points(),
            beta_resolution: p.beta_resolution(),
            beta_range: p.beta_range(),
            orientation: p.orientation().into(),
            orientation_default: p.default_orientation().into(),
            full_sphere: p.covers_full_sphere(),
            content,
        }
    }

    /// Render as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn spectrum(frequencies: &[f32]) -> ContentSummary {
    ContentSummary::Spectrum {
        num_freqs: frequencies.len(),
        frequencies: frequencies.to_vec(),
    }
}
