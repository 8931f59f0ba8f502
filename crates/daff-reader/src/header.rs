//! Main header and content-specific header decoding.

use daff_core::{GridSpec, Orientation};

use crate::block::BlockReader;
use crate::error::{DaffError, Result};
use crate::types::{ContentType, Quantization};

/// Decoded main header (block 1).
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct MainHeader {
    pub content_type: ContentType,
    pub quantization: Quantization,
    pub num_channels: usize,
    pub num_records: usize,
    pub grid: GridSpec,
    pub orientation: Orientation,
    pub metadata_index: Option<usize>,
    pub channel_labels: Vec<Option<String>>,
}

pub(crate) fn read_main_header(buf: &[u8]) -> Result<MainHeader> {
    let mut r = BlockReader::new("main header", buf);

    let code = r.read_i32()?;
    let content_type = ContentType::from_code(code)
        .ok_or_else(|| DaffError::format(format!("unknown content type {code}")))?;
    let code = r.read_i32()?;
    let quantization = Quantization::from_code(code)
        .ok_or_else(|| DaffError::format(format!("unknown quantization {code}")))?;
    let num_channels = r.read_count("channel count")?;
    let num_records = r.read_count("record count")?;

    let alpha_points = r.read_count("alpha point count")?;
    let alpha_start = r.read_f32()?;
    let alpha_end = r.read_f32()?;
    let beta_points = r.read_count("beta point count")?;
    let beta_start = r.read_f32()?;
    let beta_end = r.read_f32()?;
    let grid = GridSpec {
        alpha_points: u32::try_from(alpha_points)
            .map_err(|_| DaffError::format("alpha point count too large"))?,
        alpha_start,
        alpha_end,
        beta_points: u32::try_from(beta_points)
            .map_err(|_| DaffError::format("beta point count too large"))?,
        beta_start,
        beta_end,
    };

    let orientation = Orientation::new(r.read_f32()?, r.read_f32()?, r.read_f32()?);
    if !orientation.is_finite() {
        return Err(DaffError::format("default orientation is not finite"));
    }

    let metadata_index = r.read_optional_index("metadata index")?;

    // each label needs at least its two length bytes
    if num_channels > r.remaining() / 2 {
        return Err(DaffError::Truncated { block: r.name() });
    }
    let channel_labels = (0..num_channels)
        .map(|_| {
            r.read_string_u16()
                .map(|label| (!label.is_empty()).then_some(label))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(MainHeader {
        content_type,
        quantization,
        num_channels,
        num_records,
        grid,
        orientation,
        metadata_index,
        channel_labels,
    })
}

/// Content-specific header (block 2).
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ContentHeader {
    Ir {
        samplerate: f32,
        filter_length: usize,
    },
    Ms {
        max_magnitude: f32,
        frequencies: Vec<f32>,
    },
    Ps {
        frequencies: Vec<f32>,
    },
    Mps {
        max_magnitude: f32,
        frequencies: Vec<f32>,
    },
    Dft {
        num_coeffs: usize,
        transform_size: usize,
        samplerate: f32,
        max_magnitude: f32,
    },
}

impl ContentHeader {
    /// Filter length, number of frequencies or number of DFT coefficients.
    pub(crate) fn shape_parameter(&self) -> usize {
        match self {
            ContentHeader::Ir { filter_length, .. } => *filter_length,
            ContentHeader::Ms { frequencies, .. }
            | ContentHeader::Ps { frequencies }
            | ContentHeader::Mps { frequencies, .. } => frequencies.len(),
            ContentHeader::Dft { num_coeffs, .. } => *num_coeffs,
        }
    }

    /// Number of `f32` values returned per record and channel.
    pub(crate) fn values_per_channel(&self) -> usize {
        match self {
            ContentHeader::Mps { .. } | ContentHeader::Dft { .. } => 2 * self.shape_parameter(),
            _ => self.shape_parameter(),
        }
    }
}

pub(crate) fn read_content_header(content_type: ContentType, buf: &[u8]) -> Result<ContentHeader> {
    let mut r = BlockReader::new("content header", buf);

    let header = match content_type {
        ContentType::ImpulseResponse => {
            let samplerate = read_samplerate(&mut r)?;
            let filter_length = r.read_count("filter length")?;
            ContentHeader::Ir {
                samplerate,
                filter_length,
            }
        }
        ContentType::MagnitudeSpectrum => {
            let max_magnitude = r.read_f32()?;
            let frequencies = read_frequencies(&mut r)?;
            ContentHeader::Ms {
                max_magnitude,
                frequencies,
            }
        }
        ContentType::PhaseSpectrum => ContentHeader::Ps {
            frequencies: read_frequencies(&mut r)?,
        },
        ContentType::MagnitudePhaseSpectrum => {
            let max_magnitude = r.read_f32()?;
            let frequencies = read_frequencies(&mut r)?;
            ContentHeader::Mps {
                max_magnitude,
                frequencies,
            }
        }
        ContentType::DftSpectrum => {
            let num_coeffs = r.read_count("DFT coefficient count")?;
            let transform_size = r.read_count("transform size")?;
            if transform_size < num_coeffs {
                return Err(DaffError::format(format!(
                    "transform size {transform_size} is smaller than coefficient count {num_coeffs}"
                )));
            }
            let samplerate = read_samplerate(&mut r)?;
            let max_magnitude = r.read_f32()?;
            ContentHeader::Dft {
                num_coeffs,
                transform_size,
                samplerate,
                max_magnitude,
            }
        }
    };

    tracing::debug!(
        content = content_type.short_name(),
        shape = header.shape_parameter(),
        "parsed content header"
    );
    Ok(header)
}

fn read_samplerate(r: &mut BlockReader<'_>) -> Result<f32> {
    let samplerate = r.read_f32()?;
    if !(samplerate.is_finite() && samplerate > 0.0) {
        return Err(DaffError::format(format!("invalid samplerate {samplerate}")));
    }
    Ok(samplerate)
}

fn read_frequencies(r: &mut BlockReader<'_>) -> Result<Vec<f32>> {
    let n = r.read_count("frequency count")?;
    let frequencies = r.read_f32_vec(n)?;
    if frequencies.iter().any(|f| !f.is_finite() || *f < 0.0) {
        return Err(DaffError::format("frequency support contains invalid values"));
    }
    Ok(frequencies)
}
