//! Typed content views.
//!
//! A [`DaffFile`] holds exactly one content type. [`Content`] is the closed
//! set of views over it; the typed views ([`IrContent`], [`MsContent`],
//! [`PsContent`], [`MpsContent`], [`DftContent`]) add the accessors that
//! only make sense for their type. Every view borrows the file, so it
//! cannot outlive it.
//!
//! The accessors shared by all views live on the [`DaffContent`] trait.
//!
//! ```rust,no_run
//! use daff_reader::{DaffContent, DaffFile, View};
//!
//! let file = DaffFile::open("hrtf.daff")?;
//! let ir = file.ir()?;
//! let hit = ir.nearest_neighbour(View::Object, 0.0, 0.0);
//! let left = ir.filter_coeffs(hit.record, 0)?;
//! assert_eq!(left.len(), ir.filter_length());
//! # Ok::<(), daff_reader::DaffError>(())
//! ```

use daff_core::View;

use crate::error::{DaffError, Result};
use crate::header::ContentHeader;
use crate::metadata::Metadata;
use crate::reader::DaffFile;
use crate::types::ContentType;

/// Result of a nearest-neighbour lookup: the record index and whether the
/// query fell outside the file's angular coverage.
pub type NearestNeighbour = daff_core::Nearest;

/// Accessors shared by every content view.
pub trait DaffContent {
    /// The file this view reads from.
    fn file(&self) -> &DaffFile;

    /// Content type of the file.
    fn content_type(&self) -> ContentType {
        self.file().properties().content_type()
    }

    /// Number of records.
    fn num_records(&self) -> usize {
        self.file().properties().num_records()
    }

    /// Number of channels per record.
    fn num_channels(&self) -> usize {
        self.file().properties().num_channels()
    }

    /// Filter length (IR), number of frequencies (MS, PS, MPS) or number
    /// of DFT coefficients (DFT).
    fn shape_parameter(&self) -> usize {
        self.file().content_header().shape_parameter()
    }

    /// Number of values [`DaffContent::data`] returns per channel.
    ///
    /// Equal to [`DaffContent::shape_parameter`], doubled for the complex
    /// types (MPS, DFT) which interleave two values per bin.
    fn values_per_channel(&self) -> usize {
        self.file().content_header().values_per_channel()
    }

    /// Record closest to a direction given in `view` coordinates (radians).
    fn nearest_neighbour(&self, view: View, angle1: f64, angle2: f64) -> NearestNeighbour {
        self.file().nearest_neighbour(view, angle1, angle2)
    }

    /// Direction of `record` in `view` coordinates (radians).
    fn record_coords(&self, record: usize, view: View) -> Result<(f64, f64)> {
        self.file().record_coords(record, view)
    }

    /// Metadata attached to `record`, if any.
    fn record_metadata(&self, record: usize) -> Result<Option<&Metadata>> {
        self.file().record_metadata(record)
    }

    /// Fill `out` with the values of one record and channel.
    ///
    /// `out` must be exactly [`DaffContent::values_per_channel`] long.
    fn data_into(&self, record: usize, channel: usize, out: &mut [f32]) -> Result<()> {
        self.file().read_channel(record, channel, out)
    }

    /// Values of one record and channel.
    fn data(&self, record: usize, channel: usize) -> Result<Vec<f32>> {
        let mut out = vec![0.0; self.values_per_channel()];
        self.data_into(record, channel, &mut out)?;
        Ok(out)
    }
}

/// View over a file of any content type.
#[derive(Debug, Clone, Copy)]
pub enum Content<'a> {
    /// Impulse responses.
    Ir(IrContent<'a>),
    /// Magnitude spectra.
    Ms(MsContent<'a>),
    /// Phase spectra.
    Ps(PsContent<'a>),
    /// Magnitude-phase spectra.
    Mps(MpsContent<'a>),
    /// DFT coefficients.
    Dft(DftContent<'a>),
}

impl<'a> Content<'a> {
    pub(crate) fn new(file: &'a DaffFile) -> Self {
        match file.content_header() {
            ContentHeader::Ir {
                samplerate,
                filter_length,
            } => Content::Ir(IrContent {
                file,
                samplerate: *samplerate,
                filter_length: *filter_length,
            }),
            ContentHeader::Ms {
                max_magnitude,
                frequencies,
            } => Content::Ms(MsContent {
                file,
                max_magnitude: *max_magnitude,
                frequencies,
            }),
            ContentHeader::Ps { frequencies } => Content::Ps(PsContent { file, frequencies }),
            ContentHeader::Mps {
                max_magnitude,
                frequencies,
            } => Content::Mps(MpsContent {
                file,
                max_magnitude: *max_magnitude,
                frequencies,
            }),
            ContentHeader::Dft {
                num_coeffs,
                transform_size,
                samplerate,
                max_magnitude,
            } => Content::Dft(DftContent {
                file,
                num_coeffs: *num_coeffs,
                transform_size: *transform_size,
                samplerate: *samplerate,
                max_magnitude: *max_magnitude,
            }),
        }
    }

    /// Sampling rate in Hz (IR and DFT only).
    pub fn samplerate(&self) -> Result<f32> {
        match self {
            Content::Ir(ir) => Ok(ir.samplerate),
            Content::Dft(dft) => Ok(dft.samplerate),
            _ => Err(self.not_applicable("samplerate")),
        }
    }

    /// Whether the DFT coefficients are the non-redundant half of a
    /// symmetric spectrum (DFT only).
    pub fn is_symmetric(&self) -> Result<bool> {
        match self {
            Content::Dft(dft) => Ok(dft.is_symmetric()),
            _ => Err(self.not_applicable("is_symmetric")),
        }
    }

    /// Frequency support in Hz (MS, PS and MPS only).
    pub fn frequencies(&self) -> Result<&'a [f32]> {
        match self {
            Content::Ms(ms) => Ok(ms.frequencies),
            Content::Ps(ps) => Ok(ps.frequencies),
            Content::Mps(mps) => Ok(mps.frequencies),
            _ => Err(self.not_applicable("frequencies")),
        }
    }

    fn not_applicable(&self, operation: &'static str) -> DaffError {
        DaffError::NotApplicable {
            operation,
            content_type: self.content_type(),
        }
    }
}

impl DaffContent for Content<'_> {
    fn file(&self) -> &DaffFile {
        match self {
            Content::Ir(v) => v.file,
            Content::Ms(v) => v.file,
            Content::Ps(v) => v.file,
            Content::Mps(v) => v.file,
            Content::Dft(v) => v.file,
        }
    }
}

/// Impulse response content.
///
/// Each channel stores a window of `element_count` samples starting at
/// `leading_zeros`; everything outside the window reads as zero.
#[derive(Debug, Clone, Copy)]
pub struct IrContent<'a> {
    file: &'a DaffFile,
    samplerate: f32,
    filter_length: usize,
}

impl IrContent<'_> {
    /// Number of taps per filter.
    pub fn filter_length(&self) -> usize {
        self.filter_length
    }

    /// Sampling rate in Hz.
    pub fn samplerate(&self) -> f32 {
        self.samplerate
    }

    /// Full filter of one record and channel, `filter_length` taps.
    pub fn filter_coeffs(&self, record: usize, channel: usize) -> Result<Vec<f32>> {
        self.data(record, channel)
    }

    /// Fill `out` (length `filter_length`) with one filter.
    pub fn filter_coeffs_into(&self, record: usize, channel: usize, out: &mut [f32]) -> Result<()> {
        self.data_into(record, channel, out)
    }

    /// `(offset, length)` of the stored window of one filter.
    pub fn effective_bounds(&self, record: usize, channel: usize) -> Result<(usize, usize)> {
        let descriptor = self.file.channel_descriptor(record, channel)?;
        Ok((descriptor.leading_zeros, descriptor.element_count))
    }

    /// Smallest window offset over all records and channels.
    pub fn min_effective_offset(&self) -> usize {
        self.file
            .records()
            .channels()
            .iter()
            .map(|d| d.leading_zeros)
            .min()
            .unwrap_or(0)
    }

    /// Largest window length over all records and channels.
    pub fn max_effective_length(&self) -> usize {
        self.file
            .records()
            .channels()
            .iter()
            .map(|d| d.element_count)
            .max()
            .unwrap_or(0)
    }
}

/// Magnitude spectrum content.
#[derive(Debug, Clone, Copy)]
pub struct MsContent<'a> {
    file: &'a DaffFile,
    max_magnitude: f32,
    frequencies: &'a [f32],
}

impl<'a> MsContent<'a> {
    /// Number of frequency bins.
    pub fn num_frequencies(&self) -> usize {
        self.frequencies.len()
    }

    /// Bin frequencies in Hz.
    pub fn frequencies(&self) -> &'a [f32] {
        self.frequencies
    }

    /// Largest magnitude in the file, as declared in its header.
    pub fn max_magnitude(&self) -> f32 {
        self.max_magnitude
    }

    /// Linear magnitudes of one record and channel.
    pub fn magnitudes(&self, record: usize, channel: usize) -> Result<Vec<f32>> {
        self.data(record, channel)
    }

    /// Fill `out` (length `num_frequencies`) with magnitudes.
    pub fn magnitudes_into(&self, record: usize, channel: usize, out: &mut [f32]) -> Result<()> {
        self.data_into(record, channel, out)
    }
}

/// Phase spectrum content.
#[derive(Debug, Clone, Copy)]
pub struct PsContent<'a> {
    file: &'a DaffFile,
    frequencies: &'a [f32],
}

impl<'a> PsContent<'a> {
    /// Number of frequency bins.
    pub fn num_frequencies(&self) -> usize {
        self.frequencies.len()
    }

    /// Bin frequencies in Hz.
    pub fn frequencies(&self) -> &'a [f32] {
        self.frequencies
    }

    /// Phases in radians of one record and channel.
    pub fn phases(&self, record: usize, channel: usize) -> Result<Vec<f32>> {
        self.data(record, channel)
    }

    /// Fill `out` (length `num_frequencies`) with phases.
    pub fn phases_into(&self, record: usize, channel: usize, out: &mut [f32]) -> Result<()> {
        self.data_into(record, channel, out)
    }
}

/// Magnitude-phase spectrum content.
///
/// Stored as interleaved `(magnitude, phase)` pairs.
#[derive(Debug, Clone, Copy)]
pub struct MpsContent<'a> {
    file: &'a DaffFile,
    max_magnitude: f32,
    frequencies: &'a [f32],
}

impl<'a> MpsContent<'a> {
    /// Number of frequency bins.
    pub fn num_frequencies(&self) -> usize {
        self.frequencies.len()
    }

    /// Bin frequencies in Hz.
    pub fn frequencies(&self) -> &'a [f32] {
        self.frequencies
    }

    /// Largest magnitude in the file, as declared in its header.
    pub fn max_magnitude(&self) -> f32 {
        self.max_magnitude
    }

    /// Interleaved `(magnitude, phase)` pairs.
    pub fn coefficients_mp(&self, record: usize, channel: usize) -> Result<Vec<f32>> {
        self.data(record, channel)
    }

    /// Interleaved `(real, imaginary)` pairs.
    pub fn coefficients_ri(&self, record: usize, channel: usize) -> Result<Vec<f32>> {
        let mut values = self.data(record, channel)?;
        for pair in values.chunks_exact_mut(2) {
            let (magnitude, phase) = (pair[0], pair[1]);
            pair[0] = magnitude * phase.cos();
            pair[1] = magnitude * phase.sin();
        }
        Ok(values)
    }

    /// Separate magnitude and phase sequences, `num_frequencies` each.
    pub fn coefficients(&self, record: usize, channel: usize) -> Result<(Vec<f32>, Vec<f32>)> {
        let values = self.data(record, channel)?;
        Ok(values.chunks_exact(2).map(|pair| (pair[0], pair[1])).unzip())
    }
}

/// DFT coefficient content.
///
/// Coefficients are interleaved `(real, imaginary)` pairs. A symmetric
/// file stores only the non-redundant half of the spectrum; accessors
/// return what is stored and never reconstruct or truncate.
#[derive(Debug, Clone, Copy)]
pub struct DftContent<'a> {
    file: &'a DaffFile,
    num_coeffs: usize,
    transform_size: usize,
    samplerate: f32,
    max_magnitude: f32,
}

impl DftContent<'_> {
    /// Number of stored complex coefficients.
    pub fn num_dft_coeffs(&self) -> usize {
        self.num_coeffs
    }

    /// Length of the underlying transform.
    pub fn transform_size(&self) -> usize {
        self.transform_size
    }

    /// Sampling rate in Hz.
    pub fn samplerate(&self) -> f32 {
        self.samplerate
    }

    /// Bin spacing in Hz.
    pub fn frequency_bandwidth(&self) -> f32 {
        self.samplerate / self.transform_size as f32
    }

    /// `true` if fewer coefficients are stored than the transform size.
    pub fn is_symmetric(&self) -> bool {
        self.num_coeffs < self.transform_size
    }

    /// Largest magnitude in the file, as declared in its header.
    pub fn max_magnitude(&self) -> f32 {
        self.max_magnitude
    }

    /// Interleaved `(real, imaginary)` pairs, `2 * num_dft_coeffs` values.
    pub fn dft_coeffs(&self, record: usize, channel: usize) -> Result<Vec<f32>> {
        self.data(record, channel)
    }

    /// Fill `out` (length `2 * num_dft_coeffs`) with coefficients.
    pub fn dft_coeffs_into(&self, record: usize, channel: usize, out: &mut [f32]) -> Result<()> {
        self.data_into(record, channel, out)
    }

    /// Magnitude of each coefficient.
    pub fn magnitudes(&self, record: usize, channel: usize) -> Result<Vec<f32>> {
        let values = self.data(record, channel)?;
        Ok(values
            .chunks_exact(2)
            .map(|pair| pair[0].hypot(pair[1]))
            .collect())
    }

    /// Phase of each coefficient in radians.
    pub fn phases(&self, record: usize, channel: usize) -> Result<Vec<f32>> {
        let values = self.data(record, channel)?;
        Ok(values
            .chunks_exact(2)
            .map(|pair| pair[1].atan2(pair[0]))
            .collect())
    }
}

impl DaffContent for IrContent<'_> {
    fn file(&self) -> &DaffFile {
        self.file
    }
}

impl DaffContent for MsContent<'_> {
    fn file(&self) -> &DaffFile {
        self.file
    }
}

impl DaffContent for PsContent<'_> {
    fn file(&self) -> &DaffFile {
        self.file
    }
}

impl DaffContent for MpsContent<'_> {
    fn file(&self) -> &DaffFile {
        self.file
    }
}

impl DaffContent for DftContent<'_> {
    fn file(&self) -> &DaffFile {
        self.file
    }
}
