//! Content type and quantization enumerations.

use std::fmt;

/// Kind of data stored per record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentType {
    /// Time-domain impulse responses (e.g. HRIRs).
    ImpulseResponse,
    /// Linear magnitude spectra.
    MagnitudeSpectrum,
    /// Phase spectra in radians.
    PhaseSpectrum,
    /// Combined magnitude and phase spectra.
    MagnitudePhaseSpectrum,
    /// Discrete Fourier transform coefficients.
    DftSpectrum,
}

impl ContentType {
    /// All content types in code order.
    pub const ALL: [ContentType; 5] = [
        ContentType::ImpulseResponse,
        ContentType::MagnitudeSpectrum,
        ContentType::PhaseSpectrum,
        ContentType::MagnitudePhaseSpectrum,
        ContentType::DftSpectrum,
    ];

    /// Integer code stored in the main header.
    pub fn code(self) -> i32 {
        match self {
            ContentType::ImpulseResponse => 0,
            ContentType::MagnitudeSpectrum => 1,
            ContentType::PhaseSpectrum => 2,
            ContentType::MagnitudePhaseSpectrum => 3,
            ContentType::DftSpectrum => 4,
        }
    }

    /// Inverse of [`ContentType::code`].
    pub fn from_code(code: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.code() == code)
    }

    /// Short name (`IR`, `MS`, `PS`, `MPS`, `DFT`).
    pub fn short_name(self) -> &'static str {
        match self {
            ContentType::ImpulseResponse => "IR",
            ContentType::MagnitudeSpectrum => "MS",
            ContentType::PhaseSpectrum => "PS",
            ContentType::MagnitudePhaseSpectrum => "MPS",
            ContentType::DftSpectrum => "DFT",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ContentType::ImpulseResponse => "impulse response",
            ContentType::MagnitudeSpectrum => "magnitude spectrum",
            ContentType::PhaseSpectrum => "phase spectrum",
            ContentType::MagnitudePhaseSpectrum => "magnitude-phase spectrum",
            ContentType::DftSpectrum => "DFT spectrum",
        };
        f.write_str(name)
    }
}

/// Storage precision of the data block.
///
/// Purely informational for callers: every read de-quantizes to `f32`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quantization {
    /// 16-bit signed integer.
    Int16,
    /// 24-bit signed integer, packed in three bytes.
    Int24,
    /// 32-bit IEEE float.
    Float32,
}

impl Quantization {
    /// Integer code stored in the main header.
    pub fn code(self) -> i32 {
        match self {
            Quantization::Int16 => 0,
            Quantization::Int24 => 1,
            Quantization::Float32 => 2,
        }
    }

    /// Inverse of [`Quantization::code`].
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Quantization::Int16),
            1 => Some(Quantization::Int24),
            2 => Some(Quantization::Float32),
            _ => None,
        }
    }

    /// Short name (`int16`, `int24`, `float32`).
    pub fn short_name(self) -> &'static str {
        match self {
            Quantization::Int16 => "int16",
            Quantization::Int24 => "int24",
            Quantization::Float32 => "float32",
        }
    }

    /// Bytes per stored element.
    pub fn element_size(self) -> usize {
        match self {
            Quantization::Int16 => 2,
            Quantization::Int24 => 3,
            Quantization::Float32 => 4,
        }
    }
}

impl fmt::Display for Quantization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Quantization::Int16 => "16-bit integer",
            Quantization::Int24 => "24-bit integer",
            Quantization::Float32 => "32-bit floating point",
        };
        f.write_str(name)
    }
}
