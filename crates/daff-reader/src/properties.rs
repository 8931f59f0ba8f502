//! Global file properties.

use daff_core::{GridSpec, Orientation, SphericalGrid};

use crate::header::MainHeader;
use crate::types::{ContentType, Quantization};

/// Read-only properties from the main header.
///
/// Angles are degrees, as stored in the file.
#[derive(Debug, Clone, PartialEq)]
pub struct Properties {
    content_type: ContentType,
    quantization: Quantization,
    num_channels: usize,
    num_records: usize,
    channel_labels: Vec<Option<String>>,
    grid: GridSpec,
    alpha_resolution: f32,
    beta_resolution: f32,
    orientation: Orientation,
    default_orientation: Orientation,
    full_sphere: bool,
}

impl Properties {
    pub(crate) fn new(header: &MainHeader, grid: &SphericalGrid) -> Self {
        Self {
            content_type: header.content_type,
            quantization: header.quantization,
            num_channels: header.num_channels,
            num_records: header.num_records,
            channel_labels: header.channel_labels.clone(),
            grid: header.grid,
            alpha_resolution: grid.alpha_resolution().to_degrees() as f32,
            beta_resolution: grid.beta_resolution().to_degrees() as f32,
            orientation: header.orientation,
            default_orientation: header.orientation,
            full_sphere: grid.covers_full_sphere(),
        }
    }

    pub(crate) fn set_orientation(&mut self, orientation: Orientation) {
        self.orientation = orientation;
    }

    /// Content type of every record.
    pub fn content_type(&self) -> ContentType {
        self.content_type
    }

    /// Storage precision of the data block.
    pub fn quantization(&self) -> Quantization {
        self.quantization
    }

    /// Number of channels per record.
    pub fn num_channels(&self) -> usize {
        self.num_channels
    }

    /// Number of records.
    pub fn num_records(&self) -> usize {
        self.num_records
    }

    /// Label of `channel`, if the file names it.
    pub fn channel_label(&self, channel: usize) -> Option<&str> {
        self.channel_labels.get(channel)?.as_deref()
    }

    /// One entry per channel, `None` where the file stores no label.
    pub fn channel_labels(&self) -> &[Option<String>] {
        &self.channel_labels
    }

    /// Number of alpha samples per row.
    pub fn alpha_points(&self) -> u32 {
        self.grid.alpha_points
    }

    /// Alpha step in degrees.
    pub fn alpha_resolution(&self) -> f32 {
        self.alpha_resolution
    }

    /// First and last alpha sample in degrees.
    pub fn alpha_range(&self) -> (f32, f32) {
        (self.grid.alpha_start, self.grid.alpha_end)
    }

    /// Number of beta rows.
    pub fn beta_points(&self) -> u32 {
        self.grid.beta_points
    }

    /// Beta step in degrees.
    pub fn beta_resolution(&self) -> f32 {
        self.beta_resolution
    }

    /// First and last beta row in degrees.
    pub fn beta_range(&self) -> (f32, f32) {
        (self.grid.beta_start, self.grid.beta_end)
    }

    /// Orientation currently used for object-view queries.
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Orientation stored in the file.
    pub fn default_orientation(&self) -> Orientation {
        self.default_orientation
    }

    /// `true` if the grid samples the whole sphere.
    pub fn covers_full_sphere(&self) -> bool {
        self.full_sphere
    }
}
