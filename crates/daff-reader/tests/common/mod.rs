//! Test-only DAFF writer.
//!
//! Builds synthetic files byte by byte so integration tests can exercise
//! every content type, quantization and corruption case without fixtures.
#![allow(dead_code)]

use byteorder::{LittleEndian, WriteBytesExt};
use daff_reader::MetadataValue;

/// Content-specific header description.
#[derive(Debug, Clone)]
pub enum ContentSpec {
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

impl ContentSpec {
    fn code(&self) -> i32 {
        match self {
            ContentSpec::Ir { .. } => 0,
            ContentSpec::Ms { .. } => 1,
            ContentSpec::Ps { .. } => 2,
            ContentSpec::Mps { .. } => 3,
            ContentSpec::Dft { .. } => 4,
        }
    }

    pub fn values_per_channel(&self) -> usize {
        match self {
            ContentSpec::Ir { filter_length, .. } => *filter_length,
            ContentSpec::Ms { frequencies, .. } | ContentSpec::Ps { frequencies } => {
                frequencies.len()
            }
            ContentSpec::Mps { frequencies, .. } => 2 * frequencies.len(),
            ContentSpec::Dft { num_coeffs, .. } => 2 * num_coeffs,
        }
    }
}

/// Alpha/beta grid description in degrees.
#[derive(Debug, Clone, Copy)]
pub struct Grid {
    pub alpha_points: i32,
    pub alpha_start: f32,
    pub alpha_end: f32,
    pub beta_points: i32,
    pub beta_start: f32,
    pub beta_end: f32,
}

impl Grid {
    /// 6 × 6 partial grid: alpha 0..300 in 60° steps, beta 15..140 in 25° steps.
    pub fn six_by_six() -> Self {
        Self {
            alpha_points: 6,
            alpha_start: 0.0,
            alpha_end: 300.0,
            beta_points: 6,
            beta_start: 15.0,
            beta_end: 140.0,
        }
    }

    /// Full sphere with `res` degree steps, poles included.
    pub fn full_sphere(res: f32) -> Self {
        Self {
            alpha_points: (360.0 / res) as i32,
            alpha_start: 0.0,
            alpha_end: 360.0 - res,
            beta_points: (180.0 / res) as i32 + 1,
            beta_start: 0.0,
            beta_end: 180.0,
        }
    }

    /// Number of records, pole rows counted once.
    pub fn num_records(&self) -> usize {
        let res = if self.beta_points > 1 {
            (self.beta_end - self.beta_start) / (self.beta_points - 1) as f32
        } else {
            0.0
        };
        (0..self.beta_points)
            .map(|b| {
                let beta = self.beta_start + b as f32 * res;
                if beta.abs() < 1e-4 || (beta - 180.0).abs() < 1e-4 {
                    1
                } else {
                    self.alpha_points as usize
                }
            })
            .sum()
    }
}

/// Builder for a complete DAFF file.
#[derive(Debug, Clone)]
pub struct DaffBuilder {
    pub content: ContentSpec,
    quantization: i32,
    channels: usize,
    grid: Grid,
    orientation: [f32; 3],
    labels: Vec<String>,
    version: i32,
    declared_records: Option<i32>,
    global_metadata: i32,
    metadata_sets: Vec<Vec<(String, MetadataValue)>>,
    record_metadata: Vec<(usize, i32)>,
    ir_window: Option<(usize, usize)>,
    scaling: f32,
    unknown_blocks: Vec<(i32, Vec<u8>)>,
    corrupt_offset: Option<u64>,
    omit_metadata_block: bool,
}

impl DaffBuilder {
    pub fn new(content: ContentSpec) -> Self {
        Self {
            content,
            quantization: 2,
            channels: 2,
            grid: Grid::six_by_six(),
            orientation: [0.0; 3],
            labels: Vec::new(),
            version: 170,
            declared_records: None,
            global_metadata: -1,
            metadata_sets: Vec::new(),
            record_metadata: Vec::new(),
            ir_window: None,
            scaling: 1.0,
            unknown_blocks: Vec::new(),
            corrupt_offset: None,
            omit_metadata_block: false,
        }
    }

    /// Two-channel IR file at 44.1 kHz on the 6 × 6 grid.
    pub fn ir(filter_length: usize) -> Self {
        Self::new(ContentSpec::Ir {
            samplerate: 44100.0,
            filter_length,
        })
    }

    pub fn ms(frequencies: &[f32]) -> Self {
        Self::new(ContentSpec::Ms {
            max_magnitude: 1.0,
            frequencies: frequencies.to_vec(),
        })
    }

    pub fn ps(frequencies: &[f32]) -> Self {
        Self::new(ContentSpec::Ps {
            frequencies: frequencies.to_vec(),
        })
    }

    pub fn mps(frequencies: &[f32]) -> Self {
        Self::new(ContentSpec::Mps {
            max_magnitude: 1.0,
            frequencies: frequencies.to_vec(),
        })
    }

    pub fn dft(num_coeffs: usize, transform_size: usize) -> Self {
        Self::new(ContentSpec::Dft {
            num_coeffs,
            transform_size,
            samplerate: 44100.0,
            max_magnitude: 1.0,
        })
    }

    pub fn quantization(mut self, code: i32) -> Self {
        self.quantization = code;
        self
    }

    pub fn channels(mut self, channels: usize) -> Self {
        self.channels = channels;
        self
    }

    pub fn grid(mut self, grid: Grid) -> Self {
        self.grid = grid;
        self
    }

    pub fn orientation(mut self, yaw: f32, pitch: f32, roll: f32) -> Self {
        self.orientation = [yaw, pitch, roll];
        self
    }

    pub fn labels(mut self, labels: &[&str]) -> Self {
        self.labels = labels.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn version(mut self, version: i32) -> Self {
        self.version = version;
        self
    }

    pub fn declared_records(mut self, records: i32) -> Self {
        self.declared_records = Some(records);
        self
    }

    pub fn metadata_set(mut self, entries: Vec<(&str, MetadataValue)>) -> Self {
        self.metadata_sets
            .push(entries.into_iter().map(|(k, v)| (k.to_string(), v)).collect());
        self
    }

    pub fn global_metadata(mut self, index: i32) -> Self {
        self.global_metadata = index;
        self
    }

    pub fn record_metadata(mut self, record: usize, index: i32) -> Self {
        self.record_metadata.push((record, index));
        self
    }

    /// Store only `count` IR samples starting at `leading_zeros`.
    pub fn ir_window(mut self, leading_zeros: usize, count: usize) -> Self {
        self.ir_window = Some((leading_zeros, count));
        self
    }

    pub fn scaling(mut self, scaling: f32) -> Self {
        self.scaling = scaling;
        self
    }

    pub fn unknown_block(mut self, id: i32, bytes: Vec<u8>) -> Self {
        self.unknown_blocks.push((id, bytes));
        self
    }

    /// Point record 0, channel 0 at an arbitrary data offset.
    pub fn corrupt_offset(mut self, offset: u64) -> Self {
        self.corrupt_offset = Some(offset);
        self
    }

    pub fn without_metadata_block(mut self) -> Self {
        self.omit_metadata_block = true;
        self
    }

    pub fn num_records(&self) -> usize {
        self.grid.num_records()
    }

    /// Raw stored value for output position `i`.
    pub fn raw_sample(record: usize, channel: usize, i: usize) -> i32 {
        ((record * 37 + channel * 11 + i * 5) % 2001) as i32 - 1000
    }

    /// Value the reader should return for output position `i`.
    pub fn expected(&self, record: usize, channel: usize, i: usize) -> f32 {
        if let (ContentSpec::Ir { .. }, Some((lead, count))) = (&self.content, self.ir_window) {
            if i < lead || i >= lead + count {
                return 0.0;
            }
        }
        let raw = Self::raw_sample(record, channel, i);
        match self.quantization {
            0 => raw as i16 as f32 / 32767.0 * self.scaling,
            1 => (raw * 1000) as f32 / 8_388_607.0 * self.scaling,
            _ => raw as f32 / 1000.0 * self.scaling,
        }
    }

    pub fn build(&self) -> Vec<u8> {
        let mut blocks: Vec<(i32, Vec<u8>)> = vec![
            (1, self.main_header()),
            (2, self.content_header()),
        ];
        let (descriptors, data) = self.records_and_data();
        blocks.push((3, descriptors));
        blocks.push((4, data));
        if !self.omit_metadata_block {
            blocks.push((5, self.metadata_block()));
        }
        blocks.extend(self.unknown_blocks.iter().cloned());

        let mut out = b"FW".to_vec();
        out.write_i32::<LittleEndian>(self.version).unwrap();
        out.write_i32::<LittleEndian>(blocks.len() as i32).unwrap();
        let mut offset = (10 + 20 * blocks.len()) as u64;
        for (id, bytes) in &blocks {
            out.write_i32::<LittleEndian>(*id).unwrap();
            out.write_u64::<LittleEndian>(offset).unwrap();
            out.write_u64::<LittleEndian>(bytes.len() as u64).unwrap();
            offset += bytes.len() as u64;
        }
        for (_, bytes) in &blocks {
            out.extend_from_slice(bytes);
        }
        out
    }

    fn main_header(&self) -> Vec<u8> {
        let mut out = Vec::new();
        let records = self
            .declared_records
            .unwrap_or(self.num_records() as i32);
        for v in [
            self.content.code(),
            self.quantization,
            self.channels as i32,
            records,
        ] {
            out.write_i32::<LittleEndian>(v).unwrap();
        }
        let g = self.grid;
        out.write_i32::<LittleEndian>(g.alpha_points).unwrap();
        out.write_f32::<LittleEndian>(g.alpha_start).unwrap();
        out.write_f32::<LittleEndian>(g.alpha_end).unwrap();
        out.write_i32::<LittleEndian>(g.beta_points).unwrap();
        out.write_f32::<LittleEndian>(g.beta_start).unwrap();
        out.write_f32::<LittleEndian>(g.beta_end).unwrap();
        for angle in self.orientation {
            out.write_f32::<LittleEndian>(angle).unwrap();
        }
        out.write_i32::<LittleEndian>(self.global_metadata).unwrap();
        for channel in 0..self.channels {
            let label = self.labels.get(channel).map_or("", String::as_str);
            out.write_u16::<LittleEndian>(label.len() as u16).unwrap();
            out.extend_from_slice(label.as_bytes());
        }
        out
    }

    fn content_header(&self) -> Vec<u8> {
        let mut out = Vec::new();
        let write_freqs = |out: &mut Vec<u8>, freqs: &[f32]| {
            out.write_i32::<LittleEndian>(freqs.len() as i32).unwrap();
            for &f in freqs {
                out.write_f32::<LittleEndian>(f).unwrap();
            }
        };
        match &self.content {
            ContentSpec::Ir {
                samplerate,
                filter_length,
            } => {
                out.write_f32::<LittleEndian>(*samplerate).unwrap();
                out.write_i32::<LittleEndian>(*filter_length as i32).unwrap();
            }
            ContentSpec::Ms {
                max_magnitude,
                frequencies,
            }
            | ContentSpec::Mps {
                max_magnitude,
                frequencies,
            } => {
                out.write_f32::<LittleEndian>(*max_magnitude).unwrap();
                write_freqs(&mut out, frequencies);
            }
            ContentSpec::Ps { frequencies } => write_freqs(&mut out, frequencies),
            ContentSpec::Dft {
                num_coeffs,
                transform_size,
                samplerate,
                max_magnitude,
            } => {
                out.write_i32::<LittleEndian>(*num_coeffs as i32).unwrap();
                out.write_i32::<LittleEndian>(*transform_size as i32).unwrap();
                out.write_f32::<LittleEndian>(*samplerate).unwrap();
                out.write_f32::<LittleEndian>(*max_magnitude).unwrap();
            }
        }
        out
    }

    fn records_and_data(&self) -> (Vec<u8>, Vec<u8>) {
        let is_ir = matches!(self.content, ContentSpec::Ir { .. });
        let values = self.content.values_per_channel();
        let (lead, count) = match (is_ir, self.ir_window) {
            (true, Some(window)) => window,
            _ => (0, values),
        };

        let mut descriptors = Vec::new();
        let mut data = Vec::new();
        for record in 0..self.num_records() {
            let meta = self
                .record_metadata
                .iter()
                .find(|(r, _)| *r == record)
                .map_or(-1, |(_, index)| *index);
            descriptors.write_i32::<LittleEndian>(meta).unwrap();

            for channel in 0..self.channels {
                let mut offset = data.len() as u64;
                if record == 0 && channel == 0 {
                    offset = self.corrupt_offset.unwrap_or(offset);
                }
                if is_ir {
                    descriptors.write_i32::<LittleEndian>(lead as i32).unwrap();
                    descriptors.write_i32::<LittleEndian>(count as i32).unwrap();
                }
                descriptors.write_f32::<LittleEndian>(self.scaling).unwrap();
                descriptors.write_u64::<LittleEndian>(offset).unwrap();

                for i in lead..lead + count {
                    let raw = Self::raw_sample(record, channel, i);
                    match self.quantization {
                        0 => data.write_i16::<LittleEndian>(raw as i16).unwrap(),
                        1 => data.write_i24::<LittleEndian>(raw * 1000).unwrap(),
                        _ => data.write_f32::<LittleEndian>(raw as f32 / 1000.0).unwrap(),
                    }
                }
            }
        }
        (descriptors, data)
    }

    fn metadata_block(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.write_u32::<LittleEndian>(self.metadata_sets.len() as u32).unwrap();
        for set in &self.metadata_sets {
            out.write_u32::<LittleEndian>(set.len() as u32).unwrap();
            for (key, value) in set {
                let code = match value {
                    MetadataValue::Bool(_) => 0u8,
                    MetadataValue::Int(_) => 1,
                    MetadataValue::Float(_) => 2,
                    MetadataValue::String(_) => 3,
                };
                out.push(code);
                out.write_u16::<LittleEndian>(key.len() as u16).unwrap();
                out.extend_from_slice(key.as_bytes());
                match value {
                    MetadataValue::Bool(v) => out.push(u8::from(*v)),
                    MetadataValue::Int(v) => out.write_i32::<LittleEndian>(*v).unwrap(),
                    MetadataValue::Float(v) => out.write_f64::<LittleEndian>(*v).unwrap(),
                    MetadataValue::String(v) => {
                        out.write_u32::<LittleEndian>(v.len() as u32).unwrap();
                        out.extend_from_slice(v.as_bytes());
                    }
                }
            }
        }
        out
    }
}
