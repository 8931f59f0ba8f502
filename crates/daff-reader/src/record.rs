//! Record descriptors and payload de-quantization.

use byteorder::{ByteOrder, LittleEndian};

use crate::block::BlockReader;
use crate::error::{DaffError, Result};
use crate::header::ContentHeader;
use crate::types::Quantization;

/// Full scale of a signed 16-bit sample.
const INT16_SCALE: f32 = 32767.0;
/// Full scale of a signed 24-bit sample.
const INT24_SCALE: f32 = 8_388_607.0;

/// Where one channel's payload lives in the data block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct ChannelDescriptor {
    /// Output position of the first stored value (IR only, zero otherwise).
    pub leading_zeros: usize,
    /// Number of stored values.
    pub element_count: usize,
    pub scaling: f32,
    /// Byte offset relative to the data block.
    pub offset: usize,
}

/// Per-record metadata indices and per-channel descriptors.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RecordTable {
    num_channels: usize,
    metadata: Vec<Option<usize>>,
    channels: Vec<ChannelDescriptor>,
}

impl RecordTable {
    pub(crate) fn len(&self) -> usize {
        self.metadata.len()
    }

    pub(crate) fn metadata_index(&self, record: usize) -> Option<usize> {
        self.metadata.get(record).copied().flatten()
    }

    pub(crate) fn metadata_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.metadata.iter().filter_map(|index| *index)
    }

    pub(crate) fn channel(&self, record: usize, channel: usize) -> Option<&ChannelDescriptor> {
        if channel >= self.num_channels {
            return None;
        }
        self.channels.get(record * self.num_channels + channel)
    }

    pub(crate) fn channels(&self) -> &[ChannelDescriptor] {
        &self.channels
    }
}

/// Layout facts the record table is validated against.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RecordLayout<'h> {
    pub num_records: usize,
    pub num_channels: usize,
    pub quantization: Quantization,
    pub content: &'h ContentHeader,
    pub data_len: usize,
}

pub(crate) fn read_record_table(buf: &[u8], layout: RecordLayout<'_>) -> Result<RecordTable> {
    let mut r = BlockReader::new("record descriptor block", buf);
    let is_ir = matches!(layout.content, ContentHeader::Ir { .. });
    let descriptor_size = if is_ir { 20 } else { 12 };

    let needed = layout
        .num_channels
        .checked_mul(descriptor_size)
        .and_then(|per_record| per_record.checked_add(4))
        .and_then(|per_record| per_record.checked_mul(layout.num_records));
    if needed.is_none_or(|needed| needed > buf.len()) {
        return Err(DaffError::Truncated { block: r.name() });
    }

    let mut metadata = Vec::with_capacity(layout.num_records);
    let mut channels = Vec::with_capacity(layout.num_records * layout.num_channels);

    for record in 0..layout.num_records {
        metadata.push(r.read_optional_index("record metadata index")?);
        for channel in 0..layout.num_channels {
            let descriptor = if is_ir {
                read_ir_descriptor(&mut r, layout.content.shape_parameter())?
            } else {
                let scaling = r.read_f32()?;
                let offset = read_offset(&mut r)?;
                ChannelDescriptor {
                    leading_zeros: 0,
                    element_count: layout.content.values_per_channel(),
                    scaling,
                    offset,
                }
            };
            check_payload(&descriptor, layout.quantization, layout.data_len).map_err(|reason| {
                DaffError::format(format!("record {record} channel {channel}: {reason}"))
            })?;
            channels.push(descriptor);
        }
    }

    tracing::debug!(
        records = layout.num_records,
        channels = layout.num_channels,
        "parsed record descriptors"
    );
    Ok(RecordTable {
        num_channels: layout.num_channels,
        metadata,
        channels,
    })
}

fn read_ir_descriptor(r: &mut BlockReader<'_>, filter_length: usize) -> Result<ChannelDescriptor> {
    let leading_zeros = r.read_i32()?;
    let element_count = r.read_i32()?;
    let scaling = r.read_f32()?;
    let offset = read_offset(r)?;

    let (Ok(leading_zeros), Ok(element_count)) =
        (usize::try_from(leading_zeros), usize::try_from(element_count))
    else {
        return Err(DaffError::format(format!(
            "negative filter window ({leading_zeros}, {element_count})"
        )));
    };
    if leading_zeros + element_count > filter_length {
        return Err(DaffError::format(format!(
            "filter window {leading_zeros}+{element_count} exceeds filter length {filter_length}"
        )));
    }
    Ok(ChannelDescriptor {
        leading_zeros,
        element_count,
        scaling,
        offset,
    })
}

fn read_offset(r: &mut BlockReader<'_>) -> Result<usize> {
    let offset = r.read_u64()?;
    usize::try_from(offset).map_err(|_| DaffError::format(format!("data offset {offset} too large")))
}

fn check_payload(
    descriptor: &ChannelDescriptor,
    quantization: Quantization,
    data_len: usize,
) -> std::result::Result<(), String> {
    if !descriptor.scaling.is_finite() {
        return Err(format!("scaling factor {} is not finite", descriptor.scaling));
    }
    let end = descriptor
        .element_count
        .checked_mul(quantization.element_size())
        .and_then(|size| size.checked_add(descriptor.offset));
    match end {
        Some(end) if end <= data_len => Ok(()),
        _ => Err(format!(
            "payload at offset {} with {} elements lies outside the data block ({data_len} bytes)",
            descriptor.offset, descriptor.element_count
        )),
    }
}

/// Decode one channel payload into `out`.
///
/// `out` must hold exactly the channel's output length; positions outside
/// the stored window are zero-filled.
pub(crate) fn decode_channel(
    data: &[u8],
    quantization: Quantization,
    descriptor: &ChannelDescriptor,
    out: &mut [f32],
) {
    out.fill(0.0);
    let size = quantization.element_size();
    let start = descriptor.offset;
    let end = start + descriptor.element_count * size;
    let window = &mut out[descriptor.leading_zeros..descriptor.leading_zeros + descriptor.element_count];
    dequantize(quantization, descriptor.scaling, &data[start..end], window);
}

/// Convert raw little-endian samples to scaled floats.
pub(crate) fn dequantize(quantization: Quantization, scaling: f32, raw: &[u8], out: &mut [f32]) {
    let size = quantization.element_size();
    debug_assert_eq!(raw.len(), out.len() * size);
    for (value, bytes) in out.iter_mut().zip(raw.chunks_exact(size)) {
        *value = match quantization {
            Quantization::Int16 => f32::from(LittleEndian::read_i16(bytes)) / INT16_SCALE * scaling,
            Quantization::Int24 => LittleEndian::read_i24(bytes) as f32 / INT24_SCALE * scaling,
            Quantization::Float32 => LittleEndian::read_f32(bytes) * scaling,
        };
    }
}
