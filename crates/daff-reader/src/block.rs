//! File header, block table and the bounds-checked block cursor.
//!
//! A DAFF file starts with a 10-byte header (signature `FW`, format
//! version, block count) followed by a table of `(id, offset, size)`
//! entries. Every other structure lives in one of the listed blocks.

use std::ops::Range;

use byteorder::{ByteOrder, LittleEndian};

use crate::error::{DaffError, Result};

/// File signature.
pub const SIGNATURE: [u8; 2] = *b"FW";

/// The file format version this reader understands.
pub const SUPPORTED_VERSION: i32 = 170;

/// Upper bound on block table entries.
pub(crate) const MAX_BLOCKS: usize = 64;

const FILE_HEADER_SIZE: usize = 10;
const BLOCK_ENTRY_SIZE: usize = 20;

/// Block identifiers used in the block table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BlockId {
    MainHeader,
    ContentHeader,
    RecordDescriptors,
    Data,
    Metadata,
}

impl BlockId {
    fn from_code(code: i32) -> Option<Self> {
        match code {
            1 => Some(BlockId::MainHeader),
            2 => Some(BlockId::ContentHeader),
            3 => Some(BlockId::RecordDescriptors),
            4 => Some(BlockId::Data),
            5 => Some(BlockId::Metadata),
            _ => None,
        }
    }

    pub(crate) fn name(self) -> &'static str {
        match self {
            BlockId::MainHeader => "main header",
            BlockId::ContentHeader => "content header",
            BlockId::RecordDescriptors => "record descriptor block",
            BlockId::Data => "data block",
            BlockId::Metadata => "metadata block",
        }
    }
}

/// Byte ranges of the blocks inside the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct BlockTable {
    pub main_header: Range<usize>,
    pub content_header: Range<usize>,
    pub record_descriptors: Range<usize>,
    pub data: Range<usize>,
    pub metadata: Option<Range<usize>>,
}

/// Validate the file header and return the format version.
pub(crate) fn read_file_header(bytes: &[u8]) -> Result<i32> {
    let mut r = BlockReader::new("file header", bytes);
    let signature = r.take(2)?;
    if signature != SIGNATURE {
        return Err(DaffError::format(format!(
            "bad signature {signature:02x?}, expected \"FW\""
        )));
    }
    let version = r.read_i32()?;
    if version != SUPPORTED_VERSION {
        return Err(DaffError::UnsupportedVersion {
            found: version,
            supported: SUPPORTED_VERSION,
        });
    }
    Ok(version)
}

/// Parse the block table following the file header.
pub(crate) fn read_block_table(bytes: &[u8]) -> Result<BlockTable> {
    let header = bytes.get(..FILE_HEADER_SIZE).ok_or(DaffError::Truncated {
        block: "file header",
    })?;
    let count = LittleEndian::read_i32(&header[6..]);
    let count = usize::try_from(count)
        .ok()
        .filter(|&n| n <= MAX_BLOCKS)
        .ok_or_else(|| DaffError::format(format!("invalid block count {count}")))?;

    let table_end = FILE_HEADER_SIZE + count * BLOCK_ENTRY_SIZE;
    let table = bytes
        .get(FILE_HEADER_SIZE..table_end)
        .ok_or(DaffError::Truncated {
            block: "block table",
        })?;

    let mut slots: [Option<Range<usize>>; 5] = Default::default();
    let mut r = BlockReader::new("block table", table);
    for _ in 0..count {
        let code = r.read_i32()?;
        let offset = r.read_u64()?;
        let size = r.read_u64()?;

        let Some(id) = BlockId::from_code(code) else {
            tracing::warn!(id = code, offset, size, "skipping unknown DAFF block");
            continue;
        };
        let range = block_range(id, offset, size, bytes.len())?;
        let slot = &mut slots[code as usize - 1];
        if slot.is_some() {
            return Err(DaffError::format(format!("duplicate {}", id.name())));
        }
        tracing::debug!(block = id.name(), offset, size, "found block");
        *slot = Some(range);
    }

    let [main, content, records, data, metadata] = slots;
    let require = |slot: Option<Range<usize>>, id: BlockId| {
        slot.ok_or_else(|| DaffError::format(format!("missing {}", id.name())))
    };
    Ok(BlockTable {
        main_header: require(main, BlockId::MainHeader)?,
        content_header: require(content, BlockId::ContentHeader)?,
        record_descriptors: require(records, BlockId::RecordDescriptors)?,
        data: require(data, BlockId::Data)?,
        metadata,
    })
}

fn block_range(id: BlockId, offset: u64, size: u64, file_len: usize) -> Result<Range<usize>> {
    let end = offset.checked_add(size).ok_or_else(|| {
        DaffError::format(format!("{} offset {offset} + size {size} overflows", id.name()))
    })?;
    if end > file_len as u64 {
        return Err(DaffError::Truncated { block: id.name() });
    }
    // end fits in usize because it is bounded by the file length
    Ok(offset as usize..end as usize)
}

/// Little-endian cursor over one block.
///
/// Every read is bounds-checked and reports [`DaffError::Truncated`] with
/// the block name instead of panicking.
#[derive(Debug, Clone)]
pub(crate) struct BlockReader<'a> {
    name: &'static str,
    buf: &'a [u8],
    pos: usize,
}

impl<'a> BlockReader<'a> {
    pub(crate) fn new(name: &'static str, buf: &'a [u8]) -> Self {
        Self { name, buf, pos: 0 }
    }

    pub(crate) fn name(&self) -> &'static str {
        self.name
    }

    pub(crate) fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub(crate) fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|&end| end <= self.buf.len())
            .ok_or(DaffError::Truncated { block: self.name })?;
        let bytes = &self.buf[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    pub(crate) fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    pub(crate) fn read_u16(&mut self) -> Result<u16> {
        Ok(LittleEndian::read_u16(self.take(2)?))
    }

    pub(crate) fn read_i32(&mut self) -> Result<i32> {
        Ok(LittleEndian::read_i32(self.take(4)?))
    }

    pub(crate) fn read_u32(&mut self) -> Result<u32> {
        Ok(LittleEndian::read_u32(self.take(4)?))
    }

    pub(crate) fn read_u64(&mut self) -> Result<u64> {
        Ok(LittleEndian::read_u64(self.take(8)?))
    }

    pub(crate) fn read_f32(&mut self) -> Result<f32> {
        Ok(LittleEndian::read_f32(self.take(4)?))
    }

    pub(crate) fn read_f64(&mut self) -> Result<f64> {
        Ok(LittleEndian::read_f64(self.take(8)?))
    }

    /// Read `n` little-endian `f32` values.
    pub(crate) fn read_f32_vec(&mut self, n: usize) -> Result<Vec<f32>> {
        let bytes = self.take(n.checked_mul(4).ok_or(DaffError::Truncated { block: self.name })?)?;
        let mut out = vec![0.0; n];
        LittleEndian::read_f32_into(bytes, &mut out);
        Ok(out)
    }

    /// Read a `u16`-length-prefixed UTF-8 string.
    pub(crate) fn read_string_u16(&mut self) -> Result<String> {
        let len = usize::from(self.read_u16()?);
        self.read_utf8(len)
    }

    /// Read a `u32`-length-prefixed UTF-8 string.
    pub(crate) fn read_string_u32(&mut self) -> Result<String> {
        let len = self.read_u32()? as usize;
        self.read_utf8(len)
    }

    fn read_utf8(&mut self, len: usize) -> Result<String> {
        let bytes = self.take(len)?;
        String::from_utf8(bytes.to_vec())
            .map_err(|_| DaffError::format(format!("invalid UTF-8 string in {}", self.name)))
    }

    /// Read an `i32` that must be at least one.
    pub(crate) fn read_count(&mut self, field: &str) -> Result<usize> {
        let value = self.read_i32()?;
        usize::try_from(value)
            .ok()
            .filter(|&n| n >= 1)
            .ok_or_else(|| DaffError::format(format!("{} has invalid {field} {value}", self.name)))
    }

    /// Read an `i32` index where `-1` means "none".
    pub(crate) fn read_optional_index(&mut self, field: &str) -> Result<Option<usize>> {
        match self.read_i32()? {
            -1 => Ok(None),
            value => usize::try_from(value).map(Some).map_err(|_| {
                DaffError::format(format!("{} has invalid {field} {value}", self.name))
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use byteorder::WriteBytesExt;

    fn header(version: i32, blocks: &[(i32, u64, u64)]) -> Vec<u8> {
        let mut out = b"FW".to_vec();
        out.write_i32::<LittleEndian>(version).unwrap();
        out.write_i32::<LittleEndian>(blocks.len() as i32).unwrap();
        for &(id, offset, size) in blocks {
            out.write_i32::<LittleEndian>(id).unwrap();
            out.write_u64::<LittleEndian>(offset).unwrap();
            out.write_u64::<LittleEndian>(size).unwrap();
        }
        out
    }

    fn required_blocks(len: u64) -> Vec<(i32, u64, u64)> {
        vec![(1, 0, len), (2, 0, len), (3, 0, len), (4, 0, len)]
    }

    #[test]
    fn accepts_supported_version() {
        let bytes = header(SUPPORTED_VERSION, &[]);
        assert_eq!(read_file_header(&bytes).unwrap(), 170);
    }

    #[test]
    fn rejects_bad_signature() {
        let mut bytes = header(SUPPORTED_VERSION, &[]);
        bytes[0] = b'X';
        assert!(matches!(read_file_header(&bytes), Err(DaffError::Format(_))));
    }

    #[test]
    fn rejects_other_versions() {
        for version in [169, 171] {
            let bytes = header(version, &[]);
            assert!(matches!(
                read_file_header(&bytes),
                Err(DaffError::UnsupportedVersion { found, supported: 170 }) if found == version
            ));
        }
    }

    #[test]
    fn short_header_is_truncated() {
        assert!(matches!(
            read_file_header(b"FW\x01"),
            Err(DaffError::Truncated { block: "file header" })
        ));
    }

    #[test]
    fn block_table_collects_ranges() {
        let mut blocks = required_blocks(4);
        blocks.push((5, 2, 2));
        blocks.push((42, 0, 1));
        let bytes = header(SUPPORTED_VERSION, &blocks);
        let table = read_block_table(&bytes).unwrap();
        assert_eq!(table.main_header, 0..4);
        assert_eq!(table.metadata, Some(2..4));
    }

    #[test]
    fn block_table_rejects_duplicates() {
        let mut blocks = required_blocks(4);
        blocks.push((2, 0, 4));
        let bytes = header(SUPPORTED_VERSION, &blocks);
        assert!(matches!(read_block_table(&bytes), Err(DaffError::Format(_))));
    }

    #[test]
    fn block_table_requires_data_block() {
        let blocks = vec![(1, 0, 4), (2, 0, 4), (3, 0, 4)];
        let bytes = header(SUPPORTED_VERSION, &blocks);
        let err = read_block_table(&bytes).unwrap_err();
        assert_eq!(err.to_string(), "invalid DAFF file: missing data block");
    }

    #[test]
    fn block_past_end_is_truncated() {
        let mut blocks = required_blocks(4);
        blocks[3] = (4, 50, 1000);
        let bytes = header(SUPPORTED_VERSION, &blocks);
        assert!(matches!(
            read_block_table(&bytes),
            Err(DaffError::Truncated { block: "data block" })
        ));
    }

    #[test]
    fn cursor_reports_block_name() {
        let mut r = BlockReader::new("content header", &[1, 0, 0]);
        assert!(matches!(
            r.read_i32(),
            Err(DaffError::Truncated { block: "content header" })
        ));
        assert_eq!(r.remaining(), 3);
        assert_eq!(r.read_u16().unwrap(), 1);
    }

    #[test]
    fn cursor_reads_strings_and_indices() {
        let mut bytes = Vec::new();
        bytes.write_u16::<LittleEndian>(4).unwrap();
        bytes.extend_from_slice(b"left");
        bytes.write_i32::<LittleEndian>(-1).unwrap();
        bytes.write_i32::<LittleEndian>(-7).unwrap();
        bytes.write_i32::<LittleEndian>(0).unwrap();

        let mut r = BlockReader::new("main header", &bytes);
        assert_eq!(r.read_string_u16().unwrap(), "left");
        assert_eq!(r.read_optional_index("metadata index").unwrap(), None);
        assert!(matches!(
            r.read_optional_index("metadata index"),
            Err(DaffError::Format(_))
        ));
        assert!(matches!(r.read_count("channel count"), Err(DaffError::Format(_))));
    }
}
