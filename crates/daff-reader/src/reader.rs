//! Opened DAFF files and the reader facade.

use std::ops::Range;
use std::path::{Path, PathBuf};

use daff_core::{Direction, Orientation, SphericalGrid, View, ViewTransform};

use crate::block::{read_block_table, read_file_header};
use crate::content::{
    Content, DaffContent, DftContent, IrContent, MpsContent, MsContent, NearestNeighbour,
    PsContent,
};
use crate::error::{DaffError, Result};
use crate::header::{ContentHeader, read_content_header, read_main_header};
use crate::metadata::{self, Metadata, read_metadata_block};
use crate::options::ReaderOptions;
use crate::properties::Properties;
use crate::record::{ChannelDescriptor, RecordLayout, RecordTable, decode_channel, read_record_table};
use crate::summary::PropertySummary;
use crate::types::ContentType;

/// One fully parsed DAFF file.
///
/// Opening reads the whole file into memory and validates every block
/// before a `DaffFile` is returned; there is no partially opened state.
/// All reads take `&self`, so one file can be shared between threads.
#[derive(Debug, Clone)]
pub struct DaffFile {
    filename: Option<PathBuf>,
    version: i32,
    properties: Properties,
    content: ContentHeader,
    records: RecordTable,
    grid: SphericalGrid,
    transform: ViewTransform,
    metadata: Vec<Metadata>,
    global_metadata: Option<usize>,
    bytes: Vec<u8>,
    data: Range<usize>,
}

impl DaffFile {
    /// Open and parse the file at `path` with default options.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with(path, &ReaderOptions::default())
    }

    /// Open and parse the file at `path`.
    ///
    /// # Errors
    ///
    /// [`DaffError::Io`] if the file cannot be read, [`DaffError::Format`]
    /// if it exceeds `options.max_file_size` or is malformed,
    /// [`DaffError::UnsupportedVersion`] and [`DaffError::Truncated`] as
    /// described on [`DaffError`].
    pub fn open_with(path: impl AsRef<Path>, options: &ReaderOptions) -> Result<Self> {
        let path = path.as_ref();
        tracing::info!("Opening DAFF file: {}", path.display());

        let size = std::fs::metadata(path)
            .map_err(|e| DaffError::io(path, e))?
            .len();
        check_size(size, options)?;
        let bytes = std::fs::read(path).map_err(|e| DaffError::io(path, e))?;
        Self::parse(bytes, Some(path.to_path_buf()), options)
    }

    /// Parse a file held in memory with default options.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Result<Self> {
        Self::from_bytes_with(bytes, &ReaderOptions::default())
    }

    /// Parse a file held in memory.
    pub fn from_bytes_with(bytes: impl Into<Vec<u8>>, options: &ReaderOptions) -> Result<Self> {
        let bytes = bytes.into();
        check_size(bytes.len() as u64, options)?;
        Self::parse(bytes, None, options)
    }

    fn parse(bytes: Vec<u8>, filename: Option<PathBuf>, options: &ReaderOptions) -> Result<Self> {
        let version = read_file_header(&bytes)?;
        let blocks = read_block_table(&bytes)?;

        let main = read_main_header(&bytes[blocks.main_header.clone()])?;
        tracing::debug!(
            content = main.content_type.short_name(),
            quantization = main.quantization.short_name(),
            channels = main.num_channels,
            records = main.num_records,
            "parsed main header"
        );

        // every record needs at least its 4-byte metadata index in block 3
        let max_records = blocks.record_descriptors.len() / 4;
        if main.num_records > max_records {
            return Err(DaffError::Truncated {
                block: "record descriptor block",
            });
        }
        // every beta row holds at least one record
        if main.grid.beta_points as usize > main.num_records {
            return Err(DaffError::format(format!(
                "{} beta points cannot fit in {} records",
                main.grid.beta_points, main.num_records
            )));
        }

        let grid = SphericalGrid::new(main.grid)
            .map_err(|e| DaffError::format(format!("invalid sampling grid: {e}")))?;
        if grid.num_records() != main.num_records {
            tracing::warn!(
                declared = main.num_records,
                grid = grid.num_records(),
                "record count does not match sampling grid"
            );
            return Err(DaffError::format(format!(
                "file declares {} records but its grid holds {}",
                main.num_records,
                grid.num_records()
            )));
        }

        let content = read_content_header(main.content_type, &bytes[blocks.content_header.clone()])?;
        let records = read_record_table(
            &bytes[blocks.record_descriptors.clone()],
            RecordLayout {
                num_records: main.num_records,
                num_channels: main.num_channels,
                quantization: main.quantization,
                content: &content,
                data_len: blocks.data.len(),
            },
        )?;

        let metadata = match &blocks.metadata {
            Some(range) => read_metadata_block(&bytes[range.clone()])?,
            None => Vec::new(),
        };
        let bad_index = main
            .metadata_index
            .into_iter()
            .chain(records.metadata_indices())
            .find(|&index| index >= metadata.len());
        if let Some(index) = bad_index {
            return Err(DaffError::format(format!(
                "metadata index {index} out of range ({} sets)",
                metadata.len()
            )));
        }

        let properties = Properties::new(&main, &grid);
        let mut file = Self {
            filename,
            version,
            properties,
            content,
            records,
            grid,
            transform: ViewTransform::new(main.orientation),
            metadata,
            global_metadata: main.metadata_index,
            data: blocks.data,
            bytes,
        };
        if let Some(orientation) = options.orientation {
            file.set_orientation(orientation.into())?;
        }

        tracing::info!(
            version,
            content = main.content_type.short_name(),
            records = main.num_records,
            channels = main.num_channels,
            "Opened DAFF file"
        );
        Ok(file)
    }

    /// Path the file was opened from, `None` for in-memory files.
    pub fn filename(&self) -> Option<&Path> {
        self.filename.as_deref()
    }

    /// File format version from the header.
    pub fn file_format_version(&self) -> i32 {
        self.version
    }

    /// Global properties.
    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    /// Global metadata; an empty set if the file has none.
    pub fn metadata(&self) -> &Metadata {
        self.global_metadata
            .and_then(|index| self.metadata.get(index))
            .unwrap_or(&metadata::EMPTY)
    }

    /// Metadata attached to `record`, if any.
    pub fn record_metadata(&self, record: usize) -> Result<Option<&Metadata>> {
        self.check_record(record)?;
        Ok(self
            .records
            .metadata_index(record)
            .and_then(|index| self.metadata.get(index)))
    }

    /// Replace the orientation used for object-view queries.
    pub fn set_orientation(&mut self, orientation: Orientation) -> Result<()> {
        if !orientation.is_finite() {
            return Err(DaffError::InvalidOrientation {
                yaw: orientation.yaw,
                pitch: orientation.pitch,
                roll: orientation.roll,
            });
        }
        tracing::debug!(
            yaw = orientation.yaw,
            pitch = orientation.pitch,
            roll = orientation.roll,
            "orientation changed"
        );
        self.transform = ViewTransform::new(orientation);
        self.properties.set_orientation(orientation);
        Ok(())
    }

    /// Restore the orientation stored in the file.
    pub fn reset_orientation(&mut self) {
        let default = self.properties.default_orientation();
        self.transform = ViewTransform::new(default);
        self.properties.set_orientation(default);
    }

    /// View over the file's content.
    pub fn content(&self) -> Content<'_> {
        Content::new(self)
    }

    /// Impulse response view.
    pub fn ir(&self) -> Result<IrContent<'_>> {
        match self.content() {
            Content::Ir(view) => Ok(view),
            other => Err(wrong_type(ContentType::ImpulseResponse, &other)),
        }
    }

    /// Magnitude spectrum view.
    pub fn ms(&self) -> Result<MsContent<'_>> {
        match self.content() {
            Content::Ms(view) => Ok(view),
            other => Err(wrong_type(ContentType::MagnitudeSpectrum, &other)),
        }
    }

    /// Phase spectrum view.
    pub fn ps(&self) -> Result<PsContent<'_>> {
        match self.content() {
            Content::Ps(view) => Ok(view),
            other => Err(wrong_type(ContentType::PhaseSpectrum, &other)),
        }
    }

    /// Magnitude-phase spectrum view.
    pub fn mps(&self) -> Result<MpsContent<'_>> {
        match self.content() {
            Content::Mps(view) => Ok(view),
            other => Err(wrong_type(ContentType::MagnitudePhaseSpectrum, &other)),
        }
    }

    /// DFT coefficient view.
    pub fn dft(&self) -> Result<DftContent<'_>> {
        match self.content() {
            Content::Dft(view) => Ok(view),
            other => Err(wrong_type(ContentType::DftSpectrum, &other)),
        }
    }

    /// Binding-style property summary.
    pub fn summary(&self) -> PropertySummary {
        PropertySummary::new(self)
    }

    pub(crate) fn content_header(&self) -> &ContentHeader {
        &self.content
    }

    pub(crate) fn records(&self) -> &RecordTable {
        &self.records
    }

    pub(crate) fn nearest_neighbour(&self, view: View, angle1: f64, angle2: f64) -> NearestNeighbour {
        let direction = match view {
            View::Data => Direction::from_data_view(angle1, angle2),
            View::Object => self
                .transform
                .object_to_data_direction(Direction::from_object_view(angle1, angle2)),
        };
        self.grid.nearest_direction(direction)
    }

    pub(crate) fn record_coords(&self, record: usize, view: View) -> Result<(f64, f64)> {
        let (alpha, beta) = self
            .grid
            .record_direction(record)
            .ok_or_else(|| self.record_out_of_range(record))?;
        Ok(match view {
            View::Data => (alpha, beta),
            View::Object => self.transform.data_to_object(alpha, beta),
        })
    }

    pub(crate) fn channel_descriptor(&self, record: usize, channel: usize) -> Result<&ChannelDescriptor> {
        self.check_record(record)?;
        let count = self.properties.num_channels();
        if channel >= count {
            return Err(DaffError::IndexOutOfRange {
                what: "channel",
                index: channel,
                count,
            });
        }
        self.records
            .channel(record, channel)
            .ok_or_else(|| self.record_out_of_range(record))
    }

    pub(crate) fn read_channel(&self, record: usize, channel: usize, out: &mut [f32]) -> Result<()> {
        let descriptor = self.channel_descriptor(record, channel)?;
        let expected = self.content.values_per_channel();
        if out.len() != expected {
            return Err(DaffError::BufferLength {
                expected,
                actual: out.len(),
            });
        }
        decode_channel(
            &self.bytes[self.data.clone()],
            self.properties.quantization(),
            descriptor,
            out,
        );
        Ok(())
    }

    fn check_record(&self, record: usize) -> Result<()> {
        if record >= self.records.len() {
            return Err(self.record_out_of_range(record));
        }
        Ok(())
    }

    fn record_out_of_range(&self, record: usize) -> DaffError {
        DaffError::IndexOutOfRange {
            what: "record",
            index: record,
            count: self.records.len(),
        }
    }
}

fn check_size(size: u64, options: &ReaderOptions) -> Result<()> {
    if size > options.max_file_size {
        return Err(DaffError::format(format!(
            "file size {size} exceeds limit of {} bytes",
            options.max_file_size
        )));
    }
    Ok(())
}

fn wrong_type(requested: ContentType, actual: &Content<'_>) -> DaffError {
    DaffError::WrongContentType {
        requested,
        actual: actual.content_type(),
    }
}

/// Holds at most one open [`DaffFile`].
///
/// Mirrors the open/close lifecycle that bindings expose: opening replaces
/// any previous file, a failed open leaves the reader closed and keeps the
/// error message for [`DaffReader::last_error`].
///
/// ```rust,no_run
/// use daff_reader::{DaffContent, DaffReader, View};
///
/// let mut reader = DaffReader::new();
/// if reader.open("directivity.daff").is_err() {
///     eprintln!("open failed: {}", reader.last_error().unwrap_or_default());
///     return;
/// }
/// let content = reader.content().unwrap();
/// let hit = content.nearest_neighbour(View::Object, 0.0, 0.0);
/// println!("frontal record: {}", hit.record);
/// reader.close();
/// ```
#[derive(Debug, Default)]
pub struct DaffReader {
    file: Option<DaffFile>,
    last_error: Option<String>,
}

impl DaffReader {
    /// A reader with no open file.
    pub fn new() -> Self {
        Self::default()
    }

    /// Open `path`, closing any file opened before.
    pub fn open(&mut self, path: impl AsRef<Path>) -> Result<()> {
        self.open_with(path, &ReaderOptions::default())
    }

    /// Open `path` with options, closing any file opened before.
    pub fn open_with(&mut self, path: impl AsRef<Path>, options: &ReaderOptions) -> Result<()> {
        self.close();
        let result = DaffFile::open_with(path, options);
        self.accept(result)
    }

    /// Open an in-memory file, closing any file opened before.
    pub fn open_bytes(&mut self, bytes: impl Into<Vec<u8>>) -> Result<()> {
        self.close();
        let result = DaffFile::from_bytes(bytes);
        self.accept(result)
    }

    fn accept(&mut self, result: Result<DaffFile>) -> Result<()> {
        match result {
            Ok(file) => {
                self.file = Some(file);
                self.last_error = None;
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to open DAFF file");
                self.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Close the open file, if any.
    pub fn close(&mut self) {
        if let Some(file) = self.file.take() {
            tracing::debug!(filename = ?file.filename(), "closed DAFF file");
        }
    }

    /// `true` while a file is open.
    pub fn is_open(&self) -> bool {
        self.file.is_some()
    }

    /// Message of the most recent failed open, cleared by a successful one.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// The open file.
    pub fn file(&self) -> Result<&DaffFile> {
        self.file.as_ref().ok_or(DaffError::NotOpen)
    }

    /// The open file, mutably (for orientation changes).
    pub fn file_mut(&mut self) -> Result<&mut DaffFile> {
        self.file.as_mut().ok_or(DaffError::NotOpen)
    }

    /// Content view of the open file.
    pub fn content(&self) -> Result<Content<'_>> {
        Ok(self.file()?.content())
    }

    /// Impulse response view of the open file.
    pub fn content_ir(&self) -> Result<IrContent<'_>> {
        self.file()?.ir()
    }

    /// Magnitude spectrum view of the open file.
    pub fn content_ms(&self) -> Result<MsContent<'_>> {
        self.file()?.ms()
    }

    /// Phase spectrum view of the open file.
    pub fn content_ps(&self) -> Result<PsContent<'_>> {
        self.file()?.ps()
    }

    /// Magnitude-phase spectrum view of the open file.
    pub fn content_mps(&self) -> Result<MpsContent<'_>> {
        self.file()?.mps()
    }

    /// DFT coefficient view of the open file.
    pub fn content_dft(&self) -> Result<DftContent<'_>> {
        self.file()?.dft()
    }
}
