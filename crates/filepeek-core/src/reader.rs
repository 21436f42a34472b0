//! The format-independent entry point.
//!
//! [`FileReader`] classifies its path once and dispatches every operation to
//! the component for that format:
//!
//! | Format           | Component                                   |
//! |------------------|---------------------------------------------|
//! | `Columnar`       | [`ColumnarFile`] (chunk index, slice, stats) |
//! | `RecordOriented` | [`RecordReader`]                            |
//! | `LineText`       | [`LineReader`]                              |
//!
//! Row arguments are signed so that negative requests coming from an outer
//! request layer are rejected here, with `InvalidRange`, before any I/O.

use std::path::{Path, PathBuf};

use log::debug;
use serde::Serialize;

use crate::columnar::{ColumnStats, ColumnarFile, CompressionSummary};
use crate::config::ReaderOptions;
use crate::error::{InvalidRangeSnafu, ReaderResult};
use crate::format::{FileHandle, Format};
use crate::line::{CONTENT_COLUMN, LineReader};
use crate::record::RecordReader;
use crate::value::RowRecord;

/// Summary of a file, as returned by [`FileReader::info`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileInfo {
    /// `parquet`, `json` or `text`.
    pub file_type: String,
    /// Size on disk.
    pub file_size_bytes: u64,
    /// Logical rows (records, lines).
    pub total_rows: u64,
    /// Column names in row-record order.
    pub columns: Vec<String>,
    /// `columns.len()`.
    pub num_columns: usize,
    /// Physical chunks; 1 for formats without chunks.
    pub chunk_count: usize,
    /// Stored compression.
    pub compression: CompressionSummary,
}

enum Backend {
    Columnar(Box<ColumnarFile>),
    Records(RecordReader),
    Lines(LineReader),
}

/// Uniform read access to one Parquet, JSON or text file.
///
/// The format is fixed when the reader is opened. For Parquet files the
/// footer is parsed and indexed at that point; the other formats are read
/// on each call. Results are never cached between calls.
pub struct FileReader {
    path: PathBuf,
    format: Format,
    size_bytes: u64,
    options: ReaderOptions,
    backend: Backend,
}

impl FileReader {
    /// Open `path` with default [`ReaderOptions`].
    pub fn open(path: impl Into<PathBuf>) -> ReaderResult<Self> {
        Self::open_with_options(path, ReaderOptions::default())
    }

    /// Open `path`, detect its format and prepare the matching component.
    ///
    /// Fails with `NotFound` when the path is not a regular file and with
    /// `CorruptMetadata` when a Parquet footer cannot be read.
    pub fn open_with_options(path: impl Into<PathBuf>, options: ReaderOptions) -> ReaderResult<Self> {
        let handle = FileHandle::open(path)?;
        let path = handle.path().to_path_buf();
        let format = handle.format();
        let size_bytes = handle.size_bytes();
        debug!("opening {} as {format}", handle.display());

        let backend = match format {
            Format::Columnar => Backend::Columnar(Box::new(ColumnarFile::open(handle)?)),
            Format::RecordOriented => Backend::Records(RecordReader::new(handle)),
            Format::LineText => Backend::Lines(LineReader::new(handle)),
        };

        Ok(Self {
            path,
            format,
            size_bytes,
            options,
            backend,
        })
    }

    /// Path the reader was opened with.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Detected format.
    pub fn format(&self) -> Format {
        self.format
    }

    /// Options in effect.
    pub fn options(&self) -> &ReaderOptions {
        &self.options
    }

    /// Type, size, row and column counts, chunking and compression.
    pub fn info(&self) -> ReaderResult<FileInfo> {
        let (total_rows, columns, chunk_count, compression) = match &self.backend {
            Backend::Columnar(file) => {
                let index = file.index();
                (
                    index.total_rows(),
                    index.field_names().map(str::to_string).collect(),
                    index.chunks().len(),
                    file.compression_summary(),
                )
            }
            Backend::Records(records) => {
                let (rows, columns) = records.info()?;
                (rows, columns, 1, CompressionSummary::uncompressed())
            }
            Backend::Lines(lines) => (
                lines.count_lines()?,
                vec![CONTENT_COLUMN.to_string()],
                1,
                CompressionSummary::uncompressed(),
            ),
        };

        Ok(FileInfo {
            file_type: self.format.label().to_string(),
            file_size_bytes: self.size_bytes,
            total_rows,
            num_columns: columns.len(),
            columns,
            chunk_count,
            compression,
        })
    }

    /// The first `n` rows; same as `read_slice(0, n)`.
    pub fn read_top(&self, n: i64) -> ReaderResult<Vec<RowRecord>> {
        self.read_slice(0, n)
    }

    /// Rows `[start, start + count)` in file order.
    ///
    /// Returns fewer rows only when the file ends first, and an empty result
    /// when `start` is past the end.
    pub fn read_slice(&self, start: i64, count: i64) -> ReaderResult<Vec<RowRecord>> {
        let (Ok(start_row), Ok(row_count)) = (u64::try_from(start), u64::try_from(count)) else {
            return InvalidRangeSnafu { start, count }.fail();
        };

        match &self.backend {
            Backend::Columnar(file) => file.read_slice(start_row, row_count),
            Backend::Records(records) => records.read_slice(start_row, row_count),
            Backend::Lines(lines) => lines.read_slice(start_row, row_count),
        }
    }

    /// Per-column statistics from Parquet metadata.
    ///
    /// Empty for JSON and text files, which store no column metadata.
    pub fn column_stats(&self) -> ReaderResult<ColumnStats> {
        match &self.backend {
            Backend::Columnar(file) => Ok(file.column_stats(&self.options)),
            Backend::Records(_) | Backend::Lines(_) => Ok(ColumnStats::default()),
        }
    }
}
