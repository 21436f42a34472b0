//! Columnar (Parquet) reading.
//!
//! - `chunk_index`: the footer view, built once per file.
//! - `slice`: planning and decoding of row ranges across chunks.
//! - `stats`: file-level column summaries folded from chunk metadata.

pub mod chunk_index;
pub mod slice;
pub mod stats;

use std::fs::File;

use log::{debug, warn};
use parquet::file::reader::{FileReader as _, SerializedFileReader};
use snafu::ResultExt;

use crate::config::ReaderOptions;
use crate::error::{CorruptMetadataSnafu, NotColumnarSnafu, ReaderResult, io_error};
use crate::format::{FileHandle, Format};
use crate::value::RowRecord;

pub use chunk_index::{ChunkDescriptor, ChunkIndex, ColumnChunkStats, ColumnDescriptor};
pub use slice::{ChunkSlice, plan_slice};
pub use stats::{ColumnStats, ColumnSummary, CompressionSummary, PartialStats};

/// Open the Parquet footer behind `handle`.
pub(crate) fn open_parquet(handle: &FileHandle) -> ReaderResult<SerializedFileReader<File>> {
    if handle.format() != Format::Columnar {
        return NotColumnarSnafu {
            path: handle.display(),
        }
        .fail();
    }

    let file = File::open(handle.path()).map_err(|e| io_error(handle.display(), e))?;
    SerializedFileReader::new(file).context(CorruptMetadataSnafu {
        path: handle.display(),
    })
}

/// An open Parquet file together with its chunk index.
pub struct ColumnarFile {
    handle: FileHandle,
    reader: SerializedFileReader<File>,
    index: ChunkIndex,
}

impl ColumnarFile {
    /// Parse the footer of `handle` and index its chunks.
    pub fn open(handle: FileHandle) -> ReaderResult<Self> {
        let reader = open_parquet(&handle)?;
        let index = ChunkIndex::from_metadata(handle.display(), reader.metadata())?;
        debug!(
            "opened columnar file {} rows={} chunks={} columns={}",
            handle.display(),
            index.total_rows(),
            index.chunks().len(),
            index.columns().len()
        );

        Ok(Self {
            handle,
            reader,
            index,
        })
    }

    /// The metadata index.
    pub fn index(&self) -> &ChunkIndex {
        &self.index
    }

    /// Rows `[start, start + count)`, in file order.
    pub fn read_slice(&self, start: u64, count: u64) -> ReaderResult<Vec<RowRecord>> {
        slice::read_slice(self.handle.display(), &self.reader, &self.index, start, count)
    }

    /// The first `n` rows.
    pub fn read_top(&self, n: u64) -> ReaderResult<Vec<RowRecord>> {
        self.read_slice(0, n)
    }

    /// Per-column summaries from metadata, plus sample values read from
    /// the first chunk.
    ///
    /// A failed sample read, or leaf columns that rows only carry inside a
    /// nested value, are reported through [`ColumnStats::partial`] rather
    /// than failing the call.
    pub fn column_stats(&self, options: &ReaderOptions) -> ColumnStats {
        let mut summaries = stats::summarize_columns(&self.index);

        let first_chunk_rows = self.index.chunks().first().map_or(0, |c| c.row_count);
        let sample_rows = options.sample_rows.min(first_chunk_rows);

        let partial = match self.read_slice(0, sample_rows) {
            Ok(rows) => {
                let unmatched = stats::attach_samples(&mut summaries, &rows, options.sample_values);
                (!unmatched.is_empty()).then(|| {
                    debug!(
                        "no row values for nested columns of {}: {unmatched:?}",
                        self.handle.display()
                    );
                    PartialStats {
                        reason: format!(
                            "sample values unavailable for nested columns: {}",
                            unmatched.join(", ")
                        ),
                    }
                })
            }
            Err(e) => {
                warn!(
                    "sample collection failed for {}, returning metadata-only stats: {e}",
                    self.handle.display()
                );
                Some(PartialStats {
                    reason: e.to_string(),
                })
            }
        };

        ColumnStats::new(summaries, partial)
    }

    /// Codec overview over every chunk.
    pub fn compression_summary(&self) -> CompressionSummary {
        stats::compression_summary(&self.index)
    }
}
