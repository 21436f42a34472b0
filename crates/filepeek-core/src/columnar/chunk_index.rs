//! Flat, immutable view over a Parquet footer.
//!
//! The index is built once from the file's metadata and never touches row
//! data. Chunk (row group) and column descriptors live in flat vectors; the
//! per-(chunk, column) statistics are stored chunk-major in a single vector
//! and addressed by integer offset.

use parquet::basic::{Compression, LogicalType};
use parquet::errors::ParquetError;
use parquet::file::metadata::{ColumnChunkMetaData, ParquetMetaData};
use parquet::file::reader::FileReader as _;

use crate::columnar::open_parquet;
use crate::error::{ReaderError, ReaderResult};
use crate::format::FileHandle;
use crate::normalize::{BoundOrder, stat_bounds};
use crate::value::Value;

/// Codec name reported for uncompressed chunks.
pub const UNCOMPRESSED: &str = "UNCOMPRESSED";

/// One physical chunk (row group), positioned in row space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkDescriptor {
    /// Position of the chunk in the file.
    pub index: u32,
    /// Rows stored in this chunk.
    pub row_count: u64,
    /// Sum of `row_count` over all preceding chunks.
    pub cumulative_row_offset: u64,
}

impl ChunkDescriptor {
    /// One past the last file-level row held by this chunk.
    pub fn end_row(&self) -> u64 {
        self.cumulative_row_offset + self.row_count
    }
}

/// One leaf column of the file schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescriptor {
    /// Dotted column path, unique within the file.
    pub name: String,
    /// Stored primitive type, e.g. `INT64`.
    pub physical_type: String,
    /// Logical annotation, if any.
    pub logical_type: Option<String>,
    pub(crate) bound_order: BoundOrder,
}

/// One top-level field of the file schema; row records are keyed by these.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RowField {
    pub(crate) name: String,
    /// Annotation of a primitive field; `None` for groups.
    pub(crate) logical_type: Option<LogicalType>,
}

/// Statistics of one column within one chunk, read from metadata only.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnChunkStats {
    /// Nulls recorded for the chunk; 0 when the writer did not record any.
    pub null_count: u64,
    /// Compressed bytes of the column chunk.
    pub compressed_size: u64,
    /// Codec name, e.g. `SNAPPY`, or [`UNCOMPRESSED`].
    pub compression_codec: String,
    /// Minimum value, if recorded and representable.
    pub min: Option<Value>,
    /// Maximum value, if recorded and representable.
    pub max: Option<Value>,
}

/// Read-only metadata index of a columnar file.
#[derive(Debug, Clone)]
pub struct ChunkIndex {
    total_rows: u64,
    fields: Vec<RowField>,
    columns: Vec<ColumnDescriptor>,
    chunks: Vec<ChunkDescriptor>,
    stats: Vec<ColumnChunkStats>,
}

impl ChunkIndex {
    /// Read the footer of `handle` and index it.
    ///
    /// Fails with `NotColumnar` for non-columnar handles and with
    /// `CorruptMetadata` when the footer cannot be parsed.
    pub fn build(handle: &FileHandle) -> ReaderResult<Self> {
        let reader = open_parquet(handle)?;
        Self::from_metadata(handle.display(), reader.metadata())
    }

    pub(crate) fn from_metadata(path: &str, meta: &ParquetMetaData) -> ReaderResult<Self> {
        let file_meta = meta.file_metadata();
        let schema = file_meta.schema_descr();

        let columns: Vec<ColumnDescriptor> = schema
            .columns()
            .iter()
            .map(|c| ColumnDescriptor {
                name: c.path().string(),
                physical_type: format!("{:?}", c.physical_type()),
                logical_type: c.logical_type_ref().map(|l| format!("{l:?}")),
                bound_order: BoundOrder::of(c.logical_type_ref()),
            })
            .collect();

        let fields = schema
            .root_schema()
            .get_fields()
            .iter()
            .map(|f| RowField {
                name: f.name().to_string(),
                logical_type: f
                    .is_primitive()
                    .then(|| f.get_basic_info().logical_type_ref().cloned())
                    .flatten(),
            })
            .collect();

        let mut chunks = Vec::with_capacity(meta.num_row_groups());
        let mut stats = Vec::with_capacity(meta.num_row_groups() * columns.len());
        let mut offset = 0u64;

        for (i, rg) in meta.row_groups().iter().enumerate() {
            let row_count = u64::try_from(rg.num_rows())
                .map_err(|_| corrupt(path, format!("row group {i} has negative row count")))?;
            let index = u32::try_from(i)
                .map_err(|_| corrupt(path, format!("row group index {i} out of range")))?;

            if rg.num_columns() != columns.len() {
                return Err(corrupt(
                    path,
                    format!(
                        "row group {i} has {} columns, schema has {}",
                        rg.num_columns(),
                        columns.len()
                    ),
                ));
            }

            chunks.push(ChunkDescriptor {
                index,
                row_count,
                cumulative_row_offset: offset,
            });
            offset += row_count;

            stats.extend(rg.columns().iter().map(chunk_stats));
        }

        let declared = u64::try_from(file_meta.num_rows())
            .map_err(|_| corrupt(path, "negative total row count".to_string()))?;
        if declared != offset {
            return Err(corrupt(
                path,
                format!("footer declares {declared} rows but row groups hold {offset}"),
            ));
        }

        Ok(Self {
            total_rows: offset,
            fields,
            columns,
            chunks,
            stats,
        })
    }

    /// Total rows over all chunks.
    pub fn total_rows(&self) -> u64 {
        self.total_rows
    }

    /// Top-level field names in schema order. Row records carry exactly
    /// these keys; for flat schemas they equal the leaf column names.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    pub(crate) fn fields(&self) -> &[RowField] {
        &self.fields
    }

    /// Leaf columns in schema order.
    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    /// Chunks in file order.
    pub fn chunks(&self) -> &[ChunkDescriptor] {
        &self.chunks
    }

    /// Statistics of `column` within `chunk`.
    pub fn chunk_stats(&self, chunk: usize, column: usize) -> Option<&ColumnChunkStats> {
        if chunk >= self.chunks.len() || column >= self.columns.len() {
            return None;
        }
        self.stats.get(chunk * self.columns.len() + column)
    }

    /// Position of the column named `name`.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }
}

fn chunk_stats(cc: &ColumnChunkMetaData) -> ColumnChunkStats {
    let (null_count, (min, max)) = match cc.statistics() {
        Some(s) => (
            s.null_count_opt().unwrap_or(0),
            stat_bounds(s, cc.column_descr()),
        ),
        None => (0, (None, None)),
    };

    ColumnChunkStats {
        null_count,
        compressed_size: u64::try_from(cc.compressed_size()).unwrap_or(0),
        compression_codec: codec_name(cc.compression()).to_string(),
        min,
        max,
    }
}

/// Canonical codec name, ignoring compression levels.
pub fn codec_name(codec: Compression) -> &'static str {
    match codec {
        Compression::UNCOMPRESSED => UNCOMPRESSED,
        Compression::SNAPPY => "SNAPPY",
        Compression::GZIP(_) => "GZIP",
        Compression::LZO => "LZO",
        Compression::BROTLI(_) => "BROTLI",
        Compression::LZ4 => "LZ4",
        Compression::ZSTD(_) => "ZSTD",
        Compression::LZ4_RAW => "LZ4_RAW",
        #[allow(unreachable_patterns)]
        _ => "UNKNOWN",
    }
}

fn corrupt(path: &str, detail: String) -> ReaderError {
    ReaderError::CorruptMetadata {
        path: path.to_string(),
        source: ParquetError::General(detail),
    }
}
