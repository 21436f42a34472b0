//! Row-range reads across chunk boundaries.
//!
//! A request `[start, start + count)` is first planned against the chunk
//! index: the planner finds the first chunk whose row interval intersects
//! the request (binary search over cumulative offsets), then walks forward
//! computing the local sub-range of every intersecting chunk and stops as
//! soon as the requested count is covered. Only the planned chunks are
//! decoded, each streamed once and trimmed to its local range, and the
//! trimmed outputs are concatenated in chunk order, which is file row order.

use std::fs::File;

use log::debug;
use parquet::errors::ParquetError;
use parquet::file::reader::{FileReader as _, RowGroupReader as _, SerializedFileReader};
use parquet::record::Row;
use snafu::ResultExt;

use crate::columnar::chunk_index::{ChunkDescriptor, ChunkIndex, RowField};
use crate::error::{ReadChunkSnafu, ReaderError, ReaderResult};
use crate::normalize::column_value;
use crate::value::RowRecord;

/// The part of one chunk that a request needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkSlice {
    /// Chunk position in the file.
    pub chunk: usize,
    /// First needed row, relative to the chunk.
    pub local_start: u64,
    /// One past the last needed row, relative to the chunk.
    pub local_end: u64,
}

impl ChunkSlice {
    /// Rows taken from this chunk.
    pub fn len(&self) -> u64 {
        self.local_end - self.local_start
    }

    /// True when nothing is taken from this chunk.
    pub fn is_empty(&self) -> bool {
        self.local_end <= self.local_start
    }
}

/// Plan which chunks (and which rows of each) cover `[start, start + count)`.
///
/// Returns an empty plan for `count == 0` or `start >= total_rows`. Empty
/// chunks are never part of a plan.
pub fn plan_slice(
    chunks: &[ChunkDescriptor],
    total_rows: u64,
    start: u64,
    count: u64,
) -> Vec<ChunkSlice> {
    if count == 0 || start >= total_rows {
        return Vec::new();
    }

    let end = start.saturating_add(count).min(total_rows);
    let first = chunks.partition_point(|c| c.end_row() <= start);

    let mut plan = Vec::new();
    let mut planned = 0u64;
    for (i, c) in chunks.iter().enumerate().skip(first) {
        if planned >= count || c.cumulative_row_offset >= end {
            break;
        }

        let slice = ChunkSlice {
            chunk: i,
            local_start: start.saturating_sub(c.cumulative_row_offset),
            local_end: c.row_count.min(end - c.cumulative_row_offset),
        };
        if slice.is_empty() {
            continue;
        }
        planned += slice.len();
        plan.push(slice);
    }
    plan
}

/// Read rows `[start, start + count)` of the file behind `reader`.
///
/// Decodes only the chunks in the plan. A chunk yielding fewer rows than
/// its metadata declares is an error, never a silently short result.
pub(crate) fn read_slice(
    path: &str,
    reader: &SerializedFileReader<File>,
    index: &ChunkIndex,
    start: u64,
    count: u64,
) -> ReaderResult<Vec<RowRecord>> {
    let plan = plan_slice(index.chunks(), index.total_rows(), start, count);
    debug!("slice {path} start={start} count={count} plan={plan:?}");

    let expected: u64 = plan.iter().map(ChunkSlice::len).sum();
    let mut rows = Vec::with_capacity(usize::try_from(expected).unwrap_or(0));

    for part in &plan {
        let before = rows.len();
        read_chunk_part(path, reader, index.fields(), part, &mut rows)?;

        let got = (rows.len() - before) as u64;
        if got != part.len() {
            return Err(ReaderError::ReadChunk {
                path: path.to_string(),
                chunk: part.chunk,
                source: ParquetError::General(format!(
                    "expected {} rows from local range {}..{}, decoded {got}",
                    part.len(),
                    part.local_start,
                    part.local_end
                )),
            });
        }
    }

    Ok(rows)
}

fn read_chunk_part(
    path: &str,
    reader: &SerializedFileReader<File>,
    fields: &[RowField],
    part: &ChunkSlice,
    out: &mut Vec<RowRecord>,
) -> ReaderResult<()> {
    let context = || ReadChunkSnafu {
        path: path.to_string(),
        chunk: part.chunk,
    };

    let row_group = reader.get_row_group(part.chunk).with_context(|_| context())?;
    let rows = row_group.get_row_iter(None).with_context(|_| context())?;

    let skip = usize::try_from(part.local_start).unwrap_or(usize::MAX);
    let take = usize::try_from(part.len()).unwrap_or(usize::MAX);
    for row in rows.skip(skip).take(take) {
        let row = row.with_context(|_| context())?;
        out.push(row_record(&row, fields));
    }
    Ok(())
}

fn row_record(row: &Row, fields: &[RowField]) -> RowRecord {
    row.get_column_iter()
        .map(|(name, field)| {
            let logical = fields
                .iter()
                .find(|f| &f.name == name)
                .and_then(|f| f.logical_type.as_ref());
            (name.clone(), column_value(field, logical))
        })
        .collect()
}
