//! Record-oriented (JSON) files.
//!
//! The whole file is the unit of reading: every call parses it again and
//! answers from the parsed records. A file is first parsed as one JSON
//! document (an array of records or a single record); when that fails it is
//! read as newline-delimited JSON, skipping blank lines.

use std::fs;

use snafu::ResultExt;

use crate::error::{ParseJsonSnafu, ReaderResult, text_error};
use crate::format::FileHandle;
use crate::normalize::json_value;
use crate::value::RowRecord;

/// Column name given to records that are not JSON objects.
pub const SCALAR_COLUMN: &str = "value";

/// Parsed content of a record-oriented file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Records {
    /// Records in file order.
    pub rows: Vec<RowRecord>,
    /// Union of record keys, in first-seen order.
    pub columns: Vec<String>,
}

/// Reader over a JSON document or JSON-lines file.
#[derive(Debug, Clone)]
pub struct RecordReader {
    handle: FileHandle,
}

impl RecordReader {
    /// Bind to `handle`; nothing is read until the first call.
    pub fn new(handle: FileHandle) -> Self {
        Self { handle }
    }

    /// Parse the whole file.
    pub fn load(&self) -> ReaderResult<Records> {
        let path = self.handle.display();
        let text = fs::read_to_string(self.handle.path()).map_err(|e| text_error(path, e))?;
        parse_records(path, &text)
    }

    /// Record count and column names.
    pub fn info(&self) -> ReaderResult<(u64, Vec<String>)> {
        let records = self.load()?;
        Ok((records.rows.len() as u64, records.columns))
    }

    /// Records `[start, start + count)`.
    pub fn read_slice(&self, start: u64, count: u64) -> ReaderResult<Vec<RowRecord>> {
        let rows = self.load()?.rows;
        Ok(window(rows, start, count))
    }
}

/// Keep items `[start, start + count)` of `items`.
pub(crate) fn window<T>(items: Vec<T>, start: u64, count: u64) -> Vec<T> {
    let start = usize::try_from(start).unwrap_or(usize::MAX);
    let count = usize::try_from(count).unwrap_or(usize::MAX);
    items.into_iter().skip(start).take(count).collect()
}

/// Parse `text` as one document, falling back to one record per line.
pub(crate) fn parse_records(path: &str, text: &str) -> ReaderResult<Records> {
    let values = match serde_json::from_str::<serde_json::Value>(text) {
        Ok(serde_json::Value::Array(items)) => items,
        Ok(single) => vec![single],
        Err(_) => parse_lines(path, text)?,
    };

    let mut columns: Vec<String> = Vec::new();
    let rows: Vec<RowRecord> = values
        .iter()
        .map(|v| {
            let record = to_record(v);
            for name in record.columns() {
                if !columns.iter().any(|c| c == name) {
                    columns.push(name.to_string());
                }
            }
            record
        })
        .collect();

    Ok(Records { rows, columns })
}

fn parse_lines(path: &str, text: &str) -> ReaderResult<Vec<serde_json::Value>> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            serde_json::from_str(line.trim()).context(ParseJsonSnafu {
                path,
                line: Some(i + 1),
            })
        })
        .collect()
}

fn to_record(value: &serde_json::Value) -> RowRecord {
    match value {
        serde_json::Value::Object(map) => map.iter().map(|(k, v)| (k.as_str(), json_value(v))).collect(),
        other => [(SCALAR_COLUMN, json_value(other))].into_iter().collect(),
    }
}
