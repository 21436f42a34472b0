//! Format classification and the read-only file handle.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{ReaderResult, io_error};

/// The storage layout of a file, fixed from its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Format {
    /// Chunked columnar storage (Parquet).
    Columnar,
    /// A JSON document or newline-delimited JSON records.
    RecordOriented,
    /// Unstructured lines; the fallback for every other extension.
    LineText,
}

impl Format {
    /// Classify `path` by its extension, case-insensitively.
    ///
    /// Never fails: unknown or missing extensions are `LineText`.
    pub fn detect(path: &Path) -> Format {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase());

        match ext.as_deref() {
            Some("parquet") => Format::Columnar,
            Some("json" | "jsonl" | "ndjson") => Format::RecordOriented,
            _ => Format::LineText,
        }
    }

    /// Short label reported as `file_type`.
    pub fn label(&self) -> &'static str {
        match self {
            Format::Columnar => "parquet",
            Format::RecordOriented => "json",
            Format::LineText => "text",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Read-only binding of a path to its detected format.
///
/// Built once by [`crate::reader::FileReader`] and never mutated.
#[derive(Debug, Clone)]
pub struct FileHandle {
    path: PathBuf,
    display: String,
    format: Format,
    size_bytes: u64,
}

impl FileHandle {
    /// Check that `path` is an existing regular file and classify it.
    pub fn open(path: impl Into<PathBuf>) -> ReaderResult<Self> {
        let path = path.into();
        let display = path.display().to_string();

        let meta = fs::metadata(&path).map_err(|e| io_error(&display, e))?;
        if !meta.is_file() {
            return Err(io_error(
                &display,
                io::Error::new(io::ErrorKind::NotFound, "not a regular file"),
            ));
        }

        let format = Format::detect(&path);
        Ok(Self {
            path,
            display,
            format,
            size_bytes: meta.len(),
        })
    }

    /// The bound path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The path rendered for error messages and logs.
    pub fn display(&self) -> &str {
        &self.display
    }

    /// Format detected at open.
    pub fn format(&self) -> Format {
        self.format
    }

    /// File size observed at open.
    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }
}
