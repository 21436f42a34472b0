//! Error types and SNAFU context selectors for the reader.
//!
//! `ReaderError` is the single error type returned by every operation on
//! [`crate::reader::FileReader`] and the components behind it. Variants carry
//! the offending path so callers can surface actionable messages without
//! re-threading context. [`ReaderError::kind`] collapses the variants into the
//! coarse [`ErrorKind`] taxonomy an external request layer maps to responses.

use std::io;

use parquet::errors::ParquetError;
use snafu::prelude::*;

/// Convenience alias for results returned by reader operations.
pub type ReaderResult<T> = Result<T, ReaderError>;

/// Errors produced while opening, slicing, or summarizing a file.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ReaderError {
    /// The path does not exist or is not a regular file.
    #[snafu(display("File not found: {path}"))]
    NotFound {
        /// The path that could not be opened.
        path: String,
        /// Underlying filesystem error.
        source: io::Error,
    },

    /// No handler exists for the file's extension.
    ///
    /// Unreachable while plain text is the catch-all format; kept so callers
    /// can match on it once a format without a fallback is added.
    #[snafu(display("Unsupported file format: {path}"))]
    UnsupportedFormat {
        /// The path whose extension was not recognized.
        path: String,
    },

    /// A columnar-only component was handed a non-columnar file.
    #[snafu(display("Not a columnar file: {path}"))]
    NotColumnar {
        /// The path that was classified as non-columnar.
        path: String,
    },

    /// The columnar footer could not be parsed or is internally inconsistent.
    #[snafu(display("Corrupt columnar metadata in {path}: {source}"))]
    CorruptMetadata {
        /// The file whose metadata is unreadable.
        path: String,
        /// Underlying Parquet error.
        source: ParquetError,
    },

    /// Row data of one chunk failed to decode.
    #[snafu(display("Failed to read chunk {chunk} of {path}: {source}"))]
    ReadChunk {
        /// The file being read.
        path: String,
        /// Index of the chunk (row group) that failed.
        chunk: usize,
        /// Underlying Parquet error.
        source: ParquetError,
    },

    /// Record-oriented content is not valid JSON.
    #[snafu(display("{}", match line {
        Some(line) => format!("Invalid JSON record at {path}:{line}: {source}"),
        None => format!("Invalid JSON document {path}: {source}"),
    }))]
    ParseJson {
        /// The file being parsed.
        path: String,
        /// 1-based line number when parsing line-delimited records.
        line: Option<usize>,
        /// Underlying JSON error.
        source: serde_json::Error,
    },

    /// Text content could not be decoded as UTF-8.
    #[snafu(display("Failed to decode text in {path}: {source}"))]
    ParseText {
        /// The file being decoded.
        path: String,
        /// Underlying decoding error.
        source: io::Error,
    },

    /// A negative start row or row count was requested.
    #[snafu(display("Invalid row range: start={start}, count={count}"))]
    InvalidRange {
        /// Requested first row.
        start: i64,
        /// Requested number of rows.
        count: i64,
    },

    /// Any other filesystem failure.
    #[snafu(display("I/O error at {path}: {source}"))]
    Io {
        /// The path where the error occurred.
        path: String,
        /// Underlying filesystem error.
        source: io::Error,
    },
}

/// Coarse classification of [`ReaderError`] variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Path missing.
    NotFound,
    /// Extension maps to no known handler.
    UnsupportedFormat,
    /// Columnar operation on a non-columnar file.
    NotColumnar,
    /// Columnar metadata unreadable or malformed.
    CorruptMetadata,
    /// Content failed to parse under its format's rules.
    ParseError,
    /// Negative start or count.
    InvalidRange,
    /// Other I/O failure.
    Io,
}

impl ReaderError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ReaderError::NotFound { .. } => ErrorKind::NotFound,
            ReaderError::UnsupportedFormat { .. } => ErrorKind::UnsupportedFormat,
            ReaderError::NotColumnar { .. } => ErrorKind::NotColumnar,
            ReaderError::CorruptMetadata { .. } => ErrorKind::CorruptMetadata,
            ReaderError::ReadChunk { .. }
            | ReaderError::ParseJson { .. }
            | ReaderError::ParseText { .. } => ErrorKind::ParseError,
            ReaderError::InvalidRange { .. } => ErrorKind::InvalidRange,
            ReaderError::Io { .. } => ErrorKind::Io,
        }
    }
}

/// Map a filesystem error on `path` to `NotFound` or `Io` by its kind.
pub(crate) fn io_error(path: &str, source: io::Error) -> ReaderError {
    if source.kind() == io::ErrorKind::NotFound {
        ReaderError::NotFound {
            path: path.to_string(),
            source,
        }
    } else {
        ReaderError::Io {
            path: path.to_string(),
            source,
        }
    }
}

/// Map a failure while reading text to `ParseText` when the bytes were not
/// UTF-8, otherwise to a plain I/O error.
pub(crate) fn text_error(path: &str, source: io::Error) -> ReaderError {
    if source.kind() == io::ErrorKind::InvalidData {
        ReaderError::ParseText {
            path: path.to_string(),
            source,
        }
    } else {
        io_error(path, source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_maps_to_not_found() {
        let err = io_error("x.txt", io::Error::from(io::ErrorKind::NotFound));
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let err = io_error("x.txt", io::Error::from(io::ErrorKind::PermissionDenied));
        assert_eq!(err.kind(), ErrorKind::Io);
    }

    #[test]
    fn invalid_utf8_is_a_parse_error() {
        let err = text_error("x.txt", io::Error::from(io::ErrorKind::InvalidData));
        assert_eq!(err.kind(), ErrorKind::ParseError);
        assert!(err.to_string().contains("x.txt"));
    }

    #[test]
    fn json_error_display_includes_line() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = ReaderError::ParseJson {
            path: "a.jsonl".to_string(),
            line: Some(3),
            source,
        };
        assert!(err.to_string().starts_with("Invalid JSON record at a.jsonl:3"));
        assert_eq!(err.kind(), ErrorKind::ParseError);
    }
}
