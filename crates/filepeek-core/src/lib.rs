//! Random-access reading of Parquet, JSON and text files.
//!
//! This crate lets a caller inspect a data file without loading it:
//!
//! - File info (type, size, row and column counts, chunking, compression).
//! - Arbitrary row windows. For Parquet, only the row groups that intersect
//!   the window are decoded (`columnar::slice`).
//! - Per-column statistics folded from row-group metadata, plus a few sample
//!   values (`columnar::stats`).
//!
//! Every format answers the same four operations through
//! [`FileReader`](reader::FileReader). All values come back in the small
//! [`Value`](value::Value) model, which serializes to plain JSON.
//!
//! The `transfer` module fetches whole objects from a bucket into local
//! files; the reader itself only ever opens local paths.
//!
//! The crate logs through the `log` facade and never installs a logger.
#![deny(missing_docs)]
pub mod columnar;
pub mod config;
pub mod error;
pub mod format;
pub mod line;
pub mod normalize;
pub mod reader;
pub mod record;
pub mod transfer;
pub mod value;

#[cfg(test)]
mod test_util;

pub use config::ReaderOptions;
pub use error::{ErrorKind, ReaderError, ReaderResult};
pub use format::Format;
pub use reader::{FileInfo, FileReader};
pub use value::{RowRecord, Value};
