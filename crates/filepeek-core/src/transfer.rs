//! Fetching whole objects from a bucket into local files.
//!
//! The reader only opens local paths; this module is how those paths get
//! populated. A bucket is anything implementing [`ObjectSource`]. The
//! shipped backend, [`LocalBucket`], serves a local directory; remote stores
//! plug in by implementing the same two calls.

pub mod local;

use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use log::debug;
use serde::Serialize;
use snafu::{Backtrace, prelude::*};

pub use local::LocalBucket;

/// Result type of transfer operations.
pub type TransferResult<T> = Result<T, TransferError>;

/// Errors produced while listing or downloading objects.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum TransferError {
    /// Listing the bucket failed.
    #[snafu(display("Failed to list {bucket} under prefix '{prefix}': {source}"))]
    List {
        /// Bucket being listed.
        bucket: String,
        /// Requested key prefix.
        prefix: String,
        /// Underlying I/O error.
        source: io::Error,
        /// Backtrace captured at the failure.
        backtrace: Backtrace,
    },

    /// Copying one object to its local path failed.
    #[snafu(display("Failed to download {key} to {local_path}: {source}"))]
    Download {
        /// Object key.
        key: String,
        /// Destination path.
        local_path: String,
        /// Underlying I/O error.
        source: io::Error,
        /// Backtrace captured at the failure.
        backtrace: Backtrace,
    },

    /// The key is empty, absolute, or would leave the destination directory.
    #[snafu(display("Invalid object key: '{key}'"))]
    InvalidKey {
        /// The rejected key.
        key: String,
        /// Backtrace captured at the failure.
        backtrace: Backtrace,
    },

    /// The destination directory could not be created.
    #[snafu(display("Failed to create directory {path}: {source}"))]
    CreateDir {
        /// Directory being created.
        path: String,
        /// Underlying I/O error.
        source: io::Error,
        /// Backtrace captured at the failure.
        backtrace: Backtrace,
    },
}

/// One object in a bucket listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObjectEntry {
    /// `/`-separated key. Keys ending in `/` are folder markers.
    pub key: String,
    /// Object size in bytes.
    pub size_bytes: u64,
    /// Last modification time.
    pub last_modified: DateTime<Utc>,
}

impl ObjectEntry {
    /// True for folder marker keys, which carry no data.
    pub fn is_folder(&self) -> bool {
        self.key.ends_with('/')
    }
}

/// A store of keyed objects that can be listed and downloaded whole.
pub trait ObjectSource {
    /// Human-readable name of the store, used in errors and logs.
    fn name(&self) -> String;

    /// Objects whose key starts with `prefix`, in ascending key order.
    fn list(&self, prefix: &str) -> TransferResult<Vec<ObjectEntry>>;

    /// Copy the object `key` to `local_path`, replacing any existing file.
    /// The parent directory of `local_path` must exist.
    fn download(&self, key: &str, local_path: &Path) -> TransferResult<()>;
}

/// Outcome of [`download_prefix`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DownloadReport {
    /// Local paths written, in key order.
    pub files: Vec<PathBuf>,
    /// Folder marker keys that were skipped.
    pub skipped: Vec<String>,
    /// Sum of the listed sizes of the downloaded objects.
    pub total_bytes: u64,
}

/// Download every object under `prefix` into `dest_dir`, keeping the key
/// layout: object `a/b.parquet` lands at `dest_dir/a/b.parquet`.
///
/// Stops at the first failing object.
pub fn download_prefix<S: ObjectSource + ?Sized>(
    source: &S,
    prefix: &str,
    dest_dir: &Path,
) -> TransferResult<DownloadReport> {
    std::fs::create_dir_all(dest_dir).context(CreateDirSnafu {
        path: dest_dir.display().to_string(),
    })?;

    let mut report = DownloadReport::default();
    for entry in source.list(prefix)? {
        if entry.is_folder() {
            debug!("skipping folder marker {}", entry.key);
            report.skipped.push(entry.key);
            continue;
        }

        let local_path = dest_dir.join(key_path(&entry.key)?);
        if let Some(parent) = local_path.parent() {
            std::fs::create_dir_all(parent).context(CreateDirSnafu {
                path: parent.display().to_string(),
            })?;
        }

        debug!(
            "downloading {}/{} -> {}",
            source.name(),
            entry.key,
            local_path.display()
        );
        source.download(&entry.key, &local_path)?;

        report.total_bytes += entry.size_bytes;
        report.files.push(local_path);
    }

    Ok(report)
}

/// Relative path for `key`, rejecting keys that could escape a base
/// directory.
pub(crate) fn key_path(key: &str) -> TransferResult<PathBuf> {
    let valid = !key.is_empty()
        && !key.starts_with('/')
        && !key.contains('\\')
        && key
            .split('/')
            .all(|seg| !seg.is_empty() && seg != "." && seg != "..");
    ensure!(valid, InvalidKeySnafu { key });

    Ok(key.split('/').collect())
}
