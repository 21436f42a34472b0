//! A bucket backed by a local directory.

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use log::debug;
use snafu::ResultExt;

use super::{DownloadSnafu, ListSnafu, ObjectEntry, ObjectSource, TransferResult, key_path};

/// Serves the files under `root` as objects.
///
/// A file's key is its path relative to `root` with `/` separators. Every
/// subdirectory is also listed as a folder marker (`dir/`, size 0), the way
/// object stores report folders created through their consoles.
///
/// Symlinks are followed. A directory reached a second time through a link
/// is left out, so link cycles terminate; dangling links are skipped.
#[derive(Debug, Clone)]
pub struct LocalBucket {
    root: PathBuf,
}

impl LocalBucket {
    /// Bucket rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The directory behind the bucket.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn walk(&self) -> io::Result<Vec<ObjectEntry>> {
        let mut entries = Vec::new();
        let mut visited = HashSet::from([fs::canonicalize(&self.root)?]);
        let mut pending = vec![(self.root.clone(), String::new())];

        while let Some((dir, key_prefix)) = pending.pop() {
            for item in fs::read_dir(&dir)? {
                let item = item?;
                let path = item.path();
                let name = item.file_name().to_string_lossy().into_owned();
                let meta = match fs::metadata(&path) {
                    Ok(meta) => meta,
                    Err(e) if e.kind() == io::ErrorKind::NotFound => {
                        debug!("skipping dangling link {}", path.display());
                        continue;
                    }
                    Err(e) => return Err(e),
                };
                let last_modified = DateTime::<Utc>::from(meta.modified()?);

                if meta.is_dir() {
                    if !visited.insert(fs::canonicalize(&path)?) {
                        debug!("skipping already listed directory {}", path.display());
                        continue;
                    }
                    let key = format!("{key_prefix}{name}/");
                    entries.push(ObjectEntry {
                        key: key.clone(),
                        size_bytes: 0,
                        last_modified,
                    });
                    pending.push((path, key));
                } else if meta.is_file() {
                    entries.push(ObjectEntry {
                        key: format!("{key_prefix}{name}"),
                        size_bytes: meta.len(),
                        last_modified,
                    });
                }
            }
        }
        Ok(entries)
    }
}

impl ObjectSource for LocalBucket {
    fn name(&self) -> String {
        self.root.display().to_string()
    }

    fn list(&self, prefix: &str) -> TransferResult<Vec<ObjectEntry>> {
        let mut entries = self.walk().context(ListSnafu {
            bucket: self.name(),
            prefix,
        })?;
        entries.retain(|e| e.key.starts_with(prefix));
        entries.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(entries)
    }

    fn download(&self, key: &str, local_path: &Path) -> TransferResult<()> {
        let src = self.root.join(key_path(key)?);
        fs::copy(&src, local_path).context(DownloadSnafu {
            key,
            local_path: local_path.display().to_string(),
        })?;
        Ok(())
    }
}
