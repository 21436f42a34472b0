//! Plain text files, one row per line.

use std::fs::File;
use std::io::{BufRead, BufReader};

use crate::error::{ReaderResult, io_error, text_error};
use crate::format::FileHandle;
use crate::value::{RowRecord, Value};

/// The single column reported for text files.
pub const CONTENT_COLUMN: &str = "content";
/// The 1-based line number carried by every text row.
pub const LINE_NUMBER_COLUMN: &str = "line_number";

/// Streaming reader over the lines of a text file.
#[derive(Debug, Clone)]
pub struct LineReader {
    handle: FileHandle,
}

impl LineReader {
    /// Bind to `handle`; nothing is read until the first call.
    pub fn new(handle: FileHandle) -> Self {
        Self { handle }
    }

    fn lines(&self) -> ReaderResult<impl Iterator<Item = ReaderResult<String>> + '_> {
        let path = self.handle.display();
        let file = File::open(self.handle.path()).map_err(|e| io_error(path, e))?;
        Ok(BufReader::new(file)
            .lines()
            .map(move |line| line.map_err(|e| text_error(path, e))))
    }

    /// Number of lines. A final line without a terminator still counts.
    pub fn count_lines(&self) -> ReaderResult<u64> {
        let mut n = 0u64;
        for line in self.lines()? {
            line?;
            n += 1;
        }
        Ok(n)
    }

    /// Lines `[start, start + count)` as `{line_number, content}` rows.
    ///
    /// Every line up to the last requested one is decoded, skipped ones
    /// included, so a bad line before the window fails the read. Reading
    /// stops after the last requested line.
    pub fn read_slice(&self, start: u64, count: u64) -> ReaderResult<Vec<RowRecord>> {
        let end = start.saturating_add(count);

        let mut rows = Vec::new();
        if count == 0 {
            return Ok(rows);
        }
        for (n, line) in (0u64..end).zip(self.lines()?) {
            let line = line?;
            if n < start {
                continue;
            }
            let mut row = RowRecord::with_capacity(2);
            row.push(LINE_NUMBER_COLUMN, Value::Int(n as i64 + 1));
            row.push(CONTENT_COLUMN, Value::String(line));
            rows.push(row);
        }
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use tempfile::TempDir;

    type TestResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

    fn reader(tmp: &TempDir, content: &[u8]) -> TestResult<LineReader> {
        let path = tmp.path().join("notes.txt");
        std::fs::write(&path, content)?;
        Ok(LineReader::new(FileHandle::open(&path)?))
    }

    #[test]
    fn top_lines_are_numbered_from_one() -> TestResult {
        let tmp = TempDir::new()?;
        let r = reader(&tmp, b"a\nb\nc\n")?;

        let rows = r.read_slice(0, 2)?;
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get(LINE_NUMBER_COLUMN), Some(&Value::Int(1)));
        assert_eq!(rows[0].get(CONTENT_COLUMN), Some(&Value::String("a".into())));
        assert_eq!(rows[1].get(LINE_NUMBER_COLUMN), Some(&Value::Int(2)));
        assert_eq!(rows[1].get(CONTENT_COLUMN), Some(&Value::String("b".into())));
        Ok(())
    }

    #[test]
    fn terminators_are_stripped_and_last_line_counts() -> TestResult {
        let tmp = TempDir::new()?;
        let r = reader(&tmp, b"one\r\ntwo\n\nfour")?;

        assert_eq!(r.count_lines()?, 4);
        let rows = r.read_slice(1, 10)?;
        let content: Vec<_> = rows.iter().filter_map(|row| row.get(CONTENT_COLUMN).cloned()).collect();
        assert_eq!(
            content,
            [
                Value::String("two".into()),
                Value::String(String::new()),
                Value::String("four".into())
            ]
        );
        assert_eq!(rows[2].get(LINE_NUMBER_COLUMN), Some(&Value::Int(4)));
        Ok(())
    }

    #[test]
    fn empty_file_and_start_past_end_are_empty() -> TestResult {
        let tmp = TempDir::new()?;
        let r = reader(&tmp, b"")?;
        assert_eq!(r.count_lines()?, 0);
        assert!(r.read_slice(0, 5)?.is_empty());

        let r = reader(&tmp, b"x\n")?;
        assert!(r.read_slice(1, 5)?.is_empty());
        assert!(r.read_slice(0, 0)?.is_empty());
        Ok(())
    }

    #[test]
    fn invalid_utf8_is_a_parse_error() -> TestResult {
        let tmp = TempDir::new()?;
        let r = reader(&tmp, b"ok\n\xff\xfe\n")?;

        let err = r.count_lines().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ParseError);

        // lines before the bad one are still readable
        assert_eq!(r.read_slice(0, 1)?.len(), 1);
        Ok(())
    }

    #[test]
    fn window_after_invalid_utf8_is_a_parse_error() -> TestResult {
        let tmp = TempDir::new()?;
        let r = reader(&tmp, b"ok\n\xff\xfe\nc\n")?;

        let err = r.read_slice(2, 1).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ParseError);
        assert!(r.read_slice(1, 5).is_err());
        assert!(r.read_slice(0, 0)?.is_empty());
        Ok(())
    }
}
