//! Reader tuning knobs.

/// Options applied by [`crate::reader::FileReader`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReaderOptions {
    /// Upper bound on rows read from the start of the file to collect
    /// sample values for column statistics.
    pub sample_rows: u64,
    /// Maximum number of non-null sample values kept per column.
    pub sample_values: usize,
}

impl ReaderOptions {
    /// Default number of rows scanned for samples.
    pub const DEFAULT_SAMPLE_ROWS: u64 = 5;
    /// Default number of sample values per column.
    pub const DEFAULT_SAMPLE_VALUES: usize = 3;

    /// Override the sample row budget.
    pub fn with_sample_rows(mut self, rows: u64) -> Self {
        self.sample_rows = rows;
        self
    }

    /// Override the per-column sample count.
    pub fn with_sample_values(mut self, values: usize) -> Self {
        self.sample_values = values;
        self
    }
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            sample_rows: Self::DEFAULT_SAMPLE_ROWS,
            sample_values: Self::DEFAULT_SAMPLE_VALUES,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builders_override_defaults() {
        let options = ReaderOptions::default();
        assert_eq!(options.sample_rows, 5);
        assert_eq!(options.sample_values, 3);

        let options = options.with_sample_rows(100).with_sample_values(1);
        assert_eq!(options.sample_rows, 100);
        assert_eq!(options.sample_values, 1);
    }
}
