//! File-level column summaries folded from per-chunk metadata.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::columnar::chunk_index::{ChunkIndex, UNCOMPRESSED};
use crate::normalize::BoundOrder;
use crate::value::{RowRecord, Value};

/// Codec reported when a column (or file) uses more than one codec.
pub const MIXED: &str = "mixed";

/// Aggregated statistics of one column over every chunk.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ColumnSummary {
    /// Column name; the key of this summary in [`ColumnStats`].
    #[serde(skip)]
    pub name: String,
    /// Stored primitive type.
    pub physical_type: String,
    /// Logical annotation, if any.
    pub logical_type: Option<String>,
    /// Sum of per-chunk null counts.
    pub null_count: u64,
    /// Sum of per-chunk compressed sizes in bytes.
    pub total_size: u64,
    /// The single codec used, [`MIXED`], or `UNCOMPRESSED`.
    pub overall_compression: String,
    /// Minimum over all chunk minimums.
    pub min_value: Option<Value>,
    /// Maximum over all chunk maximums.
    pub max_value: Option<Value>,
    /// A few non-null values from the start of the file.
    pub sample_values: Vec<Value>,
}

/// Marker that sample collection failed; the metadata part is still valid.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct PartialStats {
    /// Why samples are missing.
    pub reason: String,
}

/// Result of `column_stats`: summaries keyed by column, in column order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnStats {
    columns: Vec<ColumnSummary>,
    partial: Option<PartialStats>,
}

impl ColumnStats {
    pub(crate) fn new(columns: Vec<ColumnSummary>, partial: Option<PartialStats>) -> Self {
        Self { columns, partial }
    }

    /// Summary of the column named `name`.
    pub fn get(&self, name: &str) -> Option<&ColumnSummary> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Summaries in column order.
    pub fn iter(&self) -> impl Iterator<Item = &ColumnSummary> {
        self.columns.iter()
    }

    /// Number of summarized columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// True for non-columnar files.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Set when sample values could not be collected.
    pub fn partial(&self) -> Option<&PartialStats> {
        self.partial.as_ref()
    }
}

impl Serialize for ColumnStats {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        struct Columns<'a>(&'a [ColumnSummary]);

        impl Serialize for Columns<'_> {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                let mut map = serializer.serialize_map(Some(self.0.len()))?;
                for c in self.0 {
                    map.serialize_entry(&c.name, c)?;
                }
                map.end()
            }
        }

        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("columns", &Columns(&self.columns))?;
        map.serialize_entry("partial_stats", &self.partial)?;
        map.end()
    }
}

/// Compression overview reported by `info`.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct CompressionSummary {
    /// Fold of every (chunk, column) codec in the file.
    pub overall_compression: String,
    /// Per-column fold, in column order.
    #[serde(serialize_with = "serialize_pairs")]
    pub column_compression: Vec<(String, String)>,
    /// True iff any chunk is compressed.
    pub has_compression: bool,
}

impl CompressionSummary {
    /// Summary for formats without stored compression metadata.
    pub fn uncompressed() -> Self {
        Self {
            overall_compression: UNCOMPRESSED.to_string(),
            column_compression: Vec::new(),
            has_compression: false,
        }
    }
}

fn serialize_pairs<S: Serializer>(pairs: &[(String, String)], serializer: S) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(pairs.len()))?;
    for (k, v) in pairs {
        map.serialize_entry(k, v)?;
    }
    map.end()
}

/// Fold codec names: none compressed gives `UNCOMPRESSED`, one distinct
/// codec gives that codec, several give [`MIXED`].
pub fn overall_codec<'a>(codecs: impl IntoIterator<Item = &'a str>) -> String {
    let distinct: BTreeSet<&str> = codecs.into_iter().filter(|c| *c != UNCOMPRESSED).collect();
    let mut iter = distinct.into_iter();
    match (iter.next(), iter.next()) {
        (None, _) => UNCOMPRESSED.to_string(),
        (Some(only), None) => only.to_string(),
        (Some(_), Some(_)) => MIXED.to_string(),
    }
}

/// Compression overview of the whole file.
pub(crate) fn compression_summary(index: &ChunkIndex) -> CompressionSummary {
    let chunk_count = index.chunks().len();

    let column_compression: Vec<(String, String)> = index
        .columns()
        .iter()
        .enumerate()
        .map(|(col, c)| {
            let codecs = (0..chunk_count)
                .filter_map(|chunk| index.chunk_stats(chunk, col))
                .map(|s| s.compression_codec.as_str());
            (c.name.clone(), overall_codec(codecs))
        })
        .collect();

    let all = (0..chunk_count).flat_map(|chunk| {
        (0..index.columns().len())
            .filter_map(move |col| index.chunk_stats(chunk, col))
            .map(|s| s.compression_codec.as_str())
    });
    let overall_compression = overall_codec(all);
    let has_compression = overall_compression != UNCOMPRESSED;

    CompressionSummary {
        overall_compression,
        column_compression,
        has_compression,
    }
}

/// Metadata pass: one summary per column, samples left empty.
pub(crate) fn summarize_columns(index: &ChunkIndex) -> Vec<ColumnSummary> {
    (0..index.columns().len())
        .map(|col| summarize_column(index, col))
        .collect()
}

fn summarize_column(index: &ChunkIndex, col: usize) -> ColumnSummary {
    let descr = &index.columns()[col];

    let mut null_count = 0u64;
    let mut total_size = 0u64;
    let mut codecs = Vec::with_capacity(index.chunks().len());
    let mut min_value = None;
    let mut max_value = None;
    let order = descr.bound_order;

    for chunk in 0..index.chunks().len() {
        let Some(stats) = index.chunk_stats(chunk, col) else {
            continue;
        };
        null_count += stats.null_count;
        total_size += stats.compressed_size;
        codecs.push(stats.compression_codec.as_str());
        keep_extreme(&mut min_value, stats.min.as_ref(), Ordering::Less, order);
        keep_extreme(&mut max_value, stats.max.as_ref(), Ordering::Greater, order);
    }

    ColumnSummary {
        name: descr.name.clone(),
        physical_type: descr.physical_type.clone(),
        logical_type: descr.logical_type.clone(),
        null_count,
        total_size,
        overall_compression: overall_codec(codecs),
        min_value,
        max_value,
        sample_values: Vec::new(),
    }
}

/// Replace `current` with `candidate` when it orders as `want` against it
/// under `order`.
///
/// Incomparable candidates are ignored, so one column never mixes kinds.
fn keep_extreme(
    current: &mut Option<Value>,
    candidate: Option<&Value>,
    want: Ordering,
    order: BoundOrder,
) {
    let Some(candidate) = candidate else {
        return;
    };
    match current {
        None => *current = Some(candidate.clone()),
        Some(cur) => {
            if order.compare(candidate, cur) == Some(want) {
                *cur = candidate.clone();
            }
        }
    }
}

/// Fill `sample_values` of each summary from `rows`, skipping nulls.
///
/// Returns the columns no sampled row carries, such as leaves nested in a
/// group; their samples stay empty.
pub(crate) fn attach_samples(
    summaries: &mut [ColumnSummary],
    rows: &[RowRecord],
    max: usize,
) -> Vec<String> {
    let mut unmatched = Vec::new();
    for summary in summaries {
        if !rows.is_empty() && rows.iter().all(|r| r.get(&summary.name).is_none()) {
            unmatched.push(summary.name.clone());
        }
        summary.sample_values = rows
            .iter()
            .filter_map(|r| r.get(&summary.name))
            .filter(|v| !v.is_null())
            .take(max)
            .cloned()
            .collect();
    }
    unmatched
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codec_fold_distinguishes_single_mixed_and_uncompressed() {
        assert_eq!(overall_codec([]), UNCOMPRESSED);
        assert_eq!(overall_codec([UNCOMPRESSED, UNCOMPRESSED]), UNCOMPRESSED);
        assert_eq!(overall_codec(["SNAPPY", UNCOMPRESSED, "SNAPPY"]), "SNAPPY");
        assert_eq!(overall_codec(["SNAPPY", "ZSTD"]), MIXED);
        assert_eq!(overall_codec([UNCOMPRESSED, "GZIP", "ZSTD", "GZIP"]), MIXED);
    }

    #[test]
    fn extremes_ignore_incomparable_candidates() {
        let (less, natural) = (Ordering::Less, BoundOrder::Natural);
        let mut min = None;
        keep_extreme(&mut min, Some(&Value::Int(5)), less, natural);
        keep_extreme(&mut min, Some(&Value::Int(2)), less, natural);
        keep_extreme(&mut min, Some(&Value::String("0".into())), less, natural);
        keep_extreme(&mut min, None, less, natural);
        keep_extreme(&mut min, Some(&Value::Float(2.5)), less, natural);
        assert_eq!(min, Some(Value::Int(2)));

        let greater = Ordering::Greater;
        let mut max = None;
        for s in ["b", "a", "c"] {
            keep_extreme(&mut max, Some(&Value::String(s.into())), greater, BoundOrder::Natural);
        }
        assert_eq!(max, Some(Value::String("c".into())));
    }

    #[test]
    fn annotated_extremes_fold_by_value() {
        let mut max = None;
        for s in ["9.50", "10.25", "-3.00"] {
            keep_extreme(&mut max, Some(&Value::String(s.into())), Ordering::Greater, BoundOrder::Decimal);
        }
        assert_eq!(max, Some(Value::String("10.25".into())));

        let mut max = None;
        for s in ["2023-11-14T22:13:20.500Z", "2023-11-14T22:13:20Z"] {
            keep_extreme(&mut max, Some(&Value::String(s.into())), Ordering::Greater, BoundOrder::Timestamp);
        }
        assert_eq!(max, Some(Value::String("2023-11-14T22:13:20.500Z".into())));
    }

    #[test]
    fn samples_skip_nulls_and_respect_limit() {
        let rows: Vec<RowRecord> = [Value::Null, Value::Int(1), Value::Int(2), Value::Null, Value::Int(3), Value::Int(4)]
            .into_iter()
            .map(|v| [("x", v)].into_iter().collect())
            .collect();

        let mut summaries = vec![ColumnSummary {
            name: "x".into(),
            physical_type: "INT64".into(),
            logical_type: None,
            null_count: 0,
            total_size: 0,
            overall_compression: UNCOMPRESSED.into(),
            min_value: None,
            max_value: None,
            sample_values: Vec::new(),
        }];
        let unmatched = attach_samples(&mut summaries, &rows, 3);
        assert!(unmatched.is_empty());
        assert_eq!(
            summaries[0].sample_values,
            vec![Value::Int(1), Value::Int(2), Value::Int(3)]
        );
    }

    #[test]
    fn columns_missing_from_rows_are_reported() {
        let rows: Vec<RowRecord> = vec![[("s", Value::String("{a: 1}".into()))].into_iter().collect()];
        let mut summaries = vec![ColumnSummary {
            name: "s.a".into(),
            physical_type: "INT64".into(),
            logical_type: None,
            null_count: 0,
            total_size: 0,
            overall_compression: UNCOMPRESSED.into(),
            min_value: None,
            max_value: None,
            sample_values: Vec::new(),
        }];

        assert_eq!(attach_samples(&mut summaries, &rows, 3), ["s.a"]);
        assert!(summaries[0].sample_values.is_empty());
        assert!(attach_samples(&mut summaries, &[], 3).is_empty());
    }

    #[test]
    fn column_stats_serialize_as_named_map() {
        let stats = ColumnStats::new(
            vec![ColumnSummary {
                name: "x".into(),
                physical_type: "INT64".into(),
                logical_type: None,
                null_count: 1,
                total_size: 10,
                overall_compression: "SNAPPY".into(),
                min_value: Some(Value::Int(0)),
                max_value: Some(Value::Int(9)),
                sample_values: vec![Value::Int(0)],
            }],
            None,
        );

        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["columns"]["x"]["null_count"], 1);
        assert_eq!(json["columns"]["x"]["overall_compression"], "SNAPPY");
        assert!(json["columns"]["x"].get("name").is_none());
        assert!(json["partial_stats"].is_null());
    }
}
