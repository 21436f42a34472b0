#![allow(dead_code)]

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{Float64Builder, Int64Builder, StringBuilder};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;

pub type TestResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

/// Write `id`, `label` and `ratio` columns with one row group per entry of
/// `row_groups`. Row `i` has `id = i`; `label` is null on every fifth row;
/// `ratio` is NaN on every fourth row.
pub fn write_chunked_parquet(
    path: &Path,
    row_groups: &[usize],
    compression: Compression,
) -> TestResult {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let schema = Arc::new(Schema::new(vec![
        Field::new("id", DataType::Int64, false),
        Field::new("label", DataType::Utf8, true),
        Field::new("ratio", DataType::Float64, true),
    ]));
    let props = WriterProperties::builder()
        .set_compression(compression)
        .build();

    let mut writer = ArrowWriter::try_new(File::create(path)?, schema.clone(), Some(props))?;
    let mut first = 0usize;
    for &rows in row_groups {
        let mut ids = Int64Builder::with_capacity(rows);
        let mut labels = StringBuilder::new();
        let mut ratios = Float64Builder::with_capacity(rows);
        for i in first..first + rows {
            ids.append_value(i as i64);
            if i % 5 == 0 {
                labels.append_null();
            } else {
                labels.append_value(format!("row-{i:03}"));
            }
            ratios.append_value(if i % 4 == 3 { f64::NAN } else { i as f64 / 4.0 });
        }

        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(ids.finish()) as _,
                Arc::new(labels.finish()),
                Arc::new(ratios.finish()),
            ],
        )?;
        writer.write(&batch)?;
        writer.flush()?;
        first += rows;
    }
    writer.close()?;
    Ok(())
}
