//! Parquet fixtures shared by unit tests.

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{
    ArrayRef, Decimal128Array, Float64Builder, Int64Array, Int64Builder, StringBuilder,
    StructArray, Time32MillisecondArray, TimestampMillisecondBuilder, TimestampNanosecondArray,
};
use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::basic::{Compression, ZstdLevel};
use parquet::file::properties::WriterProperties;
use parquet::schema::types::ColumnPath;

pub(crate) type TestResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

pub(crate) const BASE_TS_MILLIS: i64 = 1_700_000_000_000;

/// Write a four-column file with one row group per entry of `row_groups`.
///
/// Row `i` (file order) holds:
/// - `id`: `i`
/// - `name`: `name-i`, null when `i % 3 == 1`
/// - `score`: `i * 0.5`, NaN when `i == 4`
/// - `ts`: `BASE_TS_MILLIS + i * 1000` (milliseconds)
///
/// `name` is ZSTD-compressed, every other column SNAPPY.
pub(crate) fn write_sample_parquet(path: &Path, row_groups: &[usize]) -> TestResult {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let schema = Arc::new(Schema::new(vec![
        Field::new("id", DataType::Int64, false),
        Field::new("name", DataType::Utf8, true),
        Field::new("score", DataType::Float64, true),
        Field::new(
            "ts",
            DataType::Timestamp(TimeUnit::Millisecond, None),
            false,
        ),
    ]));

    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .set_column_compression(
            ColumnPath::from("name"),
            Compression::ZSTD(ZstdLevel::default()),
        )
        .build();

    let file = File::create(path)?;
    let mut writer = ArrowWriter::try_new(file, schema.clone(), Some(props))?;

    let mut next = 0usize;
    for &rows in row_groups {
        let batch = sample_batch(schema.clone(), next, rows)?;
        writer.write(&batch)?;
        writer.flush()?;
        next += rows;
    }
    writer.close()?;
    Ok(())
}

fn sample_batch(schema: Arc<Schema>, first: usize, rows: usize) -> TestResult<RecordBatch> {
    let mut ids = Int64Builder::with_capacity(rows);
    let mut names = StringBuilder::new();
    let mut scores = Float64Builder::with_capacity(rows);
    let mut ts = TimestampMillisecondBuilder::with_capacity(rows);

    for i in first..first + rows {
        ids.append_value(i as i64);
        if i % 3 == 1 {
            names.append_null();
        } else {
            names.append_value(format!("name-{i}"));
        }
        scores.append_value(if i == 4 { f64::NAN } else { i as f64 * 0.5 });
        ts.append_value(BASE_TS_MILLIS + i as i64 * 1_000);
    }

    Ok(RecordBatch::try_new(
        schema,
        vec![
            Arc::new(ids.finish()),
            Arc::new(names.finish()),
            Arc::new(scores.finish()),
            Arc::new(ts.finish()),
        ],
    )?)
}

/// Raw nanosecond timestamps in [`write_typed_parquet`].
pub(crate) const TS_NANOS: [i64; 2] = [1_700_000_000_000_000_000, 1_700_000_000_500_000_000];

/// Write one row group of two rows with annotated columns the record API
/// does not fully decode:
/// - `ts_ns`: timestamp in nanoseconds, [`TS_NANOS`]
/// - `price`: decimal(10, 2), `12.34` and `-0.05`
/// - `at`: time of day in milliseconds, `01:02:03.004` and midnight
pub(crate) fn write_typed_parquet(path: &Path) -> TestResult {
    let schema = Arc::new(Schema::new(vec![
        Field::new("ts_ns", DataType::Timestamp(TimeUnit::Nanosecond, None), false),
        Field::new("price", DataType::Decimal128(10, 2), false),
        Field::new("at", DataType::Time32(TimeUnit::Millisecond), false),
    ]));

    let price = Decimal128Array::from(vec![1234_i128, -5]).with_precision_and_scale(10, 2)?;
    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(TimestampNanosecondArray::from(TS_NANOS.to_vec())),
            Arc::new(price),
            Arc::new(Time32MillisecondArray::from(vec![3_723_004, 0])),
        ],
    )?;

    let mut writer = ArrowWriter::try_new(File::create(path)?, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

/// Write `id: [1, 2]` next to a struct column `s { a: [10, 20] }`.
pub(crate) fn write_nested_parquet(path: &Path) -> TestResult {
    let inner = Arc::new(Field::new("a", DataType::Int64, false));
    let s = StructArray::from(vec![(
        inner.clone(),
        Arc::new(Int64Array::from(vec![10, 20])) as ArrayRef,
    )]);
    let schema = Arc::new(Schema::new(vec![
        Field::new("id", DataType::Int64, false),
        Field::new("s", DataType::Struct(vec![inner].into()), false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![Arc::new(Int64Array::from(vec![1, 2])), Arc::new(s)],
    )?;

    let mut writer = ArrowWriter::try_new(File::create(path)?, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}
