use std::{fs::File, path::Path, sync::Arc};

use arrow::array::{Int64Builder, StringBuilder};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

type TestResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

/// Write `id` and `symbol` columns, one row group per entry of `row_groups`.
pub fn write_parquet_groups(path: &Path, row_groups: &[usize]) -> TestResult {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let schema = Arc::new(Schema::new(vec![
        Field::new("id", DataType::Int64, false),
        Field::new("symbol", DataType::Utf8, true),
    ]));

    let mut writer = ArrowWriter::try_new(File::create(path)?, schema.clone(), None)?;
    let mut next = 0i64;
    for &rows in row_groups {
        let mut ids = Int64Builder::with_capacity(rows);
        let mut symbols = StringBuilder::new();
        for _ in 0..rows {
            ids.append_value(next);
            symbols.append_value(format!("SYM{next}"));
            next += 1;
        }

        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![Arc::new(ids.finish()) as _, Arc::new(symbols.finish())],
        )?;
        writer.write(&batch)?;
        writer.flush()?;
    }
    writer.close()?;
    Ok(())
}
