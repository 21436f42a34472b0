use std::io::Write;
use std::process::{Command, Stdio};

use filepeek_core::columnar::ColumnStats;
use filepeek_core::transfer::DownloadReport;
use filepeek_core::{FileInfo, RowRecord, Value};
use serde::Serialize;
use snafu::ResultExt;
use tabled::{builder::Builder, settings::Style};

use crate::error::{CliResult, PagerSnafu, SerializeJsonSnafu, WriteOutputSnafu};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
}

pub fn render_table(columns: &[String], rows: &[Vec<String>]) -> String {
    if columns.is_empty() {
        return String::new();
    }

    let mut builder = Builder::default();
    builder.push_record(columns);
    for row in rows {
        builder.push_record(row);
    }

    let mut table = builder.build();
    table.with(Style::rounded());
    table.to_string()
}

/// Columns in first-seen order over all rows; cells missing from a row
/// render empty.
pub fn render_rows(rows: &[RowRecord]) -> String {
    let mut columns: Vec<String> = Vec::new();
    for row in rows {
        for name in row.columns() {
            if !columns.iter().any(|c| c == name) {
                columns.push(name.to_string());
            }
        }
    }

    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            columns
                .iter()
                .map(|c| row.get(c).map(Value::to_string).unwrap_or_default())
                .collect()
        })
        .collect();

    render_table(&columns, &cells)
}

pub fn render_info(info: &FileInfo) -> String {
    let per_column = info
        .compression
        .column_compression
        .iter()
        .map(|(col, codec)| format!("{col}={codec}"))
        .collect::<Vec<_>>()
        .join(", ");

    let fields = [
        ("file_type", info.file_type.clone()),
        ("file_size_bytes", info.file_size_bytes.to_string()),
        ("total_rows", info.total_rows.to_string()),
        ("num_columns", info.num_columns.to_string()),
        ("columns", info.columns.join(", ")),
        ("chunk_count", info.chunk_count.to_string()),
        ("compression", info.compression.overall_compression.clone()),
        ("column_compression", per_column),
    ];

    let rows: Vec<Vec<String>> = fields
        .into_iter()
        .map(|(k, v)| vec![k.to_string(), v])
        .collect();
    render_table(&["field".to_string(), "value".to_string()], &rows)
}

pub fn render_stats(stats: &ColumnStats) -> String {
    let header = [
        "column",
        "type",
        "null_count",
        "total_size",
        "compression",
        "min",
        "max",
        "samples",
    ]
    .map(String::from);

    let opt = |v: &Option<Value>| v.as_ref().map(Value::to_string).unwrap_or_default();
    let rows: Vec<Vec<String>> = stats
        .iter()
        .map(|c| {
            let ty = match &c.logical_type {
                Some(logical) => format!("{} ({logical})", c.physical_type),
                None => c.physical_type.clone(),
            };
            let samples = c
                .sample_values
                .iter()
                .map(Value::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            vec![
                c.name.clone(),
                ty,
                c.null_count.to_string(),
                c.total_size.to_string(),
                c.overall_compression.clone(),
                opt(&c.min_value),
                opt(&c.max_value),
                samples,
            ]
        })
        .collect();

    let mut out = render_table(&header, &rows);
    if let Some(partial) = stats.partial() {
        out.push_str(&format!("\n(samples unavailable: {})", partial.reason));
    }
    out
}

pub fn render_report(report: &DownloadReport) -> String {
    let mut out = String::new();
    for file in &report.files {
        out.push_str(&format!("downloaded: {}\n", file.display()));
    }
    for key in &report.skipped {
        out.push_str(&format!("skipped folder: {key}\n"));
    }
    out.push_str(&format!(
        "files: {}\ntotal_bytes: {}",
        report.files.len(),
        report.total_bytes
    ));
    out
}

pub fn write_json<T: Serialize, W: Write>(value: &T, out: &mut W) -> CliResult<()> {
    serde_json::to_writer_pretty(&mut *out, value).context(SerializeJsonSnafu)?;
    writeln!(out).context(WriteOutputSnafu)?;
    Ok(())
}

/// Print `text` to stdout, or through `less -S` when `pager` is set.
pub fn emit(text: &str, pager: bool) -> CliResult<()> {
    if pager {
        return page_output(text);
    }
    let mut stdout = std::io::stdout();
    writeln!(stdout, "{text}").context(WriteOutputSnafu)
}

pub fn page_output(text: &str) -> CliResult<()> {
    let mut child = match Command::new("less").arg("-S").stdin(Stdio::piped()).spawn() {
        Ok(child) => child,
        Err(_) => {
            let mut stdout = std::io::stdout();
            return writeln!(stdout, "{text}").context(WriteOutputSnafu);
        }
    };

    if let Some(stdin) = child.stdin.as_mut() {
        stdin.write_all(text.as_bytes()).context(PagerSnafu)?;
    }

    child.wait().context(PagerSnafu)?;
    Ok(())
}
