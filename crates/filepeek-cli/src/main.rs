//! CLI tool for inspecting Parquet, JSON and text files.

mod error;
mod output;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use filepeek_core::transfer::{LocalBucket, download_prefix};
use filepeek_core::{FileReader, ReaderOptions};
use serde::Serialize;
use snafu::ResultExt;

use crate::{
    error::{CliResult, OpenFileSnafu, PullSnafu, ReadFileSnafu},
    output::{
        OutputFormat, emit, render_info, render_report, render_rows, render_stats, write_json,
    },
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormatArg {
    Table,
    Json,
}

impl From<OutputFormatArg> for OutputFormat {
    fn from(v: OutputFormatArg) -> Self {
        match v {
            OutputFormatArg::Table => OutputFormat::Table,
            OutputFormatArg::Json => OutputFormat::Json,
        }
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Show file type, size, row and column counts, chunks and compression
    Info { path: PathBuf },

    /// Show the first rows of a file
    Head {
        path: PathBuf,

        #[arg(short = 'n', long, default_value_t = 10)]
        rows: i64,
    },

    /// Show an arbitrary row window
    Slice {
        path: PathBuf,

        /// First row (0-based)
        #[arg(long)]
        start: i64,

        #[arg(short = 'n', long, default_value_t = 10)]
        rows: i64,
    },

    /// Show per-column statistics (Parquet only; empty for other formats)
    Stats {
        path: PathBuf,

        /// Rows read from the start of the file for sample values
        #[arg(long, default_value_t = ReaderOptions::DEFAULT_SAMPLE_ROWS)]
        sample_rows: u64,

        /// Sample values kept per column
        #[arg(long, default_value_t = ReaderOptions::DEFAULT_SAMPLE_VALUES)]
        sample_values: usize,
    },

    /// Download every object under a prefix from a bucket directory
    Pull {
        #[arg(long)]
        bucket: PathBuf,

        #[arg(long, default_value = "")]
        prefix: String,

        #[arg(long)]
        dest: PathBuf,
    },
}

#[derive(Debug, Parser)]
#[command(name = "filepeek", version, about)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,

    #[arg(long, global = true, value_enum, default_value_t = OutputFormatArg::Table)]
    output: OutputFormatArg,

    /// Page table output through `less -S` (no truncation; horizontal scroll)
    #[arg(long, global = true, default_value_t = false)]
    pager: bool,
}

struct Printer {
    format: OutputFormat,
    pager: bool,
}

impl Printer {
    fn print<T: Serialize>(&self, value: &T, render: impl FnOnce(&T) -> String) -> CliResult<()> {
        match self.format {
            OutputFormat::Json => write_json(value, &mut std::io::stdout()),
            OutputFormat::Table => emit(&render(value), self.pager),
        }
    }
}

fn open(path: &Path, options: ReaderOptions) -> CliResult<FileReader> {
    FileReader::open_with_options(path, options).context(OpenFileSnafu {
        path: path.display().to_string(),
    })
}

fn cmd_info(path: &Path, out: &Printer) -> CliResult<()> {
    let reader = open(path, ReaderOptions::default())?;
    let info = reader.info().context(ReadFileSnafu {
        path: path.display().to_string(),
    })?;
    out.print(&info, render_info)
}

fn cmd_rows(path: &Path, start: i64, rows: i64, out: &Printer) -> CliResult<()> {
    let reader = open(path, ReaderOptions::default())?;
    let records = reader.read_slice(start, rows).context(ReadFileSnafu {
        path: path.display().to_string(),
    })?;
    out.print(&records, |r| render_rows(r))
}

fn cmd_stats(path: &Path, options: ReaderOptions, out: &Printer) -> CliResult<()> {
    let reader = open(path, options)?;
    let stats = reader.column_stats().context(ReadFileSnafu {
        path: path.display().to_string(),
    })?;
    out.print(&stats, render_stats)
}

fn cmd_pull(bucket: &Path, prefix: &str, dest: &Path, out: &Printer) -> CliResult<()> {
    let source = LocalBucket::new(bucket);
    let report = download_prefix(&source, prefix, dest).context(PullSnafu {
        bucket: bucket.display().to_string(),
        prefix,
    })?;
    out.print(&report, render_report)
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();
    let out = Printer {
        format: cli.output.into(),
        pager: cli.pager,
    };

    match cli.cmd {
        Command::Info { path } => cmd_info(&path, &out),

        Command::Head { path, rows } => cmd_rows(&path, 0, rows, &out),

        Command::Slice { path, start, rows } => cmd_rows(&path, start, rows, &out),

        Command::Stats {
            path,
            sample_rows,
            sample_values,
        } => {
            let options = ReaderOptions::default()
                .with_sample_rows(sample_rows)
                .with_sample_values(sample_values);
            cmd_stats(&path, options, &out)
        }

        Command::Pull {
            bucket,
            prefix,
            dest,
        } => cmd_pull(&bucket, &prefix, &dest, &out),
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    if let Err(e) = run() {
        eprintln!("{e}");
        std::process::exit(1);
    }
}
