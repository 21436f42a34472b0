use filepeek_core::ReaderError;
use filepeek_core::transfer::TransferError;

use snafu::Snafu;

pub type CliResult<T> = std::result::Result<T, CliError>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum CliError {
    #[snafu(display("Failed to open {path}: {source}"))]
    OpenFile { path: String, source: ReaderError },

    #[snafu(display("Failed to read {path}: {source}"))]
    ReadFile { path: String, source: ReaderError },

    #[snafu(display("Failed to pull '{prefix}' from {bucket}: {source}"))]
    Pull {
        bucket: String,
        prefix: String,
        #[snafu(source(from(TransferError, Box::new)))]
        source: Box<TransferError>,
    },

    #[snafu(display("Failed to serialize output as JSON: {source}"))]
    SerializeJson { source: serde_json::Error },

    #[snafu(display("Failed to write output: {source}"))]
    WriteOutput { source: std::io::Error },

    #[snafu(display("Failed to run pager: {source}"))]
    Pager { source: std::io::Error },
}
