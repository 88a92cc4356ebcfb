pub mod backup;
pub mod batch;
pub mod cli;
pub mod constants;
pub mod error;
pub mod formats;
pub mod logger;
pub mod processing;
pub mod utils;

#[cfg(test)]
mod test_support;

pub use backup::{process_backups, BackupAction, BackupSummary};
pub use batch::{compress_path, resolve_targets, BatchSummary, Targets};
pub use error::{CompressionError, Result};
pub use formats::ImageKind;
pub use processing::{
    compress_file, encode_jpeg, optimize_png, CompressionOptions, CompressionOutcome,
    CompressionTask, SkipReason,
};
