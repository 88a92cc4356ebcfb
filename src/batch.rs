use crate::backup::is_backup_file;
use crate::error::{CompressionError, Result};
use crate::formats::has_supported_extension;
use crate::processing::{
    compress_file, CompressionOptions, CompressionOutcome, CompressionTask, SkipReason,
};
use crate::utils::{calculate_savings_ratio, create_progress_spinner, format_file_size};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use walkdir::WalkDir;

/// Lazy, single-pass sequence of files to compress.
///
/// A file path yields itself whatever its extension. A directory yields
/// every regular file below it with a `jpg`, `jpeg` or `png` extension,
/// in whatever order the directory walk produces them. Symlinks are not
/// followed and backup copies are never yielded.
pub struct Targets {
    inner: TargetsInner,
}

enum TargetsInner {
    Single(Option<PathBuf>),
    Walk(walkdir::IntoIter),
}

impl Iterator for Targets {
    type Item = Result<PathBuf>;

    fn next(&mut self) -> Option<Self::Item> {
        match &mut self.inner {
            TargetsInner::Single(path) => path.take().map(Ok),
            TargetsInner::Walk(walker) => loop {
                match walker.next()? {
                    Err(e) => return Some(Err(e.into())),
                    Ok(entry) => {
                        let path = entry.path();
                        if entry.file_type().is_file()
                            && has_supported_extension(path)
                            && !is_backup_file(path)
                        {
                            return Some(Ok(entry.into_path()));
                        }
                    }
                }
            },
        }
    }
}

pub fn resolve_targets(input: &Path) -> Result<Targets> {
    if !input.exists() {
        return Err(CompressionError::FileNotFound(input.to_path_buf()));
    }

    let canonical_input = input
        .canonicalize()
        .map_err(|_| CompressionError::FileNotFound(input.to_path_buf()))?;

    let inner = if canonical_input.is_file() {
        TargetsInner::Single(Some(canonical_input))
    } else if canonical_input.is_dir() {
        TargetsInner::Walk(WalkDir::new(canonical_input).into_iter())
    } else {
        return Err(CompressionError::InvalidArgument(format!(
            "{:?} is neither a file nor a directory",
            input
        )));
    };

    Ok(Targets { inner })
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub compressed: usize,
    pub not_smaller: usize,
    pub skipped: usize,
    pub failed: usize,
    /// Bytes before and after, over compressed files only.
    pub bytes_before: u64,
    pub bytes_after: u64,
}

impl BatchSummary {
    pub fn record(&mut self, outcome: &CompressionOutcome) {
        match outcome {
            CompressionOutcome::Compressed {
                original_size,
                compressed_size,
                ..
            } => {
                self.compressed += 1;
                self.bytes_before += original_size;
                self.bytes_after += compressed_size;
            }
            CompressionOutcome::NotSmaller { .. } => self.not_smaller += 1,
            CompressionOutcome::Skipped(_) => self.skipped += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.compressed + self.not_smaller + self.skipped + self.failed
    }

    pub fn savings_ratio(&self) -> f64 {
        calculate_savings_ratio(self.bytes_before, self.bytes_after)
    }
}

/// Compresses a file or every image under a directory, one at a time.
///
/// Only a missing or unusable `input` is fatal. Per-file failures are
/// reported, counted in the summary and the batch moves on.
pub fn compress_path(input: &Path, options: &CompressionOptions) -> Result<BatchSummary> {
    let start_time = Instant::now();
    let targets = resolve_targets(input)?;

    crate::verbose!("Compressing {:?} at quality {}", input, options.quality);

    let pb = create_progress_spinner("Scanning...");
    let mut summary = BatchSummary::default();

    for target in targets {
        let file = match target {
            Ok(file) => file,
            Err(e) => {
                pb.suspend(|| crate::warn!("Skipping unreadable entry: {}", e));
                summary.failed += 1;
                continue;
            }
        };

        pb.set_message(format!("Compressing {}", file.display()));
        let task = CompressionTask::new(file, options.quality);

        match compress_file(&task, options) {
            Ok(outcome) => {
                pb.suspend(|| report_outcome(&task.path, &outcome));
                summary.record(&outcome);
            }
            Err(e) if e.is_per_file() => {
                pb.suspend(|| crate::warn!("Failure whilst processing {:?}: {}", task.path, e));
                summary.failed += 1;
            }
            Err(e) => {
                pb.finish_and_clear();
                return Err(e);
            }
        }
    }

    pb.finish_and_clear();
    print_summary(&summary, start_time.elapsed());

    Ok(summary)
}

fn report_outcome(path: &Path, outcome: &CompressionOutcome) {
    match outcome {
        CompressionOutcome::Compressed {
            kind,
            original_size,
            compressed_size,
        } => {
            crate::info!(
                "✅ {:?} ({}): {} -> {} ({:.1}% smaller)",
                path,
                kind,
                format_file_size(*original_size),
                format_file_size(*compressed_size),
                calculate_savings_ratio(*original_size, *compressed_size)
            );
        }
        CompressionOutcome::NotSmaller {
            original_size,
            encoded_size,
            ..
        } => {
            crate::info!("Cannot further compress {:?}.", path);
            crate::verbose!(
                "Re-encoded size {} is not below {}",
                format_file_size(*encoded_size),
                format_file_size(*original_size)
            );
        }
        CompressionOutcome::Skipped(SkipReason::ReadOnly) => {
            crate::info!("Ignoring read-only file {:?}.", path);
        }
    }
}

fn print_summary(summary: &BatchSummary, elapsed: Duration) {
    crate::info!("\n📊 Compression Summary:");
    crate::info!("  📁 Files examined: {}", summary.total());
    crate::info!(
        "  ✅ Successfully updated file count: {}",
        summary.compressed
    );
    crate::info!("  ➖ Could not compress further: {}", summary.not_smaller);
    if summary.skipped > 0 {
        crate::info!("  ⏭️  Skipped: {}", summary.skipped);
    }
    if summary.failed > 0 {
        crate::info!("  ⚠️  Failed files: {}", summary.failed);
    }
    if summary.compressed > 0 {
        crate::info!(
            "  📦 Size of updated files: {} -> {} ({:.1}% saved)",
            format_file_size(summary.bytes_before),
            format_file_size(summary.bytes_after),
            summary.savings_ratio()
        );
    }
    crate::info!("  ⏱️  Total time: {:?}", elapsed);
}
