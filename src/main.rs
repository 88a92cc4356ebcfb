use anyhow::{Context, Result};
use compressimages::cli::{Args, Mode};
use compressimages::{compress_path, logger, process_backups, CompressionOptions};

fn main() -> Result<()> {
    let args = Args::parse_checked();
    logger::set_verbosity(args.verbosity());

    match args.mode.backup_action() {
        None => {
            let options = CompressionOptions::new(Some(args.quality), args.backup)?;
            compress_path(&args.path, &options)
                .with_context(|| format!("Cannot compress {:?}", args.path))?;
        }
        Some(action) => {
            let summary = process_backups(&args.path, action)
                .with_context(|| format!("Cannot {} in {:?}", action, args.path))?;
            let verb = if args.mode == Mode::RestoreBackup {
                "restored"
            } else {
                "deleted"
            };
            compressimages::info!("\nSuccessfully {} backup file count: {}", verb, summary.processed);
            if summary.failed > 0 {
                compressimages::warn!("Failed backup files: {}", summary.failed);
            }
        }
    }

    Ok(())
}
