//! Optional backups of the originals, and the passes that restore or drop them.
use crate::constants::BACKUP_PREFIX;
use crate::error::{CompressionError, Result};
use crate::utils::create_progress_spinner;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackupAction {
    /// Move each backup back over its original name.
    Restore,
    Delete,
}

impl fmt::Display for BackupAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackupAction::Restore => write!(f, "restore-backup"),
            BackupAction::Delete => write!(f, "delete-backup"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BackupSummary {
    pub processed: usize,
    pub failed: usize,
}

/// `dir/photo.jpg` -> `dir/compressimages-backup-photo.jpg`
pub fn backup_path_for(path: &Path) -> Option<PathBuf> {
    let name = path.file_name()?.to_str()?;
    Some(path.with_file_name(format!("{}{}", BACKUP_PREFIX, name)))
}

/// Inverse of [`backup_path_for`]; `None` for anything that is not a backup.
pub fn original_path_for(backup: &Path) -> Option<PathBuf> {
    let name = backup.file_name()?.to_str()?;
    let original = name.strip_prefix(BACKUP_PREFIX)?;
    if original.is_empty() {
        return None;
    }
    Some(backup.with_file_name(original))
}

pub fn is_backup_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.starts_with(BACKUP_PREFIX))
        .unwrap_or(false)
}

/// Restores or deletes every backup under `dir`. Per-file failures are
/// reported and counted; only a bad `dir` is fatal.
pub fn process_backups(dir: &Path, action: BackupAction) -> Result<BackupSummary> {
    if !dir.exists() {
        return Err(CompressionError::FileNotFound(dir.to_path_buf()));
    }
    if !dir.is_dir() {
        return Err(CompressionError::InvalidArgument(format!(
            "Mode \"{}\" supported on directories only",
            action
        )));
    }

    let pb = create_progress_spinner("Looking for backups...");
    let mut summary = BackupSummary::default();

    for entry in WalkDir::new(dir) {
        let result = entry
            .map_err(CompressionError::from)
            .and_then(|entry| {
                let path = entry.path();
                if !entry.file_type().is_file() || !is_backup_file(path) {
                    return Ok(false);
                }
                pb.set_message(format!("{:?}", path));
                apply(path, action).map(|()| true)
            });

        match result {
            Ok(true) => summary.processed += 1,
            Ok(false) => {}
            Err(e) => {
                pb.suspend(|| crate::error!("Failed to {} file: {}", action, e));
                summary.failed += 1;
            }
        }
    }

    pb.finish_and_clear();
    Ok(summary)
}

fn apply(backup: &Path, action: BackupAction) -> Result<()> {
    match action {
        BackupAction::Restore => {
            let original = original_path_for(backup).ok_or_else(|| {
                CompressionError::InvalidArgument(format!("{:?} is not a backup file", backup))
            })?;
            fs::rename(backup, &original)?;
            crate::verbose!("Restored {:?}", original);
        }
        BackupAction::Delete => {
            fs::remove_file(backup)?;
            crate::verbose!("Deleted {:?}", backup);
        }
    }
    Ok(())
}
