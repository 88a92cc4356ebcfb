use crate::backup::BackupAction;
use crate::constants::DEFAULT_QUALITY;
use crate::logger::Verbosity;
use clap::error::ErrorKind;
use clap::parser::ValueSource;
use clap::{ArgMatches, CommandFactory, FromArgMatches, Parser, ValueEnum};
use std::ffi::OsString;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "compressimages",
    about = "Reduce file size of PNG and JPEG images.",
    long_about = "Re-encodes JPEG and PNG images in place. JPEGs are re-encoded at the given \
                  quality, PNGs are losslessly re-optimized. A file is only replaced when the \
                  new encoding is smaller. Directories are processed recursively.",
    version,
    after_help = "EXAMPLES:\n  \
    compressimages photo.jpg\n  \
    compressimages ./pictures -q 60 --backup\n  \
    compressimages ./pictures --mode restore-backup"
)]
pub struct Args {
    #[arg(help = "File or directory name")]
    pub path: PathBuf,

    #[arg(
        short = 'q',
        long,
        default_value_t = DEFAULT_QUALITY,
        value_parser = clap::value_parser!(u8).range(1..=100),
        help = "Compression quality (1-100, default: 75)",
        long_help = "JPEG quality from 1 (smallest) to 100 (best). \
                     For PNG: >=90 uses Zopfli, >=70 uses high deflate effort, <70 standard effort."
    )]
    pub quality: u8,

    #[arg(
        long,
        value_enum,
        default_value_t = Mode::Compress,
        help = "Mode to run with",
        long_help = "compress: compress the image(s). \
                     restore-backup: restore the backup images (directories only). \
                     delete-backup: delete the backup images (directories only)."
    )]
    pub mode: Mode,

    #[arg(
        long,
        help = "Keep originals as compressimages-backup-<name>",
        long_help = "Before replacing an image, keep the original next to it as \
                     compressimages-backup-<name>. Use --mode restore-backup or \
                     --mode delete-backup on the directory afterwards."
    )]
    pub backup: bool,

    #[arg(long, conflicts_with = "verbose", help = "Only print errors")]
    pub quiet: bool,

    #[arg(short = 'v', long, help = "Print extra detail per file")]
    pub verbose: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Compress,
    RestoreBackup,
    DeleteBackup,
}

impl Mode {
    pub fn backup_action(self) -> Option<BackupAction> {
        match self {
            Mode::Compress => None,
            Mode::RestoreBackup => Some(BackupAction::Restore),
            Mode::DeleteBackup => Some(BackupAction::Delete),
        }
    }
}

impl Args {
    /// Parses the process arguments, exiting with usage on error.
    pub fn parse_checked() -> Self {
        Self::try_parse_checked_from(std::env::args_os()).unwrap_or_else(|e| e.exit())
    }

    /// Like `try_parse_from`, but also rejects compress-only flags given
    /// together with a backup mode.
    pub fn try_parse_checked_from<I, T>(itr: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = Self::command().try_get_matches_from(itr)?;
        let args = Self::from_arg_matches(&matches)?;
        args.check_mode_flags(&matches)?;
        Ok(args)
    }

    fn check_mode_flags(&self, matches: &ArgMatches) -> Result<(), clap::Error> {
        let Some(action) = self.mode.backup_action() else {
            return Ok(());
        };

        for flag in ["quality", "backup"] {
            if matches.value_source(flag) == Some(ValueSource::CommandLine) {
                return Err(Self::command().error(
                    ErrorKind::ArgumentConflict,
                    format!("--{} cannot be used with '--mode {}'", flag, action),
                ));
            }
        }
        Ok(())
    }

    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else if self.verbose {
            Verbosity::Verbose
        } else {
            Verbosity::Normal
        }
    }
}
