pub const DEFAULT_QUALITY: u8 = 75;
pub const MIN_QUALITY: u8 = 1;
pub const MAX_QUALITY: u8 = 100;

/// Extensions (lowercase) picked up when walking a directory.
pub const SUPPORTED_IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// File name prefix given to originals kept with `--backup`.
pub const BACKUP_PREFIX: &str = "compressimages-backup-";

// PNG deflate effort, picked from the quality setting
pub const ZOPFLI_QUALITY_THRESHOLD: u8 = 90;
pub const HIGH_EFFORT_QUALITY_THRESHOLD: u8 = 70;
pub const ZOPFLI_ITERATIONS: u8 = 15;
pub const LIBDEFLATER_HIGH_LEVEL: u8 = 12;
pub const LIBDEFLATER_LOW_LEVEL: u8 = 8;
pub const OXIPNG_PRESET: u8 = 4;

pub const PROGRESS_SPINNER_TEMPLATE: &str = "{spinner:.green} {msg}";
