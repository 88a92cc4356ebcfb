use crate::backup::backup_path_for;
use crate::constants::{
    DEFAULT_QUALITY, HIGH_EFFORT_QUALITY_THRESHOLD, LIBDEFLATER_HIGH_LEVEL, LIBDEFLATER_LOW_LEVEL,
    MAX_QUALITY, MIN_QUALITY, OXIPNG_PRESET, ZOPFLI_ITERATIONS, ZOPFLI_QUALITY_THRESHOLD,
};
use crate::error::{CompressionError, Result};
use crate::formats::ImageKind;
use image::codecs::jpeg::JpegEncoder;
use image::error::{ImageFormatHint, UnsupportedError, UnsupportedErrorKind};
use image::{ColorType, DynamicImage, ImageError, ImageReader};
use oxipng::{Deflaters, Options};
use std::fmt;
use std::fs;
use std::io::{self, Cursor, Write};
use std::num::NonZeroU8;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressionOptions {
    pub quality: u8,
    /// Keep the original next to the file as `compressimages-backup-<name>`.
    pub backup: bool,
}

impl CompressionOptions {
    pub fn new(quality: Option<u8>, backup: bool) -> Result<Self> {
        let quality = quality.unwrap_or(DEFAULT_QUALITY);
        if !(MIN_QUALITY..=MAX_QUALITY).contains(&quality) {
            return Err(CompressionError::InvalidQuality(quality));
        }

        Ok(Self { quality, backup })
    }
}

impl Default for CompressionOptions {
    fn default() -> Self {
        Self {
            quality: DEFAULT_QUALITY,
            backup: false,
        }
    }
}

/// A single file slated for compression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressionTask {
    pub path: PathBuf,
    /// Format implied by the extension. The file content has the final say.
    pub expected_kind: Option<ImageKind>,
    pub quality: u8,
}

impl CompressionTask {
    pub fn new(path: PathBuf, quality: u8) -> Self {
        let expected_kind = ImageKind::from_path(&path);
        Self {
            path,
            expected_kind,
            quality,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The owner cannot write the file.
    ReadOnly,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::ReadOnly => write!(f, "read-only file"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompressionOutcome {
    /// The file was replaced by a smaller encoding.
    Compressed {
        kind: ImageKind,
        original_size: u64,
        compressed_size: u64,
    },
    /// Re-encoding did not help; the file is untouched.
    NotSmaller {
        kind: ImageKind,
        original_size: u64,
        encoded_size: u64,
    },
    Skipped(SkipReason),
}

/// Re-encodes one file in place, keeping the result only when it is smaller.
///
/// The file content decides the codec, so a JPEG saved as `.png` is
/// re-encoded as a JPEG. Content that is not JPEG or PNG, or that does not
/// decode, fails with [`CompressionError::Codec`] and is left untouched.
pub fn compress_file(
    task: &CompressionTask,
    options: &CompressionOptions,
) -> Result<CompressionOutcome> {
    let path = task.path.as_path();
    let metadata = fs::metadata(path)?;
    if is_read_only(&metadata.permissions()) {
        return Ok(CompressionOutcome::Skipped(SkipReason::ReadOnly));
    }

    let original = fs::read(path)?;
    let original_size = original.len() as u64;

    let reader = ImageReader::new(Cursor::new(original.as_slice())).with_guessed_format()?;
    let kind = match reader.format() {
        Some(format) => match ImageKind::from_image_format(format) {
            Some(kind) => kind,
            None => {
                let hint = ImageFormatHint::Exact(format);
                return Err(codec_error(path, unsupported_format(hint)));
            }
        },
        None => {
            return Err(codec_error(path, unsupported_format(ImageFormatHint::Unknown)));
        }
    };

    if task.expected_kind.is_some_and(|expected| expected != kind) {
        crate::verbose!("{:?} holds {} data despite its extension", path, kind);
    }

    let decoded = reader.decode().map_err(|source| codec_error(path, source))?;

    let encoded = match kind {
        ImageKind::Jpeg => {
            encode_jpeg(&decoded, task.quality).map_err(|source| codec_error(path, source))?
        }
        ImageKind::Png => optimize_png(&original, task.quality).map_err(|e| {
            CompressionError::PngOptimization {
                path: path.to_path_buf(),
                message: e.to_string(),
            }
        })?,
    };
    let encoded_size = encoded.len() as u64;

    if encoded_size >= original_size {
        return Ok(CompressionOutcome::NotSmaller {
            kind,
            original_size,
            encoded_size,
        });
    }

    replace_file(path, &encoded, metadata.permissions(), options.backup)?;

    Ok(CompressionOutcome::Compressed {
        kind,
        original_size,
        compressed_size: encoded_size,
    })
}

/// Baseline JPEG at `quality`. Alpha is dropped, greyscale stays greyscale.
pub fn encode_jpeg(img: &DynamicImage, quality: u8) -> image::ImageResult<Vec<u8>> {
    let mut buffer = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut buffer, quality);

    match img.color() {
        ColorType::L8 | ColorType::Rgb8 => img.write_with_encoder(encoder)?,
        ColorType::L16 | ColorType::La8 | ColorType::La16 => {
            DynamicImage::ImageLuma8(img.to_luma8()).write_with_encoder(encoder)?
        }
        _ => DynamicImage::ImageRgb8(img.to_rgb8()).write_with_encoder(encoder)?,
    }

    Ok(buffer)
}

/// Lossless PNG re-optimization; `quality` only picks the deflate effort.
pub fn optimize_png(data: &[u8], quality: u8) -> std::result::Result<Vec<u8>, oxipng::PngError> {
    let mut options = Options::from_preset(OXIPNG_PRESET);
    options.deflate = png_deflater(quality);
    oxipng::optimize_from_memory(data, &options)
}

fn png_deflater(quality: u8) -> Deflaters {
    let high = Deflaters::Libdeflater {
        compression: LIBDEFLATER_HIGH_LEVEL,
    };

    if quality >= ZOPFLI_QUALITY_THRESHOLD {
        NonZeroU8::new(ZOPFLI_ITERATIONS)
            .map(|iterations| Deflaters::Zopfli { iterations })
            .unwrap_or(high)
    } else if quality >= HIGH_EFFORT_QUALITY_THRESHOLD {
        high
    } else {
        Deflaters::Libdeflater {
            compression: LIBDEFLATER_LOW_LEVEL,
        }
    }
}

/// Atomically swaps `contents` in for `path`, preserving its permissions.
fn replace_file(
    path: &Path,
    contents: &[u8],
    permissions: fs::Permissions,
    backup: bool,
) -> Result<()> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut temp = NamedTempFile::new_in(dir)?;
    temp.write_all(contents)?;
    temp.as_file().sync_all()?;
    fs::set_permissions(temp.path(), permissions)?;

    if backup {
        let backup_path = backup_path_for(path).ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, "path has no file name")
        })?;

        // An existing backup already holds the oldest original.
        if !backup_path.exists() {
            fs::rename(path, &backup_path)?;
            if let Err(err) = temp.persist(path) {
                // The persist error is the one returned; a failed rollback is only reported.
                let _ = roll_back_backup(&backup_path, path);
                return Err(err.error.into());
            }
            return Ok(());
        }
    }

    temp.persist(path).map_err(|err| err.error)?;
    Ok(())
}

/// Moves a backup back over `original` after a failed swap.
fn roll_back_backup(backup_path: &Path, original: &Path) -> io::Result<()> {
    fs::rename(backup_path, original).inspect_err(|e| {
        crate::error!(
            "Could not move the original back to {:?}, it is still at {:?}: {}",
            original,
            backup_path,
            e
        )
    })
}

/// Only the owner's write bit counts, the way `stat` callers test `S_IWRITE`.
#[cfg(unix)]
fn is_read_only(permissions: &fs::Permissions) -> bool {
    use std::os::unix::fs::PermissionsExt;
    permissions.mode() & 0o200 == 0
}

#[cfg(not(unix))]
fn is_read_only(permissions: &fs::Permissions) -> bool {
    permissions.readonly()
}

fn unsupported_format(hint: ImageFormatHint) -> ImageError {
    ImageError::Unsupported(UnsupportedError::from_format_and_kind(
        hint.clone(),
        UnsupportedErrorKind::Format(hint),
    ))
}

fn codec_error(path: &Path, source: ImageError) -> CompressionError {
    CompressionError::Codec {
        path: path.to_path_buf(),
        source,
    }
}
