//! Image fixtures for unit tests.
use crate::processing::encode_jpeg;
use image::codecs::png::{CompressionType, FilterType as PngFilterType, PngEncoder};
use image::{DynamicImage, RgbImage};
use std::fs;
use std::path::{Path, PathBuf};

/// Gradient with deterministic noise, so encoders have something to chew on.
pub fn textured_image(width: u32, height: u32) -> DynamicImage {
    let mut seed: u32 = 0x2545_f491;
    let img = RgbImage::from_fn(width, height, |x, y| {
        seed = seed.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        let noise = (seed >> 24) as u8 & 0x3f;
        image::Rgb([
            (x * 4) as u8 ^ noise,
            (y * 4) as u8 ^ noise,
            ((x + y) * 2) as u8,
        ])
    });
    DynamicImage::ImageRgb8(img)
}

pub fn write_jpeg(dir: &Path, name: &str, quality: u8) -> PathBuf {
    let path = dir.join(name);
    let bytes = encode_jpeg(&textured_image(96, 64), quality).unwrap();
    fs::write(&path, bytes).unwrap();
    path
}

/// A PNG written with the fastest deflate and no filtering.
pub fn write_fast_png(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    let mut bytes = Vec::new();
    let encoder =
        PngEncoder::new_with_quality(&mut bytes, CompressionType::Fast, PngFilterType::NoFilter);
    textured_image(96, 64).write_with_encoder(encoder).unwrap();
    fs::write(&path, bytes).unwrap();
    path
}
