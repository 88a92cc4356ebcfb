#![allow(dead_code)]

use compressimages::encode_jpeg;
use image::codecs::png::{CompressionType, FilterType as PngFilterType, PngEncoder};
use image::{DynamicImage, RgbImage};

/// Gradient with deterministic noise.
pub fn textured_image(width: u32, height: u32) -> DynamicImage {
    let mut seed: u32 = 0x9e37_79b9;
    let img = RgbImage::from_fn(width, height, |x, y| {
        seed = seed.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        let noise = (seed >> 24) as u8 & 0x3f;
        image::Rgb([
            (x * 3) as u8 ^ noise,
            (y * 5) as u8 ^ noise,
            ((x + y) * 2) as u8,
        ])
    });
    DynamicImage::ImageRgb8(img)
}

pub fn jpeg_bytes(quality: u8) -> Vec<u8> {
    encode_jpeg(&textured_image(128, 96), quality).unwrap()
}

/// A PNG with the fastest deflate and no filtering, which oxipng always beats.
pub fn fast_png_bytes() -> Vec<u8> {
    let mut bytes = Vec::new();
    let encoder =
        PngEncoder::new_with_quality(&mut bytes, CompressionType::Fast, PngFilterType::NoFilter);
    textured_image(128, 96).write_with_encoder(encoder).unwrap();
    bytes
}
