//! Shared test utilities for the simple-mark test suite.
//!
//! Fixtures are generated on the fly instead of checked in: small synthetic
//! rasters and their encoded bytes, plus writers that drop them into a temp
//! directory.
//!
//! # Usage
//!
//! ```rust,ignore
//! use crate::test_helpers::*;
//!
//! let tmp = tempfile::TempDir::new().unwrap();
//! let photo = write_png(tmp.path(), "photo.png", 1000, 500);
//! let logo = write_png(tmp.path(), "logo.png", 200, 100);
//! ```

use image::{DynamicImage, ImageEncoder, RgbImage, RgbaImage};
use std::path::{Path, PathBuf};

/// A gradient image so resize and blend bugs show up as visible differences.
fn gradient(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        image::Rgba([(x % 256) as u8, (y % 256) as u8, 128, 255])
    })
}

/// A single-color RGBA image.
pub fn solid_rgba(width: u32, height: u32, color: [u8; 4]) -> DynamicImage {
    DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, image::Rgba(color)))
}

/// PNG-encoded gradient of the given size.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = gradient(width, height);
    let mut out = Vec::new();
    image::codecs::png::PngEncoder::new(&mut out)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgba8)
        .unwrap();
    out
}

/// JPEG-encoded gradient of the given size.
pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    let mut out = Vec::new();
    image::codecs::jpeg::JpegEncoder::new(&mut out)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .unwrap();
    out
}

/// Write a PNG gradient into `dir` and return its path.
pub fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, png_bytes(width, height)).unwrap();
    path
}
