//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the three pixel operations every backend
//! must support: decode, composite, and PNG encode.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend): pure Rust on top of the
//! `image` crate. Everything is statically linked into the binary.

use super::params::CompositeParams;
use image::DynamicImage;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Decode failed: {0}")]
    Decode(String),
    #[error("Encode failed: {0}")]
    Encode(String),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Pixel dimensions of a decoded raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn of(image: &DynamicImage) -> Self {
        Self {
            width: image.width(),
            height: image.height(),
        }
    }
}

impl std::fmt::Display for Dimensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Trait for image processing backends.
///
/// Every backend must implement all three operations so the session and
/// pipeline code stay backend-agnostic.
pub trait ImageBackend: Sync {
    /// Decode raw file bytes into a raster.
    fn decode(&self, data: &[u8]) -> Result<DynamicImage, BackendError>;

    /// Draw `base` at the origin of a fresh surface sized to `base`, then draw
    /// `watermark` scaled and blended as described by `params`.
    ///
    /// Neither input is modified.
    fn composite(
        &self,
        base: &DynamicImage,
        watermark: &DynamicImage,
        params: &CompositeParams,
    ) -> Result<DynamicImage, BackendError>;

    /// Encode a raster as PNG bytes.
    fn encode_png(&self, image: &DynamicImage) -> Result<Vec<u8>, BackendError>;
}
