//! High-level image operations.
//!
//! These functions combine calculations with backend execution: load a file
//! into a raster, plan where the watermark goes, draw it, and encode the
//! result. They take settings, compute parameters, and call the backend.

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::calculations::{Corner, Placement, resolve_placement};
use super::media::{MediaKind, supported_input_extensions};
use super::params::{CompositeParams, Opacity, Scale};
use image::DynamicImage;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("could not read file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error(
        "{0}: please supply an image file for the watermark ({exts})",
        exts = supported_input_extensions().join(", ")
    )]
    NotAnImage(String),
    #[error("{0}: video files are not supported, please supply a still image")]
    VideoNotSupported(String),
    #[error("could not read file {name}: {source}")]
    Decode { name: String, source: BackendError },
}

/// Where a user-supplied image comes from.
#[derive(Debug, Clone)]
pub enum ImageSource {
    Path(PathBuf),
    Bytes { name: String, data: Vec<u8> },
}

impl ImageSource {
    pub fn path(path: impl Into<PathBuf>) -> Self {
        Self::Path(path.into())
    }

    /// Display name: the file name for paths, the given name for bytes.
    pub fn name(&self) -> String {
        match self {
            Self::Path(p) => p
                .file_name()
                .map(|f| f.to_string_lossy().into_owned())
                .unwrap_or_else(|| p.display().to_string()),
            Self::Bytes { name, .. } => name.clone(),
        }
    }
}

/// Which input a file is being loaded into. The slots accept different media.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// The photo being watermarked.
    Source,
    /// The watermark itself. Images only.
    Watermark,
}

/// A decoded input image and the name it was loaded under.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedImage {
    pub name: String,
    pub image: DynamicImage,
}

impl LoadedImage {
    pub fn dimensions(&self) -> Dimensions {
        Dimensions::of(&self.image)
    }
}

/// Read, classify and decode an input for the given slot.
///
/// The raw bytes are dropped as soon as decoding finishes.
pub fn load_image(
    backend: &impl ImageBackend,
    source: &ImageSource,
    slot: Slot,
) -> std::result::Result<LoadedImage, LoadError> {
    let name = source.name();
    let owned;
    let data: &[u8] = match source {
        ImageSource::Path(path) => {
            owned = std::fs::read(path).map_err(|e| LoadError::Io {
                path: path.clone(),
                source: e,
            })?;
            &owned
        }
        ImageSource::Bytes { data, .. } => data,
    };

    match (slot, MediaKind::detect(&name, data)) {
        (Slot::Watermark, kind) if !kind.is_image() => {
            log::warn!("rejected watermark {name}: not an image");
            return Err(LoadError::NotAnImage(name));
        }
        (Slot::Source, MediaKind::Video) => {
            return Err(LoadError::VideoNotSupported(name));
        }
        _ => {}
    }

    let image = backend
        .decode(data)
        .map_err(|e| LoadError::Decode {
            name: name.clone(),
            source: e,
        })?;
    log::debug!(
        "loaded {:?} {name} ({})",
        slot,
        Dimensions::of(&image)
    );
    Ok(LoadedImage { name, image })
}

/// Load the source and the watermark in parallel.
pub fn load_pair(
    backend: &impl ImageBackend,
    source: &ImageSource,
    watermark: &ImageSource,
) -> std::result::Result<(LoadedImage, LoadedImage), LoadError> {
    let (source, watermark) = rayon::join(
        || load_image(backend, source, Slot::Source),
        || load_image(backend, watermark, Slot::Watermark),
    );
    Ok((source?, watermark?))
}

/// How the watermark is sized and blended.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WatermarkSettings {
    pub scale: Scale,
    pub opacity: Opacity,
}

/// The drawing plan for one run: where the watermark lands, in both
/// fractional and whole pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompositePlan {
    pub corner: Corner,
    pub placement: Placement,
    pub params: CompositeParams,
}

/// Plan a composite without executing it.
pub fn plan_composite(
    base: Dimensions,
    watermark: Dimensions,
    corner: Corner,
    settings: &WatermarkSettings,
) -> CompositePlan {
    let placement = resolve_placement(corner, base, watermark, settings.scale);
    CompositePlan {
        corner,
        placement,
        params: placement.to_params(settings.opacity),
    }
}

/// Draw the watermark onto a copy of the base.
pub fn compose(
    backend: &impl ImageBackend,
    base: &DynamicImage,
    watermark: &DynamicImage,
    plan: &CompositePlan,
) -> Result<DynamicImage> {
    log::debug!(
        "compositing {}x{} watermark at ({}, {}) on {}",
        plan.params.width,
        plan.params.height,
        plan.params.x,
        plan.params.y,
        Dimensions::of(base)
    );
    backend.composite(base, watermark, &plan.params)
}

/// Encoded output of one run.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositeResult {
    /// PNG-encoded composite.
    pub png: Vec<u8>,
    /// Equal to the base image's dimensions.
    pub dimensions: Dimensions,
    pub plan: CompositePlan,
}

/// Encode a composited raster as PNG.
pub fn export_png(
    backend: &impl ImageBackend,
    raster: &DynamicImage,
    plan: CompositePlan,
) -> Result<CompositeResult> {
    let png = backend.encode_png(raster)?;
    Ok(CompositeResult {
        png,
        dimensions: Dimensions::of(raster),
        plan,
    })
}

/// Plan, draw and encode in one step.
pub fn watermark_image(
    backend: &impl ImageBackend,
    base: &DynamicImage,
    watermark: &DynamicImage,
    corner: Corner,
    settings: &WatermarkSettings,
) -> Result<CompositeResult> {
    let plan = plan_composite(
        Dimensions::of(base),
        Dimensions::of(watermark),
        corner,
        settings,
    );
    let raster = compose(backend, base, watermark, &plan)?;
    export_png(backend, &raster, plan)
}
