//! End-to-end watermarking run: load → place → composite → save.
//!
//! This is what the `apply` command executes. It drives a [`Session`]
//! through its full lifecycle once and writes the result with the fixed
//! output filename.

use crate::export;
use crate::imaging::{
    BackendError, CompositePlan, Corner, Dimensions, ImageBackend, ImageSource, LoadError,
    RustBackend, WatermarkSettings, load_pair,
};
use crate::session::Session;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApplyError {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error("Image processing failed: {0}")]
    Imaging(#[from] BackendError),
    #[error("Could not save result: {0}")]
    Io(#[from] std::io::Error),
}

/// Everything one run needs.
#[derive(Debug, Clone)]
pub struct ApplyRequest {
    pub source: ImageSource,
    pub watermark: ImageSource,
    pub corner: Corner,
    pub settings: WatermarkSettings,
    pub output_dir: PathBuf,
}

/// Summary of a finished run.
#[derive(Debug, Clone)]
pub struct ApplyOutcome {
    pub source_name: String,
    pub source_dims: Dimensions,
    pub watermark_name: String,
    pub watermark_dims: Dimensions,
    pub plan: CompositePlan,
    pub output_path: PathBuf,
    pub bytes_written: usize,
}

pub fn apply(request: &ApplyRequest) -> Result<ApplyOutcome, ApplyError> {
    apply_with_backend(&RustBackend::new(), request)
}

/// Run the pipeline with a specific backend (allows testing with mock).
pub fn apply_with_backend(
    backend: &impl ImageBackend,
    request: &ApplyRequest,
) -> Result<ApplyOutcome, ApplyError> {
    let (source, watermark) = load_pair(backend, &request.source, &request.watermark)?;

    let source_name = source.name.clone();
    let source_dims = source.dimensions();
    let watermark_name = watermark.name.clone();
    let watermark_dims = watermark.dimensions();

    let session = Session::new(request.settings)
        .select_source(source)
        .select_watermark(watermark)
        .select_corner(request.corner)
        .add_watermark(backend)?;

    let result = session
        .export()
        .ok_or_else(|| BackendError::ProcessingFailed("no composite was produced".into()))?;
    let output_path = export::save(result, &request.output_dir)?;

    Ok(ApplyOutcome {
        source_name,
        source_dims,
        watermark_name,
        watermark_dims,
        plan: result.plan,
        output_path,
        bytes_written: result.png.len(),
    })
}
