//! The watermarking session: two input slots, a corner, and at most one
//! composited result.
//!
//! A [`Session`] is a plain value. Every transition consumes it and returns
//! the next one, so each stage of the lifecycle can be built and inspected
//! directly in tests:
//!
//! ```text
//! Idle ── select_source ──▶ SourceLoaded ──┐
//!   │                                      ├─ select_* ─▶ Ready ── add_watermark ──▶ Composited
//!   └── select_watermark ─▶ WatermarkLoaded┘                 ▲                           │
//!                                                            └──── select_source / ──────┘
//!                                                                  select_watermark
//! ```
//!
//! Replacing either image drops the previous result; it has to be
//! regenerated before it can be exported again. Changing the corner does
//! **not** re-composite and does not drop the result.

use crate::imaging::{
    BackendError, CompositeResult, Corner, ImageBackend, LoadedImage, WatermarkSettings,
    watermark_image,
};

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    SourceLoaded,
    WatermarkLoaded,
    /// Both images present, nothing composited yet.
    Ready,
    Composited,
}

#[derive(Debug, Clone, Default)]
pub struct Session {
    source: Option<LoadedImage>,
    watermark: Option<LoadedImage>,
    corner: Corner,
    settings: WatermarkSettings,
    result: Option<CompositeResult>,
}

impl Session {
    pub fn new(settings: WatermarkSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    pub fn stage(&self) -> Stage {
        match (&self.source, &self.watermark, &self.result) {
            (_, _, Some(_)) => Stage::Composited,
            (Some(_), Some(_), None) => Stage::Ready,
            (Some(_), None, None) => Stage::SourceLoaded,
            (None, Some(_), None) => Stage::WatermarkLoaded,
            (None, None, None) => Stage::Idle,
        }
    }

    pub fn source(&self) -> Option<&LoadedImage> {
        self.source.as_ref()
    }

    pub fn watermark(&self) -> Option<&LoadedImage> {
        self.watermark.as_ref()
    }

    pub fn corner(&self) -> Corner {
        self.corner
    }

    pub fn settings(&self) -> &WatermarkSettings {
        &self.settings
    }

    pub fn select_source(self, image: LoadedImage) -> Self {
        Self {
            source: Some(image),
            result: None,
            ..self
        }
    }

    pub fn select_watermark(self, image: LoadedImage) -> Self {
        Self {
            watermark: Some(image),
            result: None,
            ..self
        }
    }

    pub fn select_corner(self, corner: Corner) -> Self {
        Self { corner, ..self }
    }

    /// Select a corner by name; unknown names select top-left.
    pub fn select_corner_named(self, name: &str) -> Self {
        self.select_corner(Corner::from_name_or_default(name))
    }

    /// Composite the watermark onto the source and keep the encoded result.
    ///
    /// Without both images this is a no-op and the session comes back
    /// unchanged.
    pub fn add_watermark(self, backend: &impl ImageBackend) -> Result<Self, BackendError> {
        let (Some(source), Some(watermark)) = (&self.source, &self.watermark) else {
            log::debug!("add_watermark skipped: both images are required");
            return Ok(self);
        };
        let result = watermark_image(
            backend,
            &source.image,
            &watermark.image,
            self.corner,
            &self.settings,
        )?;
        Ok(Self {
            result: Some(result),
            ..self
        })
    }

    /// The composited result, if there is one to export.
    pub fn export(&self) -> Option<&CompositeResult> {
        self.result.as_ref()
    }
}
