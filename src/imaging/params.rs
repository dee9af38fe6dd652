//! Parameter types for image operations.
//!
//! These structs describe *what* to draw, not *how*. They are the interface
//! between the high-level [`operations`](super::operations) module (which
//! decides where the watermark goes) and the [`backend`](super::backend)
//! (which does the pixel work). This separation allows swapping backends
//! (e.g. for testing with a mock) without changing operation logic.
//!
//! ## Types
//!
//! - [`Scale`]: Watermark width relative to the base width (default 0.3). Clamped on construction.
//! - [`Opacity`]: Blend factor applied to the watermark (0.0–1.0, default 0.8). Clamped on construction.
//! - [`CompositeParams`]: Whole-pixel placement handed to the backend.

/// Watermark width as a fraction of the base image width.
///
/// Values above 1.0 are allowed: the watermark then overhangs the base and
/// placement offsets go negative.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scale(pub f64);

impl Scale {
    pub const MIN: f64 = 0.01;
    pub const MAX: f64 = 10.0;

    pub fn new(value: f64) -> Self {
        if value.is_nan() {
            return Self::default();
        }
        Self(value.clamp(Self::MIN, Self::MAX))
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl Default for Scale {
    fn default() -> Self {
        Self(0.3)
    }
}

/// Opacity used when blending the watermark (0.0 = invisible, 1.0 = opaque).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Opacity(pub f32);

impl Opacity {
    pub fn new(value: f32) -> Self {
        if value.is_nan() {
            return Self::default();
        }
        Self(value.clamp(0.0, 1.0))
    }

    pub fn value(self) -> f32 {
        self.0
    }
}

impl Default for Opacity {
    fn default() -> Self {
        Self(0.8)
    }
}

/// Whole-pixel draw instructions for one watermark.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompositeParams {
    /// Left edge of the watermark on the base. May be negative.
    pub x: i64,
    /// Top edge of the watermark on the base. May be negative.
    pub y: i64,
    /// Drawn watermark width.
    pub width: u32,
    /// Drawn watermark height.
    pub height: u32,
    pub opacity: Opacity,
}

impl CompositeParams {
    /// A watermark that rounds to zero pixels in either direction draws nothing.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}
