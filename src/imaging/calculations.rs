//! Pure placement math for the watermark.
//!
//! All functions here are pure and testable without any I/O or images.
//! Geometry stays in `f64` until [`Placement::to_params`] rounds it to whole
//! pixels for the backend.

use super::backend::Dimensions;
use super::params::{CompositeParams, Opacity, Scale};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Where the watermark is anchored on the base image.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum Corner {
    #[default]
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
    Center,
}

impl Corner {
    pub const ALL: [Corner; 5] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomLeft,
        Corner::BottomRight,
        Corner::Center,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Corner::TopLeft => "top-left",
            Corner::TopRight => "top-right",
            Corner::BottomLeft => "bottom-left",
            Corner::BottomRight => "bottom-right",
            Corner::Center => "center",
        }
    }

    /// Parse a corner name, falling back to [`Corner::TopLeft`] for anything
    /// unrecognized.
    pub fn from_name_or_default(name: &str) -> Corner {
        match name.parse() {
            Ok(corner) => corner,
            Err(UnknownCorner(name)) => {
                log::warn!("unknown corner '{name}', placing watermark at top-left");
                Corner::TopLeft
            }
        }
    }
}

impl fmt::Display for Corner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown corner '{0}' (expected top-left, top-right, bottom-left, bottom-right or center)")]
pub struct UnknownCorner(pub String);

impl FromStr for Corner {
    type Err = UnknownCorner;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Corner::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| UnknownCorner(s.to_string()))
    }
}

/// Resolved watermark rectangle on the base image, in fractional pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Placement {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Placement {
    /// Round to whole pixels for drawing.
    pub fn to_params(self, opacity: Opacity) -> CompositeParams {
        CompositeParams {
            x: self.x.round() as i64,
            y: self.y.round() as i64,
            width: self.width.round().max(0.0) as u32,
            height: self.height.round().max(0.0) as u32,
            opacity,
        }
    }
}

/// Size of the watermark once scaled against the base width.
///
/// Width is always `base_width * scale`; height follows the watermark's own
/// aspect ratio. A zero-width watermark has zero height.
///
/// # Examples
/// ```
/// # use simple_mark::imaging::{Dimensions, Scale, scaled_watermark_size};
/// // 200x100 watermark on a 1000px-wide base at 30% → 300x150
/// assert_eq!(
///     scaled_watermark_size(1000, Dimensions::new(200, 100), Scale::default()),
///     (300.0, 150.0)
/// );
/// ```
pub fn scaled_watermark_size(base_width: u32, watermark: Dimensions, scale: Scale) -> (f64, f64) {
    let width = base_width as f64 * scale.value();
    if watermark.width == 0 {
        return (width, 0.0);
    }
    let height = (width / watermark.width as f64) * watermark.height as f64;
    (width, height)
}

/// Resolve where the scaled watermark goes on the base image.
///
/// No clamping: a watermark larger than the base yields negative offsets.
pub fn resolve_placement(
    corner: Corner,
    base: Dimensions,
    watermark: Dimensions,
    scale: Scale,
) -> Placement {
    let (width, height) = scaled_watermark_size(base.width, watermark, scale);
    let base_w = base.width as f64;
    let base_h = base.height as f64;

    let (x, y) = match corner {
        Corner::TopLeft => (0.0, 0.0),
        Corner::TopRight => (base_w - width, 0.0),
        Corner::BottomLeft => (0.0, base_h - height),
        Corner::BottomRight => (base_w - width, base_h - height),
        Corner::Center => ((base_w - width) / 2.0, (base_h - height) / 2.0),
    };

    Placement {
        x,
        y,
        width,
        height,
    }
}

/// [`resolve_placement`] for a corner given by name; unknown names resolve
/// as top-left.
pub fn resolve_named(
    corner: &str,
    base: Dimensions,
    watermark: Dimensions,
    scale: Scale,
) -> Placement {
    resolve_placement(Corner::from_name_or_default(corner), base, watermark, scale)
}
