//! Pure Rust image processing backend.
//!
//! Everything is statically linked into the binary.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, TIFF, WebP, GIF, BMP) | `image::ImageReader` with content-sniffed format |
//! | Surface | `image::RgbaImage` sized to the base |
//! | Watermark resize | `image::imageops::crop_imm` + `resize` with `Lanczos3`, visible part only |
//! | Blend | source-over per pixel, opacity folded into the watermark alpha |
//! | Encode → PNG | `image::codecs::png::PngEncoder` |
//!
//! ## Clipping
//!
//! The scaled watermark can be far larger than the base (tall, thin marks
//! at high scale reach millions of pixels on one axis). Only the part that
//! lands on the surface is ever resampled: the placement rectangle is
//! intersected with the surface, the matching window of the watermark is
//! cropped, and that window alone is resized.

use super::backend::{BackendError, ImageBackend};
use super::params::CompositeParams;
use image::codecs::png::PngEncoder;
use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageEncoder, ImageReader, Rgba, RgbaImage};
use std::io::Cursor;

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Floor on the resample budget for exact alignment, in pixels.
const MIN_ALIGNED_BUDGET: u64 = 1 << 20;

/// One axis of the visible watermark: which source pixels to crop, how large
/// the crop becomes once scaled, and where the visible run starts inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct AxisSpan {
    src_start: u32,
    src_len: u32,
    scaled_len: u32,
    offset: u32,
}

/// Map the visible run `[rel, rel + visible)` of a watermark scaled from
/// `src` to `scaled` pixels back onto whole source pixels.
fn axis_span(rel: u64, visible: u64, scaled: u64, src: u64) -> AxisSpan {
    let src_start = rel * src / scaled;
    let src_end = ((rel + visible) * src).div_ceil(scaled).min(src);
    let scaled_start = src_start * scaled / src;
    let scaled_end = (src_end * scaled).div_ceil(src);
    AxisSpan {
        src_start: src_start as u32,
        src_len: (src_end - src_start) as u32,
        scaled_len: (scaled_end - scaled_start).min(u32::MAX as u64) as u32,
        offset: (rel - scaled_start) as u32,
    }
}

/// Clip the placement to the surface; `None` when nothing lands on it.
///
/// Returns the destination origin, the visible size, and the span on each axis.
fn visible_region(
    params: &CompositeParams,
    surface: (u32, u32),
    source: (u32, u32),
) -> Option<((u32, u32), (u32, u32), AxisSpan, AxisSpan)> {
    if params.is_empty() || source.0 == 0 || source.1 == 0 {
        return None;
    }
    // Offsets can sit anywhere in i64; widen so the edges never overflow
    let (x, y) = (params.x as i128, params.y as i128);
    let x0 = x.max(0);
    let y0 = y.max(0);
    let x1 = (x + params.width as i128).min(surface.0 as i128);
    let y1 = (y + params.height as i128).min(surface.1 as i128);
    if x1 <= x0 || y1 <= y0 {
        return None;
    }
    let visible = ((x1 - x0) as u64, (y1 - y0) as u64);
    let span_x = axis_span(
        (x0 - x) as u64,
        visible.0,
        params.width as u64,
        source.0 as u64,
    );
    let span_y = axis_span(
        (y0 - y) as u64,
        visible.1,
        params.height as u64,
        source.1 as u64,
    );
    Some((
        (x0 as u32, y0 as u32),
        (visible.0 as u32, visible.1 as u32),
        span_x,
        span_y,
    ))
}

/// Resample just the visible window of the watermark.
///
/// Returns the resampled patch and the offset of the visible run inside it.
/// When aligning on whole source pixels would resample far more than is
/// visible (a few source pixels blown up to huge sizes), the cropped window
/// is stretched onto the visible area directly.
fn resample_visible(
    watermark: &RgbaImage,
    visible: (u32, u32),
    span_x: AxisSpan,
    span_y: AxisSpan,
) -> (RgbaImage, u32, u32) {
    let window = imageops::crop_imm(
        watermark,
        span_x.src_start,
        span_y.src_start,
        span_x.src_len,
        span_y.src_len,
    )
    .to_image();

    let visible_area = visible.0 as u64 * visible.1 as u64;
    let aligned_area = span_x.scaled_len as u64 * span_y.scaled_len as u64;
    let budget = visible_area.saturating_mul(4).max(MIN_ALIGNED_BUDGET);
    if aligned_area <= budget {
        let patch = imageops::resize(
            &window,
            span_x.scaled_len,
            span_y.scaled_len,
            FilterType::Lanczos3,
        );
        (patch, span_x.offset, span_y.offset)
    } else {
        log::debug!(
            "watermark window {}x{} too large to align, stretching onto {}x{}",
            span_x.scaled_len,
            span_y.scaled_len,
            visible.0,
            visible.1
        );
        let patch = imageops::resize(&window, visible.0, visible.1, FilterType::Lanczos3);
        (patch, 0, 0)
    }
}

/// Source-over blend of `src` onto `dst`, with `src` alpha scaled by `opacity`.
///
/// An opaque destination stays opaque.
fn blend_over(dst: &mut Rgba<u8>, src: Rgba<u8>, opacity: f32) {
    let sa = src[3] as f32 / 255.0 * opacity;
    if sa <= 0.0 {
        return;
    }
    let da = dst[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    for c in 0..3 {
        let value = (src[c] as f32 * sa + dst[c] as f32 * da * (1.0 - sa)) / out_a;
        dst[c] = value.round().clamp(0.0, 255.0) as u8;
    }
    dst[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
}

impl ImageBackend for RustBackend {
    fn decode(&self, data: &[u8]) -> Result<DynamicImage, BackendError> {
        ImageReader::new(Cursor::new(data))
            .with_guessed_format()?
            .decode()
            .map_err(|e| BackendError::Decode(e.to_string()))
    }

    fn composite(
        &self,
        base: &DynamicImage,
        watermark: &DynamicImage,
        params: &CompositeParams,
    ) -> Result<DynamicImage, BackendError> {
        // Fresh surface exactly the size of the base, base drawn at the origin
        let mut surface = base.to_rgba8();

        let Some((origin, visible, span_x, span_y)) = visible_region(
            params,
            surface.dimensions(),
            (watermark.width(), watermark.height()),
        ) else {
            log::debug!("watermark does not cover any pixel of the base, nothing to draw");
            return Ok(DynamicImage::ImageRgba8(surface));
        };

        let (patch, off_x, off_y) =
            resample_visible(&watermark.to_rgba8(), visible, span_x, span_y);
        let opacity = params.opacity.value();
        for dy in 0..visible.1 {
            for dx in 0..visible.0 {
                let src = *patch.get_pixel(off_x + dx, off_y + dy);
                blend_over(surface.get_pixel_mut(origin.0 + dx, origin.1 + dy), src, opacity);
            }
        }
        Ok(DynamicImage::ImageRgba8(surface))
    }

    fn encode_png(&self, image: &DynamicImage) -> Result<Vec<u8>, BackendError> {
        let rgba = image.to_rgba8();
        let mut out = Vec::new();
        PngEncoder::new(&mut out)
            .write_image(
                rgba.as_raw(),
                rgba.width(),
                rgba.height(),
                image::ExtendedColorType::Rgba8,
            )
            .map_err(|e| BackendError::Encode(format!("PNG encode failed: {}", e)))?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::Opacity;
    use crate::test_helpers::{jpeg_bytes, png_bytes, solid_rgba};
    use image::{GenericImageView, Rgba};

    fn params(x: i64, y: i64, width: u32, height: u32, opacity: f32) -> CompositeParams {
        CompositeParams {
            x,
            y,
            width,
            height,
            opacity: Opacity::new(opacity),
        }
    }

    #[test]
    fn decode_synthetic_png() {
        let backend = RustBackend::new();
        let img = backend.decode(&png_bytes(200, 150)).unwrap();
        assert_eq!(img.dimensions(), (200, 150));
    }

    #[test]
    fn decode_synthetic_jpeg() {
        let backend = RustBackend::new();
        let img = backend.decode(&jpeg_bytes(64, 48)).unwrap();
        assert_eq!(img.dimensions(), (64, 48));
    }

    #[test]
    fn decode_garbage_errors() {
        let backend = RustBackend::new();
        let result = backend.decode(b"definitely not an image");
        assert!(matches!(result, Err(BackendError::Decode(_))));
    }

    #[test]
    fn composite_output_matches_base_size() {
        let backend = RustBackend::new();
        let base = solid_rgba(120, 80, [0, 0, 255, 255]);
        let mark = solid_rgba(10, 10, [255, 0, 0, 255]);

        let out = backend
            .composite(&base, &mark, &params(84, 0, 36, 36, 0.8))
            .unwrap();
        assert_eq!(out.dimensions(), (120, 80));
    }

    #[test]
    fn composite_blends_at_opacity() {
        let backend = RustBackend::new();
        let base = solid_rgba(100, 100, [0, 0, 0, 255]);
        let mark = solid_rgba(10, 10, [255, 255, 255, 255]);

        let out = backend
            .composite(&base, &mark, &params(0, 0, 30, 30, 0.8))
            .unwrap()
            .to_rgba8();

        // Inside the watermark: 80% white over black, still opaque
        let inside = out.get_pixel(15, 15);
        assert!((203..=205).contains(&inside[0]), "got {:?}", inside);
        assert_eq!(inside[3], 255);

        // Outside the watermark: untouched base
        assert_eq!(*out.get_pixel(50, 50), Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn composite_full_opacity_replaces_pixels() {
        let backend = RustBackend::new();
        let base = solid_rgba(40, 40, [0, 0, 0, 255]);
        let mark = solid_rgba(4, 4, [255, 0, 0, 255]);

        let out = backend
            .composite(&base, &mark, &params(20, 20, 20, 20, 1.0))
            .unwrap()
            .to_rgba8();
        let inside = out.get_pixel(30, 30);
        assert!(inside[0] >= 250 && inside[1] <= 5, "got {:?}", inside);
        assert_eq!(*out.get_pixel(10, 10), Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn composite_negative_offset_clips() {
        let backend = RustBackend::new();
        let base = solid_rgba(50, 50, [0, 0, 0, 255]);
        let mark = solid_rgba(10, 10, [255, 255, 255, 255]);

        let out = backend
            .composite(&base, &mark, &params(-50, -50, 100, 100, 1.0))
            .unwrap()
            .to_rgba8();
        assert_eq!(out.dimensions(), (50, 50));
        assert_eq!(*out.get_pixel(0, 0), Rgba([255, 255, 255, 255]));
        assert_eq!(*out.get_pixel(49, 49), Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn composite_keeps_opaque_base_opaque() {
        let backend = RustBackend::new();
        let base = solid_rgba(60, 40, [0, 0, 0, 255]);
        let mark = image::DynamicImage::ImageRgba8(RgbaImage::from_fn(12, 8, |x, _| {
            Rgba([255, 255, 255, (x * 20) as u8])
        }));

        let out = backend
            .composite(&base, &mark, &params(20, 10, 36, 24, 0.8))
            .unwrap()
            .to_rgba8();
        assert!(out.pixels().all(|p| p[3] == 255));
    }

    #[test]
    fn composite_clipped_watermark_draws_its_visible_half() {
        let backend = RustBackend::new();
        let base = solid_rgba(60, 20, [0, 0, 0, 255]);
        // Left half red, right half blue
        let mark = image::DynamicImage::ImageRgba8(RgbaImage::from_fn(10, 2, |x, _| {
            if x < 5 {
                Rgba([255, 0, 0, 255])
            } else {
                Rgba([0, 0, 255, 255])
            }
        }));

        // Scaled to 100x20 with its left 50 columns hanging off the base
        let out = backend
            .composite(&base, &mark, &params(-50, 0, 100, 20, 1.0))
            .unwrap()
            .to_rgba8();
        let drawn = out.get_pixel(25, 10);
        assert!(drawn[2] >= 250 && drawn[0] <= 5, "got {:?}", drawn);
        assert_eq!(*out.get_pixel(55, 10), Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn composite_extreme_aspect_watermark_only_resamples_visible_part() {
        let backend = RustBackend::new();
        let base = solid_rgba(400, 300, [0, 0, 0, 255]);
        // A thin vertical rule: 1x10000 scaled to 120 wide is 1.2 million tall
        let mark = solid_rgba(1, 10_000, [255, 255, 255, 255]);

        let out = backend
            .composite(&base, &mark, &params(0, 0, 120, 1_200_000, 1.0))
            .unwrap()
            .to_rgba8();
        assert_eq!(out.dimensions(), (400, 300));
        assert!(out.get_pixel(60, 299)[0] >= 250);
        assert_eq!(*out.get_pixel(200, 10), Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn composite_saturated_height_does_not_allocate_it() {
        let backend = RustBackend::new();
        let base = solid_rgba(100, 50, [0, 0, 0, 255]);
        let mark = solid_rgba(2, 20, [255, 0, 0, 255]);

        let out = backend
            .composite(&base, &mark, &params(0, 0, 100, u32::MAX, 1.0))
            .unwrap()
            .to_rgba8();
        assert_eq!(out.dimensions(), (100, 50));
        assert!(out.get_pixel(50, 25)[0] >= 250);
    }

    #[test]
    fn composite_fully_off_surface_draws_nothing() {
        let backend = RustBackend::new();
        let base = solid_rgba(20, 20, [9, 9, 9, 255]);
        let mark = solid_rgba(5, 5, [255, 255, 255, 255]);

        let out = backend
            .composite(&base, &mark, &params(-30, 0, 10, 10, 1.0))
            .unwrap()
            .to_rgba8();
        assert!(out.pixels().all(|p| *p == Rgba([9, 9, 9, 255])));
    }

    #[test]
    fn axis_span_unclipped_covers_whole_source() {
        let span = axis_span(0, 300, 300, 200);
        assert_eq!(
            span,
            AxisSpan {
                src_start: 0,
                src_len: 200,
                scaled_len: 300,
                offset: 0,
            }
        );
    }

    #[test]
    fn axis_span_clipped_starts_mid_source() {
        // 10 source pixels scaled to 100; only 50..100 visible
        let span = axis_span(50, 50, 100, 10);
        assert_eq!(span.src_start, 5);
        assert_eq!(span.src_len, 5);
        assert_eq!(span.scaled_len, 50);
        assert_eq!(span.offset, 0);
    }

    #[test]
    fn axis_span_unaligned_run_keeps_offset_inside_patch() {
        // 3 source pixels scaled to 10; visible run 4..7
        let span = axis_span(4, 3, 10, 3);
        assert_eq!(span.src_start, 1);
        assert_eq!(span.src_len, 2);
        assert!(span.offset + 3 <= span.scaled_len);
    }

    #[test]
    fn blend_over_translucent_destination() {
        let mut dst = Rgba([0, 0, 255, 128]);
        blend_over(&mut dst, Rgba([255, 0, 0, 255]), 0.6);
        // alpha: 153 + 128 * 0.4 = 204.2
        assert_eq!(dst[3], 204);
        assert!(dst[0] > dst[2], "got {:?}", dst);
    }

    #[test]
    fn blend_over_transparent_source_is_noop() {
        let mut dst = Rgba([10, 20, 30, 255]);
        blend_over(&mut dst, Rgba([255, 255, 255, 0]), 0.8);
        assert_eq!(dst, Rgba([10, 20, 30, 255]));
    }

    #[test]
    fn composite_zero_sized_draws_nothing() {
        let backend = RustBackend::new();
        let base = solid_rgba(20, 20, [9, 9, 9, 255]);
        let mark = solid_rgba(5, 5, [255, 255, 255, 255]);

        let out = backend
            .composite(&base, &mark, &params(0, 0, 6, 0, 0.8))
            .unwrap()
            .to_rgba8();
        assert!(out.pixels().all(|p| *p == Rgba([9, 9, 9, 255])));
    }

    #[test]
    fn composite_leaves_inputs_untouched() {
        let backend = RustBackend::new();
        let base = solid_rgba(20, 20, [0, 0, 0, 255]);
        let mark = solid_rgba(5, 5, [255, 255, 255, 255]);
        let base_before = base.clone();
        let mark_before = mark.clone();

        backend
            .composite(&base, &mark, &params(0, 0, 6, 6, 0.8))
            .unwrap();
        assert_eq!(base, base_before);
        assert_eq!(mark, mark_before);
    }

    #[test]
    fn encode_png_roundtrip_keeps_dimensions() {
        let backend = RustBackend::new();
        let img = solid_rgba(33, 17, [1, 2, 3, 255]);

        let bytes = backend.encode_png(&img).unwrap();
        assert!(bytes.starts_with(b"\x89PNG"));

        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!(decoded.dimensions(), (33, 17));
    }
}
