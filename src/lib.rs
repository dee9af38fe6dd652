//! # Simple Mark
//!
//! Stamp a watermark onto a photo and save the result as PNG.
//!
//! The watermark is scaled to a fixed fraction of the photo width (30% by
//! default) keeping its own aspect ratio, anchored at one of five positions
//! (four corners or center), and blended at a fixed opacity (80% by default).
//! The result is always written as `watermarked_image.png`.
//!
//! # Pipeline
//!
//! ```text
//! 1. Load      source + watermark files  →  rasters          (in parallel)
//! 2. Place     corner + dimensions       →  offset and size  (pure)
//! 3. Composite base + watermark          →  flattened raster
//! 4. Export    raster                    →  watermarked_image.png
//! ```
//!
//! Each run is independent; nothing is cached or remembered between runs.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`imaging`] | Pure-Rust image work: media sniffing, decode, placement math, compositing, PNG encode |
//! | [`session`] | The session value: input slots, corner, result, and the transitions between them |
//! | [`apply`] | One full run from file paths to a saved PNG |
//! | [`export`] | Fixed-filename save of the encoded result |
//! | [`config`] | `simple-mark.toml` loading, merging and validation |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Placement Before Pixels
//!
//! Placement is computed in fractional pixels by pure functions in
//! [`imaging`] and only rounded when handed to the backend. Every geometry
//! rule (30% width, aspect preserved, unclamped offsets, top-left fallback
//! for unknown corner names) is unit-testable without decoding an image.
//!
//! ## Backend Trait
//!
//! Pixel work goes through [`imaging::ImageBackend`]. The production
//! [`imaging::RustBackend`] uses the `image` crate; tests use a recording
//! mock so session and pipeline logic run without encoding anything.
//!
//! ## Still Images Only
//!
//! Video files are recognised and turned away with an explicit message
//! rather than failing deep inside a decoder.

pub mod apply;
pub mod config;
pub mod export;
pub mod imaging;
pub mod output;
pub mod session;

#[cfg(test)]
pub(crate) mod test_helpers;
