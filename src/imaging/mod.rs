//! Image processing in pure Rust, with no system dependencies.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Classify** | `image::guess_format` + video extension table |
//! | **Decode** | `image::ImageReader` |
//! | **Place** | pure corner/scale math |
//! | **Composite** | `imageops::crop_imm` + `imageops::resize` (Lanczos3) on the visible part, source-over blend |
//! | **Encode** | `PngEncoder` |
//!
//! The module is split into:
//! - **Calculations**: Pure placement functions (unit testable)
//! - **Parameters**: Scale, opacity and whole-pixel draw instructions
//! - **Media**: What kind of file the user handed us
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: Load, plan, compose and export on top of a backend

pub mod backend;
mod calculations;
pub mod media;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend};
pub use calculations::{
    Corner, Placement, UnknownCorner, resolve_named, resolve_placement, scaled_watermark_size,
};
pub use media::MediaKind;
pub use operations::{
    CompositePlan, CompositeResult, ImageSource, LoadError, LoadedImage, Slot, WatermarkSettings,
    compose, export_png, load_image, load_pair, plan_composite, watermark_image,
};
pub use params::{CompositeParams, Opacity, Scale};
pub use rust_backend::RustBackend;
