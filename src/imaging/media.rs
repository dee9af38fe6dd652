//! Media classification for user-supplied files.
//!
//! Content sniffing decides first: if the bytes start with a known image
//! signature whose decoder is compiled in, the file is an image regardless of
//! its name. Only when sniffing fails does the extension matter, and then only
//! to recognise video containers so they can be turned away with a clear
//! message instead of a decode error.

use image::ImageFormat;
use std::path::Path;
use std::sync::LazyLock;

/// Extensions for formats the `image` crate features in `Cargo.toml` can decode.
const PHOTO_CANDIDATES: &[(&str, ImageFormat)] = &[
    ("jpg", ImageFormat::Jpeg),
    ("jpeg", ImageFormat::Jpeg),
    ("png", ImageFormat::Png),
    ("tif", ImageFormat::Tiff),
    ("tiff", ImageFormat::Tiff),
    ("webp", ImageFormat::WebP),
    ("gif", ImageFormat::Gif),
    ("bmp", ImageFormat::Bmp),
];

const VIDEO_EXTENSIONS: &[&str] = &["mp4", "m4v", "mov", "webm", "mkv", "avi"];

static SUPPORTED_EXTENSIONS: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    PHOTO_CANDIDATES
        .iter()
        .filter(|(_, fmt)| fmt.reading_enabled())
        .map(|(ext, _)| *ext)
        .collect()
});

/// Returns the set of image file extensions that have working decoders compiled in.
pub fn supported_input_extensions() -> &'static [&'static str] {
    &SUPPORTED_EXTENSIONS
}

/// What a user-supplied file turned out to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image(ImageFormat),
    Video,
    Other,
}

impl MediaKind {
    /// Classify a file from its name and leading bytes.
    pub fn detect(name: &str, data: &[u8]) -> MediaKind {
        match image::guess_format(data) {
            Ok(format) if format.reading_enabled() => return MediaKind::Image(format),
            _ => {}
        }
        let ext = Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext {
            Some(e) if VIDEO_EXTENSIONS.contains(&e.as_str()) => MediaKind::Video,
            _ => MediaKind::Other,
        }
    }

    pub fn is_image(self) -> bool {
        matches!(self, MediaKind::Image(_))
    }
}
