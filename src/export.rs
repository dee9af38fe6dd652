//! Saving the composited PNG.
//!
//! The file name is fixed; callers only choose the directory.

use crate::imaging::CompositeResult;
use std::io;
use std::path::{Path, PathBuf};

/// Name every composite is saved under.
pub const OUTPUT_FILENAME: &str = "watermarked_image.png";

/// Full path the composite would be written to inside `dir`.
pub fn output_path(dir: &Path) -> PathBuf {
    dir.join(OUTPUT_FILENAME)
}

/// Write the composite to `dir/watermarked_image.png`, creating `dir` if
/// needed. An existing file is overwritten.
pub fn save(result: &CompositeResult, dir: &Path) -> io::Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = output_path(dir);
    std::fs::write(&path, &result.png)?;
    log::info!("wrote {} ({} bytes)", path.display(), result.png.len());
    Ok(path)
}
