//! Tool configuration module.
//!
//! Handles loading, validating, and merging `simple-mark.toml`. Configuration
//! is layered: stock defaults are overridden by the user's config file, and
//! command-line flags override both.
//!
//! ## Config File Location
//!
//! `simple-mark.toml` in the current directory is picked up automatically.
//! Pass `--config <FILE>` to use a different file.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [watermark]
//! corner = "top-left"   # top-left | top-right | bottom-left | bottom-right | center
//! scale = 0.3           # watermark width relative to the photo width
//! opacity = 0.8         # 0.0 (invisible) - 1.0 (opaque)
//!
//! [output]
//! directory = "."       # where watermarked_image.png is written
//! ```
//!
//! Config files are sparse: override just the values you want. Unknown keys
//! are rejected to catch typos early.

use crate::imaging::{Corner, Opacity, Scale, WatermarkSettings};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the config file looked up in a directory.
pub const CONFIG_FILENAME: &str = "simple-mark.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Tool configuration loaded from `simple-mark.toml`.
///
/// All fields have defaults matching the tool's fixed behavior: top-left,
/// 30% of the photo width, 80% opacity.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MarkConfig {
    /// Placement and blending of the watermark.
    pub watermark: WatermarkConfig,
    /// Where results are written.
    pub output: OutputConfig,
}

impl MarkConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let scale = self.watermark.scale;
        if !(Scale::MIN..=Scale::MAX).contains(&scale) {
            return Err(ConfigError::Validation(format!(
                "watermark.scale must be {}-{}, got {}",
                Scale::MIN,
                Scale::MAX,
                scale
            )));
        }
        let opacity = self.watermark.opacity;
        if !(0.0..=1.0).contains(&opacity) {
            return Err(ConfigError::Validation(format!(
                "watermark.opacity must be 0.0-1.0, got {}",
                opacity
            )));
        }
        if self.output.directory.trim().is_empty() {
            return Err(ConfigError::Validation(
                "output.directory must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// Apply command-line values on top of the loaded config.
    ///
    /// The result is validated again, so flags are held to the same ranges
    /// as the config file instead of being clamped.
    pub fn with_overrides(
        mut self,
        corner: Option<Corner>,
        scale: Option<f64>,
        opacity: Option<f64>,
    ) -> Result<Self, ConfigError> {
        if let Some(corner) = corner {
            self.watermark.corner = corner;
        }
        if let Some(scale) = scale {
            self.watermark.scale = scale;
        }
        if let Some(opacity) = opacity {
            self.watermark.opacity = opacity;
        }
        self.validate()?;
        Ok(self)
    }

    /// Scale and opacity as operation settings.
    pub fn settings(&self) -> WatermarkSettings {
        WatermarkSettings {
            scale: Scale::new(self.watermark.scale),
            opacity: Opacity::new(self.watermark.opacity as f32),
        }
    }

    pub fn output_dir(&self) -> PathBuf {
        PathBuf::from(&self.output.directory)
    }
}

/// Watermark placement settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WatermarkConfig {
    /// Anchor position on the photo.
    pub corner: Corner,
    /// Watermark width as a fraction of the photo width.
    pub scale: f64,
    /// Blend factor for the watermark.
    pub opacity: f64,
}

impl Default for WatermarkConfig {
    fn default() -> Self {
        Self {
            corner: Corner::TopLeft,
            scale: 0.3,
            opacity: 0.8,
        }
    }
}

/// Output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Directory `watermarked_image.png` is written into.
    pub directory: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: ".".to_string(),
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the base layer user overrides are merged on top of.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(MarkConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<MarkConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: MarkConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `simple-mark.toml` in the given directory, falling back
/// to stock defaults when there is none.
pub fn load_config(dir: &Path) -> Result<MarkConfig, ConfigError> {
    load_config_file(&dir.join(CONFIG_FILENAME))
}

/// Load config from an explicit file path.
///
/// A missing file yields stock defaults.
pub fn load_config_file(path: &Path) -> Result<MarkConfig, ConfigError> {
    let overlay = load_raw_config(path)?;
    if overlay.is_some() {
        log::debug!("loaded config from {}", path.display());
    }
    resolve_config(stock_defaults_value(), overlay)
}

/// Returns a fully-commented stock `simple-mark.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# simple-mark configuration
# =========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# simple-mark reads ./simple-mark.toml automatically; pass --config FILE
# to use another file. Command-line flags override anything set here.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Watermark placement
# ---------------------------------------------------------------------------
[watermark]
# Anchor position: top-left, top-right, bottom-left, bottom-right or center.
corner = "top-left"

# Watermark width as a fraction of the photo width (0.01-10).
# The watermark keeps its own aspect ratio. Values above 1.0 make it wider
# than the photo; the overhang is clipped.
scale = 0.3

# Blend factor: 0.0 is invisible, 1.0 fully opaque.
opacity = 0.8

# ---------------------------------------------------------------------------
# Output
# ---------------------------------------------------------------------------
[output]
# Directory the result is written into as watermarked_image.png.
directory = "."
"##
}
