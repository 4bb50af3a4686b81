//! Bridge configuration module.
//!
//! Handles loading, validating, and merging the `capture-bridge.toml` file.
//! Stock defaults are serialized to a TOML table and the user file is merged
//! on top, so a config file only needs the keys it wants to change.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [resize]
//! max_width = 0          # Temp-capture width bound (0 = unconstrained)
//! max_height = 0         # Temp-capture height bound (0 = unconstrained)
//! min_output_edge = 1    # Reject resizes that shrink an edge below this
//! max_output_edge = 16384 # Reject resizes that grow an edge above this
//!
//! [storage]
//! album = "CaptureBridge"        # Sub-directory under the pictures dir
//! # pictures_dir = "/srv/photos" # Default: platform pictures dir
//! # cache_dir = "/tmp/capture"   # Default: platform cache dir + album
//!
//! [preview]
//! settle_delay_ms = 300  # Delay before preview resumes after a capture
//!
//! [camera_roll]
//! quality = 90           # JPEG quality for media library inserts
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::{Quality, ResizeBounds};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Bridge configuration.
///
/// All fields have defaults. Unknown keys are rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BridgeConfig {
    /// Bounds applied to temp captures.
    pub resize: ResizeConfig,
    /// Where captures are written.
    pub storage: StorageConfig,
    /// Preview stop/resume timing.
    pub preview: PreviewConfig,
    /// Media library encoding.
    pub camera_roll: CameraRollConfig,
}

impl BridgeConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.resize.min_output_edge == 0 {
            return Err(ConfigError::Validation("resize.min_output_edge must be at least 1".into()));
        }
        if self.resize.max_output_edge < self.resize.min_output_edge {
            return Err(ConfigError::Validation(
                "resize.max_output_edge must not be below resize.min_output_edge".into(),
            ));
        }
        if !(1..=100).contains(&self.camera_roll.quality) {
            return Err(ConfigError::Validation("camera_roll.quality must be 1-100".into()));
        }
        let album = self.storage.album.trim();
        if album.is_empty() {
            return Err(ConfigError::Validation("storage.album must not be empty".into()));
        }
        if album.contains('/') || album.contains('\\') || album == "." || album == ".." {
            return Err(ConfigError::Validation(
                "storage.album must be a single directory name".into(),
            ));
        }
        Ok(())
    }
}

/// Temp-capture resize bounds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResizeConfig {
    /// Maximum output width in pixels. 0 leaves width unconstrained.
    pub max_width: u32,
    /// Maximum output height in pixels. 0 leaves height unconstrained.
    pub max_height: u32,
    /// Smallest output edge a resize may produce.
    pub min_output_edge: u32,
    /// Largest output edge a resize may produce.
    pub max_output_edge: u32,
}

impl Default for ResizeConfig {
    fn default() -> Self {
        Self {
            max_width: 0,
            max_height: 0,
            min_output_edge: 1,
            max_output_edge: ResizeBounds::DEFAULT_MAX_EDGE,
        }
    }
}

impl ResizeConfig {
    pub fn bounds(&self) -> ResizeBounds {
        ResizeBounds {
            max_width: self.max_width,
            max_height: self.max_height,
            min_edge: self.min_output_edge,
            max_edge: self.max_output_edge,
        }
    }
}

/// Capture destinations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageConfig {
    /// Directory name under the pictures dir for disk captures.
    pub album: String,
    /// Override for the public pictures directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pictures_dir: Option<PathBuf>,
    /// Override for the temp/cache directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_dir: Option<PathBuf>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            album: "CaptureBridge".to_string(),
            pictures_dir: None,
            cache_dir: None,
        }
    }
}

impl StorageConfig {
    /// Directory disk captures are written to: `<pictures>/<album>`.
    pub fn album_dir(&self) -> PathBuf {
        let root = self
            .pictures_dir
            .clone()
            .or_else(dirs::picture_dir)
            .unwrap_or_else(std::env::temp_dir);
        root.join(&self.album)
    }

    /// Directory temp captures and resized outputs are written to.
    pub fn temp_dir(&self) -> PathBuf {
        match &self.cache_dir {
            Some(dir) => dir.clone(),
            None => dirs::cache_dir()
                .map(|d| d.join(&self.album))
                .unwrap_or_else(|| std::env::temp_dir().join(&self.album)),
        }
    }
}

/// Preview timing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PreviewConfig {
    /// Milliseconds between routing completion and preview resume.
    pub settle_delay_ms: u64,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            settle_delay_ms: 300,
        }
    }
}

impl PreviewConfig {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

/// Media library settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CameraRollConfig {
    /// JPEG quality for bitmaps inserted into the media library (1-100).
    pub quality: u32,
}

impl Default for CameraRollConfig {
    fn default() -> Self {
        Self { quality: 90 }
    }
}

impl CameraRollConfig {
    pub fn quality(&self) -> Quality {
        Quality::new(self.quality)
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the base layer user overrides are merged onto.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(BridgeConfig::default()).expect("default config must serialize")
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
) -> Result<BridgeConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: BridgeConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from a file path, falling back to stock defaults when the
/// file is absent.
pub fn load_config(path: &Path) -> Result<BridgeConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(path)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock config file with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Capture Bridge Configuration
# ============================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Temp-capture resizing
# ---------------------------------------------------------------------------
[resize]
# Bounds for captures routed to the temp target. The image is scaled by a
# single factor so neither bound is exceeded. 0 leaves that axis unconstrained.
max_width = 0
max_height = 0

# Resizes that would shrink either edge below this many pixels are rejected.
min_output_edge = 1

# Resizes that would grow either edge above this many pixels are rejected,
# so a bound far larger than the capture cannot allocate a huge bitmap.
max_output_edge = 16384

# ---------------------------------------------------------------------------
# Storage
# ---------------------------------------------------------------------------
[storage]
# Directory created under the pictures directory for disk captures.
album = "CaptureBridge"

# Override the pictures directory (default: the platform pictures dir).
# pictures_dir = "/srv/photos"

# Override the temp directory (default: the platform cache dir + album).
# cache_dir = "/tmp/capture-bridge"

# ---------------------------------------------------------------------------
# Preview
# ---------------------------------------------------------------------------
[preview]
# Milliseconds to wait after a capture before the preview resumes.
settle_delay_ms = 300

# ---------------------------------------------------------------------------
# Camera roll
# ---------------------------------------------------------------------------
[camera_roll]
# JPEG quality for images inserted into the media library (1-100).
quality = 90
"##
}
