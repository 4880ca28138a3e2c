//! Crop configuration.
//!
//! Handles loading, validating, and merging `focal-crop.toml`. Stock defaults
//! are overridden by whatever the user file sets; everything else keeps its
//! default.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! upload_dir = "uploads"    # Root the upload-relative paths resolve against
//!
//! [focus]
//! x = 50.0                  # Default focus point, percent from the left
//! y = 50.0                  # Default focus point, percent from the top
//!
//! [[sizes]]
//! name = "thumbnail"
//! width = 150
//! height = 150
//! crop = true
//!
//! [[sizes]]
//! name = "medium"
//! width = 300
//! height = 300
//! crop = false
//!
//! [processing]
//! max_processes = 4         # Max parallel workers (omit for auto = CPU cores)
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse — override just the values you want. Tables are
//! merged key by key; arrays such as `sizes` replace the default list whole:
//!
//! ```toml
//! [focus]
//! y = 33.0
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::types::{FocusPoint, FocusPointError, TargetSize};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

impl From<FocusPointError> for ConfigError {
    fn from(err: FocusPointError) -> Self {
        ConfigError::Validation(err.to_string())
    }
}

/// Configuration loaded from `focal-crop.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CropConfig {
    /// Directory the upload-relative file paths are resolved against.
    pub upload_dir: String,
    /// Focus point used when an image has none stored.
    pub focus: FocusConfig,
    /// Registered output sizes, cropped or not.
    pub sizes: Vec<TargetSize>,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl Default for CropConfig {
    fn default() -> Self {
        Self {
            upload_dir: "uploads".to_string(),
            focus: FocusConfig::default(),
            sizes: default_sizes(),
            processing: ProcessingConfig::default(),
        }
    }
}

/// The stock registry: one hard-cropped square plus three proportional sizes.
/// `medium_large` has no height bound, which keeps it out of cropping.
fn default_sizes() -> Vec<TargetSize> {
    vec![
        TargetSize::new("thumbnail", 150, 150, true),
        TargetSize::new("medium", 300, 300, false),
        TargetSize::new("medium_large", 768, 0, false),
        TargetSize::new("large", 1024, 1024, false),
    ]
}

impl CropConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (axis, value) in [("x", self.focus.x), ("y", self.focus.y)] {
            if !(0.0..=100.0).contains(&value) {
                return Err(ConfigError::Validation(format!(
                    "focus.{axis} must be 0-100, got {value}"
                )));
            }
        }

        let mut seen = HashSet::new();
        for size in &self.sizes {
            if size.name.trim().is_empty() {
                return Err(ConfigError::Validation(
                    "sizes[].name must not be empty".into(),
                ));
            }
            if !seen.insert(size.name.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "size '{}' is defined more than once",
                    size.name
                )));
            }
        }

        if self.processing.max_processes == Some(0) {
            return Err(ConfigError::Validation(
                "processing.max_processes must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// The configured default focus point.
    pub fn default_focus(&self) -> Result<FocusPoint, ConfigError> {
        Ok(FocusPoint::new(self.focus.x, self.focus.y)?)
    }
}

/// Default focus point, in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FocusConfig {
    pub x: f64,
    pub y: f64,
}

impl Default for FocusConfig {
    fn default() -> Self {
        let center = FocusPoint::CENTER;
        Self {
            x: center.x(),
            y: center.y(),
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel planning workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config.max_processes.map(|n| n.min(cores)).unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(CropConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay, arrays included, replace base values entirely.
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

/// Merge an optional overlay onto the stock defaults, then deserialize and validate.
pub fn resolve_config(overlay: Option<toml::Value>) -> Result<CropConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: CropConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `path`, falling back to the stock defaults when the
/// file does not exist.
pub fn load_config(path: &Path) -> Result<CropConfig, ConfigError> {
    resolve_config(load_raw_config(path)?)
}

/// Returns a fully-commented stock `focal-crop.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# focal-crop configuration
# ========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
# Unknown keys will cause an error.

# Directory that upload-relative image paths resolve against. Cropped
# derivatives are written next to their original under this root.
upload_dir = "uploads"

# ---------------------------------------------------------------------------
# Default focus point
# ---------------------------------------------------------------------------
[focus]
# Used for images that have no stored focus point.
# Percent from the left edge (x) and from the top edge (y), 0-100.
x = 50.0
y = 50.0

# ---------------------------------------------------------------------------
# Registered sizes
# ---------------------------------------------------------------------------
# Only sizes with crop = true and both dimensions set are re-cropped around
# the focus point. The others are proportional resizes and are left alone.
# Listing sizes here replaces the whole default list.

[[sizes]]
name = "thumbnail"
width = 150
height = 150
crop = true

[[sizes]]
name = "medium"
width = 300
height = 300
crop = false

[[sizes]]
name = "medium_large"
width = 768
height = 0
crop = false

[[sizes]]
name = "large"
width = 1024
height = 1024
crop = false

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel planning workers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}
