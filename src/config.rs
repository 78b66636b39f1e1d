//! Splitter configuration.
//!
//! Two layers:
//!
//! - [`SplitOptions`]: a partial set of options, as supplied by a caller, a
//!   config file, or CLI flags. Every field is optional.
//! - [`SplitConfig`]: the resolved record. [`SplitOptions::resolve`] fills
//!   every absent field with its default independently.
//!
//! Resolution never rejects values. Range checks live in
//! [`SplitConfig::validate`], which the splitter runs once at construction.
//!
//! ## Config File
//!
//! The CLI reads an optional TOML file (`--config`):
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [split]
//! mode = "crop"             # "crop" (centered square) or "stretch"
//! cols = 3                  # Pieces per row
//! rows = 3                  # Pieces per column
//! output_format = "image/png"
//! quality = 0.8             # Lossy encoder quality (0.0 - 1.0)
//!
//! [processing]
//! max_processes = 4         # Max parallel workers (omit for auto = CPU cores)
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::SplitMode;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

pub const DEFAULT_COLS: u32 = 3;
pub const DEFAULT_ROWS: u32 = 3;
pub const DEFAULT_OUTPUT_FORMAT: &str = "image/png";
pub const DEFAULT_QUALITY: f32 = 0.8;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Partially specified split options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SplitOptions {
    pub mode: Option<SplitMode>,
    pub cols: Option<u32>,
    pub rows: Option<u32>,
    pub output_format: Option<String>,
    pub quality: Option<f32>,
}

impl SplitOptions {
    /// Fill every absent field with its default.
    pub fn resolve(&self) -> SplitConfig {
        SplitConfig {
            mode: self.mode.unwrap_or_default(),
            cols: self.cols.unwrap_or(DEFAULT_COLS),
            rows: self.rows.unwrap_or(DEFAULT_ROWS),
            output_format: self
                .output_format
                .clone()
                .unwrap_or_else(|| DEFAULT_OUTPUT_FORMAT.to_string()),
            quality: self.quality.unwrap_or(DEFAULT_QUALITY),
        }
    }

    /// Layer `overlay` on top of `self`: fields set in `overlay` win.
    pub fn merge(self, overlay: SplitOptions) -> SplitOptions {
        SplitOptions {
            mode: overlay.mode.or(self.mode),
            cols: overlay.cols.or(self.cols),
            rows: overlay.rows.or(self.rows),
            output_format: overlay.output_format.or(self.output_format),
            quality: overlay.quality.or(self.quality),
        }
    }
}

/// Fully resolved split configuration. Immutable once a splitter owns it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SplitConfig {
    pub mode: SplitMode,
    pub cols: u32,
    pub rows: u32,
    /// Encoder format id, e.g. `image/png`.
    pub output_format: String,
    /// Lossy encoder quality in `[0, 1]`.
    pub quality: f32,
}

impl Default for SplitConfig {
    fn default() -> Self {
        SplitOptions::default().resolve()
    }
}

impl SplitConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cols == 0 {
            return Err(ConfigError::Validation("cols must be at least 1".into()));
        }
        if self.rows == 0 {
            return Err(ConfigError::Validation("rows must be at least 1".into()));
        }
        if !(0.0..=1.0).contains(&self.quality) {
            return Err(ConfigError::Validation(format!(
                "quality must be between 0 and 1, got {}",
                self.quality
            )));
        }
        if self.output_format.trim().is_empty() {
            return Err(ConfigError::Validation(
                "output_format must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// Total number of pieces a split produces.
    pub fn piece_count(&self) -> usize {
        self.cols as usize * self.rows as usize
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel encoding workers.
    /// When absent or null, defaults to the number of CPU cores.
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
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

/// Contents of a `grid-splitter.toml` file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub split: SplitOptions,
    pub processing: ProcessingConfig,
}

/// Parse config file contents.
pub fn parse_config(content: &str) -> Result<FileConfig, ConfigError> {
    Ok(toml::from_str(content)?)
}

/// Load a config file. A missing path yields the empty (all-default) config.
pub fn load_config(path: Option<&Path>) -> Result<FileConfig, ConfigError> {
    match path {
        Some(path) => parse_config(&fs::read_to_string(path)?),
        None => Ok(FileConfig::default()),
    }
}

/// Returns a fully-commented stock config file with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Grid Splitter Configuration
# ===========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Command-line flags override them.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Grid
# ---------------------------------------------------------------------------
[split]
# "crop": center-crop the image to a square first, so every piece is square
#         when cols == rows.
# "stretch": slice the full image; pieces keep the image's aspect ratio
#            divided by the grid.
mode = "crop"

# Number of pieces across and down.
cols = 3
rows = 3

# Output encoding. Supported: image/png, image/jpeg, image/webp,
# image/avif, image/tiff.
output_format = "image/png"

# Lossy encoder quality from 0.0 (worst) to 1.0 (best).
# Ignored by lossless formats (PNG, WebP, TIFF).
quality = 0.8

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel encoding workers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}
