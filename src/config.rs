//! Pipeline configuration.
//!
//! Every knob has a default that reproduces the portfolio's original layout,
//! so the tool runs with no config file at all. A `photo-data.toml` in the
//! working directory (or the file named by `--config`) overrides individual
//! values:
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [paths]
//! source_dir = "src/assets/images"       # category/event/photo tree
//! output_dir = "src/assets/resized"      # flat directory of derived files
//! manifest_file = "src/photoData.json"   # consumed by the UI
//! cache_file = "processing_cache.json"   # incremental-run state
//! public_prefix = "/src/assets/resized/" # URL prefix written into the manifest
//!
//! [images]
//! widths = [1080, 640, 384, 256, 128, 96, 64, 48]
//! extensions = ["jpg", "jpeg", "png"]
//!
//! [images.quality]
//! high = 85    # width > 256
//! medium = 75  # 96 < width <= 256
//! low = 60     # width <= 96
//!
//! [processing]
//! max_processes = 4  # Max parallel render workers (omit for auto = CPU cores)
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse; the user file is deep-merged onto the stock
//! defaults before deserializing, so only the overridden keys need to appear.
//! Unknown keys are rejected to catch typos early.

use crate::imaging::supported_output_extensions;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "photo-data.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Complete pipeline configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Input tree, output directory, and persisted files.
    pub paths: PathsConfig,
    /// Target widths, accepted extensions, encoding quality.
    pub images: ImagesConfig,
    /// Parallel rendering settings.
    pub processing: ProcessingConfig,
}

impl PipelineConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.images.widths.is_empty() {
            return Err(ConfigError::Validation(
                "images.widths must not be empty".into(),
            ));
        }
        if self.images.widths.contains(&0) {
            return Err(ConfigError::Validation(
                "images.widths values must be non-zero".into(),
            ));
        }
        let q = &self.images.quality;
        for (name, value) in [("high", q.high), ("medium", q.medium), ("low", q.low)] {
            if !(1..=100).contains(&value) {
                return Err(ConfigError::Validation(format!(
                    "images.quality.{name} must be 1-100"
                )));
            }
        }
        if self.images.extensions.is_empty() {
            return Err(ConfigError::Validation(
                "images.extensions must not be empty".into(),
            ));
        }
        let supported = supported_output_extensions();
        if let Some(ext) = self
            .images
            .extensions
            .iter()
            .find(|e| !supported.contains(&e.to_ascii_lowercase().as_str()))
        {
            return Err(ConfigError::Validation(format!(
                "images.extensions: unsupported extension '{ext}' (supported: {})",
                supported.join(", ")
            )));
        }
        for (name, file) in [
            ("manifest_file", &self.paths.manifest_file),
            ("cache_file", &self.paths.cache_file),
        ] {
            if file.parent() == Some(self.paths.output_dir.as_path()) {
                return Err(ConfigError::Validation(format!(
                    "paths.{name} must not be inside paths.output_dir (it would be pruned)"
                )));
            }
        }
        Ok(())
    }

    /// Whether `extension` (without the dot) is on the allow-list, ignoring case.
    pub fn accepts_extension(&self, extension: &str) -> bool {
        self.images
            .extensions
            .iter()
            .any(|e| e.eq_ignore_ascii_case(extension))
    }
}

/// Filesystem locations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsConfig {
    /// Root of the `category/event/photo` source tree.
    pub source_dir: PathBuf,
    /// Flat directory receiving `<id>-<width>w.<ext>` files. Pruned every run.
    pub output_dir: PathBuf,
    /// JSON photo list consumed by the UI.
    pub manifest_file: PathBuf,
    /// JSON processing cache.
    pub cache_file: PathBuf,
    /// URL prefix for `src`/`srcSet`, independent of `output_dir`.
    pub public_prefix: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from("src/assets/images"),
            output_dir: PathBuf::from("src/assets/resized"),
            manifest_file: PathBuf::from("src/photoData.json"),
            cache_file: PathBuf::from("processing_cache.json"),
            public_prefix: "/src/assets/resized/".to_string(),
        }
    }
}

impl PathsConfig {
    /// Public URL of a derived file.
    pub fn public_url(&self, file_name: &str) -> String {
        let prefix = self.public_prefix.trim_end_matches('/');
        if prefix.is_empty() && !self.public_prefix.starts_with('/') {
            file_name.to_string()
        } else {
            format!("{prefix}/{file_name}")
        }
    }
}

/// Variant generation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImagesConfig {
    /// Target widths in pixels. The original width is always added.
    pub widths: Vec<u32>,
    /// Source extensions (case-insensitive, without the dot) treated as photos.
    pub extensions: Vec<String>,
    /// Lossy encoding quality per width tier.
    pub quality: QualityConfig,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            widths: vec![1080, 640, 384, 256, 128, 96, 64, 48],
            extensions: vec!["jpg".to_string(), "jpeg".to_string(), "png".to_string()],
            quality: QualityConfig::default(),
        }
    }
}

/// Encoding quality by output width. Only lossy formats use it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct QualityConfig {
    /// Widths above 256px.
    pub high: u32,
    /// Widths above 96px up to 256px.
    pub medium: u32,
    /// Widths of 96px and below.
    pub low: u32,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            high: 85,
            medium: 75,
            low: 60,
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel render workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)`, at least one
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(PipelineConfig::default())
        .map_err(|e| ConfigError::Validation(format!("default config must serialize: {e}")))
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

/// Read a config file as a raw TOML value.
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

/// Merge an optional overlay onto the stock defaults, then deserialize and
/// validate.
pub fn resolve_config(overlay: Option<toml::Value>) -> Result<PipelineConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: PipelineConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load the config file at `path`, falling back to defaults when absent.
pub fn load_config(path: &Path) -> Result<PipelineConfig, ConfigError> {
    let overlay = load_raw_config(path)?;
    if overlay.is_some() {
        tracing::debug!(path = %path.display(), "loaded config file");
    }
    resolve_config(overlay)
}

/// Returns a fully-commented stock config file with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# photo-data configuration
# =========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Paths (relative to the working directory)
# ---------------------------------------------------------------------------
[paths]
# Source tree: <source_dir>/<category>/<event>/<photo>.<ext>
source_dir = "src/assets/images"

# Flat directory of derived files named <photo id>-<width>w.<ext>.
# Files not produced by the current run are deleted from it.
output_dir = "src/assets/resized"

# Photo manifest consumed by the site (JSON array).
manifest_file = "src/photoData.json"

# Incremental processing cache (JSON object keyed by photo id).
cache_file = "processing_cache.json"

# Prefix for src/srcSet URLs in the manifest.
public_prefix = "/src/assets/resized/"

# ---------------------------------------------------------------------------
# Variant generation
# ---------------------------------------------------------------------------
[images]
# Target widths in pixels. Widths above the original are skipped and the
# original width is always rendered.
widths = [1080, 640, 384, 256, 128, 96, 64, 48]

# Source extensions treated as photos (case-insensitive).
# Supported: jpg, jpeg, png, webp
extensions = ["jpg", "jpeg", "png"]

# JPEG quality per output width (1 = worst, 100 = best).
# PNG and WebP are encoded losslessly and ignore these.
[images.quality]
high = 85    # width > 256
medium = 75  # 96 < width <= 256
low = 60     # width <= 96

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel render workers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}
