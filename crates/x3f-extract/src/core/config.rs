//! Configuration loading and management.
//!
//! Two layers:
//!
//! - [`ExtractionConfig`] holds file-level defaults for every command-line
//!   option and can be loaded from TOML or JSON, or discovered as
//!   `x3f-extract.toml` in the current directory or any parent.
//! - [`ProcessingSettings`] is the process-wide subset that collaborators need
//!   (accelerator use, legacy offset, metadata matrix limit, temp policy). It
//!   is built once and passed by reference; nothing reads it from globals.

use crate::types::{ColorEncoding, LegacyOffset, OutputFormat, ProcessingToggles, TriState};
use crate::{ExtractError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name searched for by [`ExtractionConfig::discover`].
pub const CONFIG_FILE_NAME: &str = "x3f-extract.toml";

/// Default number of calibration matrix elements printed by the metadata dump.
pub const DEFAULT_MAX_MATRIX_ELEMENTS: usize = 100;

/// What happens to the temp file when a backend fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailedTempPolicy {
    /// Leave the partial output for inspection.
    #[default]
    Keep,
    Remove,
}

/// Process-wide settings threaded into the opener, dispatcher and backends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessingSettings {
    /// Prefer accelerated processing paths where a backend offers one.
    pub use_accelerator: bool,
    pub legacy_offset: LegacyOffset,
    pub max_matrix_elements: usize,
    pub failed_temp: FailedTempPolicy,
}

impl Default for ProcessingSettings {
    fn default() -> Self {
        Self {
            use_accelerator: false,
            legacy_offset: LegacyOffset::Auto,
            max_matrix_elements: DEFAULT_MAX_MATRIX_ELEMENTS,
            failed_temp: FailedTempPolicy::Keep,
        }
    }
}

/// Main extraction configuration.
///
/// # Example
///
/// ```rust
/// use x3f_extract::ExtractionConfig;
///
/// let config: ExtractionConfig = toml::from_str(r#"
/// format = "tiff"
/// color = "AdobeRGB"
/// spatial_gain = "off"
/// "#).unwrap();
///
/// assert_eq!(config.output_format().unwrap().extension(), ".tif");
/// assert!(!config.toggles().unwrap().spatial_gain.resolve(true));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Output directory (None = next to the input file)
    #[serde(default)]
    pub output_dir: Option<PathBuf>,

    /// Output format token (None = dng)
    #[serde(default)]
    pub format: Option<String>,

    /// Color encoding token (None = sRGB)
    #[serde(default)]
    pub color: Option<String>,

    /// Crop to the active sensor area
    #[serde(default = "default_true")]
    pub crop: bool,

    /// Fix bad pixels
    #[serde(default = "default_true")]
    pub fix_bad_pixels: bool,

    /// Denoise raw data
    #[serde(default = "default_true")]
    pub denoise: bool,

    /// Spatial gain: auto, on or off
    #[serde(default)]
    pub spatial_gain: TriState,

    /// White balance preset (None = as shot)
    #[serde(default)]
    pub white_balance: Option<String>,

    /// Deflate compression for DNG and TIFF output
    #[serde(default)]
    pub compress: bool,

    /// Use accelerated processing when available
    #[serde(default)]
    pub use_accelerator: bool,

    /// Fixed raw offset for SD14 and older (None = automatic)
    #[serde(default)]
    pub legacy_offset: Option<i32>,

    /// Max number of matrix elements printed in metadata dumps
    #[serde(default = "default_max_matrix_elements")]
    pub max_matrix_elements: usize,

    /// Delete the temp file when a backend fails
    #[serde(default)]
    pub remove_failed_temp: bool,
}

fn default_true() -> bool {
    true
}

fn default_max_matrix_elements() -> usize {
    DEFAULT_MAX_MATRIX_ELEMENTS
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            output_dir: None,
            format: None,
            color: None,
            crop: true,
            fix_bad_pixels: true,
            denoise: true,
            spatial_gain: TriState::Auto,
            white_balance: None,
            compress: false,
            use_accelerator: false,
            legacy_offset: None,
            max_matrix_elements: DEFAULT_MAX_MATRIX_ELEMENTS,
            remove_failed_temp: false,
        }
    }
}

impl ExtractionConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns `ExtractError::Config` if the file can't be read or is invalid TOML.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            ExtractError::config_with_source(format!("Failed to read config file {}", path.display()), e)
        })?;

        toml::from_str(&content)
            .map_err(|e| ExtractError::config_with_source(format!("Invalid TOML in {}", path.display()), e))
    }

    /// Load configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            ExtractError::config_with_source(format!("Failed to read config file {}", path.display()), e)
        })?;

        serde_json::from_str(&content)
            .map_err(|e| ExtractError::config_with_source(format!("Invalid JSON in {}", path.display()), e))
    }

    /// Discover `x3f-extract.toml` in the current directory or its parents.
    pub fn discover() -> Result<Option<Self>> {
        let current = std::env::current_dir()?;
        Self::discover_from(&current)
    }

    /// Discover `x3f-extract.toml` starting at `start` and walking up.
    ///
    /// # Returns
    ///
    /// - `Some(config)` for the nearest file found
    /// - `None` if no directory up to the root has one
    pub fn discover_from(start: &Path) -> Result<Option<Self>> {
        for dir in start.ancestors() {
            let candidate = dir.join(CONFIG_FILE_NAME);
            if candidate.is_file() {
                return Ok(Some(Self::from_toml_file(candidate)?));
            }
        }
        Ok(None)
    }

    /// Resolve the configured format token.
    pub fn output_format(&self) -> Result<OutputFormat> {
        match &self.format {
            Some(token) => token.parse(),
            None => Ok(OutputFormat::default()),
        }
    }

    /// Resolve the configured color token and toggles.
    pub fn toggles(&self) -> Result<ProcessingToggles> {
        let color_encoding = match &self.color {
            Some(token) => token.parse()?,
            None => ColorEncoding::default(),
        };

        Ok(ProcessingToggles {
            color_encoding,
            crop: self.crop,
            fix_bad_pixels: self.fix_bad_pixels,
            denoise: self.denoise,
            spatial_gain: self.spatial_gain,
            white_balance: self.white_balance.clone(),
            compress: self.compress,
        })
    }

    /// Build the process-wide settings value.
    pub fn settings(&self) -> ProcessingSettings {
        ProcessingSettings {
            use_accelerator: self.use_accelerator,
            legacy_offset: self.legacy_offset.map_or(LegacyOffset::Auto, LegacyOffset::Fixed),
            max_matrix_elements: self.max_matrix_elements,
            failed_temp: if self.remove_failed_temp {
                FailedTempPolicy::Remove
            } else {
                FailedTempPolicy::Keep
            },
        }
    }
}
