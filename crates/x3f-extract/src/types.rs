//! Request, toggle and outcome types shared across the extraction pipeline.

use crate::{ExtractError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Requested output artifact.
///
/// Each format maps 1:1 to an output file type and a fixed file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OutputFormat {
    /// Textual metadata dump (`meta`).
    Meta,
    /// Embedded JPEG preview (`jpg`).
    Thumbnail,
    /// Undecoded raw image block (`raw`).
    RawBlock,
    /// 3x16 bit TIFF (`tiff`).
    Tiff,
    /// LinearRaw DNG (`dng`).
    #[default]
    Dng,
    /// 3x16 bit PPM, P3 ASCII (`ppm-ascii`).
    PpmAscii,
    /// 3x16 bit PPM, P6 binary (`ppm`).
    PpmBinary,
    /// CSV histogram (`histogram`).
    Histogram,
    /// CSV histogram with log exposure (`loghist`).
    LogHistogram,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 9] = [
        OutputFormat::Meta,
        OutputFormat::Thumbnail,
        OutputFormat::RawBlock,
        OutputFormat::Tiff,
        OutputFormat::Dng,
        OutputFormat::PpmAscii,
        OutputFormat::PpmBinary,
        OutputFormat::Histogram,
        OutputFormat::LogHistogram,
    ];

    /// Command-line token selecting this format.
    pub fn token(self) -> &'static str {
        match self {
            OutputFormat::Meta => "meta",
            OutputFormat::Thumbnail => "jpg",
            OutputFormat::RawBlock => "raw",
            OutputFormat::Tiff => "tiff",
            OutputFormat::Dng => "dng",
            OutputFormat::PpmAscii => "ppm-ascii",
            OutputFormat::PpmBinary => "ppm",
            OutputFormat::Histogram => "histogram",
            OutputFormat::LogHistogram => "loghist",
        }
    }

    /// File extension appended to the output name, including the dot.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Meta => ".meta",
            OutputFormat::Thumbnail => ".jpg",
            OutputFormat::RawBlock => ".raw",
            OutputFormat::Tiff => ".tif",
            OutputFormat::Dng => ".dng",
            OutputFormat::PpmAscii | OutputFormat::PpmBinary => ".ppm",
            OutputFormat::Histogram | OutputFormat::LogHistogram => ".csv",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = ExtractError;

    fn from_str(token: &str) -> Result<Self> {
        OutputFormat::ALL
            .into_iter()
            .find(|format| format.token() == token)
            .ok_or_else(|| ExtractError::config(format!("Unknown format : {}", token)))
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// RGB color encoding applied by the image-producing backends.
///
/// Does not affect DNG output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ColorEncoding {
    /// No scaling and no gamma.
    None,
    #[default]
    Srgb,
    AdobeRgb,
    ProPhotoRgb,
    /// Raw values without any preprocessing.
    Unprocessed,
    /// Quattro top layer without preprocessing.
    QuattroTop,
}

impl ColorEncoding {
    pub const ALL: [ColorEncoding; 6] = [
        ColorEncoding::None,
        ColorEncoding::Srgb,
        ColorEncoding::AdobeRgb,
        ColorEncoding::ProPhotoRgb,
        ColorEncoding::Unprocessed,
        ColorEncoding::QuattroTop,
    ];

    pub fn token(self) -> &'static str {
        match self {
            ColorEncoding::None => "none",
            ColorEncoding::Srgb => "sRGB",
            ColorEncoding::AdobeRgb => "AdobeRGB",
            ColorEncoding::ProPhotoRgb => "ProPhotoRGB",
            ColorEncoding::Unprocessed => "unprocessed",
            ColorEncoding::QuattroTop => "qtop",
        }
    }

    /// True for the encodings that bypass all preprocessing.
    pub fn is_unprocessed(self) -> bool {
        matches!(self, ColorEncoding::Unprocessed | ColorEncoding::QuattroTop)
    }
}

impl FromStr for ColorEncoding {
    type Err = ExtractError;

    fn from_str(token: &str) -> Result<Self> {
        ColorEncoding::ALL
            .into_iter()
            .find(|encoding| encoding.token() == token)
            .ok_or_else(|| ExtractError::config(format!("Unknown color encoding: {}", token)))
    }
}

impl fmt::Display for ColorEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Three-valued toggle whose `Auto` case is decided from the input data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriState {
    #[default]
    Auto,
    Off,
    On,
}

impl TriState {
    /// Resolve against the data-dependent default used for `Auto`.
    pub fn resolve(self, auto: bool) -> bool {
        match self {
            TriState::Auto => auto,
            TriState::Off => false,
            TriState::On => true,
        }
    }
}

/// Raw value offset for SD14 and older sensors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LegacyOffset {
    /// Detect the offset from the file.
    #[default]
    Auto,
    Fixed(i32),
}

/// Processing toggles as requested, before data-dependent resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessingToggles {
    pub color_encoding: ColorEncoding,
    pub crop: bool,
    pub fix_bad_pixels: bool,
    pub denoise: bool,
    pub spatial_gain: TriState,
    /// White balance preset name, `None` for the as-shot preset.
    pub white_balance: Option<String>,
    pub compress: bool,
}

impl Default for ProcessingToggles {
    fn default() -> Self {
        Self {
            color_encoding: ColorEncoding::Srgb,
            crop: true,
            fix_bad_pixels: true,
            denoise: true,
            spatial_gain: TriState::Auto,
            white_balance: None,
            compress: false,
        }
    }
}

/// Toggle set handed to the image-producing backends.
///
/// Identical to [`ProcessingToggles`] except that spatial gain has been
/// resolved against the opened container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedToggles {
    pub color_encoding: ColorEncoding,
    pub crop: bool,
    pub fix_bad_pixels: bool,
    pub denoise: bool,
    pub spatial_gain: bool,
    pub white_balance: Option<String>,
    pub compress: bool,
}

/// One input file's immutable processing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRequest {
    pub input: PathBuf,
    /// Directory override; `None` writes next to the input.
    pub output_dir: Option<PathBuf>,
    pub format: OutputFormat,
    pub toggles: ProcessingToggles,
}

impl RunRequest {
    pub fn new(input: impl Into<PathBuf>, format: OutputFormat) -> Self {
        Self {
            input: input.into(),
            output_dir: None,
            format,
            toggles: ProcessingToggles::default(),
        }
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    pub fn with_toggles(mut self, toggles: ProcessingToggles) -> Self {
        self.toggles = toggles;
        self
    }
}

/// Batch accounting, read-only once the batch completes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunOutcome {
    pub files_seen: usize,
    pub files_errored: usize,
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        self.files_errored == 0
    }

    /// Process exit status: 0 when no file errored, 1 otherwise.
    pub fn exit_code(&self) -> i32 {
        if self.is_success() { 0 } else { 1 }
    }
}
