//! # x3f_extract
//!
//! Extracts metadata, JPEG previews, raw image blocks and converted images
//! from X3F camera-raw files.
//!
//! ```bash
//! # DNG next to each input
//! x3f_extract a.x3f b.x3f
//!
//! # Linear TIFF into another directory
//! x3f_extract -f tiff -c none -o out/ a.x3f
//!
//! # Metadata dump, progress silenced
//! x3f_extract -q -f meta a.x3f
//! ```
//!
//! Options not given on the command line come from `x3f-extract.toml`
//! (found in the current directory or a parent) or `--config FILE`.

mod logging;

use anyhow::{Context, Result};
use clap::Parser;
use logging::Verbosity;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info, warn};
use x3f_extract::{ExtractionConfig, Extractor, RunOutcome, RunRequest, TriState};

#[derive(Parser, Debug)]
#[command(name = "x3f_extract")]
#[command(about = "Extract images and metadata from X3F camera-raw files")]
#[command(version)]
struct Cli {
    /// Input X3F files, processed in order
    files: Vec<PathBuf>,

    /// Write output files into this directory instead of next to the input
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Print debug progress
    #[arg(short, long)]
    debug: bool,

    /// Suppress progress output
    #[arg(short, long)]
    quiet: bool,

    /// Output format: meta, jpg, raw, tiff, dng, ppm-ascii, ppm, histogram, loghist
    #[arg(short, long, value_name = "TOKEN")]
    format: Option<String>,

    /// Color encoding: none, sRGB, AdobeRGB, ProPhotoRGB, unprocessed, qtop
    #[arg(short, long, value_name = "TOKEN")]
    color: Option<String>,

    /// Keep the full sensor area
    #[arg(short = 'r', long, alias = "noCrop")]
    no_crop: bool,

    /// Skip denoising
    #[arg(long, alias = "noDenoise")]
    no_denoise: bool,

    /// Never apply spatial gain
    #[arg(long, alias = "noSGain")]
    no_sgain: bool,

    /// Always apply spatial gain (wins over --no-sgain)
    #[arg(long)]
    sgain: bool,

    /// Skip bad pixel fixing
    #[arg(short = 'b', long, alias = "noFixBad")]
    no_fix_bad: bool,

    /// White balance preset instead of the as-shot one
    #[arg(short, long, alias = "whiteBalance", value_name = "NAME")]
    white_balance: Option<String>,

    /// Deflate-compress DNG and TIFF output
    #[arg(short = 'z', long)]
    compress: bool,

    /// Use accelerated processing when available
    #[arg(long)]
    ocl: bool,

    /// Fixed raw offset for legacy sensors
    #[arg(long, value_name = "N", allow_negative_numbers = true)]
    offset: Option<i32>,

    /// Max number of calibration matrix elements in metadata dumps
    #[arg(long, value_name = "N")]
    matrixmax: Option<usize>,

    /// Configuration file (default: discover x3f-extract.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

impl Cli {
    /// Apply the options given on the command line over `config`.
    fn merge_into(&self, mut config: ExtractionConfig) -> ExtractionConfig {
        if let Some(dir) = &self.output {
            config.output_dir = Some(dir.clone());
        }
        if let Some(format) = &self.format {
            config.format = Some(format.clone());
        }
        if let Some(color) = &self.color {
            config.color = Some(color.clone());
        }
        if self.no_crop {
            config.crop = false;
        }
        if self.no_denoise {
            config.denoise = false;
        }
        if self.no_fix_bad {
            config.fix_bad_pixels = false;
        }
        if self.sgain {
            config.spatial_gain = TriState::On;
        } else if self.no_sgain {
            config.spatial_gain = TriState::Off;
        }
        if let Some(preset) = &self.white_balance {
            config.white_balance = Some(preset.clone());
        }
        if self.compress {
            config.compress = true;
        }
        if self.ocl {
            config.use_accelerator = true;
        }
        if let Some(offset) = self.offset {
            config.legacy_offset = Some(offset);
        }
        if let Some(max) = self.matrixmax {
            config.max_matrix_elements = max;
        }
        config
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<ExtractionConfig> {
    let config = match path {
        Some(path) => Some(
            ExtractionConfig::from_toml_file(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?,
        ),
        None => ExtractionConfig::discover().context("Failed to discover x3f-extract.toml")?,
    };
    Ok(config.unwrap_or_default())
}

/// Build one request per input file.
///
/// Fails on an unknown format or color token before any file is touched.
fn requests(files: &[PathBuf], config: &ExtractionConfig) -> x3f_extract::Result<Vec<RunRequest>> {
    let format = config.output_format()?;
    let toggles = config.toggles()?;

    Ok(files
        .iter()
        .map(|file| {
            let request = RunRequest::new(file, format).with_toggles(toggles.clone());
            match &config.output_dir {
                Some(dir) => request.with_output_dir(dir),
                None => request,
            }
        })
        .collect())
}

fn run(cli: &Cli) -> Result<RunOutcome> {
    let config = cli.merge_into(load_config(cli.config.as_ref())?);
    let requests = requests(&cli.files, &config)?;

    if let Some(dir) = &config.output_dir
        && !dir.as_os_str().is_empty()
        && !dir.is_dir()
    {
        warn!("{} is not a directory", dir.display());
    }

    let extractor = Extractor::with_settings(config.settings());
    Ok(extractor.run(requests))
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(err) = logging::init(Verbosity::from_flags(cli.quiet, cli.debug)) {
        eprintln!("{:#}", err);
    }
    info!("X3F TOOLS VERSION = {}", env!("CARGO_PKG_VERSION"));

    match run(&cli) {
        Ok(outcome) if outcome.is_success() => ExitCode::SUCCESS,
        Ok(_) => ExitCode::FAILURE,
        Err(err) => {
            error!("{:#}", err);
            ExitCode::FAILURE
        }
    }
}
