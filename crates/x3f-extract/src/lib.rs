//! x3f-extract - X3F Camera Raw Extraction Library
//!
//! Extracts content from X3F camera-raw containers and produces one
//! standalone artifact per input file: a metadata dump, the embedded JPEG
//! preview, the undecoded raw block, or a converted image (DNG, TIFF, PPM,
//! or a CSV exposure histogram).
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use x3f_extract::{Extractor, OutputFormat, RunRequest};
//!
//! # fn main() -> x3f_extract::Result<()> {
//! let extractor = Extractor::default();
//! let request = RunRequest::new("DSC_0001.X3F", OutputFormat::Thumbnail);
//! let written = extractor.extract_file(&request)?;
//! println!("Wrote {}", written.display());
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - **Core Module** (`core`): mode resolution, path building, section load
//!   sequencing, backend dispatch, atomic commit and batch accounting
//! - **Plugin System** (`plugins`): traits for containers, raw decoders and
//!   dump backends, plus the backend registry
//! - **X3F** (`x3f`): built-in container parser
//! - **Backends** (`backends`): built-in writers for every output format

#![deny(unsafe_code)]

pub mod backends;
pub mod core;
pub mod error;
pub mod plugins;
pub mod types;
pub mod x3f;

pub use error::{ExtractError, Result};
pub use types::*;

pub use core::config::{ExtractionConfig, FailedTempPolicy, ProcessingSettings};
pub use core::extractor::Extractor;
pub use core::paths::PathPair;
pub use core::plan::DerivedPlan;
