//! Backend dispatch.
//!
//! Maps each output format onto exactly one backend invocation. The two PPM
//! formats and the two histogram formats share a backend and differ only in
//! the [`DumpVariant`] they pass.

use crate::core::config::ProcessingSettings;
use crate::plugins::{BackendKind, BackendRegistry, Container, DumpOptions, DumpVariant};
use crate::types::{OutputFormat, ResolvedToggles};
use crate::{ExtractError, Result};
use std::path::Path;
use tracing::info;

/// Backend identity and variant for `format`.
pub fn backend_for(format: OutputFormat) -> (BackendKind, DumpVariant) {
    match format {
        OutputFormat::Meta => (BackendKind::Meta, DumpVariant::Plain),
        OutputFormat::Thumbnail => (BackendKind::Thumbnail, DumpVariant::Plain),
        OutputFormat::RawBlock => (BackendKind::RawBlock, DumpVariant::Plain),
        OutputFormat::Tiff => (BackendKind::Tiff, DumpVariant::Plain),
        OutputFormat::Dng => (BackendKind::Dng, DumpVariant::Plain),
        OutputFormat::PpmAscii => (BackendKind::Ppm, DumpVariant::Ppm { binary: false }),
        OutputFormat::PpmBinary => (BackendKind::Ppm, DumpVariant::Ppm { binary: true }),
        OutputFormat::Histogram => (BackendKind::Histogram, DumpVariant::Histogram { log_exposure: false }),
        OutputFormat::LogHistogram => (BackendKind::Histogram, DumpVariant::Histogram { log_exposure: true }),
    }
}

fn describe(format: OutputFormat) -> &'static str {
    match format {
        OutputFormat::Meta => "META DATA",
        OutputFormat::Thumbnail => "JPEG",
        OutputFormat::RawBlock => "RAW block",
        OutputFormat::Tiff => "RAW as TIFF",
        OutputFormat::Dng => "RAW as DNG",
        OutputFormat::PpmAscii => "RAW as PPM (ASCII)",
        OutputFormat::PpmBinary => "RAW as PPM",
        OutputFormat::Histogram => "RAW as CSV histogram",
        OutputFormat::LogHistogram => "RAW as CSV log histogram",
    }
}

/// Invoke the backend for `format`, writing to `temp_path`.
///
/// `final_path` is only used for progress output. Errors that do not already
/// carry a backend identity are wrapped in `ExtractError::Backend`.
pub fn dispatch(
    registry: &BackendRegistry,
    container: &dyn Container,
    format: OutputFormat,
    toggles: ResolvedToggles,
    temp_path: &Path,
    final_path: &Path,
    settings: &ProcessingSettings,
) -> Result<()> {
    let (kind, variant) = backend_for(format);
    let backend = registry.get(kind)?;
    let options = DumpOptions { toggles, variant };

    info!("Dump {} to {}", describe(format), final_path.display());

    backend
        .dump(container, temp_path, &options, settings)
        .map_err(|err| match err {
            ExtractError::Backend { .. } => err,
            other => {
                let message = other.to_string();
                ExtractError::backend_with_source(backend.name(), message, other)
            }
        })
}
