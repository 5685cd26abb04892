//! Mode resolution.
//!
//! Turns the requested output format and toggles into a [`DerivedPlan`] that
//! names exactly which container sections must be loaded. Resolution is two
//! stage: the plan is fixed before the container is opened, while the `Auto`
//! spatial gain toggle is only finalized against the container's format
//! version, right before dispatch.

use crate::plugins::FormatVersion;
use crate::types::{OutputFormat, ProcessingToggles, ResolvedToggles, RunRequest};

/// Sections and output type derived once per file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DerivedPlan {
    pub needs_thumbnail: bool,
    pub needs_meta: bool,
    pub needs_raw_decoded: bool,
    pub needs_raw_undecoded: bool,
    pub format: OutputFormat,
    pub extension: &'static str,
}

impl DerivedPlan {
    /// Derive the plan for `format` under `toggles`.
    ///
    /// `needs_meta` holds iff the format is `Meta` or `Dng`, or a decoded raw
    /// image is needed and either cropping is on or the color encoding goes
    /// through preprocessing.
    pub fn resolve(format: OutputFormat, toggles: &ProcessingToggles) -> Self {
        let needs_thumbnail = format == OutputFormat::Thumbnail;
        let needs_raw_undecoded = format == OutputFormat::RawBlock;
        let needs_raw_decoded = matches!(
            format,
            OutputFormat::Tiff
                | OutputFormat::Dng
                | OutputFormat::PpmAscii
                | OutputFormat::PpmBinary
                | OutputFormat::Histogram
                | OutputFormat::LogHistogram
        );
        let needs_meta = matches!(format, OutputFormat::Meta | OutputFormat::Dng)
            || (needs_raw_decoded && (toggles.crop || !toggles.color_encoding.is_unprocessed()));

        Self {
            needs_thumbnail,
            needs_meta,
            needs_raw_decoded,
            needs_raw_undecoded,
            format,
            extension: format.extension(),
        }
    }

    pub fn for_request(request: &RunRequest) -> Self {
        Self::resolve(request.format, &request.toggles)
    }
}

/// Spatial gain defaults to on for containers older than the Quattro format.
pub fn spatial_gain_auto(version: FormatVersion) -> bool {
    version < FormatVersion::V4_0
}

/// Finalize the toggle set against the opened container's version.
pub fn resolve_toggles(toggles: &ProcessingToggles, version: FormatVersion) -> ResolvedToggles {
    ResolvedToggles {
        color_encoding: toggles.color_encoding,
        crop: toggles.crop,
        fix_bad_pixels: toggles.fix_bad_pixels,
        denoise: toggles.denoise,
        spatial_gain: toggles.spatial_gain.resolve(spatial_gain_auto(version)),
        white_balance: toggles.white_balance.clone(),
        compress: toggles.compress,
    }
}
