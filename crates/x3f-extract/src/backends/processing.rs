//! Shared preparation of decoded raw data for the image backends.
//!
//! Cropping and the color encoding transfer curves are applied here.
//! Denoise, bad-pixel fixing, spatial gain and white balance depend on
//! decoding the calibration data and are reported but leave pixels as-is.

use crate::plugins::{Container, RawImage, Rect};
use crate::types::{ColorEncoding, ResolvedToggles};
use crate::{ExtractError, Result};
use tracing::debug;

/// Three-channel image ready to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedImage {
    pub columns: u32,
    pub rows: u32,
    pub data: Vec<u16>,
    pub max_value: u16,
}

impl ProcessedImage {
    fn from_raw(raw: &RawImage) -> Self {
        Self {
            columns: raw.columns,
            rows: raw.rows,
            data: raw.data.clone(),
            max_value: raw.max_value,
        }
    }
}

/// Whether [`prepare`] applies the color encoding's transfer curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Apply,
    Linear,
}

/// Take the decoded raw image from `container` and prepare it for `backend`.
pub fn prepare(
    container: &dyn Container,
    toggles: &ResolvedToggles,
    backend: &str,
    encoding: Encoding,
) -> Result<ProcessedImage> {
    let raw = container
        .raw_image()
        .ok_or_else(|| ExtractError::backend(backend, "no decoded raw image loaded"))?;

    report_unapplied(toggles);

    let mut image = match (toggles.crop, container.active_area()) {
        (true, Some(area)) => crop(raw, area).ok_or_else(|| {
            ExtractError::backend(
                backend,
                format!(
                    "active area {}x{}+{}+{} is outside the {}x{} image",
                    area.width, area.height, area.x, area.y, raw.columns, raw.rows
                ),
            )
        })?,
        _ => ProcessedImage::from_raw(raw),
    };

    if encoding == Encoding::Apply {
        apply_encoding(&mut image, toggles.color_encoding);
    }
    Ok(image)
}

fn report_unapplied(toggles: &ResolvedToggles) {
    if toggles.color_encoding.is_unprocessed() {
        return;
    }
    if toggles.denoise {
        debug!("Denoise requested; calibration-based denoising is not available");
    }
    if toggles.fix_bad_pixels {
        debug!("Bad pixel fixing requested; calibration-based fixing is not available");
    }
    if toggles.spatial_gain {
        debug!("Spatial gain requested; gain maps are not available");
    }
    if let Some(preset) = &toggles.white_balance {
        debug!("White balance '{}' requested; presets are not available", preset);
    }
}

/// Copy the pixels inside `area`; `None` when it does not fit the image.
pub fn crop(raw: &RawImage, area: Rect) -> Option<ProcessedImage> {
    let right = area.x.checked_add(area.width)?;
    let bottom = area.y.checked_add(area.height)?;
    if right > raw.columns || bottom > raw.rows || area.width == 0 || area.height == 0 {
        return None;
    }

    let channels = RawImage::CHANNELS;
    let stride = raw.columns as usize * channels;
    let row_len = area.width as usize * channels;
    let mut data = Vec::with_capacity(row_len * area.height as usize);
    for y in area.y..bottom {
        let start = y as usize * stride + area.x as usize * channels;
        data.extend_from_slice(raw.data.get(start..start + row_len)?);
    }

    Some(ProcessedImage {
        columns: area.width,
        rows: area.height,
        data,
        max_value: raw.max_value,
    })
}

/// Map linear values through the encoding's transfer curve onto the full
/// 16-bit range. `None`, `Unprocessed` and `QuattroTop` leave values as-is.
pub fn apply_encoding(image: &mut ProcessedImage, encoding: ColorEncoding) {
    if matches!(
        encoding,
        ColorEncoding::None | ColorEncoding::Unprocessed | ColorEncoding::QuattroTop
    ) || image.max_value == 0
    {
        return;
    }

    let max = f64::from(image.max_value);
    let lut: Vec<u16> = (0..=image.max_value)
        .map(|value| {
            let encoded = transfer(encoding, f64::from(value) / max);
            (encoded.clamp(0.0, 1.0) * f64::from(u16::MAX)).round() as u16
        })
        .collect();

    for sample in &mut image.data {
        *sample = lut[usize::from((*sample).min(image.max_value))];
    }
    image.max_value = u16::MAX;
}

/// Transfer curve of `encoding` for a linear value in `0.0..=1.0`.
pub fn transfer(encoding: ColorEncoding, linear: f64) -> f64 {
    match encoding {
        ColorEncoding::Srgb => {
            if linear <= 0.003_130_8 {
                12.92 * linear
            } else {
                1.055 * linear.powf(1.0 / 2.4) - 0.055
            }
        }
        ColorEncoding::AdobeRgb => linear.powf(256.0 / 563.0),
        ColorEncoding::ProPhotoRgb => {
            if linear < 1.0 / 512.0 {
                16.0 * linear
            } else {
                linear.powf(1.0 / 1.8)
            }
        }
        ColorEncoding::None | ColorEncoding::Unprocessed | ColorEncoding::QuattroTop => linear,
    }
}
