//! LinearRaw DNG output.
//!
//! Writes the decoded (optionally cropped) sensor values without a transfer
//! curve, tagged as DNG 1.4 `LinearRaw` with an identity color matrix and
//! a neutral as-shot white point. Camera make and model come from the
//! property section when it was loaded.

use crate::backends::create_output;
use crate::backends::processing::{Encoding, ProcessedImage, prepare};
use crate::core::config::ProcessingSettings;
use crate::plugins::{BackendKind, Container, DumpBackend, DumpOptions};
use crate::{ExtractError, Result};
use std::io::{Seek, Write};
use std::path::Path;
use tiff::encoder::compression::{Compression, Deflate, Uncompressed};
use tiff::encoder::{Rational, SRational, TiffEncoder, colortype};
use tiff::tags::Tag;

const PHOTOMETRIC_LINEAR_RAW: u16 = 34892;
const TAG_DNG_VERSION: u16 = 50706;
const TAG_DNG_BACKWARD_VERSION: u16 = 50707;
const TAG_UNIQUE_CAMERA_MODEL: u16 = 50708;
const TAG_BLACK_LEVEL: u16 = 50714;
const TAG_WHITE_LEVEL: u16 = 50717;
const TAG_COLOR_MATRIX_1: u16 = 50721;
const TAG_AS_SHOT_NEUTRAL: u16 = 50728;
const TAG_CALIBRATION_ILLUMINANT_1: u16 = 50778;

/// D65 in the EXIF light source table.
const ILLUMINANT_D65: u16 = 21;

const FALLBACK_MAKE: &str = "SIGMA";

pub struct DngBackend;

struct CameraInfo {
    make: String,
    model: String,
    orientation: u16,
}

impl CameraInfo {
    fn from_container(container: &dyn Container) -> Self {
        let property = |name: &str| {
            container
                .properties()
                .and_then(|props| props.iter().find(|p| p.name == name))
                .map(|p| p.value.clone())
        };

        let make = property("CAMMANUF").unwrap_or_else(|| FALLBACK_MAKE.to_string());
        let model = property("CAMMODEL").unwrap_or_else(|| format!("{} camera", make));
        let orientation = match container.header().rotation {
            90 => 6,
            180 => 3,
            270 => 8,
            _ => 1,
        };

        Self {
            make,
            model,
            orientation,
        }
    }
}

impl DumpBackend for DngBackend {
    fn name(&self) -> &str {
        BackendKind::Dng.name()
    }

    fn kind(&self) -> BackendKind {
        BackendKind::Dng
    }

    fn dump(&self, container: &dyn Container, output: &Path, options: &DumpOptions, _: &ProcessingSettings) -> Result<()> {
        let image = prepare(container, &options.toggles, self.name(), Encoding::Linear)?;
        let camera = CameraInfo::from_container(container);

        let mut out = create_output(output)?;
        let written = if options.toggles.compress {
            encode(&mut out, Deflate::default(), &image, &camera)
        } else {
            encode(&mut out, Uncompressed, &image, &camera)
        };
        written.map_err(|e| ExtractError::backend_with_source(self.name(), "DNG encoding failed", e))?;
        out.flush()?;
        Ok(())
    }
}

fn encode<W, D>(writer: W, compression: D, image: &ProcessedImage, camera: &CameraInfo) -> tiff::TiffResult<()>
where
    W: Write + Seek,
    D: Compression,
{
    let mut encoder = TiffEncoder::new(writer)?;
    let mut dng = encoder.new_image_with_compression::<colortype::RGB16, D>(image.columns, image.rows, compression)?;

    let identity = [
        SRational { n: 1, d: 1 },
        SRational { n: 0, d: 1 },
        SRational { n: 0, d: 1 },
        SRational { n: 0, d: 1 },
        SRational { n: 1, d: 1 },
        SRational { n: 0, d: 1 },
        SRational { n: 0, d: 1 },
        SRational { n: 0, d: 1 },
        SRational { n: 1, d: 1 },
    ];
    let neutral = [Rational { n: 1, d: 1 }, Rational { n: 1, d: 1 }, Rational { n: 1, d: 1 }];
    let white = u32::from(image.max_value);

    let dir = dng.encoder();
    dir.write_tag(Tag::PhotometricInterpretation, PHOTOMETRIC_LINEAR_RAW)?;
    dir.write_tag(Tag::Make, camera.make.as_str())?;
    dir.write_tag(Tag::Model, camera.model.as_str())?;
    dir.write_tag(Tag::Orientation, camera.orientation)?;
    dir.write_tag(Tag::Unknown(TAG_DNG_VERSION), &[1u8, 4, 0, 0][..])?;
    dir.write_tag(Tag::Unknown(TAG_DNG_BACKWARD_VERSION), &[1u8, 1, 0, 0][..])?;
    dir.write_tag(Tag::Unknown(TAG_UNIQUE_CAMERA_MODEL), camera.model.as_str())?;
    dir.write_tag(Tag::Unknown(TAG_BLACK_LEVEL), 0u32)?;
    dir.write_tag(Tag::Unknown(TAG_WHITE_LEVEL), &[white, white, white][..])?;
    dir.write_tag(Tag::Unknown(TAG_COLOR_MATRIX_1), &identity[..])?;
    dir.write_tag(Tag::Unknown(TAG_AS_SHOT_NEUTRAL), &neutral[..])?;
    dir.write_tag(Tag::Unknown(TAG_CALIBRATION_ILLUMINANT_1), ILLUMINANT_D65)?;

    dng.write_data(&image.data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::test_support::{MemoryContainer, plain_options, settings};
    use crate::plugins::{DumpVariant, Property};
    use tempfile::tempdir;

    fn contains(haystack: &[u8], needle: &[u8]) -> bool {
        haystack.windows(needle.len()).any(|window| window == needle)
    }

    #[test]
    fn test_writes_camera_model() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("a.dng.tmp");
        let mut container = MemoryContainer::with_image();
        container.properties = Some(vec![Property {
            name: "CAMMODEL".to_string(),
            value: "SIGMA DP2 Merrill".to_string(),
        }]);

        DngBackend
            .dump(&container, &output, &plain_options(DumpVariant::Plain), &settings())
            .unwrap();

        let bytes = std::fs::read(&output).unwrap();
        assert_eq!(&bytes[..2], b"II");
        assert!(contains(&bytes, b"SIGMA DP2 Merrill"));
    }

    #[test]
    fn test_camera_info_fallbacks() {
        let mut container = MemoryContainer::new();
        container.header.rotation = 270;
        let camera = CameraInfo::from_container(&container);
        assert_eq!(camera.make, "SIGMA");
        assert_eq!(camera.model, "SIGMA camera");
        assert_eq!(camera.orientation, 8);
    }

    #[test]
    fn test_compressed_dng() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("a.dng.tmp");
        let mut options = plain_options(DumpVariant::Plain);
        options.toggles.compress = true;

        DngBackend
            .dump(&MemoryContainer::with_image(), &output, &options, &settings())
            .unwrap();
        assert!(output.exists());
    }

    #[test]
    fn test_requires_decoded_image() {
        let dir = tempdir().unwrap();
        let result = DngBackend.dump(
            &MemoryContainer::new(),
            &dir.path().join("a.dng.tmp"),
            &plain_options(DumpVariant::Plain),
            &settings(),
        );
        assert!(matches!(result, Err(ExtractError::Backend { .. })));
    }
}
