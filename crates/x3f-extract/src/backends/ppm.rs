//! 3x16 bit PPM output, binary (P6) or ASCII (P3).

use crate::backends::create_output;
use crate::backends::processing::{Encoding, prepare};
use crate::core::config::ProcessingSettings;
use crate::plugins::{BackendKind, Container, DumpBackend, DumpOptions, DumpVariant};
use crate::{ExtractError, Result};
use image::codecs::pnm::{PnmEncoder, PnmSubtype, SampleEncoding};
use image::{DynamicImage, ImageBuffer, Rgb};
use std::io::Write;
use std::path::Path;

pub struct PpmBackend;

impl DumpBackend for PpmBackend {
    fn name(&self) -> &str {
        BackendKind::Ppm.name()
    }

    fn kind(&self) -> BackendKind {
        BackendKind::Ppm
    }

    fn dump(&self, container: &dyn Container, output: &Path, options: &DumpOptions, _: &ProcessingSettings) -> Result<()> {
        let binary = match options.variant {
            DumpVariant::Ppm { binary } => binary,
            _ => true,
        };

        let image = prepare(container, &options.toggles, self.name(), Encoding::Apply)?;
        let buffer: ImageBuffer<Rgb<u16>, Vec<u16>> = ImageBuffer::from_raw(image.columns, image.rows, image.data)
            .ok_or_else(|| ExtractError::backend(self.name(), "pixel buffer does not match the image size"))?;

        let sample_encoding = if binary {
            SampleEncoding::Binary
        } else {
            SampleEncoding::Ascii
        };

        let mut out = create_output(output)?;
        let encoder = PnmEncoder::new(&mut out).with_subtype(PnmSubtype::Pixmap(sample_encoding));
        DynamicImage::ImageRgb16(buffer)
            .write_with_encoder(encoder)
            .map_err(|e| ExtractError::backend_with_source(self.name(), "PPM encoding failed", e))?;
        out.flush()?;
        Ok(())
    }
}
