//! 3x16 bit RGB TIFF output.

use crate::backends::create_output;
use crate::backends::processing::{Encoding, prepare};
use crate::core::config::ProcessingSettings;
use crate::plugins::{BackendKind, Container, DumpBackend, DumpOptions};
use crate::{ExtractError, Result};
use std::io::{Seek, Write};
use std::path::Path;
use tiff::encoder::compression::{Deflate, Uncompressed};
use tiff::encoder::{TiffEncoder, colortype};

pub struct TiffBackend;

impl DumpBackend for TiffBackend {
    fn name(&self) -> &str {
        BackendKind::Tiff.name()
    }

    fn kind(&self) -> BackendKind {
        BackendKind::Tiff
    }

    fn dump(&self, container: &dyn Container, output: &Path, options: &DumpOptions, _: &ProcessingSettings) -> Result<()> {
        let image = prepare(container, &options.toggles, self.name(), Encoding::Apply)?;

        let mut out = create_output(output)?;
        let written = if options.toggles.compress {
            encode(&mut out, Deflate::default(), image.columns, image.rows, &image.data)
        } else {
            encode(&mut out, Uncompressed, image.columns, image.rows, &image.data)
        };
        written.map_err(|e| ExtractError::backend_with_source(self.name(), "TIFF encoding failed", e))?;
        out.flush()?;
        Ok(())
    }
}

fn encode<W, D>(writer: W, compression: D, columns: u32, rows: u32, data: &[u16]) -> tiff::TiffResult<()>
where
    W: Write + Seek,
    D: tiff::encoder::compression::Compression,
{
    let mut encoder = TiffEncoder::new(writer)?;
    encoder.write_image_with_compression::<colortype::RGB16, D>(columns, rows, compression, data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::test_support::{MemoryContainer, plain_options, settings};
    use crate::plugins::DumpVariant;
    use tempfile::tempdir;

    #[test]
    fn test_writes_little_endian_tiff() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("a.tif.tmp");

        TiffBackend
            .dump(
                &MemoryContainer::with_image(),
                &output,
                &plain_options(DumpVariant::Plain),
                &settings(),
            )
            .unwrap();

        let bytes = std::fs::read(&output).unwrap();
        assert_eq!(&bytes[..4], b"II*\0");
        assert!(bytes.len() > 24);
    }

    #[test]
    fn test_compressed_output_is_tiff() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("a.tif.tmp");
        let mut options = plain_options(DumpVariant::Plain);
        options.toggles.compress = true;

        TiffBackend
            .dump(&MemoryContainer::with_image(), &output, &options, &settings())
            .unwrap();
        assert_eq!(&std::fs::read(&output).unwrap()[..2], b"II");
    }

    #[test]
    fn test_requires_decoded_image() {
        let dir = tempdir().unwrap();
        let err = TiffBackend
            .dump(
                &MemoryContainer::new(),
                &dir.path().join("a.tif.tmp"),
                &plain_options(DumpVariant::Plain),
                &settings(),
            )
            .unwrap_err();
        assert!(matches!(err, ExtractError::Backend { ref backend, .. } if backend == "tiff"));
    }
}
