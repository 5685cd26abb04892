//! Per-channel CSV histogram of the processed image.
//!
//! Linear mode lists every value from 0 to the image maximum. Log mode
//! replaces the value with its exposure `log2(value / max)` and omits values
//! no channel hit.

use crate::backends::create_output;
use crate::backends::processing::{Encoding, ProcessedImage, prepare};
use crate::core::config::ProcessingSettings;
use crate::plugins::{BackendKind, Container, DumpBackend, DumpOptions, DumpVariant};
use crate::Result;
use std::io::Write;
use std::path::Path;

pub struct HistogramBackend;

impl DumpBackend for HistogramBackend {
    fn name(&self) -> &str {
        BackendKind::Histogram.name()
    }

    fn kind(&self) -> BackendKind {
        BackendKind::Histogram
    }

    fn dump(&self, container: &dyn Container, output: &Path, options: &DumpOptions, _: &ProcessingSettings) -> Result<()> {
        let log_exposure = matches!(options.variant, DumpVariant::Histogram { log_exposure: true });

        let image = prepare(container, &options.toggles, self.name(), Encoding::Apply)?;
        let counts = count(&image);

        let mut out = create_output(output)?;
        write_csv(&mut out, &counts, image.max_value, log_exposure)?;
        out.flush()?;
        Ok(())
    }
}

/// Per-value `[red, green, blue]` counts; values above the maximum are clamped.
fn count(image: &ProcessedImage) -> Vec<[u64; 3]> {
    let mut counts = vec![[0u64; 3]; usize::from(image.max_value) + 1];
    for pixel in image.data.chunks_exact(3) {
        for (channel, &value) in pixel.iter().enumerate() {
            counts[usize::from(value.min(image.max_value))][channel] += 1;
        }
    }
    counts
}

fn write_csv(out: &mut impl Write, counts: &[[u64; 3]], max_value: u16, log_exposure: bool) -> Result<()> {
    if log_exposure {
        writeln!(out, "exposure,red,green,blue")?;
    } else {
        writeln!(out, "value,red,green,blue")?;
    }

    for (value, [red, green, blue]) in counts.iter().enumerate() {
        if log_exposure {
            if red + green + blue == 0 {
                continue;
            }
            let exposure = (value as f64 / f64::from(max_value)).log2();
            writeln!(out, "{:.4},{},{},{}", exposure, red, green, blue)?;
        } else {
            writeln!(out, "{},{},{},{}", value, red, green, blue)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::test_support::{MemoryContainer, plain_options, settings};
    use crate::plugins::RawImage;
    use tempfile::tempdir;

    fn dump(container: &MemoryContainer, log_exposure: bool) -> String {
        let dir = tempdir().unwrap();
        let output = dir.path().join("a.csv.tmp");
        HistogramBackend
            .dump(
                container,
                &output,
                &plain_options(DumpVariant::Histogram { log_exposure }),
                &settings(),
            )
            .unwrap();
        std::fs::read_to_string(output).unwrap()
    }

    fn small_image() -> MemoryContainer {
        MemoryContainer {
            raw_image: Some(RawImage {
                columns: 2,
                rows: 1,
                data: vec![0, 4, 8, 8, 4, 8],
                max_value: 8,
            }),
            ..MemoryContainer::new()
        }
    }

    #[test]
    fn test_linear_lists_every_value() {
        let text = dump(&small_image(), false);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "value,red,green,blue");
        assert_eq!(lines.len(), 1 + 9);
        assert_eq!(lines[1], "0,1,0,0");
        assert_eq!(lines[5], "4,0,2,0");
        assert_eq!(lines[9], "8,1,0,2");
    }

    #[test]
    fn test_log_skips_empty_values() {
        let text = dump(&small_image(), true);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "exposure,red,green,blue");
        assert_eq!(lines.len(), 1 + 3);
        assert_eq!(lines[1], "-inf,1,0,0");
        assert_eq!(lines[2], "-1.0000,0,2,0");
        assert_eq!(lines[3], "0.0000,1,0,2");
    }

    #[test]
    fn test_counts_clamp_to_max() {
        let image = ProcessedImage {
            columns: 1,
            rows: 1,
            data: vec![9, 9, 1],
            max_value: 8,
        };
        let counts = count(&image);
        assert_eq!(counts[8], [1, 1, 0]);
        assert_eq!(counts[1], [0, 0, 1]);
    }
}
