//! Textual metadata dump.
//!
//! Prints the header, the section directory, every property and a summary
//! of the calibration (CAMF) payload. At most
//! [`ProcessingSettings::max_matrix_elements`] payload words are printed.

use crate::backends::create_output;
use crate::core::config::ProcessingSettings;
use crate::plugins::{BackendKind, Container, DumpBackend, DumpOptions};
use crate::x3f::image_format_name;
use crate::{ExtractError, Result};
use std::io::Write;
use std::path::Path;

const WORDS_PER_LINE: usize = 8;

pub struct MetaBackend;

impl DumpBackend for MetaBackend {
    fn name(&self) -> &str {
        BackendKind::Meta.name()
    }

    fn kind(&self) -> BackendKind {
        BackendKind::Meta
    }

    fn dump(
        &self,
        container: &dyn Container,
        output: &Path,
        _: &DumpOptions,
        settings: &ProcessingSettings,
    ) -> Result<()> {
        let calibration = container
            .calibration()
            .ok_or_else(|| ExtractError::backend(self.name(), "no CAMF section loaded"))?;

        let mut out = create_output(output)?;
        write_header(&mut out, container)?;
        write_directory(&mut out, container)?;
        write_properties(&mut out, container)?;
        write_calibration(&mut out, calibration, settings.max_matrix_elements)?;
        out.flush()?;
        Ok(())
    }
}

fn write_header(out: &mut impl Write, container: &dyn Container) -> Result<()> {
    let header = container.header();
    writeln!(out, "BEGIN: file header meta data")?;
    writeln!(out, "version = {}", header.version)?;
    let unique_id: String = header.unique_id.iter().map(|b| format!("{:02x}", b)).collect();
    writeln!(out, "unique_identifier = {}", unique_id)?;
    writeln!(out, "mark_bits = {:#x}", header.mark_bits)?;
    writeln!(out, "columns = {}", header.columns)?;
    writeln!(out, "rows = {}", header.rows)?;
    writeln!(out, "rotation = {}", header.rotation)?;
    if let Some(white_balance) = &header.white_balance {
        writeln!(out, "white_balance = {}", white_balance)?;
    }
    if let Some(color_mode) = &header.color_mode {
        writeln!(out, "color_mode = {}", color_mode)?;
    }
    for (ext_type, value) in &header.extended_data {
        writeln!(out, "extended_data[type {}] = {}", ext_type, value)?;
    }
    writeln!(out, "END: file header meta data")?;
    writeln!(out)?;
    Ok(())
}

fn write_directory(out: &mut impl Write, container: &dyn Container) -> Result<()> {
    let sections = container.sections();
    writeln!(out, "BEGIN: directory meta data ({} entries)", sections.len())?;
    for (index, section) in sections.iter().enumerate() {
        write!(
            out,
            "[{}] {} offset = {} length = {}",
            index, section.tag, section.offset, section.length
        )?;
        if let Some(type_format) = section.type_format {
            write!(out, " type_format = {:#010x}", type_format)?;
            if let Some(name) = image_format_name(type_format) {
                write!(out, " ({})", name)?;
            }
        }
        writeln!(out)?;
    }
    writeln!(out, "END: directory meta data")?;
    writeln!(out)?;
    Ok(())
}

fn write_properties(out: &mut impl Write, container: &dyn Container) -> Result<()> {
    let Some(properties) = container.properties() else {
        return Ok(());
    };
    writeln!(out, "BEGIN: PROP meta data ({} properties)", properties.len())?;
    for property in properties {
        writeln!(out, "{} = {}", property.name, property.value)?;
    }
    writeln!(out, "END: PROP meta data")?;
    writeln!(out)?;
    Ok(())
}

fn write_calibration(out: &mut impl Write, calibration: &[u8], max_elements: usize) -> Result<()> {
    let words: Vec<u32> = calibration
        .chunks_exact(4)
        .map(|w| u32::from_le_bytes([w[0], w[1], w[2], w[3]]))
        .collect();
    let shown = words.len().min(max_elements);

    writeln!(out, "BEGIN: CAMF meta data")?;
    writeln!(out, "size = {} bytes", calibration.len())?;
    writeln!(out, "words shown = {} of {}", shown, words.len())?;
    for line in words[..shown].chunks(WORDS_PER_LINE) {
        let text: Vec<String> = line.iter().map(|w| format!("{:08x}", w)).collect();
        writeln!(out, "  {}", text.join(" "))?;
    }
    if shown < words.len() {
        writeln!(out, "  ...")?;
    }
    writeln!(out, "END: CAMF meta data")?;
    Ok(())
}
