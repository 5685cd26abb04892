//! X3F implementation of the container seam.

use crate::core::config::ProcessingSettings;
use crate::plugins::{
    Container, ContainerHeader, ContainerOpener, Property, RawDecoder, RawImage, SectionInfo, SectionKind, SectionRef,
};
use crate::x3f::bytes::{read_exact_at, tag, tag_name};
use crate::x3f::directory::{DirEntry, ENTRY_CAMF, ENTRY_PROP, read_directory};
use crate::x3f::header::{MAX_HEADER_LEN, parse_header};
use crate::x3f::image::{IMAGE_HEADER_LEN, ImageHeader, THUMB_JPEG, raw_format_name};
use crate::x3f::properties::parse_properties;
use crate::{ExtractError, Result};
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

pub const SECC: u32 = tag(b"SECc");

/// Signature, version, type and four type-specific words.
pub const CAMF_HEADER_LEN: usize = 28;

/// Opens X3F files.
///
/// Raw sections are only decoded through registered [`RawDecoder`]s; without
/// one, a decoded raw load fails while undecoded dumps keep working.
#[derive(Clone, Default)]
pub struct X3fOpener {
    decoders: Vec<Arc<dyn RawDecoder>>,
}

impl X3fOpener {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a raw decoder. Earlier decoders win when several support a section.
    pub fn with_decoder(mut self, decoder: Arc<dyn RawDecoder>) -> Self {
        self.decoders.push(decoder);
        self
    }
}

impl ContainerOpener for X3fOpener {
    fn open(&self, path: &Path, settings: &ProcessingSettings) -> Result<Box<dyn Container>> {
        let file = File::open(path).map_err(|source| ExtractError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let container = X3fContainer::from_reader(file, settings.clone(), self.decoders.clone())?;
        Ok(Box::new(container))
    }
}

struct Section {
    entry: DirEntry,
    image: Option<ImageHeader>,
}

/// An opened X3F file. Dropping it closes the reader.
pub struct X3fContainer<R> {
    reader: R,
    header: ContainerHeader,
    sections: Vec<Section>,
    listing: Vec<SectionInfo>,
    settings: ProcessingSettings,
    decoders: Vec<Arc<dyn RawDecoder>>,
    thumbnail: Option<Vec<u8>>,
    properties: Option<Vec<Property>>,
    calibration: Option<Vec<u8>>,
    raw_block: Option<Vec<u8>>,
    raw_image: Option<RawImage>,
}

impl<R: Read + Seek> X3fContainer<R> {
    /// Read the header, the directory and every image section header.
    pub fn from_reader(mut reader: R, settings: ProcessingSettings, decoders: Vec<Arc<dyn RawDecoder>>) -> Result<Self> {
        let file_len = reader
            .seek(SeekFrom::End(0))
            .map_err(|e| ExtractError::parse_with_source("could not determine file length", e))?;

        let mut head = vec![0u8; MAX_HEADER_LEN.min(file_len as usize)];
        read_exact_at(&mut reader, 0, &mut head)
            .map_err(|e| ExtractError::parse_with_source("could not read file header", e))?;
        let header = parse_header(&head)?;

        let entries = read_directory(&mut reader, file_len)?;
        let mut sections = Vec::with_capacity(entries.len());
        for entry in entries {
            let image = if entry.is_image() {
                if (entry.length as usize) < IMAGE_HEADER_LEN {
                    return Err(ExtractError::parse(format!(
                        "image section at {} is shorter than its header",
                        entry.offset
                    )));
                }
                let mut bytes = [0u8; IMAGE_HEADER_LEN];
                read_exact_at(&mut reader, u64::from(entry.offset), &mut bytes)
                    .map_err(|e| ExtractError::parse_with_source("could not read image section header", e))?;
                Some(ImageHeader::parse(&bytes)?)
            } else {
                None
            };
            sections.push(Section { entry, image });
        }

        let listing = sections
            .iter()
            .map(|section| SectionInfo {
                tag: tag_name(section.entry.tag),
                offset: u64::from(section.entry.offset),
                length: u64::from(section.entry.length),
                type_format: section.image.map(|image| image.type_format),
            })
            .collect();

        debug!(
            "X3F version {} with {} sections",
            header.version,
            sections.len()
        );

        Ok(Self {
            reader,
            header,
            sections,
            listing,
            settings,
            decoders,
            thumbnail: None,
            properties: None,
            calibration: None,
            raw_block: None,
            raw_image: None,
        })
    }

    fn position(&self, predicate: impl Fn(&Section) -> bool) -> Option<usize> {
        self.sections.iter().position(predicate)
    }

    fn read_section(&mut self, section: SectionRef) -> Result<(Option<ImageHeader>, Vec<u8>)> {
        let (entry, image) = self
            .sections
            .get(section.index)
            .map(|s| (s.entry, s.image))
            .ok_or_else(|| ExtractError::section_load(section.kind.name(), "no such directory entry"))?;

        let mut bytes = vec![0u8; entry.length as usize];
        read_exact_at(&mut self.reader, u64::from(entry.offset), &mut bytes)
            .map_err(|e| ExtractError::section_load_with_source(section.kind.name(), "read failed", e))?;
        Ok((image, bytes))
    }

    fn read_image_payload(&mut self, section: SectionRef) -> Result<(ImageHeader, Vec<u8>)> {
        let (image, mut bytes) = self.read_section(section)?;
        let image =
            image.ok_or_else(|| ExtractError::section_load(section.kind.name(), "directory entry is not an image"))?;
        bytes.drain(..IMAGE_HEADER_LEN);
        Ok((image, bytes))
    }

    fn decode_raw(&self, image: &ImageHeader, payload: &[u8]) -> Result<RawImage> {
        let layout = image.layout();
        let format_name = raw_format_name(image.type_format).unwrap_or("unknown");
        let decoder = self
            .decoders
            .iter()
            .find(|decoder| decoder.supports(&layout))
            .ok_or_else(|| {
                ExtractError::section_load(
                    SectionKind::Raw.name(),
                    format!(
                        "no decoder for {} data (type/format {:#010x})",
                        format_name, image.type_format
                    ),
                )
            })?;

        debug!("Decoding {} raw data with {}", format_name, decoder.name());
        let decoded = decoder.decode(payload, &layout, &self.settings)?;

        let expected = decoded.columns as usize * decoded.rows as usize * RawImage::CHANNELS;
        if decoded.data.len() != expected {
            return Err(ExtractError::section_load(
                SectionKind::Raw.name(),
                format!(
                    "decoder {} returned {} samples for a {}x{} image",
                    decoder.name(),
                    decoded.data.len(),
                    decoded.columns,
                    decoded.rows
                ),
            ));
        }
        Ok(decoded)
    }
}

impl<R: Read + Seek> Container for X3fContainer<R> {
    fn header(&self) -> &ContainerHeader {
        &self.header
    }

    fn sections(&self) -> &[SectionInfo] {
        &self.listing
    }

    fn section(&self, kind: SectionKind) -> Option<SectionRef> {
        let index = match kind {
            SectionKind::Thumbnail => {
                self.position(|s| s.image.is_some_and(|image| image.type_format == THUMB_JPEG))
            }
            SectionKind::Properties => self.position(|s| s.entry.tag == ENTRY_PROP),
            SectionKind::Calibration => self.position(|s| s.entry.tag == ENTRY_CAMF),
            SectionKind::Raw => return self.raw_section(),
        }?;
        Some(SectionRef { kind, index })
    }

    fn raw_section(&self) -> Option<SectionRef> {
        self.position(|s| s.image.is_some_and(|image| image.is_raw()))
            .map(|index| SectionRef {
                kind: SectionKind::Raw,
                index,
            })
    }

    fn load(&mut self, section: SectionRef) -> Result<()> {
        match section.kind {
            SectionKind::Thumbnail => {
                if self.thumbnail.is_none() {
                    let (_, payload) = self.read_image_payload(section)?;
                    self.thumbnail = Some(payload);
                }
            }
            SectionKind::Properties => {
                if self.properties.is_none() {
                    let (_, bytes) = self.read_section(section)?;
                    let properties = parse_properties(&bytes).map_err(|e| {
                        ExtractError::section_load_with_source(section.kind.name(), "invalid property section", e)
                    })?;
                    debug!("Loaded {} properties", properties.len());
                    self.properties = Some(properties);
                }
            }
            SectionKind::Calibration => {
                if self.calibration.is_none() {
                    let (_, bytes) = self.read_section(section)?;
                    if bytes.len() < CAMF_HEADER_LEN || bytes[..4] != SECC.to_le_bytes() {
                        return Err(ExtractError::section_load(section.kind.name(), "bad CAMF section header"));
                    }
                    self.calibration = Some(bytes[CAMF_HEADER_LEN..].to_vec());
                }
            }
            SectionKind::Raw => {
                if self.raw_image.is_none() {
                    let (image, payload) = self.read_image_payload(section)?;
                    self.raw_image = Some(self.decode_raw(&image, &payload)?);
                }
            }
        }
        Ok(())
    }

    fn load_undecoded(&mut self, section: SectionRef) -> Result<()> {
        if section.kind != SectionKind::Raw {
            return Err(ExtractError::section_load(
                section.kind.name(),
                "only raw image sections can be loaded undecoded",
            ));
        }
        if self.raw_block.is_none() {
            let (_, payload) = self.read_image_payload(section)?;
            self.raw_block = Some(payload);
        }
        Ok(())
    }

    fn thumbnail(&self) -> Option<&[u8]> {
        self.thumbnail.as_deref()
    }

    fn properties(&self) -> Option<&[Property]> {
        self.properties.as_deref()
    }

    fn calibration(&self) -> Option<&[u8]> {
        self.calibration.as_deref()
    }

    fn raw_block(&self) -> Option<&[u8]> {
        self.raw_block.as_deref()
    }

    fn raw_image(&self) -> Option<&RawImage> {
        self.raw_image.as_ref()
    }
}
