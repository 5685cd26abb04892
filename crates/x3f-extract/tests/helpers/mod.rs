//! Shared fixtures for integration tests.
//!
//! - [`X3fBuilder`] assembles synthetic X3F files byte by byte
//! - [`PlainDecoder`] decodes raw payloads stored as plain 16-bit triples
//! - [`FakeOpener`] / [`FakeContainer`] stand in for the parser without touching the filesystem
//! - [`RecordingBackend`] records every dump call and writes fixed bytes

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use x3f_extract::plugins::{
    BackendKind, BackendRegistry, Container, ContainerHeader, ContainerOpener, DumpBackend, DumpOptions,
    FormatVersion, Property, RawDecoder, RawImage, RawSectionLayout, SectionInfo, SectionKind, SectionRef,
};
use x3f_extract::{ExtractError, ProcessingSettings, Result};

pub const JPEG_BYTES: &[u8] = &[0xff, 0xd8, 0xff, 0xe0, 0x00, 0x10, b'J', b'F', b'I', b'F', 0xff, 0xd9];

/// Merrill raw type/format word.
pub const RAW_MERRILL: u32 = 0x0001_001e;

pub struct RawSection {
    pub type_format: u32,
    pub columns: u32,
    pub rows: u32,
    pub payload: Vec<u8>,
}

/// Builds a little-endian X3F file.
pub struct X3fBuilder {
    pub version: FormatVersion,
    pub columns: u32,
    pub rows: u32,
    pub white_balance: &'static str,
    pub thumbnail: Option<Vec<u8>>,
    pub properties: Option<Vec<(String, String)>>,
    pub camf: Option<Vec<u8>>,
    pub raw: Option<RawSection>,
}

impl X3fBuilder {
    pub fn new(version: FormatVersion) -> Self {
        Self {
            version,
            columns: 4,
            rows: 2,
            white_balance: "Auto",
            thumbnail: None,
            properties: None,
            camf: None,
            raw: None,
        }
    }

    /// A file with every section, a 4x2 Merrill raw image and a JPEG preview.
    pub fn complete(version: FormatVersion) -> Self {
        let mut builder = Self::new(version);
        builder.thumbnail = Some(JPEG_BYTES.to_vec());
        builder.properties = Some(vec![
            ("CAMMANUF".to_string(), "SIGMA".to_string()),
            ("CAMMODEL".to_string(), "SIGMA DP1 Merrill".to_string()),
        ]);
        builder.camf = Some((0u32..16).flat_map(u32::to_le_bytes).collect());
        builder.raw = Some(plain_raw(4, 2));
        builder
    }

    pub fn build(&self) -> Vec<u8> {
        let mut bytes = self.header();
        let mut entries: Vec<(u32, u32, &[u8; 4])> = Vec::new();

        if let Some(properties) = &self.properties {
            let section = property_section(properties);
            entries.push((bytes.len() as u32, section.len() as u32, b"PROP"));
            bytes.extend_from_slice(&section);
        }

        if let Some(jpeg) = &self.thumbnail {
            let section = image_section(2, 0x12, 160, 120, jpeg);
            entries.push((bytes.len() as u32, section.len() as u32, b"IMA2"));
            bytes.extend_from_slice(&section);
        }

        if let Some(camf) = &self.camf {
            let mut section = b"SECc".to_vec();
            for word in [0x0002_0000u32, 4, 0, 0, 0, 0] {
                section.extend_from_slice(&word.to_le_bytes());
            }
            section.extend_from_slice(camf);
            entries.push((bytes.len() as u32, section.len() as u32, b"CAMF"));
            bytes.extend_from_slice(&section);
        }

        if let Some(raw) = &self.raw {
            let section = image_section(
                raw.type_format >> 16,
                raw.type_format & 0xffff,
                raw.columns,
                raw.rows,
                &raw.payload,
            );
            entries.push((bytes.len() as u32, section.len() as u32, b"IMA2"));
            bytes.extend_from_slice(&section);
        }

        let dir_offset = bytes.len() as u32;
        bytes.extend_from_slice(b"SECd");
        bytes.extend_from_slice(&0x0002_0000u32.to_le_bytes());
        bytes.extend_from_slice(&(entries.len() as u32).to_le_bytes());
        for (offset, length, tag) in entries {
            bytes.extend_from_slice(&offset.to_le_bytes());
            bytes.extend_from_slice(&length.to_le_bytes());
            bytes.extend_from_slice(tag);
        }
        bytes.extend_from_slice(&dir_offset.to_le_bytes());
        bytes
    }

    fn header(&self) -> Vec<u8> {
        let mut bytes = b"FOVb".to_vec();
        bytes.extend_from_slice(&self.version.0.to_le_bytes());
        bytes.extend_from_slice(&[0x5a; 16]);
        if self.version >= FormatVersion::V4_0 {
            return bytes;
        }

        for word in [0u32, self.columns, self.rows, 0] {
            bytes.extend_from_slice(&word.to_le_bytes());
        }
        if self.version < FormatVersion::V2_1 {
            return bytes;
        }

        bytes.extend_from_slice(&label(self.white_balance));
        if self.version >= FormatVersion::V2_3 {
            bytes.extend_from_slice(&label("AdobeRGB"));
        }
        let slots = if self.version >= FormatVersion::V3_0 { 64 } else { 32 };
        bytes.extend(std::iter::repeat_n(0u8, slots * 5));
        bytes
    }
}

fn label(text: &str) -> [u8; 32] {
    let mut bytes = [0u8; 32];
    bytes[..text.len()].copy_from_slice(text.as_bytes());
    bytes
}

fn image_section(image_type: u32, format: u32, columns: u32, rows: u32, payload: &[u8]) -> Vec<u8> {
    let mut section = b"SECi".to_vec();
    for word in [0x0002_0000, image_type, format, columns, rows, 0] {
        section.extend_from_slice(&u32::to_le_bytes(word));
    }
    section.extend_from_slice(payload);
    section
}

fn property_section(properties: &[(String, String)]) -> Vec<u8> {
    let mut pool: Vec<u16> = Vec::new();
    let mut offsets = Vec::new();
    for (name, value) in properties {
        let name_offset = pool.len() as u32;
        pool.extend(name.encode_utf16());
        pool.push(0);
        let value_offset = pool.len() as u32;
        pool.extend(value.encode_utf16());
        pool.push(0);
        offsets.push((name_offset, value_offset));
    }

    let mut section = b"SECp".to_vec();
    for word in [0x0001_0000, properties.len() as u32, 0, 0, pool.len() as u32] {
        section.extend_from_slice(&u32::to_le_bytes(word));
    }
    for (name, value) in offsets {
        section.extend_from_slice(&name.to_le_bytes());
        section.extend_from_slice(&value.to_le_bytes());
    }
    for unit in pool {
        section.extend_from_slice(&unit.to_le_bytes());
    }
    section
}

/// Raw payload of `columns x rows` pixels holding `(i, 2i, 3i)` for pixel `i`.
pub fn plain_raw(columns: u32, rows: u32) -> RawSection {
    let payload = (0..columns * rows)
        .flat_map(|i| [i as u16, 2 * i as u16, 3 * i as u16])
        .flat_map(u16::to_le_bytes)
        .collect();
    RawSection {
        type_format: RAW_MERRILL,
        columns,
        rows,
        payload,
    }
}

pub fn write_file(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, bytes).unwrap();
    path
}

/// Decodes payloads stored as little-endian `u16` RGB triples.
#[derive(Default)]
pub struct PlainDecoder {
    pub decodes: AtomicUsize,
}

impl RawDecoder for PlainDecoder {
    fn name(&self) -> &str {
        "plain"
    }

    fn supports(&self, layout: &RawSectionLayout) -> bool {
        layout.type_format == RAW_MERRILL
    }

    fn decode(&self, payload: &[u8], layout: &RawSectionLayout, _: &ProcessingSettings) -> Result<RawImage> {
        self.decodes.fetch_add(1, Ordering::SeqCst);
        let expected = layout.columns as usize * layout.rows as usize * 3 * 2;
        if payload.len() < expected {
            return Err(ExtractError::section_load("RAW", "payload too short"));
        }
        Ok(RawImage {
            columns: layout.columns,
            rows: layout.rows,
            data: payload[..expected]
                .chunks_exact(2)
                .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
                .collect(),
            max_value: 4095,
        })
    }
}

/// Shared, ordered record of what the fakes were asked to do.
pub type EventLog = Arc<Mutex<Vec<String>>>;

pub fn events(log: &EventLog) -> Vec<String> {
    log.lock().unwrap().clone()
}

/// Script for the fake container handed out by [`FakeOpener`].
#[derive(Clone)]
pub struct FakeScript {
    pub version: FormatVersion,
    pub present: Vec<SectionKind>,
    pub has_raw: bool,
    pub fail_open: bool,
    pub fail_load: Option<SectionKind>,
}

impl FakeScript {
    pub fn complete(version: FormatVersion) -> Self {
        Self {
            version,
            present: vec![SectionKind::Thumbnail, SectionKind::Properties, SectionKind::Calibration],
            has_raw: true,
            fail_open: false,
            fail_load: None,
        }
    }
}

pub struct FakeOpener {
    pub script: FakeScript,
    pub log: EventLog,
}

impl FakeOpener {
    pub fn new(script: FakeScript) -> (Self, EventLog) {
        let log = EventLog::default();
        (
            Self {
                script,
                log: Arc::clone(&log),
            },
            log,
        )
    }
}

impl ContainerOpener for FakeOpener {
    fn open(&self, path: &Path, _: &ProcessingSettings) -> Result<Box<dyn Container>> {
        self.log.lock().unwrap().push(format!("open {}", path.display()));
        if self.script.fail_open {
            return Err(ExtractError::Open {
                path: path.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
            });
        }
        Ok(Box::new(FakeContainer {
            header: ContainerHeader::new(self.script.version),
            script: self.script.clone(),
            log: Arc::clone(&self.log),
            loaded: Vec::new(),
        }))
    }
}

pub struct FakeContainer {
    header: ContainerHeader,
    script: FakeScript,
    log: EventLog,
    loaded: Vec<String>,
}

impl FakeContainer {
    fn record(&mut self, event: String) -> bool {
        if self.loaded.contains(&event) {
            return false;
        }
        self.log.lock().unwrap().push(event.clone());
        self.loaded.push(event);
        true
    }
}

impl Drop for FakeContainer {
    fn drop(&mut self) {
        self.log.lock().unwrap().push("close".to_string());
    }
}

impl Container for FakeContainer {
    fn header(&self) -> &ContainerHeader {
        &self.header
    }

    fn sections(&self) -> &[SectionInfo] {
        &[]
    }

    fn section(&self, kind: SectionKind) -> Option<SectionRef> {
        self.script.present.contains(&kind).then_some(SectionRef { kind, index: 0 })
    }

    fn raw_section(&self) -> Option<SectionRef> {
        self.script.has_raw.then_some(SectionRef {
            kind: SectionKind::Raw,
            index: 0,
        })
    }

    fn load(&mut self, section: SectionRef) -> Result<()> {
        self.record(format!("load {}", section.kind.name()));
        if self.script.fail_load == Some(section.kind) {
            return Err(ExtractError::section_load(section.kind.name(), "scripted failure"));
        }
        Ok(())
    }

    fn load_undecoded(&mut self, section: SectionRef) -> Result<()> {
        self.record(format!("load undecoded {}", section.kind.name()));
        Ok(())
    }

    fn thumbnail(&self) -> Option<&[u8]> {
        None
    }

    fn properties(&self) -> Option<&[Property]> {
        None
    }

    fn calibration(&self) -> Option<&[u8]> {
        None
    }

    fn raw_block(&self) -> Option<&[u8]> {
        None
    }

    fn raw_image(&self) -> Option<&RawImage> {
        None
    }
}

/// One recorded backend invocation.
#[derive(Debug, Clone)]
pub struct RecordedDump {
    pub backend: String,
    pub output: PathBuf,
    /// Whether the output path already existed when the backend was called.
    pub output_existed: bool,
    pub options: DumpOptions,
}

pub type DumpLog = Arc<Mutex<Vec<RecordedDump>>>;

/// Backend that records its calls and writes `payload`, failing after the
/// write when `fail` is set.
pub struct RecordingBackend {
    pub kind: BackendKind,
    pub calls: DumpLog,
    pub payload: Vec<u8>,
    pub fail: bool,
}

impl DumpBackend for RecordingBackend {
    fn name(&self) -> &str {
        self.kind.name()
    }

    fn kind(&self) -> BackendKind {
        self.kind
    }

    fn dump(&self, _: &dyn Container, output: &Path, options: &DumpOptions, _: &ProcessingSettings) -> Result<()> {
        self.calls.lock().unwrap().push(RecordedDump {
            backend: self.name().to_string(),
            output: output.to_path_buf(),
            output_existed: output.exists(),
            options: options.clone(),
        });
        std::fs::write(output, &self.payload)?;
        if self.fail {
            return Err(ExtractError::backend(self.name(), "scripted failure"));
        }
        Ok(())
    }
}

/// Registry whose every backend is a [`RecordingBackend`].
pub fn recording_registry(payload: &[u8], fail: bool) -> (BackendRegistry, DumpLog) {
    let calls = DumpLog::default();
    let mut registry = BackendRegistry::new();
    for kind in BackendKind::ALL {
        registry.register(Arc::new(RecordingBackend {
            kind,
            calls: Arc::clone(&calls),
            payload: payload.to_vec(),
            fail,
        }));
    }
    (registry, calls)
}
