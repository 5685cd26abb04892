//! Container collaborator contract.
//!
//! A [`ContainerOpener`] turns a path into a [`Container`] handle. The handle
//! exposes the file's section directory by name and loads sections on demand.
//! The orchestrator owns the handle for exactly one file; dropping the box
//! releases it and closes the underlying file.

use crate::Result;
use crate::core::config::ProcessingSettings;
use std::fmt;
use std::path::Path;

/// Container format version, stored as `major << 16 | minor`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FormatVersion(pub u32);

impl FormatVersion {
    pub const V2_1: FormatVersion = FormatVersion::new(2, 1);
    pub const V2_3: FormatVersion = FormatVersion::new(2, 3);
    pub const V3_0: FormatVersion = FormatVersion::new(3, 0);
    /// First version written by Quattro-generation sensors.
    pub const V4_0: FormatVersion = FormatVersion::new(4, 0);

    pub const fn new(major: u16, minor: u16) -> Self {
        FormatVersion(((major as u32) << 16) | minor as u32)
    }

    pub fn major(self) -> u16 {
        (self.0 >> 16) as u16
    }

    pub fn minor(self) -> u16 {
        (self.0 & 0xffff) as u16
    }
}

impl fmt::Display for FormatVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major(), self.minor())
    }
}

/// Fixed container header fields.
#[derive(Debug, Clone, PartialEq)]
pub struct ContainerHeader {
    pub version: FormatVersion,
    pub unique_id: [u8; 16],
    pub mark_bits: u32,
    pub columns: u32,
    pub rows: u32,
    pub rotation: u32,
    pub white_balance: Option<String>,
    pub color_mode: Option<String>,
    /// `(type, value)` pairs of the extended header data, unused slots omitted.
    pub extended_data: Vec<(u8, f32)>,
}

impl ContainerHeader {
    pub fn new(version: FormatVersion) -> Self {
        Self {
            version,
            unique_id: [0; 16],
            mark_bits: 0,
            columns: 0,
            rows: 0,
            rotation: 0,
            white_balance: None,
            color_mode: None,
            extended_data: Vec::new(),
        }
    }
}

/// Named, independently loadable section kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SectionKind {
    Thumbnail,
    Properties,
    Calibration,
    Raw,
}

impl SectionKind {
    /// Name used in diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            SectionKind::Thumbnail => "JPEG thumbnail",
            SectionKind::Properties => "PROP",
            SectionKind::Calibration => "CAMF",
            SectionKind::Raw => "RAW",
        }
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Handle to one directory entry, valid for the container that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SectionRef {
    pub kind: SectionKind,
    pub index: usize,
}

/// Directory listing entry, as shown in metadata dumps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionInfo {
    /// Four-character entry type, e.g. `PROP` or `IMA2`.
    pub tag: String,
    pub offset: u64,
    pub length: u64,
    /// Image type/format word for image sections.
    pub type_format: Option<u32>,
}

/// One name/value pair from the property section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    pub name: String,
    pub value: String,
}

/// Pixel rectangle in image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Decoded three-channel raw image, row-major and channel-interleaved.
#[derive(Debug, Clone, PartialEq)]
pub struct RawImage {
    pub columns: u32,
    pub rows: u32,
    pub data: Vec<u16>,
    /// Largest value the sensor encoding can produce.
    pub max_value: u16,
}

impl RawImage {
    pub const CHANNELS: usize = 3;

    /// Channel values at `(x, y)`, or `None` outside the image.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u16; 3]> {
        if x >= self.columns || y >= self.rows {
            return None;
        }
        let start = (y as usize * self.columns as usize + x as usize) * Self::CHANNELS;
        match self.data.get(start..start + Self::CHANNELS)? {
            &[r, g, b] => Some([r, g, b]),
            _ => None,
        }
    }
}

/// An opened container file.
///
/// `load` and `load_undecoded` are idempotent: loading a section that is
/// already loaded returns `Ok(())` without re-reading it.
pub trait Container {
    fn header(&self) -> &ContainerHeader;

    /// Full section directory in file order.
    fn sections(&self) -> &[SectionInfo];

    /// Locate a thumbnail, property or calibration section.
    ///
    /// Returns `None` when the container has no such section.
    fn section(&self, kind: SectionKind) -> Option<SectionRef>;

    /// Locate the raw image section in a recognized raw format.
    fn raw_section(&self) -> Option<SectionRef>;

    /// Load and decode a section.
    fn load(&mut self, section: SectionRef) -> Result<()>;

    /// Load the raw image block bytes without decoding them.
    fn load_undecoded(&mut self, section: SectionRef) -> Result<()>;

    fn thumbnail(&self) -> Option<&[u8]>;

    fn properties(&self) -> Option<&[Property]>;

    fn calibration(&self) -> Option<&[u8]>;

    fn raw_block(&self) -> Option<&[u8]>;

    fn raw_image(&self) -> Option<&RawImage>;

    /// Sensor area holding valid image data, when known.
    fn active_area(&self) -> Option<Rect> {
        None
    }
}

/// Opens container files.
pub trait ContainerOpener {
    /// Open `path` and read its header and section directory.
    ///
    /// # Errors
    ///
    /// - `ExtractError::Open` - the file could not be opened
    /// - `ExtractError::Parse` - the header or directory is unreadable
    fn open(&self, path: &Path, settings: &ProcessingSettings) -> Result<Box<dyn Container>>;
}
