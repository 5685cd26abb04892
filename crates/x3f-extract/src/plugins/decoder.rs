//! Raw pixel decoder plugin trait.
//!
//! The built-in X3F container locates and reads raw image sections but does
//! not implement any of the sensor compression engines. Decoding is delegated
//! to a [`RawDecoder`] registered on the opener.

use crate::Result;
use crate::core::config::ProcessingSettings;
use crate::plugins::container::RawImage;

/// Geometry and encoding of one raw image section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawSectionLayout {
    /// Image type/format word (`type << 16 | data format`).
    pub type_format: u32,
    pub columns: u32,
    pub rows: u32,
    pub row_stride: u32,
}

impl RawSectionLayout {
    pub fn data_format(&self) -> u16 {
        (self.type_format & 0xffff) as u16
    }
}

/// Decodes raw image section payloads into pixel data.
pub trait RawDecoder {
    /// Returns the unique name of this decoder.
    fn name(&self) -> &str;

    /// Whether this decoder understands the given section encoding.
    fn supports(&self, layout: &RawSectionLayout) -> bool;

    /// Decode the section payload (bytes following the section header).
    ///
    /// # Errors
    ///
    /// Should return `ExtractError::SectionLoad` when the payload is corrupt.
    fn decode(&self, payload: &[u8], layout: &RawSectionLayout, settings: &ProcessingSettings) -> Result<RawImage>;
}
