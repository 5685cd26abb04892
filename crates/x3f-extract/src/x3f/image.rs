//! Image section headers.

use crate::plugins::RawSectionLayout;
use crate::x3f::bytes::{LeCursor, tag, tag_name};
use crate::{ExtractError, Result};

pub const SECI: u32 = tag(b"SECi");

/// Signature, version, type, format, columns, rows, row stride.
pub const IMAGE_HEADER_LEN: usize = 28;

pub const THUMB_PLAIN: u32 = 0x0002_0003;
pub const THUMB_HUFFMAN: u32 = 0x0002_000b;
pub const THUMB_JPEG: u32 = 0x0002_0012;

/// Raw image type/format words the locator accepts.
pub const RAW_FORMATS: [(u32, &str); 7] = [
    (0x0003_0005, "Huffman X530"),
    (0x0003_0006, "Huffman 10-bit"),
    (0x0003_001e, "TRUE"),
    (0x0001_001e, "Merrill"),
    (0x0001_0023, "Quattro"),
    (0x0001_0025, "SDQ"),
    (0x0001_0027, "SDQH"),
];

pub fn raw_format_name(type_format: u32) -> Option<&'static str> {
    RAW_FORMATS
        .iter()
        .find(|(word, _)| *word == type_format)
        .map(|(_, name)| *name)
}

/// Human-readable name of any known image type/format word.
pub fn image_format_name(type_format: u32) -> Option<&'static str> {
    match type_format {
        THUMB_PLAIN => Some("plain thumbnail"),
        THUMB_HUFFMAN => Some("Huffman thumbnail"),
        THUMB_JPEG => Some("JPEG thumbnail"),
        other => raw_format_name(other),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageHeader {
    pub version: u32,
    pub type_format: u32,
    pub columns: u32,
    pub rows: u32,
    pub row_stride: u32,
}

impl ImageHeader {
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let mut cursor = LeCursor::new(bytes);
        let mut words = [0u32; 7];
        for word in &mut words {
            *word = cursor
                .u32()
                .ok_or_else(|| ExtractError::parse("image section header is truncated"))?;
        }

        let [signature, version, image_type, format, columns, rows, row_stride] = words;
        if signature != SECI {
            return Err(ExtractError::parse(format!(
                "bad image section signature '{}'",
                tag_name(signature)
            )));
        }

        Ok(Self {
            version,
            type_format: (image_type << 16) | (format & 0xffff),
            columns,
            rows,
            row_stride,
        })
    }

    pub fn is_raw(&self) -> bool {
        raw_format_name(self.type_format).is_some()
    }

    pub fn layout(&self) -> RawSectionLayout {
        RawSectionLayout {
            type_format: self.type_format,
            columns: self.columns,
            rows: self.rows,
            row_stride: self.row_stride,
        }
    }
}
