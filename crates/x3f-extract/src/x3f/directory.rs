//! Section directory parsing.
//!
//! The last four bytes of the file hold the directory offset. The directory
//! is a `SECd` header (signature, version, entry count) followed by
//! `(offset, length, type)` entries.

use crate::x3f::bytes::{LeCursor, read_exact_at, tag, tag_name};
use crate::{ExtractError, Result};
use std::io::{Read, Seek};

pub const SECD: u32 = tag(b"SECd");

pub const ENTRY_PROP: u32 = tag(b"PROP");
pub const ENTRY_IMAG: u32 = tag(b"IMAG");
pub const ENTRY_IMA2: u32 = tag(b"IMA2");
pub const ENTRY_CAMF: u32 = tag(b"CAMF");

const DIRECTORY_HEADER_LEN: u64 = 12;
const ENTRY_LEN: u64 = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirEntry {
    pub offset: u32,
    pub length: u32,
    pub tag: u32,
}

impl DirEntry {
    pub fn is_image(&self) -> bool {
        self.tag == ENTRY_IMAG || self.tag == ENTRY_IMA2
    }
}

/// Read and validate the directory of a file of `file_len` bytes.
pub fn read_directory<R: Read + Seek>(reader: &mut R, file_len: u64) -> Result<Vec<DirEntry>> {
    if file_len < 4 + DIRECTORY_HEADER_LEN {
        return Err(ExtractError::parse("file too short for a section directory"));
    }

    let mut pointer = [0u8; 4];
    read_exact_at(reader, file_len - 4, &mut pointer)
        .map_err(|e| ExtractError::parse_with_source("could not read directory pointer", e))?;
    let dir_offset = u64::from(u32::from_le_bytes(pointer));

    if dir_offset + DIRECTORY_HEADER_LEN > file_len {
        return Err(ExtractError::parse(format!(
            "directory offset {} is past the end of the file",
            dir_offset
        )));
    }

    let mut head = [0u8; DIRECTORY_HEADER_LEN as usize];
    read_exact_at(reader, dir_offset, &mut head)
        .map_err(|e| ExtractError::parse_with_source("could not read directory header", e))?;

    let mut cursor = LeCursor::new(&head);
    let (signature, _version, count) = match (cursor.u32(), cursor.u32(), cursor.u32()) {
        (Some(s), Some(v), Some(c)) => (s, v, c),
        _ => return Err(ExtractError::parse("directory header is truncated")),
    };
    if signature != SECD {
        return Err(ExtractError::parse(format!(
            "bad directory signature '{}'",
            tag_name(signature)
        )));
    }

    let entries_len = u64::from(count) * ENTRY_LEN;
    if dir_offset + DIRECTORY_HEADER_LEN + entries_len > file_len {
        return Err(ExtractError::parse(format!(
            "directory with {} entries does not fit in the file",
            count
        )));
    }

    let mut raw = vec![0u8; entries_len as usize];
    read_exact_at(reader, dir_offset + DIRECTORY_HEADER_LEN, &mut raw)
        .map_err(|e| ExtractError::parse_with_source("could not read directory entries", e))?;

    parse_entries(&raw, count as usize, file_len)
}

fn parse_entries(raw: &[u8], count: usize, file_len: u64) -> Result<Vec<DirEntry>> {
    let mut cursor = LeCursor::new(raw);
    let mut entries = Vec::with_capacity(count);

    for index in 0..count {
        let (offset, length, entry_tag) = match (cursor.u32(), cursor.u32(), cursor.u32()) {
            (Some(o), Some(l), Some(t)) => (o, l, t),
            _ => return Err(ExtractError::parse("directory entries are truncated")),
        };

        if u64::from(offset) + u64::from(length) > file_len {
            return Err(ExtractError::parse(format!(
                "directory entry {} ({}) extends past the end of the file",
                index,
                tag_name(entry_tag)
            )));
        }

        entries.push(DirEntry {
            offset,
            length,
            tag: entry_tag,
        });
    }

    Ok(entries)
}
