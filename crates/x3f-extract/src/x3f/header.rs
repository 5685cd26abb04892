//! File header parsing.

use crate::plugins::{ContainerHeader, FormatVersion};
use crate::x3f::bytes::{LeCursor, label, tag};
use crate::{ExtractError, Result};

pub const FOVB: u32 = tag(b"FOVb");

const UNIQUE_ID_LEN: usize = 16;
const LABEL_LEN: usize = 32;
const EXT_DATA_2_1: usize = 32;
const EXT_DATA_3_0: usize = 64;

/// Upper bound on the header length of any version.
pub const MAX_HEADER_LEN: usize = 4 + 4 + UNIQUE_ID_LEN + 16 + 2 * LABEL_LEN + EXT_DATA_3_0 * 5;

/// Parse the fixed header at the start of the file.
///
/// Fields past the unique id are only interpreted for versions before 4.0;
/// the Quattro header layout is unknown.
pub fn parse_header(bytes: &[u8]) -> Result<ContainerHeader> {
    let mut cursor = LeCursor::new(bytes);
    let truncated = || ExtractError::parse("file header is truncated");

    let identifier = cursor.u32().ok_or_else(truncated)?;
    if identifier != FOVB {
        return Err(ExtractError::parse("not an X3F file (missing FOVb identifier)"));
    }

    let mut header = ContainerHeader::new(FormatVersion(cursor.u32().ok_or_else(truncated)?));
    header
        .unique_id
        .copy_from_slice(cursor.take(UNIQUE_ID_LEN).ok_or_else(truncated)?);

    if header.version >= FormatVersion::V4_0 {
        return Ok(header);
    }

    header.mark_bits = cursor.u32().ok_or_else(truncated)?;
    header.columns = cursor.u32().ok_or_else(truncated)?;
    header.rows = cursor.u32().ok_or_else(truncated)?;
    header.rotation = cursor.u32().ok_or_else(truncated)?;

    if header.version < FormatVersion::V2_1 {
        return Ok(header);
    }

    header.white_balance = label(cursor.take(LABEL_LEN).ok_or_else(truncated)?);
    if header.version >= FormatVersion::V2_3 {
        header.color_mode = label(cursor.take(LABEL_LEN).ok_or_else(truncated)?);
    }

    let count = if header.version >= FormatVersion::V3_0 {
        EXT_DATA_3_0
    } else {
        EXT_DATA_2_1
    };
    let types = cursor.take(count).ok_or_else(truncated)?;
    for &ext_type in types {
        let value = cursor.f32().ok_or_else(truncated)?;
        if ext_type != 0 {
            header.extended_data.push((ext_type, value));
        }
    }

    Ok(header)
}
