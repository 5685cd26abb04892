//! Property section (`SECp`) parsing.
//!
//! After a six-word header come `(name_offset, value_offset)` pairs and a
//! UTF-16LE character pool. Offsets count characters from the start of the
//! pool and point at NUL-terminated strings.

use crate::plugins::Property;
use crate::x3f::bytes::{LeCursor, tag, tag_name};
use crate::{ExtractError, Result};

pub const SECP: u32 = tag(b"SECp");

const CHARACTER_FORMAT_UTF16: u32 = 0;

pub fn parse_properties(bytes: &[u8]) -> Result<Vec<Property>> {
    let mut cursor = LeCursor::new(bytes);
    let truncated = || ExtractError::parse("property section is truncated");

    let signature = cursor.u32().ok_or_else(truncated)?;
    if signature != SECP {
        return Err(ExtractError::parse(format!(
            "bad property section signature '{}'",
            tag_name(signature)
        )));
    }
    let _version = cursor.u32().ok_or_else(truncated)?;
    let count = cursor.u32().ok_or_else(truncated)? as usize;
    let character_format = cursor.u32().ok_or_else(truncated)?;
    let _reserved = cursor.u32().ok_or_else(truncated)?;
    let total_length = cursor.u32().ok_or_else(truncated)? as usize;

    if character_format != CHARACTER_FORMAT_UTF16 {
        return Err(ExtractError::parse(format!(
            "unsupported property character format {}",
            character_format
        )));
    }

    let mut offsets = Vec::with_capacity(count.min(bytes.len() / 8));
    for _ in 0..count {
        let name = cursor.u32().ok_or_else(truncated)? as usize;
        let value = cursor.u32().ok_or_else(truncated)? as usize;
        offsets.push((name, value));
    }

    let pool_bytes = cursor
        .take(total_length.checked_mul(2).ok_or_else(truncated)?)
        .ok_or_else(truncated)?;
    let pool: Vec<u16> = pool_bytes
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect();

    offsets
        .into_iter()
        .map(|(name, value)| {
            Ok(Property {
                name: pool_string(&pool, name)?,
                value: pool_string(&pool, value)?,
            })
        })
        .collect()
}

fn pool_string(pool: &[u16], offset: usize) -> Result<String> {
    let tail = pool.get(offset..).ok_or_else(|| {
        ExtractError::parse(format!(
            "property string offset {} is outside the character pool",
            offset
        ))
    })?;
    let end = tail.iter().position(|&c| c == 0).unwrap_or(tail.len());
    Ok(String::from_utf16_lossy(&tail[..end]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(pairs: &[(&str, &str)], character_format: u32) -> Vec<u8> {
        let mut pool: Vec<u16> = Vec::new();
        let mut offsets = Vec::new();
        for (name, value) in pairs {
            let name_offset = pool.len() as u32;
            pool.extend(name.encode_utf16());
            pool.push(0);
            let value_offset = pool.len() as u32;
            pool.extend(value.encode_utf16());
            pool.push(0);
            offsets.push((name_offset, value_offset));
        }

        let mut bytes = b"SECp".to_vec();
        for word in [0x0001_0000, pairs.len() as u32, character_format, 0, pool.len() as u32] {
            bytes.extend_from_slice(&u32::to_le_bytes(word));
        }
        for (name, value) in offsets {
            bytes.extend_from_slice(&name.to_le_bytes());
            bytes.extend_from_slice(&value.to_le_bytes());
        }
        for unit in pool {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        bytes
    }

    #[test]
    fn test_parses_pairs_in_order() {
        let bytes = section(&[("CAMMODEL", "SIGMA SD9"), ("ISO", "100"), ("LENSMODEL", "Ø 50mm")], 0);
        let properties = parse_properties(&bytes).unwrap();
        assert_eq!(properties.len(), 3);
        assert_eq!(properties[0].name, "CAMMODEL");
        assert_eq!(properties[0].value, "SIGMA SD9");
        assert_eq!(properties[2].value, "Ø 50mm");
    }

    #[test]
    fn test_empty_section() {
        assert!(parse_properties(&section(&[], 0)).unwrap().is_empty());
    }

    #[test]
    fn test_rejects_non_utf16() {
        let err = parse_properties(&section(&[("A", "B")], 1)).unwrap_err();
        assert!(err.to_string().contains("character format"));
    }

    #[test]
    fn test_offset_outside_pool() {
        let mut bytes = section(&[("A", "B")], 0);
        bytes[24..28].copy_from_slice(&99u32.to_le_bytes());
        assert!(matches!(parse_properties(&bytes), Err(ExtractError::Parse { .. })));
    }

    #[test]
    fn test_truncated_pool() {
        let bytes = section(&[("NAME", "VALUE")], 0);
        assert!(parse_properties(&bytes[..bytes.len() - 2]).is_err());
    }
}
