//! Storage unit label.
//!
//! The SUL is an 80-byte ASCII preface appearing once at the start of a
//! storage unit, possibly after a short run of garbage bytes.
//!
//! # Layout (80 bytes)
//!
//! | Offset | Length | Field     | Description                       |
//! |--------|--------|-----------|-----------------------------------|
//! | 0-3    | 4      | sequence  | Storage unit sequence number      |
//! | 4-8    | 5      | version   | `V1.00` for RP66 V1               |
//! | 9-14   | 6      | structure | `RECORD` for record storage sets  |
//! | 15-19  | 5      | maxlen    | Maximum visible record length     |
//! | 20-79  | 60     | id        | Storage set identifier            |

use tracing::warn;

use crate::error::{DlisError, Result};

/// Storage unit label size in bytes.
pub const SUL_SIZE: usize = 80;

/// How far [`find_sul`] and [`crate::envelope::find_vrl`] scan before
/// giving up. Anchors further out than this mean the file needs manual
/// intervention anyway.
pub(crate) const SCAN_LIMIT: usize = 200;

const STRUCTURE_OFFSET: usize = 9;

/// Storage set record structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageSetLayout {
    /// Record storage set, the only layout RP66 V1 defines.
    Record,
    /// Anything else; preserved so callers can decide.
    Unknown,
}

/// Parsed storage unit label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageUnitLabel {
    /// Storage unit sequence number.
    pub sequence: u32,
    /// Major DLIS version.
    pub major: u8,
    /// Minor DLIS version.
    pub minor: u8,
    /// Storage set structure.
    pub layout: StorageSetLayout,
    /// Declared maximum visible record length. Zero means unlimited.
    pub max_record_length: u32,
    /// Storage set identifier, trailing blanks removed.
    pub id: String,
    /// False when a field disagreed with the specification and a
    /// documented fallback was applied.
    pub consistent: bool,
}

/// Locate the storage unit label in a file prefix.
///
/// Scans at most the first 200 bytes for the `RECORD` structure field and
/// backs up over the sequence number and version that must precede it.
/// Returns the offset of the first SUL byte; 0 in a conforming file.
pub fn find_sul(data: &[u8]) -> Result<usize> {
    let window = &data[..data.len().min(SCAN_LIMIT)];
    let pos = window
        .windows(6)
        .position(|candidate| candidate == b"RECORD")
        .ok_or(DlisError::NotFound {
            target: "storage unit label",
            searched: window.len(),
        })?;

    if pos < STRUCTURE_OFFSET {
        return Err(DlisError::inconsistent(format!(
            "found 'RECORD' at offset {pos}, but the sequence number and version need {STRUCTURE_OFFSET} bytes before it"
        )));
    }

    Ok(pos - STRUCTURE_OFFSET)
}

/// Parse an 80-byte storage unit label.
///
/// A version field that does not parse is assumed to be V1.0: a warning is
/// emitted and the returned label is marked inconsistent, but the parse
/// continues. The same applies to an unknown structure field.
pub fn parse_sul(data: &[u8]) -> Result<StorageUnitLabel> {
    if data.len() < SUL_SIZE {
        return Err(DlisError::invalid_argument(format!(
            "storage unit label needs {SUL_SIZE} bytes, got {}",
            data.len()
        )));
    }

    let mut consistent = true;

    let sequence = parse_ascii_uint(&data[0..4], "sequence number")?;

    let (major, minor) = match parse_version(&data[4..9]) {
        Some(version) => version,
        None => {
            warn!(
                field = %String::from_utf8_lossy(&data[4..9]),
                "storage unit label version inconsistent with specification, assuming DLIS V1.0"
            );
            consistent = false;
            (1, 0)
        }
    };

    let layout = if &data[9..15] == b"RECORD" {
        StorageSetLayout::Record
    } else {
        warn!(
            field = %String::from_utf8_lossy(&data[9..15]),
            "unknown storage set structure"
        );
        consistent = false;
        StorageSetLayout::Unknown
    };

    let max_record_length = parse_ascii_uint(&data[15..20], "maximum record length")?;

    let id = String::from_utf8_lossy(&data[20..SUL_SIZE])
        .trim_end()
        .to_string();

    Ok(StorageUnitLabel {
        sequence,
        major,
        minor,
        layout,
        max_record_length,
        id,
        consistent,
    })
}

/// Parse a space-padded ASCII decimal field.
fn parse_ascii_uint(field: &[u8], what: &str) -> Result<u32> {
    let text = String::from_utf8_lossy(field);
    let digits = text.trim();
    digits.parse::<u32>().map_err(|_| {
        DlisError::unexpected(format!("{what}: expected ASCII digits, got {text:?}"))
    })
}

/// Parse the `V1.00`-shaped version field into (major, minor).
fn parse_version(field: &[u8]) -> Option<(u8, u8)> {
    if field[0] != b'V' || field[2] != b'.' {
        return None;
    }
    let major = (field[1] as char).to_digit(10)? as u8;
    let hi = (field[3] as char).to_digit(10)? as u8;
    let lo = (field[4] as char).to_digit(10)? as u8;
    Some((major, hi * 10 + lo))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn sul_bytes() -> Vec<u8> {
        let mut out = Vec::with_capacity(SUL_SIZE);
        out.extend_from_slice(b"0001");
        out.extend_from_slice(b"V1.00");
        out.extend_from_slice(b"RECORD");
        out.extend_from_slice(b"08192");
        out.extend_from_slice(b"Default Storage Set");
        out.resize(SUL_SIZE, b' ');
        out
    }

    #[test]
    fn test_parse_sul() {
        let sul = parse_sul(&sul_bytes()).unwrap();
        assert_eq!(sul.sequence, 1);
        assert_eq!(sul.major, 1);
        assert_eq!(sul.minor, 0);
        assert_eq!(sul.layout, StorageSetLayout::Record);
        assert_eq!(sul.max_record_length, 8192);
        assert_eq!(sul.id, "Default Storage Set");
        assert!(sul.consistent);
    }

    #[test]
    fn test_parse_sul_version_fallback() {
        let mut bytes = sul_bytes();
        bytes[4..9].copy_from_slice(b"XXXXX");
        let sul = parse_sul(&bytes).unwrap();
        assert_eq!(sul.major, 1);
        assert_eq!(sul.minor, 0);
        assert!(!sul.consistent);
    }

    #[test]
    fn test_parse_sul_bad_sequence() {
        let mut bytes = sul_bytes();
        bytes[0..4].copy_from_slice(b"ABCD");
        let err = parse_sul(&bytes).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnexpectedValue);
    }

    #[test]
    fn test_parse_sul_short_buffer() {
        let err = parse_sul(&[0u8; 79]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_find_sul() {
        assert_eq!(find_sul(&sul_bytes()).unwrap(), 0);

        let mut with_garbage = vec![0u8; 10];
        with_garbage.extend_from_slice(&sul_bytes());
        assert_eq!(find_sul(&with_garbage).unwrap(), 10);
    }

    #[test]
    fn test_find_sul_not_found() {
        let err = find_sul(&[0u8; 79]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        // needle beyond the scan window
        let mut bytes = vec![b'x'; 250];
        bytes[220..226].copy_from_slice(b"RECORD");
        let err = find_sul(&bytes).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_find_sul_no_room_for_prefix() {
        let mut bytes = vec![b' '; 200];
        bytes[3..9].copy_from_slice(b"RECORD");
        let err = find_sul(&bytes).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Inconsistent);
    }
}
