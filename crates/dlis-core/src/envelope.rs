//! Visible record envelopes and logical record segment headers.
//!
//! A visible record (VR) is the physical framing unit: a 4-byte header
//! (big-endian length including the header, a fixed `0xFF` pad byte, a
//! version byte) followed by a body of concatenated logical record
//! segments. Each segment opens with a 4-byte header (LRSH): big-endian
//! length including header and trailers, an attribute byte, a type byte.

use crate::error::{DlisError, Result};
use crate::sul::SCAN_LIMIT;

/// Visible record header size in bytes.
pub const VRL_SIZE: usize = 4;

/// Logical record segment header size in bytes.
pub const LRSH_SIZE: usize = 4;

/// Segment attribute bit: explicitly formatted logical record.
pub const ATTR_EXPLICIT: u8 = 1 << 7;
/// Segment attribute bit: a predecessor segment exists.
pub const ATTR_PREDECESSOR: u8 = 1 << 6;
/// Segment attribute bit: a successor segment exists.
pub const ATTR_SUCCESSOR: u8 = 1 << 5;
/// Segment attribute bit: the segment body is encrypted.
pub const ATTR_ENCRYPTED: u8 = 1 << 4;
/// Segment attribute bit: an encryption packet precedes the body.
pub const ATTR_ENCRYPTION_PACKET: u8 = 1 << 3;
/// Segment attribute bit: a 2-byte checksum trails the body.
pub const ATTR_CHECKSUM: u8 = 1 << 2;
/// Segment attribute bit: a 2-byte trailing length copy trails the body.
pub const ATTR_TRAILING_LENGTH: u8 = 1 << 1;
/// Segment attribute bit: pad bytes trail the body.
pub const ATTR_PADDING: u8 = 1 << 0;

/// The eight LRSH attribute flags, unpacked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SegmentAttributes {
    pub explicit_formatting: bool,
    pub has_predecessor: bool,
    pub has_successor: bool,
    pub encrypted: bool,
    pub has_encryption_packet: bool,
    pub has_checksum: bool,
    pub has_trailing_length: bool,
    pub has_padding: bool,
}

impl SegmentAttributes {
    /// Unpack an attribute byte. Pure; every byte value is valid.
    #[must_use]
    pub const fn from_byte(byte: u8) -> Self {
        Self {
            explicit_formatting: byte & ATTR_EXPLICIT != 0,
            has_predecessor: byte & ATTR_PREDECESSOR != 0,
            has_successor: byte & ATTR_SUCCESSOR != 0,
            encrypted: byte & ATTR_ENCRYPTED != 0,
            has_encryption_packet: byte & ATTR_ENCRYPTION_PACKET != 0,
            has_checksum: byte & ATTR_CHECKSUM != 0,
            has_trailing_length: byte & ATTR_TRAILING_LENGTH != 0,
            has_padding: byte & ATTR_PADDING != 0,
        }
    }
}

/// Parsed visible record header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibleRecordHeader {
    /// Record length, header included.
    pub length: u16,
    /// Format version byte; 1 for RP66 V1.
    pub version: u8,
}

impl VisibleRecordHeader {
    /// Parse a visible record header, strictly.
    ///
    /// Requires the fixed `0xFF` pad byte, version 1, and a length large
    /// enough to hold at least one segment header. The record reassembler
    /// deliberately does not use this: mid-stream it tolerates bad pad and
    /// version bytes, marking the record inconsistent instead.
    pub fn parse(input: &[u8]) -> Result<Self> {
        if input.len() < VRL_SIZE {
            return Err(DlisError::truncated(format!(
                "visible record header: need {VRL_SIZE} bytes, have {}",
                input.len()
            )));
        }
        let header = Self::read_raw([input[0], input[1], input[2], input[3]]);

        if input[2] != 0xFF {
            return Err(DlisError::unexpected(format!(
                "visible record pad byte: expected 0xFF, got {:#04x}",
                input[2]
            )));
        }
        if header.version != 1 {
            return Err(DlisError::unexpected(format!(
                "visible record version: expected 1, got {}",
                header.version
            )));
        }
        if usize::from(header.length) < VRL_SIZE + LRSH_SIZE {
            return Err(DlisError::unexpected(format!(
                "visible record length {} cannot hold a segment header",
                header.length
            )));
        }

        Ok(header)
    }

    /// Decode the header fields without judging them.
    pub(crate) fn read_raw(bytes: [u8; VRL_SIZE]) -> Self {
        Self {
            length: u16::from_be_bytes([bytes[0], bytes[1]]),
            version: bytes[3],
        }
    }

    /// Whether the raw pad and version bytes match the specification.
    pub(crate) fn envelope_ok(bytes: [u8; VRL_SIZE]) -> bool {
        bytes[2] == 0xFF && bytes[3] == 1
    }
}

/// Parsed logical record segment header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentHeader {
    /// Segment length: header, body, and trailers.
    pub length: u16,
    /// Raw attribute byte.
    pub attributes: u8,
    /// Logical record type.
    pub segment_type: u8,
}

impl SegmentHeader {
    /// Parse a segment header.
    pub fn parse(input: &[u8]) -> Result<Self> {
        if input.len() < LRSH_SIZE {
            return Err(DlisError::truncated(format!(
                "segment header: need {LRSH_SIZE} bytes, have {}",
                input.len()
            )));
        }
        Ok(Self {
            length: u16::from_be_bytes([input[0], input[1]]),
            attributes: input[2],
            segment_type: input[3],
        })
    }

    /// Check the declared length: it must cover the header itself and,
    /// since segments are padded to even byte counts, be even.
    pub fn validate(&self) -> Result<()> {
        if usize::from(self.length) < LRSH_SIZE {
            return Err(DlisError::unexpected(format!(
                "segment length {} smaller than its own header",
                self.length
            )));
        }
        if !self.length.is_multiple_of(2) {
            return Err(DlisError::unexpected(format!(
                "segment length {} is odd",
                self.length
            )));
        }
        Ok(())
    }

    /// Unpack the attribute byte.
    #[must_use]
    pub fn flags(&self) -> SegmentAttributes {
        SegmentAttributes::from_byte(self.attributes)
    }
}

/// Locate the first visible record envelope at or after `from`.
///
/// The first envelope does not always immediately follow the SUL. Scans at
/// most 200 bytes for the fixed `0xFF 0x01` pair and backs up over the
/// 2-byte length that must precede it.
pub fn find_vrl(data: &[u8], from: usize) -> Result<usize> {
    if from > data.len() {
        return Err(DlisError::invalid_argument(format!(
            "expected from (which is {from}) <= data length (which is {})",
            data.len()
        )));
    }

    let window = &data[from..(from + SCAN_LIMIT).min(data.len())];
    let pos = window
        .windows(2)
        .position(|candidate| candidate == [0xFF, 0x01])
        .ok_or(DlisError::NotFound {
            target: "visible record envelope pattern (0xFF 0x01)",
            searched: window.len(),
        })?;

    if pos < 2 {
        return Err(DlisError::inconsistent(format!(
            "found 0xFF 0x01 at offset {}, but the record length needs 2 bytes before it",
            from + pos
        )));
    }

    Ok(from + pos - 2)
}
