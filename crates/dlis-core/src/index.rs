//! Single-pass logical record index.
//!
//! One forward sweep over the visible record stream yields, for every
//! logical record, the offset of its first segment header, how many bytes
//! its visible record still holds at that point, and whether the record is
//! explicitly formatted. That triple is all the reassembler needs to seek
//! straight to any record later, and the only derived state worth caching.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::envelope::{LRSH_SIZE, SegmentHeader, VRL_SIZE, VisibleRecordHeader};
use crate::error::{DlisError, Result};

/// Per-record seek information, in record order.
///
/// The three sequences always have equal length. Serializable so callers
/// can persist an index and skip the sweep on reopen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamOffsets {
    /// Absolute offset of the first segment header of each record.
    pub tells: Vec<u64>,
    /// Bytes remaining in the containing visible record at that offset.
    pub residuals: Vec<u32>,
    /// The explicit-formatting attribute of each record.
    pub explicits: Vec<bool>,
}

impl StreamOffsets {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            tells: Vec::with_capacity(capacity),
            residuals: Vec::with_capacity(capacity),
            explicits: Vec::with_capacity(capacity),
        }
    }

    /// Number of indexed records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tells.len()
    }

    /// True when no records were indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tells.is_empty()
    }
}

/// Index every logical record, sweeping forward from the first visible
/// record envelope at `from`.
///
/// Returned tells are absolute offsets into `data`. The capacity heuristic
/// assumes roughly one segment per 4 KiB, which keeps reallocation rare
/// without overshooting much.
pub fn index_records(data: &[u8], from: usize) -> Result<StreamOffsets> {
    if from > data.len() {
        return Err(DlisError::invalid_argument(format!(
            "expected from (which is {from}) <= data length (which is {})",
            data.len()
        )));
    }

    let mut offsets = StreamOffsets::with_capacity(data.len() / 4096);
    let mut cursor = from;
    let mut residual = 0u32;

    while cursor < data.len() {
        if residual == 0 {
            if cursor + VRL_SIZE > data.len() {
                return Err(DlisError::truncated(format!(
                    "visible record header at offset {cursor} runs past the end"
                )));
            }
            let raw = [data[cursor], data[cursor + 1], data[cursor + 2], data[cursor + 3]];
            let header = VisibleRecordHeader::read_raw(raw);
            if raw[2] != 0xFF {
                return Err(DlisError::unexpected(format!(
                    "visible record pad byte at offset {cursor}: expected 0xFF, got {:#04x}",
                    raw[2]
                )));
            }
            if header.version != 1 {
                warn!(
                    offset = cursor,
                    version = header.version,
                    "visible record version is not 1"
                );
            }
            if usize::from(header.length) < VRL_SIZE + LRSH_SIZE {
                return Err(DlisError::unexpected(format!(
                    "visible record length {} at offset {cursor} cannot hold a segment header",
                    header.length
                )));
            }
            residual = u32::from(header.length) - VRL_SIZE as u32;
            cursor += VRL_SIZE;
            continue;
        }

        if cursor + LRSH_SIZE > data.len() {
            return Err(DlisError::truncated(format!(
                "segment header at offset {cursor} runs past the end"
            )));
        }
        let segment = SegmentHeader::parse(&data[cursor..])?;
        segment.validate()?;
        if u32::from(segment.length) > residual {
            return Err(DlisError::inconsistent(format!(
                "segment length {} at offset {cursor} exceeds the {residual} bytes left in its visible record",
                segment.length
            )));
        }

        let flags = segment.flags();
        if !flags.has_predecessor {
            offsets.tells.push(cursor as u64);
            offsets.residuals.push(residual);
            offsets.explicits.push(flags.explicit_formatting);
        }

        cursor += usize::from(segment.length);
        residual -= u32::from(segment.length);

        if cursor > data.len() {
            return Err(DlisError::truncated(format!(
                "segment body runs {} bytes past the end",
                cursor - data.len()
            )));
        }
    }

    if residual != 0 {
        return Err(DlisError::truncated(format!(
            "stream ends with {residual} bytes still owed to the last visible record"
        )));
    }

    Ok(offsets)
}
