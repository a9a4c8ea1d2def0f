//! Random-access reassembly of indexed logical records.
//!
//! A [`Stream`] owns a file handle and the tell/residual pairs produced by
//! [`crate::index::index_records`]. Given a record number it seeks to the
//! first segment header, walks the segment chain across visible record
//! boundaries, concatenates the bodies with envelope bytes elided, strips
//! per-segment trailers, and checks that the chain agrees with itself.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use tracing::warn;

use crate::envelope::{
    ATTR_ENCRYPTED, ATTR_EXPLICIT, LRSH_SIZE, SegmentAttributes, SegmentHeader, VRL_SIZE,
    VisibleRecordHeader,
};
use crate::error::{DlisError, Result};

/// A reassembled logical record.
///
/// `attributes` keeps only the bits that describe the record as a whole,
/// explicit formatting and encryption; the remaining segment attributes
/// only say how individual segments were read. Encrypted bodies are
/// returned as opaque bytes, never decrypted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalRecord {
    /// Concatenated segment bodies, trailers stripped.
    pub data: Vec<u8>,
    /// Logical record type, taken from the first segment.
    pub record_type: u8,
    /// Effective attribute mask: explicit formatting and encryption only.
    pub attributes: u8,
    /// False when the segment chain disagreed with itself: mixed types,
    /// broken predecessor/successor linkage, or a malformed envelope on
    /// the way.
    pub consistent: bool,
}

impl LogicalRecord {
    /// True for explicitly formatted records (EFLRs).
    #[must_use]
    pub fn is_explicit(&self) -> bool {
        self.attributes & ATTR_EXPLICIT != 0
    }

    /// True when the record body is encrypted.
    #[must_use]
    pub fn is_encrypted(&self) -> bool {
        self.attributes & ATTR_ENCRYPTED != 0
    }
}

/// Seekable handle over one DLIS file plus its record index.
///
/// Not safe for concurrent use; open one stream per thread. After
/// [`Stream::reindex`], repeated [`Stream::at`] calls with the same index
/// return equal records.
#[derive(Debug)]
pub struct Stream {
    file: File,
    tells: Vec<u64>,
    residuals: Vec<u32>,
}

impl Stream {
    /// Open a file for record reassembly. The stream starts without an
    /// index; call [`Stream::reindex`] before [`Stream::at`].
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                DlisError::FileNotFound {
                    path: path.to_path_buf(),
                }
            } else {
                DlisError::Io(e)
            }
        })?;
        Ok(Self {
            file,
            tells: Vec::new(),
            residuals: Vec::new(),
        })
    }

    /// Install a record index, usually from
    /// [`crate::index::index_records`] or a persisted copy of its output.
    pub fn reindex(&mut self, tells: Vec<u64>, residuals: Vec<u32>) -> Result<()> {
        if tells.is_empty() {
            return Err(DlisError::invalid_argument("tells must be non-empty"));
        }
        if residuals.is_empty() {
            return Err(DlisError::invalid_argument("residuals must be non-empty"));
        }
        if tells.len() != residuals.len() {
            return Err(DlisError::invalid_argument(format!(
                "reindex requires tells.len() (which is {}) == residuals.len() (which is {})",
                tells.len(),
                residuals.len()
            )));
        }
        self.tells = tells;
        self.residuals = residuals;
        Ok(())
    }

    /// Number of indexed records.
    #[must_use]
    pub fn record_count(&self) -> usize {
        self.tells.len()
    }

    /// Reassemble logical record `i`.
    ///
    /// Cross-segment disagreements (mixed types, broken linkage, odd
    /// envelopes) mark the record inconsistent but still return it.
    /// A segment that overruns its visible record, or a record that does
    /// not end where the next one begins, is an inconsistency error.
    pub fn at(&mut self, i: usize) -> Result<LogicalRecord> {
        let tell = *self.tells.get(i).ok_or_else(|| {
            DlisError::invalid_argument(format!(
                "record {i} out of bounds ({} records indexed)",
                self.tells.len()
            ))
        })?;
        let mut remaining = i64::from(self.residuals[i]);

        let mut data = Vec::with_capacity(8192);
        // segment counts are single-digit in practice
        let mut attributes: Vec<u8> = Vec::with_capacity(8);
        let mut types: Vec<u8> = Vec::with_capacity(8);
        let mut consistent = true;

        self.file.seek(SeekFrom::Start(tell))?;

        loop {
            while remaining > 0 {
                let mut header = [0u8; LRSH_SIZE];
                self.file.read_exact(&mut header)?;
                let segment = SegmentHeader::parse(&header)?;
                if segment.validate().is_err() {
                    consistent = false;
                }
                let flags = segment.flags();
                attributes.push(segment.attributes);
                types.push(segment.segment_type);

                remaining -= i64::from(segment.length);
                if remaining < 0 {
                    return Err(DlisError::inconsistent(format!(
                        "visible record/segment inconsistency: segment length {} overruns the visible record in record {i} (at tell {tell})",
                        segment.length
                    )));
                }

                let body_len = usize::from(segment.length).saturating_sub(LRSH_SIZE);
                let previous = data.len();
                data.resize(previous + body_len, 0);
                self.file.read_exact(&mut data[previous..])?;

                if flags.has_trailing_length {
                    chop(&mut data, 2);
                }
                if flags.has_checksum {
                    chop(&mut data, 2);
                }
                if flags.has_padding {
                    let count = usize::from(data.last().copied().unwrap_or(0));
                    chop(&mut data, count);
                }

                if flags.has_successor {
                    continue;
                }

                // last segment: the stream must now sit exactly where the
                // next record starts (possibly behind one more envelope)
                if i + 1 < self.tells.len() {
                    let position = self.file.stream_position()?;
                    let expected = if remaining == 0 {
                        position + VRL_SIZE as u64
                    } else {
                        position
                    };
                    let next = self.tells[i + 1];
                    if expected != next {
                        return Err(DlisError::inconsistent(format!(
                            "non-contiguous record: #{i} (at tell {tell}) ends at {position}, not at #{} (at tell {next})",
                            i + 1
                        )));
                    }
                }

                if !types.windows(2).all(|pair| pair[0] == pair[1]) {
                    consistent = false;
                }
                if !linkage_consistent(&attributes) {
                    consistent = false;
                }

                let mask = ATTR_EXPLICIT | ATTR_ENCRYPTED;
                return Ok(LogicalRecord {
                    data,
                    record_type: types[0],
                    attributes: attributes[0] & mask,
                    consistent,
                });
            }

            // visible record exhausted: consume the next envelope
            let mut header = [0u8; VRL_SIZE];
            self.file.read_exact(&mut header)?;
            let envelope = VisibleRecordHeader::read_raw(header);
            if !VisibleRecordHeader::envelope_ok(header) {
                consistent = false;
            }
            remaining = i64::from(envelope.length) - VRL_SIZE as i64;
        }
    }

    /// Reassemble a batch of records, dropping encrypted ones.
    pub fn extract(&mut self, indices: &[usize]) -> Result<Vec<LogicalRecord>> {
        let mut records = Vec::with_capacity(indices.len());
        for &i in indices {
            let record = self.at(i)?;
            if record.is_encrypted() {
                continue;
            }
            records.push(record);
        }
        Ok(records)
    }

    /// Read raw bytes at an absolute offset, filling `buf` exactly.
    pub fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> Result<()> {
        self.file.seek(SeekFrom::Start(offset))?;
        self.file.read_exact(buf)?;
        Ok(())
    }

    /// Release the file handle. Dropping the stream does the same.
    pub fn close(self) {
        drop(self);
    }
}

/// Remove `count` bytes from the buffer tail. A count exceeding the buffer
/// cannot be trusted (it usually comes from an encrypted pad byte), so the
/// chop clamps at empty and warns.
fn chop(data: &mut Vec<u8>, count: usize) {
    if count > data.len() {
        warn!(
            bytes = count,
            have = data.len(),
            "trailer chop would remove more bytes than read"
        );
        data.clear();
    } else {
        data.truncate(data.len() - count);
    }
}

/// Check predecessor/successor linkage and per-record attribute agreement:
/// interior segments carry both link bits, the first only a successor, the
/// last only a predecessor, and every segment must agree on formatting and
/// encryption.
fn linkage_consistent(attributes: &[u8]) -> bool {
    let last = attributes.len() - 1;
    let mask = ATTR_EXPLICIT | ATTR_ENCRYPTED;
    attributes.iter().enumerate().all(|(i, &byte)| {
        let flags = SegmentAttributes::from_byte(byte);
        let predecessor_ok = flags.has_predecessor == (i != 0);
        let successor_ok = flags.has_successor == (i != last);
        let record_bits_ok = byte & mask == attributes[0] & mask;
        predecessor_ok && successor_ok && record_bits_ok
    })
}
