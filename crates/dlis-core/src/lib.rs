//! Reader core for DLIS (RP66 V1) files.
//!
//! DLIS is a self-describing, record-oriented binary container for
//! petrophysical well logs. This crate turns on-disk bytes into a
//! navigable stream of logical records plus typed object sets:
//!
//! 1. [`find_sul`] / [`find_vrl`] locate the storage unit label and the
//!    first visible record envelope, tolerating leading garbage.
//! 2. [`index_records`] sweeps the stream once and records, per logical
//!    record, where its first segment header sits and how many bytes its
//!    visible record still holds there.
//! 3. [`Stream::at`] seeks back to any indexed record and reassembles it,
//!    joining segment bodies across visible record boundaries and
//!    stripping per-segment trailers.
//! 4. [`parse_object_set`] decodes an explicitly formatted record body
//!    into a template plus objects carrying typed attribute values.
//!
//! ```no_run
//! use std::path::Path;
//! use dlis_core::{Stream, find_sul, find_vrl, index_records, parse_sul, SUL_SIZE};
//!
//! # fn main() -> dlis_core::Result<()> {
//! let path = Path::new("example.dlis");
//! let data = std::fs::read(path)?;
//!
//! let sul_offset = find_sul(&data)?;
//! let label = parse_sul(&data[sul_offset..])?;
//! let envelope_offset = find_vrl(&data, sul_offset + SUL_SIZE)?;
//! let offsets = index_records(&data, envelope_offset)?;
//!
//! let mut stream = Stream::open(path)?;
//! stream.reindex(offsets.tells.clone(), offsets.residuals.clone())?;
//! let record = stream.at(0)?;
//! println!("{}: type {} ({} bytes)", label.id, record.record_type, record.data.len());
//! # Ok(())
//! # }
//! ```
//!
//! Writing DLIS, V2 support, decryption, and semantic interpretation of
//! named objects are all out of scope.

pub mod decode;
pub mod envelope;
pub mod error;
pub mod index;
pub mod objects;
pub mod stream;
pub mod sul;
pub mod types;

mod float;

pub use envelope::{
    LRSH_SIZE, SegmentAttributes, SegmentHeader, VRL_SIZE, VisibleRecordHeader, find_vrl,
};
pub use error::{DlisError, ErrorKind, Result};
pub use index::{StreamOffsets, index_records};
pub use objects::{Object, ObjectAttribute, ObjectSet, parse_object_set};
pub use stream::{LogicalRecord, Stream};
pub use sul::{SUL_SIZE, StorageSetLayout, StorageUnitLabel, find_sul, parse_sul};
pub use types::{Attref, DateTime, Obname, Objref, RepresentationCode, Value};
