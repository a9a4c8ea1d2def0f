//! End-to-end framing tests: locate, index, and reassemble records from
//! byte-built files.

use std::io::Write;

use tempfile::NamedTempFile;

use dlis_core::envelope::{
    ATTR_CHECKSUM, ATTR_ENCRYPTED, ATTR_EXPLICIT, ATTR_PADDING, ATTR_PREDECESSOR, ATTR_SUCCESSOR,
    ATTR_TRAILING_LENGTH,
};
use dlis_core::{
    ErrorKind, SUL_SIZE, StorageSetLayout, Stream, find_sul, find_vrl, index_records, parse_sul,
};

/// An 80-byte storage unit label with the given identifier.
fn sul(id: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(SUL_SIZE);
    out.extend_from_slice(b"0001");
    out.extend_from_slice(b"V1.00");
    out.extend_from_slice(b"RECORD");
    out.extend_from_slice(b"08192");
    out.extend_from_slice(id.as_bytes());
    out.resize(SUL_SIZE, b' ');
    out
}

fn vrl(length: u16) -> [u8; 4] {
    let len = length.to_be_bytes();
    [len[0], len[1], 0xFF, 0x01]
}

fn lrsh(length: u16, attributes: u8, segment_type: u8) -> [u8; 4] {
    let len = length.to_be_bytes();
    [len[0], len[1], attributes, segment_type]
}

/// Write the bytes to a real file and open an indexed stream over it.
fn indexed_stream(data: &[u8]) -> (NamedTempFile, Stream) {
    let offsets = index_file(data);
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(data).unwrap();
    file.flush().unwrap();
    let mut stream = Stream::open(file.path()).unwrap();
    stream.reindex(offsets.tells, offsets.residuals).unwrap();
    (file, stream)
}

fn index_file(data: &[u8]) -> dlis_core::StreamOffsets {
    let sul_offset = find_sul(data).unwrap();
    let envelope_offset = find_vrl(data, sul_offset + SUL_SIZE).unwrap();
    index_records(data, envelope_offset).unwrap()
}

#[test]
fn minimum_file() {
    let mut data = sul("ID");
    data.extend_from_slice(&vrl(8));
    data.extend_from_slice(&lrsh(4, 0, 0));

    assert_eq!(find_sul(&data).unwrap(), 0);
    let label = parse_sul(&data).unwrap();
    assert_eq!(label.sequence, 1);
    assert_eq!(label.major, 1);
    assert_eq!(label.minor, 0);
    assert_eq!(label.layout, StorageSetLayout::Record);
    assert_eq!(label.max_record_length, 8192);
    assert_eq!(label.id, "ID");
    assert!(label.consistent);

    assert_eq!(find_vrl(&data, SUL_SIZE).unwrap(), 80);
    let offsets = index_records(&data, 80).unwrap();
    assert_eq!(offsets.tells, vec![84]);
    assert_eq!(offsets.residuals, vec![4]);
    assert_eq!(offsets.explicits, vec![false]);

    let (_file, mut stream) = indexed_stream(&data);
    assert_eq!(stream.record_count(), 1);
    let record = stream.at(0).unwrap();
    assert!(record.data.is_empty());
    assert_eq!(record.record_type, 0);
    assert!(record.consistent);
    assert!(!record.is_explicit());
    assert!(!record.is_encrypted());
}

#[test]
fn garbage_prefix() {
    let mut data = vec![0u8; 10];
    data.extend_from_slice(&sul("ID"));
    data.extend_from_slice(&vrl(8));
    data.extend_from_slice(&lrsh(4, 0, 0));

    let sul_offset = find_sul(&data).unwrap();
    assert_eq!(sul_offset, 10);
    assert!(parse_sul(&data[sul_offset..]).unwrap().consistent);

    let envelope_offset = find_vrl(&data, sul_offset + SUL_SIZE).unwrap();
    assert_eq!(envelope_offset, 90);

    let offsets = index_records(&data, envelope_offset).unwrap();
    assert_eq!(offsets.tells, vec![94]);
    assert_eq!(offsets.residuals, vec![4]);

    let (_file, mut stream) = indexed_stream(&data);
    let record = stream.at(0).unwrap();
    assert!(record.data.is_empty());
    assert!(record.consistent);
}

#[test]
fn multi_segment_record() {
    let mut data = sul("ID");
    data.extend_from_slice(&vrl(24));
    data.extend_from_slice(&lrsh(12, ATTR_SUCCESSOR, 5));
    data.extend_from_slice(&[1, 2, 3, 4, 5, 6, 7, 8]);
    data.extend_from_slice(&lrsh(8, ATTR_PREDECESSOR, 5));
    data.extend_from_slice(&[9, 10, 11, 12]);

    let offsets = index_file(&data);
    assert_eq!(offsets.len(), 1);

    let (_file, mut stream) = indexed_stream(&data);
    let record = stream.at(0).unwrap();
    assert_eq!(record.data, vec![1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12]);
    assert_eq!(record.record_type, 5);
    assert!(record.consistent);
}

#[test]
fn record_spanning_visible_records() {
    let mut data = sul("ID");
    // segment A fills the remainder of the first visible record
    data.extend_from_slice(&vrl(16));
    data.extend_from_slice(&lrsh(12, ATTR_SUCCESSOR, 5));
    data.extend_from_slice(&[1, 2, 3, 4, 5, 6, 7, 8]);
    // its successor opens the second one
    data.extend_from_slice(&vrl(12));
    data.extend_from_slice(&lrsh(8, ATTR_PREDECESSOR, 5));
    data.extend_from_slice(&[9, 10, 11, 12]);

    let offsets = index_file(&data);
    assert_eq!(offsets.tells, vec![84]);
    assert_eq!(offsets.residuals, vec![12]);

    let (_file, mut stream) = indexed_stream(&data);
    let record = stream.at(0).unwrap();
    // envelope bytes of the second visible record are elided
    assert_eq!(record.data, vec![1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12]);
    assert!(record.consistent);
}

#[test]
fn segment_with_all_trailers() {
    let attributes = ATTR_PADDING | ATTR_CHECKSUM | ATTR_TRAILING_LENGTH;
    let mut data = sul("ID");
    data.extend_from_slice(&vrl(26));
    data.extend_from_slice(&lrsh(22, attributes, 1));
    data.extend_from_slice(&[0xA0, 0xA1, 0xA2, 0xA3, 0xA4, 0xA5, 0xA6, 0xA7, 0xA8, 0xA9]);
    data.extend_from_slice(&[0x01, 0x01, 0x01, 0x04]); // pad, last byte is the count
    data.extend_from_slice(&[0xBE, 0xEF]); // checksum
    data.extend_from_slice(&[0x00, 0x14]); // trailing length

    let (_file, mut stream) = indexed_stream(&data);
    let record = stream.at(0).unwrap();
    assert_eq!(
        record.data,
        vec![0xA0, 0xA1, 0xA2, 0xA3, 0xA4, 0xA5, 0xA6, 0xA7, 0xA8, 0xA9]
    );
    assert!(record.consistent);
}

#[test]
fn inconsistent_type_returned_not_thrown() {
    let mut data = sul("ID");
    data.extend_from_slice(&vrl(20));
    data.extend_from_slice(&lrsh(8, ATTR_SUCCESSOR, 3));
    data.extend_from_slice(&[1, 2, 3, 4]);
    data.extend_from_slice(&lrsh(8, ATTR_PREDECESSOR, 7));
    data.extend_from_slice(&[5, 6, 7, 8]);

    let (_file, mut stream) = indexed_stream(&data);
    let record = stream.at(0).unwrap();
    assert!(!record.consistent);
    assert_eq!(record.record_type, 3); // first segment wins
    assert_eq!(record.data.len(), 8);
}

#[test]
fn explicit_and_encrypted_flags() {
    let mut data = sul("ID");
    data.extend_from_slice(&vrl(28));
    data.extend_from_slice(&lrsh(8, ATTR_EXPLICIT, 2));
    data.extend_from_slice(&[1, 2, 3, 4]);
    data.extend_from_slice(&lrsh(16, ATTR_ENCRYPTED, 4));
    data.extend_from_slice(&[0xDE; 12]);

    let offsets = index_file(&data);
    assert_eq!(offsets.explicits, vec![true, false]);

    let (_file, mut stream) = indexed_stream(&data);
    let explicit = stream.at(0).unwrap();
    assert!(explicit.is_explicit());
    assert!(!explicit.is_encrypted());

    let encrypted = stream.at(1).unwrap();
    assert!(encrypted.is_encrypted());
    // opaque bytes, returned unchanged
    assert_eq!(encrypted.data, vec![0xDE; 12]);

    // extract drops encrypted records
    let records = stream.extract(&[0, 1]).unwrap();
    assert_eq!(records.len(), 1);
    assert!(records[0].is_explicit());
}

#[test]
fn repeated_at_returns_equal_records() {
    let mut data = sul("ID");
    data.extend_from_slice(&vrl(20));
    data.extend_from_slice(&lrsh(8, 0, 1));
    data.extend_from_slice(&[1, 2, 3, 4]);
    data.extend_from_slice(&lrsh(8, 0, 2));
    data.extend_from_slice(&[5, 6, 7, 8]);

    let (_file, mut stream) = indexed_stream(&data);
    let first = stream.at(0).unwrap();
    let again = stream.at(0).unwrap();
    assert_eq!(first, again);

    // indexed type matches the reassembled type
    let second = stream.at(1).unwrap();
    assert_eq!(second.record_type, 2);
}

#[test]
fn contiguous_records_across_visible_record_boundary() {
    let mut data = sul("ID");
    data.extend_from_slice(&vrl(12));
    data.extend_from_slice(&lrsh(8, 0, 1));
    data.extend_from_slice(&[1, 2, 3, 4]);
    data.extend_from_slice(&vrl(12));
    data.extend_from_slice(&lrsh(8, 0, 2));
    data.extend_from_slice(&[5, 6, 7, 8]);

    let offsets = index_file(&data);
    assert_eq!(offsets.tells, vec![84, 96]);

    let (_file, mut stream) = indexed_stream(&data);
    assert!(stream.at(0).unwrap().consistent);
    assert!(stream.at(1).unwrap().consistent);
}

#[test]
fn non_contiguous_record_is_an_error() {
    let mut data = sul("ID");
    data.extend_from_slice(&vrl(20));
    data.extend_from_slice(&lrsh(8, 0, 1));
    data.extend_from_slice(&[1, 2, 3, 4]);
    data.extend_from_slice(&lrsh(8, 0, 2));
    data.extend_from_slice(&[5, 6, 7, 8]);

    let mut file = NamedTempFile::new().unwrap();
    file.write_all(&data).unwrap();
    file.flush().unwrap();

    let mut stream = Stream::open(file.path()).unwrap();
    // a lying second tell: record 0 actually ends at 92
    stream.reindex(vec![84, 96], vec![16, 4]).unwrap();
    let err = stream.at(0).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Inconsistent);
}

#[test]
fn byte_accounting_adds_up() {
    // every byte after the SUL is either envelope, header, or body
    let mut data = sul("ID");
    data.extend_from_slice(&vrl(20));
    data.extend_from_slice(&lrsh(8, 0, 1));
    data.extend_from_slice(&[1, 2, 3, 4]);
    data.extend_from_slice(&lrsh(8, 0, 2));
    data.extend_from_slice(&[5, 6, 7, 8]);
    data.extend_from_slice(&vrl(12));
    data.extend_from_slice(&lrsh(8, 0, 3));
    data.extend_from_slice(&[9, 10, 11, 12]);

    let (_file, mut stream) = indexed_stream(&data);
    let mut body_total = 0usize;
    for i in 0..stream.record_count() {
        body_total += stream.at(i).unwrap().data.len();
    }
    let envelope_bytes = 2 * 4; // two visible record headers
    let header_bytes = 3 * 4; // three segment headers
    assert_eq!(
        body_total + envelope_bytes + header_bytes,
        data.len() - SUL_SIZE
    );
}

#[test]
fn reindex_rejects_bad_arguments() {
    let mut data = sul("ID");
    data.extend_from_slice(&vrl(8));
    data.extend_from_slice(&lrsh(4, 0, 0));
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(&data).unwrap();
    file.flush().unwrap();

    let mut stream = Stream::open(file.path()).unwrap();
    assert_eq!(
        stream.reindex(vec![], vec![]).unwrap_err().kind(),
        ErrorKind::InvalidArgument
    );
    assert_eq!(
        stream.reindex(vec![84], vec![4, 4]).unwrap_err().kind(),
        ErrorKind::InvalidArgument
    );

    stream.reindex(vec![84], vec![4]).unwrap();
    assert_eq!(
        stream.at(1).unwrap_err().kind(),
        ErrorKind::InvalidArgument
    );
}

#[test]
fn read_at_returns_raw_bytes() {
    let mut data = sul("RAW");
    data.extend_from_slice(&vrl(8));
    data.extend_from_slice(&lrsh(4, 0, 0));
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(&data).unwrap();
    file.flush().unwrap();

    let mut stream = Stream::open(file.path()).unwrap();
    let mut buf = [0u8; 4];
    stream.read_at(0, &mut buf).unwrap();
    assert_eq!(&buf, b"0001");

    // past the end is an I/O error
    let err = stream.read_at(data.len() as u64, &mut buf).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
}

#[test]
fn open_missing_file() {
    let err = Stream::open(std::path::Path::new("does/not/exist.dlis")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
}

#[test]
fn truncated_tail_fails_the_index() {
    let mut data = sul("ID");
    data.extend_from_slice(&vrl(32));
    data.extend_from_slice(&lrsh(8, 0, 0));
    data.extend_from_slice(&[0u8; 4]);

    let err = index_records(&data, 80).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Truncated);
}
