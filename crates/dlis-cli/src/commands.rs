//! Command implementations.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use comfy_table::Table;
use tracing::info;

use dlis_core::{
    SUL_SIZE, StorageSetLayout, Stream, StreamOffsets, VisibleRecordHeader, find_sul, find_vrl,
    index_records, parse_object_set, parse_sul,
};

/// Print the storage unit label and the first visible envelope.
pub fn run_describe(path: &Path) -> Result<()> {
    let data = fs::read(path).with_context(|| format!("read {}", path.display()))?;

    let sul_offset = find_sul(&data).context("locate storage unit label")?;
    if sul_offset != 0 {
        info!(bytes = sul_offset, "garbage bytes before storage unit label");
    }

    let label = parse_sul(&data[sul_offset..]).context("parse storage unit label")?;
    let layout = match label.layout {
        StorageSetLayout::Record => "record",
        StorageSetLayout::Unknown => "unknown",
    };
    println!("storage unit label:");
    println!("    sequence-number: {}", label.sequence);
    println!("    version: V{}.{:02}", label.major, label.minor);
    println!("    layout: {layout}");
    println!("    max-record-length: {}", label.max_record_length);
    println!("    id: {}", label.id);
    if !label.consistent {
        println!("    (inconsistent fields were given fallback values)");
    }

    let envelope_offset =
        find_vrl(&data, sul_offset + SUL_SIZE).context("locate first visible envelope")?;
    if envelope_offset != sul_offset + SUL_SIZE {
        info!(
            bytes = envelope_offset - sul_offset - SUL_SIZE,
            "garbage bytes between storage unit label and first visible envelope"
        );
    }

    let envelope =
        VisibleRecordHeader::parse(&data[envelope_offset..]).context("parse visible envelope")?;
    println!("first visible envelope:");
    println!("    offset: {envelope_offset}");
    println!("    length: {}", envelope.length);
    println!("    version: {}", envelope.version);

    Ok(())
}

/// Index the file and print the offset table, optionally reassembling
/// every record.
pub fn run_index(path: &Path, records: bool) -> Result<()> {
    let data = fs::read(path).with_context(|| format!("read {}", path.display()))?;

    let sul_offset = find_sul(&data).context("locate storage unit label")?;
    let envelope_offset =
        find_vrl(&data, sul_offset + SUL_SIZE).context("locate first visible envelope")?;
    let offsets = index_records(&data, envelope_offset).context("index records")?;

    info!(
        record_count = offsets.len(),
        explicit_count = offsets.explicits.iter().filter(|&&e| e).count(),
        "indexed logical records"
    );

    if records {
        print_records(path, &offsets)?;
    } else {
        print_offsets(&offsets);
    }

    Ok(())
}

fn print_offsets(offsets: &StreamOffsets) {
    let mut table = Table::new();
    table.set_header(vec!["Record", "Tell", "Residual", "Explicit"]);
    for i in 0..offsets.len() {
        table.add_row(vec![
            i.to_string(),
            offsets.tells[i].to_string(),
            offsets.residuals[i].to_string(),
            offsets.explicits[i].to_string(),
        ]);
    }
    println!("{table}");
}

fn print_records(path: &Path, offsets: &StreamOffsets) -> Result<()> {
    let mut stream = Stream::open(path).with_context(|| format!("open {}", path.display()))?;
    stream
        .reindex(offsets.tells.clone(), offsets.residuals.clone())
        .context("install index")?;

    let mut table = Table::new();
    table.set_header(vec!["Record", "Type", "Bytes", "Flags", "Object set"]);
    let mut type_counts: BTreeMap<u8, usize> = BTreeMap::new();

    for i in 0..stream.record_count() {
        let record = stream.at(i).with_context(|| format!("reassemble record {i}"))?;
        *type_counts.entry(record.record_type).or_default() += 1;

        let mut flags = Vec::new();
        if record.is_explicit() {
            flags.push("explicit");
        }
        if record.is_encrypted() {
            flags.push("encrypted");
        }
        if !record.consistent {
            flags.push("inconsistent");
        }

        let set_summary = if record.is_explicit() && !record.is_encrypted() {
            match parse_object_set(&record.data) {
                Ok(set) => format!("{} '{}' ({} objects)", set.set_type, set.name, set.objects.len()),
                Err(error) => format!("unparsable: {error}"),
            }
        } else {
            String::new()
        };

        table.add_row(vec![
            i.to_string(),
            record.record_type.to_string(),
            record.data.len().to_string(),
            flags.join(", "),
            set_summary,
        ]);
    }
    println!("{table}");

    for (record_type, count) in type_counts {
        info!(record_type, count, "record type summary");
    }

    Ok(())
}
