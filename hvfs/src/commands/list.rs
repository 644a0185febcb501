use hvfs_format::{walk, EntryHeader, MappedArchive};
use serde::Serialize;

use crate::cli::ListArgs;
use crate::error::{Error, Result};
use crate::util::format_size;

#[derive(Serialize)]
struct JsonEntry<'a> {
    name: &'a str,
    size: u64,
    header_offset: usize,
    payload_offset: u64,
}

pub fn run(args: ListArgs) -> Result<()> {
    let archive = MappedArchive::open(&args.archive).map_err(|source| Error::OpenArchive {
        path: args.archive.clone(),
        source,
    })?;

    let entries = walk(archive.as_bytes())
        .collect::<hvfs_format::Result<Vec<_>>>()
        .map_err(|source| Error::OpenArchive {
            path: args.archive.clone(),
            source,
        })?;

    if args.json {
        list_json(&entries)
    } else if args.long {
        list_long(&entries, archive.as_bytes().len());
        Ok(())
    } else {
        list_compact(&entries);
        Ok(())
    }
}

fn list_compact(entries: &[(usize, EntryHeader)]) {
    for (_, header) in entries {
        println!("{:>12}  {}", format_size(header.payload_size), header.name());
    }
}

fn list_long(entries: &[(usize, EntryHeader)], archive_len: usize) {
    println!("{:>10}  {:>10}  {:>12}  Name", "Header", "Payload", "Size");
    println!("{}", "-".repeat(60));

    let mut total = 0u64;
    for (start, header) in entries {
        println!(
            "{:>#10x}  {:>#10x}  {:>12}  {}",
            start,
            header.payload_offset,
            header.payload_size,
            header.name()
        );
        total += header.payload_size;
    }

    println!("{}", "-".repeat(60));
    println!(
        "{} entries, {} of payload, {} on disk",
        entries.len(),
        format_size(total),
        format_size(archive_len as u64)
    );
}

fn list_json(entries: &[(usize, EntryHeader)]) -> Result<()> {
    let json = entries
        .iter()
        .map(|(start, header)| JsonEntry {
            name: header.name(),
            size: header.payload_size,
            header_offset: *start,
            payload_offset: header.payload_offset,
        })
        .collect::<Vec<_>>();

    let out = serde_json::to_string_pretty(&json).map_err(|source| Error::Json { source })?;
    println!("{}", out);
    Ok(())
}
