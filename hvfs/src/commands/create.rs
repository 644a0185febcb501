use hvfs_format::ingest::{self, Diagnostics, IngestOptions};
use hvfs_format::Archive;

use crate::cli::CreateArgs;
use crate::error::{Error, Result};
use crate::util::{file_entry_name, format_size, store_archive};

pub fn run(args: CreateArgs) -> Result<()> {
    if args.paths.is_empty() {
        return Err(Error::NoFilesSpecified);
    }

    if args.archive.exists() && !args.force {
        return Err(Error::ArchiveExists { path: args.archive });
    }

    let options = IngestOptions {
        prefix: args.prefix.clone(),
        include_hidden: !args.no_hidden,
        follow_links: args.follow_links,
    };

    let mut archive = Archive::new();
    let mut diagnostics = Diagnostics::new();
    let mut files = 0u64;
    let mut bytes = 0u64;

    for path in args.paths.iter() {
        if path.is_dir() {
            tracing::debug!(path = %path.display(), "ingesting directory");
            let stats = ingest::add_directory(&mut archive, path, &options, &mut diagnostics)
                .map_err(|source| Error::AddFile {
                    path: path.clone(),
                    source,
                })?;
            files += stats.files_added;
            bytes += stats.bytes_added;
        } else {
            let entry_name = file_entry_name(path, options.prefix.as_deref())?;
            let header = archive
                .add_path_as(path, &entry_name)
                .map_err(|source| Error::AddFile {
                    path: path.clone(),
                    source,
                })?;
            files += 1;
            bytes += header.payload_size;
        }
    }

    tracing::info!(files, bytes, skipped = diagnostics.len(), "archive assembled");
    store_archive(&archive, &args.archive)?;

    for diagnostic in diagnostics.iter() {
        eprintln!("skipped {}", diagnostic);
    }

    println!(
        "Added {} files ({}) to {} [{} on disk]",
        files,
        format_size(bytes),
        args.archive.display(),
        format_size(archive.len() as u64)
    );

    Ok(())
}
