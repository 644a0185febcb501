use hvfs_format::MappedArchive;

use crate::cli::ExtractArgs;
use crate::error::{Error, Result};

pub fn run(args: ExtractArgs) -> Result<()> {
    let archive = MappedArchive::open(&args.archive).map_err(|source| Error::OpenArchive {
        path: args.archive.clone(),
        source,
    })?;
    let reader = archive.reader().map_err(|source| Error::OpenArchive {
        path: args.archive.clone(),
        source,
    })?;

    let output_path = match args.output {
        Some(path) => path,
        None => std::env::current_dir().map_err(|source| Error::CurrentDir { source })?,
    };

    let count = if args.names.is_empty() {
        reader
            .extract_all(&output_path)
            .map_err(|source| Error::Extract { source })?
    } else {
        for entry_name in args.names.iter() {
            let path = reader
                .extract(entry_name, &output_path)
                .map_err(|source| Error::Extract { source })?;
            if !args.quiet {
                println!("{}", path.display());
            }
        }
        args.names.len()
    };

    if !args.quiet {
        println!("Extracted {} files to {}", count, output_path.display());
    }

    Ok(())
}
