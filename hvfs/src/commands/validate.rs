use hvfs_format::{io, is_consistent, validate};

use crate::cli::ValidateArgs;
use crate::error::{Error, Result};
use crate::util::format_size;

pub fn run(args: ValidateArgs) -> Result<()> {
    let bytes = io::read_file(&args.archive).map_err(|source| Error::OpenArchive {
        path: args.archive.clone(),
        source,
    })?;

    let entries = validate::check(&bytes).map_err(|source| Error::Invalid {
        path: args.archive.clone(),
        source,
    })?;

    if args.strict {
        validate::check_names(&bytes).map_err(|source| Error::Invalid {
            path: args.archive.clone(),
            source,
        })?;
        if !is_consistent(&bytes) {
            return Err(Error::Inconsistent { path: args.archive });
        }
    }

    println!(
        "{}: OK ({} entries, {})",
        args.archive.display(),
        entries,
        format_size(bytes.len() as u64)
    );

    Ok(())
}
