use hvfs_format::name;

use crate::cli::UpdateArgs;
use crate::error::{Error, Result};
use crate::util::{format_size, load_archive, store_archive};

pub fn run(args: UpdateArgs) -> Result<()> {
    let mut archive = load_archive(&args.archive)?;
    let new_name = args.new_name.as_deref().unwrap_or(&args.name);

    tracing::debug!(name = %args.name, new_name, atomic = args.atomic, "updating entry");
    let result = match (&args.file, args.atomic) {
        (Some(file), false) => archive.update_file(&args.name, file, new_name),
        (Some(file), true) => archive.replace_file(&args.name, file, new_name),
        (None, false) if new_name == args.name => archive.refresh(&args.root, &args.name),
        (None, _) => {
            // The entry is re-read from the file its own name points at.
            let file = name::to_relative_path(&args.name)
                .map(|relative| args.root.join(relative))
                .map_err(|source| Error::InvalidPath {
                    path: args.name.clone().into(),
                    source,
                })?;
            if args.atomic {
                archive.replace_file(&args.name, file, new_name)
            } else {
                archive.update_file(&args.name, file, new_name)
            }
        }
    };

    // A failed update is never stored, so the file on disk keeps the old entry.
    let header = result.map_err(|source| Error::UpdateEntry {
        name: args.name.clone(),
        source,
    })?;

    store_archive(&archive, &args.archive)?;
    println!("{} ({})", header.name(), format_size(header.payload_size));

    Ok(())
}
