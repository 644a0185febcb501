use crate::cli::AddArgs;
use crate::error::{Error, Result};
use crate::util::{file_entry_name, format_size, load_archive, store_archive};

pub fn run(args: AddArgs) -> Result<()> {
    let mut archive = load_archive(&args.archive)?;

    let entry_name = match args.name {
        Some(entry_name) => entry_name,
        None => file_entry_name(&args.file, None)?,
    };

    let header = archive
        .add_path_as(&args.file, &entry_name)
        .map_err(|source| Error::AddFile {
            path: args.file.clone(),
            source,
        })?;

    store_archive(&archive, &args.archive)?;
    println!("{} ({})", header.name(), format_size(header.payload_size));

    Ok(())
}
