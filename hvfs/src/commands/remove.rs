use crate::cli::RemoveArgs;
use crate::error::{Error, Result};
use crate::util::{load_archive, store_archive};

pub fn run(args: RemoveArgs) -> Result<()> {
    let mut archive = load_archive(&args.archive)?;
    archive
        .remove(&args.name)
        .map_err(|source| Error::Modify { source })?;
    store_archive(&archive, &args.archive)
}
