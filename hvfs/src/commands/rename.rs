use crate::cli::RenameArgs;
use crate::error::{Error, Result};
use crate::util::{load_archive, store_archive};

pub fn run(args: RenameArgs) -> Result<()> {
    let mut archive = load_archive(&args.archive)?;
    archive
        .rename(&args.old, &args.new)
        .map_err(|source| Error::Modify { source })?;
    store_archive(&archive, &args.archive)
}
