use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "hvfs",
    about = "Create, modify and extract flat resource archives.",
    version
)]
pub struct Cli {
    /// Log library activity at debug level (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    #[command(visible_alias = "c", about = "Create a new archive")]
    Create(CreateArgs),

    #[command(visible_alias = "a", about = "Add a file to an archive")]
    Add(AddArgs),

    #[command(visible_alias = "rm", about = "Remove an entry from an archive")]
    Remove(RemoveArgs),

    #[command(visible_alias = "mv", about = "Rename an entry in an archive")]
    Rename(RenameArgs),

    #[command(visible_alias = "u", about = "Replace an entry with the contents of a file")]
    Update(UpdateArgs),

    #[command(visible_aliases = ["l", "ls"], about = "List entries in an archive")]
    List(ListArgs),

    #[command(visible_alias = "x", about = "Extract entries from an archive")]
    Extract(ExtractArgs),

    #[command(visible_aliases = ["t", "test"], about = "Check the structure of an archive")]
    Validate(ValidateArgs),
}

#[derive(Debug, clap::Args)]
#[command(after_help = "\
\x1b[1m\x1b[4mExamples:\x1b[0m
  hvfs create assets.hvfs textures/ shaders/
  hvfs create --prefix data -f assets.hvfs build/")]
pub struct CreateArgs {
    /// Output archive path
    pub archive: PathBuf,

    /// Files and directories to archive
    #[arg(value_name = "PATH")]
    pub paths: Vec<PathBuf>,

    /// Prefix prepended to every entry name
    #[arg(long, value_name = "PREFIX")]
    pub prefix: Option<String>,

    /// Skip hidden files and directories
    #[arg(long)]
    pub no_hidden: bool,

    /// Follow symbolic links while walking directories
    #[arg(short = 'L', long)]
    pub follow_links: bool,

    /// Overwrite existing archive
    #[arg(short = 'f', long)]
    pub force: bool,
}

#[derive(Debug, clap::Args)]
pub struct AddArgs {
    /// Path to the archive
    pub archive: PathBuf,

    /// File to add
    pub file: PathBuf,

    /// Entry name (defaults to the file name)
    #[arg(long = "as", value_name = "NAME")]
    pub name: Option<String>,
}

#[derive(Debug, clap::Args)]
pub struct RemoveArgs {
    /// Path to the archive
    pub archive: PathBuf,

    /// Entry to remove
    pub name: String,
}

#[derive(Debug, clap::Args)]
pub struct RenameArgs {
    /// Path to the archive
    pub archive: PathBuf,

    /// Current entry name
    pub old: String,

    /// New entry name
    pub new: String,
}

#[derive(Debug, clap::Args)]
pub struct UpdateArgs {
    /// Path to the archive
    pub archive: PathBuf,

    /// Entry to replace
    pub name: String,

    /// File holding the new contents (defaults to the file the entry is named after)
    pub file: Option<PathBuf>,

    /// Directory entry names are resolved against when no file is given
    #[arg(short = 'C', long, value_name = "DIR", default_value = ".")]
    pub root: PathBuf,

    /// Store the new contents under a different name
    #[arg(long = "as", value_name = "NAME")]
    pub new_name: Option<String>,

    /// Read the new file before touching the old entry
    #[arg(long)]
    pub atomic: bool,
}

#[derive(Debug, clap::Args)]
pub struct ListArgs {
    /// Path to the archive
    pub archive: PathBuf,

    /// Show header offsets and exact sizes
    #[arg(short = 'l', long)]
    pub long: bool,

    /// Output as JSON
    #[arg(long, conflicts_with = "long")]
    pub json: bool,
}

#[derive(Debug, clap::Args)]
pub struct ExtractArgs {
    /// Path to the archive
    pub archive: PathBuf,

    /// Output directory (defaults to current directory)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Entries to extract (all if none given)
    #[arg(value_name = "NAME")]
    pub names: Vec<String>,

    /// Suppress output
    #[arg(short = 'q', long)]
    pub quiet: bool,
}

#[derive(Debug, clap::Args)]
pub struct ValidateArgs {
    /// Path to the archive
    pub archive: PathBuf,

    /// Also require unique UTF-8 names and stored payload offsets that match the layout
    #[arg(long)]
    pub strict: bool,
}
