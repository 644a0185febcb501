mod cli;
mod commands;
mod error;
mod util;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};

fn main() -> miette::Result<()> {
    let cli = Cli::parse_from(wild::args_os());

    let default_filter = if cli.verbose {
        "warn,hvfs=debug,hvfs_format=debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Create(args) => commands::create(args)?,
        Commands::Add(args) => commands::add(args)?,
        Commands::Remove(args) => commands::remove(args)?,
        Commands::Rename(args) => commands::rename(args)?,
        Commands::Update(args) => commands::update(args)?,
        Commands::List(args) => commands::list(args)?,
        Commands::Extract(args) => commands::extract(args)?,
        Commands::Validate(args) => commands::validate(args)?,
    };

    Ok(())
}
