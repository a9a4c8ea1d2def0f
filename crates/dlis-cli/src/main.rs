use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;
mod logging;

use cli::{Cli, Command};

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbosity.tracing_level_filter());

    match cli.command {
        Command::Describe(args) => commands::run_describe(&args.file),
        Command::Index(args) => commands::run_index(&args.file, args.records),
    }
}
