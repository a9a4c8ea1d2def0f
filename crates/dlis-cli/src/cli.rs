//! CLI argument definitions for the DLIS inspector.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_verbosity_flag::{InfoLevel, Verbosity};

#[derive(Debug, Parser)]
#[command(
    name = "dlis",
    version,
    about = "Inspect DLIS (RP66 V1) well log files",
    long_about = "Inspect DLIS (RP66 V1) well log files.\n\n\
                  Locates the storage unit label and visible record envelopes,\n\
                  indexes every logical record, and summarises object sets."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<InfoLevel>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the storage unit label and the first visible envelope.
    Describe(DescribeArgs),

    /// Index every logical record and print the offset table.
    Index(IndexArgs),
}

#[derive(Debug, Args)]
pub struct DescribeArgs {
    /// Path to the DLIS file.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,
}

#[derive(Debug, Args)]
pub struct IndexArgs {
    /// Path to the DLIS file.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Also reassemble every record and report its type and consistency.
    #[arg(long)]
    pub records: bool,
}
