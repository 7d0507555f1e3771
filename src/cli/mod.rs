//! CLI argument parsing for lockman.
//!
//! Uses clap derive macros for declarative argument definitions.
//! This module defines the command structure; actual implementations
//! are in the `commands` module.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// lockman: strict two-phase lock manager.
///
/// Reads commands of the form `<Operation> <TransactionId> [<ResourceName>]`
/// (operations: Start, End, SLock, XLock, Unlock), one per line, and prints
/// the resulting status lines as each command is processed.
#[derive(Parser, Debug)]
#[command(name = "lockman")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to a YAML config file.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands for lockman.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Process a stream of lock commands.
    ///
    /// Reads from stdin unless --input is given. Status lines go to stdout,
    /// rejected lines are reported on stderr and processing continues.
    Run(RunArgs),

    /// Print the effective configuration as YAML.
    Config,
}

/// Arguments for the `run` command.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Read commands from this file instead of stdin.
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Grant sweep policy (batch_shared, single). Overrides the config file.
    #[arg(long)]
    pub grant_policy: Option<String>,

    /// Append an NDJSON audit record per line to this file.
    #[arg(long)]
    pub events: Option<PathBuf>,

    /// Do not print the interactive prompt on stderr.
    #[arg(long)]
    pub no_banner: bool,
}

impl Cli {
    /// Parse command line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
