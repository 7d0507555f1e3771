//! Command implementations for lockman.
//!
//! This module provides the dispatcher that routes CLI commands to their
//! implementations.

mod run;

use crate::cli::{Cli, Command};
use lockman::config::Config;
use lockman::error::Result;

/// Dispatch a command to its implementation.
pub fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Run(args) => run::cmd_run(args, cli.config.as_deref()),
        Command::Config => cmd_config(cli.config.as_deref()),
    }
}

fn cmd_config(config_path: Option<&std::path::Path>) -> Result<()> {
    let config = Config::load_or_default(config_path)?;
    print!("{}", config.to_yaml()?);
    Ok(())
}
