//! Configuration-related CLI commands.

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::config::RouterConfig;

/// Configuration operations.
#[derive(Parser)]
pub struct ConfigCommand {
    /// Configuration subcommand to execute.
    #[command(subcommand)]
    pub command: ConfigSubcommands,
}

/// Configuration subcommands.
#[derive(Subcommand)]
pub enum ConfigSubcommands {
    /// Prints the loaded configuration as YAML.
    Show(ShowConfigCommand),
}

/// Show command options.
#[derive(Parser)]
pub struct ShowConfigCommand {}

impl ConfigCommand {
    /// Executes the config command.
    pub fn execute(self, config: &RouterConfig) -> Result<()> {
        match self.command {
            ConfigSubcommands::Show(show_cmd) => show_cmd.execute(config),
        }
    }
}

impl ShowConfigCommand {
    /// Executes the show command.
    pub fn execute(self, config: &RouterConfig) -> Result<()> {
        print!("{}", config.to_yaml()?);
        Ok(())
    }
}
