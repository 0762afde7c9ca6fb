//! Show command.

use anyhow::Result;
use clap::Parser;

use super::{plain_patch_options, CompactArgs};
use crate::config::RouterConfig;
use crate::git::GitRepository;

/// Show command options.
#[derive(Parser)]
pub struct ShowCommand {
    /// Commit to show.
    #[arg(value_name = "REV", default_value = "HEAD")]
    pub rev: String,

    /// Lines of context.
    #[arg(short = 'U', long = "unified", value_name = "N")]
    pub unified: Option<u32>,

    #[command(flatten)]
    pub compact: CompactArgs,
}

impl ShowCommand {
    /// Executes the show command.
    pub fn execute(self, config: &RouterConfig) -> Result<()> {
        let plan = self.compact.plan(config)?;
        let patch_options = match &plan {
            Some(plan) => plan.patch_options(self.unified),
            None => plain_patch_options(config, self.unified),
        };

        let repo = GitRepository::open()?;
        let text = repo.show(&self.rev, &patch_options)?;

        match plan {
            Some(plan) => print!("{}", plan.render(&text)?),
            None => print!("{text}"),
        }
        Ok(())
    }
}
