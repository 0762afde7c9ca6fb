//! Diff command.

use anyhow::Result;
use clap::Parser;
use tracing::debug;

use super::{plain_patch_options, CompactArgs};
use crate::config::RouterConfig;
use crate::git::GitRepository;

/// Diff command options.
#[derive(Parser)]
pub struct DiffCommand {
    /// Compare HEAD against the index instead of the index against the working tree.
    #[arg(long, conflicts_with = "range")]
    pub cached: bool,

    /// Revision range (`A..B`), or a single revision compared with the working tree.
    #[arg(value_name = "REV_RANGE")]
    pub range: Option<String>,

    /// Lines of context.
    #[arg(short = 'U', long = "unified", value_name = "N")]
    pub unified: Option<u32>,

    #[command(flatten)]
    pub compact: CompactArgs,
}

impl DiffCommand {
    /// Executes the diff command.
    pub fn execute(self, config: &RouterConfig) -> Result<()> {
        let plan = self.compact.plan(config)?;
        let patch_options = match &plan {
            Some(plan) => plan.patch_options(self.unified),
            None => plain_patch_options(config, self.unified),
        };
        debug!(?patch_options, cached = self.cached, range = ?self.range, "running diff");

        let repo = GitRepository::open()?;
        let text = match (&self.range, self.cached) {
            (Some(range), _) => repo.diff_range(range, &patch_options)?,
            (None, true) => repo.diff_cached(&patch_options)?,
            (None, false) => repo.diff_workdir(&patch_options)?,
        };

        match plan {
            Some(plan) => print!("{}", plan.render(&text)?),
            None => print!("{text}"),
        }
        Ok(())
    }
}
