//! CLI interface for git-router.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use crate::compact::{Compactor, OptionSet};
use crate::config::{ConfigManager, RouterConfig};
use crate::git::PatchOptions;

mod compact;
mod config;
mod diff;
mod show;

pub use compact::CompactCommand;
pub use config::{ConfigCommand, ConfigSubcommands, ShowConfigCommand};
pub use diff::DiffCommand;
pub use show::ShowCommand;

/// git-router: git diff and show with compact output.
#[derive(Parser)]
#[command(name = "git-router")]
#[command(about = "Git diff and show with compact output", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Config file to load instead of the default search paths.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// The main command to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Main commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Shows changes between the index, working tree and commits.
    Diff(DiffCommand),
    /// Shows a commit and its patch.
    Show(ShowCommand),
    /// Compacts diff text read from a file or stdin.
    Compact(CompactCommand),
    /// Configuration operations.
    Config(ConfigCommand),
}

impl Cli {
    /// Executes the CLI command.
    pub fn execute(self) -> Result<()> {
        let manager = match self.config {
            Some(path) => ConfigManager::with_path(path),
            None => ConfigManager::new(),
        };
        let config = manager.load()?;

        match self.command {
            Commands::Diff(diff_cmd) => diff_cmd.execute(&config),
            Commands::Show(show_cmd) => show_cmd.execute(&config),
            Commands::Compact(compact_cmd) => compact_cmd.execute(&config),
            Commands::Config(config_cmd) => config_cmd.execute(&config),
        }
    }
}

/// Compaction flags shared by `diff` and `show`.
#[derive(Args, Debug, Clone, Default)]
pub struct CompactArgs {
    /// Compact the output, optionally with a comma-separated option spec.
    #[arg(
        long,
        value_name = "SPEC",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = ""
    )]
    pub compact: Option<String>,

    /// Skip the configured candidate search.
    #[arg(long)]
    pub no_auto_tune: bool,
}

/// A resolved compaction request.
pub(crate) struct CompactPlan {
    compactor: Compactor,
    options: OptionSet,
}

impl CompactArgs {
    /// Resolves compaction before any diff text is produced, so spec errors
    /// are reported without output.
    pub(crate) fn plan(&self, config: &RouterConfig) -> Result<Option<CompactPlan>> {
        let Some(spec) = self.compact.as_deref() else {
            return Ok(None);
        };
        Ok(Some(CompactPlan::new(config, Some(spec), self.no_auto_tune)?))
    }
}

impl CompactPlan {
    pub(crate) fn new(config: &RouterConfig, spec: Option<&str>, no_auto_tune: bool) -> Result<Self> {
        let mut compactor = config.compactor()?;
        if no_auto_tune {
            compactor = compactor.without_auto_tune();
        }
        let spec = spec.filter(|spec| !spec.trim().is_empty());
        let options = compactor
            .resolve(spec)
            .context("Invalid compact spec")?;
        Ok(Self { compactor, options })
    }

    /// Producer settings, with an explicit `-U` taking precedence.
    pub(crate) fn patch_options(&self, unified: Option<u32>) -> PatchOptions {
        PatchOptions::from_compact(&self.options).with_context(unified)
    }

    pub(crate) fn render(&self, text: &str) -> Result<String> {
        Ok(self.compactor.render(text, &self.options)?)
    }

    pub(crate) fn options(&self) -> &OptionSet {
        &self.options
    }

    pub(crate) fn compactor(&self) -> &Compactor {
        &self.compactor
    }
}

/// Producer settings for plain output.
pub(crate) fn plain_patch_options(config: &RouterConfig, unified: Option<u32>) -> PatchOptions {
    PatchOptions {
        context_lines: unified.or(config.router.diff_default_context),
        no_prefix: false,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn compact_flag_forms() {
        let cli = Cli::try_parse_from(["git-router", "diff"]).unwrap();
        let Commands::Diff(cmd) = cli.command else {
            panic!("expected diff");
        };
        assert!(cmd.compact.compact.is_none());

        let cli = Cli::try_parse_from(["git-router", "diff", "--compact"]).unwrap();
        let Commands::Diff(cmd) = cli.command else {
            panic!("expected diff");
        };
        assert_eq!(cmd.compact.compact.as_deref(), Some(""));

        let cli =
            Cli::try_parse_from(["git-router", "diff", "--compact=short-hunk,u2", "HEAD~1"]).unwrap();
        let Commands::Diff(cmd) = cli.command else {
            panic!("expected diff");
        };
        assert_eq!(cmd.compact.compact.as_deref(), Some("short-hunk,u2"));
        assert_eq!(cmd.range.as_deref(), Some("HEAD~1"));
    }

    #[test]
    fn global_config_flag_after_subcommand() {
        let cli = Cli::try_parse_from(["git-router", "show", "--config", "x.yaml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("x.yaml")));
    }

    #[test]
    fn plan_is_none_without_compact() {
        let args = CompactArgs::default();
        assert!(args.plan(&RouterConfig::default()).unwrap().is_none());
    }

    #[test]
    fn plan_reports_bad_spec() {
        let args = CompactArgs {
            compact: Some("bogus".to_string()),
            no_auto_tune: false,
        };
        let err = args.plan(&RouterConfig::default()).err().unwrap();
        assert!(format!("{err:#}").contains("unknown compact option 'bogus'"));
    }

    #[test]
    fn explicit_unified_beats_compact_context() {
        let plan = CompactPlan::new(&RouterConfig::default(), Some("u4"), false).unwrap();
        assert_eq!(plan.patch_options(None).context_lines, Some(4));
        assert_eq!(plan.patch_options(Some(1)).context_lines, Some(1));
        assert!(plan.patch_options(None).no_prefix);
    }

    #[test]
    fn plain_output_uses_configured_context() {
        let config = RouterConfig::from_yaml("router:\n  diff_default_context: 7\n").unwrap();
        assert_eq!(plain_patch_options(&config, None).context_lines, Some(7));
        assert_eq!(plain_patch_options(&config, Some(2)).context_lines, Some(2));
        assert_eq!(
            plain_patch_options(&RouterConfig::default(), None).context_lines,
            None
        );
    }
}
