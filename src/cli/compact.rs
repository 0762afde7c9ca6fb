//! Compact command: compacts diff text produced elsewhere.

use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use super::CompactPlan;
use crate::compact::{Metric, TextMetric};
use crate::config::RouterConfig;

/// Compact command options.
#[derive(Parser)]
pub struct CompactCommand {
    /// Comma-separated option spec applied over the config defaults.
    #[arg(long, value_name = "SPEC")]
    pub spec: Option<String>,

    /// Read diff text from this file instead of stdin.
    #[arg(long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Skip the configured candidate search.
    #[arg(long)]
    pub no_auto_tune: bool,

    /// Report raw and compacted sizes to stderr.
    #[arg(long)]
    pub stats: bool,
}

impl CompactCommand {
    /// Executes the compact command.
    pub fn execute(self, config: &RouterConfig) -> Result<()> {
        let plan = CompactPlan::new(config, self.spec.as_deref(), self.no_auto_tune)?;
        let text = self.read_input()?;
        let output = plan.render(&text)?;

        if self.stats {
            let (metric, encoding) = stats_metric(config, &plan)?;
            let metric = TextMetric::new(metric, &encoding);
            eprintln!(
                "{}: raw {} -> compact {}",
                metric.metric(),
                metric.measure(&text),
                metric.measure(&output)
            );
        }

        print!("{output}");
        Ok(())
    }

    fn read_input(&self) -> Result<String> {
        match &self.input {
            Some(path) => std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read input file: {}", path.display())),
            None => {
                let mut text = String::new();
                std::io::stdin()
                    .read_to_string(&mut text)
                    .context("Failed to read diff from stdin")?;
                Ok(text)
            }
        }
    }
}

/// The metric sizes are reported in: the active search's, else the configured one.
fn stats_metric(config: &RouterConfig, plan: &CompactPlan) -> Result<(Metric, String)> {
    if let Some(settings) = plan.compactor().auto_tune() {
        return Ok((settings.metric, settings.encoding.clone()));
    }
    let tune = &config.router.compact_auto_tune;
    let metric: Metric = tune
        .metric
        .parse()
        .context("Invalid router.compact_auto_tune.metric")?;
    Ok((metric, tune.encoding.clone()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn stats_metric_prefers_active_search() {
        let config = RouterConfig::from_yaml(
            "router:\n  compact_auto_tune:\n    enabled: true\n    metric: chars\n",
        )
        .unwrap();
        let plan = CompactPlan::new(&config, None, false).unwrap();
        assert_eq!(stats_metric(&config, &plan).unwrap().0, Metric::Chars);
    }

    #[test]
    fn stats_metric_falls_back_to_config() {
        let config = RouterConfig::default();
        let plan = CompactPlan::new(&config, None, true).unwrap();
        let (metric, encoding) = stats_metric(&config, &plan).unwrap();
        assert_eq!(metric, Metric::Tokens);
        assert_eq!(encoding, "cl100k_base");
        assert!(plan.options().drop_headers());
    }

    #[test]
    fn reads_input_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("in.diff");
        std::fs::write(&path, "diff --git a/x b/x\n").unwrap();
        let cmd = CompactCommand {
            spec: None,
            input: Some(path),
            no_auto_tune: false,
            stats: false,
        };
        assert_eq!(cmd.read_input().unwrap(), "diff --git a/x b/x\n");
    }
}
