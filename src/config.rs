//! Router configuration loaded from YAML.
//!
//! Only the `router` section is read; other top-level keys are ignored so a
//! config shared with other tools still loads.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::compact::metric::DEFAULT_ENCODING;
use crate::compact::{AutoTune, Compactor, Metric, OptionFragment, OptionSet, ProfileRegistry};

/// File name looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = ".git-router.yaml";

/// Root configuration document.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RouterConfig {
    /// Router settings.
    #[serde(default)]
    pub router: RouterSection,
}

/// The `router:` section.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RouterSection {
    /// Context lines for plain (non-compact) diffs without `-U`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diff_default_context: Option<u32>,

    /// Option overrides applied over the built-in compact defaults.
    #[serde(default)]
    pub compact_defaults: Option<OptionFragment>,

    /// Named option fragments usable from compact specs.
    #[serde(default)]
    pub compact_profiles: Option<ProfileRegistry>,

    /// Candidate search settings.
    #[serde(default)]
    pub compact_auto_tune: AutoTuneConfig,
}

/// The `router.compact_auto_tune:` section.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AutoTuneConfig {
    /// Whether compact output is searched over `candidates`.
    #[serde(default)]
    pub enabled: bool,

    /// `chars` or `tokens`.
    #[serde(default = "default_metric")]
    pub metric: String,

    /// Tokenizer encoding for the `tokens` metric.
    #[serde(default = "default_encoding")]
    pub encoding: String,

    /// Candidate specs; non-string and blank entries are skipped.
    #[serde(default)]
    pub candidates: Vec<serde_yaml::Value>,
}

impl Default for AutoTuneConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            metric: default_metric(),
            encoding: default_encoding(),
            candidates: Vec::new(),
        }
    }
}

fn default_metric() -> String {
    Metric::Tokens.to_string()
}

fn default_encoding() -> String {
    DEFAULT_ENCODING.to_string()
}

impl AutoTuneConfig {
    /// String candidates in order, trimmed, with blanks and non-strings dropped.
    pub fn candidate_specs(&self) -> Vec<String> {
        self.candidates
            .iter()
            .filter_map(serde_yaml::Value::as_str)
            .map(str::trim)
            .filter(|spec| !spec.is_empty())
            .map(ToString::to_string)
            .collect()
    }

    /// Engine settings, or `None` when disabled.
    pub fn settings(&self) -> Result<Option<AutoTune>> {
        if !self.enabled {
            return Ok(None);
        }
        let metric: Metric = self
            .metric
            .parse()
            .context("Invalid router.compact_auto_tune.metric")?;
        Ok(Some(AutoTune {
            metric,
            encoding: self.encoding.trim().to_string(),
            candidates: self.candidate_specs(),
        }))
    }
}

impl RouterConfig {
    /// Parses a YAML document. An empty document yields the defaults.
    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).context("Router config must be a YAML map")
    }

    /// Base compact options: built-in defaults with `compact_defaults` applied.
    pub fn compact_defaults(&self) -> OptionSet {
        match &self.router.compact_defaults {
            Some(fragment) => OptionSet::default().merge(fragment),
            None => OptionSet::default(),
        }
    }

    /// Registered compact profiles.
    pub fn compact_profiles(&self) -> ProfileRegistry {
        self.router.compact_profiles.clone().unwrap_or_default()
    }

    /// Builds the compactor described by this config.
    pub fn compactor(&self) -> Result<Compactor> {
        let compactor = Compactor::new(self.compact_defaults(), self.compact_profiles());
        Ok(match self.router.compact_auto_tune.settings()? {
            Some(settings) => compactor.with_auto_tune(settings),
            None => compactor,
        })
    }

    /// Renders the effective configuration as YAML.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize router config")
    }
}

/// Locates and loads the router config.
pub struct ConfigManager {
    explicit: Option<PathBuf>,
    search_paths: Vec<PathBuf>,
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self {
            explicit: None,
            search_paths: Self::default_search_paths(),
        }
    }
}

impl ConfigManager {
    /// Creates a manager using the default search paths.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a manager that must load `path`.
    pub fn with_path(path: PathBuf) -> Self {
        Self {
            explicit: Some(path),
            search_paths: Vec::new(),
        }
    }

    /// `./.git-router.yaml`, then `~/.git-router/config.yaml`.
    pub fn default_search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(LOCAL_CONFIG_FILE)];
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".git-router").join("config.yaml"));
        }
        paths
    }

    /// Loads the explicit path, or the first existing search path, or defaults.
    pub fn load(&self) -> Result<RouterConfig> {
        if let Some(path) = &self.explicit {
            if !path.exists() {
                anyhow::bail!("Config file not found: {}", path.display());
            }
            return Self::load_from_file(path);
        }

        match self.search_paths.iter().find(|path| path.exists()) {
            Some(path) => Self::load_from_file(path),
            None => {
                debug!("no router config found, using defaults");
                Ok(RouterConfig::default())
            }
        }
    }

    /// Loads and parses a config file.
    pub fn load_from_file(path: &Path) -> Result<RouterConfig> {
        debug!(path = %path.display(), "loading router config");
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        RouterConfig::from_yaml(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }
}
