//! Resolves a request's options and renders compact output.

use tracing::debug;

use super::error::CompactError;
use super::metric::{Metric, TextMetric, DEFAULT_ENCODING};
use super::options::OptionSet;
use super::profiles::ProfileRegistry;
use super::rewrite::rewrite;
use super::spec::parse_spec;
use super::tune::search;

/// Auto-tune settings for an enabled search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutoTune {
    /// Metric used to score candidates.
    pub metric: Metric,
    /// Tokenizer encoding for [`Metric::Tokens`].
    pub encoding: String,
    /// Specs tried in order against the current champion.
    pub candidates: Vec<String>,
}

impl Default for AutoTune {
    fn default() -> Self {
        Self {
            metric: Metric::Tokens,
            encoding: DEFAULT_ENCODING.to_string(),
            candidates: Vec::new(),
        }
    }
}

/// Base options, profiles and auto-tune policy for one invocation.
#[derive(Debug, Clone, Default)]
pub struct Compactor {
    base: OptionSet,
    profiles: ProfileRegistry,
    auto_tune: Option<AutoTune>,
}

impl Compactor {
    /// Creates a compactor with auto-tune disabled.
    pub fn new(base: OptionSet, profiles: ProfileRegistry) -> Self {
        Self {
            base,
            profiles,
            auto_tune: None,
        }
    }

    /// Enables auto-tune with `settings`.
    pub fn with_auto_tune(mut self, settings: AutoTune) -> Self {
        self.auto_tune = Some(settings);
        self
    }

    /// Disables auto-tune regardless of configuration.
    pub fn without_auto_tune(mut self) -> Self {
        self.auto_tune = None;
        self
    }

    /// The config-derived base options.
    pub fn base(&self) -> &OptionSet {
        &self.base
    }

    /// Registered profiles.
    pub fn profiles(&self) -> &ProfileRegistry {
        &self.profiles
    }

    /// Auto-tune settings, when enabled.
    pub fn auto_tune(&self) -> Option<&AutoTune> {
        self.auto_tune.as_ref()
    }

    /// Merges an optional spec over the base options.
    ///
    /// Callers resolve before producing any diff text, so usage errors
    /// surface before output exists.
    pub fn resolve(&self, spec: Option<&str>) -> Result<OptionSet, CompactError> {
        match spec {
            Some(spec) => parse_spec(spec, &self.base, &self.profiles),
            None => Ok(self.base.clone()),
        }
    }

    /// Renders `text` with `options`, searching candidates when auto-tune is on.
    pub fn render(&self, text: &str, options: &OptionSet) -> Result<String, CompactError> {
        let Some(settings) = self.auto_tune.as_ref() else {
            return Ok(rewrite(text, options));
        };
        if text.is_empty() {
            return Ok(rewrite(text, options));
        }

        let metric = TextMetric::new(settings.metric, &settings.encoding);
        let best = search(text, options, &settings.candidates, &metric, &self.profiles)?;
        debug!(score = best.score, "auto-tune selected rendering");
        Ok(best.text)
    }
}
