//! Size metrics used to score compact renderings.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::error::CompactError;

/// Tokenizer encoding used when none is configured.
pub const DEFAULT_ENCODING: &str = "cl100k_base";

/// How the size of a rendering is measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    /// Unicode scalar values.
    Chars,
    /// Tokens under a tokenizer encoding, or chars when none is available.
    #[default]
    Tokens,
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Metric::Chars => write!(f, "chars"),
            Metric::Tokens => write!(f, "tokens"),
        }
    }
}

impl FromStr for Metric {
    type Err = CompactError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "chars" => Ok(Metric::Chars),
            "tokens" => Ok(Metric::Tokens),
            _ => Err(CompactError::UnknownMetric(s.to_string())),
        }
    }
}

/// Counts tokens for one encoding.
pub trait Tokenizer {
    /// Number of tokens in `text`.
    fn count_tokens(&self, text: &str) -> usize;
}

#[cfg(feature = "tiktoken")]
struct TiktokenTokenizer {
    bpe: tiktoken_rs::CoreBPE,
}

#[cfg(feature = "tiktoken")]
impl Tokenizer for TiktokenTokenizer {
    fn count_tokens(&self, text: &str) -> usize {
        self.bpe.encode_with_special_tokens(text).len()
    }
}

/// Loads the tokenizer for `encoding`, if this build has one.
#[cfg(feature = "tiktoken")]
pub fn load_tokenizer(encoding: &str) -> Option<Box<dyn Tokenizer>> {
    let bpe = match encoding {
        "cl100k_base" => tiktoken_rs::cl100k_base(),
        "o200k_base" => tiktoken_rs::o200k_base(),
        "p50k_base" => tiktoken_rs::p50k_base(),
        "p50k_edit" => tiktoken_rs::p50k_edit(),
        "r50k_base" | "gpt2" => tiktoken_rs::r50k_base(),
        _ => return None,
    };
    match bpe {
        Ok(bpe) => Some(Box::new(TiktokenTokenizer { bpe })),
        Err(e) => {
            debug!(encoding, error = %e, "tokenizer failed to load");
            None
        }
    }
}

/// Loads the tokenizer for `encoding`, if this build has one.
#[cfg(not(feature = "tiktoken"))]
pub fn load_tokenizer(_encoding: &str) -> Option<Box<dyn Tokenizer>> {
    None
}

/// A metric bound to its tokenizer, resolved once per search.
pub struct TextMetric {
    metric: Metric,
    tokenizer: Option<Box<dyn Tokenizer>>,
}

impl fmt::Debug for TextMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextMetric")
            .field("metric", &self.metric)
            .field("tokenizer", &self.tokenizer.is_some())
            .finish()
    }
}

impl TextMetric {
    /// Resolves `metric` for `encoding`.
    ///
    /// A missing tokenizer is not an error: token counts silently degrade
    /// to char counts.
    pub fn new(metric: Metric, encoding: &str) -> Self {
        let tokenizer = match metric {
            Metric::Chars => None,
            Metric::Tokens => {
                let encoding = if encoding.trim().is_empty() {
                    DEFAULT_ENCODING
                } else {
                    encoding.trim()
                };
                let tokenizer = load_tokenizer(encoding);
                if tokenizer.is_none() {
                    debug!(encoding, "no tokenizer available, measuring chars instead");
                }
                tokenizer
            }
        };
        Self { metric, tokenizer }
    }

    /// Uses a caller-supplied tokenizer for the tokens metric.
    pub fn with_tokenizer(tokenizer: Box<dyn Tokenizer>) -> Self {
        Self {
            metric: Metric::Tokens,
            tokenizer: Some(tokenizer),
        }
    }

    /// The requested metric, before any degradation.
    pub fn metric(&self) -> Metric {
        self.metric
    }

    /// Whether token counts come from a real tokenizer.
    pub fn has_tokenizer(&self) -> bool {
        self.tokenizer.is_some()
    }

    /// Size of `text` under this metric.
    pub fn measure(&self, text: &str) -> usize {
        match &self.tokenizer {
            Some(tokenizer) => tokenizer.count_tokens(text),
            None => text.chars().count(),
        }
    }
}

/// Measures `text` once under `metric` and `encoding`.
pub fn measure(text: &str, metric: Metric, encoding: &str) -> usize {
    TextMetric::new(metric, encoding).measure(text)
}
