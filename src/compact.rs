//! Compact diff transformation engine.
//!
//! Rewrites unified diff text into a smaller rendering under an
//! [`OptionSet`], and optionally searches a list of candidate specs for the
//! smallest rendering under a size [`Metric`].

pub mod compactor;
pub mod error;
pub mod lines;
pub mod metric;
pub mod options;
pub mod paths;
pub mod profiles;
pub mod rewrite;
pub mod spec;
pub mod tune;

pub use compactor::{AutoTune, Compactor};
pub use error::CompactError;
pub use metric::{measure, Metric, TextMetric, Tokenizer};
pub use options::{OptionFragment, OptionSet};
pub use profiles::ProfileRegistry;
pub use rewrite::rewrite;
pub use spec::parse_spec;
pub use tune::{search, CandidateResult};
