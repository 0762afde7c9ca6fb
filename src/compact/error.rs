//! Usage errors raised while resolving compact options.

use thiserror::Error;

/// Errors surfaced to the caller before any compact output is produced.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompactError {
    /// A spec token matched no toggle, keyword or profile.
    #[error("unknown compact option '{0}'")]
    UnknownOption(String),

    /// `profile=<name>` named a profile that is not registered.
    #[error("unknown compact profile '{0}'")]
    UnknownProfile(String),

    /// `profile=` was given without a name.
    #[error("compact profile name is required")]
    MissingProfileName,

    /// A registered profile has a missing, non-map or unparseable body.
    #[error("compact profile '{name}' is invalid: {reason}")]
    InvalidProfile {
        /// Profile name as written in the spec.
        name: String,
        /// What was wrong with the body.
        reason: String,
    },

    /// `context=<n>` or `u<n>` carried a value that is not a line count.
    #[error("invalid context value in compact option '{0}'")]
    InvalidContext(String),

    /// A size metric name other than `chars` or `tokens`.
    #[error("unknown size metric '{0}' (expected 'chars' or 'tokens')")]
    UnknownMetric(String),
}
