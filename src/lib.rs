//! # git-router
//!
//! Git diff and show output with an optional compact rendering for
//! size-constrained consumers.
//!
//! ## Quick Start
//!
//! ```rust
//! use git_router::compact::{rewrite, OptionSet};
//!
//! let diff = "diff --git a/x.rs b/x.rs\nindex 1..2 100644\n@@ -1,2 +1,3 @@\n+new\n";
//! let compact = rewrite(diff, &OptionSet::default());
//! assert_eq!(compact, "diff --git a/x.rs b/x.rs\n@@ -1,2 +1,3 @@\n+new\n");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod cli;
pub mod compact;
pub mod config;
pub mod git;

pub use crate::cli::Cli;

/// The current version of git-router.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
