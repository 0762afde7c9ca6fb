//! Git repository access and patch rendering.

pub mod repository;

pub use repository::{GitRepository, PatchOptions};
