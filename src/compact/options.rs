//! Shaping options for one compact rewrite pass.

use serde::{Deserialize, Serialize};

/// Token substituted for a shared directory prefix when none is configured.
pub const DEFAULT_PATH_PREFIX_TOKEN: &str = "...";

/// The full, immutable configuration for one rewrite pass.
///
/// Values are only produced by [`OptionSet::default`] and [`OptionSet::merge`],
/// both of which keep `path_table` coupled to `short_diff_header`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionSet {
    context: u32,
    drop_headers: bool,
    no_prefix: bool,
    drop_diff_header: bool,
    drop_hunk_header: bool,
    short_diff_header: bool,
    short_hunk_header: bool,
    drop_filemode: bool,
    drop_rename: bool,
    drop_similarity: bool,
    drop_binary: bool,
    path_strip: String,
    path_basename: bool,
    path_table: bool,
    path_common_prefix: bool,
    path_prefix_token: String,
    hunk_new_only: bool,
    prefix_first_only: bool,
}

impl Default for OptionSet {
    fn default() -> Self {
        Self {
            context: 0,
            drop_headers: true,
            no_prefix: true,
            drop_diff_header: false,
            drop_hunk_header: false,
            short_diff_header: false,
            short_hunk_header: false,
            drop_filemode: false,
            drop_rename: false,
            drop_similarity: false,
            drop_binary: false,
            path_strip: String::new(),
            path_basename: false,
            path_table: false,
            path_common_prefix: false,
            path_prefix_token: DEFAULT_PATH_PREFIX_TOKEN.to_string(),
            hunk_new_only: false,
            prefix_first_only: false,
        }
    }
}

/// A partial override of an [`OptionSet`].
///
/// Used for config defaults, named profiles and single spec tokens. Unset
/// fields leave the base value alone; unknown keys are rejected on load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OptionFragment {
    /// Unified-diff context lines.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<u32>,
    /// Drop `index`, `---` and `+++` lines.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drop_headers: Option<bool>,
    /// Ask the producer for paths without `a/` and `b/`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub no_prefix: Option<bool>,
    /// Drop `diff --git` lines.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drop_diff_header: Option<bool>,
    /// Drop `@@` hunk range lines.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drop_hunk_header: Option<bool>,
    /// Replace `diff --git` lines with a short `f <path>` marker.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_diff_header: Option<bool>,
    /// Replace `@@` lines with a numeric `@ <ranges>` marker.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_hunk_header: Option<bool>,
    /// Drop new/deleted file mode lines.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drop_filemode: Option<bool>,
    /// Drop rename and copy from/to lines.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drop_rename: Option<bool>,
    /// Drop similarity and dissimilarity index lines.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drop_similarity: Option<bool>,
    /// Drop binary patch marker lines.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drop_binary: Option<bool>,
    /// Leading path component to strip from every file path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_strip: Option<String>,
    /// Reduce every file path to its final component.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_basename: Option<bool>,
    /// Emit a path table and reference files by numeric id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_table: Option<bool>,
    /// Replace the shared directory prefix with `path_prefix_token`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_common_prefix: Option<bool>,
    /// Token that stands in for the shared directory prefix.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_prefix_token: Option<String>,
    /// Keep only the new start line in short hunk markers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hunk_new_only: Option<bool>,
    /// Keep the `+`/`-`/space marker only on the first line of a run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix_first_only: Option<bool>,
}

impl OptionSet {
    /// Returns a new set with every field present in `fragment` applied over `self`.
    pub fn merge(&self, fragment: &OptionFragment) -> Self {
        fn pick<T: Clone>(over: Option<&T>, base: &T) -> T {
            over.unwrap_or(base).clone()
        }

        let mut merged = Self {
            context: pick(fragment.context.as_ref(), &self.context),
            drop_headers: pick(fragment.drop_headers.as_ref(), &self.drop_headers),
            no_prefix: pick(fragment.no_prefix.as_ref(), &self.no_prefix),
            drop_diff_header: pick(fragment.drop_diff_header.as_ref(), &self.drop_diff_header),
            drop_hunk_header: pick(fragment.drop_hunk_header.as_ref(), &self.drop_hunk_header),
            short_diff_header: pick(fragment.short_diff_header.as_ref(), &self.short_diff_header),
            short_hunk_header: pick(fragment.short_hunk_header.as_ref(), &self.short_hunk_header),
            drop_filemode: pick(fragment.drop_filemode.as_ref(), &self.drop_filemode),
            drop_rename: pick(fragment.drop_rename.as_ref(), &self.drop_rename),
            drop_similarity: pick(fragment.drop_similarity.as_ref(), &self.drop_similarity),
            drop_binary: pick(fragment.drop_binary.as_ref(), &self.drop_binary),
            path_strip: pick(fragment.path_strip.as_ref(), &self.path_strip),
            path_basename: pick(fragment.path_basename.as_ref(), &self.path_basename),
            path_table: pick(fragment.path_table.as_ref(), &self.path_table),
            path_common_prefix: pick(fragment.path_common_prefix.as_ref(), &self.path_common_prefix),
            path_prefix_token: pick(fragment.path_prefix_token.as_ref(), &self.path_prefix_token),
            hunk_new_only: pick(fragment.hunk_new_only.as_ref(), &self.hunk_new_only),
            prefix_first_only: pick(fragment.prefix_first_only.as_ref(), &self.prefix_first_only),
        };

        if merged.path_table {
            merged.short_diff_header = true;
        }
        if merged.path_prefix_token.is_empty() {
            merged.path_prefix_token = DEFAULT_PATH_PREFIX_TOKEN.to_string();
        }
        merged
    }

    /// Unified-diff context lines to request from the producer.
    pub fn context(&self) -> u32 {
        self.context
    }

    /// Whether `index`, `---` and `+++` lines are dropped.
    pub fn drop_headers(&self) -> bool {
        self.drop_headers
    }

    /// Whether the producer should omit `a/` and `b/` path prefixes.
    pub fn no_prefix(&self) -> bool {
        self.no_prefix
    }

    /// Whether `diff --git` lines are dropped.
    pub fn drop_diff_header(&self) -> bool {
        self.drop_diff_header
    }

    /// Whether `@@` lines are dropped.
    pub fn drop_hunk_header(&self) -> bool {
        self.drop_hunk_header
    }

    /// Whether `diff --git` lines become `f <path>` markers.
    pub fn short_diff_header(&self) -> bool {
        self.short_diff_header
    }

    /// Whether `@@` lines become numeric `@` markers.
    pub fn short_hunk_header(&self) -> bool {
        self.short_hunk_header
    }

    /// Whether file mode lines are dropped.
    pub fn drop_filemode(&self) -> bool {
        self.drop_filemode
    }

    /// Whether rename and copy lines are dropped.
    pub fn drop_rename(&self) -> bool {
        self.drop_rename
    }

    /// Whether similarity lines are dropped.
    pub fn drop_similarity(&self) -> bool {
        self.drop_similarity
    }

    /// Whether binary patch markers are dropped.
    pub fn drop_binary(&self) -> bool {
        self.drop_binary
    }

    /// Leading path component stripped from file paths; empty when unused.
    pub fn path_strip(&self) -> &str {
        &self.path_strip
    }

    /// Whether paths are reduced to their final component.
    pub fn path_basename(&self) -> bool {
        self.path_basename
    }

    /// Whether a path table is emitted. Implies [`Self::short_diff_header`].
    pub fn path_table(&self) -> bool {
        self.path_table
    }

    /// Whether the shared directory prefix is replaced by a token.
    pub fn path_common_prefix(&self) -> bool {
        self.path_common_prefix
    }

    /// Replacement token for the shared directory prefix. Never empty.
    pub fn path_prefix_token(&self) -> &str {
        &self.path_prefix_token
    }

    /// Whether short hunk markers keep only the new start line.
    pub fn hunk_new_only(&self) -> bool {
        self.hunk_new_only
    }

    /// Whether repeated line markers are collapsed within a run.
    pub fn prefix_first_only(&self) -> bool {
        self.prefix_first_only
    }
}
