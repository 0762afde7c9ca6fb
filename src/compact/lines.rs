//! Line classification for unified diff text.
//!
//! Each input line is tagged with exactly one [`LineKind`]. The rewriter
//! dispatches on the tag; anything unrecognised is [`LineKind::Other`] and
//! passes through untouched.

use std::sync::LazyLock;

use regex::Regex;

use super::paths::FILE_DIFF_MARKER;

static HUNK_RANGE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^@@ -(\d+)(?:,(\d+))? \+(\d+)(?:,(\d+))? @@").unwrap());

/// Header noise that option flags can drop wholesale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Noise {
    /// `index <sha>..<sha>`.
    Index,
    /// `new file mode` / `deleted file mode`.
    FileMode,
    /// `similarity index` / `dissimilarity index`.
    Similarity,
    /// `rename from|to`, `copy from|to`.
    Rename,
    /// `Binary files ... differ`, `GIT binary patch`.
    Binary,
}

/// Which side a long-form path line names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// `--- <path>`.
    Old,
    /// `+++ <path>`.
    New,
}

impl Side {
    /// The literal marker, including its trailing space.
    pub fn marker(self) -> &'static str {
        match self {
            Side::Old => "--- ",
            Side::New => "+++ ",
        }
    }
}

/// Numeric fields of an `@@ -a,b +c,d @@` line, kept as written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HunkRange<'a> {
    /// First old line.
    pub old_start: &'a str,
    /// Old line count, `"1"` when omitted.
    pub old_len: &'a str,
    /// First new line.
    pub new_start: &'a str,
    /// New line count, `"1"` when omitted.
    pub new_len: &'a str,
}

impl<'a> HunkRange<'a> {
    /// Matches the fixed numeric hunk pattern.
    pub fn parse(line: &'a str) -> Option<Self> {
        let caps = HUNK_RANGE_PATTERN.captures(line)?;
        let field = |i: usize| caps.get(i).map(|m| m.as_str());
        Some(Self {
            old_start: field(1)?,
            old_len: field(2).unwrap_or("1"),
            new_start: field(3)?,
            new_len: field(4).unwrap_or("1"),
        })
    }

    /// Compact `@ a,b c,d` form, or `@ c` when only the new start is kept.
    pub fn render(&self, new_only: bool) -> String {
        if new_only {
            format!("@ {}", self.new_start)
        } else {
            format!(
                "@ {},{} {},{}",
                self.old_start, self.old_len, self.new_start, self.new_len
            )
        }
    }
}

/// The tag of one input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind<'a> {
    /// `diff --git ...`.
    FileHeader,
    /// Droppable header noise.
    Noise(Noise),
    /// `--- path` or `+++ path` before the first hunk of a file.
    PathLine(Side, &'a str),
    /// `@@ ...`.
    Hunk,
    /// `+`, `-` or space followed by the line body.
    Content(char, &'a str),
    /// Anything else.
    Other,
}

/// Tags lines in document order.
///
/// Tracks whether a hunk body is open so that `--- `/`+++ ` inside a hunk
/// are read as removed or added content instead of path headers.
#[derive(Debug, Default)]
pub struct LineClassifier {
    in_hunk: bool,
}

impl LineClassifier {
    /// Creates a classifier positioned before any file section.
    pub fn new() -> Self {
        Self::default()
    }

    /// Tags `line` and advances the section state.
    pub fn classify<'a>(&mut self, line: &'a str) -> LineKind<'a> {
        if line.starts_with(FILE_DIFF_MARKER) {
            self.in_hunk = false;
            return LineKind::FileHeader;
        }
        if line.starts_with("@@ ") {
            self.in_hunk = true;
            return LineKind::Hunk;
        }

        if !self.in_hunk {
            if let Some(kind) = classify_header(line) {
                return kind;
            }
        }

        match line.chars().next() {
            Some(marker @ ('+' | '-' | ' ')) => LineKind::Content(marker, &line[1..]),
            _ => {
                if line.starts_with("commit ") {
                    self.in_hunk = false;
                }
                LineKind::Other
            }
        }
    }
}

fn classify_header(line: &str) -> Option<LineKind<'_>> {
    const NOISE: &[(&str, Noise)] = &[
        ("index ", Noise::Index),
        ("new file mode ", Noise::FileMode),
        ("deleted file mode ", Noise::FileMode),
        ("similarity index ", Noise::Similarity),
        ("dissimilarity index ", Noise::Similarity),
        ("rename from ", Noise::Rename),
        ("rename to ", Noise::Rename),
        ("copy from ", Noise::Rename),
        ("copy to ", Noise::Rename),
        ("Binary files ", Noise::Binary),
        ("GIT binary patch", Noise::Binary),
    ];

    if let Some(path) = line.strip_prefix(Side::Old.marker()) {
        return Some(LineKind::PathLine(Side::Old, path));
    }
    if let Some(path) = line.strip_prefix(Side::New.marker()) {
        return Some(LineKind::PathLine(Side::New, path));
    }
    NOISE
        .iter()
        .find(|(prefix, _)| line.starts_with(prefix))
        .map(|&(_, noise)| LineKind::Noise(noise))
}
