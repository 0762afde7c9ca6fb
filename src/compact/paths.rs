//! File path discovery for one diff document.

use std::collections::HashMap;

use super::lines::{LineClassifier, LineKind, Noise, Side};
use super::options::OptionSet;

/// Marker that begins a per-file section in unified diff output.
pub const FILE_DIFF_MARKER: &str = "diff --git ";

/// Path rules shared by discovery and rewriting so both agree on what a
/// path is.
#[derive(Debug, Clone, Copy)]
pub struct PathRules<'a> {
    strip: &'a str,
    basename: bool,
}

impl<'a> PathRules<'a> {
    /// Takes the strip and basename settings from `options`.
    pub fn from_options(options: &'a OptionSet) -> Self {
        Self {
            strip: options.path_strip(),
            basename: options.path_basename(),
        }
    }

    /// Extracts the logical path from a `diff --git` header line.
    ///
    /// Prefers the new (`b/`) side and falls back to the old side when the
    /// new side carries no `b/` prefix. Returns `None` when the line does not
    /// name a path.
    pub fn header_path(&self, line: &str) -> Option<String> {
        let rest = line.strip_prefix(FILE_DIFF_MARKER)?.trim_end();
        let raw = split_header_sides(rest)?;
        let path = self.normalize(raw);
        (!path.is_empty()).then_some(path)
    }

    /// Normalizes a path taken from a `---`/`+++` line or a header side.
    pub fn normalize(&self, raw: &str) -> String {
        let raw = raw.trim_end_matches(['\r', '\t']);
        let mut path = raw
            .strip_prefix("a/")
            .or_else(|| raw.strip_prefix("b/"))
            .unwrap_or(raw);

        if !self.strip.is_empty() {
            if let Some(stripped) = path.strip_prefix(self.strip) {
                path = stripped.strip_prefix('/').unwrap_or(stripped);
            }
        }

        if self.basename {
            path = path.rsplit('/').next().unwrap_or(path);
        }

        path.to_string()
    }
}

/// Picks the side of `a/<old> b/<new>` that names the file.
fn split_header_sides(rest: &str) -> Option<&str> {
    // Last " b/" so paths containing spaces still split correctly.
    if let Some(pos) = rest.rfind(" b/") {
        return Some(&rest[pos + 1..]);
    }

    // No-prefix form: "old new". Identical halves are split exactly.
    let len = rest.len();
    if len % 2 == 1 {
        let mid = len / 2;
        if rest.as_bytes()[mid] == b' ' && rest[..mid] == rest[mid + 1..] {
            return Some(&rest[..mid]);
        }
    }

    let mut parts = rest.split_whitespace();
    let old = parts.next()?;
    parts.next()?;
    Some(old)
}

/// Returns the longest shared leading directory, with a trailing `/`.
///
/// Works on whole segments only. Empty when any path has no directory
/// component or the paths share no leading directory.
pub fn common_dir_prefix(paths: &[String]) -> String {
    let mut dirs: Vec<Vec<&str>> = Vec::with_capacity(paths.len());
    for path in paths {
        let Some((dir, _)) = path.rsplit_once('/') else {
            return String::new();
        };
        dirs.push(dir.split('/').collect());
    }

    let Some(first) = dirs.first() else {
        return String::new();
    };
    let min_len = dirs.iter().map(Vec::len).min().unwrap_or(0);

    let shared = (0..min_len)
        .take_while(|&i| dirs.iter().all(|segments| segments[i] == first[i]))
        .count();

    if shared == 0 {
        return String::new();
    }
    format!("{}/", first[..shared].join("/"))
}

/// Every name one file section goes by.
#[derive(Debug, Default)]
struct FileSection {
    header: Option<String>,
    renamed_from: Option<String>,
    renamed_to: Option<String>,
    old_line: Option<String>,
    new_line: Option<String>,
}

impl FileSection {
    /// The table key: the rename target when present, else the header path.
    fn key(&self) -> Option<&String> {
        self.renamed_to.as_ref().or(self.header.as_ref())
    }

    fn names(&self) -> impl Iterator<Item = &String> {
        [
            &self.header,
            &self.renamed_from,
            &self.renamed_to,
            &self.old_line,
            &self.new_line,
        ]
        .into_iter()
        .flatten()
        .filter(|name| name.as_str() != DEV_NULL)
    }
}

const DEV_NULL: &str = "/dev/null";

/// Paths discovered in one document, with optional ids and display names.
#[derive(Debug, Clone, Default)]
pub struct PathTable {
    paths: Vec<String>,
    aliases: HashMap<String, String>,
    ids: HashMap<String, usize>,
    common_prefix: String,
    prefix_token: String,
}

impl PathTable {
    /// Scans the file sections of `lines` in order.
    ///
    /// Each section is keyed by its new name. The other names it goes by
    /// (old side of a rename, `---`/`+++` paths) become aliases of that key
    /// unless they are keys of their own.
    pub fn discover<'a, I>(lines: I, options: &OptionSet) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let rules = PathRules::from_options(options);
        let mut classifier = LineClassifier::new();
        let mut sections: Vec<FileSection> = Vec::new();

        for line in lines {
            match classifier.classify(line) {
                LineKind::FileHeader => sections.push(FileSection {
                    header: rules.header_path(line),
                    ..FileSection::default()
                }),
                LineKind::PathLine(side, raw) => {
                    if let Some(section) = sections.last_mut() {
                        let path = Some(rules.normalize(raw));
                        match side {
                            Side::Old => section.old_line = path,
                            Side::New => section.new_line = path,
                        }
                    }
                }
                LineKind::Noise(Noise::Rename) => {
                    if let Some(section) = sections.last_mut() {
                        if let Some(raw) = line.strip_prefix("rename from ") {
                            section.renamed_from = Some(rules.normalize(raw));
                        } else if let Some(raw) = line.strip_prefix("rename to ") {
                            section.renamed_to = Some(rules.normalize(raw));
                        }
                    }
                }
                _ => {}
            }
        }

        let mut paths: Vec<String> = Vec::new();
        for key in sections.iter().filter_map(FileSection::key) {
            if !key.is_empty() && !paths.contains(key) {
                paths.push(key.clone());
            }
        }

        let mut aliases = HashMap::new();
        for section in &sections {
            let Some(key) = section.key().filter(|key| !key.is_empty()) else {
                continue;
            };
            for name in section.names() {
                if name != key && !paths.contains(name) {
                    aliases.entry(name.clone()).or_insert_with(|| key.clone());
                }
            }
        }

        let common_prefix = if options.path_common_prefix() {
            common_dir_prefix(&paths)
        } else {
            String::new()
        };

        let ids = if options.path_table() {
            paths
                .iter()
                .enumerate()
                .map(|(i, path)| (path.clone(), i + 1))
                .collect()
        } else {
            HashMap::new()
        };

        Self {
            paths,
            aliases,
            ids,
            common_prefix,
            prefix_token: options.path_prefix_token().to_string(),
        }
    }

    /// The table key `path` refers to: itself, or the file it was renamed to.
    pub fn canonical<'p>(&'p self, path: &'p str) -> &'p str {
        self.aliases.get(path).map_or(path, String::as_str)
    }

    /// Discovered paths in first-seen order.
    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    /// Shared directory prefix, empty when unused or absent.
    pub fn common_prefix(&self) -> &str {
        &self.common_prefix
    }

    /// The 1-based table id of `path` or its alias, when the table is active.
    pub fn id(&self, path: &str) -> Option<usize> {
        self.ids.get(self.canonical(path)).copied()
    }

    /// Whether ids were assigned.
    pub fn has_ids(&self) -> bool {
        !self.ids.is_empty()
    }

    /// `path` with the shared directory prefix replaced by the prefix token.
    pub fn display(&self, path: &str) -> String {
        if self.common_prefix.is_empty() {
            return path.to_string();
        }
        match path.strip_prefix(&self.common_prefix) {
            Some(rest) => {
                let rest = rest.trim_start_matches('/');
                if rest.is_empty() {
                    self.prefix_token.clone()
                } else {
                    format!("{}/{rest}", self.prefix_token)
                }
            }
            None => path.to_string(),
        }
    }

    /// Renders the table header and one `id,path` row per path.
    pub fn render_header(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(self.paths.len() + 1);
        lines.push(format!("files[{}]{{id,path}}:", self.paths.len()));
        for (i, path) in self.paths.iter().enumerate() {
            lines.push(format!("  {},{}", i + 1, self.display(path)));
        }
        lines
    }
}
