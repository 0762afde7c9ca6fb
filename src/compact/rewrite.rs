//! The compact diff rewriter.

use tracing::trace;

use super::lines::{HunkRange, LineClassifier, LineKind, Noise};
use super::options::OptionSet;
use super::paths::{PathRules, PathTable};

/// Rewrites unified diff `text` into its compact form under `options`.
///
/// Pure and deterministic. Empty input is returned as is, and the output
/// ends with a newline exactly when the input does. Lines the options do
/// not explicitly target pass through unchanged.
pub fn rewrite(text: &str, options: &OptionSet) -> String {
    if text.is_empty() {
        return String::new();
    }

    // Split on '\n' only so a trailing '\r' stays part of its line.
    let lines: Vec<&str> = text.strip_suffix('\n').unwrap_or(text).split('\n').collect();
    let table = PathTable::discover(lines.iter().copied(), options);
    trace!(
        lines = lines.len(),
        paths = table.paths().len(),
        common_prefix = table.common_prefix(),
        "rewriting diff"
    );

    let mut out: Vec<String> = Vec::with_capacity(lines.len() + table.paths().len() + 1);
    if table.has_ids() {
        out.extend(table.render_header());
    }

    let mut pass = TransformPass {
        options,
        rules: PathRules::from_options(options),
        table: &table,
        classifier: LineClassifier::new(),
        last_marker: None,
    };
    for line in lines {
        if let Some(rendered) = pass.transform(line) {
            out.push(rendered);
        }
    }

    let mut result = out.join("\n");
    if text.ends_with('\n') {
        result.push('\n');
    }
    result
}

struct TransformPass<'a> {
    options: &'a OptionSet,
    rules: PathRules<'a>,
    table: &'a PathTable,
    classifier: LineClassifier,
    last_marker: Option<char>,
}

impl TransformPass<'_> {
    /// Returns the replacement for `line`, or `None` to drop it.
    fn transform(&mut self, line: &str) -> Option<String> {
        let kind = self.classifier.classify(line);
        let LineKind::Content(marker, body) = kind else {
            self.last_marker = None;
            return self.transform_structural(kind, line);
        };

        if !self.options.prefix_first_only() {
            return Some(line.to_string());
        }
        let repeated = self.last_marker == Some(marker);
        self.last_marker = Some(marker);
        let kept = if repeated { body } else { line };
        Some(kept.to_string())
    }

    fn transform_structural(&self, kind: LineKind<'_>, line: &str) -> Option<String> {
        let options = self.options;
        match kind {
            LineKind::Noise(noise) => {
                let dropped = match noise {
                    Noise::Index => options.drop_headers(),
                    Noise::FileMode => options.drop_filemode(),
                    Noise::Similarity => options.drop_similarity(),
                    Noise::Rename => options.drop_rename(),
                    Noise::Binary => options.drop_binary(),
                };
                (!dropped).then(|| line.to_string())
            }
            LineKind::PathLine(side, raw) => {
                if options.drop_headers() {
                    return None;
                }
                if options.path_table() {
                    if let Some(id) = self.table.id(&self.rules.normalize(raw)) {
                        return Some(format!("{}{id}", side.marker()));
                    }
                }
                Some(line.to_string())
            }
            LineKind::FileHeader => {
                if options.drop_diff_header() {
                    return None;
                }
                if options.short_diff_header() {
                    if let Some(path) = self.rules.header_path(line) {
                        let path = self.table.canonical(&path);
                        return Some(match self.table.id(path) {
                            Some(id) => format!("f {id}"),
                            None => format!("f {}", self.table.display(path)),
                        });
                    }
                }
                Some(line.to_string())
            }
            LineKind::Hunk => {
                if options.drop_hunk_header() {
                    return None;
                }
                if options.short_hunk_header() {
                    if let Some(range) = HunkRange::parse(line) {
                        return Some(range.render(options.hunk_new_only()));
                    }
                }
                Some(line.to_string())
            }
            LineKind::Content(..) | LineKind::Other => Some(line.to_string()),
        }
    }
}
