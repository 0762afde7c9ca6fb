//! Auto-tune search over candidate compact specs.

use tracing::debug;

use super::error::CompactError;
use super::metric::TextMetric;
use super::options::OptionSet;
use super::profiles::ProfileRegistry;
use super::rewrite::rewrite;
use super::spec::parse_spec;

/// One evaluated trial: the options, the text they produced and its score.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateResult {
    /// Options that produced `text`.
    pub options: OptionSet,
    /// The rewritten output.
    pub text: String,
    /// Size of `text` under the search metric.
    pub score: usize,
}

impl CandidateResult {
    fn evaluate(text: &str, options: OptionSet, metric: &TextMetric) -> Self {
        let rendered = rewrite(text, &options);
        let score = metric.measure(&rendered);
        Self {
            options,
            text: rendered,
            score,
        }
    }
}

/// Greedily searches `candidates` for the smallest rendering of `text`.
///
/// The base options are scored first. Each non-blank candidate is parsed
/// over the current champion's options, not the original base, and
/// replaces the champion only when strictly smaller, so ties keep the
/// earlier result. A candidate that fails to parse aborts the search.
pub fn search<S: AsRef<str>>(
    text: &str,
    base: &OptionSet,
    candidates: &[S],
    metric: &TextMetric,
    profiles: &ProfileRegistry,
) -> Result<CandidateResult, CompactError> {
    let initial = CandidateResult::evaluate(text, base.clone(), metric);
    debug!(score = initial.score, metric = %metric.metric(), "auto-tune baseline");
    if text.is_empty() {
        return Ok(initial);
    }

    candidates
        .iter()
        .map(|candidate| candidate.as_ref().trim())
        .filter(|candidate| !candidate.is_empty())
        .try_fold(initial, |best, candidate| {
            let options = parse_spec(candidate, &best.options, profiles)?;
            let trial = CandidateResult::evaluate(text, options, metric);
            let improved = trial.score < best.score;
            debug!(candidate, score = trial.score, best = best.score, improved, "auto-tune candidate");
            Ok(if improved { trial } else { best })
        })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::compact::metric::{Metric, Tokenizer};
    use crate::compact::options::OptionFragment;

    fn chars() -> TextMetric {
        TextMetric::new(Metric::Chars, "")
    }

    fn base() -> OptionSet {
        OptionSet::default().merge(&OptionFragment {
            drop_headers: Some(false),
            ..OptionFragment::default()
        })
    }

    const DOC: &str = "\
diff --git a/src/lib/alpha.rs b/src/lib/alpha.rs
index 1111111..2222222 100644
--- a/src/lib/alpha.rs
+++ b/src/lib/alpha.rs
@@ -10,5 +10,6 @@ impl Alpha {
+one
+two
+three
";

    #[test]
    fn empty_candidates_return_base() {
        let result = search::<&str>(DOC, &base(), &[], &chars(), &ProfileRegistry::new()).unwrap();
        assert_eq!(result.text, rewrite(DOC, &base()));
        assert_eq!(result.options, base());
    }

    #[test]
    fn empty_text_short_circuits() {
        let result = search("", &base(), &["bogus"], &chars(), &ProfileRegistry::new()).unwrap();
        assert_eq!(result.text, "");
        assert_eq!(result.score, 0);
    }

    #[test]
    fn picks_smaller_candidate() {
        let result = search(
            DOC,
            &base(),
            &["drop-headers", "short-hunk"],
            &chars(),
            &ProfileRegistry::new(),
        )
        .unwrap();
        assert!(result.options.drop_headers());
        assert!(result.options.short_hunk_header());
        assert!(result.text.contains("@ 10,5 10,6"));
        assert!(!result.text.contains("index "));
    }

    #[test]
    fn candidates_compose_with_current_champion() {
        // "hunk-new" alone changes nothing, so it only wins after "short-hunk" did.
        let result = search(
            DOC,
            &base(),
            &["short-hunk", "hunk-new"],
            &chars(),
            &ProfileRegistry::new(),
        )
        .unwrap();
        assert!(result.options.short_hunk_header());
        assert!(result.options.hunk_new_only());
        assert!(result.text.contains("\n@ 10\n"));
    }

    #[test]
    fn candidate_order_matters() {
        let result = search(
            DOC,
            &base(),
            &["hunk-new", "short-hunk"],
            &chars(),
            &ProfileRegistry::new(),
        )
        .unwrap();
        assert!(result.options.short_hunk_header());
        assert!(!result.options.hunk_new_only());
        assert!(result.text.contains("\n@ 10,5 10,6\n"));
    }

    #[test]
    fn ties_keep_the_earlier_result() {
        // keep-filemode changes nothing, so its score ties the baseline.
        let result = search(
            DOC,
            &base(),
            &["keep-filemode", "drop-filemode"],
            &chars(),
            &ProfileRegistry::new(),
        )
        .unwrap();
        assert_eq!(result.options, base());
    }

    #[test]
    fn equal_length_candidate_loses_to_base() {
        // Every rendering scores 120, so the base must win.
        struct Fixed;
        impl Tokenizer for Fixed {
            fn count_tokens(&self, _text: &str) -> usize {
                120
            }
        }
        let metric = TextMetric::with_tokenizer(Box::new(Fixed));
        let result = search(DOC, &base(), &["drop-headers"], &metric, &ProfileRegistry::new())
            .unwrap();
        assert_eq!(result.score, 120);
        assert_eq!(result.text, rewrite(DOC, &base()));
    }

    #[test]
    fn blank_candidates_are_skipped() {
        let result = search(
            DOC,
            &base(),
            &["", "   ", "short-hunk"],
            &chars(),
            &ProfileRegistry::new(),
        )
        .unwrap();
        assert!(result.options.short_hunk_header());
    }

    #[test]
    fn bad_candidate_is_a_usage_error() {
        let err = search(DOC, &base(), &["short-hunk,wat"], &chars(), &ProfileRegistry::new())
            .unwrap_err();
        assert_eq!(err, CompactError::UnknownOption("wat".to_string()));
    }

    #[test]
    fn candidates_may_reference_profiles() {
        let profiles: ProfileRegistry =
            serde_yaml::from_str("tight:\n  drop_headers: true\n  short_hunk_header: true\n")
                .unwrap();
        let result = search(DOC, &base(), &["profile=tight"], &chars(), &profiles).unwrap();
        assert!(result.options.drop_headers());
        assert!(result.options.short_hunk_header());
    }

    mod prop {
        use super::*;
        use proptest::prelude::*;

        const SPECS: &[&str] = &[
            "drop-headers",
            "keep-headers",
            "short-hunk",
            "hunk-new",
            "path-table",
            "prefix-first",
            "prefix-full",
            "common-prefix",
            "basename",
            "drop-hunk-header",
            "",
        ];

        proptest! {
            #[test]
            fn search_never_worse_than_base(
                picks in proptest::collection::vec(proptest::sample::select(SPECS), 0..6)
            ) {
                let metric = chars();
                let baseline = metric.measure(&rewrite(DOC, &base()));
                let result = search(DOC, &base(), &picks[..], &metric, &ProfileRegistry::new()).unwrap();
                prop_assert!(result.score <= baseline);
                prop_assert_eq!(result.score, metric.measure(&result.text));
            }
        }
    }
}
