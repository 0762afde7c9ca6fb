//! Compact spec parsing.
//!
//! A spec is a comma-separated list of tokens such as
//! `profile=tight,short-hunk,path-table,u1`. Tokens apply strictly left to
//! right over a base [`OptionSet`], so a later token always overrides an
//! earlier one, including fields set by an earlier profile.

use super::error::CompactError;
use super::options::{OptionFragment, OptionSet};
use super::profiles::ProfileRegistry;

/// Parses `spec` into a new option set merged over `base`.
///
/// Blank tokens are skipped. Unknown tokens and unknown or malformed
/// profiles are usage errors naming the offending token.
pub fn parse_spec(
    spec: &str,
    base: &OptionSet,
    profiles: &ProfileRegistry,
) -> Result<OptionSet, CompactError> {
    spec.split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .try_fold(base.clone(), |options, token| {
            let fragment = resolve_token(token, profiles)?;
            Ok(options.merge(&fragment))
        })
}

/// Resolves one non-empty token to the fragment it stands for.
fn resolve_token(token: &str, profiles: &ProfileRegistry) -> Result<OptionFragment, CompactError> {
    let lower = token.to_ascii_lowercase();

    if lower.starts_with("profile=") {
        let name = token["profile=".len()..].trim();
        if name.is_empty() {
            return Err(CompactError::MissingProfileName);
        }
        return profiles
            .resolve(name)?
            .ok_or_else(|| CompactError::UnknownProfile(name.to_string()));
    }

    if let Some(fragment) = profiles.resolve(token)? {
        return Ok(fragment);
    }

    if let Some(fragment) = toggle(&lower) {
        return Ok(fragment);
    }

    if lower.starts_with("path-strip=") {
        return Ok(OptionFragment {
            path_strip: Some(token["path-strip=".len()..].to_string()),
            ..OptionFragment::default()
        });
    }

    if lower.starts_with("path-prefix-token=") {
        return Ok(OptionFragment {
            path_prefix_token: Some(token["path-prefix-token=".len()..].to_string()),
            ..OptionFragment::default()
        });
    }

    if let Some(value) = lower.strip_prefix("context=") {
        return context_fragment(value, token);
    }

    if let Some(digits) = lower.strip_prefix('u') {
        if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
            return context_fragment(digits, token);
        }
    }

    Err(CompactError::UnknownOption(token.to_string()))
}

fn context_fragment(value: &str, token: &str) -> Result<OptionFragment, CompactError> {
    let context = value
        .trim()
        .parse::<u32>()
        .map_err(|_| CompactError::InvalidContext(token.to_string()))?;
    Ok(OptionFragment {
        context: Some(context),
        ..OptionFragment::default()
    })
}

/// Maps a lowercase toggle keyword to its fragment.
fn toggle(keyword: &str) -> Option<OptionFragment> {
    let mut f = OptionFragment::default();
    match keyword {
        "drop-headers" | "no-headers" => f.drop_headers = Some(true),
        "keep-headers" | "headers" => f.drop_headers = Some(false),
        "no-prefix" | "drop-prefix" => f.no_prefix = Some(true),
        "keep-prefix" | "prefix" => f.no_prefix = Some(false),
        "drop-diff-header" | "no-diff-header" => f.drop_diff_header = Some(true),
        "keep-diff-header" | "diff-header" => f.drop_diff_header = Some(false),
        "short-diff-header" | "short-file-header" => f.short_diff_header = Some(true),
        "long-diff-header" | "full-diff-header" => f.short_diff_header = Some(false),
        "drop-hunk-header" | "no-hunk-header" => f.drop_hunk_header = Some(true),
        "keep-hunk-header" | "hunk-header" => f.drop_hunk_header = Some(false),
        "short-hunk-header" | "short-hunk" => f.short_hunk_header = Some(true),
        "long-hunk-header" | "long-hunk" => f.short_hunk_header = Some(false),
        "drop-filemode" | "no-filemode" => f.drop_filemode = Some(true),
        "keep-filemode" | "filemode" => f.drop_filemode = Some(false),
        "drop-rename" | "no-rename" => f.drop_rename = Some(true),
        "keep-rename" | "rename" => f.drop_rename = Some(false),
        "drop-similarity" | "no-similarity" => f.drop_similarity = Some(true),
        "keep-similarity" | "similarity" => f.drop_similarity = Some(false),
        "drop-binary" | "no-binary" => f.drop_binary = Some(true),
        "keep-binary" | "binary" => f.drop_binary = Some(false),
        "path-basename" | "basename" => f.path_basename = Some(true),
        "path-full" | "no-basename" => f.path_basename = Some(false),
        "path-table" | "path-id" | "path-ids" => {
            f.path_table = Some(true);
            f.short_diff_header = Some(true);
        }
        "no-path-table" | "no-path-id" => f.path_table = Some(false),
        "path-common-prefix" | "common-prefix" => f.path_common_prefix = Some(true),
        "no-common-prefix" | "no-path-common-prefix" => f.path_common_prefix = Some(false),
        "hunk-new-only" | "hunk-new" => f.hunk_new_only = Some(true),
        "hunk-full" | "hunk-both" => f.hunk_new_only = Some(false),
        "prefix-first" | "prefix-first-only" | "run-prefix-first" => {
            f.prefix_first_only = Some(true);
        }
        "prefix-full" | "prefix-all" | "prefix-every" => f.prefix_first_only = Some(false),
        _ => return None,
    }
    Some(f)
}
