//! Git repository operations

use std::path::Path;

use anyhow::{Context, Result};
use git2::{Commit, Diff, DiffFindOptions, DiffFormat, DiffOptions, Repository, Tree};
use tracing::debug;

use crate::compact::OptionSet;

/// How patch text is produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PatchOptions {
    /// Context lines around each change; git's default when unset.
    pub context_lines: Option<u32>,
    /// Omit the `a/` and `b/` path prefixes.
    pub no_prefix: bool,
}

impl PatchOptions {
    /// Producer settings implied by compact options.
    pub fn from_compact(options: &OptionSet) -> Self {
        Self {
            context_lines: Some(options.context()),
            no_prefix: options.no_prefix(),
        }
    }

    /// Replaces the context when `context` is set.
    pub fn with_context(mut self, context: Option<u32>) -> Self {
        if context.is_some() {
            self.context_lines = context;
        }
        self
    }

    fn diff_options(&self) -> DiffOptions {
        let mut opts = DiffOptions::new();
        if let Some(lines) = self.context_lines {
            opts.context_lines(lines);
        }
        if self.no_prefix {
            opts.old_prefix("").new_prefix("");
        }
        opts
    }
}

/// Git repository wrapper
pub struct GitRepository {
    repo: Repository,
}

impl GitRepository {
    /// Open repository at current directory
    pub fn open() -> Result<Self> {
        let repo = Repository::open_from_env().context("Not in a git repository")?;

        Ok(Self { repo })
    }

    /// Open repository at specified path
    pub fn open_at<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Repository::open(path).context("Failed to open git repository")?;

        Ok(Self { repo })
    }

    /// Get access to the underlying git2::Repository
    pub fn repository(&self) -> &Repository {
        &self.repo
    }

    /// Unstaged changes: index against working tree.
    pub fn diff_workdir(&self, options: &PatchOptions) -> Result<String> {
        let mut opts = options.diff_options();
        let mut diff = self
            .repo
            .diff_index_to_workdir(None, Some(&mut opts))
            .context("Failed to diff index against working tree")?;
        detect_renames(&mut diff)?;
        render_patch(&diff)
    }

    /// Staged changes: HEAD against index.
    pub fn diff_cached(&self, options: &PatchOptions) -> Result<String> {
        let head = self.head_tree()?;
        let mut opts = options.diff_options();
        let mut diff = self
            .repo
            .diff_tree_to_index(head.as_ref(), None, Some(&mut opts))
            .context("Failed to diff HEAD against index")?;
        detect_renames(&mut diff)?;
        render_patch(&diff)
    }

    /// `A..B` compares two revisions; a single revision is compared
    /// against the working tree.
    pub fn diff_range(&self, range: &str, options: &PatchOptions) -> Result<String> {
        let mut opts = options.diff_options();

        let mut diff = if let Some((start, end)) = range.split_once("..") {
            if end.starts_with('.') {
                anyhow::bail!("Symmetric ranges are not supported: {}", range);
            }
            let start_tree = self.rev_tree(or_head(start))?;
            let end_tree = self.rev_tree(or_head(end))?;
            self.repo
                .diff_tree_to_tree(Some(&start_tree), Some(&end_tree), Some(&mut opts))
                .with_context(|| format!("Failed to diff range: {}", range))?
        } else {
            let tree = self.rev_tree(range)?;
            self.repo
                .diff_tree_to_workdir_with_index(Some(&tree), Some(&mut opts))
                .with_context(|| format!("Failed to diff {} against working tree", range))?
        };

        detect_renames(&mut diff)?;
        render_patch(&diff)
    }

    /// A commit against its first parent, or the empty tree for a root
    /// commit, preceded by a `commit <sha>` line and the message summary.
    pub fn show(&self, rev: &str, options: &PatchOptions) -> Result<String> {
        let commit = self.rev_commit(rev)?;
        let commit_tree = commit.tree().context("Failed to get commit tree")?;

        let parent_tree = if commit.parent_count() > 0 {
            Some(
                commit
                    .parent(0)
                    .context("Failed to get parent commit")?
                    .tree()
                    .context("Failed to get parent tree")?,
            )
        } else {
            None
        };

        let mut opts = options.diff_options();
        let mut diff = self
            .repo
            .diff_tree_to_tree(parent_tree.as_ref(), Some(&commit_tree), Some(&mut opts))
            .context("Failed to create diff")?;
        detect_renames(&mut diff)?;

        let mut out = commit_preamble(&commit);
        out.push_str(&render_patch(&diff)?);
        Ok(out)
    }

    fn head_tree(&self) -> Result<Option<Tree<'_>>> {
        match self.repo.head() {
            Ok(head) => Ok(Some(
                head.peel_to_tree().context("Failed to peel HEAD to tree")?,
            )),
            // Unborn branch: everything staged is new.
            Err(e) if e.code() == git2::ErrorCode::UnbornBranch => Ok(None),
            Err(e) => Err(e).context("Failed to get HEAD reference"),
        }
    }

    fn rev_commit(&self, rev: &str) -> Result<Commit<'_>> {
        self.repo
            .revparse_single(rev)
            .with_context(|| format!("Failed to parse revision: {}", rev))?
            .peel_to_commit()
            .with_context(|| format!("Revision is not a commit: {}", rev))
    }

    fn rev_tree(&self, rev: &str) -> Result<Tree<'_>> {
        self.rev_commit(rev)?
            .tree()
            .with_context(|| format!("Failed to get tree for: {}", rev))
    }
}

fn or_head(rev: &str) -> &str {
    if rev.is_empty() {
        "HEAD"
    } else {
        rev
    }
}

fn detect_renames(diff: &mut Diff<'_>) -> Result<()> {
    let mut find = DiffFindOptions::new();
    find.renames(true);
    diff.find_similar(Some(&mut find))
        .context("Failed to detect renames")
}

fn commit_preamble(commit: &Commit<'_>) -> String {
    let author = commit.author();
    let mut out = format!("commit {}\n", commit.id());
    out.push_str(&format!(
        "Author: {} <{}>\n\n",
        author.name().unwrap_or("<unknown>"),
        author.email().unwrap_or("")
    ));
    if let Some(summary) = commit.summary() {
        out.push_str(&format!("    {}\n\n", summary));
    }
    out
}

/// Renders `diff` as unified patch text.
fn render_patch(diff: &Diff<'_>) -> Result<String> {
    let mut patch = String::new();

    diff.print(DiffFormat::Patch, |_delta, _hunk, line| {
        let content = String::from_utf8_lossy(line.content());
        let prefix = match line.origin() {
            '+' => "+",
            '-' => "-",
            ' ' => " ",
            _ => "",
        };
        patch.push_str(prefix);
        patch.push_str(&content);
        true
    })
    .context("Failed to format diff")?;

    debug!(bytes = patch.len(), "rendered patch");
    Ok(patch)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use git2::Signature;
    use std::fs;
    use tempfile::TempDir;

    struct Scratch {
        dir: TempDir,
        repo: GitRepository,
    }

    impl Scratch {
        fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            let repo = Repository::init(dir.path()).unwrap();
            {
                let mut config = repo.config().unwrap();
                config.set_str("user.name", "Test User").unwrap();
                config.set_str("user.email", "test@example.com").unwrap();
            }
            drop(repo);
            let repo = GitRepository::open_at(dir.path()).unwrap();
            Self { dir, repo }
        }

        fn write(&self, path: &str, content: &str) {
            let full = self.dir.path().join(path);
            if let Some(parent) = full.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            fs::write(full, content).unwrap();
        }

        fn stage(&self, path: &str) {
            let mut index = self.repo.repository().index().unwrap();
            index.add_path(Path::new(path)).unwrap();
            index.write().unwrap();
        }

        fn commit(&self, message: &str) -> git2::Oid {
            let repo = self.repo.repository();
            let mut index = repo.index().unwrap();
            let tree_id = index.write_tree().unwrap();
            let tree = repo.find_tree(tree_id).unwrap();
            let sig = Signature::now("Test User", "test@example.com").unwrap();
            let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
            let parents: Vec<&Commit<'_>> = parent.iter().collect();
            repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
                .unwrap()
        }
    }

    #[test]
    fn workdir_diff_shows_unstaged_change() {
        let scratch = Scratch::new();
        scratch.write("a.txt", "one\ntwo\n");
        scratch.stage("a.txt");
        scratch.commit("init");
        scratch.write("a.txt", "one\ntwo\nthree\n");

        let patch = scratch.repo.diff_workdir(&PatchOptions::default()).unwrap();
        assert!(patch.starts_with("diff --git a/a.txt b/a.txt\n"));
        assert!(patch.contains("\n+three\n"));
        assert!(patch.contains("\n one\n"));
    }

    #[test]
    fn no_prefix_and_zero_context() {
        let scratch = Scratch::new();
        scratch.write("a.txt", "one\ntwo\n");
        scratch.stage("a.txt");
        scratch.commit("init");
        scratch.write("a.txt", "one\ntwo\nthree\n");

        let options = PatchOptions {
            context_lines: Some(0),
            no_prefix: true,
        };
        let patch = scratch.repo.diff_workdir(&options).unwrap();
        assert!(patch.starts_with("diff --git a.txt a.txt\n"));
        assert!(patch.contains("+++ a.txt\n"));
        assert!(!patch.contains("\n one\n"));
    }

    #[test]
    fn cached_diff_on_unborn_branch() {
        let scratch = Scratch::new();
        scratch.write("new.txt", "hello\n");
        scratch.stage("new.txt");

        let patch = scratch.repo.diff_cached(&PatchOptions::default()).unwrap();
        assert!(patch.contains("new file mode"));
        assert!(patch.contains("+hello\n"));
    }

    #[test]
    fn cached_diff_detects_renames() {
        let scratch = Scratch::new();
        let body = "line one\nline two\nline three\nline four\n";
        scratch.write("old.rs", body);
        scratch.stage("old.rs");
        scratch.commit("init");

        fs::rename(scratch.dir.path().join("old.rs"), scratch.dir.path().join("new.rs")).unwrap();
        let mut index = scratch.repo.repository().index().unwrap();
        index.remove_path(Path::new("old.rs")).unwrap();
        index.add_path(Path::new("new.rs")).unwrap();
        index.write().unwrap();

        let options = PatchOptions {
            context_lines: Some(0),
            no_prefix: true,
        };
        let patch = scratch.repo.diff_cached(&options).unwrap();
        assert!(patch.starts_with("diff --git old.rs new.rs\n"));
        assert!(patch.contains("rename from old.rs\n"));
        assert!(patch.contains("rename to new.rs\n"));
        assert!(!patch.contains("deleted file mode"));
    }

    #[test]
    fn show_root_commit_has_preamble() {
        let scratch = Scratch::new();
        scratch.write("src/lib.rs", "fn a() {}\n");
        scratch.stage("src/lib.rs");
        let oid = scratch.commit("Add lib\n\nLonger body.");

        let out = scratch.repo.show("HEAD", &PatchOptions::default()).unwrap();
        assert!(out.starts_with(&format!("commit {}\n", oid)));
        assert!(out.contains("\n    Add lib\n"));
        assert!(!out.contains("Longer body"));
        assert!(out.contains("diff --git a/src/lib.rs b/src/lib.rs\n"));
        assert!(out.contains("+fn a() {}\n"));
    }

    #[test]
    fn range_between_commits() {
        let scratch = Scratch::new();
        scratch.write("a.txt", "one\n");
        scratch.stage("a.txt");
        scratch.commit("first");
        scratch.write("a.txt", "one\ntwo\n");
        scratch.stage("a.txt");
        scratch.commit("second");

        let patch = scratch
            .repo
            .diff_range("HEAD~1..HEAD", &PatchOptions::default())
            .unwrap();
        assert!(patch.contains("+two\n"));

        let open_ended = scratch
            .repo
            .diff_range("HEAD~1..", &PatchOptions::default())
            .unwrap();
        assert_eq!(patch, open_ended);
    }

    #[test]
    fn bad_revision_is_an_error() {
        let scratch = Scratch::new();
        scratch.write("a.txt", "one\n");
        scratch.stage("a.txt");
        scratch.commit("first");
        assert!(scratch
            .repo
            .diff_range("no-such-rev", &PatchOptions::default())
            .is_err());
        assert!(scratch
            .repo
            .diff_range("HEAD...HEAD", &PatchOptions::default())
            .is_err());
    }

    #[test]
    fn compact_options_drive_patch_options() {
        let compact = OptionSet::default();
        let options = PatchOptions::from_compact(&compact);
        assert_eq!(options.context_lines, Some(0));
        assert!(options.no_prefix);
        assert_eq!(options.with_context(Some(5)).context_lines, Some(5));
        assert_eq!(options.with_context(None).context_lines, Some(0));
    }
}
