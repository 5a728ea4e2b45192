//! Walking the commit history newest first

use std::path::Path;

use chrono::{TimeZone, Utc};
use git2::{DiffOptions, Sort};
use tracing::{debug, instrument};

use crate::repository::{GitRepo, Result};
use crate::types::CommitInfo;

impl GitRepo {
    /// Get commits reachable from HEAD, newest first.
    ///
    /// With `path` set, only commits that change something below that
    /// directory (relative to the repository root) are returned.
    #[instrument(skip(self), fields(path = ?path))]
    pub fn history(&self, path: Option<&Path>) -> Result<Vec<CommitInfo>> {
        let head = self.head_commit()?;

        let mut revwalk = self.repo.revwalk()?;
        revwalk.set_sorting(Sort::TOPOLOGICAL | Sort::TIME)?;
        revwalk.push(head.id())?;

        let mut commits = Vec::new();
        let mut skipped = 0usize;

        for oid in revwalk {
            let oid = oid?;
            let commit = self.repo.find_commit(oid)?;

            if let Some(path) = path {
                if !self.touches_path(&commit, path)? {
                    skipped += 1;
                    continue;
                }
            }

            commits.push(commit_to_info(&commit));
        }

        debug!(count = commits.len(), skipped, "walked commit history");
        Ok(commits)
    }

    /// Whether a commit changes anything below `path` compared to its first parent
    fn touches_path(&self, commit: &git2::Commit<'_>, path: &Path) -> Result<bool> {
        let tree = commit.tree()?;
        let parent_tree = match commit.parent(0) {
            Ok(parent) => Some(parent.tree()?),
            Err(_) => None,
        };

        let mut options = DiffOptions::new();
        options.pathspec(path);

        let diff =
            self.repo
                .diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), Some(&mut options))?;
        Ok(diff.deltas().len() > 0)
    }
}

fn commit_to_info(commit: &git2::Commit<'_>) -> CommitInfo {
    let author = commit.author();
    let timestamp = Utc
        .timestamp_opt(commit.time().seconds(), 0)
        .single()
        .unwrap_or_else(Utc::now);

    CommitInfo::new(
        commit.id().to_string(),
        commit.summary().unwrap_or_default(),
        String::from_utf8_lossy(author.name_bytes()),
        String::from_utf8_lossy(author.email_bytes()),
        timestamp,
    )
    .with_body(commit.body().unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chronicle_core::error::GitError;
    use git2::{Repository, Signature};
    use tempfile::TempDir;

    fn commit_file(repo: &Repository, root: &Path, file: &str, message: &str) {
        let full = root.join(file);
        std::fs::create_dir_all(full.parent().unwrap()).unwrap();
        std::fs::write(&full, message).unwrap();

        let mut index = repo.index().unwrap();
        index.add_path(Path::new(file)).unwrap();
        index.write().unwrap();

        let sig = Signature::now("Test", "test@example.com").unwrap();
        let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();
        let parents = match repo.head() {
            Ok(head) => vec![head.peel_to_commit().unwrap()],
            Err(_) => vec![],
        };
        let parents: Vec<&git2::Commit<'_>> = parents.iter().collect();
        repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .unwrap();
    }

    fn setup_repo_with_commits() -> (TempDir, GitRepo) {
        let temp = TempDir::new().unwrap();
        let repo = Repository::init(temp.path()).unwrap();

        commit_file(&repo, temp.path(), "README.md", "chore: initial commit");
        commit_file(&repo, temp.path(), "packages/a/index.js", "feat(a): add a");
        commit_file(
            &repo,
            temp.path(),
            "packages/b/index.js",
            "fix(b): repair b\n\nCloses #12",
        );

        let git_repo = GitRepo::open(temp.path()).unwrap();
        (temp, git_repo)
    }

    #[test]
    fn test_history_is_newest_first() {
        let (_temp, repo) = setup_repo_with_commits();
        let commits = repo.history(None).unwrap();
        assert_eq!(commits.len(), 3);
        assert_eq!(commits[0].message, "fix(b): repair b");
        assert_eq!(commits[0].body.as_deref(), Some("Closes #12"));
        assert_eq!(commits[2].message, "chore: initial commit");
    }

    #[test]
    fn test_history_scoped_to_path() {
        let (_temp, repo) = setup_repo_with_commits();
        let commits = repo.history(Some(Path::new("packages/a"))).unwrap();
        assert_eq!(commits.len(), 1);
        assert_eq!(commits[0].message, "feat(a): add a");
    }

    #[test]
    fn test_history_of_empty_repo() {
        let temp = TempDir::new().unwrap();
        Repository::init(temp.path()).unwrap();
        let repo = GitRepo::open(temp.path()).unwrap();
        assert!(matches!(repo.history(None), Err(GitError::NoCommits)));
    }
}
