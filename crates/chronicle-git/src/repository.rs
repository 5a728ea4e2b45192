//! Opening the repository a changelog is generated for

use std::path::Path;

use git2::{ErrorCode, Repository};
use tracing::{debug, instrument};

use chronicle_core::error::GitError;

/// Result type for git operations
pub type Result<T> = std::result::Result<T, GitError>;

/// Handle on the repository whose history feeds the changelog
pub struct GitRepo {
    pub(crate) repo: Repository,
}

impl GitRepo {
    /// Open the repository rooted exactly at `path`
    #[instrument(fields(path = %path.display()))]
    pub fn open(path: &Path) -> Result<Self> {
        let repo = Repository::open(path).map_err(|e| open_error(e, path))?;
        Ok(Self { repo })
    }

    /// Find the repository containing `start`, searching upward
    #[instrument(fields(start = %start.display()))]
    pub fn discover(start: &Path) -> Result<Self> {
        let repo = Repository::discover(start).map_err(|e| open_error(e, start))?;
        debug!(git_dir = %repo.path().display(), "repository found");
        Ok(Self { repo })
    }

    /// Working tree root; `None` for bare repositories
    pub fn workdir(&self) -> Option<&Path> {
        self.repo.workdir()
    }

    /// The commit HEAD points at.
    ///
    /// A freshly initialised repository has an unborn HEAD, reported as
    /// [`GitError::NoCommits`] so callers can tell it apart from real failures.
    pub fn head_commit(&self) -> Result<git2::Commit<'_>> {
        let reference = match self.repo.head() {
            Ok(reference) => reference,
            Err(e) if matches!(e.code(), ErrorCode::UnbornBranch | ErrorCode::NotFound) => {
                return Err(GitError::NoCommits)
            }
            Err(e) => return Err(e.into()),
        };
        Ok(reference.peel_to_commit()?)
    }
}

fn open_error(error: git2::Error, path: &Path) -> GitError {
    match error.code() {
        ErrorCode::NotFound => GitError::NotARepository(path.to_path_buf()),
        _ => GitError::OpenFailed(error.message().to_string()),
    }
}
