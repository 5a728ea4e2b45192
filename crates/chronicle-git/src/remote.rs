//! Remote lookup, used to locate the hosted repository for links

use tracing::debug;

use crate::repository::{GitRepo, Result};
use chronicle_core::error::GitError;

impl GitRepo {
    /// Fetch URL of the named remote.
    ///
    /// An unknown remote is [`GitError::RemoteNotFound`]; a remote without a
    /// URL (or with a non-UTF-8 one) is `Ok(None)`.
    pub fn remote_url(&self, name: &str) -> Result<Option<String>> {
        let remote = self.repo.find_remote(name).map_err(|e| {
            if e.code() == git2::ErrorCode::NotFound {
                GitError::RemoteNotFound(name.to_string())
            } else {
                e.into()
            }
        })?;

        let url = remote.url().map(str::to_owned);
        debug!(remote = name, url = ?url, "resolved remote");
        Ok(url)
    }
}
