//! Release tag operations

use chrono::{TimeZone, Utc};
use tracing::{debug, instrument};

use crate::repository::{GitRepo, Result};
use crate::types::{version_from_tag, TagInfo};

impl GitRepo {
    /// Get all tags whose name is `prefix` followed by a semantic version.
    ///
    /// Tags are peeled to the commit they mark, so lightweight and annotated
    /// tags are treated alike. The result is sorted by version, newest first.
    #[instrument(skip(self))]
    pub fn semver_tags(&self, prefix: &str) -> Result<Vec<TagInfo>> {
        let names = self.repo.tag_names(None)?;
        let mut tags = Vec::new();
        let mut ignored = 0usize;

        for name in names.iter().flatten() {
            let Some(version) = version_from_tag(name, prefix) else {
                ignored += 1;
                continue;
            };

            let reference = self.repo.find_reference(&format!("refs/tags/{}", name))?;
            let commit = reference.peel_to_commit()?;
            let timestamp = Utc
                .timestamp_opt(commit.time().seconds(), 0)
                .single()
                .unwrap_or_else(Utc::now);

            tags.push(TagInfo {
                name: name.to_string(),
                commit_hash: commit.id().to_string(),
                version,
                timestamp,
            });
        }

        tags.sort_by(|a, b| b.version.cmp(&a.version));
        debug!(count = tags.len(), ignored, "listed release tags");
        Ok(tags)
    }
}
