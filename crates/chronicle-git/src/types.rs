//! Plain records handed from the git layer to the changelog generator

use chrono::{DateTime, Utc};
use semver::Version;
use serde::{Deserialize, Serialize};

/// One commit as the changelog sees it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitInfo {
    /// Full 40-character object id
    pub hash: String,
    /// Header line
    pub message: String,
    /// Everything after the header, if non-blank
    pub body: Option<String>,
    pub author: String,
    pub author_email: String,
    /// Committer time
    pub timestamp: DateTime<Utc>,
}

impl CommitInfo {
    pub fn new(
        hash: impl Into<String>,
        header: impl Into<String>,
        author: impl Into<String>,
        author_email: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            hash: hash.into(),
            message: header.into(),
            body: None,
            author: author.into(),
            author_email: author_email.into(),
            timestamp,
        }
    }

    /// Attach the body; a blank body counts as none
    pub fn with_body(self, body: impl Into<String>) -> Self {
        let body = body.into();
        Self {
            body: (!body.trim().is_empty()).then_some(body),
            ..self
        }
    }

    /// Header and body joined the way git stores them
    pub fn full_message(&self) -> String {
        self.body.as_ref().map_or_else(
            || self.message.clone(),
            |body| format!("{}\n\n{}", self.message, body),
        )
    }
}

/// A release tag resolved to the commit it points at
#[derive(Debug, Clone)]
pub struct TagInfo {
    pub name: String,
    /// Commit the tag peels to
    pub commit_hash: String,
    pub version: Version,
    /// Time of the tagged commit, used as the release date
    pub timestamp: DateTime<Utc>,
}

/// Parse the version out of a tag name carrying `prefix`.
///
/// The common `v` prefix is optional: with prefix `"v"` both `v1.2.3` and
/// `1.2.3` are release tags. Any other prefix (such as `pkg@`) must match
/// exactly.
pub fn version_from_tag(tag: &str, prefix: &str) -> Option<Version> {
    let rest = match tag.strip_prefix(prefix) {
        Some(rest) => rest,
        None if prefix == "v" || prefix.is_empty() => tag,
        None => return None,
    };
    let rest = if prefix.is_empty() {
        rest.strip_prefix('v').unwrap_or(rest)
    } else {
        rest
    };
    Version::parse(rest).ok()
}
