//! Changelog types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A commit after parsing its message.
///
/// Field names serialize the way templates refer to them (`type`,
/// `scope`, `subject`, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedCommit {
    /// Commit type (feat, fix, etc.), or its display label after transforming
    #[serde(rename = "type")]
    pub commit_type: Option<String>,
    /// Scope (optional, in parentheses)
    pub scope: Option<String>,
    /// Commit subject
    pub subject: Option<String>,
    /// First line of the message
    pub header: String,
    /// Message text between header and footer
    pub body: Option<String>,
    /// Message text from the first note or reference line onwards
    pub footer: Option<String>,
    /// Breaking change notes
    pub notes: Vec<Note>,
    /// Issues referenced anywhere in the message
    pub references: Vec<Reference>,
    /// `@user` mentions
    pub mentions: Vec<String>,
    /// Set for commits reverting another commit
    pub revert: Option<Revert>,
    /// Commit hash
    pub hash: String,
    /// Author name
    pub author: String,
    /// Commit timestamp
    pub timestamp: DateTime<Utc>,
}

/// A note attached to a commit, such as a breaking change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Note title (the keyword that introduced it)
    pub title: String,
    /// Note text
    pub text: String,
}

/// An issue reference found in a commit message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    /// Action keyword preceding the reference (`Closes`, `fixes`, ...)
    pub action: Option<String>,
    /// Owner for cross-repository references
    pub owner: Option<String>,
    /// Repository for cross-repository references
    pub repository: Option<String>,
    /// Issue number
    pub issue: String,
    /// Reference as written
    pub raw: String,
    /// Issue prefix
    pub prefix: String,
}

/// What a revert commit reverts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Revert {
    /// Header of the reverted commit
    pub header: String,
    /// Hash of the reverted commit
    pub hash: String,
}

/// Commits sharing one group key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitGroup {
    /// Group title (the commit type label)
    pub title: String,
    /// Commits in this group
    pub commits: Vec<ParsedCommit>,
}

/// Notes sharing one title
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteGroup {
    /// Group title
    pub title: String,
    /// Notes in this group
    pub notes: Vec<NoteEntry>,
}

/// A note together with the commit that carried it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteEntry {
    /// Note title
    pub title: String,
    /// Note text
    pub text: String,
    /// The commit the note belongs to
    pub commit: ParsedCommit,
}
