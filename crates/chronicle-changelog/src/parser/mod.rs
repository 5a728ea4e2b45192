//! Commit message parsing

mod conventional;
mod types;

pub use conventional::ConventionalParser;
pub use types::*;

use crate::types::ParsedCommit;
use chronicle_git::CommitInfo;

/// Trait for commit parsers
pub trait CommitParser: Send + Sync {
    /// Parse a commit into a structured record.
    ///
    /// Parsing never rejects a commit: a message that does not follow the
    /// expected grammar yields a record whose type, scope and subject are
    /// unset.
    fn parse(&self, commit: &CommitInfo) -> ParsedCommit;
}
