//! Grouping and ordering of transformed commits

use std::cmp::Ordering;

use crate::types::{CommitGroup, NoteEntry, NoteGroup, ParsedCommit};

/// Key a commit is grouped under
pub type GroupByFn = fn(&ParsedCommit) -> Option<String>;

/// Ordering between two commit groups
pub type GroupOrderFn = fn(&CommitGroup, &CommitGroup) -> Ordering;

/// Ordering between two commits inside a group
pub type CommitOrderFn = fn(&ParsedCommit, &ParsedCommit) -> Ordering;

/// Ordering between two note groups
pub type NoteGroupOrderFn = fn(&NoteGroup, &NoteGroup) -> Ordering;

/// How commits are grouped and ordered in one release block.
///
/// All sorts are stable, so equal elements keep their history order.
#[derive(Clone, Copy)]
pub struct WriterPolicy {
    pub group_by: GroupByFn,
    pub commit_groups_sort: GroupOrderFn,
    pub commits_sort: CommitOrderFn,
    pub note_groups_sort: NoteGroupOrderFn,
}

impl WriterPolicy {
    /// Group by type, order groups by title and commits by (scope, subject)
    pub fn conventional() -> Self {
        Self {
            group_by: |commit| commit.commit_type.clone(),
            commit_groups_sort: |a, b| a.title.cmp(&b.title),
            commits_sort: |a, b| (&a.scope, &a.subject).cmp(&(&b.scope, &b.subject)),
            note_groups_sort: |a, b| a.title.cmp(&b.title),
        }
    }

    /// Build the commit groups and note groups of one release block
    pub fn apply(&self, commits: &[ParsedCommit]) -> (Vec<CommitGroup>, Vec<NoteGroup>) {
        (self.commit_groups(commits), self.note_groups(commits))
    }

    /// Group commits, keeping first-seen group order before sorting
    pub fn commit_groups(&self, commits: &[ParsedCommit]) -> Vec<CommitGroup> {
        let mut groups: Vec<(Option<String>, Vec<ParsedCommit>)> = Vec::new();

        for commit in commits {
            let key = (self.group_by)(commit);
            match groups.iter_mut().find(|(k, _)| *k == key) {
                Some((_, members)) => members.push(commit.clone()),
                None => groups.push((key, vec![commit.clone()])),
            }
        }

        let mut groups: Vec<CommitGroup> = groups
            .into_iter()
            .map(|(key, mut commits)| {
                commits.sort_by(self.commits_sort);
                CommitGroup {
                    title: key.unwrap_or_default(),
                    commits,
                }
            })
            .collect();

        groups.sort_by(self.commit_groups_sort);
        groups
    }

    /// Collect every commit's notes into groups keyed by note title
    pub fn note_groups(&self, commits: &[ParsedCommit]) -> Vec<NoteGroup> {
        let mut groups: Vec<NoteGroup> = Vec::new();

        for commit in commits {
            for note in &commit.notes {
                let entry = NoteEntry {
                    title: note.title.clone(),
                    text: note.text.clone(),
                    commit: commit.clone(),
                };
                match groups.iter_mut().find(|g| g.title == note.title) {
                    Some(group) => group.notes.push(entry),
                    None => groups.push(NoteGroup {
                        title: note.title.clone(),
                        notes: vec![entry],
                    }),
                }
            }
        }

        groups.sort_by(self.note_groups_sort);
        groups
    }
}

impl std::fmt::Debug for WriterPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WriterPolicy").finish_non_exhaustive()
    }
}

impl Default for WriterPolicy {
    fn default() -> Self {
        Self::conventional()
    }
}
