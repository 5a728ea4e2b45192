//! Commit transformation applied before grouping
//!
//! Decides which parsed commits make it into the changelog and rewrites
//! their fields for display: section labels, scope cleanup, short hashes
//! and issue/user links in the subject.

use std::sync::LazyLock;

use regex::Regex;

use chronicle_core::RenderContext;

use crate::types::ParsedCommit;

/// Title forced onto every note of a commit
pub const BREAKING_CHANGES_TITLE: &str = "BREAKING CHANGES";

/// Length commit hashes are shortened to for display
pub const SHORT_HASH_LEN: usize = 7;

/// Commit types always listed, with their section titles
const SHOWN_LABELS: [(&str, &str); 4] = [
    ("feat", "FEATURES"),
    ("fix", "BUG FIXES"),
    ("perf", "PERFORMANCE"),
    ("revert", "REVERTS"),
];

/// Commit types only listed when they carry a breaking change
const HIDDEN_LABELS: [(&str, &str); 6] = [
    ("docs", "DOCUMENTATION"),
    ("style", "STYLE CHANGES"),
    ("refactor", "REFACTORS"),
    ("test", "TESTS"),
    ("chore", "MAINTENANCE"),
    ("ci", "CI"),
];

static ISSUE_REFERENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#([0-9]+)").expect("Invalid regex"));

// Hosting platform username grammar: alphanumerics and single hyphens, max 39
static USER_REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\B@([a-z0-9](?:-?[a-z0-9]){0,38})").expect("Invalid regex")
});

/// Signature of a commit transform
pub type TransformFn = fn(ParsedCommit, &RenderContext) -> Option<ParsedCommit>;

/// Section title for an always-shown commit type
pub fn shown_label(commit_type: &str) -> Option<&'static str> {
    SHOWN_LABELS
        .iter()
        .find(|(token, _)| *token == commit_type)
        .map(|(_, label)| *label)
}

/// Section title for a commit type shown only on breaking changes
pub fn hidden_label(commit_type: &str) -> Option<&'static str> {
    HIDDEN_LABELS
        .iter()
        .find(|(token, _)| *token == commit_type)
        .map(|(_, label)| *label)
}

/// Transform a commit for display, or discard it (`None`).
///
/// A commit survives when it carries notes or its type is always shown.
pub fn transform(mut commit: ParsedCommit, context: &RenderContext) -> Option<ParsedCommit> {
    let must_keep = !commit.notes.is_empty();
    for note in &mut commit.notes {
        note.title = BREAKING_CHANGES_TITLE.to_string();
    }

    let commit_type = commit.commit_type.as_deref();
    if let Some(label) = commit_type.and_then(shown_label) {
        commit.commit_type = Some(label.to_string());
    } else if !must_keep {
        return None;
    } else if let Some(label) = commit_type.and_then(hidden_label) {
        commit.commit_type = Some(label.to_string());
    }

    if commit.scope.as_deref() == Some("*") {
        commit.scope = None;
    }

    commit.hash = commit.hash.chars().take(SHORT_HASH_LEN).collect();

    let mut issues = Vec::new();
    if let Some(subject) = commit.subject.take() {
        let subject = match context.issue_base_url() {
            Some(base) => {
                let (text, linked) = link_issues(&subject, &format!("{}/issues/", base));
                issues = linked;
                text
            }
            None => subject,
        };

        let subject = match context.host.as_deref() {
            Some(host) => link_users(&subject, host),
            None => subject,
        };

        commit.subject = Some(subject);
    }

    commit
        .references
        .retain(|reference| issues.contains(&reference.issue));

    Some(commit)
}

/// Rewrite `#N` into markdown links below `issues_url`.
///
/// Returns the rewritten text and the issue numbers that were linked, in
/// order of appearance.
pub fn link_issues(text: &str, issues_url: &str) -> (String, Vec<String>) {
    let issues: Vec<String> = ISSUE_REFERENCE
        .captures_iter(text)
        .map(|caps| caps[1].to_string())
        .collect();

    let rewritten = ISSUE_REFERENCE
        .replace_all(text, |caps: &regex::Captures<'_>| {
            format!("[#{}]({}{})", &caps[1], issues_url, &caps[1])
        })
        .into_owned();

    (rewritten, issues)
}

/// Rewrite `@user` mentions into markdown links to the user's profile
pub fn link_users(text: &str, host: &str) -> String {
    USER_REFERENCE
        .replace_all(text, |caps: &regex::Captures<'_>| {
            format!("[@{}]({}/{})", &caps[1], host, &caps[1])
        })
        .into_owned()
}
