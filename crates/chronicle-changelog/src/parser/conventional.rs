//! Conventional Commits parser
//!
//! Parses commits written in the Conventional Commits format:
//! https://www.conventionalcommits.org/

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

use chronicle_core::error::{ChangelogError, Result};
use chronicle_git::CommitInfo;

use super::{CommitParser, ParserOptions};
use crate::types::{Note, ParsedCommit, Reference, Revert};

static MENTION_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\B@([\w-]+)").expect("Invalid regex"));

/// Parser for Conventional Commits format
pub struct ConventionalParser {
    header: Regex,
    header_correspondence: Vec<String>,
    revert: Regex,
    revert_correspondence: Vec<String>,
    note: Regex,
    action: Regex,
    issue: Regex,
}

impl ConventionalParser {
    /// Create a parser for the conventional grammar
    pub fn new() -> Result<Self> {
        Self::with_options(&ParserOptions::conventional())
    }

    /// Compile a parser from options
    pub fn with_options(options: &ParserOptions) -> Result<Self> {
        let compile =
            |pattern: &str| Regex::new(pattern).map_err(|e| ChangelogError::InvalidPattern(e.to_string()));

        // Longer keywords first so "BREAKING CHANGES" wins over "BREAKING CHANGE"
        let mut keywords: Vec<&String> = options.note_keywords.iter().collect();
        keywords.sort_by_key(|k| std::cmp::Reverse(k.len()));
        let keywords = join_escaped(keywords);

        let prefixes = join_escaped(options.issue_prefixes.iter());
        let actions = join_escaped(options.reference_actions.iter());
        let issue = format!(r"(?:[\w.-]+/[\w.-]+)?(?:{})\d+", prefixes);

        Ok(Self {
            header: compile(&options.header_pattern)?,
            header_correspondence: options.header_correspondence.clone(),
            revert: compile(&options.revert_pattern)?,
            revert_correspondence: options.revert_correspondence.clone(),
            note: compile(&format!(r"^[\s|*]*({})[:\s]+(.*)$", keywords))?,
            action: compile(&format!(
                r"(?i)\b({})\b:?\s+({}(?:(?:\s*,\s*|\s+and\s+|\s+){})*)",
                actions, issue, issue
            ))?,
            issue: compile(&format!(r"(?:([\w.-]+)/([\w.-]+))?({})(\d+)", prefixes))?,
        })
    }

    /// Split the text after the header into body, footer and notes
    fn parse_body(&self, text: &str) -> (Option<String>, Option<String>, Vec<Note>) {
        let mut body_lines = Vec::new();
        let mut footer_lines = Vec::new();
        let mut notes: Vec<Note> = Vec::new();
        let mut in_footer = false;
        let mut in_note = false;

        for line in text.lines() {
            if let Some(caps) = self.note.captures(line) {
                in_footer = true;
                in_note = true;
                notes.push(Note {
                    title: caps[1].to_string(),
                    text: caps[2].trim().to_string(),
                });
                footer_lines.push(line);
                continue;
            }

            if self.action.is_match(line) {
                in_footer = true;
                in_note = false;
                footer_lines.push(line);
                continue;
            }

            if in_footer {
                footer_lines.push(line);
                if in_note {
                    if let Some(note) = notes.last_mut() {
                        if !note.text.is_empty() {
                            note.text.push('\n');
                        }
                        note.text.push_str(line);
                    }
                }
            } else {
                body_lines.push(line);
            }
        }

        for note in &mut notes {
            note.text = note.text.trim().to_string();
        }

        (non_empty(body_lines.join("\n")), non_empty(footer_lines.join("\n")), notes)
    }

    /// Extract issue references; action-led references come first
    fn parse_references(&self, text: &str) -> Vec<Reference> {
        let mut references = Vec::new();
        let mut covered: Vec<Range<usize>> = Vec::new();

        for caps in self.action.captures_iter(text) {
            let action = caps.get(1).map(|m| m.as_str().to_string());
            if let Some(list) = caps.get(2) {
                covered.push(list.range());
                for issue in self.issue.captures_iter(list.as_str()) {
                    references.push(self.reference(&issue, action.clone()));
                }
            }
        }

        for issue in self.issue.captures_iter(text) {
            let start = issue.get(0).map(|m| m.start()).unwrap_or_default();
            if covered.iter().any(|range| range.contains(&start)) {
                continue;
            }
            references.push(self.reference(&issue, None));
        }

        let mut seen = Vec::new();
        references.retain(|r: &Reference| {
            let key = (r.owner.clone(), r.repository.clone(), r.issue.clone());
            if seen.contains(&key) {
                false
            } else {
                seen.push(key);
                true
            }
        });
        references
    }

    fn reference(&self, caps: &regex::Captures<'_>, action: Option<String>) -> Reference {
        let text = |i: usize| caps.get(i).map(|m| m.as_str().to_string());
        Reference {
            action,
            owner: text(1),
            repository: text(2),
            issue: text(4).unwrap_or_default(),
            raw: text(0).unwrap_or_default(),
            prefix: text(3).unwrap_or_default(),
        }
    }

    fn parse_revert(&self, message: &str) -> Option<Revert> {
        let caps = self.revert.captures(message)?;
        let mut revert = Revert {
            header: String::new(),
            hash: String::new(),
        };

        for (index, field) in self.revert_correspondence.iter().enumerate() {
            let value = caps.get(index + 1).map(|m| m.as_str().to_string());
            match (field.as_str(), value) {
                ("header", Some(value)) => revert.header = value,
                ("hash", Some(value)) => revert.hash = value,
                _ => {}
            }
        }

        Some(revert)
    }
}

impl CommitParser for ConventionalParser {
    fn parse(&self, commit: &CommitInfo) -> ParsedCommit {
        let header = commit.message.trim().to_string();
        let mut parsed = ParsedCommit {
            header: header.clone(),
            hash: commit.hash.clone(),
            author: commit.author.clone(),
            timestamp: commit.timestamp,
            ..Default::default()
        };

        if let Some(caps) = self.header.captures(&header) {
            for (index, field) in self.header_correspondence.iter().enumerate() {
                let value = caps
                    .get(index + 1)
                    .map(|m| m.as_str().trim())
                    .filter(|v| !v.is_empty())
                    .map(String::from);
                match field.as_str() {
                    "type" => parsed.commit_type = value,
                    "scope" => parsed.scope = value,
                    "subject" => parsed.subject = value,
                    _ => {}
                }
            }
        }

        if let Some(body) = commit.body.as_deref() {
            let (body, footer, notes) = self.parse_body(body);
            parsed.body = body;
            parsed.footer = footer;
            parsed.notes = notes;
        }

        let message = commit.full_message();
        parsed.revert = self.parse_revert(&message);
        parsed.references = self.parse_references(&message);

        for caps in MENTION_REGEX.captures_iter(&message) {
            let name = caps[1].to_string();
            if !parsed.mentions.contains(&name) {
                parsed.mentions.push(name);
            }
        }

        parsed
    }
}

fn join_escaped<'a>(items: impl IntoIterator<Item = &'a String>) -> String {
    items
        .into_iter()
        .map(|s| regex::escape(s))
        .collect::<Vec<_>>()
        .join("|")
}

fn non_empty(text: String) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn make_commit(message: &str, body: Option<&str>) -> CommitInfo {
        let commit = CommitInfo::new(
            "abc1234567890",
            message,
            "Test Author",
            "test@example.com",
            Utc::now(),
        );
        match body {
            Some(body) => commit.with_body(body),
            None => commit,
        }
    }

    fn parse(message: &str, body: Option<&str>) -> ParsedCommit {
        ConventionalParser::new()
            .unwrap()
            .parse(&make_commit(message, body))
    }

    #[test]
    fn test_parse_simple_feat() {
        let parsed = parse("feat: add new feature", None);

        assert_eq!(parsed.commit_type.as_deref(), Some("feat"));
        assert_eq!(parsed.subject.as_deref(), Some("add new feature"));
        assert!(parsed.scope.is_none());
        assert!(parsed.notes.is_empty());
    }

    #[test]
    fn test_parse_with_scope() {
        let parsed = parse("fix(parser): handle edge case", None);

        assert_eq!(parsed.commit_type.as_deref(), Some("fix"));
        assert_eq!(parsed.scope.as_deref(), Some("parser"));
        assert_eq!(parsed.subject.as_deref(), Some("handle edge case"));
    }

    #[test]
    fn test_parse_star_scope_is_kept_verbatim() {
        let parsed = parse("chore(*): bump everything", None);
        assert_eq!(parsed.scope.as_deref(), Some("*"));
    }

    #[test]
    fn test_parse_non_conventional() {
        let parsed = parse("Just a regular commit message", None);

        assert!(parsed.commit_type.is_none());
        assert!(parsed.subject.is_none());
        assert_eq!(parsed.header, "Just a regular commit message");
    }

    #[test]
    fn test_bang_shorthand_does_not_match_header() {
        let parsed = parse("feat!: breaking change", None);
        assert!(parsed.commit_type.is_none());
    }

    #[test]
    fn test_breaking_change_note() {
        let parsed = parse(
            "feat(api): drop v1 endpoints",
            Some("Some context.\n\nBREAKING CHANGE: the v1 API is gone\nuse v2 instead"),
        );

        assert_eq!(parsed.body.as_deref(), Some("Some context."));
        assert_eq!(parsed.notes.len(), 1);
        assert_eq!(parsed.notes[0].title, "BREAKING CHANGE");
        assert_eq!(parsed.notes[0].text, "the v1 API is gone\nuse v2 instead");
        assert!(parsed.footer.unwrap().starts_with("BREAKING CHANGE"));
    }

    #[test]
    fn test_plural_keyword_wins() {
        let parsed = parse("fix: x", Some("BREAKING CHANGES: several things"));
        assert_eq!(parsed.notes[0].title, "BREAKING CHANGES");
        assert_eq!(parsed.notes[0].text, "several things");
    }

    #[test]
    fn test_references_with_actions() {
        let parsed = parse(
            "fix(ui): align buttons #7",
            Some("Closes #12, #13\nrefs other/repo#4"),
        );

        let issues: Vec<(&str, Option<&str>)> = parsed
            .references
            .iter()
            .map(|r| (r.issue.as_str(), r.action.as_deref()))
            .collect();
        assert_eq!(
            issues,
            vec![
                ("12", Some("Closes")),
                ("13", Some("Closes")),
                ("7", None),
                ("4", None)
            ]
        );

        let cross = parsed.references.iter().find(|r| r.issue == "4").unwrap();
        assert_eq!(cross.owner.as_deref(), Some("other"));
        assert_eq!(cross.repository.as_deref(), Some("repo"));
        assert_eq!(cross.prefix, "#");
    }

    #[test]
    fn test_references_are_deduplicated() {
        let parsed = parse("fix: crash #5", Some("Fixes #5"));
        assert_eq!(parsed.references.len(), 1);
        assert_eq!(parsed.references[0].action.as_deref(), Some("Fixes"));
        assert_eq!(parsed.footer.as_deref(), Some("Fixes #5"));
    }

    #[test]
    fn test_revert() {
        let parsed = parse(
            "revert: feat: add thing",
            Some("This reverts commit 1234567abcdef."),
        );

        assert_eq!(parsed.commit_type.as_deref(), Some("revert"));
        let revert = parsed.revert.unwrap();
        assert_eq!(revert.header, "feat: add thing");
        assert_eq!(revert.hash, "1234567abcdef");
    }

    #[test]
    fn test_mentions() {
        let parsed = parse("docs: thanks @octocat", Some("cc @hubot and @octocat"));
        assert_eq!(parsed.mentions, vec!["octocat".to_string(), "hubot".to_string()]);
    }

    #[test]
    fn test_invalid_pattern_is_an_error() {
        let mut options = ParserOptions::conventional();
        options.header_pattern = "(".to_string();
        assert!(ConventionalParser::with_options(&options).is_err());
    }
}
