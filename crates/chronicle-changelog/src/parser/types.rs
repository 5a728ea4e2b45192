//! Parser configuration types

/// Grammar the commit parser works with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserOptions {
    /// Pattern matched against the commit header
    pub header_pattern: String,
    /// Field filled by each capture group of `header_pattern`, in order
    pub header_correspondence: Vec<String>,
    /// Pattern matched against the full message to detect reverts
    pub revert_pattern: String,
    /// Field filled by each capture group of `revert_pattern`, in order
    pub revert_correspondence: Vec<String>,
    /// Keywords that introduce a note in the footer
    pub note_keywords: Vec<String>,
    /// Keywords that mark a reference as closing an issue
    pub reference_actions: Vec<String>,
    /// Prefixes that introduce an issue number
    pub issue_prefixes: Vec<String>,
}

impl ParserOptions {
    /// Conventional commit grammar
    pub fn conventional() -> Self {
        Self {
            header_pattern: r"^(\w*)(?:\((.*)\))?: (.*)$".to_string(),
            header_correspondence: vec![
                "type".to_string(),
                "scope".to_string(),
                "subject".to_string(),
            ],
            revert_pattern: r"^revert:\s([\s\S]*?)\s*This reverts commit (\w*)\.".to_string(),
            revert_correspondence: vec!["header".to_string(), "hash".to_string()],
            note_keywords: vec!["BREAKING CHANGE".to_string(), "BREAKING CHANGES".to_string()],
            reference_actions: [
                "close", "closes", "closed", "fix", "fixes", "fixed", "resolve", "resolves",
                "resolved",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            issue_prefixes: vec!["#".to_string()],
        }
    }
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self::conventional()
    }
}
