//! Template compilation
//!
//! Splits template source into tokens, strips lines that hold nothing but
//! a block tag, and builds the node tree the renderer walks.

use chronicle_core::error::{ChangelogError, Result};

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// A compiled template node
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Node {
    Text(String),
    Variable(Vec<String>),
    Section {
        path: Vec<String>,
        inverted: bool,
        children: Vec<Node>,
    },
    Partial(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Text(String),
    Variable(String),
    Open { name: String, inverted: bool, offset: usize },
    Close { name: String, offset: usize },
    Partial(String),
    Comment,
}

impl Token {
    /// Tags that vanish from the output and may sit alone on a line
    fn is_block(&self) -> bool {
        matches!(
            self,
            Token::Open { .. } | Token::Close { .. } | Token::Partial(_) | Token::Comment
        )
    }
}

/// Compile template source into nodes
pub(crate) fn compile(name: &str, source: &str) -> Result<Vec<Node>> {
    let mut tokens = tokenize(name, source)?;
    strip_standalone(&mut tokens);
    build(name, tokens)
}

fn syntax_error(name: &str, offset: usize, message: &str) -> ChangelogError {
    ChangelogError::TemplateSyntax {
        name: name.to_string(),
        offset,
        message: message.to_string(),
    }
}

fn tokenize(name: &str, source: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut pos = 0;

    while let Some(found) = source[pos..].find(OPEN) {
        let start = pos + found;
        if start > pos {
            tokens.push(Token::Text(source[pos..start].to_string()));
        }

        let inner_start = start + OPEN.len();
        let inner_len = source[inner_start..]
            .find(CLOSE)
            .ok_or_else(|| syntax_error(name, start, "unclosed tag"))?;
        let inner = source[inner_start..inner_start + inner_len].trim();
        pos = inner_start + inner_len + CLOSE.len();

        let (sigil, rest) = match inner.chars().next() {
            Some(c @ ('#' | '^' | '/' | '>' | '!')) => (Some(c), inner[1..].trim()),
            _ => (None, inner),
        };

        if sigil == Some('!') {
            tokens.push(Token::Comment);
            continue;
        }
        if rest.is_empty() {
            return Err(syntax_error(name, start, "empty tag").into());
        }

        let rest = rest.to_string();
        tokens.push(match sigil {
            Some('#') => Token::Open { name: rest, inverted: false, offset: start },
            Some('^') => Token::Open { name: rest, inverted: true, offset: start },
            Some('/') => Token::Close { name: rest, offset: start },
            Some('>') => Token::Partial(rest),
            _ => Token::Variable(rest),
        });
    }

    if pos < source.len() {
        tokens.push(Token::Text(source[pos..].to_string()));
    }
    Ok(tokens)
}

fn is_blank(text: &str) -> bool {
    text.chars().all(|c| c == ' ' || c == '\t' || c == '\r')
}

/// Whether the text before a tag leaves it at the start of a line
fn ends_line_blank(text: &str, at_template_start: bool) -> bool {
    match text.rfind('\n') {
        Some(i) => is_blank(&text[i + 1..]),
        None => at_template_start && is_blank(text),
    }
}

/// Whether the text after a tag leaves it at the end of a line
fn starts_line_blank(text: &str, at_template_end: bool) -> bool {
    match text.find('\n') {
        Some(i) => is_blank(&text[..i]),
        None => at_template_end && is_blank(text),
    }
}

/// Remove the whitespace and line break around block tags that sit alone on
/// their line. Standalone-ness is judged on the source as written.
fn strip_standalone(tokens: &mut [Token]) {
    let last = tokens.len().saturating_sub(1);
    let standalone: Vec<bool> = (0..tokens.len())
        .map(|i| {
            if !tokens[i].is_block() {
                return false;
            }
            let before = match i.checked_sub(1).map(|p| &tokens[p]) {
                None => true,
                Some(Token::Text(text)) => ends_line_blank(text, i == 1),
                Some(_) => false,
            };
            let after = match tokens.get(i + 1) {
                None => true,
                Some(Token::Text(text)) => starts_line_blank(text, i + 1 == last),
                Some(_) => false,
            };
            before && after
        })
        .collect();

    for (i, _) in standalone.iter().enumerate().filter(|(_, s)| **s) {
        if let Some(Token::Text(text)) = i.checked_sub(1).and_then(|p| tokens.get_mut(p)) {
            match text.rfind('\n') {
                Some(nl) => text.truncate(nl + 1),
                None => text.clear(),
            }
        }
        if let Some(Token::Text(text)) = tokens.get_mut(i + 1) {
            match text.find('\n') {
                Some(nl) => {
                    text.drain(..=nl);
                }
                None => text.clear(),
            }
        }
    }
}

fn split_path(name: &str) -> Vec<String> {
    if name == "." {
        Vec::new()
    } else {
        name.split('.').map(String::from).collect()
    }
}

fn build(name: &str, tokens: Vec<Token>) -> Result<Vec<Node>> {
    // (section name, inverted, offset, nodes collected so far)
    let mut stack: Vec<(String, bool, usize, Vec<Node>)> = Vec::new();
    let mut current: Vec<Node> = Vec::new();

    for token in tokens {
        match token {
            Token::Text(text) if text.is_empty() => {}
            Token::Text(text) => current.push(Node::Text(text)),
            Token::Variable(var) => current.push(Node::Variable(split_path(&var))),
            Token::Partial(partial) => current.push(Node::Partial(partial)),
            Token::Comment => {}
            Token::Open { name: section, inverted, offset } => {
                stack.push((section, inverted, offset, std::mem::take(&mut current)));
            }
            Token::Close { name: closing, offset } => {
                let (section, inverted, _, parent) = stack
                    .pop()
                    .ok_or_else(|| syntax_error(name, offset, "unexpected closing tag"))?;
                if section != closing {
                    return Err(syntax_error(
                        name,
                        offset,
                        &format!("expected {{{{/{}}}}}, found {{{{/{}}}}}", section, closing),
                    )
                    .into());
                }
                let children = std::mem::replace(&mut current, parent);
                current.push(Node::Section {
                    path: split_path(&section),
                    inverted,
                    children,
                });
            }
        }
    }

    if let Some((section, _, offset, _)) = stack.pop() {
        return Err(syntax_error(name, offset, &format!("unclosed section '{}'", section)).into());
    }
    Ok(current)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Node {
        Node::Text(s.to_string())
    }

    fn var(s: &str) -> Node {
        Node::Variable(split_path(s))
    }

    #[test]
    fn test_text_and_variables() {
        let nodes = compile("t", "Hello {{ name }}, {{a.b}}!").unwrap();
        assert_eq!(
            nodes,
            vec![text("Hello "), var("name"), text(", "), var("a.b"), text("!")]
        );
    }

    #[test]
    fn test_implicit_iterator() {
        let nodes = compile("t", "{{.}}").unwrap();
        assert_eq!(nodes, vec![Node::Variable(Vec::new())]);
    }

    #[test]
    fn test_inline_section_keeps_whitespace() {
        let nodes = compile("t", "a {{#x}}b{{/x}} c\n").unwrap();
        assert_eq!(
            nodes,
            vec![
                text("a "),
                Node::Section {
                    path: vec!["x".to_string()],
                    inverted: false,
                    children: vec![text("b")],
                },
                text(" c\n"),
            ]
        );
    }

    #[test]
    fn test_standalone_lines_are_removed() {
        let nodes = compile("t", "start\n  {{#items}}  \n- {{.}}\n{{/items}}\nend\n").unwrap();
        assert_eq!(
            nodes,
            vec![
                text("start\n"),
                Node::Section {
                    path: vec!["items".to_string()],
                    inverted: false,
                    children: vec![text("- "), Node::Variable(Vec::new()), text("\n")],
                },
                text("end\n"),
            ]
        );
    }

    #[test]
    fn test_standalone_partial_and_comment() {
        let nodes = compile("t", "{{! note }}\n{{> header}}\nbody").unwrap();
        assert_eq!(nodes, vec![Node::Partial("header".to_string()), text("body")]);
    }

    #[test]
    fn test_two_tags_on_one_line_are_not_standalone() {
        let nodes = compile("t", "{{#a}}{{/a}}\n").unwrap();
        assert_eq!(
            nodes,
            vec![
                Node::Section {
                    path: vec!["a".to_string()],
                    inverted: false,
                    children: Vec::new(),
                },
                text("\n"),
            ]
        );
    }

    #[test]
    fn test_unclosed_tag() {
        let err = compile("broken", "abc {{name").unwrap_err();
        assert!(matches!(
            err,
            chronicle_core::ChronicleError::Changelog(ChangelogError::TemplateSyntax { offset: 4, .. })
        ));
    }

    #[test]
    fn test_mismatched_close() {
        assert!(compile("t", "{{#a}}x{{/b}}").is_err());
        assert!(compile("t", "x{{/b}}").is_err());
        assert!(compile("t", "{{#a}}x").is_err());
        assert!(compile("t", "{{}}").is_err());
    }
}
