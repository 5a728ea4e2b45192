//! Logic-less templates for changelog output
//!
//! A small mustache dialect rendered against a `serde_json::Value`:
//!
//! - `{{name}}` / `{{a.b}}` insert a value, `{{.}}` the current item
//! - `{{#name}}...{{/name}}` renders for each array item, once for any
//!   other truthy value, and not at all for falsy ones
//! - `{{^name}}...{{/name}}` renders only when the value is falsy
//! - `{{> partial}}` includes another template of the same set
//! - `{{! comment}}` is dropped
//!
//! Values are inserted verbatim; there is no HTML escaping.

mod parse;

use std::collections::HashMap;

use serde_json::Value;

use chronicle_core::error::{ChangelogError, Result};

use parse::Node;

/// Partials may include each other at most this deep
pub const MAX_PARTIAL_DEPTH: usize = 32;

/// A compiled template
#[derive(Debug, Clone)]
pub struct Template {
    name: String,
    nodes: Vec<Node>,
}

impl Template {
    /// Compile template source, reporting syntax errors against `name`
    pub fn compile(name: impl Into<String>, source: &str) -> Result<Self> {
        let name = name.into();
        let nodes = parse::compile(&name, source)?;
        Ok(Self { name, nodes })
    }

    /// Template name
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// A main template plus the partials it may include
#[derive(Debug, Clone)]
pub struct TemplateSet {
    main: Template,
    partials: HashMap<String, Template>,
}

impl TemplateSet {
    /// Create a set around the main template
    pub fn new(main: Template) -> Self {
        Self {
            main,
            partials: HashMap::new(),
        }
    }

    /// Register a partial under its template name
    pub fn with_partial(mut self, partial: Template) -> Self {
        self.partials.insert(partial.name.clone(), partial);
        self
    }

    /// Whether a partial with this name is registered
    pub fn has_partial(&self, name: &str) -> bool {
        self.partials.contains_key(name)
    }

    /// Render the main template against a context
    pub fn render(&self, context: &Value) -> Result<String> {
        let mut out = String::new();
        let mut stack = vec![context];
        self.render_nodes(&self.main.nodes, &mut stack, 0, &mut out)?;
        Ok(out)
    }

    fn render_nodes<'a>(
        &self,
        nodes: &[Node],
        stack: &mut Vec<&'a Value>,
        depth: usize,
        out: &mut String,
    ) -> Result<()> {
        for node in nodes {
            match node {
                Node::Text(text) => out.push_str(text),
                Node::Variable(path) => {
                    if let Some(value) = lookup(stack, path) {
                        write_value(value, out);
                    }
                }
                Node::Section {
                    path,
                    inverted,
                    children,
                } => {
                    let value = lookup(stack, path);
                    let truthy = value.is_some_and(is_truthy);

                    if *inverted {
                        if !truthy {
                            self.render_nodes(children, stack, depth, out)?;
                        }
                        continue;
                    }

                    match value {
                        Some(Value::Array(items)) => {
                            for item in items {
                                stack.push(item);
                                self.render_nodes(children, stack, depth, out)?;
                                stack.pop();
                            }
                        }
                        Some(value) if truthy => {
                            stack.push(value);
                            self.render_nodes(children, stack, depth, out)?;
                            stack.pop();
                        }
                        _ => {}
                    }
                }
                Node::Partial(name) => {
                    if depth >= MAX_PARTIAL_DEPTH {
                        return Err(ChangelogError::PartialDepth(name.clone()).into());
                    }
                    let partial = self
                        .partials
                        .get(name)
                        .ok_or_else(|| ChangelogError::UnknownPartial(name.clone()))?;
                    self.render_nodes(&partial.nodes, stack, depth + 1, out)?;
                }
            }
        }
        Ok(())
    }
}

/// Resolve a dotted name: the innermost scope holding its first segment
/// wins, the remaining segments are looked up inside that value only.
fn lookup<'a>(stack: &[&'a Value], path: &[String]) -> Option<&'a Value> {
    let Some((first, rest)) = path.split_first() else {
        return stack.last().copied();
    };

    let mut value = stack
        .iter()
        .rev()
        .copied()
        .find_map(|scope| scope.as_object()?.get(first))?;

    for segment in rest {
        value = value.as_object()?.get(segment)?;
    }
    Some(value)
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(_) => true,
    }
}

fn write_value(value: &Value, out: &mut String) {
    match value {
        Value::Null => {}
        Value::String(s) => out.push_str(s),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => out.push_str(&n.to_string()),
        Value::Array(items) => {
            let parts: Vec<String> = items
                .iter()
                .map(|item| {
                    let mut part = String::new();
                    write_value(item, &mut part);
                    part
                })
                .collect();
            out.push_str(&parts.join(","));
        }
        Value::Object(_) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chronicle_core::ChronicleError;
    use serde_json::json;

    fn render(source: &str, context: Value) -> String {
        TemplateSet::new(Template::compile("main", source).unwrap())
            .render(&context)
            .unwrap()
    }

    #[test]
    fn test_variables() {
        let out = render(
            "{{greeting}}, {{user.name}}! {{missing}}{{count}} {{flag}}",
            json!({"greeting": "Hi", "user": {"name": "Ada"}, "count": 3, "flag": true}),
        );
        assert_eq!(out, "Hi, Ada! 3 true");
    }

    #[test]
    fn test_no_escaping() {
        let out = render("{{text}}", json!({"text": "<a href=\"x\">&</a>"}));
        assert_eq!(out, "<a href=\"x\">&</a>");
    }

    #[test]
    fn test_array_section() {
        let out = render(
            "{{#items}}[{{name}}]{{/items}}",
            json!({"items": [{"name": "a"}, {"name": "b"}]}),
        );
        assert_eq!(out, "[a][b]");
    }

    #[test]
    fn test_implicit_iterator() {
        let out = render("{{#tags}}{{.}};{{/tags}}", json!({"tags": ["x", "y"]}));
        assert_eq!(out, "x;y;");
    }

    #[test]
    fn test_falsy_values() {
        let context = json!({"n": null, "f": false, "e": "", "a": [], "z": 0});
        for name in ["n", "f", "e", "a", "z", "missing"] {
            let source = format!("{{{{#{0}}}}}yes{{{{/{0}}}}}{{{{^{0}}}}}no{{{{/{0}}}}}", name);
            assert_eq!(render(&source, context.clone()), "no", "value {}", name);
        }
    }

    #[test]
    fn test_truthy_scalar_section() {
        let out = render("{{#scope}}**{{scope}}:** {{/scope}}x", json!({"scope": "api"}));
        assert_eq!(out, "**api:** x");
    }

    #[test]
    fn test_outer_scope_lookup() {
        let out = render(
            "{{#commits}}{{hash}}@{{base}} {{/commits}}",
            json!({"base": "url", "commits": [{"hash": "1"}, {"hash": "2", "base": "own"}]}),
        );
        assert_eq!(out, "1@url 2@own ");
    }

    #[test]
    fn test_dotted_lookup_does_not_fall_back() {
        let out = render(
            "{{#items}}[{{commit.scope}}]{{/items}}",
            json!({"commit": {"scope": "outer"}, "items": [{"commit": {}}]}),
        );
        assert_eq!(out, "[]");
    }

    #[test]
    fn test_partials() {
        let set = TemplateSet::new(Template::compile("main", "{{#a}}{{> item}}{{/a}}").unwrap())
            .with_partial(Template::compile("item", "<{{.}}>").unwrap());
        assert!(set.has_partial("item"));
        assert_eq!(set.render(&json!({"a": [1, 2]})).unwrap(), "<1><2>");
    }

    #[test]
    fn test_unknown_partial() {
        let set = TemplateSet::new(Template::compile("main", "{{> nope}}").unwrap());
        let err = set.render(&json!({})).unwrap_err();
        assert!(matches!(
            err,
            ChronicleError::Changelog(ChangelogError::UnknownPartial(ref name)) if name == "nope"
        ));
    }

    #[test]
    fn test_recursive_partial_is_bounded() {
        let set = TemplateSet::new(Template::compile("main", "{{> loop}}").unwrap())
            .with_partial(Template::compile("loop", "x{{> loop}}").unwrap());
        let err = set.render(&json!({})).unwrap_err();
        assert!(matches!(
            err,
            ChronicleError::Changelog(ChangelogError::PartialDepth(_))
        ));
    }

    #[test]
    fn test_block_template_layout() {
        let set = TemplateSet::new(
            Template::compile(
                "main",
                "# {{version}}\n\n{{#groups}}\n## {{title}}\n\n{{#commits}}\n* {{subject}}\n{{/commits}}\n\n{{/groups}}\n",
            )
            .unwrap(),
        );
        let out = set
            .render(&json!({
                "version": "1.0.0",
                "groups": [
                    {"title": "A", "commits": [{"subject": "one"}, {"subject": "two"}]},
                    {"title": "B", "commits": [{"subject": "three"}]}
                ]
            }))
            .unwrap();
        assert_eq!(
            out,
            "# 1.0.0\n\n## A\n\n* one\n* two\n\n## B\n\n* three\n\n"
        );
    }
}
