//! Text templates for agent prompts.
//!
//! Supported actions, in the `{{ }}` syntax users already write for these
//! prompts:
//!
//! - `{{.Field}}` and `{{.A.B}}`: insert a field of the current value;
//!   `{{.}}` inserts the current value itself
//! - `{{range .Items}}…{{else}}…{{end}}`: repeat for each element, with the
//!   element as the current value; `else` runs when the list is empty
//! - `{{if .Field}}…{{else}}…{{end}}`: empty strings, lists, `false` and
//!   `null` are false
//! - `{{/* comment */}}`
//!
//! `{{- ` trims whitespace before the action and ` -}}` trims whitespace
//! after it. Data is anything `Serialize`; field names are the serialized
//! keys.

use serde::Serialize;
use serde_json::Value;

#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("unclosed action at byte {0}")]
    Unclosed(usize),
    #[error("unexpected {{{{{0}}}}}")]
    Unexpected(String),
    #[error("missing {{{{end}}}} for {{{{{0}}}}}")]
    MissingEnd(String),
    #[error("unsupported action {{{{{0}}}}}")]
    Unsupported(String),
    #[error("bad field path {0:?}")]
    BadPath(String),
    #[error("no field {0}")]
    UnknownField(String),
    #[error("cannot range over {0}")]
    NotIterable(String),
    #[error("template data: {0}")]
    Data(#[from] serde_json::Error),
}

/// A parsed template, ready to render against any number of values.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    nodes: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Text(String),
    Field(FieldPath),
    Range {
        path: FieldPath,
        body: Vec<Node>,
        otherwise: Vec<Node>,
    },
    If {
        path: FieldPath,
        body: Vec<Node>,
        otherwise: Vec<Node>,
    },
}

/// `.A.B` as `["A", "B"]`; `.` is empty.
#[derive(Debug, Clone, PartialEq)]
struct FieldPath {
    source: String,
    keys: Vec<String>,
}

enum Token {
    Text(String),
    Action(String),
}

/// What ended a node list.
enum Stop {
    Eof,
    Else,
    End,
}

impl Template {
    pub fn parse(source: &str) -> Result<Self, TemplateError> {
        let mut tokens = tokenize(source)?.into_iter();
        let (nodes, stop) = parse_nodes(&mut tokens)?;
        match stop {
            Stop::Eof => Ok(Template { nodes }),
            Stop::Else => Err(TemplateError::Unexpected("else".into())),
            Stop::End => Err(TemplateError::Unexpected("end".into())),
        }
    }

    pub fn render<T: Serialize>(&self, data: &T) -> Result<String, TemplateError> {
        let value = serde_json::to_value(data)?;
        let mut out = String::new();
        render_nodes(&self.nodes, &value, &mut out)?;
        Ok(out)
    }
}

/// Parse and render in one step.
pub fn render_template<T: Serialize>(source: &str, data: &T) -> Result<String, TemplateError> {
    Template::parse(source)?.render(data)
}

// ---------------------------------------------------------------------------
// Scanning
// ---------------------------------------------------------------------------

fn tokenize(source: &str) -> Result<Vec<Token>, TemplateError> {
    let mut tokens = Vec::new();
    let mut rest = source;
    let mut offset = 0;
    let mut trim_next = false;

    while let Some(open) = rest.find("{{") {
        let mut text = &rest[..open];
        if trim_next {
            text = text.trim_start();
        }
        let after_open = &rest[open + 2..];
        let Some(close) = after_open.find("}}") else {
            return Err(TemplateError::Unclosed(offset + open));
        };
        let mut body = &after_open[..close];

        if let Some(stripped) = body.strip_prefix('-')
            && stripped.starts_with(char::is_whitespace)
        {
            text = text.trim_end();
            body = stripped;
        }
        trim_next = false;
        if let Some(stripped) = body.strip_suffix('-')
            && stripped.ends_with(char::is_whitespace)
        {
            trim_next = true;
            body = stripped;
        }

        if !text.is_empty() {
            tokens.push(Token::Text(text.to_string()));
        }
        tokens.push(Token::Action(body.trim().to_string()));

        let consumed = open + 2 + close + 2;
        offset += consumed;
        rest = &rest[consumed..];
    }

    let text = if trim_next { rest.trim_start() } else { rest };
    if !text.is_empty() {
        tokens.push(Token::Text(text.to_string()));
    }
    Ok(tokens)
}

fn parse_nodes(tokens: &mut std::vec::IntoIter<Token>) -> Result<(Vec<Node>, Stop), TemplateError> {
    let mut nodes = Vec::new();
    while let Some(token) = tokens.next() {
        let body = match token {
            Token::Text(text) => {
                nodes.push(Node::Text(text));
                continue;
            }
            Token::Action(body) => body,
        };

        if body == "end" {
            return Ok((nodes, Stop::End));
        }
        if body == "else" {
            return Ok((nodes, Stop::Else));
        }
        if body.starts_with("/*") && body.ends_with("*/") {
            continue;
        }
        if body.starts_with('.') {
            nodes.push(Node::Field(parse_path(&body)?));
            continue;
        }

        let (keyword, arg) = body
            .split_once(char::is_whitespace)
            .unwrap_or((body.as_str(), ""));
        if keyword != "range" && keyword != "if" {
            return Err(TemplateError::Unsupported(body));
        }
        let path = parse_path(arg.trim())?;
        let (body_nodes, otherwise) = parse_block(tokens, &body)?;
        nodes.push(if keyword == "range" {
            Node::Range {
                path,
                body: body_nodes,
                otherwise,
            }
        } else {
            Node::If {
                path,
                body: body_nodes,
                otherwise,
            }
        });
    }
    Ok((nodes, Stop::Eof))
}

/// Body and optional else-branch of a `range`/`if`, through its `end`.
fn parse_block(
    tokens: &mut std::vec::IntoIter<Token>,
    opener: &str,
) -> Result<(Vec<Node>, Vec<Node>), TemplateError> {
    let (body, stop) = parse_nodes(tokens)?;
    match stop {
        Stop::End => Ok((body, Vec::new())),
        Stop::Eof => Err(TemplateError::MissingEnd(opener.to_string())),
        Stop::Else => {
            let (otherwise, stop) = parse_nodes(tokens)?;
            match stop {
                Stop::End => Ok((body, otherwise)),
                Stop::Else => Err(TemplateError::Unexpected("else".into())),
                Stop::Eof => Err(TemplateError::MissingEnd(opener.to_string())),
            }
        }
    }
}

fn parse_path(source: &str) -> Result<FieldPath, TemplateError> {
    let bad = || TemplateError::BadPath(source.to_string());
    let rest = source.strip_prefix('.').ok_or_else(bad)?;
    if rest.is_empty() {
        return Ok(FieldPath {
            source: source.to_string(),
            keys: Vec::new(),
        });
    }
    let keys: Vec<String> = rest.split('.').map(str::to_string).collect();
    let valid = keys
        .iter()
        .all(|k| !k.is_empty() && k.chars().all(|c| c.is_alphanumeric() || c == '_'));
    if !valid {
        return Err(bad());
    }
    Ok(FieldPath {
        source: source.to_string(),
        keys,
    })
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

fn render_nodes(nodes: &[Node], dot: &Value, out: &mut String) -> Result<(), TemplateError> {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Field(path) => write_value(lookup(dot, path)?, out),
            Node::Range {
                path,
                body,
                otherwise,
            } => match lookup(dot, path)? {
                Value::Array(items) if !items.is_empty() => {
                    for item in items {
                        render_nodes(body, item, out)?;
                    }
                }
                Value::Array(_) | Value::Null => render_nodes(otherwise, dot, out)?,
                _ => return Err(TemplateError::NotIterable(path.source.clone())),
            },
            Node::If {
                path,
                body,
                otherwise,
            } => {
                if is_true(lookup(dot, path)?) {
                    render_nodes(body, dot, out)?;
                } else {
                    render_nodes(otherwise, dot, out)?;
                }
            }
        }
    }
    Ok(())
}

fn lookup<'a>(dot: &'a Value, path: &FieldPath) -> Result<&'a Value, TemplateError> {
    path.keys.iter().try_fold(dot, |value, key| {
        value
            .get(key)
            .ok_or_else(|| TemplateError::UnknownField(path.source.clone()))
    })
}

fn is_true(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

fn write_value(value: &Value, out: &mut String) {
    match value {
        Value::String(s) => out.push_str(s),
        Value::Null => out.push_str("<no value>"),
        other => out.push_str(&other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn fields_are_substituted() {
        let data = json!({"Title": "Fix login", "Count": 3, "Inner": {"Name": "x"}});
        assert_eq!(
            render_template("{{.Title}} ({{.Count}}) {{ .Inner.Name }}", &data).unwrap(),
            "Fix login (3) x"
        );
    }

    #[test]
    fn range_with_trim_markers() {
        let data = json!({"Tickets": [{"TicketPath": "a.md"}, {"TicketPath": "b.md"}]});
        let source = "Tickets:\n{{range .Tickets}}\n- @{{.TicketPath}}\n{{- end}}\n\nDone";
        assert_eq!(
            render_template(source, &data).unwrap(),
            "Tickets:\n\n- @a.md\n- @b.md\n\nDone"
        );
    }

    #[test]
    fn right_trim_eats_following_whitespace() {
        let data = json!({"A": "x"});
        assert_eq!(render_template("{{.A -}}   \n  y", &data).unwrap(), "xy");
    }

    #[test]
    fn range_else_and_if() {
        let data = json!({"Items": [], "Tags": "", "Title": "t"});
        let source = "{{range .Items}}{{.}}{{else}}none{{end}}|{{if .Tags}}tags{{else}}no tags{{end}}|{{if .Title}}{{.Title}}{{end}}";
        assert_eq!(render_template(source, &data).unwrap(), "none|no tags|t");
    }

    #[test]
    fn comments_are_dropped() {
        let data = json!({});
        assert_eq!(render_template("a{{/* note */}}b", &data).unwrap(), "ab");
    }

    #[test]
    fn unknown_field_is_an_error() {
        let data = json!({"Title": "x"});
        assert!(matches!(
            render_template("{{.Nope}}", &data),
            Err(TemplateError::UnknownField(f)) if f == ".Nope"
        ));
    }

    #[test]
    fn malformed_templates_are_rejected() {
        assert!(matches!(Template::parse("a {{.Title"), Err(TemplateError::Unclosed(2))));
        assert!(matches!(
            Template::parse("{{range .Tickets}}x"),
            Err(TemplateError::MissingEnd(_))
        ));
        assert!(matches!(Template::parse("{{end}}"), Err(TemplateError::Unexpected(_))));
        assert!(matches!(
            Template::parse("{{printf \"%s\" .Title}}"),
            Err(TemplateError::Unsupported(_))
        ));
        assert!(matches!(Template::parse("{{.a..b}}"), Err(TemplateError::BadPath(_))));
    }

    #[test]
    fn ranging_over_a_string_fails() {
        let data = json!({"Title": "x"});
        assert!(matches!(
            render_template("{{range .Title}}{{end}}", &data),
            Err(TemplateError::NotIterable(_))
        ));
    }
}
