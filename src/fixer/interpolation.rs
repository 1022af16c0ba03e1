//! Composite format string to interpolated string conversion.
//!
//! `"id {0,-8:x} {{raw}}", Next()` becomes `$"id {Next(),-8:x} {{raw}}"`.
//! Every piece of literal text, including escape sequences and doubled braces,
//! is copied byte for byte so the rendered message is unchanged.

use std::sync::OnceLock;

use regex::Regex;
use tree_sitter::Node;

use crate::analyzer::call_site::CallArgument;
use crate::analyzer::resolver::ExprShape;
use crate::parser::{contains_comment, node_text};

/// Reasons a message cannot be rewritten without changing what it renders
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SynthesisError {
    #[error("format placeholder {{{index}}} has no argument ({available} supplied)")]
    PlaceholderOutOfRange { index: usize, available: usize },
    #[error("malformed format string: {0}")]
    MalformedFormat(String),
    #[error("message with format arguments is not a string literal")]
    NonLiteralFormat,
    #[error("{0} format strings are not converted")]
    UnsupportedFormatLiteral(&'static str),
    #[error("format arguments are passed as an explicit array")]
    ExplicitParamsArray,
    #[error("format argument `{0}` cannot be embedded in an interpolation hole")]
    UnembeddableArgument(String),
    #[error("comment `{0}` has no place in the rewritten call")]
    UnplacedComment(String),
    #[error("argument is missing or unparsable")]
    MalformedArgument,
}

fn placeholder_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(\d+)\s*(?:,\s*(-?\d+)\s*)?(?::(.*))?$")
            .expect("placeholder pattern is valid")
    })
}

/// A parsed `{index[,alignment][:format]}` item
#[derive(Debug, Clone, PartialEq, Eq)]
struct Placeholder<'s> {
    index: usize,
    alignment: Option<&'s str>,
    format: Option<&'s str>,
}

fn parse_placeholder(body: &str) -> Result<Placeholder<'_>, SynthesisError> {
    let malformed = || SynthesisError::MalformedFormat(format!("{{{}}}", body));
    let caps = placeholder_pattern().captures(body).ok_or_else(malformed)?;
    let index = caps
        .get(1)
        .and_then(|m| m.as_str().parse::<usize>().ok())
        .ok_or_else(malformed)?;
    Ok(Placeholder {
        index,
        alignment: caps.get(2).map(|m| m.as_str()),
        format: caps.get(3).map(|m| m.as_str()),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LiteralKind {
    Regular,
    Verbatim,
}

/// Split a string literal into its kind and the text between the quotes
fn literal_body<'s>(node: Node, source: &'s str) -> Result<(LiteralKind, &'s str), SynthesisError> {
    let text = node_text(node, source);
    match node.kind() {
        "string_literal" => text
            .strip_prefix('"')
            .and_then(|t| t.strip_suffix('"'))
            .map(|body| (LiteralKind::Regular, body))
            .ok_or(SynthesisError::MalformedArgument),
        "verbatim_string_literal" => text
            .strip_prefix("@\"")
            .and_then(|t| t.strip_suffix('"'))
            .map(|body| (LiteralKind::Verbatim, body))
            .ok_or(SynthesisError::MalformedArgument),
        "raw_string_literal" => Err(SynthesisError::UnsupportedFormatLiteral("raw")),
        "interpolated_string_expression" => {
            Err(SynthesisError::UnsupportedFormatLiteral("interpolated"))
        }
        _ => Err(SynthesisError::NonLiteralFormat),
    }
}

/// Escape sequences in a regular literal that decode to a brace would become
/// format syntax at runtime; those literals are left alone.
fn escapes_a_brace(escape: &str) -> bool {
    let hex = if let Some(h) = escape.strip_prefix("\\u") {
        h
    } else if let Some(h) = escape.strip_prefix("\\U") {
        h
    } else if let Some(h) = escape.strip_prefix("\\x") {
        h
    } else {
        return false;
    };
    matches!(u32::from_str_radix(hex, 16), Ok(0x7B) | Ok(0x7D))
}

/// Length in bytes of the escape sequence starting at `bytes[0] == b'\\'`
fn escape_len(rest: &str) -> usize {
    let bytes = rest.as_bytes();
    let hex_digits = |max: usize| {
        bytes[2..]
            .iter()
            .take(max)
            .take_while(|b| b.is_ascii_hexdigit())
            .count()
    };
    match bytes.get(1) {
        Some(b'u') | Some(b'x') => 2 + hex_digits(4),
        Some(b'U') => 2 + hex_digits(8),
        Some(_) => rest[1..].chars().next().map_or(1, |c| 1 + c.len_utf8()),
        None => 1,
    }
}

/// Text to put inside an interpolation hole for a format argument
fn hole_text(argument: &CallArgument<'_>, source: &str, kind: LiteralKind) -> Result<String, SynthesisError> {
    let expression = argument.expression;
    if expression.is_missing() || expression.is_error() {
        return Err(SynthesisError::MalformedArgument);
    }
    let text = node_text(expression, source);
    if contains_comment(expression) || (kind == LiteralKind::Regular && text.contains('\n')) {
        return Err(SynthesisError::UnembeddableArgument(text.to_string()));
    }
    // a top-level `:` would be read as the start of a format specifier
    if expression.kind() == "conditional_expression" || text.contains(':') {
        Ok(format!("({})", text))
    } else {
        Ok(text.to_string())
    }
}

/// Convert a composite format string and its arguments into an interpolated
/// string literal. Arguments not referenced by any placeholder are dropped.
pub fn interpolate(
    format: &CallArgument<'_>,
    args: &[CallArgument<'_>],
    source: &str,
) -> Result<String, SynthesisError> {
    // a lone null or reference-type array binds as the params array itself
    if let [only] = args {
        if matches!(
            only.expression.kind(),
            "array_creation_expression" | "implicit_array_creation_expression"
        ) || matches!(only.shape, ExprShape::Null | ExprShape::Array)
        {
            return Err(SynthesisError::ExplicitParamsArray);
        }
    }

    let (kind, body) = literal_body(format.expression, source)?;
    let mut holes: Vec<Option<String>> = vec![None; args.len()];
    let mut out = String::with_capacity(body.len() + 16);
    out.push_str(match kind {
        LiteralKind::Regular => "$\"",
        LiteralKind::Verbatim => "$@\"",
    });

    let mut rest = body;
    while let Some(c) = rest.chars().next() {
        match c {
            '\\' if kind == LiteralKind::Regular => {
                let len = escape_len(rest);
                let escape = &rest[..len];
                if escapes_a_brace(escape) {
                    return Err(SynthesisError::MalformedFormat(escape.to_string()));
                }
                out.push_str(escape);
                rest = &rest[len..];
            }
            '{' if rest.starts_with("{{") => {
                out.push_str("{{");
                rest = &rest[2..];
            }
            '}' if rest.starts_with("}}") => {
                out.push_str("}}");
                rest = &rest[2..];
            }
            '}' => return Err(SynthesisError::MalformedFormat("unmatched '}'".to_string())),
            '{' => {
                let close = rest
                    .find('}')
                    .ok_or_else(|| SynthesisError::MalformedFormat("unclosed '{'".to_string()))?;
                let inner = &rest[1..close];
                if inner.contains('{') {
                    return Err(SynthesisError::MalformedFormat(format!("nested '{{' in {{{}}}", inner)));
                }
                let placeholder = parse_placeholder(inner)?;
                // string.Format reads `}}` after a format clause as part of the clause
                if placeholder.format.is_some() && rest[close + 1..].starts_with('}') {
                    return Err(SynthesisError::MalformedFormat(format!("{{{}}}}}", inner)));
                }
                let Some(argument) = args.get(placeholder.index) else {
                    return Err(SynthesisError::PlaceholderOutOfRange {
                        index: placeholder.index,
                        available: args.len(),
                    });
                };
                let hole = match &holes[placeholder.index] {
                    Some(text) => text.clone(),
                    None => {
                        let text = hole_text(argument, source, kind)?;
                        holes[placeholder.index] = Some(text.clone());
                        text
                    }
                };
                out.push('{');
                out.push_str(&hole);
                if let Some(alignment) = placeholder.alignment {
                    out.push(',');
                    out.push_str(alignment);
                }
                // `{0:}` is default formatting; an empty clause does not compile in a hole
                if let Some(format) = placeholder.format.filter(|f| !f.is_empty()) {
                    out.push(':');
                    out.push_str(format);
                }
                out.push('}');
                rest = &rest[close + 1..];
            }
            _ => {
                out.push(c);
                rest = &rest[c.len_utf8()..];
            }
        }
    }
    out.push('"');

    let unused = holes.iter().filter(|h| h.is_none()).count();
    if unused > 0 {
        tracing::debug!(unused, "dropping format arguments with no placeholder");
    }
    Ok(out)
}
