//! Trivia preservation: carry line breaks from the original call into the rewrite.
//!
//! tree-sitter has no trivia model, so the formatting of an argument slot is
//! taken from the raw source between the separating comma and the argument.

use std::ops::Range;

use crate::analyzer::matcher::MatchedAssertion;
use crate::parser::ast_helpers::is_comment;
use crate::parser::node_text;
use tree_sitter::Node;

use super::interpolation::SynthesisError;
use super::synthesizer::RewritePlan;

/// Formatting that precedes an argument slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Formatting {
    /// The argument started on its own line
    pub leading_break: bool,
    /// Text between the comma and the argument (whitespace, line breaks, comments)
    pub leading: String,
}

impl Formatting {
    /// Single space after the comma, no line break
    pub fn inline() -> Self {
        Self {
            leading_break: false,
            leading: " ".to_string(),
        }
    }

    /// Formatting of an `argument` node, read from the gap after the preceding comma.
    /// The first argument of a list has no comma and is always inline.
    pub fn before(argument: Node, source: &str) -> Self {
        gap_before(argument)
            .and_then(|gap| source.get(gap))
            .map_or_else(Self::inline, Self::from_gap)
    }

    fn from_gap(gap: &str) -> Self {
        let leading_break = gap.contains('\n');
        if leading_break || gap.contains("/*") {
            Self {
                leading_break,
                leading: gap.to_string(),
            }
        } else {
            Self::inline()
        }
    }

    /// Separator emitted before the slot: the comma plus the carried trivia
    pub fn separator(&self) -> String {
        format!(",{}", self.leading)
    }
}

impl Default for Formatting {
    fn default() -> Self {
        Self::inline()
    }
}

/// Byte range between the comma preceding `argument` and the argument itself
fn gap_before(argument: Node) -> Option<Range<usize>> {
    let mut prev = argument.prev_sibling();
    while let Some(p) = prev {
        match p.kind() {
            "," => return Some(p.end_byte()..argument.start_byte()),
            "(" => return None,
            _ => prev = p.prev_sibling(),
        }
    }
    None
}

fn comments_in<'t>(node: Node<'t>, out: &mut Vec<Node<'t>>) {
    if is_comment(node) {
        out.push(node);
        return;
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        comments_in(child, out);
    }
}

/// First comment of the call that the rewrite would not reproduce.
///
/// Comments survive inside copied argument expressions and in the two carried
/// gaps (before the original second argument and before the message).
fn unplaced_comment<'s>(matched: &MatchedAssertion<'_>, source: &'s str) -> Option<&'s str> {
    let mut kept: Vec<Range<usize>> = matched
        .call
        .arguments
        .iter()
        .map(|a| a.expression.start_byte()..a.expression.end_byte())
        .collect();
    let carried = matched
        .call
        .arguments
        .get(1)
        .into_iter()
        .chain(matched.message.as_ref());
    kept.extend(carried.filter_map(|a| gap_before(a.argument)));

    let mut comments = Vec::new();
    comments_in(matched.call.node, &mut comments);
    comments
        .into_iter()
        .find(|c| {
            !kept
                .iter()
                .any(|r| r.start <= c.start_byte() && c.end_byte() <= r.end)
        })
        .map(|c| node_text(c, source))
}

/// Attach the original call's formatting to the synthesized slots.
///
/// The constraint slot inherits the formatting of the original second argument
/// and the message slot inherits the formatting of the original message. Fails
/// when a comment sits anywhere else in the call.
pub fn preserve(
    matched: &MatchedAssertion<'_>,
    plan: &mut RewritePlan,
    source: &str,
) -> Result<(), SynthesisError> {
    if let Some(comment) = unplaced_comment(matched, source) {
        return Err(SynthesisError::UnplacedComment(comment.trim_end().to_string()));
    }
    if let Some(second) = matched.call.arguments.get(1) {
        plan.constraint_formatting = second.formatting.clone();
    }
    if let (Some(slot), Some(message)) = (plan.message.as_mut(), matched.message.as_ref()) {
        slot.formatting = message.formatting.clone();
    }
    Ok(())
}
