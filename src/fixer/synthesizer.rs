//! Rewrite synthesis: build the constraint-model call for a matched legacy assertion.

use crate::analyzer::matcher::MatchedAssertion;
use crate::parser::node_text;

use super::interpolation::{interpolate, SynthesisError};
use super::trivia::Formatting;

/// Entry point of the constraint model
pub const CONSTRAINT_RECEIVER: &str = "Assert.That";

/// A chained modifier on the constraint, e.g. `.Within(0.1)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Modifier {
    pub name: &'static str,
    pub argument: String,
}

/// `Is.EqualTo(expected).Within(delta)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstraintExpr {
    pub constructor: &'static str,
    pub expected: String,
    pub modifiers: Vec<Modifier>,
}

impl ConstraintExpr {
    pub fn render(&self) -> String {
        let mut out = format!("{}({})", self.constructor, self.expected);
        for modifier in &self.modifiers {
            out.push_str(&format!(".{}({})", modifier.name, modifier.argument));
        }
        out
    }
}

/// Message slot content
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageExpr {
    /// Original message expression copied as written
    Verbatim(String),
    /// Interpolated string synthesized from a format string and its arguments
    Interpolated(String),
}

impl MessageExpr {
    pub fn text(&self) -> &str {
        match self {
            MessageExpr::Verbatim(text) | MessageExpr::Interpolated(text) => text,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageSlot {
    pub expr: MessageExpr,
    pub formatting: Formatting,
}

/// The replacement call, before rendering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewritePlan {
    pub receiver: &'static str,
    pub actual: String,
    pub constraint: ConstraintExpr,
    /// Trivia before the constraint argument
    pub constraint_formatting: Formatting,
    pub message: Option<MessageSlot>,
}

impl RewritePlan {
    /// `Assert.That(actual, constraint[, message])`
    pub fn render(&self) -> String {
        let mut out = format!(
            "{}({}{}{}",
            self.receiver,
            self.actual,
            self.constraint_formatting.separator(),
            self.constraint.render()
        );
        if let Some(message) = &self.message {
            out.push_str(&message.formatting.separator());
            out.push_str(message.expr.text());
        }
        out.push(')');
        out
    }
}

/// Build the rewrite for a matched assertion.
///
/// Argument expressions are copied verbatim; only the message may be converted
/// (format string plus arguments into one interpolated string). Slots use inline
/// formatting here; `trivia::preserve` carries over the original layout.
pub fn synthesize(
    matched: &MatchedAssertion<'_>,
    source: &str,
) -> Result<RewritePlan, SynthesisError> {
    let family = matched.pattern.family;
    let modifiers = matched
        .tolerance
        .iter()
        .map(|tolerance| Modifier {
            name: "Within",
            argument: node_text(tolerance.expression, source).to_string(),
        })
        .collect();

    let message = match &matched.message {
        None => None,
        Some(message) if matched.message_args.is_empty() => Some(MessageSlot {
            expr: MessageExpr::Verbatim(message.text(source).to_string()),
            formatting: Formatting::inline(),
        }),
        Some(message) => Some(MessageSlot {
            expr: MessageExpr::Interpolated(interpolate(message, &matched.message_args, source)?),
            formatting: Formatting::inline(),
        }),
    };

    Ok(RewritePlan {
        receiver: CONSTRAINT_RECEIVER,
        actual: matched.actual.text(source).to_string(),
        constraint: ConstraintExpr {
            constructor: family.constraint(),
            expected: matched.expected.text(source).to_string(),
            modifiers,
        },
        constraint_formatting: Formatting::inline(),
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::call_site::CallSite;
    use crate::analyzer::matcher::match_call;
    use crate::analyzer::resolver::ClassicAssertResolver;
    use crate::fixer::trivia;
    use crate::parser::{find_invocations, CSharpParser};

    fn rewrite(body: &str) -> Result<String, SynthesisError> {
        let source = format!("class C {{ void M() {{ {} }} }}", body);
        let tree = CSharpParser::new().unwrap().parse(&source).unwrap();
        let resolver = ClassicAssertResolver::new(&tree, &source);
        let call = find_invocations(&tree)[0];
        let site = CallSite::from_invocation(call, &source, &resolver).unwrap();
        let matched = match_call(site).unwrap();
        let mut plan = synthesize(&matched, &source)?;
        trivia::preserve(&matched, &mut plan, &source)?;
        Ok(plan.render())
    }

    #[test]
    fn plain_equality() {
        assert_eq!(
            rewrite("ClassicAssert.AreEqual(2d, 3d);").unwrap(),
            "Assert.That(3d, Is.EqualTo(2d))"
        );
    }

    #[test]
    fn plain_message_is_kept() {
        assert_eq!(
            rewrite(r#"ClassicAssert.AreEqual(2d, 3d, "message");"#).unwrap(),
            r#"Assert.That(3d, Is.EqualTo(2d), "message")"#
        );
    }

    #[test]
    fn format_message_becomes_interpolated() {
        assert_eq!(
            rewrite(r#"ClassicAssert.AreEqual(2d, 3d, "message-id: {0}", Guid.NewGuid());"#)
                .unwrap(),
            r#"Assert.That(3d, Is.EqualTo(2d), $"message-id: {Guid.NewGuid()}")"#
        );
    }

    #[test]
    fn tolerance_becomes_within() {
        assert_eq!(
            rewrite("ClassicAssert.AreEqual(2d, 3d, 0.0000001d);").unwrap(),
            "Assert.That(3d, Is.EqualTo(2d).Within(0.0000001d))"
        );
    }

    #[test]
    fn tolerance_with_message_and_params() {
        assert_eq!(
            rewrite(r#"ClassicAssert.AreEqual(2d, 3d, 0.0000001d, "message");"#).unwrap(),
            r#"Assert.That(3d, Is.EqualTo(2d).Within(0.0000001d), "message")"#
        );
        assert_eq!(
            rewrite(
                r#"ClassicAssert.AreEqual(2d, 3d, 0.0000001d, "message-id: {0}", Guid.NewGuid());"#
            )
            .unwrap(),
            r#"Assert.That(3d, Is.EqualTo(2d).Within(0.0000001d), $"message-id: {Guid.NewGuid()}")"#
        );
    }

    #[test]
    fn line_break_before_message_is_preserved() {
        assert_eq!(
            rewrite("ClassicAssert.AreEqual(2d, 3d, 0.0000001d,\n    \"message\");").unwrap(),
            "Assert.That(3d, Is.EqualTo(2d).Within(0.0000001d),\n    \"message\")"
        );
    }

    #[test]
    fn other_families_use_their_constraint() {
        assert_eq!(
            rewrite("ClassicAssert.AreNotSame(first, second);").unwrap(),
            "Assert.That(second, Is.Not.SameAs(first))"
        );
        assert_eq!(
            rewrite("ClassicAssert.GreaterOrEqual(count, 1);").unwrap(),
            "Assert.That(count, Is.GreaterThanOrEqualTo(1))"
        );
        assert_eq!(
            rewrite("ClassicAssert.Contains(item, items);").unwrap(),
            "Assert.That(items, Has.Member(item))"
        );
        assert_eq!(
            rewrite("ClassicAssert.IsInstanceOf(typeof(string), value);").unwrap(),
            "Assert.That(value, Is.InstanceOf(typeof(string)))"
        );
    }

    #[test]
    fn message_that_cannot_be_converted_blocks_the_rewrite() {
        assert_eq!(
            rewrite(r#"ClassicAssert.AreEqual(2d, 3d, "{0} {1}", a);"#),
            Err(SynthesisError::PlaceholderOutOfRange {
                index: 1,
                available: 1
            })
        );
    }
}
