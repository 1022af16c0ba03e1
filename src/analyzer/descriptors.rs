//! Diagnostic descriptor registry: static metadata for every rule.

use crate::{Rule, Severity};

/// Static description of a rule, used for messages, `constrain rules` and SARIF
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleDescriptor {
    pub rule: Rule,
    pub id: &'static str,
    pub title: &'static str,
    /// Message with positional `{0}`, `{1}` holes filled from the diagnostic's message args
    pub message_format: &'static str,
    pub category: &'static str,
    pub default_severity: Severity,
    pub description: &'static str,
}

impl RuleDescriptor {
    /// Render the message: `{n}` is replaced by `args[n]`, unknown holes are left as written
    pub fn format_message(&self, args: &[String]) -> String {
        let mut out = String::with_capacity(self.message_format.len());
        let mut rest = self.message_format;
        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            let hole = after
                .find('}')
                .and_then(|close| after[..close].parse::<usize>().ok().map(|i| (i, close)));
            match hole.and_then(|(i, close)| args.get(i).map(|arg| (arg, close))) {
                Some((arg, close)) => {
                    out.push_str(arg);
                    rest = &after[close + 1..];
                }
                None => {
                    out.push('{');
                    rest = after;
                }
            }
        }
        out.push_str(rest);
        out
    }
}

static DESCRIPTORS: [RuleDescriptor; 2] = [
    RuleDescriptor {
        rule: Rule::LegacyAssertUsage,
        id: "legacy-assert-usage",
        title: "Consider using the constraint model",
        message_format: "Consider using the constraint model, Assert.That(actual, {1}(expected)), instead of the classic model, {0}",
        category: "Assertion",
        default_severity: Severity::Warning,
        description: "Classic-model assertions such as ClassicAssert.AreEqual(expected, actual) are kept for compatibility only. The constraint model reads in actual-then-expected order and composes with modifiers like Within.",
    },
    RuleDescriptor {
        rule: Rule::SameActualExpectedValue,
        id: "same-actual-expected-value",
        title: "The actual and the expected argument is the same value",
        message_format: "The actual and the expected argument is the same '{0}'",
        category: "Structure",
        default_severity: Severity::Warning,
        description: "The actual and the expected argument is the same value. The assertion always passes (or always fails for negated constraints) and most likely compares the wrong values.",
    },
];

/// Descriptor for a rule
pub fn descriptor(rule: Rule) -> &'static RuleDescriptor {
    match rule {
        Rule::LegacyAssertUsage => &DESCRIPTORS[0],
        Rule::SameActualExpectedValue => &DESCRIPTORS[1],
    }
}

/// Every descriptor, in rule order
pub fn all() -> &'static [RuleDescriptor] {
    &DESCRIPTORS
}
