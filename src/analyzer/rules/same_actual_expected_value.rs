//! Constraint-model assertions whose expected value is the actual value itself.

use super::{AnalysisContext, AnalysisRule};
use crate::analyzer::equivalence::same_as_actual;
use crate::parser::{node_text, node_to_location};
use crate::{Diagnostic, Rule};

/// Rule for `Assert.That(x, Is.EqualTo(x))`
pub struct SameActualExpectedValueRule;

impl SameActualExpectedValueRule {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SameActualExpectedValueRule {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalysisRule for SameActualExpectedValueRule {
    fn rule(&self) -> Rule {
        Rule::SameActualExpectedValue
    }

    fn analyze(&self, ctx: &AnalysisContext<'_>) -> Vec<Diagnostic> {
        ctx.call_sites
            .iter()
            .flat_map(|call| same_as_actual(call, ctx.source))
            .map(|expected| {
                Diagnostic::new(
                    Rule::SameActualExpectedValue,
                    node_to_location(expected),
                    vec![node_text(expected, ctx.source).to_string()],
                )
            })
            .collect()
    }
}
