//! Classic-model assertions that have a constraint-model equivalent.

use super::{AnalysisContext, AnalysisRule};
use crate::analyzer::matcher::match_call;
use crate::fixer::TRANSFORM_TO_CONSTRAINT_MODEL;
use crate::parser::node_to_location;
use crate::{Diagnostic, Rule};

/// Rule for `ClassicAssert.AreEqual(expected, actual)` and the rest of the catalog
pub struct LegacyAssertUsageRule;

impl LegacyAssertUsageRule {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LegacyAssertUsageRule {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalysisRule for LegacyAssertUsageRule {
    fn rule(&self) -> Rule {
        Rule::LegacyAssertUsage
    }

    fn analyze(&self, ctx: &AnalysisContext<'_>) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        for call in &ctx.call_sites {
            let display_name = call.display_name();
            let Some(matched) = match_call(call.clone()) else {
                tracing::trace!(call = %display_name, "not a catalog shape");
                continue;
            };
            let args = vec![
                display_name,
                matched.pattern.family.constraint().to_string(),
            ];
            diagnostics.push(
                Diagnostic::new(Rule::LegacyAssertUsage, node_to_location(call.node), args)
                    .with_suggestion(TRANSFORM_TO_CONSTRAINT_MODEL),
            );
        }
        diagnostics
    }
}
