//! Analysis rules for NUnit assertions

pub mod legacy_assert_usage;
pub mod same_actual_expected_value;

pub use legacy_assert_usage::LegacyAssertUsageRule;
pub use same_actual_expected_value::SameActualExpectedValueRule;

use super::call_site::{CallSite, SymbolResolver};
use crate::{Diagnostic, Rule};
use tree_sitter::Tree;

/// Everything a rule sees for one file
pub struct AnalysisContext<'a> {
    pub source: &'a str,
    pub tree: &'a Tree,
    pub resolver: &'a dyn SymbolResolver,
    /// Resolved call sites in source order (unresolved invocations are absent)
    pub call_sites: Vec<CallSite<'a>>,
}

impl<'a> AnalysisContext<'a> {
    pub fn new(source: &'a str, tree: &'a Tree, resolver: &'a dyn SymbolResolver) -> Self {
        let call_sites = crate::parser::find_invocations(tree)
            .into_iter()
            .filter_map(|node| CallSite::from_invocation(node, source, resolver))
            .collect();
        Self {
            source,
            tree,
            resolver,
            call_sites,
        }
    }
}

/// Trait for analysis rules
pub trait AnalysisRule: Send + Sync {
    /// Rule this implementation reports
    fn rule(&self) -> Rule;

    /// Name of the rule
    fn name(&self) -> &'static str {
        self.rule().id()
    }

    /// Analyze one file and return the diagnostics found
    fn analyze(&self, ctx: &AnalysisContext<'_>) -> Vec<Diagnostic>;
}

/// Every rule, in reporting order
pub fn all_rules() -> Vec<Box<dyn AnalysisRule>> {
    vec![
        Box::new(LegacyAssertUsageRule::new()),
        Box::new(SameActualExpectedValueRule::new()),
    ]
}
