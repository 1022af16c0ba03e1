//! Auto-fix: rewrite classic-model assertions into the constraint model.

pub mod interpolation;
pub mod synthesizer;
pub mod trivia;

pub use interpolation::SynthesisError;
pub use synthesizer::{synthesize, RewritePlan};

use crate::analyzer::call_site::{CallSite, SymbolResolver};
use crate::analyzer::matcher::{match_call, MatchedAssertion};
use crate::parser::invocation_at;
use crate::{Diagnostic, Fix, Rule};
use std::fs;
use std::path::Path;
use tree_sitter::Tree;

/// Title of the classic-to-constraint rewrite, shown to users and stable across releases
pub const TRANSFORM_TO_CONSTRAINT_MODEL: &str = "Transform to constraint model";

/// Build the replacement edit for a matched assertion
pub fn fix_for_match(matched: &MatchedAssertion<'_>, source: &str) -> Result<Fix, SynthesisError> {
    let mut plan = synthesize(matched, source)?;
    trivia::preserve(matched, &mut plan, source)?;
    let node = matched.call.node;
    Ok(Fix {
        title: TRANSFORM_TO_CONSTRAINT_MODEL.to_string(),
        start_byte: node.start_byte(),
        end_byte: node.end_byte(),
        start_line: node.start_position().row + 1,
        start_column: node.start_position().column + 1,
        end_line: node.end_position().row + 1,
        end_column: node.end_position().column + 1,
        replacement: plan.render(),
    })
}

/// Compute the fix for a diagnostic if its rule is auto-fixable.
/// Returns None if the rule has no fix or the rewrite cannot preserve the message.
pub fn fix_for_diagnostic(
    diagnostic: &Diagnostic,
    source: &str,
    tree: &Tree,
    resolver: &dyn SymbolResolver,
) -> Option<Fix> {
    if diagnostic.rule != Rule::LegacyAssertUsage {
        return None;
    }
    let location = &diagnostic.location;
    let node = invocation_at(tree, location.start_byte, location.end_byte)?;
    let matched = match_call(CallSite::from_invocation(node, source, resolver)?)?;
    match fix_for_match(&matched, source) {
        Ok(fix) => Some(fix),
        Err(err) => {
            tracing::debug!(
                line = location.line,
                call = %matched.call.display_name(),
                "no fix offered: {}",
                err
            );
            None
        }
    }
}

/// Result of applying a batch of fixes to one source text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixOutcome {
    pub content: String,
    pub applied: usize,
    /// Fixes dropped because they overlap an applied fix; a later pass picks them up
    pub skipped: usize,
}

/// Apply fixes to source text. Fixes are applied from bottom to top so offsets remain
/// valid; a fix overlapping one already applied is skipped (nested assertions).
pub fn apply_fixes_to_source(source: &str, fixes: &[Fix]) -> FixOutcome {
    let mut sorted: Vec<&Fix> = fixes.iter().collect();
    sorted.sort_by(|a, b| {
        (b.start_byte, a.end_byte).cmp(&(a.start_byte, b.end_byte))
    });
    let mut content = source.to_string();
    let mut applied = 0;
    let mut skipped = 0;
    // start of the lowest edit applied so far
    let mut floor = usize::MAX;
    for fix in sorted {
        let valid = fix.start_byte <= fix.end_byte
            && fix.end_byte <= content.len()
            && content.is_char_boundary(fix.start_byte)
            && content.is_char_boundary(fix.end_byte);
        if !valid || fix.end_byte > floor {
            skipped += 1;
            continue;
        }
        content.replace_range(fix.start_byte..fix.end_byte, &fix.replacement);
        floor = fix.start_byte;
        applied += 1;
    }
    FixOutcome {
        content,
        applied,
        skipped,
    }
}

/// Apply a list of fixes to a file
pub fn apply_fixes(path: &Path, fixes: &[Fix]) -> std::io::Result<FixOutcome> {
    let source = fs::read_to_string(path)?;
    let outcome = apply_fixes_to_source(&source, fixes);
    if outcome.applied > 0 {
        fs::write(path, &outcome.content)?;
    }
    Ok(outcome)
}

/// Collect all fixes from analysis results (diagnostics with fix populated)
pub fn collect_fixes_from_results(
    results: &[crate::AnalysisResult],
) -> Vec<(std::path::PathBuf, Fix)> {
    let mut out = Vec::new();
    for r in results {
        for diagnostic in &r.diagnostics {
            if let Some(ref fix) = diagnostic.fix {
                out.push((r.file_path.clone(), fix.clone()));
            }
        }
    }
    out
}
