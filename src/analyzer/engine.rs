//! Analysis engine - orchestrates all rules

use crate::config::{Config, RuleSeverity};
use crate::fixer;
use crate::parser::{CSharpParser, IgnoreDirectives};
use crate::{AnalysisResult, Diagnostic, FileStats};
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use super::equivalence::actual_and_constraint;
use super::matcher::match_call;
use super::resolver::ClassicAssertResolver;
use super::rules::{all_rules, AnalysisContext, AnalysisRule};

/// Main analysis engine that orchestrates all rules
pub struct AnalysisEngine {
    rules: Vec<Box<dyn AnalysisRule>>,
    /// Whether to compute fixes for fixable diagnostics
    compute_fixes: bool,
}

impl AnalysisEngine {
    /// Create a new analysis engine with every rule enabled
    pub fn new() -> Self {
        Self {
            rules: all_rules(),
            compute_fixes: true,
        }
    }

    /// Report diagnostics only; skip fix synthesis
    pub fn without_fixes(mut self) -> Self {
        self.compute_fixes = false;
        self
    }

    /// Apply config to filter and adjust diagnostic severity
    fn apply_config_to_diagnostics(
        &self,
        diagnostics: Vec<Diagnostic>,
        config: Option<&Config>,
        path: &Path,
    ) -> Vec<Diagnostic> {
        let Some(config) = config else {
            return diagnostics;
        };

        // Get effective config for this file (with overrides applied)
        let effective = config.effective_for_file(path);

        let mut out = Vec::with_capacity(diagnostics.len());
        for mut diagnostic in diagnostics {
            let rule_id = diagnostic.rule.to_string();
            match effective.rules.get(&rule_id).copied() {
                Some(RuleSeverity::Off) => continue,
                Some(rs) => {
                    if let Some(sev) = rs.to_severity() {
                        diagnostic.severity = sev;
                    }
                    out.push(diagnostic);
                }
                None => out.push(diagnostic),
            }
        }
        out
    }

    /// Analyze a C# file and return the result
    pub fn analyze(&self, path: &Path, config: Option<&Config>) -> Result<AnalysisResult> {
        let source = fs::read_to_string(path)
            .with_context(|| format!("Failed to read source file: {}", path.display()))?;
        self.analyze_source(&source, path, config)
    }

    /// Analyze C# source from a string (e.g. stdin or in-memory content).
    /// The virtual path is used for config overrides and reporting only.
    pub fn analyze_source(
        &self,
        source: &str,
        virtual_path: &Path,
        config: Option<&Config>,
    ) -> Result<AnalysisResult> {
        let mut parser = CSharpParser::new()
            .with_context(|| format!("Failed to create parser for {}", virtual_path.display()))?;
        let tree = parser
            .parse(source)
            .with_context(|| format!("Failed to parse source for {}", virtual_path.display()))?;

        let resolver = match config {
            Some(cfg) => ClassicAssertResolver::new(&tree, source)
                .with_legacy_receivers(&cfg.get_legacy_receivers()),
            None => ClassicAssertResolver::new(&tree, source),
        };
        let ctx = AnalysisContext::new(source, &tree, &resolver);

        let mut stats = FileStats {
            invocations: crate::parser::find_invocations(&tree).len(),
            has_syntax_errors: tree.root_node().has_error(),
            ..FileStats::default()
        };
        for call in &ctx.call_sites {
            if actual_and_constraint(call).is_some() {
                stats.constraint_assertions += 1;
            } else if match_call(call.clone()).is_some() {
                stats.legacy_assertions += 1;
            }
        }

        let mut diagnostics = Vec::new();
        for rule in &self.rules {
            let found = rule.analyze(&ctx);
            tracing::trace!(rule = rule.name(), count = found.len(), "rule finished");
            diagnostics.extend(found);
        }

        let ignore_directives = IgnoreDirectives::parse(source);
        let diagnostics: Vec<Diagnostic> = diagnostics
            .into_iter()
            .filter(|d| !ignore_directives.is_ignored(d.location.line, d.rule))
            .collect();

        let mut diagnostics = self.apply_config_to_diagnostics(diagnostics, config, virtual_path);

        if self.compute_fixes {
            for diagnostic in &mut diagnostics {
                diagnostic.fix = fixer::fix_for_diagnostic(diagnostic, source, &tree, &resolver);
            }
        }
        diagnostics.sort_by_key(|d| (d.location.start_byte, d.rule.id()));
        stats.fixable = diagnostics.iter().filter(|d| d.fix.is_some()).count();

        tracing::debug!(
            file = %virtual_path.display(),
            diagnostics = diagnostics.len(),
            fixable = stats.fixable,
            "analyzed"
        );

        Ok(AnalysisResult {
            file_path: virtual_path.to_path_buf(),
            diagnostics,
            stats,
        })
    }

    /// Analyze multiple files sequentially
    pub fn analyze_many(
        &self,
        paths: &[&Path],
        config: Option<&Config>,
    ) -> Vec<Result<AnalysisResult>> {
        paths.iter().map(|p| self.analyze(p, config)).collect()
    }

    /// Analyze multiple files in parallel using rayon
    pub fn analyze_parallel(
        &self,
        paths: &[PathBuf],
        config: Option<&Config>,
    ) -> Vec<Result<AnalysisResult>> {
        use rayon::prelude::*;

        paths.par_iter().map(|p| self.analyze(p, config)).collect()
    }

    /// Get aggregate stats from multiple results
    pub fn aggregate_stats(results: &[AnalysisResult]) -> AggregateStats {
        AggregateStats {
            files_analyzed: results.len(),
            legacy_assertions: results.iter().map(|r| r.stats.legacy_assertions).sum(),
            total_diagnostics: results.iter().map(|r| r.diagnostics.len()).sum(),
            fixable: results.iter().map(|r| r.stats.fixable).sum(),
        }
    }
}

impl Default for AnalysisEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Aggregate statistics from multiple file analyses
#[derive(Debug, Default, PartialEq, Eq)]
pub struct AggregateStats {
    /// Number of files analyzed
    pub files_analyzed: usize,
    /// Classic-model assertions found across all files
    pub legacy_assertions: usize,
    /// Total number of diagnostics across all files
    pub total_diagnostics: usize,
    /// Diagnostics that carry an auto-fix
    pub fixable: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Rule, Severity};
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = r#"
using NUnit.Framework;
using NUnit.Framework.Legacy;

public class CalculatorTests
{
    [Test]
    public void Adds()
    {
        var sum = Calculator.Add(2, 3);
        ClassicAssert.AreEqual(5, sum);
        Assert.That(sum, Is.EqualTo(sum));
    }
}
"#;

    fn make_source_file(content: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".cs").tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_analyze_simple_file() {
        let file = make_source_file(SAMPLE);
        let result = AnalysisEngine::new().analyze(file.path(), None).unwrap();

        assert_eq!(result.diagnostics.len(), 2);
        assert_eq!(result.stats.legacy_assertions, 1);
        assert_eq!(result.stats.constraint_assertions, 1);
        assert_eq!(result.stats.fixable, 1);
        assert!(!result.stats.has_syntax_errors);

        let legacy = &result.diagnostics[0];
        assert_eq!(legacy.rule, Rule::LegacyAssertUsage);
        assert_eq!(
            legacy.fix.as_ref().unwrap().replacement,
            "Assert.That(sum, Is.EqualTo(5))"
        );
        let same = &result.diagnostics[1];
        assert_eq!(same.rule, Rule::SameActualExpectedValue);
        assert!(same.fix.is_none());
    }

    #[test]
    fn test_without_fixes() {
        let result = AnalysisEngine::new()
            .without_fixes()
            .analyze_source(SAMPLE, Path::new("Sample.cs"), None)
            .unwrap();
        assert!(result.diagnostics.iter().all(|d| d.fix.is_none()));
        assert_eq!(result.stats.fixable, 0);
    }

    #[test]
    fn test_apply_config_rule_off() {
        let config: Config =
            serde_json::from_str(r#"{ "rules": { "legacy-assert-usage": "off" } }"#).unwrap();
        let result = AnalysisEngine::new()
            .analyze_source(SAMPLE, Path::new("Sample.cs"), Some(&config))
            .unwrap();
        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.diagnostics[0].rule, Rule::SameActualExpectedValue);
    }

    #[test]
    fn test_apply_config_override_severity() {
        let config: Config = serde_json::from_str(
            r#"{
                "overrides": [
                    { "files": ["**/Critical/**"], "rules": { "same-actual-expected-value": "error" } }
                ]
            }"#,
        )
        .unwrap();
        let engine = AnalysisEngine::new();
        let plain = engine
            .analyze_source(SAMPLE, Path::new("Tests/Sample.cs"), Some(&config))
            .unwrap();
        let critical = engine
            .analyze_source(SAMPLE, Path::new("Tests/Critical/Sample.cs"), Some(&config))
            .unwrap();
        assert_eq!(plain.worst_severity(), Some(Severity::Warning));
        assert_eq!(critical.worst_severity(), Some(Severity::Error));
    }

    #[test]
    fn test_legacy_receivers_from_config() {
        let source = "class C { void M() { Assert.AreEqual(1, x); ClassicAssert.AreEqual(1, x); } }";
        let config: Config =
            serde_json::from_str(r#"{ "legacyReceivers": ["ClassicAssert"] }"#).unwrap();
        let engine = AnalysisEngine::new();
        let default = engine
            .analyze_source(source, Path::new("a.cs"), None)
            .unwrap();
        let narrowed = engine
            .analyze_source(source, Path::new("a.cs"), Some(&config))
            .unwrap();
        assert_eq!(default.diagnostics.len(), 2);
        assert_eq!(narrowed.diagnostics.len(), 1);
    }

    #[test]
    fn test_ignore_directive_suppresses() {
        let source = "class C {\n  void M() {\n    // constrain-ignore-next-line\n    ClassicAssert.AreEqual(1, x);\n    ClassicAssert.AreEqual(2, y);\n  }\n}";
        let result = AnalysisEngine::new()
            .analyze_source(source, Path::new("a.cs"), None)
            .unwrap();
        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.diagnostics[0].location.line, 5);
    }

    #[test]
    fn test_syntax_errors_do_not_abort() {
        let source = "class C { void M() { ClassicAssert.AreEqual(1, x); int = ; } ";
        let result = AnalysisEngine::new()
            .analyze_source(source, Path::new("broken.cs"), None)
            .unwrap();
        assert!(result.stats.has_syntax_errors);
    }

    #[test]
    fn test_analyze_parallel() {
        let a = make_source_file(SAMPLE);
        let b = make_source_file("class Empty {}");
        let paths = vec![a.path().to_path_buf(), b.path().to_path_buf()];
        let engine = AnalysisEngine::new();
        let results: Vec<AnalysisResult> = engine
            .analyze_parallel(&paths, None)
            .into_iter()
            .map(|r| r.unwrap())
            .collect();
        let stats = AnalysisEngine::aggregate_stats(&results);
        assert_eq!(
            stats,
            AggregateStats {
                files_analyzed: 2,
                legacy_assertions: 1,
                total_diagnostics: 2,
                fixable: 1,
            }
        );
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let err = AnalysisEngine::new()
            .analyze(Path::new("/definitely/not/here.cs"), None)
            .unwrap_err();
        assert!(err.to_string().contains("Failed to read source file"));
    }
}
