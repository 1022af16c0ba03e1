//! Constrain: classic-to-constraint assertion migrator for NUnit
//!
//! This library scans C# test files for legacy classic-model assertions
//! (`ClassicAssert.AreEqual(expected, actual)`) and rewrites them into the
//! constraint model (`Assert.That(actual, Is.EqualTo(expected))`). It also flags
//! constraint-model assertions whose expected value is the actual value itself.

pub mod analyzer;
pub mod cache;
pub mod config;
pub mod fixer;
pub mod parser;
pub mod reporter;
pub mod watcher;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::analyzer::descriptors;

/// The main result of analyzing a C# source file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// Path to the analyzed file
    pub file_path: PathBuf,
    /// Diagnostics reported for this file
    pub diagnostics: Vec<Diagnostic>,
    /// Statistics about the scan
    pub stats: FileStats,
}

impl AnalysisResult {
    /// Diagnostics that carry an auto-fix
    pub fn fixable(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.fix.is_some())
    }

    /// Highest severity among the diagnostics, if any
    pub fn worst_severity(&self) -> Option<Severity> {
        self.diagnostics.iter().map(|d| d.severity).max()
    }
}

/// Statistics about one scanned file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileStats {
    /// Number of invocation expressions visited
    pub invocations: usize,
    /// Number of classic-model assertions matched against the catalog
    pub legacy_assertions: usize,
    /// Number of constraint-model assertions inspected for duplicate values
    pub constraint_assertions: usize,
    /// Number of diagnostics with an auto-fix attached
    pub fixable: usize,
    /// Whether tree-sitter recovered from syntax errors while parsing
    pub has_syntax_errors: bool,
}

/// A diagnostic reported during analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    /// Rule that reported this diagnostic
    pub rule: Rule,
    /// Severity of the diagnostic
    pub severity: Severity,
    /// Human-readable message, rendered from the rule descriptor
    pub message: String,
    /// Arguments the message was rendered from
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub message_args: Vec<String>,
    /// Location in the file
    pub location: Location,
    /// Title of the fix that applies to this diagnostic (if any)
    pub suggestion: Option<String>,
    /// Auto-fix: replacement text and range (when applicable)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fix: Option<Fix>,
}

impl Diagnostic {
    /// Build a diagnostic from the descriptor registry: message and default severity
    /// come from the rule's descriptor.
    pub fn new(rule: Rule, location: Location, message_args: Vec<String>) -> Self {
        let descriptor = descriptors::descriptor(rule);
        Self {
            rule,
            severity: descriptor.default_severity,
            message: descriptor.format_message(&message_args),
            message_args,
            location,
            suggestion: None,
            fix: None,
        }
    }

    pub fn with_suggestion(mut self, title: &str) -> Self {
        self.suggestion = Some(title.to_string());
        self
    }
}

/// A single auto-fix edit: replace the range with the replacement text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fix {
    /// Stable, user-facing title of the fix
    pub title: String,
    /// Start byte offset (inclusive)
    pub start_byte: usize,
    /// End byte offset (exclusive)
    pub end_byte: usize,
    /// Start line (1-indexed)
    pub start_line: usize,
    /// Start column (1-indexed)
    pub start_column: usize,
    /// End line (1-indexed)
    pub end_line: usize,
    /// End column (1-indexed)
    pub end_column: usize,
    /// Replacement text
    pub replacement: String,
}

/// Severity levels for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}

/// Analysis rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Rule {
    /// Classic-model assertion that has a constraint-model equivalent
    LegacyAssertUsage,
    /// Constraint-model assertion whose expected value repeats the actual value
    SameActualExpectedValue,
}

impl Rule {
    pub const ALL: [Rule; 2] = [Rule::LegacyAssertUsage, Rule::SameActualExpectedValue];

    /// Stable identifier used in config files, ignore directives and reports
    pub fn id(&self) -> &'static str {
        match self {
            Rule::LegacyAssertUsage => "legacy-assert-usage",
            Rule::SameActualExpectedValue => "same-actual-expected-value",
        }
    }

    /// Parse a stable rule identifier
    pub fn from_id(id: &str) -> Option<Rule> {
        Rule::ALL.into_iter().find(|r| r.id() == id)
    }
}

impl std::fmt::Display for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id())
    }
}

/// Location in a source file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    /// Line number (1-indexed)
    pub line: usize,
    /// Column number (1-indexed)
    pub column: usize,
    /// End line (optional)
    pub end_line: Option<usize>,
    /// End column (optional)
    pub end_column: Option<usize>,
    /// Start byte offset of the anchored node
    #[serde(default)]
    pub start_byte: usize,
    /// End byte offset of the anchored node
    #[serde(default)]
    pub end_byte: usize,
}

impl Location {
    pub fn new(line: usize, column: usize) -> Self {
        Self {
            line,
            column,
            end_line: None,
            end_column: None,
            start_byte: 0,
            end_byte: 0,
        }
    }

    pub fn with_end(mut self, end_line: usize, end_column: usize) -> Self {
        self.end_line = Some(end_line);
        self.end_column = Some(end_column);
        self
    }

    pub fn with_bytes(mut self, start_byte: usize, end_byte: usize) -> Self {
        self.start_byte = start_byte;
        self.end_byte = end_byte;
        self
    }
}

/// Public API: analyze a single C# file. Used by the CLI and other programmatic consumers.
///
/// * `path` - path to the source file
/// * `work_dir` - project root (for config lookup)
/// * `config_path` - optional path to .constrainrc.json; if None, searches from work_dir
pub fn analyze_file(
    path: &std::path::Path,
    work_dir: &std::path::Path,
    config_path: Option<&std::path::Path>,
) -> anyhow::Result<AnalysisResult> {
    let config = crate::config::load_config(work_dir, config_path)?;
    let engine = crate::analyzer::AnalysisEngine::new();
    engine.analyze(path, Some(&config))
}
