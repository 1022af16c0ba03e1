//! JSON reporter for machine-readable output

use crate::analyzer::engine::AggregateStats;
use crate::AnalysisResult;
use serde::Serialize;

/// Reporter for JSON output
pub struct JsonReporter {
    /// Whether to pretty-print JSON
    pretty: bool,
}

impl JsonReporter {
    /// Create a new JSON reporter
    pub fn new() -> Self {
        Self { pretty: false }
    }

    /// Enable pretty-printing
    pub fn pretty(mut self) -> Self {
        self.pretty = true;
        self
    }

    fn render<T: Serialize + ?Sized>(&self, value: &T, fallback: &str) -> String {
        let rendered = if self.pretty {
            serde_json::to_string_pretty(value)
        } else {
            serde_json::to_string(value)
        };
        rendered.unwrap_or_else(|_| fallback.to_string())
    }

    /// Report a single analysis result as JSON
    pub fn report(&self, result: &AnalysisResult) -> String {
        self.render(result, "{}")
    }

    /// Report multiple results as JSON array
    pub fn report_many(&self, results: &[AnalysisResult]) -> String {
        self.render(results, "[]")
    }

    /// Report with summary
    pub fn report_with_summary(
        &self,
        results: &[AnalysisResult],
        stats: &AggregateStats,
    ) -> String {
        let output = JsonOutput {
            results,
            summary: JsonSummary {
                files_analyzed: stats.files_analyzed,
                legacy_assertions: stats.legacy_assertions,
                total_diagnostics: stats.total_diagnostics,
                fixable: stats.fixable,
            },
        };
        self.render(&output, "{}")
    }
}

impl Default for JsonReporter {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonOutput<'a> {
    results: &'a [AnalysisResult],
    summary: JsonSummary,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonSummary {
    files_analyzed: usize,
    legacy_assertions: usize,
    total_diagnostics: usize,
    fixable: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Diagnostic, FileStats, Location, Rule};
    use std::path::PathBuf;

    fn make_result(path: &str) -> AnalysisResult {
        AnalysisResult {
            file_path: PathBuf::from(path),
            diagnostics: vec![],
            stats: FileStats {
                invocations: 4,
                ..FileStats::default()
            },
        }
    }

    #[test]
    fn test_json_single_result_has_expected_keys() {
        let mut result = make_result("MathTests.cs");
        result.diagnostics.push(
            Diagnostic::new(
                Rule::SameActualExpectedValue,
                Location::new(5, 20).with_bytes(100, 101),
                vec!["x".to_string()],
            ),
        );

        let json = JsonReporter::new().report(&result);
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed["filePath"], "MathTests.cs");
        assert_eq!(parsed["stats"]["invocations"], 4);
        let diagnostics = parsed["diagnostics"].as_array().unwrap();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0]["rule"], "same-actual-expected-value");
        assert_eq!(diagnostics[0]["severity"], "warning");
        assert_eq!(diagnostics[0]["messageArgs"][0], "x");
        assert_eq!(diagnostics[0]["location"]["startByte"], 100);
        assert!(diagnostics[0].get("fix").is_none());
    }

    #[test]
    fn test_json_pretty_output() {
        let json = JsonReporter::new().pretty().report(&make_result("A.cs"));
        assert!(json.contains('\n'), "pretty JSON should have newlines");
        assert!(json.contains("  "), "pretty JSON should have indentation");
    }

    #[test]
    fn test_json_report_many() {
        let reporter = JsonReporter::new();
        let json = reporter.report_many(&[make_result("A.cs"), make_result("B.cs")]);
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();

        let arr = parsed.as_array().unwrap();
        assert_eq!(arr.len(), 2);
        assert_eq!(arr[0]["filePath"], "A.cs");
        assert_eq!(arr[1]["filePath"], "B.cs");
    }

    #[test]
    fn test_json_report_with_summary() {
        let stats = AggregateStats {
            files_analyzed: 2,
            legacy_assertions: 3,
            total_diagnostics: 4,
            fixable: 2,
        };

        let reporter = JsonReporter::new();
        let json = reporter.report_with_summary(&[make_result("A.cs"), make_result("B.cs")], &stats);
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();

        let summary = &parsed["summary"];
        assert_eq!(summary["filesAnalyzed"], 2);
        assert_eq!(summary["legacyAssertions"], 3);
        assert_eq!(summary["totalDiagnostics"], 4);
        assert_eq!(summary["fixable"], 2);
        assert_eq!(parsed["results"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_json_report_many_empty() {
        let json = JsonReporter::new().report_many(&[]);
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(parsed.as_array().unwrap().is_empty());
    }
}
