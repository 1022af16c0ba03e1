//! SARIF 2.1 reporter for GitHub Code Scanning / VS Code SARIF viewer

use crate::analyzer::descriptors;
use crate::analyzer::engine::AggregateStats;
use crate::{AnalysisResult, Fix, Severity};
use serde::Serialize;
use std::path::Path;

/// SARIF 2.1.0 minimal structure for one run
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifLog {
    #[serde(rename = "$schema")]
    schema: String,
    version: String,
    runs: Vec<SarifRun>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifRun {
    tool: SarifTool,
    results: Vec<SarifResult>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifTool {
    driver: SarifDriver,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifDriver {
    name: String,
    version: String,
    rules: Vec<SarifRule>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifRule {
    id: String,
    name: String,
    short_description: SarifMessage,
    full_description: Option<SarifMessage>,
    default_configuration: SarifDefaultConfig,
    properties: SarifRuleProperties,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifRuleProperties {
    category: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifMessage {
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifDefaultConfig {
    level: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifResult {
    rule_id: String,
    rule_index: usize,
    level: String,
    message: SarifMessage,
    locations: Vec<SarifLocation>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    fixes: Vec<SarifFix>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifLocation {
    physical_location: SarifPhysicalLocation,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifPhysicalLocation {
    artifact_location: SarifArtifactLocation,
    region: SarifRegion,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifArtifactLocation {
    uri: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifRegion {
    start_line: usize,
    start_column: Option<usize>,
    end_line: Option<usize>,
    end_column: Option<usize>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifFix {
    description: SarifMessage,
    artifact_changes: Vec<SarifArtifactChange>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifArtifactChange {
    artifact_location: SarifArtifactLocation,
    replacements: Vec<SarifReplacement>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifReplacement {
    deleted_region: SarifRegion,
    inserted_content: SarifInsertedContent,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifInsertedContent {
    text: String,
}

fn severity_to_level(s: Severity) -> &'static str {
    match s {
        Severity::Error => "error",
        Severity::Warning => "warning",
        Severity::Info => "note",
    }
}

/// Convert a path to a URI (file://)
fn path_to_uri(p: &Path) -> String {
    let path = p.to_string_lossy();
    let path = path.replace('\\', "/");
    if path.starts_with('/') {
        format!("file://{}", path)
    } else {
        format!("file:///{}", path)
    }
}

fn sarif_fix(fix: &Fix, uri: &str) -> SarifFix {
    SarifFix {
        description: SarifMessage {
            text: fix.title.clone(),
        },
        artifact_changes: vec![SarifArtifactChange {
            artifact_location: SarifArtifactLocation {
                uri: uri.to_string(),
            },
            replacements: vec![SarifReplacement {
                deleted_region: SarifRegion {
                    start_line: fix.start_line,
                    start_column: Some(fix.start_column),
                    end_line: Some(fix.end_line),
                    end_column: Some(fix.end_column),
                },
                inserted_content: SarifInsertedContent {
                    text: fix.replacement.clone(),
                },
            }],
        }],
    }
}

/// SARIF reporter for GitHub Code Scanning integration
pub struct SarifReporter;

impl SarifReporter {
    pub fn new() -> Self {
        Self
    }

    /// Produce SARIF 2.1 JSON for one or more analysis results
    pub fn report(&self, results: &[AnalysisResult], _stats: Option<&AggregateStats>) -> String {
        let registry = descriptors::all();
        let rules: Vec<SarifRule> = registry
            .iter()
            .map(|d| SarifRule {
                id: d.id.to_string(),
                name: d.title.to_string(),
                short_description: SarifMessage {
                    text: d.title.to_string(),
                },
                full_description: Some(SarifMessage {
                    text: d.description.to_string(),
                }),
                default_configuration: SarifDefaultConfig {
                    level: severity_to_level(d.default_severity).to_string(),
                },
                properties: SarifRuleProperties {
                    category: d.category.to_string(),
                },
            })
            .collect();

        let mut sarif_results = Vec::new();
        for result in results {
            let file_uri = path_to_uri(&result.file_path);
            for d in &result.diagnostics {
                sarif_results.push(SarifResult {
                    rule_id: d.rule.to_string(),
                    rule_index: registry.iter().position(|r| r.rule == d.rule).unwrap_or(0),
                    level: severity_to_level(d.severity).to_string(),
                    message: SarifMessage {
                        text: d.message.clone(),
                    },
                    locations: vec![SarifLocation {
                        physical_location: SarifPhysicalLocation {
                            artifact_location: SarifArtifactLocation {
                                uri: file_uri.clone(),
                            },
                            region: SarifRegion {
                                start_line: d.location.line,
                                start_column: Some(d.location.column),
                                end_line: d.location.end_line,
                                end_column: d.location.end_column,
                            },
                        },
                    }],
                    fixes: d
                        .fix
                        .iter()
                        .map(|fix| sarif_fix(fix, &file_uri))
                        .collect(),
                });
            }
        }

        let run = SarifRun {
            tool: SarifTool {
                driver: SarifDriver {
                    name: "constrain".to_string(),
                    version: env!("CARGO_PKG_VERSION").to_string(),
                    rules,
                },
            },
            results: sarif_results,
        };

        let log = SarifLog {
            schema: "https://raw.githubusercontent.com/oasis-tcs/sarif-spec/master/Schemata/sarif-schema-2.1.0.json".to_string(),
            version: "2.1.0".to_string(),
            runs: vec![run],
        };

        serde_json::to_string_pretty(&log).unwrap_or_else(|_| "{}".to_string())
    }
}

impl Default for SarifReporter {
    fn default() -> Self {
        Self::new()
    }
}
