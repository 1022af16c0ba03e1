//! Config schema and deserialization

use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;

use crate::analyzer::resolver::DEFAULT_LEGACY_RECEIVERS;
use crate::Severity;

/// Rule severity override (error, warning, info, off)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleSeverity {
    Error,
    Warning,
    Info,
    /// Disable the rule entirely
    Off,
}

impl RuleSeverity {
    /// Convert to crate::Severity if not Off
    pub fn to_severity(self) -> Option<Severity> {
        match self {
            RuleSeverity::Error => Some(Severity::Error),
            RuleSeverity::Warning => Some(Severity::Warning),
            RuleSeverity::Info => Some(Severity::Info),
            RuleSeverity::Off => None,
        }
    }
}

/// Lowest severity that makes the run fail (exit code 1)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FailOn {
    Error,
    #[default]
    Warning,
    Info,
    /// Report only, always exit 0 when analysis succeeds
    Never,
}

impl FailOn {
    /// Whether a diagnostic of this severity fails the run
    pub fn is_triggered_by(self, severity: Severity) -> bool {
        match self {
            FailOn::Error => severity >= Severity::Error,
            FailOn::Warning => severity >= Severity::Warning,
            FailOn::Info => true,
            FailOn::Never => false,
        }
    }
}

impl FromStr for FailOn {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "error" => Ok(FailOn::Error),
            "warning" => Ok(FailOn::Warning),
            "info" => Ok(FailOn::Info),
            "never" => Ok(FailOn::Never),
            other => Err(format!(
                "unknown level '{}' (expected error, warning, info or never)",
                other
            )),
        }
    }
}

/// Per-path override configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigOverride {
    /// Glob patterns this override applies to
    pub files: Vec<String>,

    /// Optional rule overrides for matched files
    #[serde(default)]
    pub rules: HashMap<String, RuleSeverity>,
}

/// Root config structure for .constrainrc.json
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Extend another config file (path relative to this config)
    #[serde(default)]
    pub extends: Option<String>,

    /// Per-rule severity overrides. Key is the rule id in kebab-case.
    #[serde(default)]
    pub rules: HashMap<String, RuleSeverity>,

    /// Glob patterns for files/directories to exclude from analysis
    #[serde(default)]
    pub ignore: Vec<String>,

    /// File-name suffixes to analyze (default: .cs)
    #[serde(default)]
    pub file_patterns: Vec<String>,

    /// Receivers treated as classic-model assertion classes (default: ClassicAssert, Assert)
    #[serde(default)]
    pub legacy_receivers: Vec<String>,

    /// Lowest severity that fails the run (default: warning)
    #[serde(default)]
    pub fail_on: Option<FailOn>,

    /// Per-path configuration overrides
    #[serde(default)]
    pub overrides: Vec<ConfigOverride>,
}

impl Config {
    /// Merge CLI overrides into config. CLI values take precedence.
    pub fn merge_with_cli(mut self, cli_fail_on: Option<FailOn>) -> Self {
        if cli_fail_on.is_some() {
            self.fail_on = cli_fail_on;
        }
        self
    }

    /// Get the configured severity for a rule, or None if not in config
    pub fn rule_severity(&self, rule_id: &str) -> Option<RuleSeverity> {
        self.rules.get(rule_id).copied()
    }

    /// Get effective config for a specific file path, applying overrides
    pub fn effective_for_file(&self, file_path: &Path) -> EffectiveConfig {
        let mut effective = EffectiveConfig {
            rules: self.rules.clone(),
        };

        // Apply matching overrides in order
        for override_cfg in &self.overrides {
            if Self::matches_override(file_path, &override_cfg.files) {
                for (rule, severity) in &override_cfg.rules {
                    effective.rules.insert(rule.clone(), *severity);
                }
            }
        }

        effective
    }

    /// Check if a file path matches any of the override patterns
    fn matches_override(file_path: &Path, patterns: &[String]) -> bool {
        let path_str = file_path.to_string_lossy();
        for pattern in patterns {
            if let Ok(glob) = globset::Glob::new(pattern) {
                let matcher = glob.compile_matcher();
                if matcher.is_match(file_path)
                    || path_str.contains(pattern.trim_start_matches("**/"))
                {
                    return true;
                }
            }
        }
        false
    }

    /// Merge another config into this one (for extends)
    pub fn merge_from(&mut self, base: Config) {
        // Base values are overridden by this config's values
        if self.extends.is_none() {
            self.extends = base.extends;
        }
        if self.fail_on.is_none() {
            self.fail_on = base.fail_on;
        }

        // Merge rules (this config takes precedence)
        for (rule, severity) in base.rules {
            self.rules.entry(rule).or_insert(severity);
        }

        // Merge ignore patterns
        let mut all_ignores = base.ignore;
        all_ignores.append(&mut self.ignore);
        self.ignore = all_ignores;

        if self.file_patterns.is_empty() {
            self.file_patterns = base.file_patterns;
        }
        if self.legacy_receivers.is_empty() {
            self.legacy_receivers = base.legacy_receivers;
        }

        // Prepend base overrides
        let mut all_overrides = base.overrides;
        all_overrides.append(&mut self.overrides);
        self.overrides = all_overrides;
    }

    /// File-name suffixes to analyze
    pub fn get_file_patterns(&self) -> Vec<&str> {
        if self.file_patterns.is_empty() {
            vec![".cs"]
        } else {
            self.file_patterns.iter().map(|s| s.as_str()).collect()
        }
    }

    /// Receivers treated as classic-model assertion classes
    pub fn get_legacy_receivers(&self) -> Vec<String> {
        if self.legacy_receivers.is_empty() {
            DEFAULT_LEGACY_RECEIVERS
                .iter()
                .map(|r| r.to_string())
                .collect()
        } else {
            self.legacy_receivers.clone()
        }
    }

    pub fn get_fail_on(&self) -> FailOn {
        self.fail_on.unwrap_or_default()
    }
}

/// Effective configuration for a specific file (after applying overrides)
#[derive(Debug, Clone)]
pub struct EffectiveConfig {
    pub rules: HashMap<String, RuleSeverity>,
}
