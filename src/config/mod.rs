//! Configuration loading for constrain

mod schema;

pub use schema::{Config, ConfigOverride, EffectiveConfig, FailOn, RuleSeverity};

use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILENAME: &str = ".constrainrc.json";

/// Build output directories that never hold sources worth rewriting
pub const ALWAYS_SKIPPED_DIRS: &[&str] = &["bin", "obj"];

/// Find and load config file with extends resolution. Searches current directory then parents.
pub fn load_config(work_dir: &Path, custom_path: Option<&Path>) -> Result<Config> {
    let path = if let Some(p) = custom_path {
        let path = if p.is_absolute() {
            p.to_path_buf()
        } else {
            work_dir.join(p)
        };
        if path.exists() {
            Some(path)
        } else {
            anyhow::bail!("Config file not found: {}", path.display());
        }
    } else {
        find_config_in_parents(work_dir)?
    };

    match path {
        Some(path) => load_config_with_extends(&path, &mut HashSet::new()),
        None => Ok(Config::default()),
    }
}

/// Load a config file and resolve extends chain
fn load_config_with_extends(config_path: &Path, visited: &mut HashSet<PathBuf>) -> Result<Config> {
    // Prevent circular extends
    let canonical = config_path
        .canonicalize()
        .unwrap_or_else(|_| config_path.to_path_buf());
    if visited.contains(&canonical) {
        anyhow::bail!(
            "Circular extends detected in config: {}",
            config_path.display()
        );
    }
    visited.insert(canonical.clone());

    let content = fs::read_to_string(config_path)
        .with_context(|| format!("Failed to read config: {}", config_path.display()))?;
    let mut config: Config = serde_json::from_str(&content)
        .with_context(|| format!("Invalid JSON in config: {}", config_path.display()))?;

    // Resolve extends
    if let Some(extends) = config.extends.take() {
        let base_config = resolve_extends(config_path, &extends, visited)?;
        config.merge_from(base_config);
    }

    Ok(config)
}

/// Resolve an extends reference to a config
fn resolve_extends(
    config_path: &Path,
    extends: &str,
    visited: &mut HashSet<PathBuf>,
) -> Result<Config> {
    let config_dir = config_path.parent().unwrap_or(Path::new("."));

    let extends_path = if Path::new(extends).is_absolute() {
        PathBuf::from(extends)
    } else {
        config_dir.join(extends)
    };

    // Ensure it has .json extension
    let extends_path = if extends_path.extension().is_none() {
        extends_path.with_extension("json")
    } else {
        extends_path
    };

    if !extends_path.exists() {
        anyhow::bail!(
            "Extended config not found: {} (referenced from {})",
            extends_path.display(),
            config_path.display()
        );
    }

    load_config_with_extends(&extends_path, visited)
}

/// Search for .constrainrc.json in directory and its parents
fn find_config_in_parents(mut dir: &Path) -> Result<Option<PathBuf>> {
    loop {
        let candidate = dir.join(CONFIG_FILENAME);
        if candidate.exists() {
            return Ok(Some(candidate));
        }
        dir = match dir.parent() {
            Some(p) => p,
            None => return Ok(None),
        };
    }
}

/// Build a GlobSet from ignore patterns for path matching
pub fn build_ignore_set(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob =
            Glob::new(pattern).with_context(|| format!("Invalid ignore pattern: {}", pattern))?;
        builder.add(glob);
    }
    builder.build().map_err(|e| anyhow::anyhow!("{}", e))
}

/// Check if a path should be ignored based on config glob patterns
pub fn is_ignored(path: &Path, ignore_set: &GlobSet) -> bool {
    ignore_set.is_match(path)
}

/// Check if a path lies inside a build output directory (bin/, obj/)
pub fn is_build_output(path: &Path) -> bool {
    path.components().any(|c| {
        c.as_os_str()
            .to_str()
            .is_some_and(|name| ALWAYS_SKIPPED_DIRS.contains(&name))
    })
}

/// Find the project root directory (containing a solution, .git, or config file)
pub fn find_project_root(start_dir: &Path) -> Option<PathBuf> {
    let mut dir = start_dir;
    loop {
        let has_solution = fs::read_dir(dir)
            .map(|entries| {
                entries.flatten().any(|e| {
                    e.path()
                        .extension()
                        .is_some_and(|ext| ext == "sln" || ext == "slnx")
                })
            })
            .unwrap_or(false);
        if has_solution || dir.join(".git").exists() || dir.join(CONFIG_FILENAME).exists() {
            return Some(dir.to_path_buf());
        }
        dir = dir.parent()?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_missing_config_is_default() {
        let dir = TempDir::new().unwrap();
        let config = load_config(dir.path(), None).unwrap();
        assert!(config.rules.is_empty());
        assert_eq!(config.get_file_patterns(), vec![".cs"]);
        assert_eq!(config.get_fail_on(), FailOn::Warning);
    }

    #[test]
    fn test_explicit_config_must_exist() {
        let dir = TempDir::new().unwrap();
        let err = load_config(dir.path(), Some(Path::new("nope.json"))).unwrap_err();
        assert!(err.to_string().contains("Config file not found"));
    }

    #[test]
    fn test_is_ignored_generated() {
        let set = build_ignore_set(&["**/*.g.cs".to_string()]).unwrap();
        assert!(is_ignored(Path::new("src/Api.g.cs"), &set));
        assert!(!is_ignored(Path::new("src/Api.cs"), &set));
    }

    #[test]
    fn test_build_output_is_skipped() {
        assert!(is_build_output(Path::new("Tests/bin/Debug/Gen.cs")));
        assert!(is_build_output(Path::new("Tests/obj/Gen.cs")));
        assert!(!is_build_output(Path::new("Tests/binary/Gen.cs")));
    }

    #[test]
    fn test_config_extends() {
        let dir = TempDir::new().unwrap();

        let base_path = dir.path().join("base.json");
        let mut base_file = fs::File::create(&base_path).unwrap();
        writeln!(
            base_file,
            r#"{{
                "failOn": "error",
                "rules": {{ "same-actual-expected-value": "error" }},
                "ignore": ["**/Generated/**"],
                "legacyReceivers": ["ClassicAssert"]
            }}"#
        )
        .unwrap();

        let child_path = dir.path().join(".constrainrc.json");
        let mut child_file = fs::File::create(&child_path).unwrap();
        writeln!(
            child_file,
            r#"{{
                "extends": "./base.json",
                "rules": {{ "legacy-assert-usage": "info" }}
            }}"#
        )
        .unwrap();

        let config = load_config(dir.path(), None).unwrap();

        assert_eq!(config.get_fail_on(), FailOn::Error);
        assert_eq!(
            config.rule_severity("legacy-assert-usage"),
            Some(RuleSeverity::Info)
        );
        assert_eq!(
            config.rule_severity("same-actual-expected-value"),
            Some(RuleSeverity::Error)
        );
        assert!(config.ignore.contains(&"**/Generated/**".to_string()));
        assert_eq!(config.get_legacy_receivers(), vec!["ClassicAssert"]);
    }

    #[test]
    fn test_circular_extends_is_rejected() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.json"), r#"{ "extends": "./b.json" }"#).unwrap();
        fs::write(dir.path().join("b.json"), r#"{ "extends": "./a.json" }"#).unwrap();
        fs::write(
            dir.path().join(CONFIG_FILENAME),
            r#"{ "extends": "./a.json" }"#,
        )
        .unwrap();
        let err = load_config(dir.path(), None).unwrap_err();
        assert!(format!("{:#}", err).contains("Circular extends"));
    }

    #[test]
    fn test_config_overrides() {
        let config: Config = serde_json::from_str(
            r#"{
                "rules": { "legacy-assert-usage": "error" },
                "overrides": [
                    {
                        "files": ["**/Legacy/**"],
                        "rules": { "legacy-assert-usage": "off" }
                    }
                ]
            }"#,
        )
        .unwrap();

        let effective = config.effective_for_file(Path::new("Tests/MathTests.cs"));
        assert_eq!(
            effective.rules.get("legacy-assert-usage"),
            Some(&RuleSeverity::Error)
        );

        let effective = config.effective_for_file(Path::new("Tests/Legacy/OldTests.cs"));
        assert_eq!(
            effective.rules.get("legacy-assert-usage"),
            Some(&RuleSeverity::Off)
        );
    }

    #[test]
    fn test_fail_on_levels() {
        assert!(FailOn::Warning.is_triggered_by(crate::Severity::Error));
        assert!(!FailOn::Error.is_triggered_by(crate::Severity::Warning));
        assert!(!FailOn::Never.is_triggered_by(crate::Severity::Error));
        assert_eq!("INFO".parse::<FailOn>(), Ok(FailOn::Info));
        assert!("loud".parse::<FailOn>().is_err());
    }
}
