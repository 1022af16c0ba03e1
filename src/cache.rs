//! Analysis result caching for performance
//!
//! Caches analysis results based on file content hash to avoid re-analyzing unchanged files.

use crate::config::Config;
use crate::AnalysisResult;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

const CACHE_VERSION: u32 = 2;
pub const CACHE_FILENAME: &str = ".constrain-cache.json";

/// Cache entry for a single file
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheEntry {
    /// SHA256 hash of the file content
    content_hash: String,
    /// Cached analysis result
    result: AnalysisResult,
    /// Timestamp when cached
    cached_at: u64,
}

/// Analysis cache
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheData {
    /// Cache format version
    version: u32,
    /// Fingerprint of the settings the entries were computed with
    #[serde(default)]
    settings: String,
    /// Map of file path to cache entry
    entries: HashMap<String, CacheEntry>,
}

impl Default for CacheData {
    fn default() -> Self {
        Self {
            version: CACHE_VERSION,
            settings: String::new(),
            entries: HashMap::new(),
        }
    }
}

/// Cache manager for analysis results
pub struct AnalysisCache {
    /// Path to the cache file
    cache_path: PathBuf,
    /// Cached data
    data: CacheData,
    /// Whether the cache has been modified
    dirty: bool,
    /// Whether caching is enabled
    enabled: bool,
}

impl AnalysisCache {
    /// Create a new cache manager
    pub fn new(project_root: &Path) -> Self {
        let cache_path = project_root.join(CACHE_FILENAME);
        let data = Self::load_cache(&cache_path).unwrap_or_default();

        Self {
            cache_path,
            data,
            dirty: false,
            enabled: true,
        }
    }

    /// Drop every entry computed under different settings (config or tool version)
    pub fn with_settings(mut self, fingerprint: &str) -> Self {
        if self.data.settings != fingerprint {
            if !self.data.entries.is_empty() {
                tracing::debug!("settings changed; discarding cached results");
                self.data.entries.clear();
                self.dirty = true;
            }
            self.data.settings = fingerprint.to_string();
        }
        self
    }

    /// Create a disabled cache (no-op)
    pub fn disabled() -> Self {
        Self {
            cache_path: PathBuf::new(),
            data: CacheData::default(),
            dirty: false,
            enabled: false,
        }
    }

    /// Load cache from disk
    fn load_cache(path: &Path) -> Option<CacheData> {
        let content = fs::read_to_string(path).ok()?;
        let data: CacheData = serde_json::from_str(&content).ok()?;

        // Check version compatibility
        if data.version != CACHE_VERSION {
            return None;
        }

        Some(data)
    }

    /// Save cache to disk
    pub fn save(&self) -> Result<()> {
        if !self.enabled || !self.dirty {
            return Ok(());
        }

        let content =
            serde_json::to_string_pretty(&self.data).context("Failed to serialize cache")?;
        fs::write(&self.cache_path, content)
            .with_context(|| format!("Failed to write cache to {}", self.cache_path.display()))?;

        Ok(())
    }

    /// Compute SHA256 hash of file content
    fn hash_content(content: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(content.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Get cached result if still valid
    pub fn get(&self, path: &Path, content: &str) -> Option<AnalysisResult> {
        if !self.enabled {
            return None;
        }

        let key = path.to_string_lossy().to_string();
        let entry = self.data.entries.get(&key)?;

        if entry.content_hash != Self::hash_content(content) {
            return None;
        }

        Some(entry.result.clone())
    }

    /// Store analysis result in cache
    pub fn set(&mut self, path: &Path, content: &str, result: AnalysisResult) {
        if !self.enabled {
            return;
        }

        let key = path.to_string_lossy().to_string();
        let entry = CacheEntry {
            content_hash: Self::hash_content(content),
            result,
            cached_at: SystemTime::now()
                .duration_since(SystemTime::UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(0),
        };

        self.data.entries.insert(key, entry);
        self.dirty = true;
    }

    /// Remove stale entries for files that no longer exist
    pub fn cleanup(&mut self, existing_files: &[PathBuf]) {
        if !self.enabled {
            return;
        }

        let existing_set: std::collections::HashSet<String> = existing_files
            .iter()
            .map(|p| p.to_string_lossy().to_string())
            .collect();

        self.data.entries.retain(|k, _| existing_set.contains(k));
        self.dirty = true;
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.data.entries.len(),
            enabled: self.enabled,
        }
    }

    /// Clear all cached entries
    pub fn clear(&mut self) {
        self.data.entries.clear();
        self.dirty = true;
    }
}

/// Cache statistics
#[derive(Debug)]
pub struct CacheStats {
    pub entries: usize,
    pub enabled: bool,
}

/// Fingerprint of everything besides file content that changes analysis output
pub fn settings_fingerprint(config: &Config) -> String {
    let mut rules: Vec<String> = config
        .rules
        .iter()
        .map(|(id, severity)| format!("{}={:?}", id, severity))
        .collect();
    rules.sort();

    let mut overrides = Vec::new();
    for o in &config.overrides {
        let mut o_rules: Vec<String> = o
            .rules
            .iter()
            .map(|(id, severity)| format!("{}={:?}", id, severity))
            .collect();
        o_rules.sort();
        overrides.push(format!("{}:{}", o.files.join(","), o_rules.join(",")));
    }

    let canonical = format!(
        "{}|{}|{}|{}",
        env!("CARGO_PKG_VERSION"),
        rules.join(","),
        config.get_legacy_receivers().join(","),
        overrides.join(";")
    );
    AnalysisCache::hash_content(&canonical)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FileStats;

    fn make_result(path: &str) -> AnalysisResult {
        AnalysisResult {
            file_path: PathBuf::from(path),
            diagnostics: vec![],
            stats: FileStats {
                invocations: 3,
                ..FileStats::default()
            },
        }
    }

    #[test]
    fn test_hash_content() {
        let hash1 = AnalysisCache::hash_content("test content");
        let hash2 = AnalysisCache::hash_content("test content");
        let hash3 = AnalysisCache::hash_content("different content");

        assert_eq!(hash1, hash2);
        assert_ne!(hash1, hash3);
    }

    #[test]
    fn test_cache_disabled_set_noop() {
        let mut cache = AnalysisCache::disabled();
        cache.set(Path::new("A.cs"), "content", make_result("A.cs"));
        assert!(cache.get(Path::new("A.cs"), "content").is_none());
        assert!(!cache.dirty, "disabled cache should not become dirty");
        assert!(!cache.stats().enabled);
    }

    #[test]
    fn test_cache_roundtrip_hit_and_miss() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut cache = AnalysisCache::new(dir.path());

        cache.set(Path::new("A.cs"), "class A {}", make_result("A.cs"));
        assert!(cache.dirty, "cache should be dirty after set");

        let cached = cache.get(Path::new("A.cs"), "class A {}").unwrap();
        assert_eq!(cached.stats.invocations, 3);
        assert!(
            cache.get(Path::new("A.cs"), "class A { }").is_none(),
            "cache should miss when content changes"
        );
    }

    #[test]
    fn test_cache_save_and_load() {
        let dir = tempfile::TempDir::new().unwrap();

        {
            let mut cache = AnalysisCache::new(dir.path()).with_settings("s1");
            cache.set(Path::new("A.cs"), "content", make_result("A.cs"));
            cache.save().unwrap();
        }
        assert!(dir.path().join(CACHE_FILENAME).exists());

        {
            let cache = AnalysisCache::new(dir.path()).with_settings("s1");
            assert!(cache.get(Path::new("A.cs"), "content").is_some());
        }

        {
            let cache = AnalysisCache::new(dir.path()).with_settings("s2");
            assert!(
                cache.get(Path::new("A.cs"), "content").is_none(),
                "changed settings invalidate entries"
            );
        }
    }

    #[test]
    fn test_cache_clear_and_cleanup() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut cache = AnalysisCache::new(dir.path());
        cache.set(Path::new("A.cs"), "a", make_result("A.cs"));
        cache.set(Path::new("B.cs"), "b", make_result("B.cs"));
        assert_eq!(cache.stats().entries, 2);

        cache.cleanup(&[PathBuf::from("A.cs")]);
        assert_eq!(cache.stats().entries, 1);
        assert!(cache.get(Path::new("B.cs"), "b").is_none());

        cache.clear();
        assert_eq!(cache.stats().entries, 0);
    }

    #[test]
    fn test_settings_fingerprint_tracks_rules() {
        let plain = Config::default();
        let tuned: Config =
            serde_json::from_str(r#"{ "rules": { "legacy-assert-usage": "error" } }"#).unwrap();
        assert_eq!(settings_fingerprint(&plain), settings_fingerprint(&plain.clone()));
        assert_ne!(settings_fingerprint(&plain), settings_fingerprint(&tuned));
    }
}
