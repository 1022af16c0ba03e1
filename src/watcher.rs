//! File system watcher for watch mode

use crate::config::is_build_output;
use notify::{Config, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver};
use std::time::Duration;

const DEBOUNCE_MS: u64 = 300;

/// Watches a directory for C# source changes and emits paths on a channel
pub struct SourceWatcher {
    _watcher: RecommendedWatcher,
    receiver: Receiver<notify::Result<notify::Event>>,
    file_patterns: Vec<String>,
}

fn is_create_or_modify(kind: &EventKind) -> bool {
    matches!(kind, EventKind::Create(_) | EventKind::Modify(_))
}

/// Check if the path is a source file we care about: matching suffix, outside bin/ and obj/
pub fn is_source_file(p: &Path, file_patterns: &[String]) -> bool {
    let name = match p.file_name().and_then(|n| n.to_str()) {
        Some(n) => n,
        None => return false,
    };
    if is_build_output(p) {
        return false;
    }
    file_patterns.iter().any(|suffix| name.ends_with(suffix.as_str()))
}

impl SourceWatcher {
    /// Start watching the given path (file or directory)
    pub fn watch(path: &Path, file_patterns: &[&str]) -> notify::Result<Self> {
        let (tx, rx) = channel();
        let mut watcher = RecommendedWatcher::new(
            move |res| {
                let _ = tx.send(res);
            },
            Config::default().with_poll_interval(Duration::from_millis(DEBOUNCE_MS)),
        )?;

        if path.is_dir() {
            watcher.watch(path, RecursiveMode::Recursive)?;
        } else if let Some(parent) = path.parent() {
            watcher.watch(parent, RecursiveMode::Recursive)?;
        }

        Ok(Self {
            _watcher: watcher,
            receiver: rx,
            file_patterns: file_patterns.iter().map(|s| s.to_string()).collect(),
        })
    }

    /// Collect source paths from an event
    fn paths_from_event(&self, event: &notify::Event) -> Vec<PathBuf> {
        paths_from_event(event, &self.file_patterns)
    }

    /// Wait for the next batch of changes (debounced). Blocks until at least one change, then drains for DEBOUNCE_MS.
    pub fn next_changes(&self) -> Vec<PathBuf> {
        let mut all = std::collections::HashSet::new();

        match self.receiver.recv_timeout(Duration::from_secs(3600)) {
            Ok(Ok(event)) => {
                for p in self.paths_from_event(&event) {
                    all.insert(p);
                }
            }
            Ok(Err(err)) => {
                tracing::warn!("watch error: {}", err);
                return vec![];
            }
            Err(_) => return vec![],
        }

        // Debounce: collect further events for a short time
        std::thread::sleep(Duration::from_millis(DEBOUNCE_MS));
        while let Ok(ev) = self.receiver.try_recv() {
            if let Ok(event) = ev {
                for p in self.paths_from_event(&event) {
                    all.insert(p);
                }
            }
        }

        let mut changed: Vec<PathBuf> = all.into_iter().collect();
        changed.sort();
        changed
    }
}

fn paths_from_event(event: &notify::Event, file_patterns: &[String]) -> Vec<PathBuf> {
    if !is_create_or_modify(&event.kind) {
        return vec![];
    }
    event
        .paths
        .iter()
        .filter(|p| is_source_file(p, file_patterns))
        .cloned()
        .collect()
}
