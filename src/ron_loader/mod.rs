//! Utilities for loading RON files and watching directories for changes.
//!
//! `load_ron_files` reads every `.ron` file in a directory in file-name order,
//! and `RonWatcher` raises a shared flag when anything in the directory is
//! modified. Settings hot-reload is built on both.

use bevy::log::{debug, warn};
use bevy::prelude::Resource;
use notify::{Config, RecommendedWatcher, RecursiveMode, Watcher};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// File-watcher resource for RON hot-reload.
#[derive(Resource)]
pub struct RonWatcher {
    changed: Arc<AtomicBool>, // Set by the notify thread, cleared by `take_changed`.
    _watcher: Option<RecommendedWatcher>, // Kept alive so the OS watch is not dropped.
}

impl RonWatcher {
    /// A watcher with no OS backing; `take_changed` only reports manual
    /// `mark_changed` calls. Used when the real watcher cannot be created.
    #[must_use]
    pub fn stub() -> Self {
        RonWatcher {
            changed: Arc::new(AtomicBool::new(false)),
            _watcher: None,
        }
    }

    /// Whether a change was seen since the last call. Clears the flag.
    pub fn take_changed(&self) -> bool {
        self.changed.swap(false, Ordering::AcqRel)
    }

    pub fn mark_changed(&self) {
        self.changed.store(true, Ordering::Release);
    }

    #[must_use]
    pub fn is_live(&self) -> bool {
        self._watcher.is_some()
    }
}

/// Paths of the `.ron` files directly inside `path`, sorted by name.
fn ron_paths(path: &Path) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(path) else {
        debug!("no RON directory at {}", path.display());
        return Vec::new();
    };
    let mut paths: Vec<PathBuf> = entries
        .flatten()
        .map(|e| e.path())
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "ron"))
        .collect();
    paths.sort();
    paths
}

/// Load all `.ron` files from a directory and deserialize them into `T`.
///
/// # Arguments
/// * `path` - Directory path to scan for `.ron` files.
///
/// # Return
/// Every file that parsed, in file-name order. Files that cannot be read or
/// parsed are skipped with a warning.
#[must_use]
pub fn load_ron_files<T: DeserializeOwned>(path: &str) -> Vec<T> {
    let mut items = Vec::new();
    for file in ron_paths(Path::new(path)) {
        let content = match std::fs::read_to_string(&file) {
            Ok(c) => c,
            Err(e) => {
                warn!("failed to read {}: {e}", file.display());
                continue;
            }
        };
        match ron::from_str::<T>(&content) {
            Ok(item) => items.push(item),
            Err(e) => warn!("failed to parse {}: {e}", file.display()),
        }
    }
    items
}

/// Create a `RonWatcher` that watches a directory for modifications.
///
/// # Errors
/// Returns a `notify::Error` if the underlying file-watcher cannot be
/// created or the watcher cannot be registered for the provided path.
pub fn setup_ron_watcher(path: &str) -> Result<RonWatcher, notify::Error> {
    let changed = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&changed);
    let watched_path: PathBuf = std::fs::canonicalize(path).unwrap_or_else(|_| PathBuf::from(path));

    let mut watcher: RecommendedWatcher = Watcher::new(
        move |res: Result<notify::Event, notify::Error>| match res {
            Ok(event) => {
                if !matches!(event.kind, notify::EventKind::Modify(_) | notify::EventKind::Create(_)) {
                    return;
                }
                let relevant = event.paths.iter().any(|p| {
                    std::fs::canonicalize(p)
                        .unwrap_or_else(|_| p.clone())
                        .starts_with(&watched_path)
                });
                if relevant {
                    flag.store(true, Ordering::Release);
                }
            }
            Err(e) => warn!("watch error: {e}"),
        },
        Config::default(),
    )?;

    watcher.watch(Path::new(path), RecursiveMode::NonRecursive)?;
    Ok(RonWatcher { changed, _watcher: Some(watcher) })
}
