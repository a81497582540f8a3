//! Directory walker producing key paths
//!
//! Turns a directory tree into `(key path, file path)` pairs: each key path
//! holds the file's path components relative to the root, NFC-normalised so
//! that visually identical names compare equal. The pairs feed
//! [`LeveledMap::from_pairs`].

use crate::config::WalkConfig;
use crate::error::LoadError;
use crate::key::Key;
use crate::leveled::LeveledMap;
use crate::shape::Shape;
use std::path::{Component, Path, PathBuf};
use tracing::debug;
use unicode_normalization::UnicodeNormalization;
use walkdir::{DirEntry, WalkDir};

/// Filesystem walker
pub struct DirectoryWalker {
    root: PathBuf,
    config: WalkConfig,
}

impl DirectoryWalker {
    /// Create a new walker for the given root path
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_config(root, WalkConfig::default())
    }

    /// Create a walker with custom configuration
    pub fn with_config(root: impl Into<PathBuf>, config: WalkConfig) -> Self {
        Self {
            root: root.into(),
            config,
        }
    }

    /// Every file below the root, sorted by key path
    pub fn entries(&self) -> Result<Vec<(Vec<Key>, PathBuf)>, LoadError> {
        self.collect(None)
    }

    /// Files exactly `shape.levels()` components below the root, as a map
    pub fn leveled(&self, shape: Shape) -> Result<LeveledMap<PathBuf>, LoadError> {
        let pairs = self.collect(Some(shape.levels()))?;
        let map = LeveledMap::from_pairs(pairs, shape)?;
        debug!(root = %self.root.display(), dim = ?map.dim(), "Built map from directory");
        Ok(map)
    }

    fn collect(&self, depth: Option<usize>) -> Result<Vec<(Vec<Key>, PathBuf)>, LoadError> {
        let root = canonical_root(&self.root)?;

        let mut walker = WalkDir::new(&root).follow_links(self.config.follow_symlinks);
        // filter_entry has to see every level above the leaves
        if let Some(depth) = depth {
            walker = walker.max_depth(depth);
        }

        let mut pairs = Vec::new();
        let entries = walker
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !self.should_ignore(entry));
        for entry in entries {
            let entry = entry.map_err(|e| {
                LoadError::Io(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    format!("Failed to walk directory: {}", e),
                ))
            })?;
            if !entry.file_type().is_file() || depth.is_some_and(|d| entry.depth() != d) {
                continue;
            }

            let relative = entry
                .path()
                .strip_prefix(&root)
                .map_err(|e| LoadError::InvalidPath(e.to_string()))?;
            pairs.push((self.key_path(relative), entry.path().to_path_buf()));
        }

        pairs.sort_by(|(a, _), (b, _)| a.cmp(b));
        debug!(root = %root.display(), files = pairs.len(), "Walked directory");
        Ok(pairs)
    }

    fn key_path(&self, relative: &Path) -> Vec<Key> {
        relative
            .components()
            .filter_map(|component| match component {
                Component::Normal(name) => Some(name.to_string_lossy()),
                _ => None,
            })
            .map(|name| {
                if self.config.normalize_unicode {
                    Key::from(name.nfc().collect::<String>())
                } else {
                    Key::from(name.into_owned())
                }
            })
            .collect()
    }

    /// Check if an entry should be ignored based on ignore patterns
    fn should_ignore(&self, entry: &DirEntry) -> bool {
        let name = entry.file_name().to_string_lossy();
        self.config
            .ignore_patterns
            .iter()
            .any(|pattern| matches_pattern(pattern, &name))
    }
}

/// Exact match, `*suffix` or `prefix*`
fn matches_pattern(pattern: &str, name: &str) -> bool {
    if let Some(suffix) = pattern.strip_prefix('*') {
        name.ends_with(suffix)
    } else if let Some(prefix) = pattern.strip_suffix('*') {
        name.starts_with(prefix)
    } else {
        name == pattern
    }
}

fn canonical_root(root: &Path) -> Result<PathBuf, LoadError> {
    let canonical = dunce::canonicalize(root).map_err(|e| {
        LoadError::InvalidPath(format!(
            "Failed to canonicalize {}: {}",
            root.display(),
            e
        ))
    })?;
    if !canonical.is_dir() {
        return Err(LoadError::InvalidPath(format!(
            "{} is not a directory",
            canonical.display()
        )));
    }
    Ok(canonical)
}
