// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Walker
//!
//! Depth-first directory traversal that turns a root path into a stream of
//! [`WalkEntry`] values, applying the include/exclude filters, hidden-file
//! policy, depth limit, size bounds, and symlink strategy carried on
//! [`ScanOptions`].
//!
//! Symlinks that form a cycle back to an ancestor directory are detected via
//! the `(device, inode)` pair of each directory on the current path and
//! recorded as a scan error rather than followed forever.

use snapkit_domain::error::CoreError;
use snapkit_domain::entities::ScanResult;
use snapkit_domain::value_objects::{ScanOptions, SymlinkStrategy, WalkEntry};
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::fs::Metadata;
use std::path::{Path, PathBuf};

/// Walks a directory tree according to `options`, collecting entries and
/// per-path errors into a single [`ScanResult`].
pub struct Walker {
    options: ScanOptions,
}

impl Walker {
    pub fn new(options: ScanOptions) -> Self {
        Self { options }
    }

    /// Walks `root`, returning every matching entry and any per-entry
    /// errors encountered along the way. A failure to even open `root`
    /// itself is returned as an `Err`; failures on individual descendants
    /// are recorded in the result instead of aborting the walk.
    pub fn walk(&self, root: &Path) -> Result<ScanResult, CoreError> {
        let root_meta = std::fs::symlink_metadata(root)?;
        let mut result = ScanResult::new();
        let mut ancestors: HashSet<(u64, u64)> = HashSet::new();

        if root_meta.is_dir() {
            ancestors.insert(dev_inode(&root_meta));
            self.walk_dir(root, 0, &mut ancestors, &mut result);
        } else {
            self.visit_path(root, &root_meta, &mut result);
        }

        Ok(result)
    }

    fn walk_dir(&self, dir: &Path, depth: usize, ancestors: &mut HashSet<(u64, u64)>, result: &mut ScanResult) {
        if let Some(max_depth) = self.options.max_depth() {
            if depth > max_depth {
                return;
            }
        }

        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(err) => {
                result.push_error(dir.to_path_buf(), err.into());
                return;
            }
        };

        for entry in entries {
            let entry = match entry {
                Ok(e) => e,
                Err(err) => {
                    result.push_error(dir.to_path_buf(), err.into());
                    continue;
                }
            };
            let path = entry.path();

            if !self.options.include_hidden() && is_hidden(&path) {
                continue;
            }
            if self.matches_exclude(&path) {
                continue;
            }

            let meta = match std::fs::symlink_metadata(&path) {
                Ok(m) => m,
                Err(err) => {
                    result.push_error(path, err.into());
                    continue;
                }
            };

            if meta.file_type().is_symlink() {
                self.visit_symlink(&path, &meta, depth, ancestors, result);
                continue;
            }

            if meta.is_dir() {
                let key = dev_inode(&meta);
                if !ancestors.insert(key) {
                    result.push_error(path, CoreError::invalid_argument("symlink or bind-mount cycle detected"));
                    continue;
                }
                result.push_entry(WalkEntry::directory(path.clone(), mtime(&meta)));
                self.walk_dir(&path, depth + 1, ancestors, result);
                ancestors.remove(&key);
                continue;
            }

            self.visit_path(&path, &meta, result);
        }
    }

    fn visit_symlink(
        &self,
        path: &Path,
        meta: &Metadata,
        depth: usize,
        ancestors: &mut HashSet<(u64, u64)>,
        result: &mut ScanResult,
    ) {
        match self.options.symlink_strategy() {
            SymlinkStrategy::Skip => {}
            SymlinkStrategy::Record => {
                let target = std::fs::read_link(path).unwrap_or_else(|_| PathBuf::new());
                result.push_entry(WalkEntry::symlink(path.to_path_buf(), mtime(meta), target));
            }
            SymlinkStrategy::Follow => match std::fs::metadata(path) {
                Ok(target_meta) if target_meta.is_dir() => {
                    let key = dev_inode(&target_meta);
                    if !ancestors.insert(key) {
                        result.push_error(
                            path.to_path_buf(),
                            CoreError::invalid_argument("symlink cycle detected while following"),
                        );
                        return;
                    }
                    result.push_entry(WalkEntry::directory(path.to_path_buf(), mtime(&target_meta)));
                    self.walk_dir(path, depth + 1, ancestors, result);
                    ancestors.remove(&key);
                }
                Ok(target_meta) => self.visit_path(path, &target_meta, result),
                Err(err) => result.push_error(path.to_path_buf(), err.into()),
            },
        }
    }

    fn visit_path(&self, path: &Path, meta: &Metadata, result: &mut ScanResult) {
        if !meta.is_file() {
            return;
        }
        if !self.matches_include(path) {
            return;
        }
        let size = meta.len();
        if !self.options.size_in_range(size) {
            return;
        }
        let is_sparse = self.options.detect_sparse_files() && is_sparse_file(meta);
        result.push_entry(WalkEntry::file(path.to_path_buf(), size, mtime(meta), is_sparse));
    }

    /// Whether `path` should be pruned from the walk entirely. Applied to
    /// every entry, directories included, so an excluded subtree is never
    /// descended into.
    fn matches_exclude(&self, path: &Path) -> bool {
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
        self.options.exclude().iter().any(|p| glob_match(p, name))
    }

    /// Whether a file entry satisfies the include list. Never applied to
    /// directories: an include of `*.rs` must still let the walker recurse
    /// into `src/` to find the files that match it.
    fn matches_include(&self, path: &Path) -> bool {
        if self.options.include().is_empty() {
            return true;
        }
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
        self.options.include().iter().any(|p| glob_match(p, name))
    }
}

fn mtime(meta: &Metadata) -> DateTime<Utc> {
    meta.modified().map(DateTime::<Utc>::from).unwrap_or_else(|_| Utc::now())
}

fn is_hidden(path: &Path) -> bool {
    path.file_name().and_then(|n| n.to_str()).map(|n| n.starts_with('.')).unwrap_or(false)
}

#[cfg(unix)]
fn dev_inode(meta: &Metadata) -> (u64, u64) {
    use std::os::unix::fs::MetadataExt;
    (meta.dev(), meta.ino())
}

#[cfg(not(unix))]
fn dev_inode(meta: &Metadata) -> (u64, u64) {
    // No stable (device, inode) pair off unix; fall back to a size/len-derived
    // key, which cannot detect all cycles but avoids spurious false positives.
    (0, meta.len())
}

#[cfg(unix)]
fn is_sparse_file(meta: &Metadata) -> bool {
    use std::os::unix::fs::MetadataExt;
    // `blocks()` is in 512-byte units regardless of the filesystem's actual
    // block size; a file with fewer allocated blocks than its logical size
    // implies has at least one hole.
    meta.len() > meta.blocks() * 512
}

#[cfg(not(unix))]
fn is_sparse_file(_meta: &Metadata) -> bool {
    false
}

/// Minimal glob matcher supporting a single trailing or leading `*`
/// wildcard, sufficient for the `*.ext` and `prefix*` patterns used in
/// include/exclude lists.
fn glob_match(pattern: &str, name: &str) -> bool {
    if let Some(suffix) = pattern.strip_prefix('*') {
        return name.ends_with(suffix);
    }
    if let Some(prefix) = pattern.strip_suffix('*') {
        return name.starts_with(prefix);
    }
    pattern == name
}

#[cfg(test)]
mod tests {
    use super::*;
    use snapkit_domain::value_objects::ScanOptionsBuilder;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn walks_files_and_directories() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), b"hello").unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub/b.txt"), b"world").unwrap();

        let walker = Walker::new(ScanOptions::default());
        let result = walker.walk(dir.path()).unwrap();
        assert!(result.errors().is_empty());

        let files: Vec<_> = result.scanned_files().iter().filter(|e| e.is_file()).collect();
        assert_eq!(files.len(), 2);
    }

    #[test]
    fn skips_hidden_entries_by_default() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(".hidden"), b"secret").unwrap();
        fs::write(dir.path().join("visible.txt"), b"ok").unwrap();

        let walker = Walker::new(ScanOptions::default());
        let result = walker.walk(dir.path()).unwrap();
        let names: Vec<_> = result.scanned_files().iter().map(|e| e.path().file_name().unwrap()).collect();
        assert!(!names.contains(&std::ffi::OsStr::new(".hidden")));
        assert!(names.contains(&std::ffi::OsStr::new("visible.txt")));
    }

    #[test]
    fn exclude_pattern_filters_matches() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("keep.rs"), b"fn main() {}").unwrap();
        fs::write(dir.path().join("skip.log"), b"log line").unwrap();

        let options = ScanOptionsBuilder::new().exclude("*.log").build();
        let walker = Walker::new(options);
        let result = walker.walk(dir.path()).unwrap();
        let names: Vec<_> = result.scanned_files().iter().map(|e| e.path().file_name().unwrap()).collect();
        assert!(names.contains(&std::ffi::OsStr::new("keep.rs")));
        assert!(!names.contains(&std::ffi::OsStr::new("skip.log")));
    }

    #[test]
    fn include_pattern_does_not_prune_subdirectories() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("src")).unwrap();
        fs::write(dir.path().join("src/lib.rs"), b"fn lib() {}").unwrap();
        fs::write(dir.path().join("README.md"), b"# notes").unwrap();

        let options = ScanOptionsBuilder::new().include("*.rs").build();
        let walker = Walker::new(options);
        let result = walker.walk(dir.path()).unwrap();
        assert!(result.errors().is_empty());

        let names: Vec<_> = result
            .scanned_files()
            .iter()
            .filter(|e| e.is_file())
            .map(|e| e.path().file_name().unwrap())
            .collect();
        assert!(names.contains(&std::ffi::OsStr::new("lib.rs")));
        assert!(!names.contains(&std::ffi::OsStr::new("README.md")));
    }

    #[test]
    fn min_and_max_file_size_filter_entries() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("tiny"), b"x").unwrap();
        fs::write(dir.path().join("big"), vec![0u8; 1000]).unwrap();

        let options = ScanOptionsBuilder::new().min_file_size(10).build();
        let walker = Walker::new(options);
        let result = walker.walk(dir.path()).unwrap();
        assert_eq!(result.scanned_files().iter().filter(|e| e.is_file()).count(), 1);
    }
}
