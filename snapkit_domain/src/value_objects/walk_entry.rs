// /////////////////////////////////////////////////////////////////////////////
// Snapkit
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Walk Entry
//!
//! A single filesystem entry produced by the walker, before any chunking has
//! happened. Entries are the boundary between "what the filesystem looks
//! like" and "what the core does about it".

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// The kind of filesystem object a [`WalkEntry`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryKind {
    File,
    Directory,
    Symlink,
}

/// One entry yielded by a directory walk.
///
/// # Invariants
///
/// - `is_sparse` is only ever `true` when `kind == EntryKind::File` and
///   `size > 0`; directories and symlinks are never sparse.
/// - `link_target` is `Some` only when `kind == EntryKind::Symlink`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalkEntry {
    path: PathBuf,
    kind: EntryKind,
    size: u64,
    mtime: DateTime<Utc>,
    is_sparse: bool,
    link_target: Option<PathBuf>,
}

impl WalkEntry {
    /// Builds a file entry, validating the sparse-file invariant.
    pub fn file(path: PathBuf, size: u64, mtime: DateTime<Utc>, is_sparse: bool) -> Self {
        let is_sparse = is_sparse && size > 0;
        Self { path, kind: EntryKind::File, size, mtime, is_sparse, link_target: None }
    }

    /// Builds a directory entry.
    pub fn directory(path: PathBuf, mtime: DateTime<Utc>) -> Self {
        Self { path, kind: EntryKind::Directory, size: 0, mtime, is_sparse: false, link_target: None }
    }

    /// Builds a symlink entry.
    pub fn symlink(path: PathBuf, mtime: DateTime<Utc>, target: PathBuf) -> Self {
        Self {
            path,
            kind: EntryKind::Symlink,
            size: 0,
            mtime,
            is_sparse: false,
            link_target: Some(target),
        }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn mtime(&self) -> DateTime<Utc> {
        self.mtime
    }

    pub fn is_sparse(&self) -> bool {
        self.is_sparse
    }

    pub fn link_target(&self) -> Option<&std::path::Path> {
        self.link_target.as_deref()
    }

    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }

    pub fn is_directory(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    pub fn is_symlink(&self) -> bool {
        self.kind == EntryKind::Symlink
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_size_file_is_never_sparse() {
        let e = WalkEntry::file(PathBuf::from("/a"), 0, Utc::now(), true);
        assert!(!e.is_sparse());
    }

    #[test]
    fn directory_has_no_link_target() {
        let e = WalkEntry::directory(PathBuf::from("/a"), Utc::now());
        assert!(e.link_target().is_none());
        assert!(e.is_directory());
    }

    #[test]
    fn symlink_carries_target() {
        let e = WalkEntry::symlink(PathBuf::from("/a"), Utc::now(), PathBuf::from("/b"));
        assert_eq!(e.link_target(), Some(std::path::Path::new("/b")));
        assert!(e.is_symlink());
    }
}
