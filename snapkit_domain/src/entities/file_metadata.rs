// /////////////////////////////////////////////////////////////////////////////
// Snapkit
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # File Metadata
//!
//! A snapshot-indexed record of one file: identity (path), a digest of its
//! full content, and the ordered digests of the chunks it was split into.
//! This is what [`crate::services::MetadataSink`] persists per file.

use crate::value_objects::Digest;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// The metadata persisted for one successfully processed file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileMetadata {
    path: PathBuf,
    size: u64,
    mtime: DateTime<Utc>,
    symlink_target: Option<PathBuf>,
    is_sparse: bool,
    file_digest: Digest,
    chunk_digests: Vec<Digest>,
}

impl FileMetadata {
    pub fn new(
        path: PathBuf,
        size: u64,
        mtime: DateTime<Utc>,
        symlink_target: Option<PathBuf>,
        is_sparse: bool,
        file_digest: Digest,
        chunk_digests: Vec<Digest>,
    ) -> Self {
        Self { path, size, mtime, symlink_target, is_sparse, file_digest, chunk_digests }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn mtime(&self) -> DateTime<Utc> {
        self.mtime
    }

    pub fn symlink_target(&self) -> Option<&std::path::Path> {
        self.symlink_target.as_deref()
    }

    pub fn is_sparse(&self) -> bool {
        self.is_sparse
    }

    pub fn file_digest(&self) -> &Digest {
        &self.file_digest
    }

    pub fn chunk_digests(&self) -> &[Digest] {
        &self.chunk_digests
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_json() {
        let meta = FileMetadata::new(
            PathBuf::from("/a/b"),
            42,
            Utc::now(),
            None,
            false,
            Digest::from_bytes(vec![1, 2, 3]),
            vec![Digest::from_bytes(vec![1, 2, 3])],
        );
        let json = serde_json::to_string(&meta).unwrap();
        let back: FileMetadata = serde_json::from_str(&json).unwrap();
        assert_eq!(back.path(), meta.path());
        assert_eq!(back.file_digest(), meta.file_digest());
    }
}
