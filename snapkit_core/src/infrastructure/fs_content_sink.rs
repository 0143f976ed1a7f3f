// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Filesystem Content Sink
//!
//! A [`ContentSink`] that stores each chunk as a file under a two-level
//! fan-out directory (`<root>/<first 2 hex chars>/<rest of hex>`), the same
//! sharding scheme git's loose object store uses to keep any one directory
//! from holding too many entries.

use snapkit_domain::error::CoreError;
use snapkit_domain::services::ContentSink;
use snapkit_domain::value_objects::Digest;
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Content-addressed store rooted at a directory on the local filesystem.
pub struct FsContentSink {
    root: PathBuf,
}

impl FsContentSink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, digest: &Digest) -> PathBuf {
        let hex = digest.to_hex();
        let (shard, rest) = hex.split_at(2.min(hex.len()));
        self.root.join(shard).join(rest)
    }
}

#[async_trait]
impl ContentSink for FsContentSink {
    async fn put(&self, digest: &Digest, bytes: &[u8]) -> Result<bool, CoreError> {
        let path = self.path_for(digest);
        if fs::try_exists(&path).await.unwrap_or(false) {
            return Ok(false);
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        // Write to a temp file in the same shard directory, then rename,
        // so a crash mid-write never leaves a partial object at `path`.
        let tmp_path = path.with_extension("tmp");
        let mut file = fs::File::create(&tmp_path).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        fs::rename(&tmp_path, &path).await?;
        Ok(true)
    }

    async fn contains(&self, digest: &Digest) -> Result<bool, CoreError> {
        Ok(fs::try_exists(self.path_for(digest)).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn put_is_idempotent() {
        let dir = tempdir().unwrap();
        let sink = FsContentSink::new(dir.path());
        let digest = Digest::from_bytes(vec![1, 2, 3, 4]);

        let first = sink.put(&digest, b"payload").await.unwrap();
        let second = sink.put(&digest, b"payload").await.unwrap();

        assert!(first);
        assert!(!second);
        assert!(sink.contains(&digest).await.unwrap());
    }

    #[tokio::test]
    async fn contains_is_false_before_put() {
        let dir = tempdir().unwrap();
        let sink = FsContentSink::new(dir.path());
        let digest = Digest::from_bytes(vec![9, 9, 9]);
        assert!(!sink.contains(&digest).await.unwrap());
    }
}
