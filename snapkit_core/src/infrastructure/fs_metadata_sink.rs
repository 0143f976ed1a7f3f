// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Filesystem Metadata Sink
//!
//! A [`MetadataSink`] that accumulates a snapshot's file records in memory
//! and serializes the whole snapshot to one JSON file per snapshot under a
//! directory, once `finish` is called. Simpler than an append-only log, at
//! the cost of losing partial progress if the process dies mid-run; that
//! tradeoff is acceptable since a killed run's snapshot was never supposed
//! to be considered complete anyway.

use snapkit_domain::entities::{FileMetadata, Snapshot};
use snapkit_domain::error::CoreError;
use snapkit_domain::services::MetadataSink;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use uuid::Uuid;

/// Snapshot index store rooted at a directory on the local filesystem.
pub struct FsMetadataSink {
    root: PathBuf,
    open: Arc<Mutex<HashMap<Uuid, Snapshot>>>,
}

impl FsMetadataSink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into(), open: Arc::new(Mutex::new(HashMap::new())) }
    }

    fn snapshot_path(&self, snapshot_id: Uuid) -> PathBuf {
        self.root.join(format!("{snapshot_id}.json"))
    }
}

#[async_trait]
impl MetadataSink for FsMetadataSink {
    async fn begin_snapshot(&self, root: &Path, started_at: DateTime<Utc>) -> Result<Uuid, CoreError> {
        let snapshot = Snapshot::begin(root.to_path_buf(), started_at);
        let id = snapshot.snapshot_id();
        self.open.lock().insert(id, snapshot);
        Ok(id)
    }

    async fn append(&self, snapshot_id: Uuid, metadata: &FileMetadata) -> Result<(), CoreError> {
        let mut open = self.open.lock();
        let snapshot = open
            .get_mut(&snapshot_id)
            .ok_or_else(|| CoreError::invalid_argument(format!("unknown snapshot {snapshot_id}")))?;
        snapshot.push_file(metadata.clone());
        Ok(())
    }

    async fn finish(&self, snapshot_id: Uuid, ended_at: DateTime<Utc>, errors: &[String]) -> Result<(), CoreError> {
        let snapshot = {
            let mut open = self.open.lock();
            let mut snapshot = open
                .remove(&snapshot_id)
                .ok_or_else(|| CoreError::invalid_argument(format!("unknown snapshot {snapshot_id}")))?;
            for error in errors {
                snapshot.push_error(error.clone());
            }
            snapshot.finish(ended_at);
            snapshot
        };

        fs::create_dir_all(&self.root).await?;
        let json = serde_json::to_vec_pretty(&snapshot)
            .map_err(|e| CoreError::sink_error(format!("failed to serialize snapshot: {e}")))?;
        fs::write(self.snapshot_path(snapshot_id), json).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use snapkit_domain::value_objects::Digest;
    use tempfile::tempdir;

    #[tokio::test]
    async fn full_lifecycle_writes_snapshot_file() {
        let dir = tempdir().unwrap();
        let sink = FsMetadataSink::new(dir.path());
        let now = Utc::now();

        let id = sink.begin_snapshot(Path::new("/backup/root"), now).await.unwrap();
        let metadata = FileMetadata::new(
            PathBuf::from("/backup/root/a.txt"),
            5,
            now,
            None,
            false,
            Digest::from_bytes(vec![1, 2, 3]),
            vec![Digest::from_bytes(vec![1, 2, 3])],
        );
        sink.append(id, &metadata).await.unwrap();
        sink.finish(id, now, &[]).await.unwrap();

        let path = dir.path().join(format!("{id}.json"));
        assert!(path.exists());
    }

    #[tokio::test]
    async fn finish_attaches_errors_to_the_snapshot() {
        let dir = tempdir().unwrap();
        let sink = FsMetadataSink::new(dir.path());
        let now = Utc::now();

        let id = sink.begin_snapshot(Path::new("/backup/root"), now).await.unwrap();
        sink.finish(id, now, &["permission denied: /root/secret".to_string()]).await.unwrap();

        let path = dir.path().join(format!("{id}.json"));
        let json = std::fs::read_to_string(path).unwrap();
        assert!(json.contains("permission denied"));
    }

    #[tokio::test]
    async fn append_to_unknown_snapshot_fails() {
        let dir = tempdir().unwrap();
        let sink = FsMetadataSink::new(dir.path());
        let metadata = FileMetadata::new(
            PathBuf::from("/a"),
            0,
            Utc::now(),
            None,
            false,
            Digest::from_bytes(vec![0]),
            vec![],
        );
        let result = sink.append(Uuid::new_v4(), &metadata).await;
        assert!(result.is_err());
    }
}
