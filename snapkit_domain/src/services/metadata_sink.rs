// /////////////////////////////////////////////////////////////////////////////
// Snapkit
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Metadata Sink
//!
//! The output port for the snapshot index: the per-file records that let a
//! later restore walk reconstruct the tree from chunk digests, without
//! needing the content sink at all.

use crate::entities::FileMetadata;
use crate::error::CoreError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::Path;
use uuid::Uuid;

/// Persists the metadata of a snapshot as it is produced.
///
/// Calls arrive in this order for a single run: one `begin_snapshot`, any
/// number of `append` calls (one per successfully processed file, in no
/// guaranteed order across files), then one `finish`.
#[async_trait]
pub trait MetadataSink: Send + Sync {
    /// Opens a new snapshot rooted at `root`, returning its identifier.
    async fn begin_snapshot(&self, root: &Path, started_at: DateTime<Utc>) -> Result<Uuid, CoreError>;

    /// Records one file's metadata under the given snapshot.
    async fn append(&self, snapshot_id: Uuid, metadata: &FileMetadata) -> Result<(), CoreError>;

    /// Closes out the snapshot, making it durable and visible to readers.
    /// `errors` carries every scan- and file-level error collected over the
    /// run; they are attached to the snapshot's error list before it is
    /// sealed, so a snapshot with errors is still produced rather than
    /// discarded.
    async fn finish(&self, snapshot_id: Uuid, ended_at: DateTime<Utc>, errors: &[String]) -> Result<(), CoreError>;
}
