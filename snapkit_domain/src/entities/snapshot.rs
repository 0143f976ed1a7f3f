// /////////////////////////////////////////////////////////////////////////////
// Snapkit
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Snapshot and Run Results
//!
//! A `Snapshot` is the top-level record of one backup run: when it started
//! and ended, which root it covered, and the file metadata and errors
//! collected along the way. `ScanResult` and `ProcessingResult` are the
//! intermediate and final outcomes the [`crate::application`]-level
//! processor assembles on top of a snapshot (the processor itself lives in
//! snapkit-core, since it orchestrates infrastructure).

use crate::entities::FileMetadata;
use crate::error::CoreError;
use crate::value_objects::WalkEntry;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

/// Outcome of the directory-walk phase alone, before chunking.
#[derive(Debug, Clone, Default)]
pub struct ScanResult {
    scanned: Vec<WalkEntry>,
    errors: Vec<(PathBuf, CoreError)>,
}

impl ScanResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_entry(&mut self, entry: WalkEntry) {
        self.scanned.push(entry);
    }

    pub fn push_error(&mut self, path: PathBuf, error: CoreError) {
        self.errors.push((path, error));
    }

    pub fn scanned_files(&self) -> &[WalkEntry] {
        &self.scanned
    }

    pub fn errors(&self) -> &[(PathBuf, CoreError)] {
        &self.errors
    }
}

/// The immutable record of one complete backup run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    snapshot_id: Uuid,
    started_at: DateTime<Utc>,
    ended_at: Option<DateTime<Utc>>,
    root: PathBuf,
    file_metadata: Vec<FileMetadata>,
    errors: Vec<String>,
}

impl Snapshot {
    /// Begins a new, in-progress snapshot rooted at `root`.
    pub fn begin(root: PathBuf, started_at: DateTime<Utc>) -> Self {
        Self {
            snapshot_id: Uuid::new_v4(),
            started_at,
            ended_at: None,
            root,
            file_metadata: Vec::new(),
            errors: Vec::new(),
        }
    }

    pub fn snapshot_id(&self) -> Uuid {
        self.snapshot_id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn ended_at(&self) -> Option<DateTime<Utc>> {
        self.ended_at
    }

    pub fn root(&self) -> &std::path::Path {
        &self.root
    }

    pub fn file_metadata(&self) -> &[FileMetadata] {
        &self.file_metadata
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn push_file(&mut self, metadata: FileMetadata) {
        self.file_metadata.push(metadata);
    }

    pub fn push_error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    /// Marks the snapshot complete at the given time. Idempotent: a second
    /// call overwrites `ended_at` rather than erroring, since the processor
    /// only ever calls this once per run in practice.
    pub fn finish(&mut self, ended_at: DateTime<Utc>) {
        self.ended_at = Some(ended_at);
    }

    pub fn is_finished(&self) -> bool {
        self.ended_at.is_some()
    }
}

/// The final, user-facing outcome of a full scan-and-chunk run.
#[derive(Debug, Clone)]
pub struct ProcessingResult {
    snapshot_id: Uuid,
    processed_files: usize,
    error_files: usize,
    skipped_files: usize,
    total_bytes: u64,
    total_sparse_bytes: u64,
    scan_errors: usize,
}

impl ProcessingResult {
    pub fn new(
        snapshot_id: Uuid,
        processed_files: usize,
        error_files: usize,
        skipped_files: usize,
        total_bytes: u64,
        total_sparse_bytes: u64,
        scan_errors: usize,
    ) -> Self {
        Self {
            snapshot_id,
            processed_files,
            error_files,
            skipped_files,
            total_bytes,
            total_sparse_bytes,
            scan_errors,
        }
    }

    pub fn snapshot_id(&self) -> Uuid {
        self.snapshot_id
    }

    pub fn processed_files(&self) -> usize {
        self.processed_files
    }

    pub fn error_files(&self) -> usize {
        self.error_files
    }

    pub fn skipped_files(&self) -> usize {
        self.skipped_files
    }

    pub fn total_bytes(&self) -> u64 {
        self.total_bytes
    }

    pub fn total_sparse_bytes(&self) -> u64 {
        self.total_sparse_bytes
    }

    pub fn scan_errors(&self) -> usize {
        self.scan_errors
    }

    pub fn had_errors(&self) -> bool {
        self.error_files > 0 || self.scan_errors > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_starts_unfinished() {
        let snap = Snapshot::begin(PathBuf::from("/root"), Utc::now());
        assert!(!snap.is_finished());
        assert!(snap.file_metadata().is_empty());
    }

    #[test]
    fn finish_sets_ended_at() {
        let mut snap = Snapshot::begin(PathBuf::from("/root"), Utc::now());
        let end = Utc::now();
        snap.finish(end);
        assert_eq!(snap.ended_at(), Some(end));
        assert!(snap.is_finished());
    }

    #[test]
    fn processing_result_reports_had_errors() {
        let snapshot_id = Uuid::new_v4();
        let ok = ProcessingResult::new(snapshot_id, 10, 0, 0, 1000, 0, 0);
        assert!(!ok.had_errors());
        let bad = ProcessingResult::new(snapshot_id, 9, 1, 0, 1000, 0, 0);
        assert!(bad.had_errors());
    }
}
