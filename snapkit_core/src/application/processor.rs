// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Processor
//!
//! The use-case entry point for one backup run. A `Processor` owns the
//! scheduler, buffer arena, digest service, and the two sinks; `process`
//! walks a root, chunks every discovered file, and writes the resulting
//! snapshot, returning a [`ProcessingResult`] summary.
//!
//! ## Lifecycle
//!
//! A `Processor` moves through three states: `Idle` → `Running` → back to
//! `Idle` on completion, or to `Closed` once [`Processor::stop`] has been
//! called. A second `process` call while one is already running fails fast
//! with [`CoreError::ProcessorBusy`]; any call after `stop` fails with
//! [`CoreError::ProcessorClosed`].

use crate::infrastructure::buffer_arena::BufferArena;
use crate::infrastructure::chunk_pipeline::ChunkPipeline;
use crate::infrastructure::chunker::Chunker;
use crate::infrastructure::fastcdc_chunker::FastCdcChunker;
use crate::infrastructure::fixed_chunker::FixedChunker;
use crate::infrastructure::metrics::RunMetrics;
use crate::infrastructure::scheduler::Scheduler;
use crate::infrastructure::walker::Walker;
use chrono::Utc;
use parking_lot::Mutex;
use snapkit_domain::entities::{ChunkingResult, FileMetadata, ProcessingResult};
use snapkit_domain::error::CoreError;
use snapkit_domain::services::{ContentSink, DigestService, MetadataSink};
use snapkit_domain::value_objects::{ChunkingAlgorithm, ChunkingOptions, EntryKind, ScanOptions, WalkEntry};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Semaphore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProcessorState {
    Idle,
    Running,
    Closed,
}

/// Tunables for how a `Processor` fans work out across files.
#[derive(Debug, Clone, Copy)]
pub struct ProcessorConfig {
    /// How many files are chunked concurrently.
    pub file_concurrency: usize,
    /// How many chunks within a single file are digested and stored
    /// concurrently; forwarded to [`ChunkPipeline::with_per_file_concurrency`].
    pub per_file_chunk_concurrency: usize,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        // Mirrors ChunkPipeline::DEFAULT_PER_FILE_CONCURRENCY.
        Self { file_concurrency: 8, per_file_chunk_concurrency: 4 }
    }
}

/// Orchestrates one backup run at a time.
pub struct Processor<D: DigestService> {
    scheduler: Arc<Scheduler>,
    buffer_arena: Arc<BufferArena>,
    digest_service: Arc<D>,
    content_sink: Arc<dyn ContentSink>,
    metadata_sink: Arc<dyn MetadataSink>,
    config: ProcessorConfig,
    state: Arc<Mutex<ProcessorState>>,
    cancelled: Arc<AtomicBool>,
    metrics: Option<Arc<RunMetrics>>,
}

impl<D: DigestService + 'static> Processor<D> {
    pub fn new(
        scheduler: Arc<Scheduler>,
        buffer_arena: Arc<BufferArena>,
        digest_service: Arc<D>,
        content_sink: Arc<dyn ContentSink>,
        metadata_sink: Arc<dyn MetadataSink>,
        config: ProcessorConfig,
    ) -> Self {
        Self {
            scheduler,
            buffer_arena,
            digest_service,
            content_sink,
            metadata_sink,
            config,
            state: Arc::new(Mutex::new(ProcessorState::Idle)),
            cancelled: Arc::new(AtomicBool::new(false)),
            metrics: None,
        }
    }

    /// Attaches a [`RunMetrics`] instance; counters are updated as files
    /// are scanned, started, and settled during `process`.
    pub fn with_metrics(mut self, metrics: Arc<RunMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn is_running(&self) -> bool {
        *self.state.lock() == ProcessorState::Running
    }

    pub fn is_closed(&self) -> bool {
        *self.state.lock() == ProcessorState::Closed
    }

    /// Requests that the in-flight (if any) run stop after its current
    /// files finish, and permanently closes the processor to further
    /// `process` calls. Idempotent.
    pub fn stop(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        *self.state.lock() = ProcessorState::Closed;
    }

    fn begin_run(&self) -> Result<(), CoreError> {
        let mut state = self.state.lock();
        match *state {
            ProcessorState::Closed => Err(CoreError::ProcessorClosed),
            ProcessorState::Running => Err(CoreError::ProcessorBusy),
            ProcessorState::Idle => {
                *state = ProcessorState::Running;
                Ok(())
            }
        }
    }

    fn end_run(&self) {
        let mut state = self.state.lock();
        if *state == ProcessorState::Running {
            *state = ProcessorState::Idle;
        }
    }

    /// Walks `root` and chunks every discovered file, returning a summary
    /// once the whole run (or a `stop()`-requested early exit) completes.
    pub async fn process(
        &self,
        root: &Path,
        scan_options: ScanOptions,
        chunking_options: ChunkingOptions,
    ) -> Result<ProcessingResult, CoreError> {
        self.begin_run()?;
        self.cancelled.store(false, Ordering::SeqCst);

        let result = self.run(root, scan_options, chunking_options).await;
        self.end_run();
        result
    }

    async fn run(
        &self,
        root: &Path,
        scan_options: ScanOptions,
        chunking_options: ChunkingOptions,
    ) -> Result<ProcessingResult, CoreError> {
        let started_at = Utc::now();
        let snapshot_id = self.metadata_sink.begin_snapshot(root, started_at).await?;

        let root_buf = root.to_path_buf();
        let walker = Walker::new(scan_options);
        let scan_result = tokio::task::spawn_blocking(move || walker.walk(&root_buf))
            .await
            .map_err(|_| CoreError::Cancelled)??;

        let chunker = build_chunker(&chunking_options)?;
        let pipeline = Arc::new(
            ChunkPipeline::new(
                self.scheduler.clone(),
                self.digest_service.clone(),
                self.content_sink.clone(),
                self.buffer_arena.clone(),
            )
            .with_per_file_concurrency(self.config.per_file_chunk_concurrency),
        );

        // Per §4.7 step 2, a recorded (not followed) symlink is submitted
        // as its own task too, but it carries no bytes to chunk: it gets a
        // trivial, empty-content ChunkingResult instead of a pipeline run.
        let entries: Vec<&WalkEntry> =
            scan_result.scanned_files().iter().filter(|e| e.kind() != EntryKind::Directory).collect();
        let skipped_files = scan_result.scanned_files().len() - entries.len();
        if let Some(metrics) = &self.metrics {
            for _ in 0..entries.len() {
                metrics.record_scanned();
            }
        }

        let limiter = Arc::new(Semaphore::new(self.config.file_concurrency.max(1)));
        let mut handles = Vec::with_capacity(entries.len());

        for entry in entries {
            if self.cancelled.load(Ordering::SeqCst) {
                break;
            }
            let entry = entry.clone();
            if let Some(metrics) = &self.metrics {
                metrics.record_file_started();
            }

            if entry.kind() == EntryKind::Symlink {
                let digest_service = self.digest_service.clone();
                handles.push(tokio::spawn(async move {
                    let empty_digest = digest_service.digest_bytes(&[])?;
                    let result = ChunkingResult::success(entry.path().to_path_buf(), 0, 0, empty_digest, Vec::new());
                    Ok::<(WalkEntry, ChunkingResult), CoreError>((entry, result))
                }));
                continue;
            }

            let pipeline = pipeline.clone();
            let chunker = chunker.clone();
            let limiter = limiter.clone();
            let path = entry.path().to_path_buf();

            handles.push(tokio::spawn(async move {
                let _permit = limiter.acquire_owned().await.map_err(|_| CoreError::Cancelled)?;
                let result = pipeline.process_file(&path, chunker).await;
                Ok::<(WalkEntry, ChunkingResult), CoreError>((entry, result))
            }));
        }

        let mut processed_files = 0usize;
        let mut error_files = 0usize;
        let mut total_bytes = 0u64;
        let mut total_sparse_bytes = 0u64;
        let mut errors: Vec<String> = scan_result
            .errors()
            .iter()
            .map(|(path, err)| format!("{}: {err}", path.display()))
            .collect();

        for handle in handles {
            let (entry, chunk_result) = handle.await.map_err(|_| CoreError::Cancelled)??;
            match chunk_result.is_success() {
                true => {
                    processed_files += 1;
                    total_bytes += chunk_result.total_size();
                    if entry.is_sparse() {
                        total_sparse_bytes += chunk_result.sparse_size();
                    }
                    if let Some(metrics) = &self.metrics {
                        metrics.record_file_success(chunk_result.total_size(), chunk_result.chunk_count() as u64);
                    }
                    let metadata = FileMetadata::new(
                        entry.path().to_path_buf(),
                        chunk_result.total_size(),
                        entry.mtime(),
                        entry.link_target().map(|p| p.to_path_buf()),
                        entry.is_sparse(),
                        chunk_result.file_digest().expect("success carries a digest").clone(),
                        chunk_result.chunk_digests().to_vec(),
                    );
                    self.metadata_sink.append(snapshot_id, &metadata).await?;
                }
                false => {
                    error_files += 1;
                    if let Some(metrics) = &self.metrics {
                        metrics.record_file_failure();
                    }
                    let message = chunk_result
                        .error()
                        .map(|e| format!("{}: {e}", entry.path().display()))
                        .unwrap_or_else(|| format!("{}: chunking failed", entry.path().display()));
                    errors.push(message);
                }
            }
        }

        let ended_at = Utc::now();
        self.metadata_sink.finish(snapshot_id, ended_at, &errors).await?;

        Ok(ProcessingResult::new(
            snapshot_id,
            processed_files,
            error_files,
            skipped_files,
            total_bytes,
            total_sparse_bytes,
            scan_result.errors().len(),
        ))
    }
}

fn build_chunker(options: &ChunkingOptions) -> Result<Arc<dyn Chunker>, CoreError> {
    match options.algorithm() {
        ChunkingAlgorithm::Fixed => Ok(Arc::new(FixedChunker::new(options.chunk_size()))),
        ChunkingAlgorithm::Cdc => {
            Ok(Arc::new(FastCdcChunker::new(options.min_chunk_size(), options.chunk_size(), options.max_chunk_size())))
        }
    }
}
