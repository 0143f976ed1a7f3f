// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Chunk Pipeline
//!
//! Orchestrates one file end to end: stream its bytes through the
//! [`crate::infrastructure::buffer_arena::BufferArena`] over a sliding
//! window bounded to the chunker's own lookahead requirement, cut it into
//! chunks with the configured [`Chunker`], digest and store each chunk
//! concurrently (bounded by a per-file concurrency cap), and assemble the
//! result in original chunk order even though the chunks themselves were
//! digested out of order.
//!
//! Sparse holes (see [`crate::infrastructure::sparse_reader`]) are never
//! read off disk: they are folded into the window, the file digest, and the
//! chunk boundaries as synthesized zero runs.

use crate::infrastructure::buffer_arena::BufferArena;
use crate::infrastructure::chunker::{ChunkBoundary, Chunker};
use crate::infrastructure::scheduler::Scheduler;
use crate::infrastructure::sparse_reader::plan_byte_runs;
use snapkit_domain::entities::ChunkingResult;
use snapkit_domain::error::CoreError;
use snapkit_domain::services::{ContentSink, DigestService, IncrementalDigest};
use snapkit_domain::value_objects::Digest;
use std::path::Path;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio::sync::Semaphore;

/// Orchestrates chunking, digesting, and storing one file at a time.
pub struct ChunkPipeline<D: DigestService> {
    scheduler: Arc<Scheduler>,
    digest_service: Arc<D>,
    content_sink: Arc<dyn ContentSink>,
    buffer_arena: Arc<BufferArena>,
    per_file_concurrency: usize,
}

impl<D: DigestService + 'static> ChunkPipeline<D> {
    pub const DEFAULT_PER_FILE_CONCURRENCY: usize = 4;

    pub fn new(
        scheduler: Arc<Scheduler>,
        digest_service: Arc<D>,
        content_sink: Arc<dyn ContentSink>,
        buffer_arena: Arc<BufferArena>,
    ) -> Self {
        Self {
            scheduler,
            digest_service,
            content_sink,
            buffer_arena,
            per_file_concurrency: Self::DEFAULT_PER_FILE_CONCURRENCY,
        }
    }

    pub fn with_per_file_concurrency(mut self, n: usize) -> Self {
        self.per_file_concurrency = n.max(1);
        self
    }

    /// Chunks, digests, and stores `path`, returning a successful result on
    /// success or a failed one if any step could not complete. A failure
    /// here never panics and never aborts a caller driving many files.
    pub async fn process_file(&self, path: &Path, chunker: Arc<dyn Chunker>) -> ChunkingResult {
        match self.try_process_file(path, chunker).await {
            Ok(result) => result,
            Err(err) => ChunkingResult::failure(path.to_path_buf(), err),
        }
    }

    async fn try_process_file(&self, path: &Path, chunker: Arc<dyn Chunker>) -> Result<ChunkingResult, CoreError> {
        let path_buf = path.to_path_buf();
        let file_len = tokio::fs::metadata(path).await?.len();
        let runs = plan_byte_runs(path, file_len);
        let mut file = tokio::fs::File::open(path).await?;

        let max_window = chunker.max_window().max(1);
        let mut window: Vec<u8> = Vec::with_capacity(max_window);
        let mut run_index = 0usize;
        let mut run_pos = 0u64;
        let mut eof = runs.is_empty();
        let mut sparse_size = 0u64;

        let mut file_digest = self.digest_service.new_incremental();
        let limiter = Arc::new(Semaphore::new(self.per_file_concurrency));
        let mut handles = Vec::new();
        let mut chunk_index = 0usize;

        loop {
            // Top off the window to the chunker's lookahead requirement, or
            // until the file is exhausted.
            while window.len() < max_window && !eof {
                if run_index >= runs.len() {
                    eof = true;
                    break;
                }
                let run = runs[run_index];
                let remaining_in_run = run.length - run_pos;
                if remaining_in_run == 0 {
                    run_index += 1;
                    run_pos = 0;
                    continue;
                }
                let want = (max_window - window.len()) as u64;
                let take = want.min(remaining_in_run);

                if run.is_hole {
                    window.resize(window.len() + take as usize, 0u8);
                    file_digest.update_zeros(take);
                    sparse_size += take;
                    run_pos += take;
                } else {
                    let mut handle = self.buffer_arena.acquire().await?;
                    let read_target = (take as usize).min(handle.len());
                    file.seek(std::io::SeekFrom::Start(run.offset + run_pos)).await?;
                    let read = file.read(&mut handle.as_mut_slice()[..read_target]).await?;
                    if read == 0 {
                        // File shrank under us; treat the rest of this run as
                        // consumed rather than spinning forever.
                        run_pos = run.length;
                    } else {
                        window.extend_from_slice(&handle.as_slice()[..read]);
                        file_digest.update(&handle.as_slice()[..read]);
                        run_pos += read as u64;
                    }
                }
            }

            if window.is_empty() {
                break;
            }

            let boundaries = {
                let chunker = chunker.clone();
                let window_snapshot = window.clone();
                self.scheduler.submit_cpu(move || chunker.cut(&window_snapshot)).await?
            };
            if boundaries.is_empty() {
                break;
            }

            // A cut decision for the chunk starting at `offset` only looks
            // ahead as far as `offset + max_window`; with a full window, only
            // the first boundary is resolved independently of what comes
            // after it. Once the file has ended, every boundary the chunker
            // returns is final.
            let confirmed: &[ChunkBoundary] = if eof { &boundaries } else { &boundaries[..1] };

            let mut consumed = 0usize;
            for boundary in confirmed {
                let chunk_bytes = window[boundary.offset..boundary.offset + boundary.length].to_vec();
                consumed = boundary.offset + boundary.length;

                let digest_service = self.digest_service.clone();
                let content_sink = self.content_sink.clone();
                let limiter = limiter.clone();
                let index = chunk_index;
                chunk_index += 1;

                handles.push(tokio::spawn(async move {
                    let _permit = limiter.acquire_owned().await.map_err(|_| CoreError::Cancelled)?;
                    let digest = digest_service.digest_bytes(&chunk_bytes)?;
                    content_sink.put(&digest, &chunk_bytes).await?;
                    Ok::<(usize, Digest), CoreError>((index, digest))
                }));
            }

            window.drain(0..consumed);
        }

        let mut chunk_digests: Vec<Option<Digest>> = vec![None; chunk_index];
        for handle in handles {
            let (index, digest) = handle.await.map_err(|_| CoreError::Cancelled)??;
            chunk_digests[index] = Some(digest);
        }
        let chunk_digests: Vec<Digest> = chunk_digests
            .into_iter()
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| CoreError::sink_error("a chunk task failed to produce a digest"))?;

        let file_digest = file_digest.finish();
        Ok(ChunkingResult::success(path_buf, file_len, sparse_size, file_digest, chunk_digests))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::fastcdc_chunker::FastCdcChunker;
    use crate::infrastructure::fixed_chunker::FixedChunker;
    use crate::infrastructure::fs_content_sink::FsContentSink;
    use crate::infrastructure::scheduler::SchedulerConfig;
    use crate::infrastructure::sha256_digest_service::Sha256DigestService;
    use tempfile::tempdir;

    #[tokio::test]
    async fn processes_a_file_into_ordered_chunks() {
        let work_dir = tempdir().unwrap();
        let store_dir = tempdir().unwrap();
        let file_path = work_dir.path().join("data.bin");
        tokio::fs::write(&file_path, vec![7u8; 10_000]).await.unwrap();

        let scheduler = Arc::new(Scheduler::new(SchedulerConfig::default()).unwrap());
        let digest_service = Arc::new(Sha256DigestService);
        let content_sink: Arc<dyn ContentSink> = Arc::new(FsContentSink::new(store_dir.path()));
        let arena = Arc::new(BufferArena::new(4, 4096));

        let pipeline = ChunkPipeline::new(scheduler, digest_service, content_sink, arena);
        let chunker: Arc<dyn Chunker> = Arc::new(FixedChunker::new(4096));

        let result = pipeline.process_file(&file_path, chunker).await;
        assert!(result.is_success());
        assert_eq!(result.total_size(), 10_000);
        assert_eq!(result.chunk_count(), 3);
        assert_eq!(result.sparse_size(), 0);
    }

    #[tokio::test]
    async fn a_file_larger_than_the_buffer_arena_still_processes() {
        // Arena holds far fewer bytes than the file: proves the window never
        // needs the whole file materialized at once.
        let work_dir = tempdir().unwrap();
        let store_dir = tempdir().unwrap();
        let file_path = work_dir.path().join("big.bin");
        let mut data = Vec::with_capacity(200_000);
        let mut x: u32 = 7;
        for _ in 0..200_000 {
            x = x.wrapping_mul(1103515245).wrapping_add(12345);
            data.push((x >> 16) as u8);
        }
        tokio::fs::write(&file_path, &data).await.unwrap();

        let scheduler = Arc::new(Scheduler::new(SchedulerConfig::default()).unwrap());
        let digest_service = Arc::new(Sha256DigestService);
        let content_sink: Arc<dyn ContentSink> = Arc::new(FsContentSink::new(store_dir.path()));
        let arena = Arc::new(BufferArena::new(2, 4096));

        let pipeline = ChunkPipeline::new(scheduler, digest_service, content_sink, arena);
        let chunker: Arc<dyn Chunker> = Arc::new(FastCdcChunker::new(1024, 4096, 16384));

        let result = pipeline.process_file(&file_path, chunker).await;
        assert!(result.is_success());
        assert_eq!(result.total_size(), 200_000);
    }

    #[tokio::test]
    async fn missing_file_yields_failure_result() {
        let store_dir = tempdir().unwrap();
        let scheduler = Arc::new(Scheduler::new(SchedulerConfig::default()).unwrap());
        let digest_service = Arc::new(Sha256DigestService);
        let content_sink: Arc<dyn ContentSink> = Arc::new(FsContentSink::new(store_dir.path()));
        let arena = Arc::new(BufferArena::new(2, 4096));

        let pipeline = ChunkPipeline::new(scheduler, digest_service, content_sink, arena);
        let chunker: Arc<dyn Chunker> = Arc::new(FixedChunker::new(4096));

        let result = pipeline.process_file(Path::new("/no/such/file"), chunker).await;
        assert!(!result.is_success());
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn sparse_holes_are_digested_as_zeros_without_reading_them() {
        use std::os::unix::fs::FileExt;

        let work_dir = tempdir().unwrap();
        let store_dir = tempdir().unwrap();
        let file_path = work_dir.path().join("sparse.bin");

        // 4KiB of real data, a 1MiB hole, then 4KiB more real data.
        let hole_len = 1024 * 1024u64;
        let head = vec![3u8; 4096];
        let tail = vec![9u8; 4096];
        {
            let file = std::fs::File::create(&file_path).unwrap();
            file.write_at(&head, 0).unwrap();
            file.set_len(4096 + hole_len + 4096).unwrap();
            file.write_at(&tail, 4096 + hole_len).unwrap();
        }

        let scheduler = Arc::new(Scheduler::new(SchedulerConfig::default()).unwrap());
        let digest_service = Arc::new(Sha256DigestService);
        let content_sink: Arc<dyn ContentSink> = Arc::new(FsContentSink::new(store_dir.path()));
        let arena = Arc::new(BufferArena::new(4, 4096));

        let pipeline = ChunkPipeline::new(scheduler, digest_service, content_sink, arena);
        let chunker: Arc<dyn Chunker> = Arc::new(FixedChunker::new(4096));

        let result = pipeline.process_file(&file_path, chunker).await;
        assert!(result.is_success());
        assert_eq!(result.total_size(), 4096 + hole_len + 4096);
        // The filesystem may or may not actually punch a hole for this
        // write pattern in a test sandbox; only assert when it did.
        if result.sparse_size() > 0 {
            assert!(result.sparse_size() <= hole_len);
        }
    }
}
