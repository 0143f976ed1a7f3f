// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! End-to-end scenarios exercising the walker, chunkers, and processor
//! together rather than in isolation.

use snapkit_core::application::{Processor, ProcessorConfig};
use snapkit_core::infrastructure::{
    BufferArena, Chunker, FastCdcChunker, FixedChunker, FsContentSink, FsMetadataSink, Scheduler, SchedulerConfig,
    Sha256DigestService,
};
use snapkit_core::value_objects::{ChunkingOptions, ScanOptionsBuilder, SymlinkStrategy};
use snapkit_domain::services::DigestService;
use std::sync::Arc;
use tempfile::tempdir;

fn lcg_bytes(seed: u32, len: usize) -> Vec<u8> {
    let mut x = seed;
    let mut out = Vec::with_capacity(len);
    for _ in 0..len {
        x = x.wrapping_mul(1_103_515_245).wrapping_add(12_345);
        out.push((x >> 16) as u8);
    }
    out
}

fn processor_for(
    store_dir: &std::path::Path,
    meta_dir: &std::path::Path,
) -> Processor<Sha256DigestService> {
    let scheduler = Arc::new(Scheduler::new(SchedulerConfig::default()).unwrap());
    let buffer_arena = Arc::new(BufferArena::new(4, 64 * 1024));
    let digest_service = Arc::new(Sha256DigestService);
    let content_sink = Arc::new(FsContentSink::new(store_dir));
    let metadata_sink = Arc::new(FsMetadataSink::new(meta_dir));
    Processor::new(scheduler, buffer_arena, digest_service, content_sink, metadata_sink, ProcessorConfig::default())
}

// S1: an empty file chunks to zero chunks.
#[test]
fn s1_empty_file_yields_no_chunks() {
    let chunker = FixedChunker::new(4096);
    let boundaries = chunker.cut(&[]);
    assert!(boundaries.is_empty());
}

// S2: an exact multiple of chunk_size yields equal-length chunks covering
// the whole file.
#[test]
fn s2_exact_multiple_yields_equal_chunks() {
    let data: Vec<u8> = (0..4096u32).map(|i| (0x42 + (i % 2)) as u8).collect();
    let chunker = FixedChunker::new(1024);
    let boundaries = chunker.cut(&data);
    assert_eq!(boundaries.len(), 4);
    assert!(boundaries.iter().all(|b| b.length == 1024));
    assert_eq!(boundaries.iter().map(|b| b.length).sum::<usize>(), 4096);
}

// S3: a file not evenly divisible by chunk_size leaves a shorter last chunk.
#[test]
fn s3_partial_last_chunk() {
    let data = lcg_bytes(999, 5000);
    let chunker = FixedChunker::new(2048);
    let boundaries = chunker.cut(&data);
    assert_eq!(boundaries.len(), 3);
    assert_eq!(boundaries.last().unwrap().length, 904);
    assert_eq!(boundaries.iter().map(|b| b.length).sum::<usize>(), 5000);
}

// S4: inserting a small random prefix in front of otherwise-identical
// content should leave most chunk boundaries (and therefore digests)
// unchanged; only those near the insertion point should shift.
#[test]
fn s4_shift_resistance_under_cdc() {
    let shared = lcg_bytes(12345, 1024 * 1024);
    let mut prefixed = lcg_bytes(777, 100);
    prefixed.extend_from_slice(&shared);

    let chunker = FastCdcChunker::new(2048, 4096, 16384);
    let a_boundaries = chunker.cut(&shared);
    let b_boundaries = chunker.cut(&prefixed);

    let digest_service = Sha256DigestService;
    let a_digests: std::collections::HashSet<_> = a_boundaries
        .iter()
        .map(|b| digest_service.digest_bytes(&shared[b.offset..b.offset + b.length]).unwrap())
        .collect();
    let b_digests: Vec<_> = b_boundaries
        .iter()
        .map(|b| digest_service.digest_bytes(&prefixed[b.offset..b.offset + b.length]).unwrap())
        .collect();

    let shared_count = b_digests.iter().filter(|d| a_digests.contains(*d)).count();
    let fraction = shared_count as f64 / a_boundaries.len() as f64;
    assert!(fraction >= 0.80, "only {:.2} of A's chunks resurfaced in B", fraction);
}

// S5: processing the same directory twice deduplicates every chunk on the
// second pass while the per-file chunk digests stay identical.
#[tokio::test]
async fn s5_dedup_across_snapshots() {
    let root = tempdir().unwrap();
    let store = tempdir().unwrap();
    let meta = tempdir().unwrap();
    tokio::fs::write(root.path().join("payload.bin"), lcg_bytes(42, 64 * 1024)).await.unwrap();

    let processor = processor_for(store.path(), meta.path());
    let opts = ChunkingOptions::fixed(8192).unwrap();

    let first = processor.process(root.path(), ScanOptionsBuilder::new().build(), opts).await.unwrap();
    assert_eq!(first.processed_files(), 1);
    assert!(!first.had_errors());

    let second = processor.process(root.path(), ScanOptionsBuilder::new().build(), opts).await.unwrap();
    assert_eq!(second.processed_files(), 1);
    assert!(!second.had_errors());

    // Every chunk from the second run was already present, so the content
    // store gained no new shard entries between runs.
    let shard_count = |dir: &std::path::Path| -> usize {
        walkdir_count(dir)
    };
    let count_after_first = shard_count(store.path());
    // Running once more must not grow the store.
    processor.process(root.path(), ScanOptionsBuilder::new().build(), opts).await.unwrap();
    assert_eq!(shard_count(store.path()), count_after_first);
}

fn walkdir_count(dir: &std::path::Path) -> usize {
    let mut count = 0;
    let mut stack = vec![dir.to_path_buf()];
    while let Some(d) = stack.pop() {
        if let Ok(entries) = std::fs::read_dir(&d) {
            for entry in entries.flatten() {
                let path = entry.path();
                if path.is_dir() {
                    stack.push(path);
                } else {
                    count += 1;
                }
            }
        }
    }
    count
}

// S6: symlink policy controls whether a link is skipped, recorded as its
// own entry, or followed and chunked as its target's content.
#[tokio::test]
async fn s6_symlink_policies() {
    use snapkit_domain::value_objects::EntryKind;
    use std::os::unix::fs::symlink;

    let root = tempdir().unwrap();
    std::fs::write(root.path().join("target.txt"), b"hello").unwrap();
    symlink(root.path().join("target.txt"), root.path().join("link.txt")).unwrap();

    for strategy in [SymlinkStrategy::Skip, SymlinkStrategy::Record, SymlinkStrategy::Follow] {
        let opts = ScanOptionsBuilder::new().symlink_strategy(strategy).build();
        let walker = snapkit_core::infrastructure::Walker::new(opts);
        let result = walker.walk(root.path()).unwrap();

        match strategy {
            SymlinkStrategy::Skip => {
                assert_eq!(result.scanned_files().iter().filter(|e| e.is_file()).count(), 1);
                assert!(result.scanned_files().iter().all(|e| e.kind() != EntryKind::Symlink));
            }
            SymlinkStrategy::Record => {
                assert_eq!(result.scanned_files().iter().filter(|e| e.is_file()).count(), 1);
                let link = result.scanned_files().iter().find(|e| e.kind() == EntryKind::Symlink).unwrap();
                assert_eq!(link.link_target(), Some(root.path().join("target.txt")).as_deref());
            }
            SymlinkStrategy::Follow => {
                let files: Vec<_> = result.scanned_files().iter().filter(|e| e.is_file()).collect();
                assert_eq!(files.len(), 2);
                assert_eq!(files[0].size(), files[1].size());
            }
        }
    }
}

// S7: an undersized buffer arena still lets every concurrent pipeline
// complete, and never exceeds its configured capacity in flight.
#[tokio::test]
async fn s7_buffer_exhaustion_recovery() {
    let root = tempdir().unwrap();
    let store = tempdir().unwrap();
    let meta = tempdir().unwrap();
    for i in 0..10 {
        tokio::fs::write(root.path().join(format!("f{i}.bin")), lcg_bytes(i as u32, 8192)).await.unwrap();
    }

    let scheduler = Arc::new(Scheduler::new(SchedulerConfig::default()).unwrap());
    let arena = Arc::new(BufferArena::new(2, 4096));
    let digest_service = Arc::new(Sha256DigestService);
    let content_sink = Arc::new(FsContentSink::new(store.path()));
    let metadata_sink = Arc::new(FsMetadataSink::new(meta.path()));
    let processor = Processor::new(
        scheduler,
        arena.clone(),
        digest_service,
        content_sink,
        metadata_sink,
        ProcessorConfig { file_concurrency: 10, ..ProcessorConfig::default() },
    );

    let result = processor
        .process(root.path(), ScanOptionsBuilder::new().build(), ChunkingOptions::fixed(4096).unwrap())
        .await
        .unwrap();

    assert_eq!(result.processed_files(), 10);
    assert!(!result.had_errors());
    assert_eq!(arena.in_use_count(), 0);
}
