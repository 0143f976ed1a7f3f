// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Chunker
//!
//! The common contract shared by [`crate::infrastructure::fixed_chunker::FixedChunker`]
//! and [`crate::infrastructure::fastcdc_chunker::FastCdcChunker`]: given a
//! byte slice, produce the ordered list of chunk boundaries that a file
//! should be split into.
//!
//! Chunkers are pure functions over in-memory data; they do not read files or
//! know about sparse holes. [`crate::infrastructure::chunk_pipeline::ChunkPipeline`]
//! drives a chunker over a bounded sliding window rather than the whole file
//! at once: since a cut decision for the chunk starting at `offset` only
//! ever looks ahead as far as `offset + max_window()`, a window of that size
//! is always enough to resolve one further chunk boundary. This keeps the
//! in-flight byte count at O(`max_window()`) regardless of file size.

/// One chunk boundary within a byte slice: a half-open `[offset, offset +
/// length)` range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkBoundary {
    pub offset: usize,
    pub length: usize,
}

/// Splits a byte buffer into an ordered, contiguous, non-overlapping list of
/// chunk boundaries covering the whole buffer.
pub trait Chunker: Send + Sync {
    /// Returns the chunk boundaries for `data`. An empty `data` yields an
    /// empty result (zero chunks), not a single empty chunk.
    fn cut(&self, data: &[u8]) -> Vec<ChunkBoundary>;

    /// The largest number of lookahead bytes a cut decision for one chunk
    /// can depend on. A window this size, once full (or once the file ends),
    /// is always enough to resolve the next confirmed chunk boundary.
    fn max_window(&self) -> usize;
}

/// Asserts, in debug builds and tests, that a chunker's output is
/// well-formed: contiguous, covering the whole input, non-empty chunks.
#[cfg(test)]
pub(crate) fn assert_well_formed(data_len: usize, boundaries: &[ChunkBoundary]) {
    let mut expected_offset = 0usize;
    for b in boundaries {
        assert_eq!(b.offset, expected_offset, "chunk boundaries must be contiguous");
        assert!(b.length > 0, "chunks must be non-empty");
        expected_offset += b.length;
    }
    assert_eq!(expected_offset, data_len, "chunk boundaries must cover the whole input");
}
