// /////////////////////////////////////////////////////////////////////////////
// Snapkit
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Digest Service
//!
//! The domain depends only on these two traits for hashing; it never names a
//! concrete algorithm. `snapkit-core` provides the default implementation
//! (SHA-256, via the `sha2` crate) behind this seam so that the chunking and
//! dedup logic stays algorithm-agnostic.

use crate::error::CoreError;
use crate::value_objects::Digest;

/// Produces digests of complete byte buffers and incremental digesters.
pub trait DigestService: Send + Sync {
    /// The incremental digester type this service produces.
    type Incremental: IncrementalDigest;

    /// Digests a complete, already-in-memory buffer in one call.
    fn digest_bytes(&self, data: &[u8]) -> Result<Digest, CoreError>;

    /// Starts a new incremental digest, used when chunk content streams in
    /// pieces (e.g. while reassembling sparse holes as zero runs).
    fn new_incremental(&self) -> Self::Incremental;
}

/// A digest accumulator fed incrementally, one piece at a time.
///
/// `update_zeros` exists as its own method, rather than requiring the caller
/// to materialize a zero-filled buffer, so that a sparse hole of gigabytes
/// can be folded into a digest without allocating gigabytes of zero bytes.
pub trait IncrementalDigest {
    /// Feeds real bytes into the digest.
    fn update(&mut self, data: &[u8]);

    /// Feeds `count` zero bytes into the digest, as if `update(&[0u8; count])`
    /// had been called, without requiring the caller to allocate that buffer.
    fn update_zeros(&mut self, count: u64);

    /// Finalizes and returns the digest. Consumes the accumulator.
    fn finish(self) -> Digest;

    /// Resets the accumulator to its initial state for reuse.
    fn reset(&mut self);
}
