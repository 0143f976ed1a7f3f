// /////////////////////////////////////////////////////////////////////////////
// Snapkit
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Content Sink
//!
//! The output port for deduplicated chunk bytes. A `ContentSink` is the
//! content-addressed store: it never sees a file path, only digests and
//! bytes, and it is responsible for deciding whether a digest is already
//! present.

use crate::error::CoreError;
use crate::value_objects::Digest;
use async_trait::async_trait;

/// Stores chunk bytes keyed by their digest, deduplicating on write.
///
/// Implementations MUST be idempotent: calling `put` twice with the same
/// digest and equal bytes has the same observable effect as calling it
/// once. The core relies on this to retry after cancellation without
/// double-writing.
#[async_trait]
pub trait ContentSink: Send + Sync {
    /// Stores `bytes` under `digest` unless already present.
    ///
    /// Returns `Ok(true)` if this call actually wrote new content, or
    /// `Ok(false)` if `digest` was already present and no write happened.
    async fn put(&self, digest: &Digest, bytes: &[u8]) -> Result<bool, CoreError>;

    /// Reports whether `digest` is already stored, without reading it back.
    async fn contains(&self, digest: &Digest) -> Result<bool, CoreError>;
}
