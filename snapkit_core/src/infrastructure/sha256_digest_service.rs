// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # SHA-256 Digest Service
//!
//! The reference [`DigestService`] implementation, backed by the `sha2`
//! crate. Chunk and file digests both use this; the core never treats the
//! two differently beyond where their inputs come from.

use snapkit_domain::error::CoreError;
use snapkit_domain::services::{DigestService, IncrementalDigest};
use snapkit_domain::value_objects::Digest;
use sha2::{Digest as _, Sha256};

/// SHA-256-backed [`DigestService`].
#[derive(Debug, Default, Clone, Copy)]
pub struct Sha256DigestService;

impl DigestService for Sha256DigestService {
    type Incremental = Sha256Incremental;

    fn digest_bytes(&self, data: &[u8]) -> Result<Digest, CoreError> {
        let mut hasher = Sha256::new();
        hasher.update(data);
        Ok(Digest::from_bytes(hasher.finalize().to_vec()))
    }

    fn new_incremental(&self) -> Self::Incremental {
        Sha256Incremental { hasher: Sha256::new() }
    }
}

/// Incremental SHA-256 accumulator.
///
/// `update_zeros` materializes a zero buffer in bounded-size chunks rather
/// than allocating the whole run at once, so a multi-gigabyte sparse hole
/// does not require a multi-gigabyte allocation.
pub struct Sha256Incremental {
    hasher: Sha256,
}

impl IncrementalDigest for Sha256Incremental {
    fn update(&mut self, data: &[u8]) {
        self.hasher.update(data);
    }

    fn update_zeros(&mut self, mut count: u64) {
        const ZERO_BUF: [u8; 8192] = [0u8; 8192];
        while count > 0 {
            let take = count.min(ZERO_BUF.len() as u64) as usize;
            self.hasher.update(&ZERO_BUF[..take]);
            count -= take as u64;
        }
    }

    fn finish(self) -> Digest {
        Digest::from_bytes(self.hasher.finalize().to_vec())
    }

    fn reset(&mut self) {
        self.hasher = Sha256::new();
    }
}
