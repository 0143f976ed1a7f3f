// /////////////////////////////////////////////////////////////////////////////
// Snapkit
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Chunking Options
//!
//! Configuration for how a file is split into chunks: either fixed-size
//! windows or content-defined chunking (CDC) via the FastCDC-style gear-hash
//! algorithm.
//!
//! ## Validation
//!
//! `ChunkingOptions` is validated at construction, not used lazily: an
//! invalid combination of sizes (e.g. `min > avg` for CDC, or `chunk_size =
//! 0`) is rejected immediately with [`CoreError::InvalidArgument`], per the
//! Open Question in the specification that flags ambiguous behavior in the
//! source when `min > chunk_size` or `max < chunk_size`.

use crate::error::CoreError;
use serde::{Deserialize, Serialize};

/// Which chunking strategy to apply to a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChunkingAlgorithm {
    /// Equal-sized windows; the last chunk may be shorter.
    Fixed,
    /// FastCDC-style content-defined chunking.
    Cdc,
}

/// Immutable, validated configuration for a chunking run.
///
/// # Examples
///
/// ```
/// use snapkit_domain::value_objects::{ChunkingAlgorithm, ChunkingOptions};
///
/// let opts = ChunkingOptions::fixed(1024 * 1024).unwrap();
/// assert_eq!(opts.algorithm(), ChunkingAlgorithm::Fixed);
///
/// let cdc = ChunkingOptions::cdc_with_defaults(4096).unwrap();
/// assert!(cdc.min_chunk_size() <= cdc.chunk_size());
/// assert!(cdc.chunk_size() <= cdc.max_chunk_size());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkingOptions {
    algorithm: ChunkingAlgorithm,
    chunk_size: usize,
    min_chunk_size: usize,
    max_chunk_size: usize,
    use_async_io: bool,
    detect_sparse_files: bool,
}

impl ChunkingOptions {
    /// Minimum allowed `min_chunk_size` for CDC, matching the wire-contract
    /// floor of 512 bytes used to derive the default `min` from `avg`.
    pub const CDC_MIN_FLOOR: usize = 512;

    /// Builds fixed-size chunking options.
    pub fn fixed(chunk_size: usize) -> Result<Self, CoreError> {
        if chunk_size == 0 {
            return Err(CoreError::invalid_argument("chunk_size must be >= 1"));
        }
        Ok(Self {
            algorithm: ChunkingAlgorithm::Fixed,
            chunk_size,
            min_chunk_size: chunk_size,
            max_chunk_size: chunk_size,
            use_async_io: false,
            detect_sparse_files: false,
        })
    }

    /// Builds CDC chunking options with explicit bounds.
    pub fn cdc(avg: usize, min: usize, max: usize) -> Result<Self, CoreError> {
        if avg == 0 || min == 0 || max == 0 {
            return Err(CoreError::invalid_argument("CDC sizes must be >= 1"));
        }
        if min > avg {
            return Err(CoreError::invalid_argument("min_chunk_size must be <= chunk_size (avg)"));
        }
        if max < avg {
            return Err(CoreError::invalid_argument("max_chunk_size must be >= chunk_size (avg)"));
        }
        Ok(Self {
            algorithm: ChunkingAlgorithm::Cdc,
            chunk_size: avg,
            min_chunk_size: min,
            max_chunk_size: max,
            use_async_io: false,
            detect_sparse_files: false,
        })
    }

    /// Builds CDC chunking options using the wire-contract defaults derived
    /// from `avg` alone: `min = max(avg / 4, 512)`, `max = avg * 4`.
    pub fn cdc_with_defaults(avg: usize) -> Result<Self, CoreError> {
        if avg == 0 {
            return Err(CoreError::invalid_argument("chunk_size (avg) must be >= 1"));
        }
        let min = (avg / 4).max(Self::CDC_MIN_FLOOR);
        let max = avg.saturating_mul(4);
        Self::cdc(avg, min, max)
    }

    /// Enables or disables async I/O for the read path (infrastructure hint;
    /// the core's contracts are unaffected either way).
    pub fn with_async_io(mut self, enabled: bool) -> Self {
        self.use_async_io = enabled;
        self
    }

    /// Enables or disables sparse-hole detection.
    pub fn with_sparse_detection(mut self, enabled: bool) -> Self {
        self.detect_sparse_files = enabled;
        self
    }

    pub fn algorithm(&self) -> ChunkingAlgorithm {
        self.algorithm
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn min_chunk_size(&self) -> usize {
        self.min_chunk_size
    }

    pub fn max_chunk_size(&self) -> usize {
        self.max_chunk_size
    }

    pub fn use_async_io(&self) -> bool {
        self.use_async_io
    }

    pub fn detect_sparse_files(&self) -> bool {
        self.detect_sparse_files
    }
}

impl Default for ChunkingOptions {
    /// 1 MiB fixed chunking, matching the teacher crate's historical default
    /// chunk size for the file I/O path.
    fn default() -> Self {
        Self::fixed(1024 * 1024).expect("1 MiB is always a valid chunk size")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_rejects_zero() {
        assert!(ChunkingOptions::fixed(0).is_err());
    }

    #[test]
    fn cdc_rejects_min_above_avg() {
        assert!(ChunkingOptions::cdc(4096, 5000, 16384).is_err());
    }

    #[test]
    fn cdc_rejects_max_below_avg() {
        assert!(ChunkingOptions::cdc(4096, 1024, 2048).is_err());
    }

    #[test]
    fn cdc_defaults_follow_wire_contract() {
        let opts = ChunkingOptions::cdc_with_defaults(4096).unwrap();
        assert_eq!(opts.min_chunk_size(), 1024);
        assert_eq!(opts.max_chunk_size(), 16384);

        // avg/4 below the 512-byte floor clamps up.
        let small = ChunkingOptions::cdc_with_defaults(1024).unwrap();
        assert_eq!(small.min_chunk_size(), 512);
    }
}
