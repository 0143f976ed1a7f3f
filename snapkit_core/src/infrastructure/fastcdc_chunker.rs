// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # FastCDC Chunker
//!
//! Content-defined chunking via a rolling gear hash. Chunk boundaries are a
//! function of the data itself, so inserting or deleting bytes only
//! perturbs the chunks adjacent to the edit, which is what makes
//! deduplication effective across similar files.
//!
//! ## Algorithm
//!
//! The gear fingerprint is updated as `fp = (fp << 1).wrapping_add(GEAR[byte])`
//! over every byte from the start of the chunk, and a cut happens at the
//! first position at or past `min_size` where `fp & mask == 0`. Two masks
//! are used, matching the original FastCDC paper's two-region strategy:
//!
//! - While the chunk is shorter than `avg_size`, the *stricter* mask
//!   (`mask_small`, more bits) applies, making a cut less likely so chunks
//!   don't skew small.
//! - Once the chunk reaches `avg_size`, the *looser* mask (`mask_large`,
//!   fewer bits) applies, making a cut more likely so chunks don't skew
//!   large.
//!
//! No cut ever happens before `min_size`, and a cut is forced at `max_size`
//! if the mask never hits.

use crate::infrastructure::chunker::{ChunkBoundary, Chunker};
use crate::infrastructure::fastcdc_gear::GEAR;

/// Content-defined chunker parameterized by min/avg/max chunk size.
pub struct FastCdcChunker {
    min_size: usize,
    max_size: usize,
    avg_size: usize,
    mask_small: u64,
    mask_large: u64,
}

impl FastCdcChunker {
    /// Builds a chunker from already-validated bounds (see
    /// `snapkit_domain::value_objects::ChunkingOptions::cdc`).
    pub fn new(min_size: usize, avg_size: usize, max_size: usize) -> Self {
        let avg_bits = (avg_size.max(2) as f64).log2().round() as u32;
        let mask_small = Self::low_bits_mask((avg_bits + 1).min(63));
        let mask_large = Self::low_bits_mask(avg_bits.saturating_sub(1));
        Self { min_size, max_size, avg_size, mask_small, mask_large }
    }

    fn low_bits_mask(bits: u32) -> u64 {
        if bits == 0 {
            0
        } else {
            !0u64 >> (64 - bits)
        }
    }
}

impl Chunker for FastCdcChunker {
    fn cut(&self, data: &[u8]) -> Vec<ChunkBoundary> {
        if data.is_empty() {
            return Vec::new();
        }

        let mut boundaries = Vec::new();
        let mut start = 0usize;

        while start < data.len() {
            let remaining = data.len() - start;
            if remaining <= self.min_size {
                boundaries.push(ChunkBoundary { offset: start, length: remaining });
                break;
            }

            let window_end = (start + self.max_size).min(data.len());
            let avg_point = (start + self.avg_size).min(window_end);

            let mut fp: u64 = 0;
            let mut i = start;
            let mut cut_at = None;

            while i < window_end {
                fp = (fp << 1).wrapping_add(GEAR[data[i] as usize]);
                if i + 1 - start >= self.min_size {
                    let mask = if i < avg_point { self.mask_small } else { self.mask_large };
                    if fp & mask == 0 {
                        cut_at = Some(i + 1);
                        break;
                    }
                }
                i += 1;
            }

            let end = cut_at.unwrap_or(window_end);
            boundaries.push(ChunkBoundary { offset: start, length: end - start });
            start = end;
        }

        boundaries
    }

    fn max_window(&self) -> usize {
        self.max_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::chunker::assert_well_formed;

    fn chunker() -> FastCdcChunker {
        FastCdcChunker::new(1024, 4096, 16384)
    }

    #[test]
    fn empty_input_yields_no_chunks() {
        assert!(chunker().cut(&[]).is_empty());
    }

    #[test]
    fn short_input_under_min_is_one_chunk() {
        let data = vec![7u8; 512];
        let boundaries = chunker().cut(&data);
        assert_eq!(boundaries.len(), 1);
        assert_well_formed(data.len(), &boundaries);
    }

    #[test]
    fn chunks_respect_min_and_max_bounds() {
        let c = chunker();
        let mut data = Vec::with_capacity(200_000);
        let mut x: u32 = 12345;
        for _ in 0..200_000 {
            x = x.wrapping_mul(1103515245).wrapping_add(12345);
            data.push((x >> 16) as u8);
        }
        let boundaries = c.cut(&data);
        assert_well_formed(data.len(), &boundaries);
        for (idx, b) in boundaries.iter().enumerate() {
            assert!(b.length <= c.max_size);
            if idx + 1 < boundaries.len() {
                assert!(b.length >= c.min_size, "non-final chunk below min: {}", b.length);
            }
        }
    }

    #[test]
    fn identical_prefix_yields_identical_leading_chunks() {
        let c = chunker();
        let mut base = Vec::with_capacity(50_000);
        let mut x: u32 = 42;
        for _ in 0..50_000 {
            x = x.wrapping_mul(1103515245).wrapping_add(12345);
            base.push((x >> 16) as u8);
        }
        let mut modified = base.clone();
        modified.extend_from_slice(b"trailer appended after a shared prefix");

        let a = c.cut(&base);
        let b = c.cut(&modified);
        assert_eq!(a[..a.len() - 1], b[..a.len() - 1]);
    }
}
