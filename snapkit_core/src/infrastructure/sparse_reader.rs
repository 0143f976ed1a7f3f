// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Sparse Reader
//!
//! Maps a file's byte range into an ordered list of [`ByteRun`]s marking
//! which ranges hold real data on disk and which are unallocated holes.
//! [`crate::infrastructure::chunk_pipeline::ChunkPipeline`] never reads hole
//! ranges from disk: it synthesizes zero bytes for them directly, which
//! keeps a sparse file's processing cost proportional to its allocated
//! size rather than its logical size.

use std::fs::File;
use std::io;
use std::path::Path;

/// One contiguous byte range of a file: either backed by real data on disk,
/// or an unallocated hole that reads as zeros.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRun {
    pub offset: u64,
    pub length: u64,
    pub is_hole: bool,
}

/// Plans the data/hole runs covering `[0, len)` of `path`.
///
/// Falls back to a single dense run covering the whole file when the
/// platform or filesystem doesn't support `SEEK_DATA`/`SEEK_HOLE` (or the
/// file can't be opened here) — correct, just without the read-avoidance
/// optimization for holes.
pub fn plan_byte_runs(path: &Path, len: u64) -> Vec<ByteRun> {
    if len == 0 {
        return Vec::new();
    }

    #[cfg(target_os = "linux")]
    {
        if let Ok(file) = File::open(path) {
            if let Ok(runs) = plan_via_seek_hole(&file, len) {
                return runs;
            }
        }
    }

    let _ = path;
    vec![ByteRun { offset: 0, length: len, is_hole: false }]
}

#[cfg(target_os = "linux")]
fn plan_via_seek_hole(file: &File, len: u64) -> io::Result<Vec<ByteRun>> {
    use std::os::unix::io::AsRawFd;

    let fd = file.as_raw_fd();
    let mut runs = Vec::new();
    let mut pos: i64 = 0;

    while (pos as u64) < len {
        let data_start = seek(fd, pos, libc::SEEK_DATA).unwrap_or(len as i64).min(len as i64);
        if data_start as u64 > pos as u64 {
            runs.push(ByteRun { offset: pos as u64, length: data_start as u64 - pos as u64, is_hole: true });
        }
        if data_start as u64 >= len {
            break;
        }

        let hole_start = seek(fd, data_start, libc::SEEK_HOLE).unwrap_or(len as i64).min(len as i64);
        runs.push(ByteRun {
            offset: data_start as u64,
            length: hole_start as u64 - data_start as u64,
            is_hole: false,
        });
        pos = hole_start;
    }

    if runs.is_empty() {
        runs.push(ByteRun { offset: 0, length: len, is_hole: false });
    }
    Ok(runs)
}

#[cfg(target_os = "linux")]
fn seek(fd: i32, offset: i64, whence: i32) -> Option<i64> {
    let result = unsafe { libc::lseek(fd, offset, whence) };
    if result < 0 {
        None
    } else {
        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn empty_file_has_no_runs() {
        assert!(plan_byte_runs(Path::new("/does/not/matter"), 0).is_empty());
    }

    #[test]
    fn dense_file_is_reported_as_one_data_run() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("f");
        std::fs::write(&path, vec![1u8; 8192]).unwrap();

        let runs = plan_byte_runs(&path, 8192);
        assert_eq!(runs.iter().map(|r| r.length).sum::<u64>(), 8192);
        assert!(runs.iter().all(|r| !r.is_hole));
    }
}
