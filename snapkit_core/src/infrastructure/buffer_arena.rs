// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Buffer Arena
//!
//! A bounded pool of reusable byte buffers. The arena is the system's
//! backpressure mechanism: when every buffer is checked out, further reads
//! block (or fail fast, via [`BufferArena::try_acquire`]) instead of letting
//! memory use grow with the number of files in flight.
//!
//! ## Invariant
//!
//! At all times, `in_use_count() + available_count() <= capacity()`. Buffers
//! leave the "available" side only through `acquire`/`try_acquire`, and
//! return to it only when the returned [`BufferHandle`] is dropped.

use snapkit_domain::error::CoreError;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{Semaphore, SemaphorePermit, TryAcquireError};

struct ArenaInner {
    semaphore: Semaphore,
    buffer_size: usize,
    capacity: usize,
    in_use: AtomicUsize,
    closed: std::sync::atomic::AtomicBool,
}

/// A bounded pool of fixed-size byte buffers.
///
/// Cloning an arena clones the handle, not the pool; all clones share the
/// same underlying buffers and permit count.
#[derive(Clone)]
pub struct BufferArena {
    inner: Arc<ArenaInner>,
}

impl BufferArena {
    /// Creates an arena with `capacity` buffers, each `buffer_size` bytes.
    pub fn new(capacity: usize, buffer_size: usize) -> Self {
        Self {
            inner: Arc::new(ArenaInner {
                semaphore: Semaphore::new(capacity),
                buffer_size,
                capacity,
                in_use: AtomicUsize::new(0),
                closed: std::sync::atomic::AtomicBool::new(false),
            }),
        }
    }

    /// Waits for a free buffer and checks it out.
    pub async fn acquire(&self) -> Result<BufferHandle, CoreError> {
        let permit = self.inner.semaphore.acquire().await.map_err(|_| CoreError::PoolClosed)?;
        Ok(self.checkout(permit))
    }

    /// Checks out a buffer without waiting, failing immediately if none is
    /// free.
    pub fn try_acquire(&self) -> Result<BufferHandle, CoreError> {
        match self.inner.semaphore.try_acquire() {
            Ok(permit) => Ok(self.checkout(permit)),
            Err(TryAcquireError::NoPermits) => Err(CoreError::PoolExhausted),
            Err(TryAcquireError::Closed) => Err(CoreError::PoolClosed),
        }
    }

    fn checkout(&self, permit: SemaphorePermit<'_>) -> BufferHandle {
        // The permit borrows `self.inner.semaphore`; forget it and track
        // occupancy with our own counter so the handle can be an owned,
        // 'static value independent of this arena reference's lifetime.
        permit.forget();
        self.inner.in_use.fetch_add(1, Ordering::AcqRel);
        BufferHandle { arena: self.inner.clone(), buffer: vec![0u8; self.inner.buffer_size] }
    }

    /// Closes the arena: outstanding handles may still be returned and
    /// dropped normally, but no further `acquire`/`try_acquire` call
    /// succeeds.
    pub fn close(&self) {
        self.inner.closed.store(true, Ordering::Release);
        self.inner.semaphore.close();
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Acquire)
    }

    pub fn capacity(&self) -> usize {
        self.inner.capacity
    }

    pub fn buffer_size(&self) -> usize {
        self.inner.buffer_size
    }

    pub fn in_use_count(&self) -> usize {
        self.inner.in_use.load(Ordering::Acquire)
    }

    pub fn available_count(&self) -> usize {
        self.inner.semaphore.available_permits()
    }
}

/// An owned, checked-out buffer. Returned to its arena automatically when
/// dropped.
pub struct BufferHandle {
    arena: Arc<ArenaInner>,
    buffer: Vec<u8>,
}

impl BufferHandle {
    pub fn as_slice(&self) -> &[u8] {
        &self.buffer
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.buffer
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}

impl Drop for BufferHandle {
    fn drop(&mut self) {
        self.arena.in_use.fetch_sub(1, Ordering::AcqRel);
        if !self.arena.closed.load(Ordering::Acquire) {
            self.arena.semaphore.add_permits(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn acquire_and_release_conserves_capacity() {
        let arena = BufferArena::new(2, 1024);
        assert_eq!(arena.available_count(), 2);

        let h1 = arena.acquire().await.unwrap();
        assert_eq!(arena.in_use_count(), 1);
        assert_eq!(arena.available_count(), 1);

        let h2 = arena.acquire().await.unwrap();
        assert_eq!(arena.in_use_count(), 2);
        assert_eq!(arena.available_count(), 0);

        drop(h1);
        assert_eq!(arena.in_use_count(), 1);
        assert_eq!(arena.available_count(), 1);

        drop(h2);
        assert_eq!(arena.in_use_count(), 0);
        assert_eq!(arena.available_count(), 2);
    }

    #[test]
    fn try_acquire_fails_fast_when_exhausted() {
        let arena = BufferArena::new(1, 64);
        let _h = arena.try_acquire().unwrap();
        assert!(matches!(arena.try_acquire(), Err(CoreError::PoolExhausted)));
    }

    #[tokio::test]
    async fn closed_arena_rejects_new_acquires_but_allows_release() {
        let arena = BufferArena::new(1, 64);
        let h = arena.acquire().await.unwrap();
        arena.close();
        assert!(matches!(arena.try_acquire(), Err(CoreError::PoolClosed)));
        drop(h);
        assert_eq!(arena.in_use_count(), 0);
    }
}
