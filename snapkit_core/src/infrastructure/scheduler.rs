// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Scheduler
//!
//! Two logical worker pools behind one API:
//!
//! - A CPU-bound [`rayon::ThreadPool`] for hashing and content-defined
//!   chunking, sized to the available cores.
//! - An I/O-bound pool gated by a [`tokio::sync::Semaphore`], for file
//!   reads, sized to a device-appropriate queue depth.
//!
//! Both `submit_cpu` and `submit_io` return a future the caller can await
//! directly; the scheduler additionally tracks how many submissions are
//! still outstanding so that [`Scheduler::await_all`] and
//! [`Scheduler::shutdown`] can wait for everything currently in flight
//! without the caller having to collect every future itself.

use snapkit_domain::error::CoreError;
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{oneshot, Notify, Semaphore};

/// Storage device type, used only to pick a sensible default I/O queue
/// depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageType {
    Nvme,
    Ssd,
    Hdd,
    Custom(usize),
}

impl StorageType {
    fn queue_depth(self) -> usize {
        match self {
            StorageType::Nvme => 24,
            StorageType::Ssd => 12,
            StorageType::Hdd => 4,
            StorageType::Custom(n) => n,
        }
    }
}

/// Configuration for [`Scheduler::new`].
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// CPU worker count; defaults to `available_cores - 1` (leaving one
    /// core for the async runtime and OS).
    pub cpu_workers: Option<usize>,
    /// I/O concurrency limit; defaults to a device-specific queue depth.
    pub io_concurrency: Option<usize>,
    pub storage_type: StorageType,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self { cpu_workers: None, io_concurrency: None, storage_type: StorageType::Ssd }
    }
}

/// Coordinates CPU-bound and I/O-bound work across two differently-shaped
/// pools.
pub struct Scheduler {
    cpu_pool: rayon::ThreadPool,
    io_semaphore: Arc<Semaphore>,
    pending: Arc<AtomicUsize>,
    idle: Arc<Notify>,
    closed: Arc<AtomicBool>,
}

impl Scheduler {
    pub fn new(config: SchedulerConfig) -> Result<Self, CoreError> {
        let available_cores = std::thread::available_parallelism().map(|n| n.get()).unwrap_or(4);
        let cpu_workers = config.cpu_workers.unwrap_or_else(|| (available_cores.saturating_sub(1)).max(1));
        let io_concurrency = config.io_concurrency.unwrap_or_else(|| config.storage_type.queue_depth());

        let cpu_pool = rayon::ThreadPoolBuilder::new()
            .num_threads(cpu_workers)
            .thread_name(|i| format!("snapkit-cpu-{i}"))
            .build()
            .map_err(|e| CoreError::invalid_argument(format!("failed to build CPU pool: {e}")))?;

        Ok(Self {
            cpu_pool,
            io_semaphore: Arc::new(Semaphore::new(io_concurrency)),
            pending: Arc::new(AtomicUsize::new(0)),
            idle: Arc::new(Notify::new()),
            closed: Arc::new(AtomicBool::new(false)),
        })
    }

    fn settle(pending: &AtomicUsize, idle: &Notify) {
        if pending.fetch_sub(1, Ordering::AcqRel) == 1 {
            idle.notify_waiters();
        }
    }

    /// Runs `f` on the CPU-bound pool. Use for hashing and chunking.
    pub fn submit_cpu<F, T>(&self, f: F) -> std::pin::Pin<Box<dyn Future<Output = Result<T, CoreError>> + Send>>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        if self.closed.load(Ordering::Acquire) {
            return Box::pin(async { Err(CoreError::ProcessorClosed) });
        }

        let (tx, rx) = oneshot::channel();
        self.pending.fetch_add(1, Ordering::AcqRel);
        let pending = self.pending.clone();
        let idle = self.idle.clone();
        self.cpu_pool.spawn(move || {
            let result = f();
            let _ = tx.send(result);
            Self::settle(&pending, &idle);
        });

        Box::pin(async move { rx.await.map_err(|_| CoreError::Cancelled) })
    }

    /// Runs `fut` once an I/O permit is available. Use for file reads.
    pub fn submit_io<Fut, T>(&self, fut: Fut) -> std::pin::Pin<Box<dyn Future<Output = Result<T, CoreError>> + Send>>
    where
        Fut: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        if self.closed.load(Ordering::Acquire) {
            return Box::pin(async { Err(CoreError::ProcessorClosed) });
        }

        self.pending.fetch_add(1, Ordering::AcqRel);
        let sem = self.io_semaphore.clone();
        let pending = self.pending.clone();
        let idle = self.idle.clone();
        let handle = tokio::spawn(async move {
            let _permit = sem.acquire().await;
            let result = fut.await;
            Self::settle(&pending, &idle);
            result
        });

        Box::pin(async move { handle.await.map_err(|_| CoreError::Cancelled) })
    }

    /// Waits until no submissions are outstanding.
    pub async fn await_all(&self) {
        loop {
            if self.pending.load(Ordering::Acquire) == 0 {
                return;
            }
            self.idle.notified().await;
        }
    }

    /// Stops accepting new submissions and waits up to `grace` for
    /// outstanding work to finish.
    ///
    /// This is best-effort: a CPU closure already running on the rayon pool
    /// cannot be forcibly interrupted, so callers that need hard cancellation
    /// must check a cancellation signal from within their own closures (see
    /// the `Processor`'s cooperative `stop()`).
    pub async fn shutdown(&self, grace: Duration) {
        self.closed.store(true, Ordering::Release);
        let _ = tokio::time::timeout(grace, self.await_all()).await;
    }

    pub fn cpu_worker_count(&self) -> usize {
        self.cpu_pool.current_num_threads()
    }

    pub fn io_concurrency(&self) -> usize {
        self.io_semaphore.available_permits()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn submit_cpu_runs_closure_and_resolves() {
        let sched = Scheduler::new(SchedulerConfig::default()).unwrap();
        let result = sched.submit_cpu(|| 2 + 2).await.unwrap();
        assert_eq!(result, 4);
    }

    #[tokio::test]
    async fn submit_io_runs_future_and_resolves() {
        let sched = Scheduler::new(SchedulerConfig::default()).unwrap();
        let result = sched.submit_io(async { 40 + 2 }).await.unwrap();
        assert_eq!(result, 42);
    }

    #[tokio::test]
    async fn await_all_waits_for_outstanding_work() {
        let sched = Scheduler::new(SchedulerConfig::default()).unwrap();
        for i in 0..8u32 {
            let fut = sched.submit_cpu(move || i * 2);
            tokio::spawn(async move {
                let _ = fut.await;
            });
        }
        sched.await_all().await;
        assert_eq!(sched.pending_count(), 0);
    }

    #[tokio::test]
    async fn shutdown_rejects_new_submissions() {
        let sched = Scheduler::new(SchedulerConfig::default()).unwrap();
        sched.shutdown(Duration::from_millis(50)).await;
        let result = sched.submit_cpu(|| 1).await;
        assert!(matches!(result, Err(CoreError::ProcessorClosed)));
    }
}
