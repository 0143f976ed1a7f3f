// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Run Metrics
//!
//! Prometheus counters and gauges for one scan-and-chunk run: files seen,
//! bytes processed, chunks produced, and errors encountered. A thin wrapper
//! over a private [`prometheus::Registry`] so a caller can export it (e.g.
//! behind an HTTP `/metrics` endpoint) without reaching into the run loop.

use prometheus::{IntCounter, IntGauge, Opts, Registry};
use snapkit_domain::error::CoreError;
use std::sync::Arc;

/// Metrics for a single run of the scanning-and-chunking core.
#[derive(Clone)]
pub struct RunMetrics {
    registry: Arc<Registry>,
    files_scanned_total: IntCounter,
    files_processed_total: IntCounter,
    files_failed_total: IntCounter,
    bytes_processed_total: IntCounter,
    chunks_produced_total: IntCounter,
    files_in_flight: IntGauge,
}

impl RunMetrics {
    pub fn new() -> Result<Self, CoreError> {
        let registry = Registry::new();
        let namespace = "snapkit";

        let files_scanned_total = counter(&registry, namespace, "files_scanned_total", "Files seen by the walker")?;
        let files_processed_total =
            counter(&registry, namespace, "files_processed_total", "Files successfully chunked and stored")?;
        let files_failed_total = counter(&registry, namespace, "files_failed_total", "Files that failed to chunk")?;
        let bytes_processed_total =
            counter(&registry, namespace, "bytes_processed_total", "Bytes read from successfully processed files")?;
        let chunks_produced_total =
            counter(&registry, namespace, "chunks_produced_total", "Chunks produced across all files")?;

        let files_in_flight = IntGauge::with_opts(
            Opts::new("files_in_flight", "Files currently being chunked").namespace(namespace),
        )
        .map_err(metrics_err)?;
        registry.register(Box::new(files_in_flight.clone())).map_err(metrics_err)?;

        Ok(Self {
            registry: Arc::new(registry),
            files_scanned_total,
            files_processed_total,
            files_failed_total,
            bytes_processed_total,
            chunks_produced_total,
            files_in_flight,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn record_scanned(&self) {
        self.files_scanned_total.inc();
    }

    pub fn record_file_started(&self) {
        self.files_in_flight.inc();
    }

    pub fn record_file_success(&self, bytes: u64, chunk_count: u64) {
        self.files_in_flight.dec();
        self.files_processed_total.inc();
        self.bytes_processed_total.inc_by(bytes);
        self.chunks_produced_total.inc_by(chunk_count);
    }

    pub fn record_file_failure(&self) {
        self.files_in_flight.dec();
        self.files_failed_total.inc();
    }

    pub fn files_processed(&self) -> u64 {
        self.files_processed_total.get()
    }

    pub fn files_failed(&self) -> u64 {
        self.files_failed_total.get()
    }
}

fn counter(registry: &Registry, namespace: &str, name: &str, help: &str) -> Result<IntCounter, CoreError> {
    let counter = IntCounter::with_opts(Opts::new(name, help).namespace(namespace)).map_err(metrics_err)?;
    registry.register(Box::new(counter.clone())).map_err(metrics_err)?;
    Ok(counter)
}

fn metrics_err(err: prometheus::Error) -> CoreError {
    CoreError::invalid_argument(format!("metrics error: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_updates_processed_and_clears_in_flight() {
        let metrics = RunMetrics::new().unwrap();
        metrics.record_file_started();
        metrics.record_file_success(1024, 3);
        assert_eq!(metrics.files_processed(), 1);
        assert_eq!(metrics.files_failed(), 0);
    }

    #[test]
    fn failure_updates_failed_counter() {
        let metrics = RunMetrics::new().unwrap();
        metrics.record_file_started();
        metrics.record_file_failure();
        assert_eq!(metrics.files_failed(), 1);
    }
}
