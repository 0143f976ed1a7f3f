// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Infrastructure
//!
//! Concrete adapters for the ports declared in `snapkit-domain`, plus the
//! scanning and chunking machinery that has no domain-level port of its own
//! (the walker, the chunkers, the scheduler, the buffer arena). Everything
//! here is swappable: a caller in `application` depends on the domain
//! traits, not on these types directly, except where wiring them up is the
//! whole point (bootstrap, `main`).

pub mod buffer_arena;
pub mod chunk_pipeline;
pub mod chunker;
pub mod config;
pub mod fastcdc_chunker;
pub mod fastcdc_gear;
pub mod fixed_chunker;
pub mod fs_content_sink;
pub mod fs_metadata_sink;
pub mod logging;
pub mod metrics;
pub mod scheduler;
pub mod sha256_digest_service;
pub mod sparse_reader;
pub mod walker;

pub use buffer_arena::{BufferArena, BufferHandle};
pub use chunk_pipeline::ChunkPipeline;
pub use chunker::{ChunkBoundary, Chunker};
pub use config::AppConfig;
pub use fastcdc_chunker::FastCdcChunker;
pub use fixed_chunker::FixedChunker;
pub use fs_content_sink::FsContentSink;
pub use fs_metadata_sink::FsMetadataSink;
pub use logging::{init_logging, LogFormat};
pub use metrics::RunMetrics;
pub use scheduler::{Scheduler, SchedulerConfig, StorageType};
pub use sha256_digest_service::Sha256DigestService;
pub use sparse_reader::ByteRun;
pub use walker::Walker;
