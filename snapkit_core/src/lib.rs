// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Snapkit Core
//!
//! The scanning-and-chunking core of snapkit, a content-addressed,
//! deduplicating backup engine. This crate implements the domain contracts
//! declared in `snapkit-domain`:
//!
//! - [`infrastructure::Walker`] traverses a directory tree into
//!   [`snapkit_domain::value_objects::WalkEntry`] records.
//! - [`infrastructure::FixedChunker`] and [`infrastructure::FastCdcChunker`]
//!   cut a file's bytes into content-addressed chunks, the latter using
//!   gear-hash content-defined chunking so that an insertion or deletion
//!   shifts only the chunks around it rather than every chunk downstream.
//! - [`infrastructure::Scheduler`] and [`infrastructure::BufferArena`] bound
//!   the CPU and memory concurrency of a run.
//! - [`infrastructure::ChunkPipeline`] drives one file through read, cut,
//!   digest, and store.
//! - [`infrastructure::FsContentSink`] and [`infrastructure::FsMetadataSink`]
//!   are the local-filesystem implementations of the domain's storage ports.
//! - [`application::Processor`] is the single entry point that ties a whole
//!   run together: walk, then chunk every discovered file, then finish the
//!   snapshot.
//!
//! ## Architecture
//!
//! The crate follows the same layering as the domain crate it depends on:
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │              presentation                     │
//! │   (formats a ProcessingResult for a caller)    │
//! ├──────────────────────────────────────────────┤
//! │               application                     │
//! │        (Processor: orchestrates a run)         │
//! ├──────────────────────────────────────────────┤
//! │              infrastructure                    │
//! │  (walker, chunkers, scheduler, sinks, config)  │
//! ├──────────────────────────────────────────────┤
//! │            snapkit-domain (dependency)         │
//! │     (entities, value objects, service traits)  │
//! └──────────────────────────────────────────────┘
//! ```

pub mod application;
pub mod infrastructure;
pub mod presentation;

pub use snapkit_domain::error::CoreError;
pub use snapkit_domain::{entities, services, value_objects};
