// /////////////////////////////////////////////////////////////////////////////
// Snapkit
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Snapkit Domain
//!
//! The domain layer of snapkit's scanning-and-chunking core: the entities,
//! value objects, and service contracts that describe what a backup run
//! *is*, independent of how files are read, how chunks are hashed, or where
//! bytes end up.
//!
//! ## Layout
//!
//! - [`value_objects`] — immutable, validated configuration and data:
//!   [`value_objects::Digest`], [`value_objects::ChunkingOptions`],
//!   [`value_objects::ScanOptions`], [`value_objects::WalkEntry`].
//! - [`entities`] — records with identity that accumulate over a run:
//!   [`entities::Snapshot`], [`entities::FileMetadata`],
//!   [`entities::ChunkingResult`].
//! - [`services`] — traits that infrastructure implements:
//!   [`services::DigestService`], [`services::ContentSink`],
//!   [`services::MetadataSink`].
//! - [`error`] — the single [`error::CoreError`] enum used throughout the
//!   workspace.
//!
//! This crate has no knowledge of `tokio`, `rayon`, or the filesystem; those
//! belong to `snapkit-core`, which implements the traits declared here.

pub mod entities;
pub mod error;
pub mod services;
pub mod value_objects;

pub use error::CoreError;
