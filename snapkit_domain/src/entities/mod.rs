// /////////////////////////////////////////////////////////////////////////////
// Snapkit
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Entities: types with identity that change over the lifetime of a run,
//! as opposed to the immutable [`crate::value_objects`].

mod chunking_result;
mod file_metadata;
mod snapshot;

pub use chunking_result::ChunkingResult;
pub use file_metadata::FileMetadata;
pub use snapshot::{ProcessingResult, ScanResult, Snapshot};
