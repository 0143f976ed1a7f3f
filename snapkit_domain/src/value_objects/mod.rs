// /////////////////////////////////////////////////////////////////////////////
// Snapkit
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Immutable value objects: small, validated, equality-by-value types with
//! no identity of their own.

mod chunking_options;
mod digest;
mod scan_options;
mod walk_entry;

pub use chunking_options::{ChunkingAlgorithm, ChunkingOptions};
pub use digest::Digest;
pub use scan_options::{ScanOptions, ScanOptionsBuilder, SymlinkStrategy};
pub use walk_entry::{EntryKind, WalkEntry};
