// /////////////////////////////////////////////////////////////////////////////
// Snapkit
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Service contracts (ports) that infrastructure implements and the core's
//! orchestration layer depends on only by trait.

mod content_sink;
mod digest_service;
mod metadata_sink;

pub use content_sink::ContentSink;
pub use digest_service::{DigestService, IncrementalDigest};
pub use metadata_sink::MetadataSink;
