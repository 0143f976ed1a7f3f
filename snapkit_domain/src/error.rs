// /////////////////////////////////////////////////////////////////////////////
// Snapkit
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Domain Error System
//!
//! A single, flat error enum for the scanning-and-chunking core. Errors are
//! categorized by kind rather than by originating component, so that callers
//! can match on `CoreError` without needing to know whether a failure came
//! from the walker, a chunker, the buffer arena, or a sink.
//!
//! ## Propagation Policy
//!
//! - Per-entry walk errors and per-file chunking errors are collected into
//!   result lists (`ScanResult::errors`, a failed `ChunkingResult`) rather than
//!   aborting the whole run.
//! - `InvalidArgument` and the `Processor*` lifecycle errors surface to the
//!   caller immediately; they indicate a programming mistake, not a runtime
//!   condition.

use thiserror::Error;

/// Errors that can occur anywhere in the scanning-and-chunking core.
#[derive(Error, Debug, Clone)]
pub enum CoreError {
    /// Caller-side contract violation: null path, non-positive chunk size,
    /// `min > max`, etc.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The target file or directory does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The filesystem refused access.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// A read/open/stat failure occurred mid-processing.
    #[error("io error: {0}")]
    IoError(String),

    /// The buffer arena refused a non-blocking acquire.
    #[error("buffer pool exhausted")]
    PoolExhausted,

    /// The buffer arena (or another closable component) was used after
    /// close.
    #[error("buffer pool closed")]
    PoolClosed,

    /// The digest primitive failed.
    #[error("digest error: {0}")]
    DigestError(String),

    /// The content or metadata sink rejected a call.
    #[error("sink error: {0}")]
    SinkError(String),

    /// Cooperative cancellation was observed at a suspension point.
    #[error("cancelled")]
    Cancelled,

    /// An operation exceeded its deadline.
    #[error("timeout")]
    Timeout,

    /// `Processor::process` was called after `stop()`.
    #[error("processor closed")]
    ProcessorClosed,

    /// A `process` call was already in flight on this processor.
    #[error("processor busy")]
    ProcessorBusy,
}

impl CoreError {
    /// Creates an [`CoreError::InvalidArgument`].
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Creates an [`CoreError::IoError`].
    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::IoError(msg.into())
    }

    /// Creates an [`CoreError::SinkError`].
    pub fn sink_error(msg: impl Into<String>) -> Self {
        Self::SinkError(msg.into())
    }

    /// Creates an [`CoreError::DigestError`].
    pub fn digest_error(msg: impl Into<String>) -> Self {
        Self::DigestError(msg.into())
    }

    /// Whether retrying the same operation unchanged might succeed.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, CoreError::Timeout | CoreError::PoolExhausted | CoreError::IoError(_))
    }

    /// A short, stable category tag, useful for metrics and log fields.
    pub fn category(&self) -> &'static str {
        match self {
            CoreError::InvalidArgument(_) => "invalid_argument",
            CoreError::NotFound(_) => "not_found",
            CoreError::PermissionDenied(_) => "permission_denied",
            CoreError::IoError(_) => "io",
            CoreError::PoolExhausted => "pool_exhausted",
            CoreError::PoolClosed => "pool_closed",
            CoreError::DigestError(_) => "digest",
            CoreError::SinkError(_) => "sink",
            CoreError::Cancelled => "cancelled",
            CoreError::Timeout => "timeout",
            CoreError::ProcessorClosed => "processor_closed",
            CoreError::ProcessorBusy => "processor_busy",
        }
    }
}

impl From<std::io::Error> for CoreError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => CoreError::NotFound(err.to_string()),
            std::io::ErrorKind::PermissionDenied => CoreError::PermissionDenied(err.to_string()),
            _ => CoreError::IoError(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recoverable_errors() {
        assert!(CoreError::Timeout.is_recoverable());
        assert!(CoreError::PoolExhausted.is_recoverable());
        assert!(CoreError::IoError("x".into()).is_recoverable());
        assert!(!CoreError::PoolClosed.is_recoverable());
        assert!(!CoreError::InvalidArgument("x".into()).is_recoverable());
    }

    #[test]
    fn io_error_conversion_maps_not_found() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: CoreError = io_err.into();
        assert!(matches!(err, CoreError::NotFound(_)));
    }

    #[test]
    fn categories_are_stable() {
        assert_eq!(CoreError::PoolClosed.category(), "pool_closed");
        assert_eq!(CoreError::Cancelled.category(), "cancelled");
    }
}
