// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Logging
//!
//! Structured logging via `tracing`, with level and format driven by
//! [`crate::infrastructure::config::AppConfig`]. Call [`init_logging`] once,
//! early in `main`.

use tracing_subscriber::{fmt, EnvFilter};

/// Output format for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable, for interactive terminal use.
    #[default]
    Pretty,
    /// One JSON object per line, for log aggregation.
    Json,
}

/// Initializes the global `tracing` subscriber.
///
/// `RUST_LOG` overrides `default_level` when set, following `tracing`'s
/// usual convention.
pub fn init_logging(default_level: &str, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let result = match format {
        LogFormat::Pretty => fmt().with_env_filter(filter).with_target(true).try_init(),
        LogFormat::Json => fmt().with_env_filter(filter).with_target(true).json().try_init(),
    };

    if let Err(err) = result {
        eprintln!("logging already initialized: {err}");
    }
}
