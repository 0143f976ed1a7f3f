// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Application Configuration
//!
//! Layered configuration, loaded in order of increasing precedence: built-in
//! defaults, an optional TOML file, then environment variables prefixed
//! `SNAPKIT_` (e.g. `SNAPKIT_CHUNK_SIZE=65536`). Backed by the `config`
//! crate, the same layering strategy the infrastructure layer has always
//! used for non-domain settings.

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use snapkit_domain::error::CoreError;
use std::path::Path;

/// Top-level application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub chunking: ChunkingConfig,
    pub scheduler: SchedulerConfigToml,
    pub buffer_arena: BufferArenaConfig,
    pub log_level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    pub algorithm: String,
    pub chunk_size: usize,
    pub min_chunk_size: Option<usize>,
    pub max_chunk_size: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfigToml {
    pub cpu_workers: Option<usize>,
    pub io_concurrency: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BufferArenaConfig {
    pub capacity: usize,
    pub buffer_size: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            chunking: ChunkingConfig::default(),
            scheduler: SchedulerConfigToml::default(),
            buffer_arena: BufferArenaConfig::default(),
            log_level: "info".to_string(),
        }
    }
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self { algorithm: "cdc".to_string(), chunk_size: 4096, min_chunk_size: None, max_chunk_size: None }
    }
}

impl Default for SchedulerConfigToml {
    fn default() -> Self {
        Self { cpu_workers: None, io_concurrency: None }
    }
}

impl Default for BufferArenaConfig {
    fn default() -> Self {
        Self { capacity: 32, buffer_size: 1024 * 1024 }
    }
}

impl AppConfig {
    /// Loads configuration from defaults, then `path` if given, then
    /// `SNAPKIT_*` environment variables, in increasing precedence.
    pub fn load(path: Option<&Path>) -> Result<Self, CoreError> {
        let mut builder = Config::builder().add_source(Config::try_from(&AppConfig::default()).map_err(config_err)?);

        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(false));
        }

        builder = builder.add_source(Environment::with_prefix("SNAPKIT").separator("_"));

        builder.build().map_err(config_err)?.try_deserialize().map_err(config_err)
    }
}

fn config_err(err: config::ConfigError) -> CoreError {
    CoreError::invalid_argument(format!("configuration error: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_without_file_uses_defaults() {
        let cfg = AppConfig::load(None).unwrap();
        assert_eq!(cfg.chunking.chunk_size, 4096);
        assert_eq!(cfg.buffer_arena.capacity, 32);
    }

    #[test]
    fn environment_override_wins_over_default() {
        std::env::set_var("SNAPKIT_LOG_LEVEL", "debug");
        let cfg = AppConfig::load(None).unwrap();
        std::env::remove_var("SNAPKIT_LOG_LEVEL");
        assert_eq!(cfg.log_level, "debug");
    }
}
