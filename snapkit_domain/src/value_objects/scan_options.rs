// /////////////////////////////////////////////////////////////////////////////
// Snapkit
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Scan Options
//!
//! Configuration for a directory walk: what to include, what to skip, and
//! how to treat symlinks.

use serde::{Deserialize, Serialize};

/// How the walker treats symlinks it encounters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SymlinkStrategy {
    /// Follow the link and walk into its target.
    Follow,
    /// Skip the link entirely; it does not appear in the walk at all.
    Skip,
    /// Record the link as a [`crate::value_objects::EntryKind::Symlink`]
    /// entry, without following it.
    Record,
}

/// Configuration for a single directory walk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanOptions {
    include: Vec<String>,
    exclude: Vec<String>,
    include_hidden: bool,
    max_depth: Option<usize>,
    min_file_size: Option<u64>,
    max_file_size: Option<u64>,
    symlink_strategy: SymlinkStrategy,
    detect_sparse_files: bool,
}

impl ScanOptions {
    pub fn include(&self) -> &[String] {
        &self.include
    }

    pub fn exclude(&self) -> &[String] {
        &self.exclude
    }

    pub fn include_hidden(&self) -> bool {
        self.include_hidden
    }

    pub fn max_depth(&self) -> Option<usize> {
        self.max_depth
    }

    pub fn min_file_size(&self) -> Option<u64> {
        self.min_file_size
    }

    pub fn max_file_size(&self) -> Option<u64> {
        self.max_file_size
    }

    pub fn symlink_strategy(&self) -> SymlinkStrategy {
        self.symlink_strategy
    }

    pub fn detect_sparse_files(&self) -> bool {
        self.detect_sparse_files
    }

    /// Whether a file of the given size passes the configured size filters.
    pub fn size_in_range(&self, size: u64) -> bool {
        if let Some(min) = self.min_file_size {
            if size < min {
                return false;
            }
        }
        if let Some(max) = self.max_file_size {
            if size > max {
                return false;
            }
        }
        true
    }
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            include: Vec::new(),
            exclude: Vec::new(),
            include_hidden: false,
            max_depth: None,
            min_file_size: None,
            max_file_size: None,
            symlink_strategy: SymlinkStrategy::Record,
            detect_sparse_files: true,
        }
    }
}

/// Builder for [`ScanOptions`], mirroring the fluent construction style used
/// elsewhere in the domain's value objects.
#[derive(Debug, Clone, Default)]
pub struct ScanOptionsBuilder {
    opts: ScanOptions,
}

impl ScanOptionsBuilder {
    pub fn new() -> Self {
        Self { opts: ScanOptions::default() }
    }

    pub fn include(mut self, pattern: impl Into<String>) -> Self {
        self.opts.include.push(pattern.into());
        self
    }

    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.opts.exclude.push(pattern.into());
        self
    }

    pub fn include_hidden(mut self, enabled: bool) -> Self {
        self.opts.include_hidden = enabled;
        self
    }

    pub fn max_depth(mut self, depth: usize) -> Self {
        self.opts.max_depth = Some(depth);
        self
    }

    pub fn min_file_size(mut self, size: u64) -> Self {
        self.opts.min_file_size = Some(size);
        self
    }

    pub fn max_file_size(mut self, size: u64) -> Self {
        self.opts.max_file_size = Some(size);
        self
    }

    pub fn symlink_strategy(mut self, strategy: SymlinkStrategy) -> Self {
        self.opts.symlink_strategy = strategy;
        self
    }

    pub fn detect_sparse_files(mut self, enabled: bool) -> Self {
        self.opts.detect_sparse_files = enabled;
        self
    }

    pub fn build(self) -> ScanOptions {
        self.opts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_strategy_records_symlinks() {
        assert_eq!(ScanOptions::default().symlink_strategy(), SymlinkStrategy::Record);
    }

    #[test]
    fn size_range_filters_both_bounds() {
        let opts = ScanOptionsBuilder::new().min_file_size(10).max_file_size(100).build();
        assert!(!opts.size_in_range(5));
        assert!(opts.size_in_range(50));
        assert!(!opts.size_in_range(200));
    }

    #[test]
    fn builder_accumulates_patterns() {
        let opts = ScanOptionsBuilder::new().include("*.rs").exclude("target/*").build();
        assert_eq!(opts.include(), &["*.rs".to_string()]);
        assert_eq!(opts.exclude(), &["target/*".to_string()]);
    }
}
