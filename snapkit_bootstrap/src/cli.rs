// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # CLI Parsing and Validation
//!
//! Command-line surface for the `snapkit` binary: parsing via `clap`
//! followed by security-first validation of every path and bound before it
//! reaches the core. Parsing and validation are kept as separate steps so
//! validation failures produce a [`ParseError`] independent of clap's own
//! usage errors.
//!
//! ## Security Validations
//!
//! - Path length and dangerous-pattern checks (path traversal, shell
//!   metacharacters, null bytes) before any path is touched on disk
//! - Canonicalization and a protected-system-directory denylist
//! - Range checks on every numeric tunable

use snapkit_domain::value_objects::{ChunkingOptions, ScanOptionsBuilder, SymlinkStrategy};
use std::path::{Path, PathBuf};
use thiserror::Error;

use clap::{Parser, Subcommand, ValueEnum};

const MAX_ARG_LENGTH: usize = 1000;
const MAX_PATH_LENGTH: usize = 4096;

const DANGEROUS_PATTERNS: &[&str] = &["..", "~", "$", "`", ";", "&", "|", ">", "<", "\n", "\r", "\0"];

const PROTECTED_DIRS: &[&str] = &["/etc", "/bin", "/sbin", "/usr/bin", "/usr/sbin", "/boot", "/sys", "/proc", "/dev"];

/// Errors produced while validating already-clap-parsed arguments.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("argument too long (max {MAX_ARG_LENGTH} characters): {0}")]
    ArgumentTooLong(String),

    #[error("dangerous pattern '{pattern}' detected in argument: {arg}")]
    DangerousPattern { pattern: String, arg: String },

    #[error("path exceeds maximum length (max {MAX_PATH_LENGTH})")]
    PathTooLong,

    #[error("access to protected system directory denied: {0}")]
    ProtectedDirectory(String),

    #[error("path does not exist: {0}")]
    PathNotFound(String),

    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error("invalid value for {arg}: {reason}")]
    InvalidValue { arg: String, reason: String },
}

/// Validates raw string arguments before they are trusted anywhere else.
pub struct SecureArgParser;

impl SecureArgParser {
    pub fn validate_argument(arg: &str) -> Result<(), ParseError> {
        if arg.len() > MAX_ARG_LENGTH {
            return Err(ParseError::ArgumentTooLong(arg.chars().take(50).collect::<String>() + "..."));
        }
        for pattern in DANGEROUS_PATTERNS {
            if arg.contains(pattern) {
                return Err(ParseError::DangerousPattern { pattern: pattern.to_string(), arg: arg.to_string() });
            }
        }
        Ok(())
    }

    /// Validates and canonicalizes a path that must already exist (e.g. the
    /// scan root).
    pub fn validate_existing_path(path: &str) -> Result<PathBuf, ParseError> {
        Self::validate_argument(path).map_err(|e| Self::as_invalid_path(path, e))?;

        let canonical = Path::new(path).canonicalize().map_err(|e| {
            if !Path::new(path).exists() {
                ParseError::PathNotFound(path.to_string())
            } else {
                ParseError::InvalidPath(format!("{path}: {e}"))
            }
        })?;

        Self::check_length_and_protection(&canonical)?;
        Ok(canonical)
    }

    /// Validates a path that may not exist yet (e.g. a store or metadata
    /// output directory) without requiring canonicalization.
    pub fn validate_output_path(path: &str) -> Result<PathBuf, ParseError> {
        Self::validate_argument(path).map_err(|e| Self::as_invalid_path(path, e))?;
        let path_buf = PathBuf::from(path);
        if let Some(parent) = path_buf.parent() {
            if !parent.as_os_str().is_empty() {
                if let Ok(canonical_parent) = parent.canonicalize() {
                    Self::check_length_and_protection(&canonical_parent)?;
                }
            }
        }
        Ok(path_buf)
    }

    fn as_invalid_path(path: &str, err: ParseError) -> ParseError {
        match err {
            ParseError::ArgumentTooLong(_) => ParseError::InvalidPath(format!("path too long: {path}")),
            ParseError::DangerousPattern { pattern, .. } => {
                ParseError::InvalidPath(format!("path contains dangerous pattern '{pattern}': {path}"))
            }
            other => other,
        }
    }

    fn check_length_and_protection(canonical: &Path) -> Result<(), ParseError> {
        if canonical.to_string_lossy().len() > MAX_PATH_LENGTH {
            return Err(ParseError::PathTooLong);
        }
        for protected in PROTECTED_DIRS {
            if canonical.starts_with(protected) {
                return Err(ParseError::ProtectedDirectory(canonical.display().to_string()));
            }
        }
        Ok(())
    }
}

/// Storage device type, surfaced on the CLI so the scheduler can pick a
/// sensible I/O queue depth without the user tuning it by hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StorageTypeArg {
    Nvme,
    Ssd,
    Hdd,
}

/// How to treat symbolic links encountered while walking, mirrored 1:1 from
/// [`SymlinkStrategy`] so clap can derive parsing for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SymlinkStrategyArg {
    Skip,
    Record,
    Follow,
}

impl From<SymlinkStrategyArg> for SymlinkStrategy {
    fn from(arg: SymlinkStrategyArg) -> Self {
        match arg {
            SymlinkStrategyArg::Skip => SymlinkStrategy::Skip,
            SymlinkStrategyArg::Record => SymlinkStrategy::Record,
            SymlinkStrategyArg::Follow => SymlinkStrategy::Follow,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AlgorithmArg {
    Fixed,
    Cdc,
}

/// Top-level CLI structure.
#[derive(Parser, Debug, Clone)]
#[command(name = "snapkit")]
#[command(about = concat!("Scanning and content-defined chunking core, v", env!("CARGO_PKG_VERSION")))]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose (debug-level) logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file path (layered under any `SNAPKIT_` environment
    /// overrides).
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the CPU worker thread count (default: available cores - 1).
    #[arg(long, global = true)]
    pub cpu_threads: Option<usize>,

    /// Override the I/O concurrency limit (default: device-specific).
    #[arg(long, global = true)]
    pub io_threads: Option<usize>,

    /// Storage device type, used to pick a default I/O queue depth.
    #[arg(long, global = true, value_enum)]
    pub storage_type: Option<StorageTypeArg>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Walk a directory tree, chunk every file, and write chunk + metadata
    /// output.
    Scan {
        /// Root directory to scan.
        root: String,

        /// Directory chunk contents are written to (content-addressed, git
        /// style sharding).
        #[arg(long)]
        store_dir: String,

        /// Directory per-file metadata and the snapshot manifest are
        /// written to.
        #[arg(long)]
        meta_dir: String,

        /// Chunking algorithm.
        #[arg(long, value_enum, default_value = "cdc")]
        algorithm: AlgorithmArg,

        /// Target (average, for CDC) chunk size in bytes.
        #[arg(long, default_value = "1048576")]
        chunk_size: usize,

        /// Glob patterns to include; if empty, everything not excluded is
        /// included.
        #[arg(long)]
        include: Vec<String>,

        /// Glob patterns to exclude.
        #[arg(long)]
        exclude: Vec<String>,

        /// Include hidden (dot-prefixed) files and directories.
        #[arg(long)]
        include_hidden: bool,

        /// Maximum directory depth below the root.
        #[arg(long)]
        max_depth: Option<usize>,

        /// Skip files smaller than this many bytes.
        #[arg(long)]
        min_file_size: Option<u64>,

        /// Skip files larger than this many bytes.
        #[arg(long)]
        max_file_size: Option<u64>,

        /// How to handle symbolic links.
        #[arg(long, value_enum, default_value = "skip")]
        symlink_strategy: SymlinkStrategyArg,

        /// Detect sparse files and record their holes as zero runs rather
        /// than reading them from disk.
        #[arg(long)]
        detect_sparse: bool,

        /// How many files are chunked concurrently.
        #[arg(long, default_value = "8")]
        file_concurrency: usize,
    },
}

/// A parsed and security-validated CLI invocation, ready to drive
/// `snapkit_core`.
#[derive(Debug, Clone)]
pub struct ValidatedCli {
    pub command: ValidatedCommand,
    pub verbose: bool,
    pub config: Option<PathBuf>,
    pub cpu_threads: Option<usize>,
    pub io_threads: Option<usize>,
    pub storage_type: Option<StorageTypeArg>,
}

#[derive(Debug, Clone)]
pub enum ValidatedCommand {
    Scan {
        root: PathBuf,
        store_dir: PathBuf,
        meta_dir: PathBuf,
        chunking_options: ChunkingOptions,
        include: Vec<String>,
        exclude: Vec<String>,
        include_hidden: bool,
        max_depth: Option<usize>,
        min_file_size: Option<u64>,
        max_file_size: Option<u64>,
        symlink_strategy: SymlinkStrategy,
        detect_sparse: bool,
        file_concurrency: usize,
    },
}

/// Parses `std::env::args()` with clap, then runs every argument through
/// [`SecureArgParser`] before handing back a [`ValidatedCli`].
pub fn parse_and_validate() -> Result<ValidatedCli, ParseError> {
    let cli = Cli::parse();
    validate_cli(cli)
}

fn validate_cli(cli: Cli) -> Result<ValidatedCli, ParseError> {
    let Commands::Scan {
        root,
        store_dir,
        meta_dir,
        algorithm,
        chunk_size,
        include,
        exclude,
        include_hidden,
        max_depth,
        min_file_size,
        max_file_size,
        symlink_strategy,
        detect_sparse,
        file_concurrency,
    } = cli.command;

    let root = SecureArgParser::validate_existing_path(&root)?;
    let store_dir = SecureArgParser::validate_output_path(&store_dir)?;
    let meta_dir = SecureArgParser::validate_output_path(&meta_dir)?;

    for pattern in include.iter().chain(exclude.iter()) {
        SecureArgParser::validate_argument(pattern)
            .map_err(|_| ParseError::InvalidValue { arg: "include/exclude".into(), reason: pattern.clone() })?;
    }

    if file_concurrency == 0 {
        return Err(ParseError::InvalidValue { arg: "file-concurrency".into(), reason: "must be non-zero".into() });
    }

    let chunking_options = match algorithm {
        AlgorithmArg::Fixed => ChunkingOptions::fixed(chunk_size),
        AlgorithmArg::Cdc => ChunkingOptions::cdc_with_defaults(chunk_size),
    }
    .map_err(|e| ParseError::InvalidValue { arg: "chunk-size".into(), reason: e.to_string() })?
    .with_sparse_detection(detect_sparse);

    Ok(ValidatedCli {
        command: ValidatedCommand::Scan {
            root,
            store_dir,
            meta_dir,
            chunking_options,
            include,
            exclude,
            include_hidden,
            max_depth,
            min_file_size,
            max_file_size,
            symlink_strategy: symlink_strategy.into(),
            detect_sparse,
            file_concurrency,
        },
        verbose: cli.verbose,
        config: cli.config,
        cpu_threads: cli.cpu_threads,
        io_threads: cli.io_threads,
        storage_type: cli.storage_type,
    })
}

/// Builds a [`snapkit_domain::value_objects::ScanOptions`] from a validated
/// `Scan` command.
pub fn scan_options_from(command: &ValidatedCommand) -> snapkit_domain::value_objects::ScanOptions {
    let ValidatedCommand::Scan {
        include, exclude, include_hidden, max_depth, min_file_size, max_file_size, symlink_strategy, detect_sparse, ..
    } = command;

    let mut builder = ScanOptionsBuilder::new().symlink_strategy(*symlink_strategy);
    if *include_hidden {
        builder = builder.include_hidden(true);
    }
    if *detect_sparse {
        builder = builder.detect_sparse_files(true);
    }
    if let Some(depth) = max_depth {
        builder = builder.max_depth(*depth);
    }
    if let Some(min) = min_file_size {
        builder = builder.min_file_size(*min);
    }
    if let Some(max) = max_file_size {
        builder = builder.max_file_size(*max);
    }
    for pattern in include {
        builder = builder.include(pattern.clone());
    }
    for pattern in exclude {
        builder = builder.exclude(pattern.clone());
    }
    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;

    mod argument_validation {
        use super::*;

        #[test]
        fn accepts_safe_arguments() {
            assert!(SecureArgParser::validate_argument("safe-arg").is_ok());
            assert!(SecureArgParser::validate_argument("*.rs").is_ok());
        }

        #[test]
        fn rejects_too_long_arguments() {
            let long_arg = "a".repeat(MAX_ARG_LENGTH + 1);
            assert!(matches!(SecureArgParser::validate_argument(&long_arg), Err(ParseError::ArgumentTooLong(_))));
        }

        #[test]
        fn detects_dangerous_patterns() {
            for arg in ["../etc/passwd", "~/.ssh/id_rsa", "$(whoami)", "file;rm -rf /", "file|pipe"] {
                assert!(
                    matches!(SecureArgParser::validate_argument(arg), Err(ParseError::DangerousPattern { .. })),
                    "failed to detect dangerous pattern in: {arg}"
                );
            }
        }
    }

    mod path_validation {
        use super::*;
        use tempfile::tempdir;

        #[test]
        fn accepts_an_existing_directory() {
            let dir = tempdir().unwrap();
            let validated = SecureArgParser::validate_existing_path(dir.path().to_str().unwrap()).unwrap();
            assert!(validated.is_dir());
        }

        #[test]
        fn rejects_a_missing_path() {
            let err = SecureArgParser::validate_existing_path("/no/such/path/at/all").unwrap_err();
            assert!(matches!(err, ParseError::PathNotFound(_) | ParseError::InvalidPath(_)));
        }

        #[test]
        fn rejects_protected_directories() {
            let err = SecureArgParser::validate_existing_path("/etc").unwrap_err();
            assert!(matches!(err, ParseError::ProtectedDirectory(_)));
        }
    }

    mod cli_validation {
        use super::*;

        fn scan_cli(root: &str, store: &str, meta: &str) -> Cli {
            Cli {
                command: Commands::Scan {
                    root: root.to_string(),
                    store_dir: store.to_string(),
                    meta_dir: meta.to_string(),
                    algorithm: AlgorithmArg::Fixed,
                    chunk_size: 4096,
                    include: vec![],
                    exclude: vec![],
                    include_hidden: false,
                    max_depth: None,
                    min_file_size: None,
                    max_file_size: None,
                    symlink_strategy: SymlinkStrategyArg::Skip,
                    detect_sparse: false,
                    file_concurrency: 8,
                },
                verbose: false,
                config: None,
                cpu_threads: None,
                io_threads: None,
                storage_type: None,
            }
        }

        #[test]
        fn validates_a_well_formed_scan_command() {
            let dir = tempfile::tempdir().unwrap();
            let root = dir.path().to_str().unwrap();
            let cli = scan_cli(root, "/tmp/snapkit-store", "/tmp/snapkit-meta");
            let validated = validate_cli(cli).unwrap();
            assert!(matches!(validated.command, ValidatedCommand::Scan { .. }));
        }

        #[test]
        fn rejects_zero_file_concurrency() {
            let dir = tempfile::tempdir().unwrap();
            let root = dir.path().to_str().unwrap();
            let mut cli = scan_cli(root, "/tmp/snapkit-store", "/tmp/snapkit-meta");
            if let Commands::Scan { file_concurrency, .. } = &mut cli.command {
                *file_concurrency = 0;
            }
            assert!(matches!(validate_cli(cli), Err(ParseError::InvalidValue { .. })));
        }
    }
}
