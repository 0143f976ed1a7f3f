// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # `snapkit` Binary
//!
//! The composition root: parses and validates the CLI via
//! `snapkit-bootstrap`, wires up the scheduler, buffer arena, digest
//! service, and filesystem sinks, then drives one [`Processor::process`]
//! call to completion (or until a shutdown signal requests cancellation).

use snapkit_bootstrap::cli::{scan_options_from, StorageTypeArg, ValidatedCommand};
use snapkit_bootstrap::shutdown::ShutdownCoordinator;
use snapkit_bootstrap::signals::create_signal_handler;
use snapkit_bootstrap::{bootstrap_cli, result_to_exit_code};
use snapkit_core::application::{Processor, ProcessorConfig};
use snapkit_core::infrastructure::{
    init_logging, BufferArena, FsContentSink, FsMetadataSink, LogFormat, RunMetrics, Scheduler, SchedulerConfig,
    Sha256DigestService, StorageType,
};
use snapkit_core::presentation::render_summary;
use snapkit_core::CoreError;
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> std::process::ExitCode {
    let cli = match bootstrap_cli() {
        Ok(cli) => cli,
        Err(err) => {
            eprintln!("snapkit: {err}");
            return std::process::ExitCode::from(64); // EX_USAGE
        }
    };

    init_logging(if cli.verbose { "debug" } else { "info" }, LogFormat::Pretty);

    result_to_exit_code(run(cli).await)
}

async fn run(cli: snapkit_bootstrap::cli::ValidatedCli) -> Result<(), CoreError> {
    let ValidatedCommand::Scan { root, store_dir, meta_dir, chunking_options, file_concurrency, .. } = &cli.command;
    let scan_options = scan_options_from(&cli.command);

    let scheduler_config = SchedulerConfig {
        cpu_workers: cli.cpu_threads,
        io_concurrency: cli.io_threads,
        storage_type: cli.storage_type.map(storage_type_from_arg).unwrap_or(StorageType::Ssd),
    };
    let scheduler = Arc::new(Scheduler::new(scheduler_config)?);
    let buffer_arena = Arc::new(BufferArena::new(32, chunking_options.chunk_size().max(64 * 1024)));
    let digest_service = Arc::new(Sha256DigestService);
    let content_sink = Arc::new(FsContentSink::new(store_dir.clone()));
    let metadata_sink = Arc::new(FsMetadataSink::new(meta_dir.clone()));

    let processor_config =
        ProcessorConfig { file_concurrency: *file_concurrency, ..ProcessorConfig::default() };
    let metrics = Arc::new(RunMetrics::new()?);
    let processor = Arc::new(
        Processor::new(scheduler, buffer_arena, digest_service, content_sink, metadata_sink, processor_config)
            .with_metrics(metrics),
    );

    let shutdown = ShutdownCoordinator::new(Duration::from_secs(30));
    let signal_handler = create_signal_handler();
    let stop_processor = processor.clone();
    let shutdown_for_signals = shutdown.clone();
    tokio::spawn(async move {
        signal_handler
            .wait_for_signal(Box::new(move || {
                stop_processor.stop();
                shutdown_for_signals.initiate_shutdown();
            }))
            .await;
    });

    let result = processor.process(root, scan_options, *chunking_options).await?;
    println!("{}", render_summary(&result));
    Ok(())
}

fn storage_type_from_arg(arg: StorageTypeArg) -> StorageType {
    match arg {
        StorageTypeArg::Nvme => StorageType::Nvme,
        StorageTypeArg::Ssd => StorageType::Ssd,
        StorageTypeArg::Hdd => StorageType::Hdd,
    }
}
