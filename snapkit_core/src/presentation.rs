// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Presentation
//!
//! Formats a [`snapkit_domain::entities::ProcessingResult`] for a terminal
//! caller. Kept separate from `application` so a future HTTP or JSON
//! front end can format the same result differently without touching the
//! run itself.

use snapkit_domain::entities::ProcessingResult;
use std::fmt::Write as _;

/// Renders a human-readable summary of a completed run.
pub fn render_summary(result: &ProcessingResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "snapshot {}", result.snapshot_id());
    let _ = writeln!(out, "  files processed : {}", result.processed_files());
    let _ = writeln!(out, "  files failed     : {}", result.error_files());
    let _ = writeln!(out, "  files skipped    : {}", result.skipped_files());
    let _ = writeln!(out, "  bytes read       : {}", result.total_bytes());
    let _ = writeln!(out, "  sparse bytes     : {}", result.total_sparse_bytes());
    let _ = writeln!(out, "  scan errors      : {}", result.scan_errors());
    let _ = write!(
        out,
        "  outcome          : {}",
        if result.had_errors() { "completed with errors" } else { "completed successfully" }
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn summary_reports_success_when_no_errors() {
        let result = ProcessingResult::new(Uuid::new_v4(), 5, 0, 0, 2048, 0, 0);
        let summary = render_summary(&result);
        assert!(summary.contains("files processed : 5"));
        assert!(summary.contains("completed successfully"));
    }

    #[test]
    fn summary_reports_errors_when_present() {
        let result = ProcessingResult::new(Uuid::new_v4(), 4, 1, 0, 2048, 0, 2);
        let summary = render_summary(&result);
        assert!(summary.contains("completed with errors"));
    }
}
