// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Exit Code Management
//!
//! Standardized Unix exit codes following BSD `sysexits.h` conventions, plus
//! a mapping from [`snapkit_domain::error::CoreError`] to the appropriate
//! code so `main` can return a single `std::process::ExitCode` regardless of
//! which layer produced the failure.

use snapkit_domain::error::CoreError;
use std::fmt;

/// Exit codes following Unix conventions (BSD sysexits.h).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(i32)]
pub enum ExitCode {
    #[default]
    Success = 0,
    Error = 1,
    UsageError = 64,
    DataError = 65,
    NoInput = 66,
    Unavailable = 69,
    Software = 70,
    OsError = 71,
    CantCreate = 73,
    IoError = 74,
    TempFail = 75,
    NoPerm = 77,
    Config = 78,
    Interrupted = 130,
    Terminated = 143,
}

impl ExitCode {
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Maps a [`CoreError`] to the exit code that best describes its cause.
    pub fn from_core_error(error: &CoreError) -> Self {
        match error {
            CoreError::InvalidArgument(_) => ExitCode::UsageError,
            CoreError::NotFound(_) => ExitCode::NoInput,
            CoreError::PermissionDenied(_) => ExitCode::NoPerm,
            CoreError::IoError(_) => ExitCode::IoError,
            CoreError::PoolExhausted | CoreError::PoolClosed => ExitCode::Unavailable,
            CoreError::Timeout => ExitCode::TempFail,
            CoreError::Cancelled => ExitCode::Interrupted,
            CoreError::ProcessorBusy | CoreError::ProcessorClosed => ExitCode::Unavailable,
            CoreError::SinkError(_) => ExitCode::CantCreate,
            CoreError::DigestError(_) => ExitCode::Software,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            ExitCode::Success => "Success",
            ExitCode::Error => "General error",
            ExitCode::UsageError => "Command line usage error",
            ExitCode::DataError => "Data format error",
            ExitCode::NoInput => "Cannot open input",
            ExitCode::Unavailable => "Service unavailable",
            ExitCode::Software => "Internal software error",
            ExitCode::OsError => "System error",
            ExitCode::CantCreate => "Cannot create output",
            ExitCode::IoError => "I/O error",
            ExitCode::TempFail => "Temporary failure, retry",
            ExitCode::NoPerm => "Permission denied",
            ExitCode::Config => "Configuration error",
            ExitCode::Interrupted => "Interrupted by signal (SIGINT)",
            ExitCode::Terminated => "Terminated by signal (SIGTERM)",
        }
    }

    pub fn is_success(self) -> bool {
        matches!(self, ExitCode::Success)
    }
}

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.description(), self.as_i32())
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> i32 {
        code.as_i32()
    }
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> std::process::ExitCode {
        std::process::ExitCode::from(code.as_i32() as u8)
    }
}

/// Maps a `Result` from the application layer to a process exit code,
/// logging the error (if any) before returning.
pub fn result_to_exit_code<T>(result: Result<T, CoreError>) -> std::process::ExitCode {
    match result {
        Ok(_) => std::process::ExitCode::SUCCESS,
        Err(err) => {
            let code = ExitCode::from_core_error(&err);
            tracing::error!(error = %err, exit_code = code.as_i32(), "run failed");
            code.into()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_code_values_follow_sysexits() {
        assert_eq!(ExitCode::Success.as_i32(), 0);
        assert_eq!(ExitCode::UsageError.as_i32(), 64);
        assert_eq!(ExitCode::Config.as_i32(), 78);
        assert_eq!(ExitCode::Interrupted.as_i32(), 130);
        assert_eq!(ExitCode::Terminated.as_i32(), 143);
    }

    #[test]
    fn invalid_argument_maps_to_usage_error() {
        let err = CoreError::invalid_argument("bad flag");
        assert_eq!(ExitCode::from_core_error(&err), ExitCode::UsageError);
    }

    #[test]
    fn not_found_maps_to_no_input() {
        let err = CoreError::NotFound("missing".into());
        assert_eq!(ExitCode::from_core_error(&err), ExitCode::NoInput);
    }

    #[test]
    fn cancelled_maps_to_interrupted() {
        assert_eq!(ExitCode::from_core_error(&CoreError::Cancelled), ExitCode::Interrupted);
    }

    #[test]
    fn result_to_exit_code_success_is_zero() {
        let code = result_to_exit_code::<()>(Ok(()));
        assert_eq!(code, std::process::ExitCode::SUCCESS);
    }
}
