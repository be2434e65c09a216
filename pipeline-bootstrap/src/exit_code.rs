// /////////////////////////////////////////////////////////////////////////////
// CI/CD Pipeline Execution Engine
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Exit Code Management
//!
//! Standardized Unix exit codes following BSD `sysexits.h` conventions. A
//! non-zero code is the only contract the engine itself promises for a
//! failed run; this module picks a more specific code than bare `1` where
//! the failure's [`PipelineError::category`] makes one obvious, the same way
//! an embedding CLI would.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use pipeline_bootstrap::exit_code::{result_to_exit_code, ExitCode};
//!
//! fn run_application() -> Result<(), pipeline_domain::error::PipelineError> {
//!     Ok(())
//! }
//!
//! fn main() -> std::process::ExitCode {
//!     result_to_exit_code(run_application())
//! }
//! ```

use std::fmt;
use std::process::ExitCode as ProcessExitCode;

use pipeline_domain::error::PipelineError;

/// Exit codes following Unix conventions (BSD sysexits.h)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(i32)]
pub enum ExitCode {
    /// Successful termination (0)
    #[default]
    Success = 0,

    /// General error (1)
    Error = 1,

    /// Command line usage error (64)
    UsageError = 64,

    /// Data format error (65) - invalid script, malformed plugin metadata
    DataError = 65,

    /// Cannot open input (66) - script or plugin directory not found
    NoInput = 66,

    /// Service unavailable (69) - no DSL engine registered for an extension
    Unavailable = 69,

    /// Internal software error (70)
    Software = 70,

    /// I/O error (74)
    IoError = 74,

    /// Remote error in protocol (76) - a pipeline run failed mid-stage
    Protocol = 76,

    /// Permission denied (77) - sandbox policy gate or security violation
    NoPerm = 77,

    /// Configuration error (78)
    Config = 78,

    /// Interrupted by signal (SIGINT - Ctrl+C) (130)
    Interrupted = 130,

    /// Terminated by signal (SIGTERM) (143)
    Terminated = 143,
}

impl ExitCode {
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Maps a [`PipelineError`] to the exit code that best describes its
    /// category. Falls back to [`ExitCode::Error`] for categories with no
    /// more specific code.
    pub fn from_pipeline_error(error: &PipelineError) -> Self {
        match error.category() {
            "validation" => ExitCode::DataError,
            "security" => ExitCode::NoPerm,
            "limit.memory" | "limit.cpu" | "limit.wall" | "limit.thread" | "limit.file_handle" => ExitCode::NoPerm,
            "plugin" => ExitCode::NoInput,
            "dsl_engine" => ExitCode::Unavailable,
            "runtime" => ExitCode::Protocol,
            "cancelled" => ExitCode::Interrupted,
            "internal" => ExitCode::Software,
            "workspace" => ExitCode::NoInput,
            "io" => ExitCode::IoError,
            "configuration" => ExitCode::Config,
            "metrics" => ExitCode::Software,
            _ => ExitCode::Error,
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
            ExitCode::IoError => "I/O error",
            ExitCode::Protocol => "Remote error in protocol",
            ExitCode::NoPerm => "Permission denied",
            ExitCode::Config => "Configuration error",
            ExitCode::Interrupted => "Interrupted by signal (SIGINT)",
            ExitCode::Terminated => "Terminated by signal (SIGTERM)",
        }
    }

    pub fn is_success(self) -> bool {
        matches!(self, ExitCode::Success)
    }

    pub fn is_error(self) -> bool {
        !self.is_success()
    }

    pub fn is_signal(self) -> bool {
        matches!(self, ExitCode::Interrupted | ExitCode::Terminated)
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

impl From<ExitCode> for ProcessExitCode {
    fn from(code: ExitCode) -> ProcessExitCode {
        ProcessExitCode::from(code.as_i32() as u8)
    }
}

/// Maps a command result's error (if any) to an [`ExitCode`], logging the
/// error at `error` level so the cause survives even when stderr is piped
/// away. `Ok(())` maps to [`ExitCode::Success`].
pub fn map_error_to_exit_code(result: &Result<(), PipelineError>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::Success,
        Err(err) => {
            tracing::error!(category = err.category(), error = %err, "command failed");
            ExitCode::from_pipeline_error(err)
        }
    }
}

/// Converts a command's terminal `Result` directly into a process exit code,
/// for use as a `main` return value.
pub fn result_to_exit_code(result: Result<(), PipelineError>) -> ProcessExitCode {
    map_error_to_exit_code(&result).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_code_values_match_sysexits() {
        assert_eq!(ExitCode::Success.as_i32(), 0);
        assert_eq!(ExitCode::Error.as_i32(), 1);
        assert_eq!(ExitCode::UsageError.as_i32(), 64);
        assert_eq!(ExitCode::Config.as_i32(), 78);
        assert_eq!(ExitCode::Interrupted.as_i32(), 130);
        assert_eq!(ExitCode::Terminated.as_i32(), 143);
    }

    #[test]
    fn security_violation_maps_to_no_perm() {
        let err = PipelineError::SecurityViolation("blocked package".into());
        assert_eq!(ExitCode::from_pipeline_error(&err), ExitCode::NoPerm);
    }

    #[test]
    fn validation_error_maps_to_data_error() {
        let err = PipelineError::ValidationError("bad script".into());
        assert_eq!(ExitCode::from_pipeline_error(&err), ExitCode::DataError);
    }

    #[test]
    fn cancelled_maps_to_interrupted() {
        let err = PipelineError::Cancelled("deadline exceeded".into());
        assert_eq!(ExitCode::from_pipeline_error(&err), ExitCode::Interrupted);
    }

    #[test]
    fn map_error_to_exit_code_success_is_success() {
        assert_eq!(map_error_to_exit_code(&Ok(())), ExitCode::Success);
    }

    #[test]
    fn display_includes_description_and_code() {
        let rendered = format!("{}", ExitCode::Config);
        assert!(rendered.contains("Configuration error"));
        assert!(rendered.contains("78"));
    }
}
