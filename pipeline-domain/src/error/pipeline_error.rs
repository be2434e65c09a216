// /////////////////////////////////////////////////////////////////////////////
// CI/CD Pipeline Execution Engine
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Domain Error System
//!
//! A hierarchical error system for the pipeline engine domain. Errors are
//! categorized so that callers can distinguish validation failures (surfaced
//! before execution begins) from security violations and resource-limit
//! overruns (fatal mid-execution) from ordinary step failures.

use thiserror::Error;

/// Domain-specific errors for the pipeline execution engine.
///
/// Every failure the engine can report is one of these variants. The
/// taxonomy matches the error-handling design: validation errors are
/// surfaced before any execution starts, security/limit errors abort the
/// current pipeline immediately (but still run `always` hooks), and
/// `PipelineRuntimeError` carries the stage/step context of an ordinary step
/// failure.
#[derive(Error, Debug, Clone)]
pub enum PipelineError {
    #[error("validation error: {0}")]
    ValidationError(String),

    #[error("security violation: {0}")]
    SecurityViolation(String),

    #[error("memory limit exceeded: {0}")]
    MemoryLimitExceeded(String),

    #[error("CPU time limit exceeded: {0}")]
    CpuTimeLimitExceeded(String),

    #[error("wall time limit exceeded: {0}")]
    WallTimeExceeded(String),

    #[error("thread limit exceeded: {0}")]
    ThreadLimitExceeded(String),

    #[error("file handle limit exceeded: {0}")]
    FileHandleLimitExceeded(String),

    #[error("plugin error: {0}")]
    PluginError(String),

    #[error("DSL engine error: {0}")]
    DslEngineError(String),

    #[error("pipeline runtime error in stage '{stage}'{}: {message}", step.as_deref().map(|s| format!(" / step '{s}'")).unwrap_or_default())]
    PipelineRuntimeError {
        stage: String,
        step: Option<String>,
        message: String,
        #[source]
        cause: Option<Box<PipelineError>>,
    },

    #[error("cancelled: {0}")]
    Cancelled(String),

    #[error("internal error: {0}")]
    InternalError(String),

    #[error("stash not found: {0}")]
    StashNotFound(String),

    #[error("IO error: {0}")]
    IoError(String),

    #[error("configuration error: {0}")]
    ConfigError(String),

    #[error("metrics error: {0}")]
    MetricsError(String),

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}

impl PipelineError {
    /// Builds a [`PipelineError::PipelineRuntimeError`] carrying stage/step
    /// context and an optional cause.
    pub fn runtime(stage: impl Into<String>, step: Option<String>, message: impl Into<String>) -> Self {
        Self::PipelineRuntimeError {
            stage: stage.into(),
            step,
            message: message.into(),
            cause: None,
        }
    }

    pub fn runtime_with_cause(
        stage: impl Into<String>,
        step: Option<String>,
        message: impl Into<String>,
        cause: PipelineError,
    ) -> Self {
        Self::PipelineRuntimeError {
            stage: stage.into(),
            step,
            message: message.into(),
            cause: Some(Box::new(cause)),
        }
    }

    /// Whether the error is a resource-limit overrun raised by the sandbox.
    pub fn is_limit_exceeded(&self) -> bool {
        matches!(
            self,
            PipelineError::MemoryLimitExceeded(_)
                | PipelineError::CpuTimeLimitExceeded(_)
                | PipelineError::WallTimeExceeded(_)
                | PipelineError::ThreadLimitExceeded(_)
                | PipelineError::FileHandleLimitExceeded(_)
        )
    }

    /// Whether the error is security-related (class/resource access denied,
    /// blocked package, sensitive resource touched).
    pub fn is_security_error(&self) -> bool {
        matches!(self, PipelineError::SecurityViolation(_))
    }

    /// Whether the error indicates a temporary condition that can be retried.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, PipelineError::IoError(_) | PipelineError::Cancelled(_))
    }

    /// Gets the error category, used for metrics labeling and log fields.
    pub fn category(&self) -> &'static str {
        match self {
            PipelineError::ValidationError(_) => "validation",
            PipelineError::SecurityViolation(_) => "security",
            PipelineError::MemoryLimitExceeded(_) => "limit.memory",
            PipelineError::CpuTimeLimitExceeded(_) => "limit.cpu",
            PipelineError::WallTimeExceeded(_) => "limit.wall",
            PipelineError::ThreadLimitExceeded(_) => "limit.thread",
            PipelineError::FileHandleLimitExceeded(_) => "limit.file_handle",
            PipelineError::PluginError(_) => "plugin",
            PipelineError::DslEngineError(_) => "dsl_engine",
            PipelineError::PipelineRuntimeError { .. } => "runtime",
            PipelineError::Cancelled(_) => "cancelled",
            PipelineError::InternalError(_) => "internal",
            PipelineError::StashNotFound(_) => "workspace",
            PipelineError::IoError(_) => "io",
            PipelineError::ConfigError(_) => "configuration",
            PipelineError::MetricsError(_) => "metrics",
            PipelineError::InvalidConfiguration(_) => "configuration",
        }
    }
}

impl From<std::io::Error> for PipelineError {
    fn from(err: std::io::Error) -> Self {
        PipelineError::IoError(err.to_string())
    }
}

impl From<serde_json::Error> for PipelineError {
    fn from(err: serde_json::Error) -> Self {
        PipelineError::InvalidConfiguration(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categorizes_limit_errors() {
        let err = PipelineError::MemoryLimitExceeded("128MB over".into());
        assert!(err.is_limit_exceeded());
        assert!(!err.is_security_error());
        assert_eq!(err.category(), "limit.memory");
    }

    #[test]
    fn runtime_error_formats_with_step() {
        let err = PipelineError::runtime("build", Some("compile".into()), "exit code 1");
        let msg = err.to_string();
        assert!(msg.contains("stage 'build'"));
        assert!(msg.contains("step 'compile'"));
    }

    #[test]
    fn runtime_error_formats_without_step() {
        let err = PipelineError::runtime("build", None, "exit code 1");
        assert!(!err.to_string().contains("step"));
    }

    #[test]
    fn io_error_converts() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: PipelineError = io_err.into();
        assert_eq!(err.category(), "io");
    }
}
