// /////////////////////////////////////////////////////////////////////////////
// CI/CD Pipeline Execution Engine
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Sandbox state machine, enforcement floor dispatched on `IsolationLevel`,
//! and the policy gates (file/network/reflection/native/process) shared by
//! every isolation level at or above `Thread`.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use pipeline_domain::error::PipelineError;
use pipeline_domain::value_objects::{DslResourceLimits, DslSecurityPolicy, IsolationLevel};
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SandboxState {
    Configured,
    Running,
    Completed,
    Violated,
    TimedOut,
    Cancelled,
}

/// Reports a policy violation observed during a sandboxed run. The sandbox
/// never retries after a violation; every violation is fatal to the current
/// execution.
pub trait ViolationSink: Send + Sync {
    fn on_violation(&self, kind: &str, detail: &str);
}

pub struct NoopViolationSink;
impl ViolationSink for NoopViolationSink {
    fn on_violation(&self, _kind: &str, _detail: &str) {}
}

pub struct SandboxManager {
    isolation_level: IsolationLevel,
    security_policy: DslSecurityPolicy,
    resource_limits: DslResourceLimits,
    state: Mutex<SandboxState>,
    violation_sink: Arc<dyn ViolationSink>,
}

impl SandboxManager {
    pub fn new(isolation_level: IsolationLevel, security_policy: DslSecurityPolicy, resource_limits: DslResourceLimits) -> Arc<Self> {
        Arc::new(Self {
            isolation_level,
            security_policy,
            resource_limits,
            state: Mutex::new(SandboxState::Configured),
            violation_sink: Arc::new(NoopViolationSink),
        })
    }

    pub fn with_violation_sink(mut self: Arc<Self>, sink: Arc<dyn ViolationSink>) -> Arc<Self> {
        Arc::get_mut(&mut self).expect("sandbox manager not yet shared").violation_sink = sink;
        self
    }

    pub fn state(&self) -> SandboxState {
        *self.state.lock()
    }

    fn report_violation(&self, kind: &str, detail: &str) {
        self.violation_sink.on_violation(kind, detail);
        *self.state.lock() = SandboxState::Violated;
    }

    /// Runs `body` inside the sandbox. `memory_sampler`, if provided, is
    /// polled every 50ms by a concurrent monitor that cancels the run if it
    /// reports above `max_memory_mb`. Cooperative cancellation from
    /// `cancellation` is observed the same way a pipeline-level deadline is.
    pub async fn run<F, Fut, T>(self: &Arc<Self>, cancellation: CancellationToken, memory_sampler: Option<Arc<dyn Fn() -> u64 + Send + Sync>>, body: F) -> Result<T, PipelineError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, PipelineError>> + Send,
        T: Send,
    {
        {
            let mut state = self.state.lock();
            if *state != SandboxState::Configured {
                return Err(PipelineError::InternalError("sandbox already used for a prior run".into()));
            }
            *state = SandboxState::Running;
        }

        // The monitor cancels `run_token`, a sandbox-internal token, rather
        // than the caller's `cancellation`, so a memory-watermark violation
        // can be distinguished from caller-initiated cancellation and
        // surfaced as `MemoryLimitExceeded` rather than `Cancelled`.
        let run_token = CancellationToken::new();
        let memory_violation: Arc<Mutex<Option<String>>> = Arc::new(Mutex::new(None));

        let monitor_limit = self.resource_limits.max_memory_mb;
        let monitor_sink = self.violation_sink.clone();
        let monitor_handle = if let (Some(limit), Some(sampler)) = (monitor_limit, memory_sampler) {
            let token = run_token.clone();
            let violation = memory_violation.clone();
            Some(tokio::spawn(async move {
                let mut interval = tokio::time::interval(Duration::from_millis(50));
                loop {
                    tokio::select! {
                        _ = token.cancelled() => return,
                        _ = interval.tick() => {
                            let observed = sampler();
                            if observed > limit {
                                let detail = format!("observed {observed}MB exceeds limit {limit}MB");
                                monitor_sink.on_violation("memory", &detail);
                                *violation.lock() = Some(detail);
                                token.cancel();
                                return;
                            }
                        }
                    }
                }
            }))
        } else {
            None
        };

        let wall_time = self.resource_limits.max_wall_time_ms.map(Duration::from_millis);
        let body_future = body();

        let outcome = tokio::select! {
            biased;
            _ = cancellation.cancelled() => Err(Cause::Cancelled),
            _ = run_token.cancelled() => Err(Cause::MemoryExceeded(memory_violation.lock().clone().unwrap_or_else(|| "memory limit exceeded".into()))),
            result = Self::await_with_optional_timeout(body_future, wall_time) => result,
        };

        if let Some(handle) = monitor_handle {
            handle.abort();
        }

        match outcome {
            Ok(value) => {
                *self.state.lock() = SandboxState::Completed;
                Ok(value)
            }
            Err(Cause::TimedOut) => {
                *self.state.lock() = SandboxState::TimedOut;
                Err(PipelineError::WallTimeExceeded(format!("exceeded {:?}", wall_time.unwrap_or_default())))
            }
            Err(Cause::Cancelled) => {
                *self.state.lock() = SandboxState::Cancelled;
                Err(PipelineError::Cancelled("sandboxed run cancelled".into()))
            }
            Err(Cause::MemoryExceeded(detail)) => {
                self.report_violation("memory", &detail);
                Err(PipelineError::MemoryLimitExceeded(detail))
            }
            Err(Cause::Failed(error)) => {
                if error.is_limit_exceeded() || error.is_security_error() {
                    self.report_violation(error.category(), &error.to_string());
                } else {
                    *self.state.lock() = SandboxState::Completed;
                }
                Err(error)
            }
        }
    }

    async fn await_with_optional_timeout<Fut, T>(fut: Fut, wall_time: Option<Duration>) -> Result<T, Cause>
    where
        Fut: Future<Output = Result<T, PipelineError>>,
    {
        match wall_time {
            Some(duration) => match tokio::time::timeout(duration, fut).await {
                Ok(Ok(value)) => Ok(value),
                Ok(Err(error)) => Err(Cause::Failed(error)),
                Err(_elapsed) => Err(Cause::TimedOut),
            },
            None => fut.await.map_err(Cause::Failed),
        }
    }

    /// File access gate: `path` must canonicalize under one of
    /// `allowed_directories`, or under `workspace_root` when the allow-list
    /// is empty. Symlinks are resolved by `canonicalize` before the check.
    pub fn check_file_access(&self, path: &Path, workspace_root: &Path) -> Result<(), PipelineError> {
        if !self.isolation_level.enforces_policy_gates() {
            return Ok(());
        }
        if !self.security_policy.allow_file_system_access {
            self.report_violation("file_access", &format!("{} denied: filesystem access not permitted", path.display()));
            return Err(PipelineError::SecurityViolation(format!("filesystem access denied for {}", path.display())));
        }
        let canonical = path.canonicalize().map_err(PipelineError::from)?;
        let allowed_roots: Vec<PathBuf> = if self.security_policy.allowed_directories.is_empty() {
            vec![workspace_root.canonicalize().map_err(PipelineError::from)?]
        } else {
            self.security_policy.allowed_directories.iter().filter_map(|dir| Path::new(dir).canonicalize().ok()).collect()
        };
        if allowed_roots.iter().any(|root| canonical.starts_with(root)) {
            Ok(())
        } else {
            self.report_violation("file_access", &format!("{} is outside allowed directories", canonical.display()));
            Err(PipelineError::SecurityViolation(format!("{} is outside allowed directories", canonical.display())))
        }
    }

    /// Network gate: denied unless `allow_network_access` and (if a
    /// non-empty allowlist is supplied by the caller) `hostname` is in it.
    pub fn check_network_access(&self, hostname: &str, allowlist: &[String]) -> Result<(), PipelineError> {
        if !self.isolation_level.enforces_policy_gates() {
            return Ok(());
        }
        if !self.security_policy.allow_network_access {
            self.report_violation("network", &format!("outbound access to {hostname} denied"));
            return Err(PipelineError::SecurityViolation(format!("network access denied for {hostname}")));
        }
        if !allowlist.is_empty() && !allowlist.iter().any(|allowed| allowed == hostname) {
            self.report_violation("network", &format!("{hostname} not in allowlist"));
            return Err(PipelineError::SecurityViolation(format!("{hostname} is not in the network allowlist")));
        }
        Ok(())
    }

    pub fn check_reflection(&self) -> Result<(), PipelineError> {
        if self.isolation_level.enforces_policy_gates() && !self.security_policy.allow_reflection {
            self.report_violation("reflection", "reflection access denied");
            return Err(PipelineError::SecurityViolation("reflection is not permitted".into()));
        }
        Ok(())
    }

    pub fn check_native_code(&self) -> Result<(), PipelineError> {
        if self.isolation_level.enforces_policy_gates() && !self.security_policy.allow_native_code {
            self.report_violation("native_code", "native code execution denied");
            return Err(PipelineError::SecurityViolation("native code execution is not permitted".into()));
        }
        Ok(())
    }

    /// Process spawn is denied under `Restricted`/`Default`-equivalent
    /// policy: i.e. whenever the security policy does not explicitly allow
    /// native code (used here as the process-spawn proxy, since the
    /// distilled model has no separate flag for it).
    pub fn check_process_spawn(&self) -> Result<(), PipelineError> {
        if !self.security_policy.allow_native_code {
            self.report_violation("process_spawn", "process spawn denied under the active security policy");
            return Err(PipelineError::SecurityViolation("process spawn is not permitted under this policy".into()));
        }
        Ok(())
    }
}

enum Cause {
    TimedOut,
    Cancelled,
    MemoryExceeded(String),
    Failed(PipelineError),
}
