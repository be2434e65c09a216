// /////////////////////////////////////////////////////////////////////////////
// CI/CD Pipeline Execution Engine
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! The step execution port. A [`Step`](crate::entities::Step) is modeled as
//! `Arc<dyn StepAction>` rather than a boxed closure: closures that capture
//! `&mut StepContext` across `.await` points are not object-safe in stable
//! Rust without the boxing `async_trait` already does for us, and
//! `async_trait` is how ports elsewhere in this crate (e.g. [`DslEngine`])
//! are already expressed.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::PipelineError;
use crate::value_objects::{Environment, StageResult};

/// A minimal logging sink a step observes. The concrete implementation
/// (routing through the pooled log record / distributor pipeline) lives in
/// infrastructure; the domain only needs to know it can emit a line.
pub trait StepLogger: Send + Sync {
    fn log(&self, level: crate::events::LogLevel, message: &str);
}

/// Cooperative-cancellation signal a step or hook polls at its yield points.
/// Infrastructure backs this with a `tokio_util::sync::CancellationToken`;
/// the domain only needs to know whether cancellation has been requested.
pub trait CancellationSignal: Send + Sync {
    fn is_cancelled(&self) -> bool;
}

/// Breaks the `Pipeline` ↔ `PostExecution` ↔ steps cycle: a step observes a
/// borrowed execution context rather than an owned `Pipeline`.
pub struct StepContext<'a> {
    pub env: &'a Environment,
    pub workspace_root: &'a Path,
    pub logger: Arc<dyn StepLogger>,
    pub cancellation: Arc<dyn CancellationSignal>,
    pub correlation_id: Option<String>,
}

impl<'a> StepContext<'a> {
    pub fn new(env: &'a Environment, workspace_root: &'a Path, logger: Arc<dyn StepLogger>, cancellation: Arc<dyn CancellationSignal>) -> Self {
        Self {
            env,
            workspace_root,
            logger,
            cancellation,
            correlation_id: None,
        }
    }

    pub fn with_correlation_id(mut self, correlation_id: impl Into<String>) -> Self {
        self.correlation_id = Some(correlation_id.into());
        self
    }
}

/// The wider context a [`HookAction`] (`onSuccess`/`onFailure`/`always`)
/// observes: everything a step sees, plus the stage results accumulated so
/// far in the current run.
pub struct StepsContext<'a> {
    pub step: StepContext<'a>,
    pub stage_results: &'a [StageResult],
}

/// An atomic suspendable action within a stage.
#[async_trait]
pub trait StepAction: Send + Sync {
    /// A human-readable name used in log fields and error messages.
    fn name(&self) -> &str;

    async fn run(&self, ctx: &mut StepContext<'_>) -> Result<(), PipelineError>;
}

/// A post-execution hook body (`always`, `onSuccess`, `onFailure`).
#[async_trait]
pub trait HookAction: Send + Sync {
    async fn run(&self, ctx: &mut StepsContext<'_>) -> Result<(), PipelineError>;
}
