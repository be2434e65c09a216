// /////////////////////////////////////////////////////////////////////////////
// CI/CD Pipeline Execution Engine
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! The pipeline state machine (component K): the `run()` driver implements
//! the exact 4-step contract over a `Pipeline`, and `parallel` groups are
//! multiplexed with `tokio::task::JoinSet` behind a `CancellationToken`,
//! cancelling the remaining branches as soon as one fails.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use pipeline_domain::aggregates::{PipelineRunAggregate, PipelineRunId};
use pipeline_domain::entities::{Pipeline, Stage, StageBody};
use pipeline_domain::error::PipelineError;
use pipeline_domain::repositories::{CancellationSignal, HookAction, StepContext, StepLogger, StepsContext};
use pipeline_domain::value_objects::{Environment, StageResult, StageStatus};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use super::event_bus::EventBus;
use crate::infrastructure::logging::LoggerManager;

struct TokenCancellationSignal(CancellationToken);

impl CancellationSignal for TokenCancellationSignal {
    fn is_cancelled(&self) -> bool {
        self.0.is_cancelled()
    }
}

/// Drives exactly one run of a `Pipeline` to completion, publishing every
/// event raised along the way to the event bus and routing step/hook log
/// output through per-stage (or per-branch) loggers.
pub struct PipelineDriver {
    event_bus: Arc<EventBus>,
    logger_manager: Arc<LoggerManager>,
}

impl PipelineDriver {
    pub fn new(event_bus: Arc<EventBus>, logger_manager: Arc<LoggerManager>) -> Self {
        Self { event_bus, logger_manager }
    }

    /// Runs `pipeline` to completion and returns its `stage_results` in
    /// execution order. On failure, pipeline-level `post` hooks still run
    /// (the "finally" semantics §7 calls for) before the first captured
    /// error is returned.
    pub async fn run(&self, pipeline: &Pipeline, workspace_root: &Path, cancellation: CancellationToken) -> Result<Vec<StageResult>, PipelineError> {
        let mut aggregate = PipelineRunAggregate::new(PipelineRunId::new());
        aggregate.record_pipeline_start();
        self.publish_pending(&mut aggregate);

        let mut first_error: Option<PipelineError> = None;

        for stage in &pipeline.stages {
            if cancellation.is_cancelled() {
                first_error = Some(PipelineError::Cancelled(format!("pipeline cancelled before stage '{}'", stage.name)));
                break;
            }

            aggregate.record_stage_start(stage.name.clone());
            self.publish_pending(&mut aggregate);
            let started_at = Instant::now();

            let outcome = self.run_stage_body(stage, &pipeline.environment, workspace_root, cancellation.clone()).await;
            let duration_ms = started_at.elapsed().as_millis() as u64;
            let stage_results_so_far = aggregate.stage_results().to_vec();

            match outcome {
                Ok(()) => {
                    self.run_hook_logging_errors(stage.post.on_success.as_ref(), &stage.name, "on_success", &pipeline.environment, workspace_root, &cancellation, &stage_results_so_far).await;
                    self.run_hook_logging_errors(stage.post.always.as_ref(), &stage.name, "always", &pipeline.environment, workspace_root, &cancellation, &stage_results_so_far).await;
                    aggregate.record_stage_end(duration_ms, StageStatus::Success);
                    self.publish_pending(&mut aggregate);
                }
                Err(err) => {
                    self.run_hook_logging_errors(stage.post.on_failure.as_ref(), &stage.name, "on_failure", &pipeline.environment, workspace_root, &cancellation, &stage_results_so_far).await;
                    self.run_hook_logging_errors(stage.post.always.as_ref(), &stage.name, "always", &pipeline.environment, workspace_root, &cancellation, &stage_results_so_far).await;
                    aggregate.record_stage_end(duration_ms, StageStatus::Failure);
                    self.publish_pending(&mut aggregate);
                    first_error = Some(err);
                    break;
                }
            }
        }

        let final_results = aggregate.stage_results().to_vec();
        let pipeline_hook = if aggregate.has_failure() || first_error.is_some() { pipeline.post.on_failure.as_ref() } else { pipeline.post.on_success.as_ref() };
        self.run_hook_logging_errors(pipeline_hook, "pipeline", "post", &pipeline.environment, workspace_root, &cancellation, &final_results).await;
        self.run_hook_logging_errors(pipeline.post.always.as_ref(), "pipeline", "always", &pipeline.environment, workspace_root, &cancellation, &final_results).await;

        match first_error {
            Some(err) => Err(err),
            None => Ok(final_results),
        }
    }

    async fn run_stage_body(&self, stage: &Stage, env: &Environment, workspace_root: &Path, cancellation: CancellationToken) -> Result<(), PipelineError> {
        match &stage.body {
            StageBody::Sequential(steps) => {
                for step in steps {
                    if cancellation.is_cancelled() {
                        return Err(PipelineError::Cancelled(format!("stage '{}' cancelled before step '{}'", stage.name, step.name())));
                    }
                    let logger = self.logger_manager.get_logger(&format!("{}.{}", stage.name, step.name()));
                    let mut ctx = StepContext::new(env, workspace_root, logger as Arc<dyn StepLogger>, Arc::new(TokenCancellationSignal(cancellation.clone())));
                    step.run(&mut ctx).await?;
                }
                Ok(())
            }
            StageBody::Parallel(branches) => self.run_parallel(stage, branches, env, workspace_root, cancellation).await,
        }
    }

    /// Launches every branch concurrently; the first branch failure cancels
    /// the rest cooperatively and its error is the one returned. Branches
    /// observe cancellation at their own next yield point, same as a
    /// top-level stage would.
    async fn run_parallel(&self, stage: &Stage, branches: &std::collections::BTreeMap<String, Arc<dyn pipeline_domain::repositories::StepAction>>, env: &Environment, workspace_root: &Path, parent_cancellation: CancellationToken) -> Result<(), PipelineError> {
        let branch_cancellation = CancellationToken::new();
        let mut joins = JoinSet::new();

        for (branch_name, step) in branches {
            let step = step.clone();
            let branch_name = branch_name.clone();
            let env = env.clone();
            let workspace_root = workspace_root.to_path_buf();
            let logger = self.logger_manager.get_logger(&format!("{}.{}", stage.name, branch_name));
            let branch_token = branch_cancellation.clone();
            let parent_token = parent_cancellation.clone();

            joins.spawn(async move {
                let combined = TokenCancellationSignal(branch_token.clone());
                let mut ctx = StepContext::new(&env, &workspace_root, logger as Arc<dyn StepLogger>, Arc::new(combined));
                let result = tokio::select! {
                    biased;
                    _ = branch_token.cancelled() => Err(PipelineError::Cancelled(format!("branch '{branch_name}' cancelled"))),
                    _ = parent_token.cancelled() => Err(PipelineError::Cancelled(format!("branch '{branch_name}' cancelled"))),
                    result = step.run(&mut ctx) => result,
                };
                (branch_name, result)
            });
        }

        let mut first_error = None;
        while let Some(joined) = joins.join_next().await {
            match joined {
                Ok((_, Ok(()))) => {}
                Ok((branch_name, Err(err))) => {
                    if first_error.is_none() {
                        tracing::error!(stage = %stage.name, branch = %branch_name, error = %err, "parallel branch failed, cancelling remaining branches");
                        branch_cancellation.cancel();
                        first_error = Some(err);
                    }
                }
                Err(join_err) => {
                    if first_error.is_none() {
                        branch_cancellation.cancel();
                        first_error = Some(PipelineError::InternalError(format!("parallel branch panicked: {join_err}")));
                    }
                }
            }
        }

        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Runs a post-execution hook, if present, swallowing its error into
    /// the log rather than propagating: hooks never shadow the primary
    /// stage/pipeline outcome.
    #[allow(clippy::too_many_arguments)]
    async fn run_hook_logging_errors(&self, hook: Option<&Arc<dyn HookAction>>, scope: &str, which: &str, env: &Environment, workspace_root: &Path, cancellation: &CancellationToken, stage_results: &[StageResult]) {
        let Some(hook) = hook else { return };
        let logger = self.logger_manager.get_logger(&format!("{scope}.{which}"));
        let step_ctx = StepContext::new(env, workspace_root, logger as Arc<dyn StepLogger>, Arc::new(TokenCancellationSignal(cancellation.clone())));
        let mut ctx = StepsContext { step: step_ctx, stage_results };
        if let Err(err) = hook.run(&mut ctx).await {
            tracing::error!(scope = %scope, hook = %which, cause = %err, "post-execution hook raised; swallowed");
        }
    }

    fn publish_pending(&self, aggregate: &mut PipelineRunAggregate) {
        for event in aggregate.drain_uncommitted_events() {
            self.event_bus.publish(event);
        }
    }
}
