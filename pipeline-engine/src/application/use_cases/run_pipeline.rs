// /////////////////////////////////////////////////////////////////////////////
// CI/CD Pipeline Execution Engine
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Run Pipeline Use Case
//!
//! Drives one [`pipeline_domain::entities::Pipeline`] to completion through
//! the [`crate::infrastructure::runtime::PipelineDriver`] state machine,
//! translating an optional wall-clock deadline into a `CancellationToken`
//! the driver (and every step/hook beneath it) observes cooperatively.

use std::sync::Arc;

use pipeline_domain::error::PipelineError;
use pipeline_domain::value_objects::StageResult;
use tokio_util::sync::CancellationToken;

use crate::application::commands::RunPipelineCommand;
use crate::infrastructure::runtime::PipelineDriver;

pub struct RunPipelineUseCase {
    driver: Arc<PipelineDriver>,
}

impl RunPipelineUseCase {
    pub fn new(driver: Arc<PipelineDriver>) -> Self {
        Self { driver }
    }

    /// Executes `command.pipeline` against `command.workspace_root`. If a
    /// deadline is set, a background task cancels the run's token once it
    /// elapses; the run itself still observes cancellation only at stage
    /// and step boundaries, per the cooperative-cancellation model.
    pub async fn execute(&self, command: RunPipelineCommand) -> Result<Vec<StageResult>, PipelineError> {
        let cancellation = CancellationToken::new();

        let _deadline_guard = command.deadline.map(|deadline| {
            let token = cancellation.clone();
            tokio::spawn(async move {
                tokio::select! {
                    _ = tokio::time::sleep(deadline) => token.cancel(),
                    _ = token.cancelled() => {}
                }
            })
        });

        self.driver.run(&command.pipeline, &command.workspace_root, cancellation.clone()).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use pipeline_domain::entities::{Pipeline, PostExecution, Stage, StageBody};
    use pipeline_domain::repositories::{StepAction, StepContext};
    use pipeline_domain::value_objects::{Agent, Environment};
    use tempfile::tempdir;

    use super::*;
    use crate::infrastructure::logging::LoggerManager;
    use crate::infrastructure::runtime::EventBus;

    struct NoopStep;

    #[async_trait]
    impl StepAction for NoopStep {
        fn name(&self) -> &str {
            "noop"
        }

        async fn run(&self, _ctx: &mut StepContext<'_>) -> Result<(), PipelineError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn runs_a_trivial_pipeline_to_completion() {
        let logger_manager = LoggerManager::new(16, 4, std::time::Duration::from_millis(5));
        let event_bus = EventBus::new();
        let driver = Arc::new(PipelineDriver::new(event_bus, logger_manager));
        let use_case = RunPipelineUseCase::new(driver);

        let stage = Stage::new("build", StageBody::Sequential(vec![Arc::new(NoopStep)]));
        let pipeline = Arc::new(Pipeline::new(Agent::Any, Environment::empty(), vec![stage], PostExecution::none()));
        let workspace = tempdir().unwrap();

        let command = RunPipelineCommand::new(pipeline, workspace.path());
        let results = use_case.execute(command).await.unwrap();
        assert_eq!(results.len(), 1);
    }
}
