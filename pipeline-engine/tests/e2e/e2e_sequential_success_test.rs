//! A pipeline of three sequential stages, each succeeding once, runs
//! all three stages in order and fires the pipeline's `on_success`/`always`
//! hooks exactly once each.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use pipeline_domain::entities::{Pipeline, PostExecution, Stage, StageBody};
use pipeline_domain::error::PipelineError;
use pipeline_domain::repositories::{HookAction, StepAction, StepContext, StepsContext};
use pipeline_domain::value_objects::{Agent, Environment, StageStatus};
use pipeline_engine::infrastructure::logging::LoggerManager;
use pipeline_engine::infrastructure::runtime::{EventBus, PipelineDriver};
use tokio_util::sync::CancellationToken;

struct EchoStep(&'static str);

#[async_trait]
impl StepAction for EchoStep {
    fn name(&self) -> &str {
        self.0
    }

    async fn run(&self, ctx: &mut StepContext<'_>) -> Result<(), PipelineError> {
        ctx.logger.log(pipeline_domain::events::LogLevel::Info, self.0);
        Ok(())
    }
}

struct CountingHook(Arc<AtomicUsize>);

#[async_trait]
impl HookAction for CountingHook {
    async fn run(&self, _ctx: &mut StepsContext<'_>) -> Result<(), PipelineError> {
        self.0.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[tokio::test]
async fn sequential_pipeline_runs_all_stages_and_fires_pipeline_hooks_once() {
    let event_bus = EventBus::new();
    let logger_manager = LoggerManager::new(32, 8, std::time::Duration::from_millis(5));
    let driver = PipelineDriver::new(event_bus, logger_manager);

    let a = Stage::new("A", StageBody::Sequential(vec![Arc::new(EchoStep("A"))]));
    let b = Stage::new("B", StageBody::Sequential(vec![Arc::new(EchoStep("B"))]));
    let c = Stage::new("C", StageBody::Sequential(vec![Arc::new(EchoStep("C"))]));

    let on_success_calls = Arc::new(AtomicUsize::new(0));
    let always_calls = Arc::new(AtomicUsize::new(0));
    let post = PostExecution {
        on_success: Some(Arc::new(CountingHook(on_success_calls.clone()))),
        on_failure: None,
        always: Some(Arc::new(CountingHook(always_calls.clone()))),
    };

    let pipeline = Pipeline::new(Agent::Any, Environment::empty(), vec![a, b, c], post);
    let workspace = tempfile::tempdir().unwrap();

    let results = driver.run(&pipeline, workspace.path(), CancellationToken::new()).await.unwrap();

    assert_eq!(results.len(), 3);
    assert_eq!(results[0].name, "A");
    assert_eq!(results[1].name, "B");
    assert_eq!(results[2].name, "C");
    assert!(results.iter().all(|r| r.status == StageStatus::Success));
    assert_eq!(on_success_calls.load(Ordering::SeqCst), 1);
    assert_eq!(always_calls.load(Ordering::SeqCst), 1);
}
