//! A three-stage pipeline `{A, B_fail, C}` where B's step raises: A
//! succeeds, B fails, C never starts; B's `on_failure` then `always` run
//! in that order; the pipeline's `on_failure` then `always` run; the
//! first error is returned.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use pipeline_domain::entities::{Pipeline, PostExecution, Stage, StageBody};
use pipeline_domain::error::PipelineError;
use pipeline_domain::repositories::{HookAction, StepAction, StepContext, StepsContext};
use pipeline_domain::value_objects::{Agent, Environment};
use pipeline_engine::infrastructure::logging::LoggerManager;
use pipeline_engine::infrastructure::runtime::{EventBus, PipelineDriver};
use tokio_util::sync::CancellationToken;

struct RecordingStep {
    name: &'static str,
    calls: Arc<AtomicUsize>,
    fail: bool,
}

#[async_trait]
impl StepAction for RecordingStep {
    fn name(&self) -> &str {
        self.name
    }

    async fn run(&self, _ctx: &mut StepContext<'_>) -> Result<(), PipelineError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            Err(PipelineError::runtime(self.name, None, "step raised"))
        } else {
            Ok(())
        }
    }
}

struct OrderingHook {
    label: &'static str,
    order: Arc<std::sync::Mutex<Vec<&'static str>>>,
}

#[async_trait]
impl HookAction for OrderingHook {
    async fn run(&self, _ctx: &mut StepsContext<'_>) -> Result<(), PipelineError> {
        self.order.lock().unwrap().push(self.label);
        Ok(())
    }
}

#[tokio::test]
async fn mid_pipeline_failure_skips_remaining_stages_and_runs_hooks_in_order() {
    let event_bus = EventBus::new();
    let logger_manager = LoggerManager::new(32, 8, std::time::Duration::from_millis(5));
    let driver = PipelineDriver::new(event_bus, logger_manager);

    let calls = Arc::new(AtomicUsize::new(0));
    let order = Arc::new(std::sync::Mutex::new(Vec::new()));

    let a = Stage::new("A", StageBody::Sequential(vec![Arc::new(RecordingStep { name: "A", calls: calls.clone(), fail: false })]));

    let b_post = PostExecution {
        on_success: None,
        on_failure: Some(Arc::new(OrderingHook { label: "B.on_failure", order: order.clone() })),
        always: Some(Arc::new(OrderingHook { label: "B.always", order: order.clone() })),
    };
    let b_fail = Stage::new("B_fail", StageBody::Sequential(vec![Arc::new(RecordingStep { name: "B_fail", calls: calls.clone(), fail: true })])).with_post(b_post);

    let c = Stage::new("C", StageBody::Sequential(vec![Arc::new(RecordingStep { name: "C", calls: calls.clone(), fail: false })]));

    let pipeline_post = PostExecution {
        on_success: None,
        on_failure: Some(Arc::new(OrderingHook { label: "pipeline.on_failure", order: order.clone() })),
        always: Some(Arc::new(OrderingHook { label: "pipeline.always", order: order.clone() })),
    };

    let pipeline = Pipeline::new(Agent::Any, Environment::empty(), vec![a, b_fail, c], pipeline_post);
    let workspace = tempfile::tempdir().unwrap();

    let result = driver.run(&pipeline, workspace.path(), CancellationToken::new()).await;
    assert!(result.is_err(), "pipeline must propagate the first error");

    // C never started: only A and B_fail's steps ran.
    assert_eq!(calls.load(Ordering::SeqCst), 2);

    let recorded = order.lock().unwrap().clone();
    assert_eq!(recorded, vec!["B.on_failure", "B.always", "pipeline.on_failure", "pipeline.always"]);
}

#[tokio::test]
async fn the_returned_error_names_the_failing_stage() {
    let event_bus = EventBus::new();
    let logger_manager = LoggerManager::new(32, 8, std::time::Duration::from_millis(5));
    let driver = PipelineDriver::new(event_bus, logger_manager);

    let calls = Arc::new(AtomicUsize::new(0));
    let a = Stage::new("A", StageBody::Sequential(vec![Arc::new(RecordingStep { name: "A", calls: calls.clone(), fail: false })]));
    let b_fail = Stage::new("B_fail", StageBody::Sequential(vec![Arc::new(RecordingStep { name: "B_fail", calls: calls.clone(), fail: true })]));
    let pipeline = Pipeline::new(Agent::Any, Environment::empty(), vec![a, b_fail], PostExecution::none());
    let workspace = tempfile::tempdir().unwrap();

    let result = driver.run(&pipeline, workspace.path(), CancellationToken::new()).await;
    match result {
        Err(PipelineError::PipelineRuntimeError { stage, .. }) => assert_eq!(stage, "B_fail"),
        other => panic!("expected a PipelineRuntimeError naming the failing stage, got {other:?}"),
    }
}
