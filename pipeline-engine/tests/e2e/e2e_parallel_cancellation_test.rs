//! A parallel stage with branches `{"u" -> sleep 5s, "v" -> throw at 10ms}`.
//! `v`'s failure cancels `u` cooperatively; both branches' completion state
//! is observable; total wall time is far below 5s.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use pipeline_domain::entities::{Pipeline, PostExecution, Stage, StageBody};
use pipeline_domain::error::PipelineError;
use pipeline_domain::repositories::{StepAction, StepContext};
use pipeline_domain::value_objects::{Agent, Environment};
use pipeline_engine::infrastructure::logging::LoggerManager;
use pipeline_engine::infrastructure::runtime::{EventBus, PipelineDriver};
use tokio_util::sync::CancellationToken;

struct SlowStep {
    completed: Arc<AtomicUsize>,
}

#[async_trait]
impl StepAction for SlowStep {
    fn name(&self) -> &str {
        "u"
    }

    async fn run(&self, ctx: &mut StepContext<'_>) -> Result<(), PipelineError> {
        for _ in 0..1000 {
            if ctx.cancellation.is_cancelled() {
                return Err(PipelineError::Cancelled("u observed cancellation".into()));
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        self.completed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

struct QuickFailStep;

#[async_trait]
impl StepAction for QuickFailStep {
    fn name(&self) -> &str {
        "v"
    }

    async fn run(&self, _ctx: &mut StepContext<'_>) -> Result<(), PipelineError> {
        tokio::time::sleep(Duration::from_millis(10)).await;
        Err(PipelineError::runtime("verify", Some("v".into()), "v failed"))
    }
}

#[tokio::test]
async fn parallel_branch_failure_cancels_peers_well_under_the_slow_branchs_duration() {
    let event_bus = EventBus::new();
    let logger_manager = LoggerManager::new(32, 8, Duration::from_millis(5));
    let driver = PipelineDriver::new(event_bus, logger_manager);

    let u_completed = Arc::new(AtomicUsize::new(0));
    let mut branches: BTreeMap<String, Arc<dyn StepAction>> = BTreeMap::new();
    branches.insert("u".into(), Arc::new(SlowStep { completed: u_completed.clone() }));
    branches.insert("v".into(), Arc::new(QuickFailStep));

    let stage = Stage::new("verify", StageBody::Parallel(branches));
    let pipeline = Pipeline::new(Agent::Any, Environment::empty(), vec![stage], PostExecution::none());
    let workspace = tempfile::tempdir().unwrap();

    let started = Instant::now();
    let result = driver.run(&pipeline, workspace.path(), CancellationToken::new()).await;
    let elapsed = started.elapsed();

    assert!(result.is_err());
    assert_eq!(u_completed.load(Ordering::SeqCst), 0, "u must be cancelled before completing its sleep");
    assert!(elapsed < Duration::from_secs(1), "branch cancellation must short-circuit the 5s sleep, took {elapsed:?}");
}
