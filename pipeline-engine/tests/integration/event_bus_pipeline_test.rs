//! Drives a two-stage pipeline through `PipelineDriver` and asserts the
//! event bus observes the expected `Start`/`End` sequence with strictly
//! increasing event ids, matching the stage order.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use pipeline_domain::entities::{Pipeline, PostExecution, Stage, StageBody};
use pipeline_domain::error::PipelineError;
use pipeline_domain::events::PipelineEvent;
use pipeline_domain::repositories::{StepAction, StepContext};
use pipeline_domain::value_objects::{Agent, Environment};
use pipeline_engine::infrastructure::logging::LoggerManager;
use pipeline_engine::infrastructure::runtime::{EventBus, EventSubscriber, PipelineDriver};
use tokio_util::sync::CancellationToken;

struct NoopStep(&'static str);

#[async_trait]
impl StepAction for NoopStep {
    fn name(&self) -> &str {
        self.0
    }

    async fn run(&self, _ctx: &mut StepContext<'_>) -> Result<(), PipelineError> {
        Ok(())
    }
}

struct RecordingSubscriber {
    events: Mutex<Vec<PipelineEvent>>,
}

impl EventSubscriber for RecordingSubscriber {
    fn on_event(&self, event: &PipelineEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

#[tokio::test]
async fn event_bus_observes_start_and_end_for_every_stage_in_order() {
    let event_bus = EventBus::new();
    let subscriber = Arc::new(RecordingSubscriber { events: Mutex::new(Vec::new()) });
    event_bus.subscribe(subscriber.clone());

    let logger_manager = LoggerManager::new(32, 8, std::time::Duration::from_millis(5));
    let driver = PipelineDriver::new(event_bus, logger_manager);

    let build = Stage::new("build", StageBody::Sequential(vec![Arc::new(NoopStep("compile"))]));
    let test = Stage::new("test", StageBody::Sequential(vec![Arc::new(NoopStep("unit"))]));
    let pipeline = Pipeline::new(Agent::Any, Environment::empty(), vec![build, test], PostExecution::none());
    let workspace = tempfile::tempdir().unwrap();

    driver.run(&pipeline, workspace.path(), CancellationToken::new()).await.unwrap();

    let events = subscriber.events.lock().unwrap().clone();
    let stage_names: Vec<&str> = events
        .iter()
        .filter_map(|e| match e {
            PipelineEvent::Start { stage, .. } => Some(stage.as_str()),
            PipelineEvent::End { stage, .. } => Some(stage.as_str()),
            PipelineEvent::Generic { .. } => None,
        })
        .collect();
    assert_eq!(stage_names, vec!["build", "build", "test", "test"], "Start/End must be observed per stage in execution order");

    let ids: Vec<u64> = events.iter().map(|e| e.event_id().0).collect();
    let mut sorted = ids.clone();
    sorted.sort_unstable();
    assert_eq!(ids, sorted, "event ids must be strictly increasing in publish order");

    let distinct_ids: std::collections::HashSet<u64> = ids.iter().copied().collect();
    assert_eq!(distinct_ids.len(), ids.len(), "every event id must be unique");
}
