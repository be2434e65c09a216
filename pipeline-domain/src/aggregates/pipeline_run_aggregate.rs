// /////////////////////////////////////////////////////////////////////////////
// CI/CD Pipeline Execution Engine
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Tracks one run of a [`crate::entities::Pipeline`]. This is the donor's
//! event-sourcing aggregate shape repurposed: instead of replaying events to
//! rebuild a CRUD-persisted entity, it accumulates the events raised during a
//! single execution (an audit trail), draining `uncommitted_events` after
//! each stage the way the donor drains them after each command.

use std::sync::atomic::{AtomicU64, Ordering};

use uuid::Uuid;

use crate::events::{EventId, PipelineEvent};
use crate::value_objects::{StageResult, StageStatus};

/// Sentinel `currentStage` value before the first stage starts.
pub const INITIAL_STAGE_SENTINEL: &str = "initial pipeline";

static NEXT_EVENT_ID: AtomicU64 = AtomicU64::new(1);

fn next_event_id() -> EventId {
    EventId(NEXT_EVENT_ID.fetch_add(1, Ordering::Relaxed))
}

/// Opaque identity for one execution of a pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PipelineRunId(pub Uuid);

impl PipelineRunId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PipelineRunId {
    fn default() -> Self {
        Self::new()
    }
}

/// The consistency boundary for a single pipeline run: owns `stage_results`
/// exclusively (per the data model's ownership summary) and accumulates
/// `uncommitted_events` the caller drains after each stage transition.
pub struct PipelineRunAggregate {
    run_id: PipelineRunId,
    current_stage: String,
    stage_results: Vec<StageResult>,
    uncommitted_events: Vec<PipelineEvent>,
}

impl PipelineRunAggregate {
    pub fn new(run_id: PipelineRunId) -> Self {
        Self {
            run_id,
            current_stage: INITIAL_STAGE_SENTINEL.to_string(),
            stage_results: Vec::new(),
            uncommitted_events: Vec::new(),
        }
    }

    pub fn run_id(&self) -> PipelineRunId {
        self.run_id
    }

    pub fn current_stage(&self) -> &str {
        &self.current_stage
    }

    pub fn stage_results(&self) -> &[StageResult] {
        &self.stage_results
    }

    /// Records the pipeline-level start signal. `current_stage` stays at
    /// the sentinel until the first stage begins.
    pub fn record_pipeline_start(&mut self) {
        self.apply_event(PipelineEvent::Start {
            event_id: next_event_id(),
            time_millis: PipelineEvent::now_millis(),
            stage: self.current_stage.clone(),
        });
    }

    pub fn record_stage_start(&mut self, stage_name: impl Into<String>) {
        self.current_stage = stage_name.into();
        self.apply_event(PipelineEvent::Start {
            event_id: next_event_id(),
            time_millis: PipelineEvent::now_millis(),
            stage: self.current_stage.clone(),
        });
    }

    pub fn record_stage_end(&mut self, duration_ms: u64, status: StageStatus) {
        let stage = self.current_stage.clone();
        self.apply_event(PipelineEvent::End {
            event_id: next_event_id(),
            time_millis: PipelineEvent::now_millis(),
            stage: stage.clone(),
            duration_ms,
            status,
        });
        self.stage_results.push(StageResult { name: stage, status });
    }

    pub fn record_generic(&mut self, name: impl Into<String>, payload: serde_json::Value) {
        self.apply_event(PipelineEvent::Generic {
            event_id: next_event_id(),
            time_millis: PipelineEvent::now_millis(),
            name: name.into(),
            payload,
        });
    }

    fn apply_event(&mut self, event: PipelineEvent) {
        self.uncommitted_events.push(event);
    }

    /// Drains and returns events raised since the last drain. Callers
    /// (the state machine driver) forward these to the event bus.
    pub fn drain_uncommitted_events(&mut self) -> Vec<PipelineEvent> {
        std::mem::take(&mut self.uncommitted_events)
    }

    /// Whether any stage in this run has failed so far.
    pub fn has_failure(&self) -> bool {
        self.stage_results.iter().any(|result| !result.is_success())
    }
}
