// /////////////////////////////////////////////////////////////////////////////
// CI/CD Pipeline Execution Engine
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::StageStatus;

/// A monotonically increasing identifier assigned by the [`crate::repositories`]
/// event bus port at publish time. Unique per process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EventId(pub u64);

/// Lifecycle signal published by the pipeline state machine (component K) to
/// the event bus (component L). A sealed tagged union, matched exhaustively
/// at every use site.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PipelineEvent {
    Start {
        event_id: EventId,
        time_millis: i64,
        stage: String,
    },
    End {
        event_id: EventId,
        time_millis: i64,
        stage: String,
        duration_ms: u64,
        status: StageStatus,
    },
    Generic {
        event_id: EventId,
        time_millis: i64,
        name: String,
        payload: serde_json::Value,
    },
}

impl PipelineEvent {
    pub fn event_id(&self) -> EventId {
        match self {
            PipelineEvent::Start { event_id, .. } => *event_id,
            PipelineEvent::End { event_id, .. } => *event_id,
            PipelineEvent::Generic { event_id, .. } => *event_id,
        }
    }

    pub fn time_millis(&self) -> i64 {
        match self {
            PipelineEvent::Start { time_millis, .. } => *time_millis,
            PipelineEvent::End { time_millis, .. } => *time_millis,
            PipelineEvent::Generic { time_millis, .. } => *time_millis,
        }
    }

    pub fn now_millis() -> i64 {
        Utc::now().timestamp_millis()
    }

    pub fn as_datetime(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.time_millis())
    }
}
