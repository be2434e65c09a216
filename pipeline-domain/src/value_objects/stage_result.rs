// /////////////////////////////////////////////////////////////////////////////
// CI/CD Pipeline Execution Engine
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

use serde::{Deserialize, Serialize};

/// The outcome of a single stage attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StageStatus {
    Success,
    Failure,
}

/// Produced exactly once per stage attempt, appended to a run's
/// `stage_results` in execution order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageResult {
    pub name: String,
    pub status: StageStatus,
}

impl StageResult {
    pub fn success(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: StageStatus::Success,
        }
    }

    pub fn failure(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: StageStatus::Failure,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.status, StageStatus::Success)
    }
}
