// /////////////////////////////////////////////////////////////////////////////
// CI/CD Pipeline Execution Engine
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::repositories::{HookAction, StepAction};
use crate::value_objects::{Agent, Environment};

/// The three optional hooks invoked after a stage or pipeline completes,
/// specialized by outcome. Post hooks run even if the body they guard
/// raised; `always` runs last, unconditionally, exactly once.
#[derive(Clone, Default)]
pub struct PostExecution {
    pub on_success: Option<Arc<dyn HookAction>>,
    pub on_failure: Option<Arc<dyn HookAction>>,
    pub always: Option<Arc<dyn HookAction>>,
}

impl PostExecution {
    pub fn none() -> Self {
        Self::default()
    }
}

/// A stage's body: either a sequential list of steps, executed in order, or
/// a named set of parallel branches launched concurrently. `parallel`
/// branches are unordered relative to each other but the group as a whole
/// occupies one position in the stage's sequence.
#[derive(Clone)]
pub enum StageBody {
    Sequential(Vec<Arc<dyn StepAction>>),
    Parallel(BTreeMap<String, Arc<dyn StepAction>>),
}

impl StageBody {
    pub fn is_empty(&self) -> bool {
        match self {
            StageBody::Sequential(steps) => steps.is_empty(),
            StageBody::Parallel(branches) => branches.is_empty(),
        }
    }
}

/// A named, ordered unit of work inside a [`Pipeline`]. The name is unique
/// within the owning pipeline; post hooks run even if the body raises.
#[derive(Clone)]
pub struct Stage {
    pub name: String,
    pub body: StageBody,
    pub post: PostExecution,
}

impl Stage {
    pub fn new(name: impl Into<String>, body: StageBody) -> Self {
        Self {
            name: name.into(),
            body,
            post: PostExecution::none(),
        }
    }

    pub fn with_post(mut self, post: PostExecution) -> Self {
        self.post = post;
        self
    }
}

/// An immutable pipeline definition built once from a
/// [`crate::repositories`]-facing builder (`PipelineBuilder`) and driven,
/// read-only, by the engine's state machine. At least one [`Stage`] must be
/// present at run start; the engine enforces this, not this type, since an
/// empty-but-under-construction pipeline is a valid intermediate builder
/// state.
#[derive(Clone)]
pub struct Pipeline {
    pub agent: Agent,
    pub environment: Environment,
    pub stages: Vec<Stage>,
    pub post: PostExecution,
}

impl Pipeline {
    pub fn new(agent: Agent, environment: Environment, stages: Vec<Stage>, post: PostExecution) -> Self {
        Self {
            agent,
            environment,
            stages,
            post,
        }
    }

    pub fn stage_names(&self) -> impl Iterator<Item = &str> {
        self.stages.iter().map(|stage| stage.name.as_str())
    }

    pub fn find_stage(&self, name: &str) -> Option<&Stage> {
        self.stages.iter().find(|stage| stage.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_body_reports_emptiness() {
        assert!(StageBody::Sequential(Vec::new()).is_empty());
        assert!(StageBody::Parallel(BTreeMap::new()).is_empty());
    }

    #[test]
    fn pipeline_finds_stage_by_name() {
        let stage = Stage::new("build", StageBody::Sequential(Vec::new()));
        let pipeline = Pipeline::new(Agent::Any, Environment::empty(), vec![stage], PostExecution::none());
        assert!(pipeline.find_stage("build").is_some());
        assert!(pipeline.find_stage("missing").is_none());
    }
}
