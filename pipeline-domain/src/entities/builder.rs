// /////////////////////////////////////////////////////////////////////////////
// CI/CD Pipeline Execution Engine
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Plain builder structs standing in for the surface `pipeline {}` /
//! `stages {}` / `stage {}` / `post {}` / `environment {}` DSL blocks, which
//! are out of scope here (see `SPEC_FULL.md` §1 — surface syntax is an
//! external collaborator's concern). Nesting is enforced by ownership, not
//! by a live borrow: a [`StageBuilder`] is handed back to its
//! [`PipelineBuilder`] by value on `finish_stage`, so it cannot outlive or
//! escape the pipeline it was built for, and a [`StepsBuilder`] never holds
//! a stage or pipeline reference at all.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::entities::{Pipeline, PostExecution, Stage, StageBody};
use crate::repositories::{HookAction, StepAction};
use crate::value_objects::{Agent, Environment};

/// Accumulates steps for one stage body. Cannot add stages — only a
/// [`PipelineBuilder`] can do that — so a `StepsBuilder` cannot escape the
/// stage it is building.
#[derive(Default)]
pub struct StepsBuilder {
    steps: Vec<Arc<dyn StepAction>>,
}

impl StepsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_step(mut self, step: Arc<dyn StepAction>) -> Self {
        self.steps.push(step);
        self
    }

    pub fn build(self) -> StageBody {
        StageBody::Sequential(self.steps)
    }
}

/// Accumulates named branches for a stage's `parallel` body.
#[derive(Default)]
pub struct ParallelBuilder {
    branches: BTreeMap<String, Arc<dyn StepAction>>,
}

impl ParallelBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_branch(mut self, name: impl Into<String>, step: Arc<dyn StepAction>) -> Self {
        self.branches.insert(name.into(), step);
        self
    }

    pub fn build(self) -> StageBody {
        StageBody::Parallel(self.branches)
    }
}

/// Accumulates `{onSuccess, onFailure, always}` hooks for a stage or
/// pipeline.
#[derive(Default)]
pub struct PostExecutionBuilder {
    on_success: Option<Arc<dyn HookAction>>,
    on_failure: Option<Arc<dyn HookAction>>,
    always: Option<Arc<dyn HookAction>>,
}

impl PostExecutionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_success(mut self, hook: Arc<dyn HookAction>) -> Self {
        self.on_success = Some(hook);
        self
    }

    pub fn on_failure(mut self, hook: Arc<dyn HookAction>) -> Self {
        self.on_failure = Some(hook);
        self
    }

    pub fn always(mut self, hook: Arc<dyn HookAction>) -> Self {
        self.always = Some(hook);
        self
    }

    pub fn build(self) -> PostExecution {
        PostExecution {
            on_success: self.on_success,
            on_failure: self.on_failure,
            always: self.always,
        }
    }
}

/// Accumulates name/value pairs for a pipeline's environment.
#[derive(Default)]
pub struct EnvironmentBuilder {
    vars: std::collections::HashMap<String, String>,
}

impl EnvironmentBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }

    pub fn build(self) -> Environment {
        Environment::new(self.vars)
    }
}

/// Builds one [`Stage`]. Returned to its owning [`PipelineBuilder`] by
/// `PipelineBuilder::finish_stage` — it never holds a reference back to the
/// pipeline, so it cannot add stages of its own.
pub struct StageBuilder {
    name: String,
    body: StageBody,
    post: PostExecution,
}

impl StageBuilder {
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

    pub fn build(self) -> Stage {
        Stage::new(self.name, self.body).with_post(self.post)
    }
}

/// Builds one [`Pipeline`]. The only builder that may add stages — a
/// [`StageBuilder`] is built independently and handed in whole, so there is
/// no way for stage-construction code to reach back into the pipeline under
/// construction.
#[derive(Default)]
pub struct PipelineBuilder {
    agent: Agent,
    environment: Environment,
    stages: Vec<Stage>,
    post: PostExecution,
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn agent(mut self, agent: Agent) -> Self {
        self.agent = agent;
        self
    }

    pub fn environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    /// Appends a fully built stage. Takes the finished `Stage`, not a
    /// `StageBuilder`, so a stage under construction never has access to
    /// the pipeline it will join.
    pub fn add_stage(mut self, stage: Stage) -> Self {
        self.stages.push(stage);
        self
    }

    pub fn post(mut self, post: PostExecution) -> Self {
        self.post = post;
        self
    }

    pub fn build(self) -> Pipeline {
        Pipeline::new(self.agent, self.environment, self.stages, self.post)
    }
}
