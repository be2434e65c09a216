// /////////////////////////////////////////////////////////////////////////////
// CI/CD Pipeline Execution Engine
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Application Commands
//!
//! Self-contained, immutable descriptions of an operation a use case can
//! execute. A command carries everything its use case needs; it validates
//! nothing and performs no I/O itself, it simply names the operation and
//! its parameters, keeping the use cases (the `execute` side) free to stay
//! focused on orchestration.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use pipeline_domain::entities::Pipeline;
use pipeline_domain::repositories::DslEngine;
use pipeline_domain::value_objects::{DslCompilationContext, DslExecutionContext};

/// Run a pipeline to completion against a workspace root, with an optional
/// wall-clock deadline enforced by the caller's cancellation token.
#[derive(Clone)]
pub struct RunPipelineCommand {
    pub pipeline: Arc<Pipeline>,
    pub workspace_root: PathBuf,
    pub deadline: Option<Duration>,
}

impl RunPipelineCommand {
    pub fn new(pipeline: Arc<Pipeline>, workspace_root: impl Into<PathBuf>) -> Self {
        Self {
            pipeline,
            workspace_root: workspace_root.into(),
            deadline: None,
        }
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }
}

/// Register a DSL engine under the extensions and capabilities its
/// descriptor declares.
#[derive(Clone)]
pub struct RegisterEngineCommand {
    pub engine: Arc<dyn DslEngine>,
}

impl RegisterEngineCommand {
    pub fn new(engine: Arc<dyn DslEngine>) -> Self {
        Self { engine }
    }
}

/// Load the plugin rooted at `directory`.
#[derive(Clone)]
pub struct LoadPluginCommand {
    pub directory: PathBuf,
}

impl LoadPluginCommand {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self { directory: directory.into() }
    }
}

/// Validate a script's text against the six-layer rule set, without
/// compiling or executing it.
#[derive(Clone)]
pub struct ValidateScriptCommand {
    pub script_name: String,
    pub script: String,
    pub compilation_ctx: DslCompilationContext,
    pub execution_ctx: DslExecutionContext,
}

impl ValidateScriptCommand {
    pub fn new(script_name: impl Into<String>, script: impl Into<String>) -> Self {
        Self {
            script_name: script_name.into(),
            script: script.into(),
            compilation_ctx: DslCompilationContext::default(),
            execution_ctx: DslExecutionContext::default(),
        }
    }

    pub fn with_compilation_ctx(mut self, ctx: DslCompilationContext) -> Self {
        self.compilation_ctx = ctx;
        self
    }

    pub fn with_execution_ctx(mut self, ctx: DslExecutionContext) -> Self {
        self.execution_ctx = ctx;
        self
    }
}
