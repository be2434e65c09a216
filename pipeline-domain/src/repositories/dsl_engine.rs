// /////////////////////////////////////////////////////////////////////////////
// CI/CD Pipeline Execution Engine
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::PipelineError;
use crate::value_objects::{DslCompilationContext, DslEngineDescriptor, DslExecutionContext};

/// Result of a compilation pass: either a caller-opaque compiled-artifact
/// handle (an identifier the engine understands on `execute`) or a
/// compilation failure message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DslCompilationResult {
    Success { artifact_id: String },
    Failure { message: String },
}

/// Result of an execute pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DslExecutionResult {
    Success { output: String },
    Failure { message: String },
}

/// A registered script engine: compiles and executes scripts for the
/// extensions it has claimed in the registry.
#[async_trait]
pub trait DslEngine: Send + Sync {
    fn descriptor(&self) -> &DslEngineDescriptor;

    async fn compile(&self, script: &str, ctx: &DslCompilationContext) -> Result<DslCompilationResult, PipelineError>;

    async fn execute(&self, artifact_id: &str, ctx: &DslExecutionContext) -> Result<DslExecutionResult, PipelineError>;
}
