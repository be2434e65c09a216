// /////////////////////////////////////////////////////////////////////////////
// CI/CD Pipeline Execution Engine
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Entities: types with identity that persists across mutation, scoped to a
//! single pipeline definition or run.

mod builder;
mod loaded_plugin;
mod pipeline;

pub use builder::{EnvironmentBuilder, ParallelBuilder, PipelineBuilder, PostExecutionBuilder, StageBuilder, StepsBuilder};
pub use loaded_plugin::{LoadedPlugin, PluginState};
pub use pipeline::{Pipeline, PostExecution, Stage, StageBody};
