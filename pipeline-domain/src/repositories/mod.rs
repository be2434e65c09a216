// /////////////////////////////////////////////////////////////////////////////
// CI/CD Pipeline Execution Engine
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Ports: traits the domain depends on but does not implement. Infrastructure
//! in `pipeline-engine` provides the concrete adapters.

mod dsl_engine;
mod log_consumer;
mod plugin_class_resolver;
mod step_action;
mod workspace;

pub use dsl_engine::{DslCompilationResult, DslEngine, DslExecutionResult};
pub use log_consumer::LogConsumer;
pub use plugin_class_resolver::{ClassResolver, PluginSource, ResolvedSymbol};
pub use step_action::{CancellationSignal, HookAction, StepAction, StepContext, StepLogger, StepsContext};
pub use workspace::Workspace;
