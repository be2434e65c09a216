// /////////////////////////////////////////////////////////////////////////////
// CI/CD Pipeline Execution Engine
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! The CQRS-flavored seam between a front end (the CLI in
//! `pipeline-bootstrap`, or any future HTTP surface) and the infrastructure
//! adapters in [`crate::infrastructure`]. Each operation a caller can invoke
//! is a command struct plus a use case that executes it; use cases hold
//! only `Arc`-shared references to the adapters they orchestrate, so the
//! same use case can be driven concurrently by multiple callers.

pub mod commands;
pub mod use_cases;

pub use use_cases::{LoadPluginUseCase, RegisterEngineUseCase, RunPipelineUseCase, ValidateScriptUseCase};
