// /////////////////////////////////////////////////////////////////////////////
// CI/CD Pipeline Execution Engine
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! End-to-End Tests
//!
//! This module aggregates all E2E tests for the pipeline engine, one file
//! per seed scenario (S1-S6).

#[path = "e2e/e2e_sequential_success_test.rs"]
mod e2e_sequential_success_test;

#[path = "e2e/e2e_failure_mid_pipeline_test.rs"]
mod e2e_failure_mid_pipeline_test;

#[path = "e2e/e2e_parallel_cancellation_test.rs"]
mod e2e_parallel_cancellation_test;

#[path = "e2e/e2e_logger_isolation_test.rs"]
mod e2e_logger_isolation_test;

#[path = "e2e/e2e_sandbox_memory_limit_test.rs"]
mod e2e_sandbox_memory_limit_test;

#[path = "e2e/e2e_plugin_lifecycle_test.rs"]
mod e2e_plugin_lifecycle_test;
