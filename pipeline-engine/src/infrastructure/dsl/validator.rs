// /////////////////////////////////////////////////////////////////////////////
// CI/CD Pipeline Execution Engine
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! The validator's six-layer rule set is pure domain logic with no I/O
//! (`pipeline_domain::services::DslValidator`); this module is the
//! infrastructure seam that logs the outcome and is what the application
//! layer actually calls.

pub use pipeline_domain::services::DslValidator;
use pipeline_domain::value_objects::{DslCompilationContext, DslExecutionContext, ValidationReport};

pub fn validate_and_log(script_name: &str, script: &str, compilation_ctx: &DslCompilationContext, execution_ctx: &DslExecutionContext) -> ValidationReport {
    let report = DslValidator::validate(script_name, script, compilation_ctx, execution_ctx);
    if report.is_valid() {
        tracing::debug!(script_name, issue_count = report.issues.len(), "script validated");
    } else {
        tracing::warn!(script_name, error_count = report.errors().count(), "script failed validation");
    }
    report
}
