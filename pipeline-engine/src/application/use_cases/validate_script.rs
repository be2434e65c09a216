// /////////////////////////////////////////////////////////////////////////////
// CI/CD Pipeline Execution Engine
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Validate Script Use Case
//!
//! Runs a script's text through the six-layer validation rule set
//! (component G) without compiling or executing it, the operation the
//! `validate` CLI command and any pre-flight check in a future front end
//! call through.

use pipeline_domain::value_objects::ValidationReport;

use crate::application::commands::ValidateScriptCommand;
use crate::infrastructure::dsl::validate_and_log;

#[derive(Default)]
pub struct ValidateScriptUseCase;

impl ValidateScriptUseCase {
    pub fn new() -> Self {
        Self
    }

    pub fn execute(&self, command: ValidateScriptCommand) -> ValidationReport {
        validate_and_log(&command.script_name, &command.script, &command.compilation_ctx, &command.execution_ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::commands::ValidateScriptCommand;

    #[test]
    fn reports_invalid_for_an_empty_script() {
        let use_case = ValidateScriptUseCase::new();
        let report = use_case.execute(ValidateScriptCommand::new("empty.pipeline.toml", ""));
        assert!(!report.is_valid());
    }

    #[test]
    fn reports_valid_for_a_well_formed_script() {
        let use_case = ValidateScriptUseCase::new();
        let report = use_case.execute(ValidateScriptCommand::new("build.pipeline.toml", "[stage]\nname = \"build\"\n"));
        assert!(report.is_valid());
    }
}
