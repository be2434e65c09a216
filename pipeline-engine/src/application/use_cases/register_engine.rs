// /////////////////////////////////////////////////////////////////////////////
// CI/CD Pipeline Execution Engine
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Register Engine Use Case
//!
//! Registers a [`pipeline_domain::repositories::DslEngine`] under the
//! extensions and capabilities its descriptor declares, so the registry (F)
//! dispatches scripts of that extension to it.

use std::sync::Arc;

use pipeline_domain::error::PipelineError;

use crate::application::commands::RegisterEngineCommand;
use crate::infrastructure::dsl::DslEngineRegistry;

pub struct RegisterEngineUseCase {
    registry: Arc<DslEngineRegistry>,
}

impl RegisterEngineUseCase {
    pub fn new(registry: Arc<DslEngineRegistry>) -> Self {
        Self { registry }
    }

    pub fn execute(&self, command: RegisterEngineCommand) -> Result<(), PipelineError> {
        self.registry.register(command.engine)
    }
}

#[cfg(test)]
mod tests {
    use pipeline_domain::repositories::{DslCompilationResult, DslEngine, DslExecutionResult};
    use pipeline_domain::value_objects::{DslCapability, DslCompilationContext, DslEngineDescriptor, DslExecutionContext};

    use super::*;

    struct StubEngine(DslEngineDescriptor);

    #[async_trait::async_trait]
    impl DslEngine for StubEngine {
        fn descriptor(&self) -> &DslEngineDescriptor {
            &self.0
        }

        async fn compile(&self, _script: &str, _ctx: &DslCompilationContext) -> Result<DslCompilationResult, PipelineError> {
            Ok(DslCompilationResult::Success { artifact_id: "stub".into() })
        }

        async fn execute(&self, _artifact_id: &str, _ctx: &DslExecutionContext) -> Result<DslExecutionResult, PipelineError> {
            Ok(DslExecutionResult::Success { output: String::new() })
        }
    }

    #[test]
    fn registers_engine_and_makes_it_queryable() {
        let registry = DslEngineRegistry::new();
        let use_case = RegisterEngineUseCase::new(registry.clone());

        let engine = Arc::new(StubEngine(DslEngineDescriptor::new(
            "stub",
            "Stub Engine",
            "1.0.0",
            vec![".stub".to_string()],
            vec![DslCapability::SyntaxValidation],
        )));

        use_case.execute(RegisterEngineCommand::new(engine)).unwrap();
        assert_eq!(registry.engine_count(), 1);
        assert!(registry.get_engine_for_extension(".stub").is_some());
    }
}
