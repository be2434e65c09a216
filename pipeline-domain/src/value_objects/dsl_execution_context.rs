// /////////////////////////////////////////////////////////////////////////////
// CI/CD Pipeline Execution Engine
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::dsl_execution_policy::DslExecutionPolicy;
use super::dsl_resource_limits::DslResourceLimits;

/// Inputs to a [`crate::repositories::DslEngine`]'s `execute` step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DslExecutionContext {
    pub variables: HashMap<String, String>,
    pub working_directory: String,
    pub environment_variables: HashMap<String, String>,
    #[serde(with = "duration_millis_opt")]
    pub timeout: Option<Duration>,
    pub resource_limits: Option<DslResourceLimits>,
    pub execution_policy: DslExecutionPolicy,
}

impl Default for DslExecutionContext {
    fn default() -> Self {
        Self {
            variables: HashMap::new(),
            working_directory: ".".to_string(),
            environment_variables: HashMap::new(),
            timeout: None,
            resource_limits: None,
            execution_policy: DslExecutionPolicy::default(),
        }
    }
}

mod duration_millis_opt {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error> {
        value.map(|d| d.as_millis() as u64).serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Duration>, D::Error> {
        Ok(Option::<u64>::deserialize(deserializer)?.map(Duration::from_millis))
    }
}
