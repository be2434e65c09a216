// /////////////////////////////////////////////////////////////////////////////
// CI/CD Pipeline Execution Engine
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

use serde::{Deserialize, Serialize};

use super::dsl_security_policy::DslSecurityPolicy;

/// Inputs to a [`crate::repositories::DslEngine`]'s `compile` step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DslCompilationContext {
    pub class_path: Vec<String>,
    pub imports: Vec<String>,
    pub allowed_packages: Vec<String>,
    pub blocked_packages: Vec<String>,
    pub enable_caching: bool,
    pub security_policy: DslSecurityPolicy,
}

impl Default for DslCompilationContext {
    fn default() -> Self {
        Self {
            class_path: Vec::new(),
            imports: Vec::new(),
            allowed_packages: Vec::new(),
            blocked_packages: Vec::new(),
            enable_caching: true,
            security_policy: DslSecurityPolicy::default(),
        }
    }
}

impl DslCompilationContext {
    /// Whether `package` is permitted: not blocked (prefix match), and, if an
    /// allow-list is present, matched by it (prefix match).
    pub fn permits_package(&self, package: &str) -> bool {
        if self.blocked_packages.iter().any(|blocked| package.starts_with(blocked.as_str())) {
            return false;
        }
        if self.allowed_packages.is_empty() {
            return true;
        }
        self.allowed_packages.iter().any(|allowed| package.starts_with(allowed.as_str()))
    }
}
