// /////////////////////////////////////////////////////////////////////////////
// CI/CD Pipeline Execution Engine
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

use serde::{Deserialize, Serialize};

/// The declarative set of permitted effects governing sandboxed script
/// execution: network, filesystem, reflection and native code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DslSecurityPolicy {
    pub allow_network_access: bool,
    pub allow_file_system_access: bool,
    pub allowed_directories: Vec<String>,
    pub allow_reflection: bool,
    pub allow_native_code: bool,
    pub sandbox_enabled: bool,
}

impl DslSecurityPolicy {
    /// A balanced policy: filesystem access within the workspace, no
    /// network, no reflection, no native code.
    pub fn default_policy() -> Self {
        Self {
            allow_network_access: false,
            allow_file_system_access: true,
            allowed_directories: Vec::new(),
            allow_reflection: false,
            allow_native_code: false,
            sandbox_enabled: true,
        }
    }

    /// Denies everything not explicitly listed.
    pub fn restricted() -> Self {
        Self {
            allow_network_access: false,
            allow_file_system_access: false,
            allowed_directories: Vec::new(),
            allow_reflection: false,
            allow_native_code: false,
            sandbox_enabled: true,
        }
    }

    /// Permits network, filesystem and reflection; still denies native code
    /// and still runs inside the sandbox. Intended for trusted internal
    /// scripts only.
    pub fn permissive() -> Self {
        Self {
            allow_network_access: true,
            allow_file_system_access: true,
            allowed_directories: Vec::new(),
            allow_reflection: true,
            allow_native_code: false,
            sandbox_enabled: true,
        }
    }
}

impl Default for DslSecurityPolicy {
    fn default() -> Self {
        Self::default_policy()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn restricted_denies_everything() {
        let policy = DslSecurityPolicy::restricted();
        assert!(!policy.allow_network_access);
        assert!(!policy.allow_file_system_access);
        assert!(!policy.allow_reflection);
        assert!(!policy.allow_native_code);
    }

    #[test]
    fn permissive_still_denies_native_code() {
        let policy = DslSecurityPolicy::permissive();
        assert!(policy.allow_network_access);
        assert!(!policy.allow_native_code);
        assert!(policy.sandbox_enabled);
    }
}
