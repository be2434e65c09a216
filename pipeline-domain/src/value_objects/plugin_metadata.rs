// /////////////////////////////////////////////////////////////////////////////
// CI/CD Pipeline Execution Engine
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

use serde::{Deserialize, Serialize};

/// Metadata parsed from a plugin archive's `plugin.properties` file (or
/// archive-manifest attributes). `id`, `version` and `main_class` are
/// required at the format level; the rest are advisory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginMetadata {
    pub id: String,
    pub version: String,
    pub name: String,
    pub description: String,
    pub author: String,
    pub main_class: String,
    pub allowed_packages: Vec<String>,
    pub blocked_packages: Vec<String>,
}

impl PluginMetadata {
    /// Structural validity: the three required fields are non-blank and the
    /// version looks like a dotted version string.
    pub fn is_well_formed(&self) -> bool {
        !self.id.trim().is_empty()
            && !self.version.trim().is_empty()
            && !self.main_class.trim().is_empty()
            && Self::looks_like_version(&self.version)
    }

    fn looks_like_version(version: &str) -> bool {
        !version.is_empty() && version.chars().all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '+')
    }
}
