// /////////////////////////////////////////////////////////////////////////////
// CI/CD Pipeline Execution Engine
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

use serde::{Deserialize, Serialize};

/// Resource ceilings enforced by the sandbox. Every field is optional; an
/// absent field means "unbounded" for that resource.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DslResourceLimits {
    pub max_memory_mb: Option<u64>,
    pub max_cpu_time_ms: Option<u64>,
    pub max_wall_time_ms: Option<u64>,
    pub max_threads: Option<u32>,
    pub max_file_handles: Option<u32>,
}

impl DslResourceLimits {
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// The sanity floor the Validator's resource-limit layer checks against:
    /// memory above 64 MB, CPU time at most 5 minutes, at least one thread.
    pub fn is_sane(&self) -> bool {
        let memory_ok = self.max_memory_mb.is_none_or(|m| m > 64);
        let cpu_ok = self.max_cpu_time_ms.is_none_or(|c| c <= 5 * 60 * 1000);
        let threads_ok = self.max_threads.is_none_or(|t| t >= 1);
        memory_ok && cpu_ok && threads_ok
    }
}
