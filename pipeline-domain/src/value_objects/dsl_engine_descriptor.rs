// /////////////////////////////////////////////////////////////////////////////
// CI/CD Pipeline Execution Engine
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

use serde::{Deserialize, Serialize};

/// Declarative capability flags a [`DslEngineDescriptor`] may advertise.
///
/// `HotReload` and `Persistence` are declarative only per the design notes:
/// no behavior in this crate is gated on them beyond being reported back to
/// callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DslCapability {
    CompilationCaching,
    SyntaxValidation,
    TypeChecking,
    CodeCompletion,
    Debugging,
    HotReload,
    IncrementalCompilation,
    ParallelExecution,
    Persistence,
    EventStreaming,
}

/// Static description of a registered DSL engine: identity, the file
/// extensions it claims, and the capabilities it advertises.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DslEngineDescriptor {
    pub engine_id: String,
    pub engine_name: String,
    pub engine_version: String,
    pub supported_extensions: Vec<String>,
    pub capabilities: Vec<DslCapability>,
}

impl DslEngineDescriptor {
    pub fn new(
        engine_id: impl Into<String>,
        engine_name: impl Into<String>,
        engine_version: impl Into<String>,
        supported_extensions: Vec<String>,
        capabilities: Vec<DslCapability>,
    ) -> Self {
        Self {
            engine_id: engine_id.into(),
            engine_name: engine_name.into(),
            engine_version: engine_version.into(),
            supported_extensions,
            capabilities,
        }
    }

    pub fn has_capability(&self, capability: DslCapability) -> bool {
        self.capabilities.contains(&capability)
    }

    /// Normalizes an extension the way the registry expects: lower-case with
    /// a single leading dot.
    pub fn normalize_extension(raw: &str) -> String {
        let trimmed = raw.trim().to_ascii_lowercase();
        if trimmed.starts_with('.') {
            trimmed
        } else {
            format!(".{trimmed}")
        }
    }
}
