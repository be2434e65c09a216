// /////////////////////////////////////////////////////////////////////////////
// CI/CD Pipeline Execution Engine
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

/// Where a [`ClassResolver`] draws symbols from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PluginSource {
    Archive(PathBuf),
    Directory(PathBuf),
}

/// A symbol resolved from a plugin source: the fully-qualified name plus an
/// opaque handle infrastructure uses to instantiate it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedSymbol {
    pub qualified_name: String,
    pub source: PluginSource,
}

/// Isolated symbol lookup from a set of archive/directory sources. Every
/// resolution is checked against allow/block package lists and a
/// sensitive-resource list before the lookup itself.
pub trait ClassResolver: Send + Sync {
    /// Resolves `qualified_name`, consulting self-owned sources first for
    /// plugin-private symbols and falling back to parent (core platform)
    /// sources, unless the resolver was built with `self_first = false`.
    ///
    /// Returns [`crate::error::PipelineError::SecurityViolation`] if the name
    /// matches a blocked package, fails to match a non-empty allow-list, or
    /// names a sensitive resource.
    fn resolve(&self, qualified_name: &str) -> Result<ResolvedSymbol, PipelineError>;

    /// Clears the resolution cache, releases archive handles, and puts the
    /// resolver into a state where every subsequent `resolve` call fails
    /// deterministically.
    fn close(&self);

    fn is_closed(&self) -> bool;
}
