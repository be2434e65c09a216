// /////////////////////////////////////////////////////////////////////////////
// CI/CD Pipeline Execution Engine
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

use std::path::Path;

use async_trait::async_trait;

use crate::error::PipelineError;

/// File operations available to steps, rooted at a workspace directory.
/// Absolute paths are rejected by implementations unless the sandbox policy
/// grants them explicitly; all relative paths are resolved against the
/// workspace root.
#[async_trait]
pub trait Workspace: Send + Sync {
    async fn read(&self, path: &Path) -> Result<Vec<u8>, PipelineError>;
    async fn write(&self, path: &Path, contents: &[u8]) -> Result<(), PipelineError>;
    async fn append(&self, path: &Path, contents: &[u8]) -> Result<(), PipelineError>;
    async fn exists(&self, path: &Path) -> Result<bool, PipelineError>;
    async fn delete(&self, path: &Path) -> Result<(), PipelineError>;
    async fn mkdir(&self, path: &Path) -> Result<(), PipelineError>;
    async fn list(&self, path: &Path) -> Result<Vec<String>, PipelineError>;
    async fn find_files(&self, glob: &str) -> Result<Vec<String>, PipelineError>;
    async fn copy_to(&self, from: &Path, to: &Path) -> Result<(), PipelineError>;
    async fn move_to(&self, from: &Path, to: &Path) -> Result<(), PipelineError>;

    /// Archives `path` under a reserved workspace subdirectory keyed by
    /// `name`, so it can be recalled by [`Workspace::unstash`] later in the
    /// same run or a later one against the same workspace root.
    async fn stash(&self, name: &str, path: &Path) -> Result<(), PipelineError>;

    /// Extracts the stash named `name` into the current working directory.
    /// Fails with [`crate::error::PipelineError::StashNotFound`] if absent.
    async fn unstash(&self, name: &str) -> Result<(), PipelineError>;

    fn pwd(&self) -> &Path;

    async fn clean(&self) -> Result<(), PipelineError>;
}
