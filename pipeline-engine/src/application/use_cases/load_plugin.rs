// /////////////////////////////////////////////////////////////////////////////
// CI/CD Pipeline Execution Engine
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Load Plugin Use Case
//!
//! Loads the plugin rooted at a directory carrying a `plugin.properties`
//! manifest, validating its main class resolves before the plugin is
//! registered as loaded (component J).

use std::sync::Arc;

use pipeline_domain::error::PipelineError;
use pipeline_domain::value_objects::PluginMetadata;

use crate::application::commands::LoadPluginCommand;
use crate::infrastructure::plugins::PluginManager;

pub struct LoadPluginUseCase {
    manager: Arc<PluginManager>,
}

impl LoadPluginUseCase {
    pub fn new(manager: Arc<PluginManager>) -> Self {
        Self { manager }
    }

    pub fn execute(&self, command: LoadPluginCommand) -> Result<PluginMetadata, PipelineError> {
        self.manager.load(&command.directory)
    }
}
