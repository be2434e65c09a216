// /////////////////////////////////////////////////////////////////////////////
// CI/CD Pipeline Execution Engine
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::repositories::ClassResolver;
use crate::value_objects::PluginMetadata;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PluginState {
    Unknown,
    Loaded,
    Unloaded,
    Error,
}

/// A validated plugin whose main class has been resolved and whose resolver
/// is live. Owned exclusively by the Plugin Manager; the resolver may be
/// shared with the sandbox but is only ever closed by the manager.
#[derive(Clone)]
pub struct LoadedPlugin {
    pub metadata: PluginMetadata,
    pub class_resolver: Arc<dyn ClassResolver>,
    pub state: PluginState,
}

impl LoadedPlugin {
    pub fn new(metadata: PluginMetadata, class_resolver: Arc<dyn ClassResolver>) -> Self {
        Self {
            metadata,
            class_resolver,
            state: PluginState::Loaded,
        }
    }

    pub fn mark_unloaded(&mut self) {
        self.class_resolver.close();
        self.state = PluginState::Unloaded;
    }

    pub fn mark_error(&mut self) {
        self.state = PluginState::Error;
    }
}
