// /////////////////////////////////////////////////////////////////////////////
// CI/CD Pipeline Execution Engine
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Extension→engine dispatch, capability queries, thread-safe registration.
//! Reads (lookups) and writes (register/unregister) are both served through
//! a single `parking_lot::RwLock`, matching the donor's concurrency
//! primitive of choice; concurrent registrations are serialized against each
//! other but never against a lookup in flight for longer than the map
//! mutation itself takes.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use pipeline_domain::error::PipelineError;
use pipeline_domain::repositories::DslEngine;
use pipeline_domain::value_objects::{DslCapability, DslEngineDescriptor};

#[derive(Default)]
struct RegistryState {
    engines: HashMap<String, Arc<dyn DslEngine>>,
    extensions: HashMap<String, String>,
    capabilities: HashMap<DslCapability, Vec<String>>,
}

pub struct DslEngineRegistry {
    state: RwLock<RegistryState>,
}

impl DslEngineRegistry {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            state: RwLock::new(RegistryState::default()),
        })
    }

    pub fn register(&self, engine: Arc<dyn DslEngine>) -> Result<(), PipelineError> {
        let descriptor = engine.descriptor();
        if descriptor.engine_id.trim().is_empty() {
            return Err(PipelineError::ValidationError("engine_id must not be blank".into()));
        }
        if descriptor.supported_extensions.is_empty() {
            return Err(PipelineError::ValidationError(format!("engine '{}' declares no supported extensions", descriptor.engine_id)));
        }
        for ext in &descriptor.supported_extensions {
            if ext.trim().is_empty() || ext.trim() == "." {
                return Err(PipelineError::ValidationError(format!("engine '{}' declares a malformed extension '{ext}'", descriptor.engine_id)));
            }
        }

        let mut state = self.state.write();
        if state.engines.contains_key(&descriptor.engine_id) {
            tracing::warn!(engine_id = %descriptor.engine_id, "replacing already-registered DSL engine");
            Self::purge_locked(&mut state, &descriptor.engine_id);
        }

        for ext in &descriptor.supported_extensions {
            let normalized = DslEngineDescriptor::normalize_extension(ext);
            state.extensions.insert(normalized, descriptor.engine_id.clone());
        }
        for capability in &descriptor.capabilities {
            state.capabilities.entry(*capability).or_default().push(descriptor.engine_id.clone());
        }
        state.engines.insert(descriptor.engine_id.clone(), engine.clone());
        Ok(())
    }

    pub fn unregister(&self, engine_id: &str) -> bool {
        let mut state = self.state.write();
        if !state.engines.contains_key(engine_id) {
            return false;
        }
        Self::purge_locked(&mut state, engine_id);
        true
    }

    fn purge_locked(state: &mut RegistryState, engine_id: &str) {
        state.engines.remove(engine_id);
        state.extensions.retain(|_, id| id != engine_id);
        for ids in state.capabilities.values_mut() {
            ids.retain(|id| id != engine_id);
        }
        state.capabilities.retain(|_, ids| !ids.is_empty());
    }

    pub fn get_engine_for_extension(&self, extension: &str) -> Option<Arc<dyn DslEngine>> {
        let normalized = DslEngineDescriptor::normalize_extension(extension);
        let state = self.state.read();
        let engine_id = state.extensions.get(&normalized)?;
        state.engines.get(engine_id).cloned()
    }

    pub fn get_engines_with_capability(&self, capability: DslCapability) -> Vec<Arc<dyn DslEngine>> {
        let state = self.state.read();
        state
            .capabilities
            .get(&capability)
            .map(|ids| ids.iter().filter_map(|id| state.engines.get(id).cloned()).collect())
            .unwrap_or_default()
    }

    pub fn engine_count(&self) -> usize {
        self.state.read().engines.len()
    }
}

impl Default for DslEngineRegistry {
    fn default() -> Self {
        Self {
            state: RwLock::new(RegistryState::default()),
        }
    }
}
