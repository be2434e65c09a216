// /////////////////////////////////////////////////////////////////////////////
// CI/CD Pipeline Execution Engine
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Discover/validate/load/unload/reload lifecycle for plugins laid out as
//! a directory carrying `plugin.properties` (component J). Mutations are
//! serialized through a single mutex; reads of the loaded-plugin table go
//! through a lock-free `ArcSwap` snapshot, mirroring the distributor's
//! copy-on-write consumer list.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arc_swap::ArcSwap;
use parking_lot::Mutex;
use pipeline_domain::entities::{LoadedPlugin, PluginState};
use pipeline_domain::error::PipelineError;
use pipeline_domain::repositories::{ClassResolver, PluginSource};
use pipeline_domain::value_objects::PluginMetadata;

use super::properties;
use super::resolver::FileSystemClassResolver;
use super::security;

const PROPERTIES_FILE_NAME: &str = "plugin.properties";

/// A loaded plugin plus the directory it was loaded from, so `reload` can
/// repeat the load without the caller re-supplying the path.
#[derive(Clone)]
struct PluginRecord {
    source_path: PathBuf,
    plugin: LoadedPlugin,
}

/// Registry of currently loaded plugins, keyed by [`PluginMetadata::id`].
pub struct PluginManager {
    parent_resolver: Option<Arc<dyn ClassResolver>>,
    self_first: bool,
    records: ArcSwap<HashMap<String, Arc<PluginRecord>>>,
    mutation_lock: Mutex<()>,
}

impl PluginManager {
    pub fn new(parent_resolver: Option<Arc<dyn ClassResolver>>, self_first: bool) -> Self {
        Self {
            parent_resolver,
            self_first,
            records: ArcSwap::from_pointee(HashMap::new()),
            mutation_lock: Mutex::new(()),
        }
    }

    /// Loads the plugin rooted at `directory`: reads `plugin.properties`,
    /// validates it is well-formed and not already loaded under the same
    /// id, runs the security-validation pipeline (file-size cap,
    /// executable-content scan, metadata content check), builds an
    /// isolated [`FileSystemClassResolver`], and confirms `main_class`
    /// resolves before registering the plugin as loaded.
    pub fn load(&self, directory: &Path) -> Result<PluginMetadata, PipelineError> {
        let _guard = self.mutation_lock.lock();

        let metadata = read_metadata(directory)?;
        if !metadata.is_well_formed() {
            return Err(PipelineError::PluginError(format!("plugin at '{}' has malformed metadata", directory.display())));
        }
        if self.records.load().contains_key(&metadata.id) {
            return Err(PipelineError::PluginError(format!("plugin '{}' is already loaded", metadata.id)));
        }
        security::validate(directory, &metadata)?;

        let resolver = FileSystemClassResolver::new(
            vec![PluginSource::Directory(directory.to_path_buf())],
            self.parent_resolver.clone(),
            self.self_first,
            metadata.allowed_packages.clone(),
            metadata.blocked_packages.clone(),
        );
        resolver.resolve(&metadata.main_class).map_err(|err| PipelineError::PluginError(format!("plugin '{}' main class '{}' did not resolve: {err}", metadata.id, metadata.main_class)))?;

        let plugin = LoadedPlugin::new(metadata.clone(), resolver);
        let record = Arc::new(PluginRecord {
            source_path: directory.to_path_buf(),
            plugin,
        });

        let id = metadata.id.clone();
        self.records.rcu(move |current| {
            let mut next = (**current).clone();
            next.insert(id.clone(), record.clone());
            next
        });

        tracing::info!(plugin_id = %metadata.id, version = %metadata.version, "plugin loaded");
        Ok(metadata)
    }

    /// Closes the plugin's resolver and removes it from the registry. Idempotent: unloading an id that is not present is not an error.
    pub fn unload(&self, id: &str) -> Result<(), PipelineError> {
        let _guard = self.mutation_lock.lock();

        let removed = {
            let mut taken = None;
            self.records.rcu(|current| {
                let mut next = (**current).clone();
                taken = next.remove(id);
                next
            });
            taken
        };

        if let Some(record) = removed {
            record.plugin.class_resolver.close();
            tracing::info!(plugin_id = %id, "plugin unloaded");
        }
        Ok(())
    }

    /// Unloads and reloads a plugin from its original source directory.
    pub fn reload(&self, id: &str) -> Result<PluginMetadata, PipelineError> {
        let source_path = self.records.load().get(id).map(|record| record.source_path.clone()).ok_or_else(|| PipelineError::PluginError(format!("plugin '{id}' is not loaded")))?;
        self.unload(id)?;
        self.load(&source_path)
    }

    pub fn get(&self, id: &str) -> Option<LoadedPlugin> {
        self.records.load().get(id).map(|record| record.plugin.clone())
    }

    pub fn list(&self) -> Vec<PluginMetadata> {
        self.records.load().values().map(|record| record.plugin.metadata.clone()).collect()
    }

    pub fn is_loaded(&self, id: &str) -> bool {
        self.records.load().get(id).is_some_and(|record| record.plugin.state == PluginState::Loaded)
    }

    pub fn count(&self) -> usize {
        self.records.load().len()
    }
}

fn read_metadata(directory: &Path) -> Result<PluginMetadata, PipelineError> {
    let properties_path = directory.join(PROPERTIES_FILE_NAME);
    let contents = std::fs::read_to_string(&properties_path).map_err(|err| PipelineError::PluginError(format!("cannot read '{}': {err}", properties_path.display())))?;
    let entries = properties::parse(&contents);

    let required = |key: &str| entries.get(key).cloned().unwrap_or_default();

    let main_class = entries.get("plugin.main-class").cloned().ok_or_else(|| PipelineError::PluginError(format!("'{}' is missing required key 'plugin.main-class'", properties_path.display())))?;

    Ok(PluginMetadata {
        id: required("plugin.id"),
        version: required("plugin.version"),
        name: required("plugin.name"),
        description: required("plugin.description"),
        author: required("plugin.author"),
        main_class,
        allowed_packages: properties::split_list(entries.get("plugin.allowed-packages")),
        blocked_packages: properties::split_list(entries.get("plugin.blocked-packages")),
    })
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::*;

    fn write_plugin(dir: &Path, id: &str, main_class: &str) {
        fs::write(
            dir.join(PROPERTIES_FILE_NAME),
            format!("plugin.id={id}\nplugin.version=1.0.0\nplugin.name=Sample\nplugin.description=d\nplugin.author=a\nplugin.main-class={main_class}\n"),
        )
        .unwrap();
        let class_path = dir.join(main_class.replace('.', "/"));
        fs::create_dir_all(class_path.parent().unwrap()).unwrap();
        fs::write(format!("{}.class", class_path.display()), b"").unwrap();
    }

    #[test]
    fn loads_well_formed_plugin_and_lists_it() {
        let dir = tempdir().unwrap();
        write_plugin(dir.path(), "acme.sample", "acme.sample.Plugin");
        let manager = PluginManager::new(None, true);
        let metadata = manager.load(dir.path()).unwrap();
        assert_eq!(metadata.id, "acme.sample");
        assert_eq!(manager.count(), 1);
        assert!(manager.is_loaded("acme.sample"));
    }

    #[test]
    fn loading_same_id_twice_is_rejected() {
        let dir = tempdir().unwrap();
        write_plugin(dir.path(), "acme.sample", "acme.sample.Plugin");
        let manager = PluginManager::new(None, true);
        manager.load(dir.path()).unwrap();
        assert!(manager.load(dir.path()).is_err());
    }

    #[test]
    fn missing_main_class_file_fails_to_load() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(PROPERTIES_FILE_NAME), "plugin.id=acme.sample\nplugin.version=1.0.0\nplugin.main-class=acme.sample.Plugin\n").unwrap();
        let manager = PluginManager::new(None, true);
        assert!(manager.load(dir.path()).is_err());
    }

    #[test]
    fn unload_then_reload_round_trips() {
        let dir = tempdir().unwrap();
        write_plugin(dir.path(), "acme.sample", "acme.sample.Plugin");
        let manager = PluginManager::new(None, true);
        manager.load(dir.path()).unwrap();
        manager.unload("acme.sample").unwrap();
        assert_eq!(manager.count(), 0);

        write_plugin(dir.path(), "acme.sample", "acme.sample.Plugin");
        manager.load(dir.path()).unwrap();
        assert!(manager.reload("acme.sample").is_ok());
        assert_eq!(manager.count(), 1);
    }

    #[test]
    fn unloading_unknown_id_is_not_an_error() {
        let manager = PluginManager::new(None, true);
        assert!(manager.unload("nobody.home").is_ok());
    }

    #[test]
    fn embedded_executable_fails_security_validation_before_registration() {
        let dir = tempdir().unwrap();
        write_plugin(dir.path(), "acme.sample", "acme.sample.Plugin");
        fs::write(dir.path().join("payload.exe"), b"MZ").unwrap();
        let manager = PluginManager::new(None, true);
        assert!(manager.load(dir.path()).is_err());
        assert_eq!(manager.count(), 0);
    }
}
