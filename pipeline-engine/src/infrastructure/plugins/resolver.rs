// /////////////////////////////////////////////////////////////////////////////
// CI/CD Pipeline Execution Engine
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Isolated symbol lookup from archive/directory sources (component I).
//! Security predicates (blocked/allowed package prefixes, sensitive
//! resources) are checked before any lookup; resolutions are cached by
//! name; `close` makes every subsequent resolution fail deterministically.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use pipeline_domain::error::PipelineError;
use pipeline_domain::repositories::{ClassResolver, PluginSource, ResolvedSymbol};

/// Resource paths that are refused regardless of allow-lists: credentials,
/// keystores, and service descriptors. Matched as a case-insensitive
/// substring of the requested name, the way the spec's "fixed
/// sensitive-resource list" is described.
const SENSITIVE_RESOURCE_MARKERS: &[&str] = &[
    "credentials",
    "keystore",
    ".pem",
    ".key",
    "service-account",
    "secrets",
    "id_rsa",
];

fn is_sensitive_resource(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    SENSITIVE_RESOURCE_MARKERS.iter().any(|marker| lower.contains(marker))
}

fn symbol_relative_path(qualified_name: &str) -> PathBuf {
    PathBuf::from(qualified_name.replace('.', "/"))
}

/// Whether `root` contains an entry resolving `qualified_name`: a file at
/// the package-derived relative path, under any of a few plausible
/// extensions a compiled or scripted plugin artifact might use.
fn directory_contains_symbol(root: &Path, qualified_name: &str) -> bool {
    let relative = symbol_relative_path(qualified_name);
    const CANDIDATE_EXTENSIONS: &[&str] = &["", ".so", ".dylib", ".dll", ".class", ".rs"];
    CANDIDATE_EXTENSIONS.iter().any(|ext| root.join(format!("{}{ext}", relative.display())).is_file())
}

/// Whether the tar archive at `archive_path` contains an entry matching
/// `qualified_name`'s package-derived relative path. Reads the archive
/// listing only; entries are never extracted by the resolver.
fn archive_contains_symbol(archive_path: &Path, qualified_name: &str) -> bool {
    let Ok(file) = std::fs::File::open(archive_path) else {
        return false;
    };
    let relative = symbol_relative_path(qualified_name);
    let relative_str = relative.to_string_lossy().to_string();
    let mut archive = tar::Archive::new(file);
    let Ok(entries) = archive.entries() else {
        return false;
    };
    for entry in entries.flatten() {
        if let Ok(path) = entry.path() {
            let name = path.to_string_lossy();
            if name.trim_end_matches(".class").trim_end_matches(".rs") == relative_str {
                return true;
            }
        }
    }
    false
}

fn source_contains_symbol(source: &PluginSource, qualified_name: &str) -> bool {
    match source {
        PluginSource::Directory(root) => directory_contains_symbol(root, qualified_name),
        PluginSource::Archive(path) => archive_contains_symbol(path, qualified_name),
    }
}

/// A resolver backed by a plugin's own archive/directory sources and,
/// optionally, a parent (core-platform) resolver consulted per the
/// `self_first` policy.
pub struct FileSystemClassResolver {
    own_sources: Vec<PluginSource>,
    parent: Option<Arc<dyn ClassResolver>>,
    self_first: bool,
    allowed_packages: Vec<String>,
    blocked_packages: Vec<String>,
    cache: RwLock<HashMap<String, ResolvedSymbol>>,
    closed: AtomicBool,
}

impl FileSystemClassResolver {
    pub fn new(own_sources: Vec<PluginSource>, parent: Option<Arc<dyn ClassResolver>>, self_first: bool, allowed_packages: Vec<String>, blocked_packages: Vec<String>) -> Arc<Self> {
        Arc::new(Self {
            own_sources,
            parent,
            self_first,
            allowed_packages,
            blocked_packages,
            cache: RwLock::new(HashMap::new()),
            closed: AtomicBool::new(false),
        })
    }

    fn check_security(&self, qualified_name: &str) -> Result<(), PipelineError> {
        if self.blocked_packages.iter().any(|blocked| qualified_name.starts_with(blocked.as_str())) {
            return Err(PipelineError::SecurityViolation(format!("'{qualified_name}' matches a blocked package")));
        }
        if !self.allowed_packages.is_empty() && !self.allowed_packages.iter().any(|allowed| qualified_name.starts_with(allowed.as_str())) {
            return Err(PipelineError::SecurityViolation(format!("'{qualified_name}' is not covered by the allowed-package list")));
        }
        if is_sensitive_resource(qualified_name) {
            return Err(PipelineError::SecurityViolation(format!("'{qualified_name}' names a sensitive resource")));
        }
        Ok(())
    }

    fn resolve_own(&self, qualified_name: &str) -> Option<ResolvedSymbol> {
        self.own_sources.iter().find(|source| source_contains_symbol(source, qualified_name)).map(|source| ResolvedSymbol {
            qualified_name: qualified_name.to_string(),
            source: source.clone(),
        })
    }
}

impl ClassResolver for FileSystemClassResolver {
    fn resolve(&self, qualified_name: &str) -> Result<ResolvedSymbol, PipelineError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(PipelineError::InternalError(format!("class resolver is closed, cannot resolve '{qualified_name}'")));
        }
        self.check_security(qualified_name)?;

        if let Some(cached) = self.cache.read().get(qualified_name).cloned() {
            return Ok(cached);
        }

        let resolved = if self.self_first {
            self.resolve_own(qualified_name).or_else(|| self.parent.as_ref().and_then(|p| p.resolve(qualified_name).ok()))
        } else {
            self.parent.as_ref().and_then(|p| p.resolve(qualified_name).ok()).or_else(|| self.resolve_own(qualified_name))
        };

        match resolved {
            Some(symbol) => {
                self.cache.write().insert(qualified_name.to_string(), symbol.clone());
                Ok(symbol)
            }
            None => Err(PipelineError::DslEngineError(format!("no source resolves symbol '{qualified_name}'"))),
        }
    }

    fn close(&self) {
        self.closed.store(true, Ordering::Release);
        self.cache.write().clear();
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::*;

    fn touch(dir: &Path, relative: &str) {
        let path = dir.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"").unwrap();
    }

    #[test]
    fn resolves_symbol_present_in_directory_source() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "acme/build_cache/Plugin.class");
        let resolver = FileSystemClassResolver::new(vec![PluginSource::Directory(dir.path().to_path_buf())], None, true, vec![], vec![]);
        let resolved = resolver.resolve("acme.build_cache.Plugin").unwrap();
        assert_eq!(resolved.qualified_name, "acme.build_cache.Plugin");
    }

    #[test]
    fn blocked_package_prefix_is_refused() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "java/lang/reflect/Method.class");
        let resolver = FileSystemClassResolver::new(vec![PluginSource::Directory(dir.path().to_path_buf())], None, true, vec![], vec!["java.lang.reflect".into()]);
        let err = resolver.resolve("java.lang.reflect.Method").unwrap_err();
        assert!(err.is_security_error());
    }

    #[test]
    fn allowed_package_list_excludes_everything_else() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "other/Thing.class");
        let resolver = FileSystemClassResolver::new(vec![PluginSource::Directory(dir.path().to_path_buf())], None, true, vec!["com.acme".into()], vec![]);
        let err = resolver.resolve("other.Thing").unwrap_err();
        assert!(err.is_security_error());
    }

    #[test]
    fn sensitive_resource_names_are_refused_even_if_present() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "acme/credentials/Store.class");
        let resolver = FileSystemClassResolver::new(vec![PluginSource::Directory(dir.path().to_path_buf())], None, true, vec![], vec![]);
        let err = resolver.resolve("acme.credentials.Store").unwrap_err();
        assert!(err.is_security_error());
    }

    #[test]
    fn unresolvable_symbol_is_a_dsl_engine_error() {
        let dir = tempdir().unwrap();
        let resolver = FileSystemClassResolver::new(vec![PluginSource::Directory(dir.path().to_path_buf())], None, true, vec![], vec![]);
        assert!(resolver.resolve("nowhere.Thing").is_err());
    }

    #[test]
    fn close_makes_subsequent_resolutions_fail_deterministically() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "acme/Plugin.class");
        let resolver = FileSystemClassResolver::new(vec![PluginSource::Directory(dir.path().to_path_buf())], None, true, vec![], vec![]);
        resolver.resolve("acme.Plugin").unwrap();
        resolver.close();
        assert!(resolver.is_closed());
        assert!(resolver.resolve("acme.Plugin").is_err());
    }

    #[test]
    fn self_first_prefers_own_source_over_parent() {
        let own_dir = tempdir().unwrap();
        touch(own_dir.path(), "acme/Plugin.class");
        let parent_dir = tempdir().unwrap();
        touch(parent_dir.path(), "acme/Plugin.class");
        let parent = FileSystemClassResolver::new(vec![PluginSource::Directory(parent_dir.path().to_path_buf())], None, true, vec![], vec![]);
        let child = FileSystemClassResolver::new(vec![PluginSource::Directory(own_dir.path().to_path_buf())], Some(parent), true, vec![], vec![]);
        let resolved = child.resolve("acme.Plugin").unwrap();
        assert_eq!(resolved.source, PluginSource::Directory(own_dir.path().to_path_buf()));
    }
}
