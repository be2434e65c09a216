// /////////////////////////////////////////////////////////////////////////////
// CI/CD Pipeline Execution Engine
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Security validation run before a plugin is registered (component J):
//! file-size cap, executable-content scan, and a metadata content check for
//! path traversal / suspicious keywords, on top of [`PluginMetadata::is_well_formed`].
//! This is best-effort, the same way the DSL validator's pattern checks are —
//! the sandbox's class resolver allow/block lists remain the authoritative
//! boundary once the plugin is loaded.

use std::path::Path;

use pipeline_domain::error::PipelineError;
use pipeline_domain::value_objects::PluginMetadata;
use walkdir::WalkDir;

/// Archive/directory entries larger than this are refused outright; a
/// legitimate plugin has no business shipping a multi-hundred-megabyte blob.
const MAX_ARTIFACT_BYTES: u64 = 256 * 1024 * 1024;

/// File extensions that are never acceptable inside a plugin directory.
const BLOCKED_EXECUTABLE_EXTENSIONS: &[&str] = &["exe", "dll", "bat", "cmd", "sh", "ps1"];

/// Substrings that flag an id/name/description as likely attacker-controlled
/// rather than a legitimate identifier.
const SUSPICIOUS_KEYWORDS: &[&str] = &["..", "\0", "$(", "`", "<script"];

/// Runs the full security-validation pipeline for the plugin rooted at
/// `directory` with the metadata already parsed from it. Returns the first
/// violation found; an `Ok(())` means the plugin may proceed to class
/// resolution.
pub fn validate(directory: &Path, metadata: &PluginMetadata) -> Result<(), PipelineError> {
    check_metadata_content(metadata)?;
    check_artifact_size(directory)?;
    check_executable_content(directory)?;
    Ok(())
}

fn check_metadata_content(metadata: &PluginMetadata) -> Result<(), PipelineError> {
    let fields = [&metadata.id, &metadata.name, &metadata.description, &metadata.main_class];
    for field in fields {
        if field.contains('/') || field.contains('\\') {
            return Err(PipelineError::SecurityViolation(format!("plugin metadata field '{field}' looks like a path-traversal attempt")));
        }
        for keyword in SUSPICIOUS_KEYWORDS {
            if field.contains(keyword) {
                return Err(PipelineError::SecurityViolation(format!("plugin metadata field '{field}' contains a suspicious keyword")));
            }
        }
    }
    Ok(())
}

fn check_artifact_size(directory: &Path) -> Result<(), PipelineError> {
    let total: u64 = WalkDir::new(directory)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| entry.metadata().ok())
        .map(|metadata| metadata.len())
        .sum();
    if total > MAX_ARTIFACT_BYTES {
        return Err(PipelineError::SecurityViolation(format!("plugin artifact at '{}' is {total} bytes, exceeding the {MAX_ARTIFACT_BYTES} byte cap", directory.display())));
    }
    Ok(())
}

fn check_executable_content(directory: &Path) -> Result<(), PipelineError> {
    for entry in WalkDir::new(directory).into_iter().filter_map(Result::ok) {
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(extension) = entry.path().extension().and_then(|ext| ext.to_str()) else {
            continue;
        };
        if BLOCKED_EXECUTABLE_EXTENSIONS.contains(&extension.to_ascii_lowercase().as_str()) {
            return Err(PipelineError::SecurityViolation(format!("plugin artifact contains a disallowed executable entry: {}", entry.path().display())));
        }
    }
    Ok(())
}
