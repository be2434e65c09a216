// /////////////////////////////////////////////////////////////////////////////
// CI/CD Pipeline Execution Engine
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! A [`Workspace`] rooted at a directory on the local filesystem. Relative
//! paths are resolved against the root; absolute paths are rejected
//! outright here (the sandbox's file-access gate is the mechanism that may
//! grant an exception, not this implementation).

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use pipeline_domain::error::PipelineError;
use pipeline_domain::repositories::Workspace;

const STASH_SUBDIRECTORY: &str = ".stash";

pub struct LocalWorkspace {
    root: PathBuf,
}

impl LocalWorkspace {
    pub async fn new(root: impl Into<PathBuf>) -> Result<Self, PipelineError> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    fn resolve(&self, path: &Path) -> Result<PathBuf, PipelineError> {
        if path.is_absolute() {
            return Err(PipelineError::SecurityViolation(format!("absolute path '{}' is not permitted in the workspace", path.display())));
        }
        Ok(self.root.join(path))
    }

    fn stash_archive_path(&self, name: &str) -> PathBuf {
        self.root.join(STASH_SUBDIRECTORY).join(format!("{name}.tar.gz"))
    }
}

#[async_trait]
impl Workspace for LocalWorkspace {
    async fn read(&self, path: &Path) -> Result<Vec<u8>, PipelineError> {
        let resolved = self.resolve(path)?;
        Ok(tokio::fs::read(resolved).await?)
    }

    async fn write(&self, path: &Path, contents: &[u8]) -> Result<(), PipelineError> {
        let resolved = self.resolve(path)?;
        if let Some(parent) = resolved.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        Ok(tokio::fs::write(resolved, contents).await?)
    }

    async fn append(&self, path: &Path, contents: &[u8]) -> Result<(), PipelineError> {
        use tokio::io::AsyncWriteExt;

        let resolved = self.resolve(path)?;
        if let Some(parent) = resolved.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let mut file = tokio::fs::OpenOptions::new().create(true).append(true).open(resolved).await?;
        file.write_all(contents).await?;
        Ok(())
    }

    async fn exists(&self, path: &Path) -> Result<bool, PipelineError> {
        let resolved = self.resolve(path)?;
        Ok(tokio::fs::try_exists(resolved).await?)
    }

    async fn delete(&self, path: &Path) -> Result<(), PipelineError> {
        let resolved = self.resolve(path)?;
        let metadata = tokio::fs::metadata(&resolved).await?;
        if metadata.is_dir() {
            tokio::fs::remove_dir_all(resolved).await?;
        } else {
            tokio::fs::remove_file(resolved).await?;
        }
        Ok(())
    }

    async fn mkdir(&self, path: &Path) -> Result<(), PipelineError> {
        let resolved = self.resolve(path)?;
        Ok(tokio::fs::create_dir_all(resolved).await?)
    }

    async fn list(&self, path: &Path) -> Result<Vec<String>, PipelineError> {
        let resolved = self.resolve(path)?;
        let mut entries = tokio::fs::read_dir(resolved).await?;
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        names.sort();
        Ok(names)
    }

    /// Walks the workspace root and returns every relative path matching
    /// `glob`, a simple `*`/`**`/`?` pattern (no brace expansion).
    async fn find_files(&self, glob: &str) -> Result<Vec<String>, PipelineError> {
        let root = self.root.clone();
        let glob = glob.to_string();
        tokio::task::spawn_blocking(move || {
            let mut matches = Vec::new();
            for entry in walkdir::WalkDir::new(&root).into_iter().filter_map(Result::ok) {
                if !entry.file_type().is_file() {
                    continue;
                }
                let relative = entry.path().strip_prefix(&root).unwrap_or(entry.path());
                let relative_str = relative.to_string_lossy().replace('\\', "/");
                if glob_match(&glob, &relative_str) {
                    matches.push(relative_str);
                }
            }
            matches.sort();
            matches
        })
        .await
        .map_err(|err| PipelineError::InternalError(format!("find_files task panicked: {err}")))
    }

    async fn copy_to(&self, from: &Path, to: &Path) -> Result<(), PipelineError> {
        let from = self.resolve(from)?;
        let to = self.resolve(to)?;
        if let Some(parent) = to.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::copy(from, to).await?;
        Ok(())
    }

    async fn move_to(&self, from: &Path, to: &Path) -> Result<(), PipelineError> {
        let from = self.resolve(from)?;
        let to = self.resolve(to)?;
        if let Some(parent) = to.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::rename(from, to).await?;
        Ok(())
    }

    async fn stash(&self, name: &str, path: &Path) -> Result<(), PipelineError> {
        let source = self.resolve(path)?;
        let archive_path = self.stash_archive_path(name);
        let name = name.to_string();
        tokio::task::spawn_blocking(move || -> Result<(), PipelineError> {
            if let Some(parent) = archive_path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let file = std::fs::File::create(&archive_path)?;
            let encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
            let mut builder = tar::Builder::new(encoder);
            if source.is_dir() {
                builder.append_dir_all(".", &source)?;
            } else {
                let mut file = std::fs::File::open(&source)?;
                let file_name = source.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_else(|| name.clone());
                builder.append_file(file_name, &mut file)?;
            }
            builder.into_inner()?.finish()?;
            Ok(())
        })
        .await
        .map_err(|err| PipelineError::InternalError(format!("stash task panicked: {err}")))?
    }

    async fn unstash(&self, name: &str) -> Result<(), PipelineError> {
        let archive_path = self.stash_archive_path(name);
        let destination = self.root.clone();
        let name = name.to_string();
        tokio::task::spawn_blocking(move || -> Result<(), PipelineError> {
            if !archive_path.is_file() {
                return Err(PipelineError::StashNotFound(name));
            }
            let file = std::fs::File::open(&archive_path)?;
            let decoder = flate2::read::GzDecoder::new(file);
            let mut archive = tar::Archive::new(decoder);
            archive.unpack(&destination)?;
            Ok(())
        })
        .await
        .map_err(|err| PipelineError::InternalError(format!("unstash task panicked: {err}")))?
    }

    fn pwd(&self) -> &Path {
        &self.root
    }

    async fn clean(&self) -> Result<(), PipelineError> {
        let mut entries = tokio::fs::read_dir(&self.root).await?;
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_name() == STASH_SUBDIRECTORY {
                continue;
            }
            let metadata = entry.metadata().await?;
            if metadata.is_dir() {
                tokio::fs::remove_dir_all(entry.path()).await?;
            } else {
                tokio::fs::remove_file(entry.path()).await?;
            }
        }
        Ok(())
    }
}

/// Minimal glob matcher: `*` matches any run of characters except `/`,
/// `**` matches across path separators, `?` matches exactly one character.
fn glob_match(pattern: &str, candidate: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let candidate: Vec<char> = candidate.chars().collect();
    matches_from(&pattern, &candidate)
}

fn matches_from(pattern: &[char], candidate: &[char]) -> bool {
    match pattern.first() {
        None => candidate.is_empty(),
        Some('*') => {
            if pattern.get(1) == Some(&'*') {
                let rest = &pattern[2..];
                (0..=candidate.len()).any(|i| matches_from(rest, &candidate[i..]))
            } else {
                let rest = &pattern[1..];
                (0..=candidate.len()).take_while(|&i| i == 0 || candidate[i - 1] != '/').any(|i| matches_from(rest, &candidate[i..]))
            }
        }
        Some('?') => !candidate.is_empty() && candidate[0] != '/' && matches_from(&pattern[1..], &candidate[1..]),
        Some(c) => !candidate.is_empty() && candidate[0] == *c && matches_from(&pattern[1..], &candidate[1..]),
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn glob_matches_star_within_one_segment() {
        assert!(glob_match("src/*.rs", "src/lib.rs"));
        assert!(!glob_match("src/*.rs", "src/nested/lib.rs"));
    }

    #[test]
    fn glob_double_star_crosses_segments() {
        assert!(glob_match("src/**/*.rs", "src/nested/deep/lib.rs"));
        assert!(glob_match("**/*.toml", "Cargo.toml"));
    }

    #[tokio::test]
    async fn write_then_read_round_trips() {
        let dir = tempdir().unwrap();
        let workspace = LocalWorkspace::new(dir.path()).await.unwrap();
        workspace.write(Path::new("out/a.txt"), b"hello").await.unwrap();
        assert_eq!(workspace.read(Path::new("out/a.txt")).await.unwrap(), b"hello");
        assert!(workspace.exists(Path::new("out/a.txt")).await.unwrap());
    }

    #[tokio::test]
    async fn absolute_paths_are_rejected() {
        let dir = tempdir().unwrap();
        let workspace = LocalWorkspace::new(dir.path()).await.unwrap();
        let err = workspace.write(Path::new("/etc/passwd"), b"x").await.unwrap_err();
        assert!(err.is_security_error());
    }

    #[tokio::test]
    async fn stash_and_unstash_round_trip_a_directory() {
        let dir = tempdir().unwrap();
        let workspace = LocalWorkspace::new(dir.path()).await.unwrap();
        workspace.write(Path::new("build/output.txt"), b"artifact").await.unwrap();
        workspace.stash("build-output", Path::new("build")).await.unwrap();
        workspace.delete(Path::new("build")).await.unwrap();
        assert!(!workspace.exists(Path::new("build")).await.unwrap());

        workspace.unstash("build-output").await.unwrap();
        assert_eq!(workspace.read(Path::new("build/output.txt")).await.unwrap(), b"artifact");
    }

    #[tokio::test]
    async fn unstash_missing_name_raises_stash_not_found() {
        let dir = tempdir().unwrap();
        let workspace = LocalWorkspace::new(dir.path()).await.unwrap();
        let err = workspace.unstash("nothing-here").await.unwrap_err();
        assert!(matches!(err, PipelineError::StashNotFound(_)));
    }

    #[tokio::test]
    async fn find_files_matches_glob_pattern() {
        let dir = tempdir().unwrap();
        let workspace = LocalWorkspace::new(dir.path()).await.unwrap();
        workspace.write(Path::new("src/lib.rs"), b"").await.unwrap();
        workspace.write(Path::new("src/nested/mod.rs"), b"").await.unwrap();
        workspace.write(Path::new("README.md"), b"").await.unwrap();
        let matches = workspace.find_files("**/*.rs").await.unwrap();
        assert_eq!(matches.len(), 2);
    }

    #[tokio::test]
    async fn clean_removes_everything_but_the_stash_directory() {
        let dir = tempdir().unwrap();
        let workspace = LocalWorkspace::new(dir.path()).await.unwrap();
        workspace.write(Path::new("build/out.txt"), b"x").await.unwrap();
        workspace.stash("keepsake", Path::new("build")).await.unwrap();
        workspace.clean().await.unwrap();
        assert!(!workspace.exists(Path::new("build")).await.unwrap());
        assert!(workspace.unstash("keepsake").await.is_ok());
    }
}
