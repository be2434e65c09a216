// /////////////////////////////////////////////////////////////////////////////
// CI/CD Pipeline Execution Engine
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Layered configuration (component N): hardcoded defaults, an optional
//! TOML file, then `PIPELINE_*` environment variables, in that order of
//! precedence, via the `config` crate the way the donor layers its own
//! observability configuration.

use serde::{Deserialize, Serialize};

use pipeline_domain::error::PipelineError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub pool_size: usize,
    pub batch_size: usize,
    pub distribution_delay_ms: u64,
    pub console_flush_interval_ms: u64,
    pub shutdown_grace_ms: u64,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            pool_size: 256,
            batch_size: 32,
            distribution_delay_ms: 5,
            console_flush_interval_ms: 250,
            shutdown_grace_ms: 2_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SandboxConfig {
    pub default_max_memory_mb: u64,
    pub default_max_cpu_time_ms: u64,
    pub default_max_wall_time_ms: u64,
    pub default_max_threads: usize,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            default_max_memory_mb: 512,
            default_max_cpu_time_ms: 60_000,
            default_max_wall_time_ms: 5 * 60 * 1000,
            default_max_threads: 4,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginsConfig {
    pub artifact_directory: String,
    pub self_first_resolution: bool,
}

impl Default for PluginsConfig {
    fn default() -> Self {
        Self {
            artifact_directory: "plugins".to_string(),
            self_first_resolution: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    pub enabled: bool,
    pub port: u16,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self { enabled: true, port: 9898 }
    }
}

/// Top-level engine configuration, assembled once at startup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    pub logging: LoggingConfig,
    pub sandbox: SandboxConfig,
    pub plugins: PluginsConfig,
    pub metrics: MetricsConfig,
}

impl EngineConfig {
    /// Loads configuration layering, in increasing precedence: these
    /// defaults, an optional TOML file at `config_path` (silently skipped
    /// if absent), and `PIPELINE_*` environment variables
    /// (`PIPELINE_LOGGING__LEVEL`, `PIPELINE_METRICS__PORT`, etc.).
    pub fn load(config_path: Option<&str>) -> Result<Self, PipelineError> {
        let defaults = EngineConfig::default();
        let defaults_value = config::Config::try_from(&defaults).map_err(|err| PipelineError::ConfigError(format!("failed to seed config defaults: {err}")))?;

        let mut builder = config::Config::builder().add_source(defaults_value);

        if let Some(path) = config_path {
            if std::path::Path::new(path).is_file() {
                builder = builder.add_source(config::File::with_name(path));
            } else {
                tracing::warn!(path, "configuration file not found, continuing with defaults");
            }
        }

        builder = builder.add_source(config::Environment::with_prefix("PIPELINE").separator("__"));

        let assembled = builder.build().map_err(|err| PipelineError::ConfigError(format!("failed to assemble configuration: {err}")))?;
        assembled.try_deserialize().map_err(|err| PipelineError::ConfigError(format!("failed to deserialize configuration: {err}")))
    }
}
