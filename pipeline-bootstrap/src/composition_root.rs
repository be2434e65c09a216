// /////////////////////////////////////////////////////////////////////////////
// CI/CD Pipeline Execution Engine
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Composition Root
//!
//! Wires every infrastructure adapter in `pipeline-engine` into the set of
//! use cases a front end drives, once, at process start. Nothing outside
//! this module is allowed to construct a [`LoggerManager`], a
//! [`DslEngineRegistry`], or a [`PluginManager`] directly — a CLI command,
//! an HTTP handler, or a test harness all go through the `CompositionRoot`
//! so there is exactly one place that decides how the engine's services
//! are assembled.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use pipeline_engine::application::{LoadPluginUseCase, RegisterEngineUseCase, ValidateScriptUseCase};
use pipeline_engine::infrastructure::dsl::{DslEngineRegistry, JsonDslEngine, NativeDslEngine};
use pipeline_engine::infrastructure::logging::{ConsoleBatchingConsumer, LoggerManager};
use pipeline_engine::infrastructure::metrics::EngineMetrics;
use pipeline_engine::infrastructure::plugins::PluginManager;

use crate::config::AppConfig;

/// Default size of the pooled `MutableLogRecord` cache (component A).
const DEFAULT_LOG_POOL_SIZE: usize = 256;
/// Default distributor batch size (component C).
const DEFAULT_LOG_BATCH_SIZE: usize = 64;
/// Default distributor sleep between passes (component C).
const DEFAULT_LOG_DISTRIBUTION_DELAY: Duration = Duration::from_millis(10);
/// Default console consumer ring capacity (component E).
const DEFAULT_CONSOLE_QUEUE_CAPACITY: usize = 1024;
/// Default console consumer flush batch size (component E).
const DEFAULT_CONSOLE_BATCH_SIZE: usize = 20;
/// Default console consumer flush timeout (component E).
const DEFAULT_CONSOLE_FLUSH_TIMEOUT: Duration = Duration::from_millis(250);
/// Grace period given to the logging core to drain on shutdown.
const DEFAULT_LOG_SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

/// The process-wide services a front end needs, assembled once.
///
/// Analogous to the teacher's own dependency-injection container: every
/// field here is an `Arc`-shared singleton handed out to whichever use
/// case needs it, never reconstructed per request.
pub struct CompositionRoot {
    logger_manager: Arc<LoggerManager>,
    console_consumer: Arc<ConsoleBatchingConsumer>,
    registry: Arc<DslEngineRegistry>,
    plugin_manager: Arc<PluginManager>,
    metrics: Arc<EngineMetrics>,
}

impl CompositionRoot {
    /// Builds the composition root: starts the logging core's distributor
    /// task, registers the console consumer and the two built-in DSL
    /// engines, and creates an empty, ready-to-load plugin manager.
    ///
    /// # Errors
    ///
    /// Returns a [`pipeline_domain::error::PipelineError`] if the metrics
    /// registry fails to initialize or a built-in DSL engine fails to
    /// register (both effectively infallible in practice; surfaced rather
    /// than unwrapped so a caller can map it to an exit code).
    pub async fn build(config: &AppConfig) -> Result<Self, pipeline_domain::error::PipelineError> {
        let logger_manager = LoggerManager::new(DEFAULT_LOG_POOL_SIZE, DEFAULT_LOG_BATCH_SIZE, DEFAULT_LOG_DISTRIBUTION_DELAY);

        let console_consumer = ConsoleBatchingConsumer::new(
            "console",
            DEFAULT_CONSOLE_QUEUE_CAPACITY,
            DEFAULT_CONSOLE_BATCH_SIZE,
            DEFAULT_CONSOLE_FLUSH_TIMEOUT,
            !config.is_dry_run(),
        );
        logger_manager.add_consumer(console_consumer.clone() as Arc<dyn pipeline_domain::repositories::LogConsumer>).await;

        let registry = DslEngineRegistry::new();
        registry.register(NativeDslEngine::new())?;
        registry.register(JsonDslEngine::new())?;

        // No parent resolver: the root is the top of the plugin chain, so
        // every plugin's class resolver is self-first with no fallback.
        let plugin_manager = Arc::new(PluginManager::new(None, true));

        let metrics = Arc::new(EngineMetrics::new()?);

        Ok(Self {
            logger_manager,
            console_consumer,
            registry,
            plugin_manager,
            metrics,
        })
    }

    pub fn logger_manager(&self) -> &Arc<LoggerManager> {
        &self.logger_manager
    }

    pub fn console_consumer(&self) -> &Arc<ConsoleBatchingConsumer> {
        &self.console_consumer
    }

    pub fn registry(&self) -> &Arc<DslEngineRegistry> {
        &self.registry
    }

    pub fn plugin_manager(&self) -> &Arc<PluginManager> {
        &self.plugin_manager
    }

    pub fn metrics(&self) -> &Arc<EngineMetrics> {
        &self.metrics
    }

    pub fn validate_script_use_case(&self) -> ValidateScriptUseCase {
        ValidateScriptUseCase::new()
    }

    pub fn load_plugin_use_case(&self) -> LoadPluginUseCase {
        LoadPluginUseCase::new(self.plugin_manager.clone())
    }

    pub fn register_engine_use_case(&self) -> RegisterEngineUseCase {
        RegisterEngineUseCase::new(self.registry.clone())
    }

    /// Reads a script file from disk as UTF-8 text, for the `validate`
    /// command. A dedicated helper rather than inlined in `main` so tests
    /// can exercise the read-then-validate path without going through the
    /// CLI.
    pub fn read_script(path: &PathBuf) -> std::io::Result<String> {
        std::fs::read_to_string(path)
    }

    /// Drains the logging core and stops its distributor task. Called once,
    /// at the end of `main`, after the command's result is known.
    pub async fn shutdown(&self) {
        self.logger_manager.shutdown(DEFAULT_LOG_SHUTDOWN_GRACE).await;
    }
}
