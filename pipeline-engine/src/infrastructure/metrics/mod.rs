// /////////////////////////////////////////////////////////////////////////////
// CI/CD Pipeline Execution Engine
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Prometheus metrics (component O): object pool hit rate, log queue
//! depth, sandbox violation counts, and loaded-plugin counts.

use std::sync::Arc;

use pipeline_domain::error::PipelineError;
use prometheus::{Gauge, IntCounter, IntCounterVec, IntGauge, Opts, Registry};

pub struct EngineMetrics {
    registry: Arc<Registry>,
    pub pool_hit_rate: Gauge,
    pub log_queue_depth: IntGauge,
    pub log_records_dropped_total: IntCounter,
    pub sandbox_violations_total: IntCounterVec,
    pub plugins_loaded: IntGauge,
    pub pipelines_completed_total: IntCounter,
    pub pipelines_failed_total: IntCounter,
}

impl EngineMetrics {
    pub fn new() -> Result<Self, PipelineError> {
        let registry = Registry::new();

        let pool_hit_rate = Gauge::new("pipeline_object_pool_hit_rate", "Fraction of pool acquisitions served from the free list").map_err(registration_error)?;
        let log_queue_depth = IntGauge::new("pipeline_log_queue_depth", "Number of log records queued for distribution").map_err(registration_error)?;
        let log_records_dropped_total = IntCounter::new("pipeline_log_records_dropped_total", "Log records dropped because they did not drain within the shutdown grace period").map_err(registration_error)?;
        let sandbox_violations_total = IntCounterVec::new(Opts::new("pipeline_sandbox_violations_total", "Sandbox policy violations observed, by kind"), &["kind"]).map_err(registration_error)?;
        let plugins_loaded = IntGauge::new("pipeline_plugins_loaded", "Number of plugins currently loaded").map_err(registration_error)?;
        let pipelines_completed_total = IntCounter::new("pipeline_runs_completed_total", "Pipeline runs that completed without a stage failure").map_err(registration_error)?;
        let pipelines_failed_total = IntCounter::new("pipeline_runs_failed_total", "Pipeline runs that ended with a stage failure").map_err(registration_error)?;

        registry.register(Box::new(pool_hit_rate.clone())).map_err(registration_error)?;
        registry.register(Box::new(log_queue_depth.clone())).map_err(registration_error)?;
        registry.register(Box::new(log_records_dropped_total.clone())).map_err(registration_error)?;
        registry.register(Box::new(sandbox_violations_total.clone())).map_err(registration_error)?;
        registry.register(Box::new(plugins_loaded.clone())).map_err(registration_error)?;
        registry.register(Box::new(pipelines_completed_total.clone())).map_err(registration_error)?;
        registry.register(Box::new(pipelines_failed_total.clone())).map_err(registration_error)?;

        Ok(Self {
            registry: Arc::new(registry),
            pool_hit_rate,
            log_queue_depth,
            log_records_dropped_total,
            sandbox_violations_total,
            plugins_loaded,
            pipelines_completed_total,
            pipelines_failed_total,
        })
    }

    pub fn record_sandbox_violation(&self, kind: &str) {
        self.sandbox_violations_total.with_label_values(&[kind]).inc();
    }

    /// Renders the current metrics in Prometheus text exposition format.
    pub fn render(&self) -> Result<String, PipelineError> {
        use prometheus::Encoder;
        let encoder = prometheus::TextEncoder::new();
        let families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&families, &mut buffer).map_err(|err| PipelineError::MetricsError(format!("failed to encode metrics: {err}")))?;
        String::from_utf8(buffer).map_err(|err| PipelineError::MetricsError(format!("metrics output was not valid utf-8: {err}")))
    }

    pub fn registry(&self) -> Arc<Registry> {
        self.registry.clone()
    }
}

fn registration_error(err: prometheus::Error) -> PipelineError {
    PipelineError::MetricsError(format!("failed to register metric: {err}"))
}
