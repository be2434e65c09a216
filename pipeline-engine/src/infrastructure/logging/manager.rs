// /////////////////////////////////////////////////////////////////////////////
// CI/CD Pipeline Execution Engine
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Named logger lookup with a shared cache, and `LoggingContext`
//! propagation via `tokio::task_local!` — the Rust idiom for "inherited by
//! spawned children, replaced rather than merged by nested installs".

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use pipeline_domain::events::{LogLevel, LoggingContext, LogSource, MutableLogRecord};
use pipeline_domain::repositories::{LogConsumer, StepLogger};

use super::distributor::LogDistributor;
use super::pool::ObjectPool;

tokio::task_local! {
    static CURRENT_CONTEXT: LoggingContext;
}

/// Installs `ctx` for the duration of `fut`, fully replacing (not merging)
/// whatever context, if any, is currently installed. Tasks spawned from
/// within `fut` inherit `ctx` by value. The previous context (if any) is
/// restored once `fut` completes, simply because `ctx` is scoped to this
/// call's stack frame.
pub async fn with_context<F: Future>(ctx: LoggingContext, fut: F) -> F::Output {
    CURRENT_CONTEXT.scope(ctx, fut).await
}

pub fn current_context() -> LoggingContext {
    CURRENT_CONTEXT.try_with(|ctx| ctx.clone()).unwrap_or_default()
}

/// A cached, shared handle returned by [`LoggerManager::get_logger`].
/// Identical names return the same `Arc` (pointer equality).
pub struct Logger {
    name: String,
    pool: Arc<ObjectPool<MutableLogRecord>>,
    distributor: Arc<LogDistributor>,
}

impl Logger {
    pub fn emit(&self, level: LogLevel, message: impl Into<String>, exception: Option<String>) {
        let ctx = current_context();
        let mut context_data: HashMap<String, String> = ctx.custom_data.clone();
        if let Some(user_id) = &ctx.user_id {
            context_data.insert("user_id".to_string(), user_id.clone());
        }
        if let Some(session_id) = &ctx.session_id {
            context_data.insert("session_id".to_string(), session_id.clone());
        }
        let mut record = self.pool.acquire();
        record.populate(chrono::Utc::now(), level, self.name.clone(), message, ctx.correlation_id.clone(), context_data, exception, LogSource::Logger);
        self.distributor.emit(record);
    }
}

impl StepLogger for Logger {
    fn log(&self, level: LogLevel, message: &str) {
        self.emit(level, message.to_string(), None);
    }
}

pub struct LoggerManager {
    loggers: DashMap<String, Arc<Logger>>,
    pool: Arc<ObjectPool<MutableLogRecord>>,
    distributor: Arc<LogDistributor>,
}

impl LoggerManager {
    pub fn new(pool_size: usize, batch_size: usize, distribution_delay: Duration) -> Arc<Self> {
        let pool = ObjectPool::new(pool_size, pool_size / 4, MutableLogRecord::new, |r: &mut MutableLogRecord| {
            r.reset();
            true
        });
        let distributor = LogDistributor::start(pool.clone(), batch_size, distribution_delay);
        Arc::new(Self {
            loggers: DashMap::new(),
            pool,
            distributor,
        })
    }

    /// Returns a cached, shared `Logger` keyed by name. Identical names
    /// return the same instance.
    pub fn get_logger(&self, name: &str) -> Arc<Logger> {
        self.loggers
            .entry(name.to_string())
            .or_insert_with(|| {
                Arc::new(Logger {
                    name: name.to_string(),
                    pool: self.pool.clone(),
                    distributor: self.distributor.clone(),
                })
            })
            .clone()
    }

    pub async fn add_consumer(&self, consumer: Arc<dyn LogConsumer>) {
        consumer.on_added().await;
        self.distributor.add_consumer(consumer);
    }

    /// Returns whether `name` was present. Calls `on_removed` exactly once
    /// if so, and guarantees no further `on_event` calls reach it after this
    /// returns (the copy-on-write swap in the distributor is visible to the
    /// next distribution pass before `remove_consumer` returns).
    pub async fn remove_consumer(&self, name: &str) -> bool {
        match self.distributor.remove_consumer(name) {
            Some(consumer) => {
                consumer.on_removed().await;
                true
            }
            None => false,
        }
    }

    pub fn consumer_count(&self) -> usize {
        self.distributor.consumer_count()
    }

    pub fn pool_metrics(&self) -> &super::pool::PoolMetrics {
        self.pool.metrics()
    }

    pub async fn shutdown(&self, grace: Duration) {
        self.distributor.shutdown(grace).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_logger_returns_same_instance_for_same_name() {
        let manager = LoggerManager::new(16, 8, Duration::from_millis(5));
        let a = manager.get_logger("build");
        let b = manager.get_logger("build");
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[tokio::test]
    async fn nested_with_context_replaces_not_merges() {
        let outer = LoggingContext::new().with_correlation_id("outer").with_custom("k", "outer-v");
        with_context(outer.clone(), async {
            assert_eq!(current_context().correlation_id.as_deref(), Some("outer"));
            let inner = LoggingContext::new().with_correlation_id("inner");
            with_context(inner, async {
                let ctx = current_context();
                assert_eq!(ctx.correlation_id.as_deref(), Some("inner"));
                assert!(ctx.custom_data.get("k").is_none(), "nested context must replace, not merge");
            })
            .await;
            assert_eq!(current_context().correlation_id.as_deref(), Some("outer"));
        })
        .await;
    }
}
