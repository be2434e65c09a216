// /////////////////////////////////////////////////////////////////////////////
// CI/CD Pipeline Execution Engine
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! A bounded, reusable-object cache with reset discipline and hit-rate
//! metrics, over a `crossbeam::queue::ArrayQueue` so `acquire`/`release`
//! never block and never call user code while holding an internal lock
//! (the queue itself is lock-free).

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crossbeam::queue::ArrayQueue;

/// Counters exposed for observability; see [`ObjectPool::is_healthy`] for
/// the derived health predicate.
#[derive(Debug, Default)]
pub struct PoolMetrics {
    pub total_acquisitions: AtomicU64,
    pub pool_hits: AtomicU64,
    pub factory_creations: AtomicU64,
    pub total_releases: AtomicU64,
    pub dropped_releases: AtomicU64,
}

/// Bounded pool over `T`, produced by `factory` and cleansed by `reset`
/// before reuse.
pub struct ObjectPool<T> {
    queue: ArrayQueue<T>,
    factory: Box<dyn Fn() -> T + Send + Sync>,
    reset: Box<dyn Fn(&mut T) -> bool + Send + Sync>,
    metrics: PoolMetrics,
}

impl<T> ObjectPool<T> {
    /// Builds a pool bounded at `max_pool_size`, pre-warmed with
    /// `initial_size` factory-produced instances (clamped to
    /// `max_pool_size`).
    pub fn new<F, R>(max_pool_size: usize, initial_size: usize, factory: F, reset: R) -> Arc<Self>
    where
        F: Fn() -> T + Send + Sync + 'static,
        R: Fn(&mut T) -> bool + Send + Sync + 'static,
    {
        let queue = ArrayQueue::new(max_pool_size.max(1));
        for _ in 0..initial_size.min(max_pool_size) {
            let _ = queue.push(factory());
        }
        Arc::new(Self {
            queue,
            factory: Box::new(factory),
            reset: Box::new(reset),
            metrics: PoolMetrics::default(),
        })
    }

    /// Returns an existing reset instance if available, else invokes the
    /// factory.
    pub fn acquire(&self) -> T {
        self.metrics.total_acquisitions.fetch_add(1, Ordering::Relaxed);
        if let Some(item) = self.queue.pop() {
            self.metrics.pool_hits.fetch_add(1, Ordering::Relaxed);
            item
        } else {
            self.metrics.factory_creations.fetch_add(1, Ordering::Relaxed);
            (self.factory)()
        }
    }

    /// Applies `reset`, then inserts only if below capacity; if `reset`
    /// reports failure or the pool is full, the object is discarded and
    /// `dropped_releases` increments. Never calls user code while holding an
    /// internal lock: the queue push itself is the only synchronization.
    pub fn release(&self, mut item: T) {
        self.metrics.total_releases.fetch_add(1, Ordering::Relaxed);
        if !(self.reset)(&mut item) {
            self.metrics.dropped_releases.fetch_add(1, Ordering::Relaxed);
            return;
        }
        if self.queue.push(item).is_err() {
            self.metrics.dropped_releases.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn current_size(&self) -> usize {
        self.queue.len()
    }

    pub fn max_pool_size(&self) -> usize {
        self.queue.capacity()
    }

    pub fn hit_rate(&self) -> f64 {
        let total = self.metrics.total_acquisitions.load(Ordering::Relaxed);
        if total == 0 {
            return 0.0;
        }
        self.metrics.pool_hits.load(Ordering::Relaxed) as f64 / total as f64
    }

    pub fn drop_rate(&self) -> f64 {
        let releases = self.metrics.total_releases.load(Ordering::Relaxed);
        if releases == 0 {
            return 0.0;
        }
        self.metrics.dropped_releases.load(Ordering::Relaxed) as f64 / releases as f64
    }

    /// Healthy when `hit_rate >= 0.5 && drop_rate <= 0.1`.
    pub fn is_healthy(&self) -> bool {
        self.hit_rate() >= 0.5 && self.drop_rate() <= 0.1
    }

    pub fn metrics(&self) -> &PoolMetrics {
        &self.metrics
    }
}
