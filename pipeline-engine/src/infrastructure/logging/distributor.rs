// /////////////////////////////////////////////////////////////////////////////
// CI/CD Pipeline Execution Engine
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Lock-free MPSC intake (`crossbeam::queue::SegQueue`) feeding a single
//! long-lived distributor task that batches and fans records out to a
//! copy-on-write consumer list (`arc-swap::ArcSwap`). Per-consumer errors
//! are isolated: a consumer that raises on `on_event` is routed to its own
//! `on_error` and never affects delivery to the others.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use crossbeam::queue::SegQueue;
use pipeline_domain::events::MutableLogRecord;
use pipeline_domain::repositories::LogConsumer;
use tokio::sync::Mutex as AsyncMutex;
use tokio::task::JoinHandle;

use super::pool::ObjectPool;

pub struct LogDistributor {
    queue: Arc<SegQueue<MutableLogRecord>>,
    pool: Arc<ObjectPool<MutableLogRecord>>,
    consumers: Arc<ArcSwap<Vec<Arc<dyn LogConsumer>>>>,
    running: Arc<AtomicBool>,
    handle: AsyncMutex<Option<JoinHandle<()>>>,
}

impl LogDistributor {
    pub fn start(pool: Arc<ObjectPool<MutableLogRecord>>, batch_size: usize, delay: Duration) -> Arc<Self> {
        let queue = Arc::new(SegQueue::new());
        let consumers = Arc::new(ArcSwap::from_pointee(Vec::new()));
        let running = Arc::new(AtomicBool::new(true));

        let loop_queue = queue.clone();
        let loop_pool = pool.clone();
        let loop_consumers = consumers.clone();
        let loop_running = running.clone();
        let handle = tokio::spawn(async move {
            Self::run(loop_queue, loop_pool, loop_consumers, loop_running, batch_size, delay).await;
        });

        Arc::new(Self {
            queue,
            pool,
            consumers,
            running,
            handle: AsyncMutex::new(Some(handle)),
        })
    }

    async fn run(
        queue: Arc<SegQueue<MutableLogRecord>>,
        pool: Arc<ObjectPool<MutableLogRecord>>,
        consumers: Arc<ArcSwap<Vec<Arc<dyn LogConsumer>>>>,
        running: Arc<AtomicBool>,
        batch_size: usize,
        delay: Duration,
    ) {
        loop {
            let mut drained_any = false;
            for _ in 0..batch_size {
                let Some(record) = queue.pop() else { break };
                drained_any = true;
                let snapshot = record.to_immutable();
                let current_consumers = consumers.load();
                for consumer in current_consumers.iter() {
                    if let Err(err) = consumer.on_event(&snapshot).await {
                        consumer.on_error(&snapshot, &err).await;
                    }
                }
                pool.release(record);
            }
            if !running.load(Ordering::Acquire) && queue.is_empty() {
                return;
            }
            if !drained_any {
                tokio::time::sleep(delay).await;
            }
        }
    }

    /// Producers call this with a record acquired from the shared pool; the
    /// distributor returns it to the pool once every consumer has observed
    /// it (or raised).
    pub fn emit(&self, record: MutableLogRecord) {
        self.queue.push(record);
    }

    pub fn add_consumer(&self, consumer: Arc<dyn LogConsumer>) {
        self.consumers.rcu(|current| {
            let mut next = (**current).clone();
            next.push(consumer.clone());
            next
        });
    }

    /// Returns the removed consumer, if one by this name was present, so
    /// the caller can invoke `on_removed` exactly once.
    pub fn remove_consumer(&self, name: &str) -> Option<Arc<dyn LogConsumer>> {
        let mut removed = None;
        self.consumers.rcu(|current| {
            removed = current.iter().find(|c| c.name() == name).cloned();
            current.iter().filter(|c| c.name() != name).cloned().collect::<Vec<_>>()
        });
        removed
    }

    pub fn consumer_count(&self) -> usize {
        self.consumers.load().len()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Stops accepting the implication of new distribution passes, drains
    /// up to `grace`, then notifies every consumer via `on_removed`, clears
    /// the list, and joins the distributor task.
    pub async fn shutdown(&self, grace: Duration) {
        self.running.store(false, Ordering::Release);
        let deadline = tokio::time::Instant::now() + grace;
        while !self.queue.is_empty() && tokio::time::Instant::now() < deadline {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        if let Some(handle) = self.handle.lock().await.take() {
            let _ = tokio::time::timeout(grace, handle).await;
        }
        let departing = self.consumers.swap(Arc::new(Vec::new()));
        for consumer in departing.iter() {
            consumer.on_removed().await;
        }
    }
}
