// /////////////////////////////////////////////////////////////////////////////
// CI/CD Pipeline Execution Engine
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Timeout/size-triggered batched stdout emission with drop accounting.
//! Flush is triggered by batch size, a flush-timeout tick, or shutdown.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use parking_lot::Mutex;
use pipeline_domain::error::PipelineError;
use pipeline_domain::events::{LogLevel, LogRecordSnapshot};
use pipeline_domain::repositories::LogConsumer;
use tokio::sync::Mutex as AsyncMutex;
use tokio::task::JoinHandle;

fn ansi_color_for(level: LogLevel) -> &'static str {
    match level {
        LogLevel::Debug => "\x1b[90m",
        LogLevel::Info => "\x1b[37m",
        LogLevel::Warn => "\x1b[33m",
        LogLevel::Error => "\x1b[31m",
        LogLevel::Critical => "\x1b[1;31m",
    }
}
const ANSI_RESET: &str = "\x1b[0m";

#[derive(Debug, Default)]
pub struct ConsoleConsumerMetrics {
    pub events_received: AtomicU64,
    pub events_dropped: AtomicU64,
    pub batches_written: AtomicU64,
    pub flush_timeouts: AtomicU64,
}

/// A single-writer, batched console sink. `queue_capacity` bounds the
/// pending ring; once full, new events are dropped and `[QUEUE_FULL]` is
/// optionally written directly as a fallback line.
pub struct ConsoleBatchingConsumer {
    name: String,
    pending: Mutex<Vec<LogRecordSnapshot>>,
    queue_capacity: usize,
    batch_size: usize,
    colorize: bool,
    write_fallback_line: bool,
    metrics: ConsoleConsumerMetrics,
    started_at: Instant,
    active: AtomicBool,
    flusher: AsyncMutex<Option<JoinHandle<()>>>,
}

impl ConsoleBatchingConsumer {
    pub fn new(name: impl Into<String>, queue_capacity: usize, batch_size: usize, flush_timeout: Duration, colorize: bool) -> Arc<Self> {
        let consumer = Arc::new(Self {
            name: name.into(),
            pending: Mutex::new(Vec::with_capacity(queue_capacity)),
            queue_capacity,
            batch_size,
            colorize,
            write_fallback_line: true,
            metrics: ConsoleConsumerMetrics::default(),
            started_at: Instant::now(),
            active: AtomicBool::new(true),
            flusher: AsyncMutex::new(None),
        });

        let ticker = consumer.clone();
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(flush_timeout);
            loop {
                interval.tick().await;
                if !ticker.active.load(Ordering::Acquire) {
                    return;
                }
                ticker.metrics.flush_timeouts.fetch_add(1, Ordering::Relaxed);
                ticker.flush();
            }
        });
        *consumer.flusher.try_lock().expect("no contention at construction") = Some(handle);
        consumer
    }

    fn flush(&self) {
        let batch: Vec<LogRecordSnapshot> = {
            let mut pending = self.pending.lock();
            if pending.is_empty() {
                return;
            }
            std::mem::take(&mut *pending)
        };
        let mut out = String::new();
        for record in &batch {
            if self.colorize {
                out.push_str(ansi_color_for(record.level));
            }
            out.push_str(&format!("[{}] {} {}: {}", record.timestamp.to_rfc3339(), record.logger_name, format_level(record.level), record.message));
            if self.colorize {
                out.push_str(ANSI_RESET);
            }
            out.push('\n');
        }
        print!("{out}");
        self.metrics.batches_written.fetch_add(1, Ordering::Relaxed);
    }

    pub fn events_received(&self) -> u64 {
        self.metrics.events_received.load(Ordering::Relaxed)
    }

    pub fn events_dropped(&self) -> u64 {
        self.metrics.events_dropped.load(Ordering::Relaxed)
    }

    pub fn drop_rate(&self) -> f64 {
        let received = self.events_received();
        if received == 0 {
            return 0.0;
        }
        self.events_dropped() as f64 / received as f64
    }

    pub fn average_batch_size(&self) -> f64 {
        let batches = self.metrics.batches_written.load(Ordering::Relaxed);
        if batches == 0 {
            return 0.0;
        }
        (self.events_received() - self.events_dropped()) as f64 / batches as f64
    }

    pub fn events_per_second(&self) -> f64 {
        let elapsed = self.started_at.elapsed().as_secs_f64();
        if elapsed <= 0.0 {
            return 0.0;
        }
        self.events_received() as f64 / elapsed
    }

    pub fn uptime_seconds(&self) -> f64 {
        self.started_at.elapsed().as_secs_f64()
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Healthy per the component contract: `average_batch_size >= 5 &&
    /// drop_rate < 0.01 && events_per_second > 100`.
    pub fn is_performant(&self) -> bool {
        self.average_batch_size() >= 5.0 && self.drop_rate() < 0.01 && self.events_per_second() > 100.0
    }
}

fn format_level(level: LogLevel) -> &'static str {
    match level {
        LogLevel::Debug => "DEBUG",
        LogLevel::Info => "INFO",
        LogLevel::Warn => "WARN",
        LogLevel::Error => "ERROR",
        LogLevel::Critical => "CRITICAL",
    }
}

#[async_trait]
impl LogConsumer for ConsoleBatchingConsumer {
    fn name(&self) -> &str {
        &self.name
    }

    async fn on_event(&self, record: &LogRecordSnapshot) -> Result<(), PipelineError> {
        self.metrics.events_received.fetch_add(1, Ordering::Relaxed);
        let should_flush = {
            let mut pending = self.pending.lock();
            if pending.len() >= self.queue_capacity {
                self.metrics.events_dropped.fetch_add(1, Ordering::Relaxed);
                if self.write_fallback_line {
                    eprintln!("[QUEUE_FULL]");
                }
                false
            } else {
                pending.push(record.clone());
                pending.len() >= self.batch_size
            }
        };
        if should_flush {
            self.flush();
        }
        Ok(())
    }

    async fn on_error(&self, _record: &LogRecordSnapshot, _error: &PipelineError) {}

    async fn on_added(&self) {}

    async fn on_removed(&self) {
        self.active.store(false, Ordering::Release);
        self.flush();
        if let Some(handle) = self.flusher.lock().await.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use std::collections::HashMap;

    use super::*;
    use pipeline_domain::events::LogSource;

    fn sample_record(i: usize) -> LogRecordSnapshot {
        LogRecordSnapshot {
            timestamp: Utc::now(),
            level: LogLevel::Info,
            logger_name: "test".into(),
            message: format!("event {i}"),
            correlation_id: None,
            context_data: HashMap::new(),
            exception: None,
            source: LogSource::Logger,
        }
    }

    #[tokio::test]
    async fn flushes_when_batch_size_reached() {
        let consumer = ConsoleBatchingConsumer::new("console", 64, 3, Duration::from_secs(60), false);
        for i in 0..3 {
            consumer.on_event(&sample_record(i)).await.unwrap();
        }
        assert_eq!(consumer.events_received(), 3);
        assert!(consumer.metrics.batches_written.load(Ordering::Relaxed) >= 1);
        consumer.on_removed().await;
    }

    #[tokio::test]
    async fn drops_events_past_queue_capacity() {
        let consumer = ConsoleBatchingConsumer::new("console", 2, 100, Duration::from_secs(60), false);
        for i in 0..5 {
            consumer.on_event(&sample_record(i)).await.unwrap();
        }
        assert_eq!(consumer.events_received(), 5);
        assert!(consumer.events_dropped() >= 3);
        consumer.on_removed().await;
    }
}
