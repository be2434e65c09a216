// /////////////////////////////////////////////////////////////////////////////
// CI/CD Pipeline Execution Engine
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogSource {
    Logger,
    Stdout,
    Stderr,
}

/// A pooled, mutable staging area for a log event. Producers `populate` it
/// in place and hand it to the distributor, which converts it to a
/// [`LogRecordSnapshot`] before fan-out and returns the mutable record to
/// the object pool once every consumer has observed the snapshot.
///
/// Field defaults on construction mirror what `reset()` restores: an empty
/// message buffer and context map whose *capacity* survives reuse (only
/// `.clear()` is called, never a reallocation).
#[derive(Debug, Clone)]
pub struct MutableLogRecord {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub logger_name: String,
    pub message: String,
    pub correlation_id: Option<String>,
    pub context_data: HashMap<String, String>,
    pub exception: Option<String>,
    pub source: LogSource,
}

impl Default for MutableLogRecord {
    fn default() -> Self {
        Self {
            timestamp: DateTime::<Utc>::UNIX_EPOCH,
            level: LogLevel::Info,
            logger_name: String::new(),
            message: String::new(),
            correlation_id: None,
            context_data: HashMap::new(),
            exception: None,
            source: LogSource::Logger,
        }
    }
}

impl MutableLogRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assigns every field and copies `context_data`. Growable buffers
    /// (`message`, `context_data`) are overwritten, not replaced, so their
    /// backing allocation is reused across pool cycles.
    #[allow(clippy::too_many_arguments)]
    pub fn populate(
        &mut self,
        timestamp: DateTime<Utc>,
        level: LogLevel,
        logger_name: impl Into<String>,
        message: impl Into<String>,
        correlation_id: Option<String>,
        context_data: HashMap<String, String>,
        exception: Option<String>,
        source: LogSource,
    ) {
        self.timestamp = timestamp;
        self.level = level;
        self.logger_name.clear();
        self.logger_name.push_str(&logger_name.into());
        self.message.clear();
        self.message.push_str(&message.into());
        self.correlation_id = correlation_id;
        self.context_data.clear();
        self.context_data.extend(context_data);
        self.exception = exception;
        self.source = source;
    }

    /// Produces an immutable snapshot whose strings and map are independent
    /// deep copies, safe to publish across consumer tasks.
    pub fn to_immutable(&self) -> LogRecordSnapshot {
        LogRecordSnapshot {
            timestamp: self.timestamp,
            level: self.level,
            logger_name: self.logger_name.clone(),
            message: self.message.clone(),
            correlation_id: self.correlation_id.clone(),
            context_data: self.context_data.clone(),
            exception: self.exception.clone(),
            source: self.source,
        }
    }

    /// Clears scalars to defaults; preserves the capacity of `message` and
    /// `context_data`.
    pub fn reset(&mut self) {
        self.timestamp = DateTime::<Utc>::UNIX_EPOCH;
        self.level = LogLevel::Info;
        self.logger_name.clear();
        self.message.clear();
        self.correlation_id = None;
        self.context_data.clear();
        self.exception = None;
        self.source = LogSource::Logger;
    }
}

/// Structurally equal to the [`MutableLogRecord`] it was snapshotted from,
/// but owns independent copies — safe to move across threads/tasks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecordSnapshot {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub logger_name: String,
    pub message: String,
    pub correlation_id: Option<String>,
    pub context_data: HashMap<String, String>,
    pub exception: Option<String>,
    pub source: LogSource,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn populate_then_to_immutable_round_trips() {
        let mut record = MutableLogRecord::new();
        let mut ctx = HashMap::new();
        ctx.insert("k".to_string(), "v".to_string());
        record.populate(Utc::now(), LogLevel::Warn, "build", "disk low", Some("corr-1".into()), ctx.clone(), None, LogSource::Logger);
        let snapshot = record.to_immutable();
        assert_eq!(snapshot.logger_name, "build");
        assert_eq!(snapshot.message, "disk low");
        assert_eq!(snapshot.correlation_id.as_deref(), Some("corr-1"));
        assert_eq!(snapshot.context_data, ctx);
    }

    #[test]
    fn reset_clears_scalars_and_buffers() {
        let mut record = MutableLogRecord::new();
        record.populate(Utc::now(), LogLevel::Error, "x", "boom", None, HashMap::new(), Some("trace".into()), LogSource::Stderr);
        record.reset();
        let defaults = MutableLogRecord::default();
        assert_eq!(record.logger_name, defaults.logger_name);
        assert_eq!(record.message, defaults.message);
        assert_eq!(record.level, defaults.level);
        assert!(record.exception.is_none());
    }

    #[test]
    fn reset_preserves_message_capacity() {
        let mut record = MutableLogRecord::new();
        record.message.push_str(&"x".repeat(256));
        let capacity_before = record.message.capacity();
        record.reset();
        assert!(record.message.capacity() >= capacity_before);
        assert!(record.message.is_empty());
    }
}
