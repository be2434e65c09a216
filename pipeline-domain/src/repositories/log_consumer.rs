// /////////////////////////////////////////////////////////////////////////////
// CI/CD Pipeline Execution Engine
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

use async_trait::async_trait;

use crate::error::PipelineError;
use crate::events::LogRecordSnapshot;

/// A registered observer receiving immutable log snapshots in emission
/// order. Implementations must never propagate errors to producers: the
/// distributor catches every `on_event` failure and routes it to
/// `on_error` on the same consumer only.
#[async_trait]
pub trait LogConsumer: Send + Sync {
    /// A stable name used in diagnostics (`"console"`, `"file:/var/log/..."`).
    fn name(&self) -> &str;

    async fn on_event(&self, record: &LogRecordSnapshot) -> Result<(), PipelineError>;

    /// Called by the distributor when `on_event` raises. Never called for
    /// errors this consumer did not itself raise.
    async fn on_error(&self, record: &LogRecordSnapshot, error: &PipelineError);

    /// Called exactly once when this consumer is registered with the
    /// manager.
    async fn on_added(&self);

    /// Called exactly once when this consumer is removed or the manager
    /// shuts down.
    async fn on_removed(&self);
}
