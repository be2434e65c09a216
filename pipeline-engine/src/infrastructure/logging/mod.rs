// /////////////////////////////////////////////////////////////////////////////
// CI/CD Pipeline Execution Engine
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! The push-based logging core: pooled mutable records (A/B), a lock-free
//! queue and distributor (C), a logger manager with cached loggers and
//! context propagation (D), and a batched console consumer (E).

pub mod console_consumer;
pub mod distributor;
pub mod manager;
pub mod pool;

pub use console_consumer::ConsoleBatchingConsumer;
pub use distributor::LogDistributor;
pub use manager::{current_context, with_context, Logger, LoggerManager};
pub use pool::ObjectPool;
