// /////////////////////////////////////////////////////////////////////////////
// CI/CD Pipeline Execution Engine
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Synchronous in-process pub/sub for `PipelineEvent` (component L).
//! `publish` delivers to every subscriber on the caller's own stack;
//! a subscriber that errors is logged and does not affect the others.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use pipeline_domain::events::PipelineEvent;

/// A single subscription. Dropping the handle does not unsubscribe;
/// call [`EventBus::unsubscribe`] explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

pub trait EventSubscriber: Send + Sync {
    fn on_event(&self, event: &PipelineEvent);
}

struct Subscription {
    id: SubscriptionId,
    subscriber: Arc<dyn EventSubscriber>,
}

pub struct EventBus {
    next_subscription_id: AtomicU64,
    subscribers: RwLock<Vec<Subscription>>,
}

impl EventBus {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            next_subscription_id: AtomicU64::new(1),
            subscribers: RwLock::new(Vec::new()),
        })
    }

    pub fn subscribe(&self, subscriber: Arc<dyn EventSubscriber>) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription_id.fetch_add(1, Ordering::Relaxed));
        self.subscribers.write().push(Subscription { id, subscriber });
        id
    }

    /// Returns whether a subscription by this id was present.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.subscribers.write();
        let before = subscribers.len();
        subscribers.retain(|s| s.id != id);
        subscribers.len() != before
    }

    /// Delivers `event` synchronously to every current subscriber, in
    /// subscription order. A subscriber that panics is caught and logged;
    /// it does not prevent delivery to the remaining subscribers.
    pub fn publish(&self, event: PipelineEvent) {
        let subscribers: Vec<Arc<dyn EventSubscriber>> = self.subscribers.read().iter().map(|s| s.subscriber.clone()).collect();
        for subscriber in subscribers {
            let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| subscriber.on_event(&event)));
            if let Err(panic) = outcome {
                let message = panic.downcast_ref::<&str>().map(|s| s.to_string()).or_else(|| panic.downcast_ref::<String>().cloned()).unwrap_or_else(|| "non-string panic payload".to_string());
                tracing::error!(message = %message, "event bus subscriber panicked while handling event");
            }
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().len()
    }
}
