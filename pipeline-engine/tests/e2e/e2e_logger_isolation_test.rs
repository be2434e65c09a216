//! Two consumers, one good (G) and one that throws on every third
//! event (E), registered against the same distributor; emit 30 events.
//! G receives all 30 in order; E raises on events 3, 6, ..., 30 (10 times)
//! and its failures never affect G; the manager stays active throughout.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use pipeline_domain::error::PipelineError;
use pipeline_domain::events::{LogLevel, LogRecordSnapshot};
use pipeline_domain::repositories::LogConsumer;
use pipeline_engine::infrastructure::logging::LoggerManager;

struct GoodConsumer {
    messages: Mutex<Vec<String>>,
}

#[async_trait]
impl LogConsumer for GoodConsumer {
    fn name(&self) -> &str {
        "good"
    }

    async fn on_event(&self, record: &LogRecordSnapshot) -> Result<(), PipelineError> {
        self.messages.lock().push(record.message.clone());
        Ok(())
    }

    async fn on_error(&self, _record: &LogRecordSnapshot, _error: &PipelineError) {}
    async fn on_added(&self) {}
    async fn on_removed(&self) {}
}

struct EveryThirdFailsConsumer {
    seen: AtomicUsize,
    errors: AtomicUsize,
}

#[async_trait]
impl LogConsumer for EveryThirdFailsConsumer {
    fn name(&self) -> &str {
        "flaky"
    }

    async fn on_event(&self, _record: &LogRecordSnapshot) -> Result<(), PipelineError> {
        let n = self.seen.fetch_add(1, Ordering::SeqCst) + 1;
        if n % 3 == 0 {
            Err(PipelineError::InternalError(format!("flaky consumer fails on event {n}")))
        } else {
            Ok(())
        }
    }

    async fn on_error(&self, _record: &LogRecordSnapshot, _error: &PipelineError) {
        self.errors.fetch_add(1, Ordering::SeqCst);
    }

    async fn on_added(&self) {}
    async fn on_removed(&self) {}
}

#[tokio::test]
async fn a_failing_consumer_never_disrupts_delivery_to_a_healthy_one() {
    let manager = LoggerManager::new(32, 8, Duration::from_millis(5));

    let good = Arc::new(GoodConsumer { messages: Mutex::new(Vec::new()) });
    let flaky = Arc::new(EveryThirdFailsConsumer {
        seen: AtomicUsize::new(0),
        errors: AtomicUsize::new(0),
    });

    manager.add_consumer(good.clone()).await;
    manager.add_consumer(flaky.clone()).await;

    let logger = manager.get_logger("e2e.consumer_isolation");
    for i in 1..=30 {
        logger.emit(LogLevel::Info, format!("event-{i}"), None);
    }

    tokio::time::sleep(Duration::from_millis(200)).await;

    assert_eq!(good.messages.lock().len(), 30, "the good consumer must receive every event");
    let expected: Vec<String> = (1..=30).map(|i| format!("event-{i}")).collect();
    assert_eq!(*good.messages.lock(), expected, "events must be delivered in emission order");

    assert_eq!(flaky.seen.load(Ordering::SeqCst), 30, "the flaky consumer must still observe every event");
    assert_eq!(flaky.errors.load(Ordering::SeqCst), 10, "on_error must fire exactly on the 10 multiples of 3");
    assert_eq!(manager.consumer_count(), 2, "the manager stays active and keeps both consumers registered");

    manager.shutdown(Duration::from_millis(100)).await;
    assert_eq!(manager.consumer_count(), 0);
}
