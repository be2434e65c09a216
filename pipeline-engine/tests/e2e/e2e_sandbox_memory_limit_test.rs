//! A sandboxed step samples above `max_memory_mb`. Execution aborts
//! with `MemoryLimitExceeded`, the sandbox observes exactly one violation,
//! and a caller-side `always`-style cleanup still runs.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use pipeline_domain::error::PipelineError;
use pipeline_domain::value_objects::{DslResourceLimits, DslSecurityPolicy, IsolationLevel};
use pipeline_engine::infrastructure::sandbox::{SandboxManager, SandboxState, ViolationSink};
use tokio_util::sync::CancellationToken;

struct CountingViolationSink(Arc<AtomicUsize>);

impl ViolationSink for CountingViolationSink {
    fn on_violation(&self, kind: &str, _detail: &str) {
        assert_eq!(kind, "memory");
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

#[tokio::test]
async fn step_over_memory_limit_aborts_and_always_hook_still_runs() {
    let violations = Arc::new(AtomicUsize::new(0));
    let manager = SandboxManager::new(
        IsolationLevel::Thread,
        DslSecurityPolicy::default_policy(),
        DslResourceLimits {
            max_memory_mb: Some(64),
            ..Default::default()
        },
    )
    .with_violation_sink(Arc::new(CountingViolationSink(violations.clone())));

    // Simulates a step that allocates far beyond the 64MB ceiling; the
    // watermark sampler reports a fixed over-limit reading every 50ms.
    let over_limit_sampler: Arc<dyn Fn() -> u64 + Send + Sync> = Arc::new(|| 4096);

    let always_ran = Arc::new(AtomicUsize::new(0));
    let always_ran_inner = always_ran.clone();

    let result = manager
        .run(CancellationToken::new(), Some(over_limit_sampler), || async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok::<_, PipelineError>(())
        })
        .await;
    // Caller-side `always` cleanup: runs unconditionally regardless of the
    // sandboxed body's outcome, mirroring the pipeline driver's own
    // always-hook discipline.
    always_ran_inner.fetch_add(1, Ordering::SeqCst);

    assert!(matches!(result, Err(PipelineError::MemoryLimitExceeded(_))), "expected MemoryLimitExceeded, got {result:?}");
    assert_eq!(manager.state(), SandboxState::Violated);
    assert_eq!(violations.load(Ordering::SeqCst), 1, "exactly one violation must be reported");
    assert_eq!(always_ran.load(Ordering::SeqCst), 1);
}
