//! Scheduler and sink behavior: delivery, failure retention, ordering.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use parking_lot::Mutex;
use prometheus_allotment::core::ledger::{AssignmentLedger, AssignmentRecord};
use prometheus_allotment::core::pool::{Slot, SlotPool};
use prometheus_allotment::core::{AllotError, Claim, Coordinator, Engine};
use prometheus_allotment::infra::assignment_log::AssignmentLog;
use prometheus_allotment::infra::roster::RequesterRegistry;
use prometheus_allotment::infra::state_log::StateLog;
use prometheus_allotment::sync::{ReportSink, SyncScheduler};
use tempfile::TempDir;

/// Sink double: records every attempted batch, accepts or rejects on a flag.
struct RecordingSink {
    accept: AtomicBool,
    batches: Mutex<Vec<Vec<AssignmentRecord>>>,
}

impl RecordingSink {
    fn new(accept: bool) -> Self {
        Self {
            accept: AtomicBool::new(accept),
            batches: Mutex::new(Vec::new()),
        }
    }

    fn attempts(&self) -> Vec<Vec<AssignmentRecord>> {
        self.batches.lock().clone()
    }
}

#[async_trait]
impl ReportSink for RecordingSink {
    async fn deliver(&self, batch: &[AssignmentRecord]) -> Result<(), AllotError> {
        self.batches.lock().push(batch.to_vec());
        if self.accept.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(AllotError::SinkRejected("error".to_string()))
        }
    }
}

fn engine_with_assignments(dir: &TempDir, count: u64) -> Arc<Mutex<Engine>> {
    let roster: Vec<Slot> = (1..=count + 1)
        .map(|id| Slot {
            id,
            label: format!("mentor-{id}"),
            payload: format!("code-{id}"),
        })
        .collect();
    let state_log = StateLog::open(dir.path().join("state.log")).unwrap();
    let pool = SlotPool::recover(roster, state_log).unwrap();
    let assignment_log = AssignmentLog::open(dir.path().join("assignments.csv")).unwrap();
    let ledger = AssignmentLedger::recover(assignment_log).unwrap();
    let engine = Arc::new(Mutex::new(Engine { pool, ledger }));

    let registry = RequesterRegistry::from_entries(
        (0..count).map(|i| (100 + i, format!("Requester {i}"))),
    );
    let coordinator = Coordinator::new(registry, engine.clone());
    let at = Utc.with_ymd_and_hms(2026, 8, 5, 12, 0, 0).unwrap();
    for i in 0..count {
        let claim = Claim {
            identifier: (100 + i).to_string(),
            display_name: format!("Requester {i}"),
        };
        coordinator.allot(1, &claim, at).unwrap();
    }
    engine
}

#[tokio::test]
async fn failing_sink_retains_backlog() {
    let dir = tempfile::tempdir().unwrap();
    let engine = engine_with_assignments(&dir, 2);
    assert_eq!(engine.lock().ledger.backlog_len(), 2);

    let sink = Arc::new(RecordingSink::new(false));
    let scheduler = SyncScheduler::new(engine.clone(), sink.clone(), Duration::from_secs(30));

    scheduler.sync_now().await;
    scheduler.sync_now().await;

    // No loss and no duplication: both ticks saw the same two records.
    assert_eq!(engine.lock().ledger.backlog_len(), 2);
    let attempts = sink.attempts();
    assert_eq!(attempts.len(), 2);
    assert_eq!(attempts[0].len(), 2);
    assert_eq!(attempts[0], attempts[1]);
}

#[tokio::test]
async fn accepting_sink_drains_backlog() {
    let dir = tempfile::tempdir().unwrap();
    let engine = engine_with_assignments(&dir, 2);

    let sink = Arc::new(RecordingSink::new(true));
    let scheduler = SyncScheduler::new(engine.clone(), sink.clone(), Duration::from_secs(30));

    scheduler.sync_now().await;
    assert_eq!(engine.lock().ledger.backlog_len(), 0);
    assert_eq!(sink.attempts().len(), 1);

    // An empty backlog produces no request at all.
    scheduler.sync_now().await;
    assert_eq!(sink.attempts().len(), 1);
}

#[tokio::test]
async fn recovery_after_sink_outage_delivers_everything_once() {
    let dir = tempfile::tempdir().unwrap();
    let engine = engine_with_assignments(&dir, 3);

    let sink = Arc::new(RecordingSink::new(false));
    let scheduler = SyncScheduler::new(engine.clone(), sink.clone(), Duration::from_secs(30));

    scheduler.sync_now().await;
    assert_eq!(engine.lock().ledger.backlog_len(), 3);

    sink.accept.store(true, Ordering::SeqCst);
    scheduler.sync_now().await;
    assert_eq!(engine.lock().ledger.backlog_len(), 0);

    let attempts = sink.attempts();
    assert_eq!(attempts.len(), 2);
    // The retried batch is the original one, in the original order.
    assert_eq!(attempts[0], attempts[1]);
}

#[tokio::test(flavor = "multi_thread")]
async fn interval_loop_pushes_batches() {
    let dir = tempfile::tempdir().unwrap();
    let engine = engine_with_assignments(&dir, 1);

    let sink = Arc::new(RecordingSink::new(true));
    let mut scheduler =
        SyncScheduler::new(engine.clone(), sink.clone(), Duration::from_millis(20));
    scheduler.start();

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(engine.lock().ledger.backlog_len(), 0);
    assert!(!sink.attempts().is_empty());

    scheduler.shutdown().await;
}
