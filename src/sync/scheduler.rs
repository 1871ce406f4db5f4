//! Periodic synchronization of the assignment backlog to the reporting sink.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::core::coordinator::Engine;
use crate::sync::sink::ReportSink;

/// Background task pushing drained backlog batches to the reporting sink.
///
/// The engine lock is held only for the drain and for a restore after a
/// failed delivery, never across the network call. A failed batch is
/// prepended back onto the backlog, so delivery is at-least-once for the
/// life of the process.
pub struct SyncScheduler {
    engine: Arc<Mutex<Engine>>,
    sink: Arc<dyn ReportSink>,
    interval: Duration,
    shutdown_tx: broadcast::Sender<()>,
    handle: Option<JoinHandle<()>>,
}

impl SyncScheduler {
    /// Create a scheduler over the shared engine.
    pub fn new(engine: Arc<Mutex<Engine>>, sink: Arc<dyn ReportSink>, interval: Duration) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        Self {
            engine,
            sink,
            interval,
            shutdown_tx,
            handle: None,
        }
    }

    /// Spawn the timer loop on the current tokio runtime.
    pub fn start(&mut self) {
        let engine = Arc::clone(&self.engine);
        let sink = Arc::clone(&self.sink);
        let interval = self.interval;
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        Self::run_once(&engine, sink.as_ref()).await;
                    }
                    _ = shutdown_rx.recv() => {
                        tracing::info!("sync scheduler shutting down");
                        break;
                    }
                }
            }
        });
        self.handle = Some(handle);
    }

    /// Run one synchronization pass immediately (also used by tests to make
    /// ticks deterministic).
    pub async fn sync_now(&self) {
        Self::run_once(&self.engine, self.sink.as_ref()).await;
    }

    /// Signal the loop to stop and wait for it to finish.
    pub async fn shutdown(mut self) {
        self.shutdown_tx.send(()).ok();
        if let Some(handle) = self.handle.take() {
            if let Err(error) = handle.await {
                tracing::error!(%error, "sync scheduler task join failed");
            }
        }
    }

    async fn run_once(engine: &Arc<Mutex<Engine>>, sink: &dyn ReportSink) {
        let batch = { engine.lock().ledger.drain_backlog() };
        if batch.is_empty() {
            return;
        }

        tracing::info!(count = batch.len(), "pushing assignment batch to sink");
        match sink.deliver(&batch).await {
            Ok(()) => {
                tracing::info!(count = batch.len(), "sink accepted batch");
            }
            Err(error) => {
                tracing::error!(%error, count = batch.len(), "sink delivery failed, batch retained");
                engine.lock().ledger.restore_backlog(batch);
            }
        }
    }
}
