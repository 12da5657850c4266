// src/scan/worker.rs
// =============================================================================
// One probe worker.
//
// Each worker loops:
// 1. Take the next identifier from the shared queue
// 2. Publish it as the "last dispatched" identifier (read on Ctrl-C)
// 3. Probe <base>/<identifier>
// 4. Classify; on a discovery, insert into the store and flush to disk
//
// It stops when the queue is closed and empty, or as soon as the stop token
// fires. Step 4 finishes before the next dequeue, so a discovery is on disk
// before its worker moves on.
// =============================================================================

use super::config::ScanConfig;
use crate::checker::{ProbeOutcome, Prober, Verdict};
use crate::error::Result;
use crate::sequence::Identifier;
use crate::store::DiscoveryStore;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, watch, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub(super) type SharedQueue = Arc<Mutex<mpsc::Receiver<Identifier>>>;

/// Counters for one scan run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanReport {
    pub probed: u64,
    pub accepted: u64,
    pub restricted: u64,
    pub rejected: u64,
    /// Subset of `rejected` that never got an HTTP response
    pub transport_failures: u64,
}

#[derive(Debug, Default)]
pub(super) struct ScanStats {
    probed: AtomicU64,
    accepted: AtomicU64,
    restricted: AtomicU64,
    rejected: AtomicU64,
    transport_failures: AtomicU64,
}

impl ScanStats {
    fn record(&self, outcome: &ProbeOutcome, verdict: Verdict) {
        self.probed.fetch_add(1, Ordering::Relaxed);
        let counter = match verdict {
            Verdict::Accepted => &self.accepted,
            Verdict::AccessRestricted => &self.restricted,
            Verdict::Rejected => &self.rejected,
        };
        counter.fetch_add(1, Ordering::Relaxed);

        if matches!(outcome, ProbeOutcome::Transport { .. }) {
            self.transport_failures.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub(super) fn report(&self) -> ScanReport {
        ScanReport {
            probed: self.probed.load(Ordering::Relaxed),
            accepted: self.accepted.load(Ordering::Relaxed),
            restricted: self.restricted.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            transport_failures: self.transport_failures.load(Ordering::Relaxed),
        }
    }
}

pub(super) struct Worker {
    pub id: usize,
    pub config: Arc<ScanConfig>,
    pub prober: Prober,
    pub queue: SharedQueue,
    pub store: Arc<Mutex<DiscoveryStore>>,
    pub last_dispatched: Arc<watch::Sender<Option<Identifier>>>,
    pub stats: Arc<ScanStats>,
    pub stop: CancellationToken,
}

impl Worker {
    pub(super) async fn run(self) -> Result<()> {
        let result = self.drain().await;

        // A failed flush must not leave the other workers probing
        if let Err(e) = &result {
            warn!(worker = self.id, error = %e, "worker stopping the scan");
            self.stop.cancel();
        }

        result
    }

    async fn drain(&self) -> Result<()> {
        loop {
            let next = tokio::select! {
                biased;
                _ = self.stop.cancelled() => return Ok(()),
                next = self.next_identifier() => next,
            };

            // Queue closed and empty: the range is done
            let Some(id) = next else {
                debug!(worker = self.id, "queue drained");
                return Ok(());
            };

            self.last_dispatched.send_replace(Some(id.clone()));

            let url = self.config.probe_url(&id);
            let outcome = tokio::select! {
                biased;
                _ = self.stop.cancelled() => return Ok(()),
                outcome = self.prober.probe(url) => outcome,
            };

            self.record(&outcome).await?;
        }
    }

    async fn next_identifier(&self) -> Option<Identifier> {
        self.queue.lock().await.recv().await
    }

    async fn record(&self, outcome: &ProbeOutcome) -> Result<()> {
        let found = self.config.rules.evaluate(outcome);
        let verdict = found.as_ref().map_or(Verdict::Rejected, |d| d.verdict);
        self.stats.record(outcome, verdict);

        let url = outcome.requested_url();
        match (&found, outcome) {
            (Some(d), _) if d.verdict == Verdict::Accepted => {
                info!(worker = self.id, %url, final_url = %d.final_url, key = %d.key, "valid");
            }
            (Some(d), _) => {
                info!(worker = self.id, %url, final_url = %d.final_url, key = %d.key, "restricted");
            }
            (None, ProbeOutcome::Transport { failure, .. }) => {
                warn!(worker = self.id, %url, error = %failure, "probe failed");
            }
            (None, _) => {
                debug!(
                    worker = self.id,
                    %url,
                    final_url = ?outcome.final_url(),
                    status = ?outcome.status(),
                    "invalid"
                );
            }
        }

        if let Some(d) = found {
            let mut store = self.store.lock().await;
            if let Some(previous) = store.get(&d.key) {
                debug!(worker = self.id, key = %d.key, ?previous, "key already recorded, overwriting");
            }
            store.insert(d.key, d.verdict);
            store.flush()?;
        }

        Ok(())
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why AtomicU64 for the counters?
//    - Several workers bump the same counters at once
//    - fetch_add is safe across threads without taking a lock
//    - Ordering::Relaxed is enough: we only need the totals at the end
//
// 2. Why tokio::sync::Mutex and not std::sync::Mutex?
//    - The guard is held across .await (waiting on the queue)
//    - A tokio Mutex yields to other tasks instead of blocking the thread
//
// 3. What does the ? after flush() do?
//    - If writing the file fails, the error is returned from record()
//    - run() then cancels the stop token so the other workers stop too
// -----------------------------------------------------------------------------
