// src/scan/coordinator.rs
// =============================================================================
// The scan coordinator: runs one scan from start to finish.
//
// How it works:
// 1. Build a Sequencer for the plan (fresh range, or resuming after a saved
//    identifier)
// 2. A producer task pushes identifiers, in order, into a bounded channel
// 3. N workers share the receiving end and probe whatever they pull
// 4. Either every worker finishes (Completed: one last flush), or the
//    cancel token fires (Interrupted: save a snapshot of the last dispatched
//    identifier and abandon the in-flight probes)
//
// The bounded channel keeps memory flat no matter how large the range is;
// the producer just waits whenever the workers fall behind.
//
// Workers finish in whatever order the network allows, so discoveries are
// written out of sequence. Only the final file's completeness matters.
// =============================================================================

use super::config::ScanConfig;
use super::worker::{ScanReport, ScanStats, SharedQueue, Worker};
use crate::checker::Prober;
use crate::error::{Result, ScanError};
use crate::sequence::{Identifier, ScanBounds, Sequencer};
use crate::store::{DiscoveryStore, ProgressState, SnapshotStore};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

// Channel capacity per worker; enough to keep everyone busy
const QUEUE_SLOTS_PER_WORKER: usize = 4;

/// What to scan: a range, plus where to pick up if we are resuming
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanPlan {
    pub bounds: ScanBounds,
    pub resume_after: Option<Identifier>,
}

impl ScanPlan {
    pub fn fresh(bounds: ScanBounds) -> Self {
        ScanPlan {
            bounds,
            resume_after: None,
        }
    }

    pub fn resume(state: ProgressState) -> Result<Self> {
        Ok(ScanPlan {
            bounds: state.bounds()?,
            resume_after: state.current,
        })
    }

    fn sequencer(&self) -> Result<Sequencer> {
        match &self.resume_after {
            Some(current) => Sequencer::resume_after(&self.bounds, current),
            None => Ok(Sequencer::new(&self.bounds)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    /// Every identifier in the plan was probed
    Completed(ScanReport),
    /// Stopped early; `snapshot` is the file to resume from
    Interrupted {
        snapshot: PathBuf,
        report: ScanReport,
    },
}

pub struct Scanner {
    config: Arc<ScanConfig>,
    prober: Prober,
    store: Arc<Mutex<DiscoveryStore>>,
    snapshots: SnapshotStore,
}

impl Scanner {
    /// Build the HTTP client and load the existing discovery file.
    pub fn new(config: ScanConfig) -> Result<Self> {
        let prober = Prober::new(&config.user_agent, config.timeout)?;
        let store = DiscoveryStore::open(&config.discovery_path)?;
        let snapshots = SnapshotStore::new(&config.state_dir);

        Ok(Scanner {
            config: Arc::new(config),
            prober,
            store: Arc::new(Mutex::new(store)),
            snapshots,
        })
    }

    pub async fn discovery_count(&self) -> usize {
        self.store.lock().await.count()
    }

    /// Run `plan` until it completes or `cancel` fires.
    ///
    /// Cancellation is not an error: it returns
    /// [`ScanOutcome::Interrupted`] once the snapshot is on disk. Errors are
    /// persistence failures from a worker or while saving the snapshot.
    pub async fn run(&self, plan: ScanPlan, cancel: CancellationToken) -> Result<ScanOutcome> {
        let sequencer = plan.sequencer()?;
        let workers = self.config.workers.max(1);

        info!(
            start = %plan.bounds.start(),
            end = %plan.bounds.end(),
            resume_after = ?plan.resume_after,
            remaining = ?sequencer.remaining(),
            workers,
            "scan starting"
        );

        // Workers watch a child token: a worker can stop the pool on a fatal
        // error without that looking like a user interrupt
        let stop = cancel.child_token();

        let (tx, rx) = mpsc::channel(workers * QUEUE_SLOTS_PER_WORKER);
        let producer = tokio::spawn(feed_queue(sequencer, tx, stop.clone()));
        let queue: SharedQueue = Arc::new(Mutex::new(rx));

        // Seeded with the resume point so an interrupt before the first
        // dequeue still saves the right place
        let (last_tx, _) = watch::channel(plan.resume_after.clone());
        let last_dispatched = Arc::new(last_tx);
        let stats = Arc::new(ScanStats::default());

        let handles: Vec<JoinHandle<Result<()>>> = (0..workers)
            .map(|id| {
                let worker = Worker {
                    id,
                    config: Arc::clone(&self.config),
                    prober: self.prober.clone(),
                    queue: Arc::clone(&queue),
                    store: Arc::clone(&self.store),
                    last_dispatched: Arc::clone(&last_dispatched),
                    stats: Arc::clone(&stats),
                    stop: stop.clone(),
                };
                tokio::spawn(worker.run())
            })
            .collect();
        let aborts: Vec<_> = handles.iter().map(JoinHandle::abort_handle).collect();

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                // In-flight probes are abandoned, not awaited
                for handle in &aborts {
                    handle.abort();
                }
                producer.abort();

                let current = last_dispatched.borrow().clone();
                let state = ProgressState::new(current, &plan.bounds);
                let snapshot = self.snapshots.save(&state)?;
                warn!(snapshot = %snapshot.display(), "scan interrupted");

                Ok(ScanOutcome::Interrupted {
                    snapshot,
                    report: stats.report(),
                })
            }
            joined = join_workers(handles) => {
                producer.abort();
                joined?;

                let store = self.store.lock().await;
                store.flush()?;

                let report = stats.report();
                info!(
                    probed = report.probed,
                    accepted = report.accepted,
                    restricted = report.restricted,
                    discoveries = store.count(),
                    "scan completed"
                );
                Ok(ScanOutcome::Completed(report))
            }
        }
    }
}

// Feeds the queue in Sequencer order. Dropping `tx` at the end closes the
// channel, which is how the workers learn the range is exhausted.
async fn feed_queue(sequencer: Sequencer, tx: mpsc::Sender<Identifier>, stop: CancellationToken) {
    for id in sequencer {
        tokio::select! {
            biased;
            _ = stop.cancelled() => break,
            sent = tx.send(id) => {
                if sent.is_err() {
                    break;
                }
            }
        }
    }
}

async fn join_workers(handles: Vec<JoinHandle<Result<()>>>) -> Result<()> {
    for joined in futures::future::join_all(handles).await {
        joined.map_err(|e| ScanError::Worker(e.to_string()))??;
    }
    Ok(())
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What is an mpsc channel?
//    - "Multi-producer, single-consumer": senders push, one receiver pulls
//    - The channel is bounded, so the feeder waits when workers fall behind
//    - Workers share the single receiver through Arc<Mutex<..>>
//
// 2. What is a watch channel?
//    - Holds exactly one value, the latest one sent
//    - Workers overwrite it with each identifier they take
//    - On Ctrl-C we read it once to know where to resume
//
// 3. What is a CancellationToken?
//    - A flag that many tasks can wait on with .cancelled().await
//    - child_token() gives workers a token we can cancel without touching
//      the caller's one
//
// 4. What does tokio::select! do?
//    - Waits on several futures and runs the branch of whichever finishes first
//    - `biased;` checks the branches in order, so cancellation wins ties
// -----------------------------------------------------------------------------
