// src/scan/mod.rs
// =============================================================================
// This module runs a scan.
//
// Submodules:
// - config: ScanConfig and the shipped defaults
// - coordinator: the Scanner, which owns the queue, workers and snapshots
// - worker: the probe loop each worker runs, plus the run counters
// =============================================================================

mod config;
mod coordinator;
mod worker;

pub use config::{
    ScanConfig, DEFAULT_BASE_URL, DEFAULT_ID_WIDTH, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT,
    DEFAULT_WORKERS,
};
pub use coordinator::{ScanOutcome, ScanPlan, Scanner};
pub use worker::ScanReport;
