// src/store/mod.rs
// =============================================================================
// Everything that touches the disk.
//
// Submodules:
// - discovery: the valid_urls.json mapping, flushed after every find
// - snapshot: the one-shot resume files written on interruption
// =============================================================================

mod discovery;
mod snapshot;

pub use discovery::{DiscoveryStore, DEFAULT_DISCOVERY_FILE};
pub use snapshot::{ProgressState, SnapshotStore};
