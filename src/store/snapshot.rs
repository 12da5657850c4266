// src/store/snapshot.rs
// =============================================================================
// Progress snapshots: where an interrupted scan stopped.
//
// When the user hits Ctrl-C we write one small JSON file:
//   {"current": "aaaaaaaaac", "start": "aaaaaaaaaa", "end": "aaaaaaaaaz"}
//
// The file name is 32 random hex characters plus ".scanstate", so two
// interrupted runs in the same directory never collide. Resuming reads the
// file and deletes it: each snapshot is good for exactly one resume.
// =============================================================================

use crate::error::{Result, ScanError};
use crate::sequence::{Identifier, ScanBounds};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::info;

pub const SNAPSHOT_SUFFIX: &str = ".scanstate";

/// Where a scan was when it got interrupted.
///
/// `current` is the last identifier handed to a worker (it may not have
/// finished). It is `None` if no identifier had been dequeued yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressState {
    pub current: Option<Identifier>,
    pub start: Identifier,
    pub end: Identifier,
}

impl ProgressState {
    pub fn new(current: Option<Identifier>, bounds: &ScanBounds) -> Self {
        ProgressState {
            current,
            start: bounds.start().clone(),
            end: bounds.end().clone(),
        }
    }

    /// Rebuild the original bounds, checking the saved range still makes sense
    pub fn bounds(&self) -> Result<ScanBounds> {
        let bounds = ScanBounds::new(self.start.clone(), self.end.clone())?;
        if let Some(current) = &self.current {
            if !bounds.contains(current) {
                return Err(ScanError::ResumeOutOfRange {
                    current: current.to_string(),
                    start: self.start.to_string(),
                    end: self.end.to_string(),
                });
            }
        }
        Ok(bounds)
    }
}

/// Saves and loads snapshot files inside one directory.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    dir: PathBuf,
}

impl SnapshotStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        SnapshotStore { dir: dir.into() }
    }

    /// Write `state` under a fresh random name and return the file's path.
    pub fn save(&self, state: &ProgressState) -> Result<PathBuf> {
        let path = self.dir.join(random_name());
        let json = serde_json::to_string(state).map_err(|source| ScanError::SnapshotFormat {
            path: path.clone(),
            source,
        })?;

        fs::write(&path, json).map_err(|e| ScanError::io(&path, e))?;
        info!(path = %path.display(), current = ?state.current, "progress snapshot saved");
        Ok(path)
    }

    /// Read a snapshot and delete it.
    ///
    /// The file is only removed once its contents parsed and validated, so
    /// a bad snapshot is left in place for the user to inspect.
    pub fn load(path: &Path) -> Result<ProgressState> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(ScanError::SnapshotMissing(path.to_path_buf()))
            }
            Err(e) => return Err(ScanError::io(path, e)),
        };

        let state: ProgressState =
            serde_json::from_str(&content).map_err(|source| ScanError::SnapshotFormat {
                path: path.to_path_buf(),
                source,
            })?;
        state.bounds()?;

        fs::remove_file(path).map_err(|e| ScanError::io(path, e))?;
        info!(path = %path.display(), current = ?state.current, "progress snapshot consumed");
        Ok(state)
    }
}

// 32 lowercase hex characters + the fixed suffix
fn random_name() -> String {
    format!("{:032x}{SNAPSHOT_SUFFIX}", rand::random::<u128>())
}
