// src/error.rs
// =============================================================================
// Error types for the scan engine.
//
// Three kinds of failure matter to the caller:
// - Argument errors: bad bounds, bad identifiers, a missing snapshot. These are
//   the user's fault, nothing has been written yet, and main() prints usage.
// - Persistence errors: the discovery file or a snapshot could not be read or
//   written. These are fatal.
// - Setup errors: the HTTP client or base URL could not be built.
//
// Transport errors during a probe are NOT here: a failed probe is just a
// Rejected verdict (see checker::http).
// =============================================================================

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScanError {
    /// The value is not a non-empty lowercase a-z identifier
    #[error("invalid identifier '{value}': {reason}")]
    InvalidIdentifier { value: String, reason: &'static str },

    /// A fresh run was given a bound of the wrong length
    #[error("identifier '{value}' must be exactly {expected} characters long")]
    WrongWidth { value: String, expected: usize },

    /// Start and end bounds differ in length
    #[error("bounds must have the same width (start is {start}, end is {end})")]
    WidthMismatch { start: usize, end: usize },

    /// Start sorts after end
    #[error("start bound '{start}' comes after end bound '{end}'")]
    ReversedBounds { start: String, end: String },

    /// A resume point that cannot belong to the saved range
    #[error("resume point '{current}' is outside {start}..={end}")]
    ResumeOutOfRange {
        current: String,
        start: String,
        end: String,
    },

    #[error("snapshot file {} does not exist", .0.display())]
    SnapshotMissing(PathBuf),

    #[error("snapshot {} is malformed: {source}", .path.display())]
    SnapshotFormat {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("discovery file {} is not a key/verdict mapping: {source}", .path.display())]
    DiscoveryFormat {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("I/O error on {}: {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },

    #[error("invalid base URL '{url}': {source}")]
    BaseUrl {
        url: String,
        source: url::ParseError,
    },

    #[error("could not build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("worker task failed: {0}")]
    Worker(String),
}

impl ScanError {
    // Shorthand for the many places that wrap an io::Error with its path
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        ScanError::Io {
            path: path.into(),
            source,
        }
    }

    /// True for errors caused by how the program was invoked.
    ///
    /// main() answers these with the usage text and exit code 1.
    pub fn is_usage(&self) -> bool {
        matches!(
            self,
            ScanError::InvalidIdentifier { .. }
                | ScanError::WrongWidth { .. }
                | ScanError::WidthMismatch { .. }
                | ScanError::ReversedBounds { .. }
                | ScanError::ResumeOutOfRange { .. }
                | ScanError::SnapshotMissing(_)
                | ScanError::SnapshotFormat { .. }
                | ScanError::BaseUrl { .. }
        )
    }
}

pub type Result<T, E = ScanError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_errors_are_flagged() {
        let err = ScanError::WidthMismatch { start: 3, end: 4 };
        assert!(err.is_usage());

        let err = ScanError::SnapshotMissing(PathBuf::from("gone.scanstate"));
        assert!(err.is_usage());
        assert!(err.to_string().contains("gone.scanstate"));
    }

    #[test]
    fn test_persistence_errors_are_not_usage() {
        let err = ScanError::io(
            "valid_urls.json",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(!err.is_usage());
        assert!(err.to_string().contains("valid_urls.json"));
    }
}
