// src/scan/config.rs
// =============================================================================
// All the knobs of a scan in one struct, with the defaults we ship.
//
// main() builds a ScanConfig from the command line; tests build one directly
// and point it at a mock server.
// =============================================================================

use crate::checker::ClassifyRules;
use crate::error::{Result, ScanError};
use crate::sequence::Identifier;
use crate::store::DEFAULT_DISCOVERY_FILE;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://comicstud.io/c/";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/58.0.3029.110 Safari/537.3";
pub const DEFAULT_WORKERS: usize = 10;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_ID_WIDTH: usize = 10;

#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Always ends in '/', the identifier is appended directly
    base_url: String,
    pub user_agent: String,
    /// Number of concurrent probe workers, at least 1
    pub workers: usize,
    /// Per-request timeout, redirects included
    pub timeout: Duration,
    pub discovery_path: PathBuf,
    /// Directory snapshot files are written to
    pub state_dir: PathBuf,
    /// Width both bounds of a fresh run must have
    pub id_width: usize,
    pub rules: ClassifyRules,
}

impl Default for ScanConfig {
    fn default() -> Self {
        ScanConfig {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            workers: DEFAULT_WORKERS,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            discovery_path: PathBuf::from(DEFAULT_DISCOVERY_FILE),
            state_dir: PathBuf::from("."),
            id_width: DEFAULT_ID_WIDTH,
            rules: ClassifyRules::default(),
        }
    }
}

impl ScanConfig {
    /// Replace the base URL, validating it and adding a trailing '/'.
    pub fn with_base_url(mut self, base_url: &str) -> Result<Self> {
        let parsed = Url::parse(base_url).map_err(|source| ScanError::BaseUrl {
            url: base_url.to_string(),
            source,
        })?;

        let mut normalized = parsed.to_string();
        if !normalized.ends_with('/') {
            normalized.push('/');
        }

        self.base_url = normalized;
        Ok(self)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // <base>/<identifier>
    pub fn probe_url(&self, id: &Identifier) -> String {
        format!("{}{}", self.base_url, id)
    }
}
