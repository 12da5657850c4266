// src/store/discovery.rs
// =============================================================================
// The discovery store: canonical key -> verdict code, mirrored to a JSON file.
//
// File format (pretty-printed, keys sorted):
//   {
//     "abcd123456": 1,
//     "qwer987654": 2
//   }
//
// 1 = Accepted, 2 = AccessRestricted. The file is rewritten in full on every
// flush. We write to a sibling temp file and rename it over the target, so a
// crash mid-write leaves the previous version intact.
// =============================================================================

use crate::checker::Verdict;
use crate::error::{Result, ScanError};
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const DEFAULT_DISCOVERY_FILE: &str = "valid_urls.json";

#[derive(Debug)]
pub struct DiscoveryStore {
    path: PathBuf,
    entries: BTreeMap<String, u8>,
}

impl DiscoveryStore {
    /// Open the store at `path`, loading whatever an earlier run left there.
    ///
    /// A missing file means an empty store. A file that exists but is not a
    /// key -> 1|2 object is an error; we never paper over it.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        let entries = match fs::read_to_string(&path) {
            Ok(content) => parse_entries(&path, &content)?,
            Err(e) if e.kind() == ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(ScanError::io(&path, e)),
        };

        debug!(path = %path.display(), entries = entries.len(), "discovery store opened");
        Ok(DiscoveryStore { path, entries })
    }

    /// Record a verdict for `key`, replacing any earlier one.
    ///
    /// Returns false (and stores nothing) for Rejected, which has no code.
    pub fn insert(&mut self, key: impl Into<String>, verdict: Verdict) -> bool {
        match verdict.code() {
            Some(code) => {
                self.entries.insert(key.into(), code);
                true
            }
            None => false,
        }
    }

    /// Write the whole mapping to disk, replacing the previous file.
    pub fn flush(&self) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.entries).map_err(|source| {
            ScanError::DiscoveryFormat {
                path: self.path.clone(),
                source,
            }
        })?;

        let tmp = temp_path(&self.path);
        fs::write(&tmp, json).map_err(|e| ScanError::io(&tmp, e))?;
        fs::rename(&tmp, &self.path).map_err(|e| ScanError::io(&self.path, e))?;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<Verdict> {
        self.entries.get(key).copied().and_then(Verdict::from_code)
    }

    /// Number of recorded keys
    pub fn count(&self) -> usize {
        self.entries.len()
    }
}

fn parse_entries(path: &Path, content: &str) -> Result<BTreeMap<String, u8>> {
    let entries: BTreeMap<String, u8> =
        serde_json::from_str(content).map_err(|source| ScanError::DiscoveryFormat {
            path: path.to_path_buf(),
            source,
        })?;

    // Only 1 and 2 are meaningful codes
    if let Some((key, code)) = entries.iter().find(|(_, c)| Verdict::from_code(**c).is_none()) {
        let source: serde_json::Error =
            serde::de::Error::custom(format!("key '{key}' has unknown verdict {code}"));
        return Err(ScanError::DiscoveryFormat {
            path: path.to_path_buf(),
            source,
        });
    }

    Ok(entries)
}

// valid_urls.json -> valid_urls.json.tmp, in the same directory so rename()
// stays on one filesystem
fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_opens_empty() {
        let dir = tempdir().unwrap();
        let store = DiscoveryStore::open(dir.path().join("valid_urls.json")).unwrap();
        assert_eq!(store.count(), 0);
    }

    #[test]
    fn test_overwrite_is_last_write_wins() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("valid_urls.json");

        let mut store = DiscoveryStore::open(&path).unwrap();
        store.insert("k1", Verdict::Accepted);
        store.flush().unwrap();
        store.insert("k1", Verdict::AccessRestricted);
        store.flush().unwrap();

        let reloaded = DiscoveryStore::open(&path).unwrap();
        assert_eq!(reloaded.count(), 1);
        assert_eq!(reloaded.get("k1"), Some(Verdict::AccessRestricted));

        let raw: BTreeMap<String, u8> =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw.get("k1"), Some(&2));
    }

    #[test]
    fn test_rejected_is_not_stored() {
        let dir = tempdir().unwrap();
        let mut store = DiscoveryStore::open(dir.path().join("d.json")).unwrap();
        assert!(!store.insert("k1", Verdict::Rejected));
        assert_eq!(store.count(), 0);
    }

    #[test]
    fn test_reopen_merges_with_previous_run() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("valid_urls.json");
        fs::write(&path, r#"{ "old0000001": 1 }"#).unwrap();

        let mut store = DiscoveryStore::open(&path).unwrap();
        store.insert("new0000002", Verdict::AccessRestricted);
        store.flush().unwrap();

        let reloaded = DiscoveryStore::open(&path).unwrap();
        assert_eq!(reloaded.get("old0000001"), Some(Verdict::Accepted));
        assert_eq!(reloaded.get("new0000002"), Some(Verdict::AccessRestricted));
        assert!(!temp_path(&path).exists());
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("valid_urls.json");

        fs::write(&path, "not json").unwrap();
        let err = DiscoveryStore::open(&path).unwrap_err();
        assert!(matches!(err, ScanError::DiscoveryFormat { .. }));

        fs::write(&path, r#"{ "k": 7 }"#).unwrap();
        assert!(DiscoveryStore::open(&path).is_err());
    }

    #[test]
    fn test_flush_into_missing_directory_fails() {
        let dir = tempdir().unwrap();
        let mut store = DiscoveryStore::open(dir.path().join("nope/valid_urls.json")).unwrap();
        store.insert("k1", Verdict::Accepted);

        let err = store.flush().unwrap_err();
        assert!(matches!(err, ScanError::Io { .. }));
        assert!(!err.is_usage());
    }
}
