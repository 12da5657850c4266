// src/checker/classify.rs
// =============================================================================
// This module decides what a probe outcome means.
//
// The rules, in order:
// - HTTP 403 -> AccessRestricted (whatever the final URL is)
// - HTTP 200, we were redirected, and the final URL points at the content
//   host -> Accepted
// - everything else, including transport failures -> Rejected
//
// For Accepted and AccessRestricted outcomes we also derive the canonical
// key: the final URL minus its file extension, cut down to its last 10
// characters. That key is what ends up in the discovery file.
// =============================================================================

use super::http::ProbeOutcome;
use tracing::warn;

/// Substring every real content URL contains
pub const DEFAULT_CONTENT_MARKER: &str = "https://cdn.comic.studio/comics";
/// Extension stripped before the key is cut
pub const DEFAULT_STRIP_SUFFIX: &str = ".png";
pub const CANONICAL_KEY_LEN: usize = 10;

/// Tri-state classification of a probe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verdict {
    Rejected,
    Accepted,
    AccessRestricted,
}

impl Verdict {
    /// Integer tag written to the discovery file; Rejected has none.
    pub fn code(self) -> Option<u8> {
        match self {
            Verdict::Rejected => None,
            Verdict::Accepted => Some(1),
            Verdict::AccessRestricted => Some(2),
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Verdict::Accepted),
            2 => Some(Verdict::AccessRestricted),
            _ => None,
        }
    }

    pub fn is_discovery(self) -> bool {
        self.code().is_some()
    }
}

/// An Accepted or AccessRestricted probe, ready for the discovery store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Discovery {
    pub key: String,
    pub verdict: Verdict,
    pub final_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifyRules {
    pub content_marker: String,
    pub strip_suffix: String,
    pub key_len: usize,
}

impl Default for ClassifyRules {
    fn default() -> Self {
        ClassifyRules {
            content_marker: DEFAULT_CONTENT_MARKER.to_string(),
            strip_suffix: DEFAULT_STRIP_SUFFIX.to_string(),
            key_len: CANONICAL_KEY_LEN,
        }
    }
}

impl ClassifyRules {
    pub fn classify(&self, outcome: &ProbeOutcome) -> Verdict {
        match outcome {
            ProbeOutcome::Transport { .. } => Verdict::Rejected,
            ProbeOutcome::Response { status: 403, .. } => Verdict::AccessRestricted,
            ProbeOutcome::Response {
                requested_url,
                final_url,
                status: 200,
            } if final_url != requested_url && final_url.contains(&self.content_marker) => {
                Verdict::Accepted
            }
            ProbeOutcome::Response { .. } => Verdict::Rejected,
        }
    }

    /// Strip the extension (if present) and keep the last `key_len` chars.
    ///
    /// A URL with fewer than `key_len` characters left yields the whole
    /// remainder as a shorter key.
    pub fn canonical_key(&self, final_url: &str) -> String {
        let trimmed = final_url
            .strip_suffix(self.strip_suffix.as_str())
            .unwrap_or(final_url);

        if self.key_len == 0 {
            return String::new();
        }

        // Walk back by chars, not bytes, so we never split a code point
        let start = trimmed
            .char_indices()
            .rev()
            .nth(self.key_len - 1)
            .map_or(0, |(i, _)| i);

        trimmed[start..].to_string()
    }

    // Classification plus key derivation in one step, for the workers
    pub fn evaluate(&self, outcome: &ProbeOutcome) -> Option<Discovery> {
        let verdict = self.classify(outcome);
        if !verdict.is_discovery() {
            return None;
        }

        // A discovery always came with a response, so the final URL exists
        let final_url = outcome.final_url()?.to_string();
        let key = self.canonical_key(&final_url);
        if key.chars().count() < self.key_len {
            warn!(%final_url, %key, "final URL is shorter than a full key, keeping it as is");
        }

        Some(Discovery {
            key,
            verdict,
            final_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::http::TransportFailure;

    const REQUESTED: &str = "https://comicstud.io/c/aaaaaaaaaa";

    fn response(final_url: &str, status: u16) -> ProbeOutcome {
        ProbeOutcome::Response {
            requested_url: REQUESTED.to_string(),
            final_url: final_url.to_string(),
            status,
        }
    }

    #[test]
    fn test_redirect_to_content_host_is_accepted() {
        let rules = ClassifyRules::default();
        let outcome = response("https://cdn.comic.studio/comics/xyz123.png", 200);
        assert_eq!(rules.classify(&outcome), Verdict::Accepted);
    }

    #[test]
    fn test_403_is_restricted_regardless_of_url() {
        let rules = ClassifyRules::default();
        assert_eq!(
            rules.classify(&response(REQUESTED, 403)),
            Verdict::AccessRestricted
        );
        assert_eq!(
            rules.classify(&response("https://elsewhere.example/x", 403)),
            Verdict::AccessRestricted
        );
    }

    #[test]
    fn test_200_without_redirect_is_rejected() {
        let rules = ClassifyRules::default();
        assert_eq!(rules.classify(&response(REQUESTED, 200)), Verdict::Rejected);
    }

    #[test]
    fn test_redirect_off_content_host_is_rejected() {
        let rules = ClassifyRules::default();
        let outcome = response("https://comicstud.io/404", 200);
        assert_eq!(rules.classify(&outcome), Verdict::Rejected);
    }

    #[test]
    fn test_other_statuses_are_rejected() {
        let rules = ClassifyRules::default();
        let url = "https://cdn.comic.studio/comics/abcd123456.png";
        for status in [201, 301, 404, 500] {
            assert_eq!(rules.classify(&response(url, status)), Verdict::Rejected);
        }
    }

    #[test]
    fn test_transport_failure_is_rejected_without_key() {
        let rules = ClassifyRules::default();
        let outcome = ProbeOutcome::Transport {
            requested_url: REQUESTED.to_string(),
            failure: TransportFailure::Timeout,
        };
        assert_eq!(rules.classify(&outcome), Verdict::Rejected);
        assert_eq!(rules.evaluate(&outcome), None);
    }

    #[test]
    fn test_canonical_key_strips_extension() {
        let rules = ClassifyRules::default();
        assert_eq!(
            rules.canonical_key("https://cdn.comic.studio/comics/abcd123456.png"),
            "abcd123456"
        );
    }

    #[test]
    fn test_canonical_key_without_extension() {
        let rules = ClassifyRules::default();
        assert_eq!(
            rules.canonical_key("https://cdn.comic.studio/comics/zzabcd123456"),
            "abcd123456"
        );
    }

    #[test]
    fn test_canonical_key_short_input_keeps_everything() {
        let rules = ClassifyRules::default();
        assert_eq!(rules.canonical_key("ab12.png"), "ab12");
    }

    #[test]
    fn test_evaluate_builds_discovery() {
        let rules = ClassifyRules::default();
        let found = rules
            .evaluate(&response("https://cdn.comic.studio/comics/abcd123456.png", 200))
            .unwrap();
        assert_eq!(found.key, "abcd123456");
        assert_eq!(found.verdict, Verdict::Accepted);
    }

    #[test]
    fn test_verdict_codes() {
        assert_eq!(Verdict::Accepted.code(), Some(1));
        assert_eq!(Verdict::AccessRestricted.code(), Some(2));
        assert_eq!(Verdict::Rejected.code(), None);
        assert_eq!(Verdict::from_code(2), Some(Verdict::AccessRestricted));
        assert_eq!(Verdict::from_code(0), None);
    }
}
