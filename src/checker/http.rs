// src/checker/http.rs
// =============================================================================
// This module probes one URL and reports what happened.
//
// Key functionality:
// - Sends a GET request with our User-Agent
// - Follows redirects and records the final URL we landed on
// - Turns network failures into a TransportFailure instead of an error
//
// A probe never fails from the caller's point of view: whatever happens on
// the wire, we hand back a ProbeOutcome and let the classifier decide.
// =============================================================================

use crate::error::Result;
use reqwest::{redirect, Client};
use std::fmt;
use std::time::Duration;

// Redirect hops we are willing to follow before giving up
const MAX_REDIRECTS: usize = 10;

/// Why a probe never got an HTTP response
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportFailure {
    /// Request timed out
    Timeout,
    /// Too many redirects (redirect loop)
    TooManyRedirects,
    /// Could not resolve hostname
    DnsError,
    /// Host unreachable or connection refused
    Connect,
    /// SSL/TLS certificate error
    Tls,
    /// Anything else reqwest reports
    Other(String),
}

impl fmt::Display for TransportFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportFailure::Timeout => f.write_str("request timed out"),
            TransportFailure::TooManyRedirects => f.write_str("too many redirects"),
            TransportFailure::DnsError => f.write_str("could not resolve hostname"),
            TransportFailure::Connect => f.write_str("connection failed"),
            TransportFailure::Tls => f.write_str("SSL certificate error"),
            TransportFailure::Other(message) => f.write_str(message),
        }
    }
}

/// The result of probing one URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// The server answered (after following any redirects)
    Response {
        requested_url: String,
        final_url: String,
        status: u16,
    },
    /// No HTTP response at all
    Transport {
        requested_url: String,
        failure: TransportFailure,
    },
}

impl ProbeOutcome {
    pub fn requested_url(&self) -> &str {
        match self {
            ProbeOutcome::Response { requested_url, .. }
            | ProbeOutcome::Transport { requested_url, .. } => requested_url,
        }
    }

    pub fn final_url(&self) -> Option<&str> {
        match self {
            ProbeOutcome::Response { final_url, .. } => Some(final_url),
            ProbeOutcome::Transport { .. } => None,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ProbeOutcome::Response { status, .. } => Some(*status),
            ProbeOutcome::Transport { .. } => None,
        }
    }
}

// Sends probes for the whole scan.
//
// One Client is built per scan and cloned into every worker; the clone is
// just a reference count, so all workers share one connection pool.
#[derive(Debug, Clone)]
pub struct Prober {
    client: Client,
}

impl Prober {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .redirect(redirect::Policy::limited(MAX_REDIRECTS))
            .build()?;

        Ok(Prober { client })
    }

    /// GET `url`, following redirects, and report where we ended up.
    ///
    /// Only the status line and final URL are looked at; the body is never
    /// downloaded.
    pub async fn probe(&self, url: String) -> ProbeOutcome {
        match self.client.get(&url).send().await {
            Ok(response) => ProbeOutcome::Response {
                final_url: response.url().to_string(),
                status: response.status().as_u16(),
                requested_url: url,
            },
            Err(e) => ProbeOutcome::Transport {
                failure: categorize_error(&e),
                requested_url: url,
            },
        }
    }
}

// Categorizes the different error types reqwest can give us
fn categorize_error(error: &reqwest::Error) -> TransportFailure {
    let error_string = error.to_string();

    if error.is_timeout() {
        TransportFailure::Timeout
    } else if error.is_redirect() {
        TransportFailure::TooManyRedirects
    } else if error.is_connect() {
        // Connection errors often mean DNS issues or host unreachable
        if error_string.contains("dns") {
            TransportFailure::DnsError
        } else {
            TransportFailure::Connect
        }
    } else if error_string.contains("certificate") || error_string.contains("ssl") {
        TransportFailure::Tls
    } else {
        TransportFailure::Other(error_string)
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why build the Client once?
//    - A reqwest Client owns a connection pool
//    - Cloning it is cheap (it's an Arc internally), so every worker gets a clone
//    - Building a new Client per request would throw the pool away each time
//
// 2. What does redirect::Policy::limited(10) do?
//    - reqwest follows 3xx responses for us, up to 10 hops
//    - response.url() is then the URL we ended up at, not the one we asked for
//    - That final URL is what the classifier compares against the content marker
//
// 3. Why is a network error not an Err here?
//    - A dead host or a timeout just means "nothing at this identifier"
//    - So it becomes ProbeOutcome::Transport, and the scan keeps going
//    - Only setup problems (building the Client) return Err
//
// 4. What is an enum with data?
//    - Each variant can carry its own fields, like Response { status, .. }
//    - match forces us to handle Response and Transport separately
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn prober() -> Prober {
        Prober::new("slug-scout-test", Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_probe_without_redirect_keeps_url() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/c/abc"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let url = format!("{}/c/abc", server.uri());
        let outcome = prober().probe(url.clone()).await;

        assert_eq!(outcome.status(), Some(200));
        assert_eq!(outcome.final_url(), Some(url.as_str()));
        assert_eq!(outcome.requested_url(), url);
    }

    #[tokio::test]
    async fn test_probe_follows_redirects() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/c/abc"))
            .respond_with(
                ResponseTemplate::new(302).insert_header("location", "/comics/abcd123456.png"),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/comics/abcd123456.png"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let outcome = prober().probe(format!("{}/c/abc", server.uri())).await;

        assert_eq!(outcome.status(), Some(200));
        assert_eq!(
            outcome.final_url(),
            Some(format!("{}/comics/abcd123456.png", server.uri()).as_str())
        );
    }

    #[tokio::test]
    async fn test_probe_sends_user_agent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(header("user-agent", "slug-scout-test"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let outcome = prober().probe(format!("{}/c/xyz", server.uri())).await;
        assert_eq!(outcome.status(), Some(204));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_transport_failure() {
        // Port 1 on loopback is not listening
        let outcome = prober().probe("http://127.0.0.1:1/c/abc".to_string()).await;

        assert!(matches!(outcome, ProbeOutcome::Transport { .. }));
        assert_eq!(outcome.final_url(), None);
        assert_eq!(outcome.status(), None);
    }
}
