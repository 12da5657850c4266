// src/checker/mod.rs
// =============================================================================
// This module probes URLs and decides what the answers mean.
//
// Submodules:
// - http: sends the GET request and reports a ProbeOutcome
// - classify: turns a ProbeOutcome into a Verdict and a canonical key
//
// This file (mod.rs) is the module root - it re-exports the public API so
// the rest of the crate can write `checker::Prober` instead of
// `checker::http::Prober`.
// =============================================================================

mod classify;
mod http;

pub use classify::{ClassifyRules, Verdict, DEFAULT_CONTENT_MARKER};
pub use http::{ProbeOutcome, Prober};
