// src/sequence/mod.rs
// =============================================================================
// This module produces the identifiers we probe.
//
// Submodules:
// - ident: the Identifier type and its base-26 increment
// - bounds: ScanBounds (start..=end) and the Sequencer iterator
// =============================================================================

mod bounds;
mod ident;

pub use bounds::{ScanBounds, Sequencer};
pub use ident::Identifier;
