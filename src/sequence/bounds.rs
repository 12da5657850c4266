// src/sequence/bounds.rs
// =============================================================================
// Scan bounds and the Sequencer that walks them.
//
// The Sequencer is a plain Iterator: lazy, finite, and it yields every
// identifier from start through end exactly once, in ascending order.
//
// Because ScanBounds refuses start > end, walking forward from start always
// reaches end before the all-'z' overflow can happen. The overflow branch in
// next() is therefore only a guard.
// =============================================================================

use super::ident::Identifier;
use crate::error::{Result, ScanError};
use std::iter::FusedIterator;

/// An inclusive range of identifiers that all share one width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanBounds {
    start: Identifier,
    end: Identifier,
}

impl ScanBounds {
    pub fn new(start: Identifier, end: Identifier) -> Result<Self> {
        if start.width() != end.width() {
            return Err(ScanError::WidthMismatch {
                start: start.width(),
                end: end.width(),
            });
        }
        if start > end {
            return Err(ScanError::ReversedBounds {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(ScanBounds { start, end })
    }

    pub fn start(&self) -> &Identifier {
        &self.start
    }

    pub fn end(&self) -> &Identifier {
        &self.end
    }

    pub fn contains(&self, id: &Identifier) -> bool {
        id.width() == self.start.width() && *id >= self.start && *id <= self.end
    }
}

/// Walks a [`ScanBounds`] range in ascending order.
#[derive(Debug, Clone)]
pub struct Sequencer {
    next: Option<Identifier>,
    end: Identifier,
}

impl Sequencer {
    pub fn new(bounds: &ScanBounds) -> Self {
        Sequencer {
            next: Some(bounds.start.clone()),
            end: bounds.end.clone(),
        }
    }

    /// A sequence that picks up right after `current`.
    ///
    /// `current` itself is not yielded; if it equals the end bound the
    /// sequence is empty. Fails when `current` does not lie inside `bounds`.
    pub fn resume_after(bounds: &ScanBounds, current: &Identifier) -> Result<Self> {
        if !bounds.contains(current) {
            return Err(ScanError::ResumeOutOfRange {
                current: current.to_string(),
                start: bounds.start.to_string(),
                end: bounds.end.to_string(),
            });
        }

        let next = if *current == bounds.end {
            None
        } else {
            current.successor()
        };

        Ok(Sequencer {
            next,
            end: bounds.end.clone(),
        })
    }

    /// How many identifiers are left, or `None` if the count does not fit
    /// in a u128.
    pub fn remaining(&self) -> Option<u128> {
        match &self.next {
            None => Some(0),
            Some(next) => {
                let distance = self.end.rank()?.checked_sub(next.rank()?)?;
                distance.checked_add(1)
            }
        }
    }
}

impl Iterator for Sequencer {
    type Item = Identifier;

    fn next(&mut self) -> Option<Identifier> {
        let current = self.next.take()?;

        if current != self.end {
            // None here means overflow, which valid bounds never reach
            self.next = current.successor();
        }

        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self.remaining().and_then(|n| usize::try_from(n).ok()) {
            Some(n) => (n, Some(n)),
            None => (0, None),
        }
    }
}

impl FusedIterator for Sequencer {}
