// src/sequence/ident.rs
// =============================================================================
// The Identifier type: a fixed-width string over the letters a-z.
//
// An identifier reads as a base-26 number where 'a' = 0 and the leftmost
// letter is the most significant digit. For two identifiers of the same
// width, plain string comparison gives exactly that numeric order, so the
// derived Ord is all we need.
// =============================================================================

use crate::error::{Result, ScanError};
use serde::{Deserialize, Serialize};
use std::fmt;

const RADIX: u128 = 26;

/// A validated lowercase a-z identifier.
///
/// Serializes as a plain JSON string and re-validates when deserialized, so
/// a hand-edited snapshot cannot smuggle in a bad value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Identifier(String);

impl Identifier {
    pub fn parse(value: &str) -> Result<Self> {
        if value.is_empty() {
            return Err(ScanError::InvalidIdentifier {
                value: value.to_string(),
                reason: "identifier is empty",
            });
        }
        if !value.bytes().all(|b| b.is_ascii_lowercase()) {
            return Err(ScanError::InvalidIdentifier {
                value: value.to_string(),
                reason: "only the letters a-z are allowed",
            });
        }
        Ok(Identifier(value.to_string()))
    }

    // Like parse(), but also insists on a given width (used for CLI bounds)
    pub fn parse_with_width(value: &str, width: usize) -> Result<Self> {
        let id = Self::parse(value)?;
        if id.width() != width {
            return Err(ScanError::WrongWidth {
                value: value.to_string(),
                expected: width,
            });
        }
        Ok(id)
    }

    pub fn width(&self) -> usize {
        self.0.len()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The next identifier of the same width, or `None` when every letter is
    /// already 'z'.
    ///
    /// Increments the last letter; a 'z' wraps to 'a' and carries one place
    /// to the left.
    pub fn successor(&self) -> Option<Identifier> {
        let mut letters = self.0.clone().into_bytes();

        for i in (0..letters.len()).rev() {
            if letters[i] == b'z' {
                letters[i] = b'a';
            } else {
                letters[i] += 1;
                return String::from_utf8(letters).ok().map(Identifier);
            }
        }

        None
    }

    /// Numeric value of the identifier in base 26.
    ///
    /// Returns `None` if the width is too large for a u128 (more than 27
    /// letters); only used for progress reporting.
    pub fn rank(&self) -> Option<u128> {
        self.0.bytes().try_fold(0u128, |acc, b| {
            acc.checked_mul(RADIX)?.checked_add(u128::from(b - b'a'))
        })
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for Identifier {
    type Error = ScanError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<Identifier> for String {
    fn from(id: Identifier) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> Identifier {
        Identifier::parse(s).unwrap()
    }

    #[test]
    fn test_rejects_non_letters() {
        assert!(Identifier::parse("").is_err());
        assert!(Identifier::parse("abcDef").is_err());
        assert!(Identifier::parse("abc12").is_err());
        assert!(Identifier::parse("ab cd").is_err());
    }

    #[test]
    fn test_parse_with_width() {
        assert!(Identifier::parse_with_width("aaaaaaaaaa", 10).is_ok());
        let err = Identifier::parse_with_width("aaaa", 10).unwrap_err();
        assert!(matches!(err, ScanError::WrongWidth { expected: 10, .. }));
    }

    #[test]
    fn test_successor_increments_last_letter() {
        assert_eq!(id("aaaaaaaaaa").successor(), Some(id("aaaaaaaaab")));
    }

    #[test]
    fn test_successor_carries_and_resets_right_side() {
        assert_eq!(id("aaaaaaaaaz").successor(), Some(id("aaaaaaaaba")));
        assert_eq!(id("abzzz").successor(), Some(id("acaaa")));
    }

    #[test]
    fn test_successor_overflow_is_none() {
        assert_eq!(id("zzz").successor(), None);
    }

    #[test]
    fn test_ordering_matches_base26() {
        assert!(id("aaab") < id("aaba"));
        assert!(id("azzz") < id("baaa"));
        assert_eq!(id("ba").rank(), Some(26));
        assert_eq!(id("zz").rank(), Some(26 * 26 - 1));
    }

    #[test]
    fn test_serde_revalidates() {
        let ok: Identifier = serde_json::from_str("\"abc\"").unwrap();
        assert_eq!(ok, id("abc"));
        assert!(serde_json::from_str::<Identifier>("\"ABC\"").is_err());
    }
}
