//! Venue ("pedalstar") identifiers: canonical form is `PS` followed by exactly three digits.

use std::fmt;

use crate::error::CodeServiceError;

const PREFIX: &str = "PS";
const DIGITS: usize = 3;

/// Canonicalize a hand-typed venue id.
///
/// Whitespace anywhere is dropped and letters are upper-cased. One to three digits,
/// bare or behind `PS`, are zero-padded to `PS###`. Any other shape comes back
/// unchanged (after whitespace removal and upper-casing) and fails [`is_canonical`].
pub fn normalize(raw: &str) -> String {
    let compact: String = raw
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| c.to_ascii_uppercase())
        .collect();

    let digits = compact.strip_prefix(PREFIX).unwrap_or(&compact);
    if (1..=DIGITS).contains(&digits.len()) && digits.bytes().all(|b| b.is_ascii_digit()) {
        format!("{PREFIX}{digits:0>3}")
    } else {
        compact
    }
}

/// `^PS\d{3}$`
pub fn is_canonical(id: &str) -> bool {
    id.strip_prefix(PREFIX)
        .is_some_and(|d| d.len() == DIGITS && d.bytes().all(|b| b.is_ascii_digit()))
}

/// A validated, canonical venue id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VenueId(String);

impl VenueId {
    /// Normalize then validate.
    pub fn parse(raw: &str) -> Result<Self, CodeServiceError> {
        let normalized = normalize(raw);
        if is_canonical(&normalized) {
            Ok(Self(normalized))
        } else {
            Err(CodeServiceError::InvalidVenueId)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VenueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
