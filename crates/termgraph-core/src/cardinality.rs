//! Multiplicity pairs attached to both ends of a link.
//!
//! A [`Cardinality`] is an immutable `(first, second)` pair. Each side is one
//! of the multiplicity tokens `0`, `1`, any other non-negative integer, `*`,
//! `n`, or the empty "none" sentinel. The pair renders as `"first..second"`,
//! or as `""` when both sides are none.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

const RANGE_SEPARATOR: &str = "..";

/// An immutable `(min, max)` multiplicity pair.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cardinality {
    first: String,
    second: String,
}

impl Cardinality {
    /// Creates a pair after validating both tokens.
    pub fn new(first: &str, second: &str) -> Result<Self, CoreError> {
        for token in [first, second] {
            if !is_valid_token(token) {
                return Err(CoreError::InvalidCardinality {
                    value: token.to_string(),
                });
            }
        }
        Ok(Cardinality {
            first: first.to_string(),
            second: second.to_string(),
        })
    }

    /// The "none" pair. Renders as the empty string.
    pub fn none() -> Self {
        Cardinality::default()
    }

    pub fn first(&self) -> &str {
        &self.first
    }

    pub fn second(&self) -> &str {
        &self.second
    }

    /// Returns `true` when both sides are the none sentinel.
    pub fn is_none(&self) -> bool {
        self.first.is_empty() && self.second.is_empty()
    }

    /// Canonical rendering: `"first..second"`, or `""` for the none pair.
    pub fn as_string(&self) -> String {
        if self.is_none() {
            String::new()
        } else {
            format!("{}{}{}", self.first, RANGE_SEPARATOR, self.second)
        }
    }

    /// The multiplicities offered when editing a link end.
    pub fn pool() -> Vec<Cardinality> {
        [
            ("", ""),
            ("0", "1"),
            ("1", "1"),
            ("0", "*"),
            ("1", "*"),
            ("0", "n"),
            ("1", "n"),
        ]
        .iter()
        .map(|(first, second)| Cardinality {
            first: first.to_string(),
            second: second.to_string(),
        })
        .collect()
    }
}

fn is_valid_token(token: &str) -> bool {
    matches!(token, "" | "*" | "n") || token.chars().all(|c| c.is_ascii_digit())
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_string())
    }
}

impl FromStr for Cardinality {
    type Err = CoreError;

    /// Accepts `""` (none), `"a..b"`, or a single token `"a"` meaning `a..a`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Ok(Cardinality::none());
        }
        match s.split_once(RANGE_SEPARATOR) {
            Some((first, second)) => Cardinality::new(first, second),
            None => Cardinality::new(s, s),
        }
    }
}
