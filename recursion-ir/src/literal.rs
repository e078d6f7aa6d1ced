//! Native-field literals.
//!
//! The native field is chosen by the compiler backend, so native constants
//! are kept as validated decimal strings and parsed by the backend.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A non-empty string of ASCII decimal digits
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NativeLiteral(String);

impl NativeLiteral {
    pub fn parse(s: &str) -> Option<Self> {
        if !s.is_empty() && s.bytes().all(|c| c.is_ascii_digit()) {
            Some(NativeLiteral(s.to_string()))
        } else {
            None
        }
    }

    pub fn zero() -> Self {
        NativeLiteral("0".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<u64> for NativeLiteral {
    fn from(value: u64) -> Self {
        NativeLiteral(value.to_string())
    }
}

impl TryFrom<String> for NativeLiteral {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        NativeLiteral::parse(&s).ok_or_else(|| format!("invalid decimal literal: {:?}", s))
    }
}

impl From<NativeLiteral> for String {
    fn from(lit: NativeLiteral) -> String {
        lit.0
    }
}

impl fmt::Display for NativeLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Parse a non-negative index or bit width token
pub fn parse_usize(token: &str) -> Option<usize> {
    if token.is_empty() || !token.bytes().all(|c| c.is_ascii_digit()) {
        return None;
    }
    token.parse().ok()
}
