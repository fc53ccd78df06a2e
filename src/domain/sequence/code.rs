//! Sequence code formatting.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A human-readable rendering of an allocated counter value.
///
/// Pure function of `(value, prefix, width)`: the value is zero-padded to
/// `width` digits and prefixed. Values that outgrow the width keep all
/// their digits; codes never truncate, they just get longer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SequenceCode {
    /// The allocated counter value.
    pub value: u64,
    /// The formatted code, e.g. `N000123`.
    pub code: String,
}

impl SequenceCode {
    /// Formats an allocated value into a sequence code.
    pub fn new(value: u64, prefix: &str, width: usize) -> Self {
        Self {
            value,
            code: Self::format(value, prefix, width),
        }
    }

    /// Zero-pads `value` to `width` digits and prepends `prefix`.
    pub fn format(value: u64, prefix: &str, width: usize) -> String {
        format!("{}{:0>width$}", prefix, value, width = width)
    }

    /// Returns the formatted code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.code
    }
}

impl fmt::Display for SequenceCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code)
    }
}
