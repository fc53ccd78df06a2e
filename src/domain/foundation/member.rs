//! Member identifier value object.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ValidationError;

/// A normalized member identifier.
///
/// Uppercased at construction and restricted to `[A-Z0-9_-]+`. The
/// restricted charset matters beyond cosmetics: member subject keys are
/// joined with `:` and rotation periods with `|`, so a `MemberId` can never
/// smuggle either separator into a trust-token digest input.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MemberId(String);

impl MemberId {
    /// Parses and normalizes a member identifier.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` when the input is empty after trimming or
    /// contains characters outside `[A-Z0-9_-]` after uppercasing.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let normalized = input.trim().to_uppercase();

        if normalized.is_empty() {
            return Err(ValidationError::empty_field("member_id"));
        }
        if !normalized
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_' || c == '-')
        {
            return Err(ValidationError::invalid_format(
                "member_id",
                "only A-Z, 0-9, '_' and '-' are allowed",
            ));
        }

        Ok(Self(normalized))
    }

    /// Returns the normalized identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for MemberId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<MemberId> for String {
    fn from(id: MemberId) -> Self {
        id.0
    }
}
