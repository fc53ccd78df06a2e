//! Email address value object.
//!
//! Normalization happens exactly once, at construction: the input is
//! trimmed, case-folded, and syntactically validated. Everything downstream
//! (trust-token subject keys, repository lookups, supersession) compares
//! normalized values, so `a@B.com ` and `A@b.com` are the same subscriber.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ValidationError;

/// A normalized, syntactically valid email address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Parses and normalizes an email address.
    ///
    /// Normalization: leading/trailing whitespace is stripped and the whole
    /// address is lowercased.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` when the input is empty after trimming or
    /// fails the syntactic checks (exactly one `@`, non-empty local part,
    /// dotted domain, no whitespace).
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let normalized = input.trim().to_lowercase();

        if normalized.is_empty() {
            return Err(ValidationError::empty_field("email"));
        }
        if normalized.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(ValidationError::invalid_format(
                "email",
                "contains whitespace or control characters",
            ));
        }

        let (local, domain) = normalized
            .split_once('@')
            .ok_or_else(|| ValidationError::invalid_format("email", "missing @ symbol"))?;

        if domain.contains('@') {
            return Err(ValidationError::invalid_format("email", "multiple @ symbols"));
        }
        if local.is_empty() {
            return Err(ValidationError::invalid_format("email", "empty local part"));
        }
        if domain.is_empty() {
            return Err(ValidationError::invalid_format("email", "empty domain"));
        }
        if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
            return Err(ValidationError::invalid_format(
                "email",
                "domain must contain an interior dot",
            ));
        }

        Ok(Self(normalized))
    }

    /// Returns the normalized address as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<EmailAddress> for String {
    fn from(email: EmailAddress) -> Self {
        email.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_valid_address() {
        let email = EmailAddress::parse("user@example.com").unwrap();
        assert_eq!(email.as_str(), "user@example.com");
    }

    #[test]
    fn trims_and_lowercases() {
        let email = EmailAddress::parse("  User@Example.COM  ").unwrap();
        assert_eq!(email.as_str(), "user@example.com");
    }

    #[test]
    fn normalized_forms_are_equal() {
        let a = EmailAddress::parse("a@B.com").unwrap();
        let b = EmailAddress::parse(" A@b.com").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn rejects_empty_input() {
        assert!(EmailAddress::parse("").is_err());
        assert!(EmailAddress::parse("   ").is_err());
    }

    #[test]
    fn rejects_missing_at_symbol() {
        assert!(EmailAddress::parse("user.example.com").is_err());
    }

    #[test]
    fn rejects_multiple_at_symbols() {
        assert!(EmailAddress::parse("user@host@example.com").is_err());
    }

    #[test]
    fn rejects_empty_local_part() {
        assert!(EmailAddress::parse("@example.com").is_err());
    }

    #[test]
    fn rejects_undotted_domain() {
        assert!(EmailAddress::parse("user@localhost").is_err());
    }

    #[test]
    fn rejects_domain_with_edge_dots() {
        assert!(EmailAddress::parse("user@.example.com").is_err());
        assert!(EmailAddress::parse("user@example.com.").is_err());
    }

    #[test]
    fn rejects_interior_whitespace() {
        assert!(EmailAddress::parse("us er@example.com").is_err());
    }

    #[test]
    fn deserializes_with_validation() {
        let email: EmailAddress = serde_json::from_str("\"User@Example.com\"").unwrap();
        assert_eq!(email.as_str(), "user@example.com");

        let result: Result<EmailAddress, _> = serde_json::from_str("\"not-an-email\"");
        assert!(result.is_err());
    }

    #[test]
    fn serializes_to_plain_string() {
        let email = EmailAddress::parse("user@example.com").unwrap();
        let json = serde_json::to_string(&email).unwrap();
        assert_eq!(json, "\"user@example.com\"");
    }
}
