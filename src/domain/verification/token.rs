//! Verification token entity.
//!
//! A verification token is a short-lived, single-use secret bound to an
//! email address, used to prove control of that address.
//!
//! # Invariants
//!
//! - `expires_at > created_at`
//! - Consumption is one-shot: once `consumed_at` is set it never clears,
//!   and the atomic check-and-set lives in the repository (§ the
//!   `VerificationTokenRepository::consume` contract).
//! - At most one *active* (unconsumed, unsuperseded, unexpired) token per
//!   email: new issuance supersedes prior active tokens.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{EmailAddress, Timestamp, TokenId, ValidationError};

/// A single-use email verification token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationToken {
    /// Unique identifier for this token.
    pub id: TokenId,

    /// The email address the code was issued for.
    pub email: EmailAddress,

    /// The caller-supplied human code (entropy policy is the caller's).
    pub code: String,

    /// Display name captured at signup.
    pub name: String,

    /// Where the signup came from (form id, campaign, import, ...).
    pub source: String,

    /// The allocated sequence counter value.
    pub sequence_id: u64,

    /// The formatted sequence code, e.g. `N000123`.
    pub sequence_code: String,

    /// Hex HMAC binding `(code, email)`; handed to the delivery channel,
    /// demanded back at confirm.
    pub signature: String,

    /// When the token was issued.
    pub created_at: Timestamp,

    /// When the token stops validating.
    pub expires_at: Timestamp,

    /// Set exactly once, by the winning confirm.
    pub consumed_at: Option<Timestamp>,

    /// Set when a newer token for the same email replaced this one.
    pub superseded_at: Option<Timestamp>,
}

impl VerificationToken {
    /// Builds a fresh token.
    ///
    /// # Errors
    ///
    /// - `EmptyField` - the code is empty
    /// - `InvalidFormat` - `ttl_seconds` is zero (would violate
    ///   `expires_at > created_at`)
    #[allow(clippy::too_many_arguments)]
    pub fn issue(
        id: TokenId,
        email: EmailAddress,
        code: String,
        name: String,
        source: String,
        sequence_id: u64,
        sequence_code: String,
        signature: String,
        ttl_seconds: u64,
        now: Timestamp,
    ) -> Result<Self, ValidationError> {
        if code.trim().is_empty() {
            return Err(ValidationError::empty_field("code"));
        }
        if ttl_seconds == 0 {
            return Err(ValidationError::invalid_format(
                "ttl_seconds",
                "must be greater than zero",
            ));
        }

        Ok(Self {
            id,
            email,
            code,
            name,
            source,
            sequence_id,
            sequence_code,
            signature,
            created_at: now,
            expires_at: now.plus_secs(ttl_seconds),
            consumed_at: None,
            superseded_at: None,
        })
    }

    /// True once the token has been spent.
    pub fn is_consumed(&self) -> bool {
        self.consumed_at.is_some()
    }

    /// True once a newer issuance replaced this token.
    pub fn is_superseded(&self) -> bool {
        self.superseded_at.is_some()
    }

    /// True when `now` is past the expiry instant. Expiry is inclusive:
    /// `now == expires_at` still validates.
    pub fn is_expired(&self, now: Timestamp) -> bool {
        now.is_after(&self.expires_at)
    }

    /// True when the token can still be confirmed.
    pub fn is_active(&self, now: Timestamp) -> bool {
        !self.is_consumed() && !self.is_superseded() && !self.is_expired(now)
    }
}
