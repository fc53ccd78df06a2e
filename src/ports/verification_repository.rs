//! Verification token repository port.
//!
//! Defines the contract for persisting and retrieving verification tokens.
//!
//! # Design
//!
//! - **Atomic consume**: the check-then-mark-consumed sequence is a single
//!   conditional update. Two concurrent confirms for the same token must
//!   not both succeed.
//! - **Supersession**: issuance marks every prior active token for the
//!   email superseded in one call, so at most one active token exists per
//!   email at any time.
//! - Expired tokens are inert; implementations need not delete them
//!   eagerly.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, EmailAddress, Timestamp, TokenId};
use crate::domain::verification::VerificationToken;

/// Repository port for verification token persistence.
#[async_trait]
pub trait VerificationTokenRepository: Send + Sync {
    /// Persists a freshly issued token.
    ///
    /// # Errors
    ///
    /// - `StorageError` on persistence failure
    async fn insert(&self, token: &VerificationToken) -> Result<(), DomainError>;

    /// Marks every active (unconsumed, unsuperseded, unexpired) token for
    /// the email as superseded. Returns how many were superseded.
    ///
    /// Called by issuance just before inserting the replacement token.
    async fn supersede_active(
        &self,
        email: &EmailAddress,
        now: Timestamp,
    ) -> Result<u32, DomainError>;

    /// Finds every token for an email, newest first, regardless of state.
    async fn find_for_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Vec<VerificationToken>, DomainError>;

    /// Finds all tokens matching `(email, sequence_code)`, newest first.
    ///
    /// The caller treats more than one match as `Ambiguous` and fails
    /// closed; this method never picks a winner itself.
    async fn find_by_email_and_sequence(
        &self,
        email: &EmailAddress,
        sequence_code: &str,
    ) -> Result<Vec<VerificationToken>, DomainError>;

    /// Atomically marks the token consumed and returns the updated token.
    ///
    /// The check and the write are one operation (compare-and-swap on the
    /// consumed flag or an equivalent conditional update).
    ///
    /// # Errors
    ///
    /// - `AlreadyConsumed` if another confirm won the race
    /// - `TokenNotFound` if the id does not exist
    /// - `StorageError` on persistence failure
    async fn consume(&self, id: &TokenId, now: Timestamp)
        -> Result<VerificationToken, DomainError>;
}
