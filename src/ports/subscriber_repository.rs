//! Subscriber repository port.
//!
//! # Design
//!
//! - **Optimistic locking**: `update` compares the record's `version`
//!   against storage and rejects stale writes with `Conflict`. This
//!   serializes transitions on the same subscriber without a row lock, so
//!   a confirm racing an unsubscribe cannot silently lose an update.
//! - **No guessing**: lookups return every match; callers map zero to
//!   `NotFound` and more than one to `Ambiguous` and fail closed.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, EmailAddress};
use crate::domain::subscriber::SubscriberRecord;

/// Repository port for subscriber record persistence.
#[async_trait]
pub trait SubscriberRepository: Send + Sync {
    /// Persists a new record (version 0).
    ///
    /// # Errors
    ///
    /// - `StorageError` on persistence failure
    async fn insert(&self, record: &SubscriberRecord) -> Result<(), DomainError>;

    /// Persists an update, enforcing the optimistic version check.
    ///
    /// Returns the stored record with its bumped version.
    ///
    /// # Errors
    ///
    /// - `Conflict` if the stored version no longer matches
    /// - `SubscriberNotFound` if the record does not exist
    /// - `StorageError` on persistence failure
    async fn update(&self, record: &SubscriberRecord) -> Result<SubscriberRecord, DomainError>;

    /// Finds every record for a normalized email.
    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Vec<SubscriberRecord>, DomainError>;

    /// Finds every record carrying a sequence code.
    async fn find_by_sequence_code(
        &self,
        sequence_code: &str,
    ) -> Result<Vec<SubscriberRecord>, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscriber_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn SubscriberRepository) {}
    }
}
