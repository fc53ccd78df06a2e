//! Request-scoped subscriber lookup cache.
//!
//! A handler creates one of these per request and passes it by `&mut` to
//! every code path that needs the same subscriber rows. The cache dies
//! with the request. There is deliberately no process-wide instance, so
//! one request's lookups can never leak into another's.

use std::collections::HashMap;

use crate::domain::foundation::{DomainError, EmailAddress};
use crate::domain::subscriber::SubscriberRecord;
use crate::ports::SubscriberRepository;

/// Per-request memo of subscriber lookups, keyed by normalized email.
#[derive(Debug, Default)]
pub struct LookupCache {
    subscribers: HashMap<String, Vec<SubscriberRecord>>,
}

impl LookupCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the records for an email, fetching from the repository on
    /// the first access and replaying the memo afterwards.
    pub async fn subscribers_for(
        &mut self,
        repo: &dyn SubscriberRepository,
        email: &EmailAddress,
    ) -> Result<Vec<SubscriberRecord>, DomainError> {
        if let Some(records) = self.subscribers.get(email.as_str()) {
            return Ok(records.clone());
        }

        let records = repo.find_by_email(email).await?;
        self.subscribers
            .insert(email.as_str().to_string(), records.clone());
        Ok(records)
    }

    /// Drops the memo for an email, forcing the next access to re-fetch.
    /// Call after writing the record back.
    pub fn invalidate(&mut self, email: &EmailAddress) {
        self.subscribers.remove(email.as_str());
    }

    /// Returns true if the email has a memoized entry.
    pub fn is_cached(&self, email: &EmailAddress) -> bool {
        self.subscribers.contains_key(email.as_str())
    }
}
