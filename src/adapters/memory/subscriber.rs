//! In-memory subscriber repository.
//!
//! `update` enforces the optimistic version check under a single write
//! guard: the stored version must equal the incoming record's version, and
//! the stored copy gets the bump. A confirm racing an unsubscribe on the
//! same record loses with `Conflict` instead of silently overwriting.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, EmailAddress, ErrorCode};
use crate::domain::subscriber::SubscriberRecord;
use crate::ports::SubscriberRepository;

/// In-memory subscriber store for tests and single-process deployments.
#[derive(Debug, Default)]
pub struct InMemorySubscriberRepository {
    records: Arc<RwLock<Vec<SubscriberRecord>>>,
}

impl InMemorySubscriberRepository {
    /// Creates an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    // === Test Helpers ===

    /// Returns a snapshot of every stored record.
    pub async fn all_records(&self) -> Vec<SubscriberRecord> {
        self.records.read().await.clone()
    }

    /// Inserts a record verbatim, including duplicates. Lets tests set up
    /// the ambiguous-lookup states the handlers must refuse to guess on.
    pub async fn insert_raw(&self, record: SubscriberRecord) {
        self.records.write().await.push(record);
    }
}

#[async_trait]
impl SubscriberRepository for InMemorySubscriberRepository {
    async fn insert(&self, record: &SubscriberRecord) -> Result<(), DomainError> {
        self.records.write().await.push(record.clone());
        Ok(())
    }

    async fn update(&self, record: &SubscriberRecord) -> Result<SubscriberRecord, DomainError> {
        let mut records = self.records.write().await;
        let stored = records
            .iter_mut()
            .find(|r| r.id == record.id)
            .ok_or_else(|| {
                DomainError::new(
                    ErrorCode::SubscriberNotFound,
                    record.email.as_str().to_string(),
                )
            })?;

        if stored.version != record.version {
            return Err(DomainError::new(
                ErrorCode::Conflict,
                format!(
                    "version mismatch for {}: stored {}, incoming {}",
                    record.email, stored.version, record.version
                ),
            ));
        }

        *stored = record.clone();
        stored.version += 1;
        Ok(stored.clone())
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Vec<SubscriberRecord>, DomainError> {
        let records = self.records.read().await;
        Ok(records.iter().filter(|r| &r.email == email).cloned().collect())
    }

    async fn find_by_sequence_code(
        &self,
        sequence_code: &str,
    ) -> Result<Vec<SubscriberRecord>, DomainError> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .filter(|r| r.sequence_code == sequence_code)
            .cloned()
            .collect())
    }
}
