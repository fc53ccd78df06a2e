//! In-memory verification token repository.
//!
//! All state sits behind one `RwLock`; `consume` does its check and write
//! under a single write guard, which is exactly the compare-and-swap the
//! port contract demands: two concurrent confirms cannot both see an
//! unconsumed token.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, EmailAddress, ErrorCode, Timestamp, TokenId};
use crate::domain::verification::VerificationToken;
use crate::ports::VerificationTokenRepository;

/// In-memory token store for tests and single-process deployments.
#[derive(Debug, Default)]
pub struct InMemoryVerificationTokenRepository {
    tokens: Arc<RwLock<Vec<VerificationToken>>>,
}

impl InMemoryVerificationTokenRepository {
    /// Creates an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    // === Test Helpers ===

    /// Returns a snapshot of every stored token.
    pub async fn all_tokens(&self) -> Vec<VerificationToken> {
        self.tokens.read().await.clone()
    }

    /// Inserts a token verbatim, bypassing issuance. Lets tests craft
    /// already-expired or already-consumed states directly.
    pub async fn insert_raw(&self, token: VerificationToken) {
        self.tokens.write().await.push(token);
    }
}

#[async_trait]
impl VerificationTokenRepository for InMemoryVerificationTokenRepository {
    async fn insert(&self, token: &VerificationToken) -> Result<(), DomainError> {
        self.tokens.write().await.push(token.clone());
        Ok(())
    }

    async fn supersede_active(
        &self,
        email: &EmailAddress,
        now: Timestamp,
    ) -> Result<u32, DomainError> {
        let mut tokens = self.tokens.write().await;
        let mut superseded = 0;
        for token in tokens.iter_mut() {
            if &token.email == email && token.is_active(now) {
                token.superseded_at = Some(now);
                superseded += 1;
            }
        }
        Ok(superseded)
    }

    async fn find_for_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Vec<VerificationToken>, DomainError> {
        let tokens = self.tokens.read().await;
        // Insertion order is creation order; reverse so newest leads.
        Ok(tokens
            .iter()
            .rev()
            .filter(|t| &t.email == email)
            .cloned()
            .collect())
    }

    async fn find_by_email_and_sequence(
        &self,
        email: &EmailAddress,
        sequence_code: &str,
    ) -> Result<Vec<VerificationToken>, DomainError> {
        let tokens = self.tokens.read().await;
        let mut matches: Vec<_> = tokens
            .iter()
            .filter(|t| &t.email == email && t.sequence_code == sequence_code)
            .cloned()
            .collect();
        matches.reverse();
        Ok(matches)
    }

    async fn consume(
        &self,
        id: &TokenId,
        now: Timestamp,
    ) -> Result<VerificationToken, DomainError> {
        let mut tokens = self.tokens.write().await;
        let token = tokens
            .iter_mut()
            .find(|t| &t.id == id)
            .ok_or_else(|| DomainError::new(ErrorCode::TokenNotFound, format!("token {}", id)))?;

        if token.is_consumed() {
            return Err(DomainError::new(
                ErrorCode::AlreadyConsumed,
                format!("token {} already consumed", id),
            ));
        }

        token.consumed_at = Some(now);
        Ok(token.clone())
    }
}
