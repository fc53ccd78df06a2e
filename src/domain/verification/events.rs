//! Verification domain events.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{EmailAddress, EventId, Timestamp, TokenId};
use crate::domain_event;

/// A verification code was issued and handed to the delivery channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationIssued {
    pub event_id: EventId,
    pub token_id: TokenId,
    pub email: EmailAddress,
    pub sequence_code: String,
    pub source: String,
    pub expires_at: Timestamp,
    pub occurred_at: Timestamp,
}

domain_event!(
    VerificationIssued,
    event_type = "verification.issued.v1",
    aggregate_id = token_id,
    aggregate_type = "VerificationToken",
    occurred_at = occurred_at,
    event_id = event_id
);

/// A verification code was confirmed and consumed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationConfirmed {
    pub event_id: EventId,
    pub token_id: TokenId,
    pub email: EmailAddress,
    pub sequence_code: String,
    pub occurred_at: Timestamp,
}

domain_event!(
    VerificationConfirmed,
    event_type = "verification.confirmed.v1",
    aggregate_id = token_id,
    aggregate_type = "VerificationToken",
    occurred_at = occurred_at,
    event_id = event_id
);
