//! Subscriber record aggregate.
//!
//! # Invariants
//!
//! - `is_subscribed == true` implies `is_verified == true`, enforced on
//!   every transition (a subscriber cannot opt in without proving the
//!   address first).
//! - Transitions are one-directional except unsubscribe, which clears
//!   `is_subscribed` but leaves `is_verified` untouched.
//! - `verified_at`/`subscribed_at` are filled once and never cleared;
//!   repeated confirms only fill fields that are still empty.
//! - Concurrent updates are serialized per email via the `version` field
//!   (optimistic locking; stale writes are rejected by the repository).

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{EmailAddress, StateMachine, SubscriberId, Timestamp};

use super::errors::SubscriberError;
use super::status::SubscriberStatus;

/// What a confirm actually changed, for event publication.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmOutcome {
    /// The record went from unverified to verified in this call.
    pub newly_verified: bool,
    /// The record went from not-subscribed to subscribed in this call.
    pub newly_subscribed: bool,
}

/// A subscriber/member record and its lifecycle flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriberRecord {
    /// Unique identifier for this record.
    pub id: SubscriberId,

    /// Normalized email address; the lookup key.
    pub email: EmailAddress,

    /// The sequence counter value allocated at first signup.
    pub sequence_id: u64,

    /// The formatted sequence code, e.g. `N000123`.
    pub sequence_code: String,

    /// Email ownership proven.
    pub is_verified: bool,

    /// Currently opted in to mailings.
    pub is_subscribed: bool,

    /// When ownership was first proven.
    pub verified_at: Option<Timestamp>,

    /// When the subscriber first opted in.
    pub subscribed_at: Option<Timestamp>,

    /// When the record was created.
    pub created_at: Timestamp,

    /// When the record was last updated.
    pub updated_at: Timestamp,

    /// Optimistic-lock version, bumped by the repository on update.
    pub version: u64,
}

impl SubscriberRecord {
    /// Creates a fresh, unverified record at signup.
    pub fn signup(
        id: SubscriberId,
        email: EmailAddress,
        sequence_id: u64,
        sequence_code: String,
        now: Timestamp,
    ) -> Self {
        Self {
            id,
            email,
            sequence_id,
            sequence_code,
            is_verified: false,
            is_subscribed: false,
            verified_at: None,
            subscribed_at: None,
            created_at: now,
            updated_at: now,
            version: 0,
        }
    }

    /// The lifecycle status derived from the flags.
    pub fn status(&self) -> SubscriberStatus {
        match (self.is_verified, self.is_subscribed) {
            (false, _) => SubscriberStatus::Unverified,
            (true, true) => SubscriberStatus::Subscribed,
            // Verified but not subscribed: never opted in, or opted out.
            (true, false) => {
                if self.subscribed_at.is_some() {
                    SubscriberStatus::Unsubscribed
                } else {
                    SubscriberStatus::Verified
                }
            }
        }
    }

    /// Applies a successful verification confirm.
    ///
    /// Confirmation implies subscription in this model: a single confirm
    /// link both proves the address and completes the opt-in, including
    /// restoring `is_subscribed` for a previously unsubscribed record.
    ///
    /// Idempotent: re-confirming an already-verified subscriber changes no
    /// existing timestamp; only empty fields are filled.
    pub fn confirm_verification(&mut self, now: Timestamp) -> ConfirmOutcome {
        let newly_verified = !self.is_verified;
        let newly_subscribed = !self.is_subscribed;

        self.is_verified = true;
        if self.verified_at.is_none() {
            self.verified_at = Some(now);
        }

        self.is_subscribed = true;
        if self.subscribed_at.is_none() {
            self.subscribed_at = Some(now);
        }

        if newly_verified || newly_subscribed {
            self.updated_at = now;
        }

        debug_assert!(self.invariant_holds());
        ConfirmOutcome {
            newly_verified,
            newly_subscribed,
        }
    }

    /// Opts the subscriber out of mailings.
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` unless the record is currently subscribed.
    /// Verification is untouched.
    pub fn unsubscribe(&mut self, now: Timestamp) -> Result<(), SubscriberError> {
        self.status()
            .transition_to(SubscriberStatus::Unsubscribed)
            .map_err(|_| {
                SubscriberError::invalid_state(format!("{:?}", self.status()), "unsubscribe")
            })?;

        self.is_subscribed = false;
        self.updated_at = now;

        debug_assert!(self.invariant_holds());
        Ok(())
    }

    /// Restores the opt-in for a verified record without re-verification.
    ///
    /// `subscribed_at` keeps the original first opt-in instant.
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` unless the record is unsubscribed (or
    /// verified and never subscribed).
    pub fn resubscribe(&mut self, now: Timestamp) -> Result<(), SubscriberError> {
        self.status()
            .transition_to(SubscriberStatus::Subscribed)
            .map_err(|_| {
                SubscriberError::invalid_state(format!("{:?}", self.status()), "resubscribe")
            })?;

        self.is_subscribed = true;
        if self.subscribed_at.is_none() {
            self.subscribed_at = Some(now);
        }
        self.updated_at = now;

        debug_assert!(self.invariant_holds());
        Ok(())
    }

    /// The core invariant: subscribed implies verified.
    pub fn invariant_holds(&self) -> bool {
        !self.is_subscribed || self.is_verified
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn email() -> EmailAddress {
        EmailAddress::parse("user@example.com").unwrap()
    }

    fn fresh_record(now: Timestamp) -> SubscriberRecord {
        SubscriberRecord::signup(SubscriberId::new(), email(), 123, "N000123".to_string(), now)
    }

    #[test]
    fn signup_starts_unverified() {
        let record = fresh_record(Timestamp::now());
        assert_eq!(record.status(), SubscriberStatus::Unverified);
        assert!(!record.is_verified);
        assert!(!record.is_subscribed);
        assert!(record.invariant_holds());
    }

    #[test]
    fn confirm_sets_both_flags_and_timestamps() {
        let now = Timestamp::from_unix_secs(1_000);
        let mut record = fresh_record(now);

        let outcome = record.confirm_verification(now.plus_secs(60));

        assert!(outcome.newly_verified);
        assert!(outcome.newly_subscribed);
        assert!(record.is_verified);
        assert!(record.is_subscribed);
        assert_eq!(record.verified_at, Some(now.plus_secs(60)));
        assert_eq!(record.subscribed_at, Some(now.plus_secs(60)));
        assert_eq!(record.status(), SubscriberStatus::Subscribed);
    }

    #[test]
    fn confirm_is_idempotent_on_timestamps() {
        let now = Timestamp::from_unix_secs(1_000);
        let mut record = fresh_record(now);

        record.confirm_verification(now.plus_secs(60));
        let first_verified_at = record.verified_at;
        let first_subscribed_at = record.subscribed_at;

        let outcome = record.confirm_verification(now.plus_secs(3_600));

        assert!(!outcome.newly_verified);
        assert!(!outcome.newly_subscribed);
        assert_eq!(record.verified_at, first_verified_at);
        assert_eq!(record.subscribed_at, first_subscribed_at);
    }

    #[test]
    fn unsubscribe_clears_only_subscription() {
        let now = Timestamp::from_unix_secs(1_000);
        let mut record = fresh_record(now);
        record.confirm_verification(now.plus_secs(60));

        record.unsubscribe(now.plus_secs(120)).unwrap();

        assert!(!record.is_subscribed);
        assert!(record.is_verified);
        assert_eq!(record.status(), SubscriberStatus::Unsubscribed);
        assert!(record.invariant_holds());
    }

    #[test]
    fn unsubscribe_requires_subscription() {
        let now = Timestamp::from_unix_secs(1_000);
        let mut record = fresh_record(now);

        let result = record.unsubscribe(now);
        assert!(matches!(result, Err(SubscriberError::InvalidState { .. })));
    }

    #[test]
    fn double_unsubscribe_fails() {
        let now = Timestamp::from_unix_secs(1_000);
        let mut record = fresh_record(now);
        record.confirm_verification(now.plus_secs(60));
        record.unsubscribe(now.plus_secs(120)).unwrap();

        let result = record.unsubscribe(now.plus_secs(180));
        assert!(matches!(result, Err(SubscriberError::InvalidState { .. })));
    }

    #[test]
    fn resubscribe_restores_subscription_without_reverification() {
        let now = Timestamp::from_unix_secs(1_000);
        let mut record = fresh_record(now);
        record.confirm_verification(now.plus_secs(60));
        record.unsubscribe(now.plus_secs(120)).unwrap();

        record.resubscribe(now.plus_secs(180)).unwrap();

        assert!(record.is_subscribed);
        assert!(record.is_verified);
        // First opt-in instant survives the round trip.
        assert_eq!(record.subscribed_at, Some(now.plus_secs(60)));
    }

    #[test]
    fn confirm_after_unsubscribe_restores_subscription() {
        let now = Timestamp::from_unix_secs(1_000);
        let mut record = fresh_record(now);
        record.confirm_verification(now.plus_secs(60));
        record.unsubscribe(now.plus_secs(120)).unwrap();

        let outcome = record.confirm_verification(now.plus_secs(180));

        assert!(!outcome.newly_verified);
        assert!(outcome.newly_subscribed);
        assert!(record.is_subscribed);
        assert_eq!(record.verified_at, Some(now.plus_secs(60)));
    }

    #[test]
    fn resubscribe_of_unverified_record_fails() {
        let now = Timestamp::from_unix_secs(1_000);
        let mut record = fresh_record(now);

        let result = record.resubscribe(now);
        assert!(matches!(result, Err(SubscriberError::InvalidState { .. })));
    }

    #[test]
    fn resubscribe_while_subscribed_fails() {
        let now = Timestamp::from_unix_secs(1_000);
        let mut record = fresh_record(now);
        record.confirm_verification(now.plus_secs(60));

        let result = record.resubscribe(now.plus_secs(120));
        assert!(matches!(result, Err(SubscriberError::InvalidState { .. })));
    }

    #[test]
    fn status_distinguishes_never_subscribed_from_opted_out() {
        let now = Timestamp::from_unix_secs(1_000);

        // Verified-only record (constructed as stored data would be).
        let mut verified_only = fresh_record(now);
        verified_only.is_verified = true;
        verified_only.verified_at = Some(now);
        assert_eq!(verified_only.status(), SubscriberStatus::Verified);

        let mut opted_out = fresh_record(now);
        opted_out.confirm_verification(now);
        opted_out.unsubscribe(now.plus_secs(1)).unwrap();
        assert_eq!(opted_out.status(), SubscriberStatus::Unsubscribed);
    }
}
