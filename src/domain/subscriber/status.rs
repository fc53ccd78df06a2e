//! Subscriber status state machine.
//!
//! Defines the subscriber lifecycle and its valid transitions.

use crate::domain::foundation::StateMachine;
use serde::{Deserialize, Serialize};

/// Where a subscriber sits in the verification/opt-in lifecycle.
///
/// Derived from the record's `is_verified`/`is_subscribed` pair rather than
/// stored separately, so the status can never drift from the flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriberStatus {
    /// Signed up, email ownership not yet proven. No mailings.
    Unverified,

    /// Email ownership proven, not (or not yet) opted in.
    Verified,

    /// Verified and opted in. Receives mailings.
    Subscribed,

    /// Opted out after subscribing. Verification survives, so
    /// resubscription needs no new code.
    Unsubscribed,
}

impl SubscriberStatus {
    /// Returns true if this status should receive mailings.
    pub fn receives_mailings(&self) -> bool {
        matches!(self, SubscriberStatus::Subscribed)
    }

    /// Returns true if email ownership has been proven in this status.
    pub fn is_verified(&self) -> bool {
        !matches!(self, SubscriberStatus::Unverified)
    }
}

impl StateMachine for SubscriberStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use SubscriberStatus::*;
        matches!(
            (self, target),
            // From UNVERIFIED
            (Unverified, Verified)
            // From VERIFIED
                | (Verified, Subscribed)
            // From SUBSCRIBED
                | (Subscribed, Unsubscribed)
            // From UNSUBSCRIBED (no re-verification required)
                | (Unsubscribed, Subscribed)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use SubscriberStatus::*;
        match self {
            Unverified => vec![Verified],
            Verified => vec![Subscribed],
            Subscribed => vec![Unsubscribed],
            Unsubscribed => vec![Subscribed],
        }
    }
}
