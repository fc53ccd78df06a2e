//! Subscriber domain events.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{EmailAddress, EventId, SubscriberId, Timestamp};
use crate::domain_event;

/// Email ownership was proven for this subscriber.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriberVerified {
    pub event_id: EventId,
    pub subscriber_id: SubscriberId,
    pub email: EmailAddress,
    pub occurred_at: Timestamp,
}

domain_event!(
    SubscriberVerified,
    event_type = "subscriber.verified.v1",
    aggregate_id = subscriber_id,
    aggregate_type = "Subscriber",
    occurred_at = occurred_at,
    event_id = event_id
);

/// The subscriber completed the opt-in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriberSubscribed {
    pub event_id: EventId,
    pub subscriber_id: SubscriberId,
    pub email: EmailAddress,
    pub occurred_at: Timestamp,
}

domain_event!(
    SubscriberSubscribed,
    event_type = "subscriber.subscribed.v1",
    aggregate_id = subscriber_id,
    aggregate_type = "Subscriber",
    occurred_at = occurred_at,
    event_id = event_id
);

/// The subscriber opted out of mailings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriberUnsubscribed {
    pub event_id: EventId,
    pub subscriber_id: SubscriberId,
    pub email: EmailAddress,
    pub occurred_at: Timestamp,
}

domain_event!(
    SubscriberUnsubscribed,
    event_type = "subscriber.unsubscribed.v1",
    aggregate_id = subscriber_id,
    aggregate_type = "Subscriber",
    occurred_at = occurred_at,
    event_id = event_id
);

/// A previously unsubscribed subscriber opted back in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriberResubscribed {
    pub event_id: EventId,
    pub subscriber_id: SubscriberId,
    pub email: EmailAddress,
    pub occurred_at: Timestamp,
}

domain_event!(
    SubscriberResubscribed,
    event_type = "subscriber.resubscribed.v1",
    aggregate_id = subscriber_id,
    aggregate_type = "Subscriber",
    occurred_at = occurred_at,
    event_id = event_id
);
