//! ResubscribeHandler - Command handler for opting back in.

use std::sync::Arc;

use crate::domain::foundation::{EmailAddress, EventEnvelope, EventId, Timestamp};
use crate::domain::subscriber::{SubscriberError, SubscriberRecord, SubscriberResubscribed};
use crate::ports::{EventPublisher, SubscriberRepository};

use super::unsubscribe::load_unique_subscriber;

/// Command to restore a previously unsubscribed email.
#[derive(Debug, Clone)]
pub struct ResubscribeCommand {
    pub email: String,
}

/// Result of a successful resubscribe.
#[derive(Debug, Clone)]
pub struct ResubscribeResult {
    pub subscriber: SubscriberRecord,
}

/// Handler for resubscribing.
///
/// Verification survived the unsubscribe, so no new code is required;
/// the record just opts back in.
pub struct ResubscribeHandler {
    subscribers: Arc<dyn SubscriberRepository>,
    event_publisher: Arc<dyn EventPublisher>,
}

impl ResubscribeHandler {
    pub fn new(
        subscribers: Arc<dyn SubscriberRepository>,
        event_publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            subscribers,
            event_publisher,
        }
    }

    pub async fn handle(&self, cmd: ResubscribeCommand) -> Result<ResubscribeResult, SubscriberError> {
        let email = EmailAddress::parse(&cmd.email)
            .map_err(|_| SubscriberError::NotFound(cmd.email.clone()))?;
        let now = Timestamp::now();

        // 1. Find the record
        let mut subscriber = load_unique_subscriber(self.subscribers.as_ref(), &email).await?;

        // 2. Transition (domain logic)
        subscriber.resubscribe(now)?;

        // 3. Persist
        let subscriber = self.subscribers.update(&subscriber).await?;

        // 4. Publish event
        let event = SubscriberResubscribed {
            event_id: EventId::new(),
            subscriber_id: subscriber.id,
            email: email.clone(),
            occurred_at: now,
        };
        self.event_publisher
            .publish(EventEnvelope::from_event(&event))
            .await?;

        tracing::info!(email = %email, "subscriber resubscribed");

        Ok(ResubscribeResult { subscriber })
    }
}
