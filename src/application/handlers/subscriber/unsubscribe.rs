//! UnsubscribeHandler - Command handler for opting out of mailings.

use std::sync::Arc;

use crate::domain::foundation::{EmailAddress, EventEnvelope, EventId, Timestamp};
use crate::domain::subscriber::{SubscriberError, SubscriberRecord, SubscriberUnsubscribed};
use crate::ports::{EventPublisher, SubscriberRepository};

/// Command to unsubscribe an email.
#[derive(Debug, Clone)]
pub struct UnsubscribeCommand {
    pub email: String,
}

/// Result of a successful unsubscribe.
#[derive(Debug, Clone)]
pub struct UnsubscribeResult {
    pub subscriber: SubscriberRecord,
}

/// Handler for unsubscribing.
///
/// Clears the opt-in only: verification survives, so a later
/// resubscription needs no new code.
pub struct UnsubscribeHandler {
    subscribers: Arc<dyn SubscriberRepository>,
    event_publisher: Arc<dyn EventPublisher>,
}

impl UnsubscribeHandler {
    pub fn new(
        subscribers: Arc<dyn SubscriberRepository>,
        event_publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            subscribers,
            event_publisher,
        }
    }

    pub async fn handle(&self, cmd: UnsubscribeCommand) -> Result<UnsubscribeResult, SubscriberError> {
        // An address that cannot parse cannot have a record; fail closed.
        let email = EmailAddress::parse(&cmd.email)
            .map_err(|_| SubscriberError::NotFound(cmd.email.clone()))?;
        let now = Timestamp::now();

        // 1. Find the record
        let mut subscriber = load_unique_subscriber(self.subscribers.as_ref(), &email).await?;

        // 2. Transition (domain logic)
        subscriber.unsubscribe(now)?;

        // 3. Persist
        let subscriber = self.subscribers.update(&subscriber).await?;

        // 4. Publish event
        let event = SubscriberUnsubscribed {
            event_id: EventId::new(),
            subscriber_id: subscriber.id,
            email: email.clone(),
            occurred_at: now,
        };
        self.event_publisher
            .publish(EventEnvelope::from_event(&event))
            .await?;

        tracing::info!(email = %email, "subscriber unsubscribed");

        Ok(UnsubscribeResult { subscriber })
    }
}

/// Shared lookup: zero matches is `NotFound`, several is `Ambiguous`.
/// The state machine never guesses among candidate records.
pub(crate) async fn load_unique_subscriber(
    repo: &dyn SubscriberRepository,
    email: &EmailAddress,
) -> Result<SubscriberRecord, SubscriberError> {
    let mut records = repo.find_by_email(email).await?;
    match records.len() {
        0 => Err(SubscriberError::not_found(email)),
        1 => Ok(records.remove(0)),
        matches => {
            tracing::warn!(email = %email, matches, "ambiguous subscriber lookup");
            Err(SubscriberError::ambiguous(email, matches))
        }
    }
}
