//! IssueVerificationHandler - Command handler for issuing verification codes.

use std::sync::Arc;

use crate::domain::foundation::{
    EmailAddress, EventEnvelope, EventId, SubscriberId, Timestamp, TokenId,
};
use crate::domain::sequence::SequenceCode;
use crate::domain::subscriber::SubscriberRecord;
use crate::domain::trust::TrustTokenSigner;
use crate::domain::verification::{VerificationError, VerificationIssued, VerificationToken};
use crate::ports::{
    CodeDelivery, CodeDeliveryRequest, EventPublisher, IssuanceThrottle, SequenceAllocator,
    SubscriberRepository, ThrottleDecision, VerificationTokenRepository,
};

/// Sequence naming for issued codes.
#[derive(Debug, Clone)]
pub struct IssueSettings {
    /// The counter name allocations draw from.
    pub counter_name: String,
    /// Prefix on formatted sequence codes.
    pub sequence_prefix: String,
    /// Zero-pad width for formatted sequence codes.
    pub sequence_width: usize,
}

impl Default for IssueSettings {
    fn default() -> Self {
        Self {
            counter_name: "newsletter_seq".to_string(),
            sequence_prefix: "N".to_string(),
            sequence_width: 6,
        }
    }
}

/// Command to issue a verification code.
///
/// The code itself is caller-supplied: the store is agnostic to code
/// entropy policy.
#[derive(Debug, Clone)]
pub struct IssueVerificationCommand {
    pub email: String,
    pub code: String,
    pub name: String,
    pub source: String,
    pub gdpr_consent: bool,
    pub ttl_seconds: u64,
}

/// Result of a successful issuance.
#[derive(Debug, Clone)]
pub struct IssueVerificationResult {
    pub token: VerificationToken,
    pub subscriber: SubscriberRecord,
    /// How many prior active tokens this issuance superseded.
    pub superseded: u32,
}

/// Handler for issuing verification codes.
///
/// Issuance supersedes every prior active token for the email, hands the
/// code to the delivery channel fire-and-forget, and publishes
/// `verification.issued.v1`. Delivery failure never rolls back the
/// issuance.
pub struct IssueVerificationHandler {
    tokens: Arc<dyn VerificationTokenRepository>,
    subscribers: Arc<dyn SubscriberRepository>,
    sequences: Arc<dyn SequenceAllocator>,
    throttle: Arc<dyn IssuanceThrottle>,
    delivery: Arc<dyn CodeDelivery>,
    event_publisher: Arc<dyn EventPublisher>,
    signer: Arc<TrustTokenSigner>,
    settings: IssueSettings,
}

impl IssueVerificationHandler {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        tokens: Arc<dyn VerificationTokenRepository>,
        subscribers: Arc<dyn SubscriberRepository>,
        sequences: Arc<dyn SequenceAllocator>,
        throttle: Arc<dyn IssuanceThrottle>,
        delivery: Arc<dyn CodeDelivery>,
        event_publisher: Arc<dyn EventPublisher>,
        signer: Arc<TrustTokenSigner>,
        settings: IssueSettings,
    ) -> Self {
        Self {
            tokens,
            subscribers,
            sequences,
            throttle,
            delivery,
            event_publisher,
            signer,
            settings,
        }
    }

    pub async fn handle(
        &self,
        cmd: IssueVerificationCommand,
    ) -> Result<IssueVerificationResult, VerificationError> {
        // 1. Consent and input validation
        if !cmd.gdpr_consent {
            return Err(VerificationError::ConsentRequired);
        }
        let email = EmailAddress::parse(&cmd.email)
            .map_err(|e| VerificationError::invalid_email(e.to_string()))?;
        if cmd.code.trim().is_empty() {
            return Err(VerificationError::validation("code", "cannot be empty"));
        }

        // 2. Throttle before touching the allocator
        match self.throttle.check(&email).await? {
            ThrottleDecision::Allowed { .. } => {}
            ThrottleDecision::Denied {
                retry_after_secs, ..
            } => {
                tracing::info!(email = %email, retry_after_secs, "issuance throttled");
                return Err(VerificationError::too_many_requests(retry_after_secs));
            }
        }

        let now = Timestamp::now();

        // 3. Find or create the subscriber record; the sequence names the
        //    subscriber, not the attempt, so re-issues reuse it.
        let subscriber = self.find_or_create_subscriber(&email, now).await?;

        // 4. Supersede prior active tokens for this email
        let superseded = self.tokens.supersede_active(&email, now).await?;

        // 5. Sign and persist the new token
        let signature = self.signer.bind_code(&cmd.code, &email)?;
        let token = VerificationToken::issue(
            TokenId::new(),
            email.clone(),
            cmd.code,
            cmd.name,
            cmd.source,
            subscriber.sequence_id,
            subscriber.sequence_code.clone(),
            signature,
            cmd.ttl_seconds,
            now,
        )?;
        self.tokens.insert(&token).await?;

        // 6. Hand the code to the delivery channel, fire-and-forget
        self.spawn_delivery(&token);

        // 7. Publish event
        let event = VerificationIssued {
            event_id: EventId::new(),
            token_id: token.id,
            email: email.clone(),
            sequence_code: token.sequence_code.clone(),
            source: token.source.clone(),
            expires_at: token.expires_at,
            occurred_at: now,
        };
        self.event_publisher
            .publish(EventEnvelope::from_event(&event))
            .await?;

        tracing::info!(
            email = %email,
            sequence_code = %token.sequence_code,
            superseded,
            "verification code issued"
        );

        Ok(IssueVerificationResult {
            token,
            subscriber,
            superseded,
        })
    }

    async fn find_or_create_subscriber(
        &self,
        email: &EmailAddress,
        now: Timestamp,
    ) -> Result<SubscriberRecord, VerificationError> {
        let mut existing = self.subscribers.find_by_email(email).await?;
        match existing.len() {
            0 => {
                let value = self
                    .sequences
                    .next(&self.settings.counter_name, 1)
                    .await?;
                let sequence = SequenceCode::new(
                    value,
                    &self.settings.sequence_prefix,
                    self.settings.sequence_width,
                );
                let record = SubscriberRecord::signup(
                    SubscriberId::new(),
                    email.clone(),
                    sequence.value,
                    sequence.code,
                    now,
                );
                self.subscribers.insert(&record).await?;
                Ok(record)
            }
            1 => Ok(existing.remove(0)),
            matches => {
                tracing::warn!(email = %email, matches, "ambiguous subscriber lookup at issuance");
                Err(VerificationError::ambiguous(matches))
            }
        }
    }

    /// Delivery is not awaited: the channel owns retries and failures, and
    /// a failed send leaves the issued token confirmable.
    fn spawn_delivery(&self, token: &VerificationToken) {
        let delivery = Arc::clone(&self.delivery);
        let request = CodeDeliveryRequest {
            email: token.email.clone(),
            name: token.name.clone(),
            code: token.code.clone(),
            sequence_code: token.sequence_code.clone(),
            signature: token.signature.clone(),
        };
        tokio::spawn(async move {
            if let Err(err) = delivery.deliver(request).await {
                tracing::warn!(error = %err, "verification code delivery failed");
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{
        InMemoryEventBus, InMemoryIssuanceThrottle, InMemorySequenceAllocator,
        InMemorySubscriberRepository, InMemoryVerificationTokenRepository, RecordingDelivery,
        ThrottleConfig,
    };
    use secrecy::SecretString;
    use std::time::Duration;

    const TEST_SECRET: &str = "issue_handler_test_secret_0123456789";

    struct Fixture {
        tokens: Arc<InMemoryVerificationTokenRepository>,
        subscribers: Arc<InMemorySubscriberRepository>,
        sequences: Arc<InMemorySequenceAllocator>,
        delivery: Arc<RecordingDelivery>,
        events: Arc<InMemoryEventBus>,
        handler: IssueVerificationHandler,
    }

    fn fixture_with_throttle(throttle: InMemoryIssuanceThrottle) -> Fixture {
        let tokens = Arc::new(InMemoryVerificationTokenRepository::new());
        let subscribers = Arc::new(InMemorySubscriberRepository::new());
        let sequences = Arc::new(InMemorySequenceAllocator::new());
        let delivery = Arc::new(RecordingDelivery::new());
        let events = Arc::new(InMemoryEventBus::new());
        let signer = Arc::new(TrustTokenSigner::new(
            SecretString::new(TEST_SECRET.to_string()),
            false,
        ));

        let handler = IssueVerificationHandler::new(
            tokens.clone(),
            subscribers.clone(),
            sequences.clone(),
            Arc::new(throttle),
            delivery.clone(),
            events.clone(),
            signer,
            IssueSettings::default(),
        );

        Fixture {
            tokens,
            subscribers,
            sequences,
            delivery,
            events,
            handler,
        }
    }

    fn fixture() -> Fixture {
        fixture_with_throttle(InMemoryIssuanceThrottle::with_defaults())
    }

    fn command(email: &str) -> IssueVerificationCommand {
        IssueVerificationCommand {
            email: email.to_string(),
            code: "XK4P9Q".to_string(),
            name: "User".to_string(),
            source: "signup_form".to_string(),
            gdpr_consent: true,
            ttl_seconds: 900,
        }
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Success Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn issues_token_with_allocated_sequence() {
        let fixture = fixture();

        let result = fixture.handler.handle(command("user@example.com")).await.unwrap();

        assert_eq!(result.token.sequence_id, 1);
        assert_eq!(result.token.sequence_code, "N000001");
        assert_eq!(result.subscriber.sequence_code, "N000001");
        assert_eq!(result.superseded, 0);
    }

    #[tokio::test]
    async fn normalizes_email_before_issuing() {
        let fixture = fixture();

        let result = fixture.handler.handle(command("  User@Example.COM ")).await.unwrap();

        assert_eq!(result.token.email.as_str(), "user@example.com");
    }

    #[tokio::test]
    async fn creates_unverified_subscriber_on_first_issue() {
        let fixture = fixture();

        fixture.handler.handle(command("user@example.com")).await.unwrap();

        let records = fixture.subscribers.all_records().await;
        assert_eq!(records.len(), 1);
        assert!(!records[0].is_verified);
        assert!(!records[0].is_subscribed);
    }

    #[tokio::test]
    async fn reissue_reuses_subscriber_sequence() {
        let fixture = fixture();

        let first = fixture.handler.handle(command("user@example.com")).await.unwrap();
        let second = fixture.handler.handle(command("user@example.com")).await.unwrap();

        assert_eq!(first.token.sequence_code, second.token.sequence_code);
        assert_eq!(fixture.subscribers.all_records().await.len(), 1);
        // Counter moved once, for the first signup only.
        assert_eq!(fixture.sequences.current("newsletter_seq").await, 1);
    }

    #[tokio::test]
    async fn reissue_supersedes_prior_active_token() {
        let fixture = fixture();

        let first = fixture.handler.handle(command("user@example.com")).await.unwrap();
        let second = fixture.handler.handle(command("user@example.com")).await.unwrap();

        assert_eq!(second.superseded, 1);

        let tokens = fixture.tokens.all_tokens().await;
        let stored_first = tokens.iter().find(|t| t.id == first.token.id).unwrap();
        assert!(stored_first.is_superseded());
        let stored_second = tokens.iter().find(|t| t.id == second.token.id).unwrap();
        assert!(!stored_second.is_superseded());
    }

    #[tokio::test]
    async fn distinct_emails_get_distinct_sequences() {
        let fixture = fixture();

        let a = fixture.handler.handle(command("a@example.com")).await.unwrap();
        let b = fixture.handler.handle(command("b@example.com")).await.unwrap();

        assert_eq!(a.token.sequence_code, "N000001");
        assert_eq!(b.token.sequence_code, "N000002");
    }

    #[tokio::test]
    async fn signature_binds_code_and_email() {
        let fixture = fixture();

        let result = fixture.handler.handle(command("user@example.com")).await.unwrap();

        let signer = TrustTokenSigner::new(SecretString::new(TEST_SECRET.to_string()), false);
        assert!(signer.verify_code_binding(
            "XK4P9Q",
            &result.token.email,
            &result.token.signature
        ));
    }

    #[tokio::test]
    async fn hands_code_to_delivery_channel() {
        let fixture = fixture();

        fixture.handler.handle(command("user@example.com")).await.unwrap();

        // Delivery is spawned; give it a beat.
        tokio::time::sleep(Duration::from_millis(20)).await;

        let deliveries = fixture.delivery.deliveries();
        assert_eq!(deliveries.len(), 1);
        assert_eq!(deliveries[0].code, "XK4P9Q");
        assert_eq!(deliveries[0].sequence_code, "N000001");
    }

    #[tokio::test]
    async fn publishes_issued_event() {
        let fixture = fixture();

        fixture.handler.handle(command("user@example.com")).await.unwrap();

        let events = fixture.events.events_of_type("verification.issued.v1");
        assert_eq!(events.len(), 1);
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Failure Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn fails_without_consent() {
        let fixture = fixture();
        let mut cmd = command("user@example.com");
        cmd.gdpr_consent = false;

        let result = fixture.handler.handle(cmd).await;
        assert_eq!(result.unwrap_err(), VerificationError::ConsentRequired);
        assert!(fixture.tokens.all_tokens().await.is_empty());
    }

    #[tokio::test]
    async fn fails_on_invalid_email() {
        let fixture = fixture();

        let result = fixture.handler.handle(command("not-an-email")).await;
        assert!(matches!(result, Err(VerificationError::InvalidEmail { .. })));
    }

    #[tokio::test]
    async fn fails_on_empty_code() {
        let fixture = fixture();
        let mut cmd = command("user@example.com");
        cmd.code = "   ".to_string();

        let result = fixture.handler.handle(cmd).await;
        assert!(matches!(result, Err(VerificationError::ValidationFailed { .. })));
    }

    #[tokio::test]
    async fn throttled_issue_is_denied_with_retry_hint() {
        let fixture = fixture_with_throttle(InMemoryIssuanceThrottle::new(ThrottleConfig {
            max_per_window: 1,
            window_secs: 3_600,
        }));

        fixture.handler.handle(command("user@example.com")).await.unwrap();
        let result = fixture.handler.handle(command("user@example.com")).await;

        match result {
            Err(VerificationError::TooManyRequests { retry_after_secs }) => {
                assert!(retry_after_secs > 0);
            }
            other => panic!("expected throttle denial, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn throttled_issue_does_not_touch_allocator() {
        let fixture = fixture_with_throttle(InMemoryIssuanceThrottle::new(ThrottleConfig {
            max_per_window: 1,
            window_secs: 3_600,
        }));

        // Second issue for a *new* email is throttled before allocation.
        fixture.handler.handle(command("user@example.com")).await.unwrap();
        let _ = fixture.handler.handle(command("user@example.com")).await;

        assert_eq!(fixture.sequences.current("newsletter_seq").await, 1);
    }

    #[tokio::test]
    async fn counter_outage_surfaces_as_retryable() {
        let fixture = fixture();
        fixture.sequences.set_unavailable(true);

        let result = fixture.handler.handle(command("user@example.com")).await;

        let err = result.unwrap_err();
        assert!(matches!(err, VerificationError::CounterUnavailable { .. }));
        assert!(err.is_retryable());
        assert!(fixture.tokens.all_tokens().await.is_empty());
    }

    #[tokio::test]
    async fn delivery_failure_leaves_token_confirmable() {
        let tokens = Arc::new(InMemoryVerificationTokenRepository::new());
        let subscribers = Arc::new(InMemorySubscriberRepository::new());
        let delivery = Arc::new(RecordingDelivery::failing());
        let signer = Arc::new(TrustTokenSigner::new(
            SecretString::new(TEST_SECRET.to_string()),
            false,
        ));

        let handler = IssueVerificationHandler::new(
            tokens.clone(),
            subscribers,
            Arc::new(InMemorySequenceAllocator::new()),
            Arc::new(InMemoryIssuanceThrottle::with_defaults()),
            delivery.clone(),
            Arc::new(InMemoryEventBus::new()),
            signer,
            IssueSettings::default(),
        );

        let result = handler.handle(command("user@example.com")).await.unwrap();

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(delivery.delivery_count(), 1);

        // Issuance stands despite the channel outage.
        let stored = tokens.all_tokens().await;
        assert_eq!(stored.len(), 1);
        assert!(stored[0].is_active(Timestamp::now()));
        assert_eq!(stored[0].id, result.token.id);
    }

    #[tokio::test]
    async fn ambiguous_subscriber_rows_fail_closed() {
        let fixture = fixture();
        let email = EmailAddress::parse("user@example.com").unwrap();
        for sequence in ["N000010", "N000011"] {
            fixture
                .subscribers
                .insert_raw(SubscriberRecord::signup(
                    SubscriberId::new(),
                    email.clone(),
                    1,
                    sequence.to_string(),
                    Timestamp::now(),
                ))
                .await;
        }

        let result = fixture.handler.handle(command("user@example.com")).await;
        assert!(matches!(result, Err(VerificationError::Ambiguous { matches: 2 })));
        assert!(fixture.tokens.all_tokens().await.is_empty());
    }
}
