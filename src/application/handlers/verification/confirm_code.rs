//! ConfirmVerificationHandler - Command handler for confirming codes.

use std::sync::Arc;

use crate::application::lookup_cache::LookupCache;
use crate::domain::foundation::{EmailAddress, EventEnvelope, EventId, Identity, Timestamp};
use crate::domain::subscriber::{
    ConfirmOutcome, SubscriberRecord, SubscriberSubscribed, SubscriberVerified,
};
use crate::domain::trust::{TrustToken, TrustTokenSigner};
use crate::domain::verification::{VerificationConfirmed, VerificationError, VerificationToken};
use crate::ports::{EventPublisher, SubscriberRepository, VerificationTokenRepository};

/// Command to confirm a previously issued verification code.
#[derive(Debug, Clone)]
pub struct ConfirmVerificationCommand {
    pub email: String,
    pub code: String,
    pub signature: String,
    /// Narrows the lookup to one sequence code; without it the most
    /// recent token for the email is taken.
    pub sequence_code: Option<String>,
}

/// Result of a successful confirmation.
#[derive(Debug, Clone)]
pub struct ConfirmVerificationResult {
    /// The consumed token.
    pub token: VerificationToken,
    /// The subscriber after the transition.
    pub subscriber: SubscriberRecord,
    /// Fresh trust token for the caller's cookie/session artifact.
    pub trust_token: TrustToken,
    /// What the confirm actually changed.
    pub outcome: ConfirmOutcome,
}

/// Handler for confirming verification codes.
///
/// Validation order is fixed: exists, not consumed, not superseded, not
/// expired, signature binding. The consume step is the repository's
/// compare-and-swap, so two racing confirms produce exactly one winner.
/// On success the subscriber transitions and a fresh trust token is
/// issued so subsequent requests skip the stateful check.
pub struct ConfirmVerificationHandler {
    tokens: Arc<dyn VerificationTokenRepository>,
    subscribers: Arc<dyn SubscriberRepository>,
    event_publisher: Arc<dyn EventPublisher>,
    signer: Arc<TrustTokenSigner>,
}

impl ConfirmVerificationHandler {
    pub fn new(
        tokens: Arc<dyn VerificationTokenRepository>,
        subscribers: Arc<dyn SubscriberRepository>,
        event_publisher: Arc<dyn EventPublisher>,
        signer: Arc<TrustTokenSigner>,
    ) -> Self {
        Self {
            tokens,
            subscribers,
            event_publisher,
            signer,
        }
    }

    pub async fn handle(
        &self,
        cmd: ConfirmVerificationCommand,
    ) -> Result<ConfirmVerificationResult, VerificationError> {
        let email = EmailAddress::parse(&cmd.email)
            .map_err(|e| VerificationError::invalid_email(e.to_string()))?;
        let now = Timestamp::now();
        let mut cache = LookupCache::new();

        // 1. The subscriber must exist before the single-use token is
        //    spent; a broken record must not burn the user's only code.
        self.load_unique_subscriber(&mut cache, &email).await?;

        // 2. Locate the token the caller is confirming
        let token = self
            .find_token(&email, cmd.sequence_code.as_deref(), &cmd.code)
            .await?;

        // 3. Validate, in order
        if token.is_consumed() {
            return Err(VerificationError::AlreadyConsumed);
        }
        if token.is_superseded() {
            return Err(VerificationError::AlreadySuperseded);
        }
        if token.is_expired(now) {
            return Err(VerificationError::Expired);
        }
        if !self.signer.verify_code_binding(&cmd.code, &email, &cmd.signature)
            || cmd.code != token.code
        {
            return Err(VerificationError::BadSignature);
        }

        // 4. Consume - at most one concurrent confirm wins here
        let consumed = self.tokens.consume(&token.id, now).await?;

        // 5. Transition the subscriber (cache hit from step 1)
        let mut subscriber = self
            .load_unique_subscriber(&mut cache, &email)
            .await?;
        let outcome = subscriber.confirm_verification(now);
        let subscriber = self.subscribers.update(&subscriber).await?;
        cache.invalidate(&email);

        // 6. Re-issue the trust token
        let identity = Identity::subscriber(email.clone());
        let trust_token = self.signer.issue(&identity.subject_key())?;

        // 7. Publish events
        let mut envelopes = vec![EventEnvelope::from_event(&VerificationConfirmed {
            event_id: EventId::new(),
            token_id: consumed.id,
            email: email.clone(),
            sequence_code: consumed.sequence_code.clone(),
            occurred_at: now,
        })];
        if outcome.newly_verified {
            envelopes.push(EventEnvelope::from_event(&SubscriberVerified {
                event_id: EventId::new(),
                subscriber_id: subscriber.id,
                email: email.clone(),
                occurred_at: now,
            }));
        }
        if outcome.newly_subscribed {
            envelopes.push(EventEnvelope::from_event(&SubscriberSubscribed {
                event_id: EventId::new(),
                subscriber_id: subscriber.id,
                email: email.clone(),
                occurred_at: now,
            }));
        }
        self.event_publisher.publish_all(envelopes).await?;

        tracing::info!(
            email = %email,
            sequence_code = %consumed.sequence_code,
            newly_verified = outcome.newly_verified,
            newly_subscribed = outcome.newly_subscribed,
            "verification confirmed"
        );

        Ok(ConfirmVerificationResult {
            token: consumed,
            subscriber,
            trust_token,
            outcome,
        })
    }

    /// Locates the token a confirm attempt refers to.
    ///
    /// Candidates are every token for `(email, sequence_code)`, or for
    /// the email alone, newest first. Re-issues leave several candidates
    /// under one sequence code, so the presented code picks its own token
    /// when it matches one; a superseded code then reports
    /// `AlreadySuperseded` instead of masquerading as a signature failure.
    /// A code matching nothing falls through to the newest candidate and
    /// dies on the signature check.
    async fn find_token(
        &self,
        email: &EmailAddress,
        sequence_code: Option<&str>,
        presented_code: &str,
    ) -> Result<VerificationToken, VerificationError> {
        let candidates = match sequence_code {
            Some(sequence_code) => {
                self.tokens
                    .find_by_email_and_sequence(email, sequence_code)
                    .await?
            }
            None => self.tokens.find_for_email(email).await?,
        };
        if candidates.is_empty() {
            return Err(VerificationError::NotFound);
        }

        let own = candidates.iter().find(|t| t.code == presented_code).cloned();
        Ok(own.unwrap_or_else(|| candidates.into_iter().next().expect("non-empty")))
    }

    async fn load_unique_subscriber(
        &self,
        cache: &mut LookupCache,
        email: &EmailAddress,
    ) -> Result<SubscriberRecord, VerificationError> {
        let mut records = cache
            .subscribers_for(self.subscribers.as_ref(), email)
            .await?;
        match records.len() {
            0 => {
                tracing::error!(email = %email, "token exists but subscriber record is missing");
                Err(VerificationError::NotFound)
            }
            1 => Ok(records.remove(0)),
            matches => {
                tracing::warn!(email = %email, matches, "ambiguous subscriber lookup at confirm");
                Err(VerificationError::ambiguous(matches))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{
        InMemoryEventBus, InMemoryIssuanceThrottle, InMemorySequenceAllocator,
        InMemorySubscriberRepository, InMemoryVerificationTokenRepository, NoopDelivery,
    };
    use crate::application::handlers::verification::{
        IssueSettings, IssueVerificationCommand, IssueVerificationHandler,
    };
    use crate::domain::foundation::TokenId;
    use crate::domain::subscriber::SubscriberStatus;
    use secrecy::SecretString;

    const TEST_SECRET: &str = "confirm_handler_test_secret_0123456789";

    struct Fixture {
        tokens: Arc<InMemoryVerificationTokenRepository>,
        subscribers: Arc<InMemorySubscriberRepository>,
        events: Arc<InMemoryEventBus>,
        signer: Arc<TrustTokenSigner>,
        issue: IssueVerificationHandler,
        confirm: ConfirmVerificationHandler,
    }

    fn fixture() -> Fixture {
        let tokens = Arc::new(InMemoryVerificationTokenRepository::new());
        let subscribers = Arc::new(InMemorySubscriberRepository::new());
        let events = Arc::new(InMemoryEventBus::new());
        let signer = Arc::new(TrustTokenSigner::new(
            SecretString::new(TEST_SECRET.to_string()),
            false,
        ));

        let issue = IssueVerificationHandler::new(
            tokens.clone(),
            subscribers.clone(),
            Arc::new(InMemorySequenceAllocator::new()),
            Arc::new(InMemoryIssuanceThrottle::with_defaults()),
            Arc::new(NoopDelivery::new()),
            events.clone(),
            signer.clone(),
            IssueSettings::default(),
        );

        let confirm = ConfirmVerificationHandler::new(
            tokens.clone(),
            subscribers.clone(),
            events.clone(),
            signer.clone(),
        );

        Fixture {
            tokens,
            subscribers,
            events,
            signer,
            issue,
            confirm,
        }
    }

    fn issue_command(email: &str, code: &str) -> IssueVerificationCommand {
        IssueVerificationCommand {
            email: email.to_string(),
            code: code.to_string(),
            name: "User".to_string(),
            source: "signup_form".to_string(),
            gdpr_consent: true,
            ttl_seconds: 900,
        }
    }

    async fn issued(fixture: &Fixture, email: &str, code: &str) -> VerificationToken {
        fixture
            .issue
            .handle(issue_command(email, code))
            .await
            .unwrap()
            .token
    }

    fn confirm_command(token: &VerificationToken) -> ConfirmVerificationCommand {
        ConfirmVerificationCommand {
            email: token.email.as_str().to_string(),
            code: token.code.clone(),
            signature: token.signature.clone(),
            sequence_code: Some(token.sequence_code.clone()),
        }
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Success Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn roundtrip_confirm_succeeds_once() {
        let fixture = fixture();
        let token = issued(&fixture, "user@example.com", "XK4P9Q").await;

        let result = fixture.confirm.handle(confirm_command(&token)).await.unwrap();

        assert!(result.token.is_consumed());
        assert!(result.outcome.newly_verified);
        assert!(result.outcome.newly_subscribed);
        assert_eq!(result.subscriber.status(), SubscriberStatus::Subscribed);
    }

    #[tokio::test]
    async fn second_confirm_returns_already_consumed() {
        let fixture = fixture();
        let token = issued(&fixture, "user@example.com", "XK4P9Q").await;

        fixture.confirm.handle(confirm_command(&token)).await.unwrap();
        let second = fixture.confirm.handle(confirm_command(&token)).await;

        assert_eq!(second.unwrap_err(), VerificationError::AlreadyConsumed);
    }

    #[tokio::test]
    async fn confirm_without_sequence_code_takes_latest() {
        let fixture = fixture();
        let token = issued(&fixture, "user@example.com", "XK4P9Q").await;

        let mut cmd = confirm_command(&token);
        cmd.sequence_code = None;

        let result = fixture.confirm.handle(cmd).await.unwrap();
        assert_eq!(result.token.id, token.id);
    }

    #[tokio::test]
    async fn trust_token_verifies_after_confirm() {
        let fixture = fixture();
        let token = issued(&fixture, "user@example.com", "XK4P9Q").await;

        let result = fixture.confirm.handle(confirm_command(&token)).await.unwrap();

        assert!(fixture.signer.verify("user@example.com", &result.trust_token));
    }

    #[tokio::test]
    async fn confirm_publishes_lifecycle_events() {
        let fixture = fixture();
        let token = issued(&fixture, "user@example.com", "XK4P9Q").await;
        fixture.events.clear();

        fixture.confirm.handle(confirm_command(&token)).await.unwrap();

        assert!(fixture.events.has_event("verification.confirmed.v1"));
        assert!(fixture.events.has_event("subscriber.verified.v1"));
        assert!(fixture.events.has_event("subscriber.subscribed.v1"));
    }

    #[tokio::test]
    async fn reconfirm_after_reissue_is_idempotent_on_timestamps() {
        let fixture = fixture();
        let first = issued(&fixture, "user@example.com", "XK4P9Q").await;
        fixture.confirm.handle(confirm_command(&first)).await.unwrap();

        let verified_at = fixture.subscribers.all_records().await[0].verified_at;

        let second = issued(&fixture, "user@example.com", "ZZTOP1").await;
        let result = fixture.confirm.handle(confirm_command(&second)).await.unwrap();

        assert!(!result.outcome.newly_verified);
        assert_eq!(result.subscriber.verified_at, verified_at);
    }

    #[tokio::test]
    async fn confirm_after_unsubscribe_restores_subscription() {
        let fixture = fixture();
        let first = issued(&fixture, "user@example.com", "XK4P9Q").await;
        fixture.confirm.handle(confirm_command(&first)).await.unwrap();

        // Unsubscribe directly through the repository.
        let mut record = fixture.subscribers.all_records().await.remove(0);
        record.unsubscribe(Timestamp::now()).unwrap();
        fixture.subscribers.update(&record).await.unwrap();

        let second = issued(&fixture, "user@example.com", "ZZTOP1").await;
        let result = fixture.confirm.handle(confirm_command(&second)).await.unwrap();

        assert!(result.outcome.newly_subscribed);
        assert!(!result.outcome.newly_verified);
        assert_eq!(result.subscriber.status(), SubscriberStatus::Subscribed);
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Validation-Order Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn unknown_email_is_not_found() {
        let fixture = fixture();
        let token = issued(&fixture, "user@example.com", "XK4P9Q").await;

        let mut cmd = confirm_command(&token);
        cmd.email = "other@example.com".to_string();

        let result = fixture.confirm.handle(cmd).await;
        assert_eq!(result.unwrap_err(), VerificationError::NotFound);
    }

    #[tokio::test]
    async fn wrong_sequence_code_is_not_found() {
        let fixture = fixture();
        let token = issued(&fixture, "user@example.com", "XK4P9Q").await;

        let mut cmd = confirm_command(&token);
        cmd.sequence_code = Some("N999999".to_string());

        let result = fixture.confirm.handle(cmd).await;
        assert_eq!(result.unwrap_err(), VerificationError::NotFound);
    }

    #[tokio::test]
    async fn superseded_token_fails_even_before_expiry() {
        let fixture = fixture();
        let first = issued(&fixture, "user@example.com", "XK4P9Q").await;
        let _second = issued(&fixture, "user@example.com", "ZZTOP1").await;

        let result = fixture.confirm.handle(confirm_command(&first)).await;
        assert_eq!(result.unwrap_err(), VerificationError::AlreadySuperseded);
    }

    #[tokio::test]
    async fn expired_token_fails_without_being_consumed() {
        let fixture = fixture();
        let token = issued(&fixture, "user@example.com", "XK4P9Q").await;

        // Craft the stored copy into the past.
        let mut expired = token.clone();
        expired.id = TokenId::new();
        expired.created_at = Timestamp::now().minus_secs(2_000);
        expired.expires_at = Timestamp::now().minus_secs(1_100);
        fixture
            .tokens
            .supersede_active(&token.email, Timestamp::now())
            .await
            .unwrap();
        fixture.tokens.insert_raw(expired.clone()).await;

        let mut cmd = confirm_command(&expired);
        cmd.sequence_code = None;

        let result = fixture.confirm.handle(cmd).await;
        assert_eq!(result.unwrap_err(), VerificationError::Expired);

        let stored = fixture.tokens.all_tokens().await;
        assert!(!stored.iter().find(|t| t.id == expired.id).unwrap().is_consumed());
    }

    #[tokio::test]
    async fn wrong_signature_is_rejected() {
        let fixture = fixture();
        let token = issued(&fixture, "user@example.com", "XK4P9Q").await;

        let mut cmd = confirm_command(&token);
        cmd.signature = "00".repeat(32);

        let result = fixture.confirm.handle(cmd).await;
        assert_eq!(result.unwrap_err(), VerificationError::BadSignature);
    }

    #[tokio::test]
    async fn signature_from_other_issuance_is_rejected() {
        // The current code presented with a superseded issuance's
        // signature must not confirm the replacement token.
        let fixture = fixture();
        let first = issued(&fixture, "user@example.com", "XK4P9Q").await;
        let second = issued(&fixture, "user@example.com", "ZZTOP1").await;

        let cmd = ConfirmVerificationCommand {
            email: "user@example.com".to_string(),
            code: second.code.clone(),
            signature: first.signature.clone(),
            sequence_code: Some(second.sequence_code.clone()),
        };

        let result = fixture.confirm.handle(cmd).await;
        assert_eq!(result.unwrap_err(), VerificationError::BadSignature);
    }

    #[tokio::test]
    async fn replayed_signature_against_other_email_fails() {
        let fixture = fixture();
        let token_a = issued(&fixture, "a@example.com", "XK4P9Q").await;
        let _token_b = issued(&fixture, "b@example.com", "XK4P9Q").await;

        // Same code, signature lifted from a's issuance.
        let cmd = ConfirmVerificationCommand {
            email: "b@example.com".to_string(),
            code: "XK4P9Q".to_string(),
            signature: token_a.signature.clone(),
            sequence_code: None,
        };

        let result = fixture.confirm.handle(cmd).await;
        assert_eq!(result.unwrap_err(), VerificationError::BadSignature);
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Concurrency Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn concurrent_confirms_produce_one_winner() {
        let fixture = Arc::new(fixture());
        let token = issued(&fixture, "user@example.com", "XK4P9Q").await;

        let mut handles = Vec::new();
        for _ in 0..8 {
            let fixture = Arc::clone(&fixture);
            let cmd = confirm_command(&token);
            handles.push(tokio::spawn(async move {
                fixture.confirm.handle(cmd).await.is_ok()
            }));
        }

        let mut winners = 0;
        for handle in handles {
            if handle.await.unwrap() {
                winners += 1;
            }
        }
        assert_eq!(winners, 1);
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Fail-Closed Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn missing_subscriber_record_fails_without_consuming() {
        let fixture = fixture();
        let token = issued(&fixture, "user@example.com", "XK4P9Q").await;

        // Wipe the subscriber rows out from under the token.
        let record = fixture.subscribers.all_records().await.remove(0);
        let broken = SubscriberRecord {
            email: EmailAddress::parse("elsewhere@example.com").unwrap(),
            ..record
        };
        fixture.subscribers.update(&broken).await.unwrap();

        let result = fixture.confirm.handle(confirm_command(&token)).await;
        assert_eq!(result.unwrap_err(), VerificationError::NotFound);

        // The single-use code survives for after the record is repaired.
        let stored = fixture.tokens.all_tokens().await;
        assert!(!stored[0].is_consumed());
    }

    #[tokio::test]
    async fn public_message_never_distinguishes_failures() {
        let fixture = fixture();
        let token = issued(&fixture, "user@example.com", "XK4P9Q").await;

        let mut wrong_sig = confirm_command(&token);
        wrong_sig.signature = "00".repeat(32);
        let sig_err = fixture.confirm.handle(wrong_sig).await.unwrap_err();

        let mut wrong_seq = confirm_command(&token);
        wrong_seq.sequence_code = Some("N999999".to_string());
        let seq_err = fixture.confirm.handle(wrong_seq).await.unwrap_err();

        assert_eq!(sig_err.public_message(), seq_err.public_message());
    }
}
