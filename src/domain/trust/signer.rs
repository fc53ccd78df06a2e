//! Trust-token issuance and verification.
//!
//! Implements the keyed-hash capability check at the heart of the crate:
//! a token is trustworthy iff its digest matches the HMAC-SHA256 the signer
//! recomputes for the claimed subject key. No database access, O(1), and
//! nothing to revoke short of rotating the secret, which is exactly what
//! the optional monthly rotation does, bounding a leaked token's life to
//! the issuing UTC calendar month.

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::domain::foundation::{EmailAddress, Timestamp};

use super::errors::TrustError;
use super::token::TrustToken;

/// Issues and verifies HMAC-SHA256 trust tokens.
///
/// The secret is process-wide configuration loaded once at startup. An
/// unconfigured signer fails closed: `issue` signals `MissingSecret`,
/// `verify` returns `false`.
pub struct TrustTokenSigner {
    /// The signing secret; `None` means the signer is unconfigured.
    secret: Option<SecretString>,
    /// Whether digests are bound to the current UTC calendar month.
    rotate_monthly: bool,
}

impl TrustTokenSigner {
    /// Creates a signer with the given secret.
    pub fn new(secret: SecretString, rotate_monthly: bool) -> Self {
        Self {
            secret: Some(secret),
            rotate_monthly,
        }
    }

    /// Creates a signer with no secret. Every operation fails closed.
    pub fn unconfigured() -> Self {
        Self {
            secret: None,
            rotate_monthly: false,
        }
    }

    /// Returns true when monthly rotation is enabled.
    pub fn rotates_monthly(&self) -> bool {
        self.rotate_monthly
    }

    /// Issues a trust token for a previously normalized subject key.
    ///
    /// # Errors
    ///
    /// - `InvalidIdentity` - the subject key is empty
    /// - `MissingSecret` - no signing secret is configured
    pub fn issue(&self, subject_key: &str) -> Result<TrustToken, TrustError> {
        self.issue_at(subject_key, Timestamp::now())
    }

    /// Issues a trust token as of an explicit instant.
    ///
    /// Split out from [`issue`](Self::issue) so rotation boundaries are
    /// testable without a real clock.
    pub fn issue_at(&self, subject_key: &str, now: Timestamp) -> Result<TrustToken, TrustError> {
        if subject_key.trim().is_empty() {
            return Err(TrustError::InvalidIdentity);
        }

        let issued_period = self.rotate_monthly.then(|| now.rotation_period());
        let digest = self
            .compute_digest(subject_key, issued_period.as_deref())
            .ok_or(TrustError::MissingSecret)?;

        Ok(TrustToken {
            subject_key: subject_key.to_string(),
            issued_period,
            digest,
        })
    }

    /// Verifies a presented trust token against a subject key.
    ///
    /// Recomputes the expected digest for the subject key (with rotation
    /// enabled, for the *current* UTC month; only the current month's
    /// digest is accepted) and compares in constant time. Returns `false`
    /// on any malformed input, including an empty subject key, an empty
    /// digest, or an unconfigured secret. Never errors.
    pub fn verify(&self, subject_key: &str, presented: &TrustToken) -> bool {
        self.verify_at(subject_key, presented, Timestamp::now())
    }

    /// Verifies a presented trust token as of an explicit instant.
    pub fn verify_at(&self, subject_key: &str, presented: &TrustToken, now: Timestamp) -> bool {
        if subject_key.trim().is_empty() || presented.digest.is_empty() {
            return false;
        }

        let current_period = self.rotate_monthly.then(|| now.rotation_period());
        let expected = match self.compute_digest(subject_key, current_period.as_deref()) {
            Some(digest) => digest,
            None => {
                tracing::warn!("trust verification attempted without a configured secret");
                return false;
            }
        };

        constant_time_compare(&expected, &presented.digest)
    }

    /// Computes the hex signature binding a verification code to an email.
    ///
    /// Bindings are domain-separated from trust-token digests and never
    /// carry a rotation period: a confirm link issued minutes before a
    /// month boundary must not die at midnight. The code's TTL alone bounds
    /// its life.
    ///
    /// # Errors
    ///
    /// - `MissingSecret` - no signing secret is configured
    pub fn bind_code(&self, code: &str, email: &EmailAddress) -> Result<String, TrustError> {
        let input = format!("confirm|{}|{}", code, email.as_str());
        let digest = self
            .compute_raw(input.as_bytes())
            .ok_or(TrustError::MissingSecret)?;
        Ok(hex::encode(digest))
    }

    /// Checks a presented hex signature against the binding of
    /// `(code, email)`.
    ///
    /// Returns `false` on bad hex, a digest mismatch, or an unconfigured
    /// secret. Never errors.
    pub fn verify_code_binding(
        &self,
        code: &str,
        email: &EmailAddress,
        presented_hex: &str,
    ) -> bool {
        let presented = match hex::decode(presented_hex) {
            Ok(bytes) => bytes,
            Err(_) => return false,
        };

        let input = format!("confirm|{}|{}", code, email.as_str());
        match self.compute_raw(input.as_bytes()) {
            Some(expected) => constant_time_compare(&expected, &presented),
            None => false,
        }
    }

    /// HMAC input layout: `subject_key` alone, or `subject_key|period`.
    fn compute_digest(&self, subject_key: &str, period: Option<&str>) -> Option<Vec<u8>> {
        let input = match period {
            Some(period) => format!("{}|{}", subject_key, period),
            None => subject_key.to_string(),
        };
        self.compute_raw(input.as_bytes())
    }

    fn compute_raw(&self, input: &[u8]) -> Option<Vec<u8>> {
        let secret = self.secret.as_ref()?;
        let mut mac = Hmac::<Sha256>::new_from_slice(secret.expose_secret().as_bytes())
            .expect("HMAC accepts any key");
        mac.update(input);
        Some(mac.finalize().into_bytes().to_vec())
    }
}

/// Performs constant-time comparison of two byte slices.
///
/// This prevents timing attacks that could leak information about the
/// expected digest.
fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}
