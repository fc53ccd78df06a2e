//! Trust token value object.

use serde::{Deserialize, Serialize};

/// A stateless proof that an identity was established with this service.
///
/// The token carries no server-side state: holding a digest that matches
/// the recomputed HMAC for the subject key (and, with rotation, the current
/// UTC month) *is* the proof. The core never persists these; the
/// cookie/session transport owns the artifact and its attributes.
///
/// # Invariants
///
/// - Equal `(subject_key, issued_period)` always produce equal digests.
/// - Digests for different subject keys are computationally unlinkable
///   (standard HMAC unforgeability).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrustToken {
    /// The normalized subject key the digest is bound to.
    pub subject_key: String,

    /// The UTC calendar month (`YYYY-MM`) the token was issued in.
    /// Absent when rotation is disabled.
    pub issued_period: Option<String>,

    /// HMAC-SHA256 over the subject key (and period, when present).
    pub digest: Vec<u8>,
}

impl TrustToken {
    /// Returns the digest as lowercase hex, the form transports embed.
    pub fn digest_hex(&self) -> String {
        hex::encode(&self.digest)
    }
}
