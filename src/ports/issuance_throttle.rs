//! Issuance throttle port.
//!
//! Bounds how often verification codes can be issued per email. This is an
//! explicit, independently testable component with a defined window and
//! eviction policy, not a cache whose expiry happens to rate-limit.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, EmailAddress};

/// Port for per-email issuance throttling.
///
/// Implementations should be thread-safe and support concurrent access.
#[async_trait]
pub trait IssuanceThrottle: Send + Sync {
    /// Checks whether an issuance is allowed for this email, consuming one
    /// slot of the current window if so.
    async fn check(&self, email: &EmailAddress) -> Result<ThrottleDecision, DomainError>;

    /// Clears the window for an email (admin/test operation).
    async fn reset(&self, email: &EmailAddress) -> Result<(), DomainError>;
}

/// Outcome of a throttle check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThrottleDecision {
    /// Issuance allowed; `remaining` slots left in this window.
    Allowed { remaining: u32 },

    /// Issuance denied until the window rolls over.
    Denied { limit: u32, retry_after_secs: u32 },
}

impl ThrottleDecision {
    /// Returns true if the issuance was allowed.
    pub fn is_allowed(&self) -> bool {
        matches!(self, ThrottleDecision::Allowed { .. })
    }

    /// Returns true if the issuance was denied.
    pub fn is_denied(&self) -> bool {
        matches!(self, ThrottleDecision::Denied { .. })
    }
}
