//! Trust-token error types.

use thiserror::Error;

use crate::domain::foundation::ErrorCode;

/// Errors that can occur when issuing trust material.
///
/// `verify` never returns these: verification fails closed by returning
/// `false`, and the reason stays internal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TrustError {
    /// The subject key is empty or otherwise unusable.
    #[error("subject key is empty or invalid")]
    InvalidIdentity,

    /// No signing secret is configured; the signer refuses to operate.
    #[error("trust secret is not configured")]
    MissingSecret,
}

impl TrustError {
    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            TrustError::InvalidIdentity => ErrorCode::InvalidIdentity,
            TrustError::MissingSecret => ErrorCode::MissingSecret,
        }
    }
}
