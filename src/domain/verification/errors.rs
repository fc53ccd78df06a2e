//! Verification-specific error types.
//!
//! The enum carries the precise failure for logging and diagnostics; what
//! crosses a trust boundary is `public_message()`, which collapses every
//! confirm-path failure into one generic signal so callers cannot probe
//! which check failed.

use crate::domain::foundation::{DomainError, ErrorCode, ValidationError};
use crate::domain::sequence::SequenceError;
use crate::domain::trust::TrustError;

/// Errors raised by the verification issue/confirm operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationError {
    /// Issuance without explicit GDPR consent.
    ConsentRequired,

    /// The presented email failed syntactic validation.
    InvalidEmail { reason: String },

    /// A request field failed validation.
    ValidationFailed { field: String, message: String },

    /// No matching token exists.
    NotFound,

    /// More than one token matched a lookup that must be unique.
    Ambiguous { matches: usize },

    /// The token was already spent.
    AlreadyConsumed,

    /// A newer token for the same email replaced this one.
    AlreadySuperseded,

    /// The token's TTL has elapsed.
    Expired,

    /// The presented code/signature pair does not bind to this token.
    BadSignature,

    /// Issuance throttled for this email.
    TooManyRequests { retry_after_secs: u32 },

    /// The trust secret is not configured; nothing can be signed.
    MissingSecret,

    /// The sequence counter storage is unavailable.
    CounterUnavailable { reason: String },

    /// A concurrent update won; the caller may retry.
    Conflict,

    /// Storage-layer failure.
    Storage(String),
}

impl VerificationError {
    pub fn invalid_email(reason: impl Into<String>) -> Self {
        VerificationError::InvalidEmail {
            reason: reason.into(),
        }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        VerificationError::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn ambiguous(matches: usize) -> Self {
        VerificationError::Ambiguous { matches }
    }

    pub fn too_many_requests(retry_after_secs: u32) -> Self {
        VerificationError::TooManyRequests { retry_after_secs }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        VerificationError::Storage(message.into())
    }

    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            VerificationError::ConsentRequired => ErrorCode::ConsentRequired,
            VerificationError::InvalidEmail { .. } => ErrorCode::InvalidEmail,
            VerificationError::ValidationFailed { .. } => ErrorCode::ValidationFailed,
            VerificationError::NotFound => ErrorCode::TokenNotFound,
            VerificationError::Ambiguous { .. } => ErrorCode::Ambiguous,
            VerificationError::AlreadyConsumed => ErrorCode::AlreadyConsumed,
            VerificationError::AlreadySuperseded => ErrorCode::AlreadySuperseded,
            VerificationError::Expired => ErrorCode::Expired,
            VerificationError::BadSignature => ErrorCode::BadSignature,
            VerificationError::TooManyRequests { .. } => ErrorCode::TooManyRequests,
            VerificationError::MissingSecret => ErrorCode::MissingSecret,
            VerificationError::CounterUnavailable { .. } => ErrorCode::CounterUnavailable,
            VerificationError::Conflict => ErrorCode::Conflict,
            VerificationError::Storage(_) => ErrorCode::StorageError,
        }
    }

    /// Returns the internal diagnostic message.
    pub fn message(&self) -> String {
        match self {
            VerificationError::ConsentRequired => {
                "Consent is required to issue a verification code".to_string()
            }
            VerificationError::InvalidEmail { reason } => {
                format!("Invalid email address: {}", reason)
            }
            VerificationError::ValidationFailed { field, message } => {
                format!("Validation failed for '{}': {}", field, message)
            }
            VerificationError::NotFound => "No matching verification token".to_string(),
            VerificationError::Ambiguous { matches } => {
                format!("Lookup matched {} tokens, refusing to guess", matches)
            }
            VerificationError::AlreadyConsumed => {
                "Verification token was already consumed".to_string()
            }
            VerificationError::AlreadySuperseded => {
                "Verification token was superseded by a newer issuance".to_string()
            }
            VerificationError::Expired => "Verification token has expired".to_string(),
            VerificationError::BadSignature => {
                "Presented code/signature pair does not match".to_string()
            }
            VerificationError::TooManyRequests { retry_after_secs } => {
                format!(
                    "Too many verification requests; retry after {} seconds",
                    retry_after_secs
                )
            }
            VerificationError::MissingSecret => "Trust secret is not configured".to_string(),
            VerificationError::CounterUnavailable { reason } => {
                format!("Sequence counter unavailable: {}", reason)
            }
            VerificationError::Conflict => "Concurrent update conflict".to_string(),
            VerificationError::Storage(msg) => format!("Storage error: {}", msg),
        }
    }

    /// The only signal exposed across a trust boundary for confirm-path
    /// failures. Identical for every token-state failure so response
    /// content leaks nothing about which check failed.
    pub fn public_message(&self) -> &'static str {
        match self {
            VerificationError::NotFound
            | VerificationError::Ambiguous { .. }
            | VerificationError::AlreadyConsumed
            | VerificationError::AlreadySuperseded
            | VerificationError::Expired
            | VerificationError::BadSignature => "invalid or expired verification code",
            VerificationError::ConsentRequired => "consent is required",
            VerificationError::InvalidEmail { .. } | VerificationError::ValidationFailed { .. } => {
                "invalid request"
            }
            VerificationError::TooManyRequests { .. } => "too many requests",
            VerificationError::MissingSecret
            | VerificationError::CounterUnavailable { .. }
            | VerificationError::Conflict
            | VerificationError::Storage(_) => "temporarily unavailable",
        }
    }

    /// Returns true if this error should trigger a caller-side retry.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            VerificationError::CounterUnavailable { .. }
                | VerificationError::Conflict
                | VerificationError::Storage(_)
        )
    }
}

impl std::fmt::Display for VerificationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for VerificationError {}

impl From<ValidationError> for VerificationError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::EmptyField { field } => VerificationError::ValidationFailed {
                message: format!("'{}' cannot be empty", field),
                field,
            },
            ValidationError::InvalidFormat { field, reason } => {
                VerificationError::ValidationFailed {
                    field,
                    message: reason,
                }
            }
        }
    }
}

impl From<TrustError> for VerificationError {
    fn from(err: TrustError) -> Self {
        match err {
            TrustError::MissingSecret => VerificationError::MissingSecret,
            TrustError::InvalidIdentity => {
                VerificationError::invalid_email("empty subject key")
            }
        }
    }
}

impl From<SequenceError> for VerificationError {
    fn from(err: SequenceError) -> Self {
        match err {
            SequenceError::CounterUnavailable(reason) => {
                VerificationError::CounterUnavailable { reason }
            }
        }
    }
}

impl From<DomainError> for VerificationError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::AlreadyConsumed => VerificationError::AlreadyConsumed,
            ErrorCode::TokenNotFound => VerificationError::NotFound,
            ErrorCode::Conflict => VerificationError::Conflict,
            _ => VerificationError::Storage(err.to_string()),
        }
    }
}
