//! Subscriber-specific error types.

use crate::domain::foundation::{DomainError, EmailAddress, ErrorCode};

/// Errors raised by subscriber lifecycle operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscriberError {
    /// No record exists for this email.
    NotFound(String),

    /// More than one record matched a lookup that must be unique.
    /// The state machine never guesses among candidates.
    Ambiguous { email: String, matches: usize },

    /// Invalid state for the requested operation.
    InvalidState { current: String, attempted: String },

    /// A concurrent update won; the caller may retry.
    Conflict,

    /// Storage-layer failure.
    Storage(String),
}

impl SubscriberError {
    pub fn not_found(email: &EmailAddress) -> Self {
        SubscriberError::NotFound(email.as_str().to_string())
    }

    pub fn ambiguous(email: &EmailAddress, matches: usize) -> Self {
        SubscriberError::Ambiguous {
            email: email.as_str().to_string(),
            matches,
        }
    }

    pub fn invalid_state(current: impl Into<String>, attempted: impl Into<String>) -> Self {
        SubscriberError::InvalidState {
            current: current.into(),
            attempted: attempted.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        SubscriberError::Storage(message.into())
    }

    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            SubscriberError::NotFound(_) => ErrorCode::SubscriberNotFound,
            SubscriberError::Ambiguous { .. } => ErrorCode::Ambiguous,
            SubscriberError::InvalidState { .. } => ErrorCode::InvalidStateTransition,
            SubscriberError::Conflict => ErrorCode::Conflict,
            SubscriberError::Storage(_) => ErrorCode::StorageError,
        }
    }

    /// Returns a diagnostic message.
    pub fn message(&self) -> String {
        match self {
            SubscriberError::NotFound(email) => {
                format!("No subscriber record for {}", email)
            }
            SubscriberError::Ambiguous { email, matches } => {
                format!(
                    "{} subscriber records for {}, refusing to guess",
                    matches, email
                )
            }
            SubscriberError::InvalidState { current, attempted } => {
                format!("Cannot {} a subscriber in {} state", attempted, current)
            }
            SubscriberError::Conflict => "Concurrent update conflict".to_string(),
            SubscriberError::Storage(msg) => format!("Storage error: {}", msg),
        }
    }

    /// Returns true if this error should trigger a caller-side retry.
    pub fn is_retryable(&self) -> bool {
        matches!(self, SubscriberError::Conflict | SubscriberError::Storage(_))
    }
}

impl std::fmt::Display for SubscriberError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for SubscriberError {}

impl From<DomainError> for SubscriberError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::SubscriberNotFound => SubscriberError::NotFound(err.message),
            ErrorCode::Conflict => SubscriberError::Conflict,
            _ => SubscriberError::Storage(err.to_string()),
        }
    }
}
