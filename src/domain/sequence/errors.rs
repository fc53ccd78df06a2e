//! Sequence allocation error types.

use thiserror::Error;

/// Errors that can occur during sequence allocation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SequenceError {
    /// The counter storage is unavailable; the operation may be retried.
    /// Callers must not fall back to a non-atomic increment.
    #[error("sequence counter unavailable: {0}")]
    CounterUnavailable(String),
}
