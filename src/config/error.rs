//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Trust secret must be at least 16 characters")]
    TrustSecretTooShort,

    #[error("Sequence counter name cannot be empty")]
    EmptyCounterName,

    #[error("Sequence width must be between 1 and 19")]
    InvalidSequenceWidth,

    #[error("Verification TTL must be greater than zero")]
    InvalidTtl,

    #[error("Throttle window must be greater than zero")]
    InvalidThrottleWindow,

    #[error("Throttle limit must be greater than zero")]
    InvalidThrottleLimit,
}
