//! Verification token configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Verification token issuance configuration
#[derive(Debug, Clone, Deserialize)]
pub struct VerificationConfig {
    /// Default TTL for issued codes, in seconds
    #[serde(default = "default_ttl_seconds")]
    pub default_ttl_seconds: u64,
}

impl VerificationConfig {
    /// Validate verification configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.default_ttl_seconds == 0 {
            return Err(ValidationError::InvalidTtl);
        }
        Ok(())
    }
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            default_ttl_seconds: default_ttl_seconds(),
        }
    }
}

fn default_ttl_seconds() -> u64 {
    900
}
