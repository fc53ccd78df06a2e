//! Trust-token configuration

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::domain::trust::TrustTokenSigner;

use super::error::ValidationError;

/// Trust-token signing configuration
///
/// The secret is process-wide and loaded once at startup. A deployment
/// without a secret is representable so the signer can fail closed rather
/// than the process refusing to boot.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct TrustConfig {
    /// HMAC signing secret; absent means every trust operation fails closed
    pub secret: Option<SecretString>,

    /// Bind trust digests to the current UTC calendar month
    #[serde(default)]
    pub rotate_monthly: bool,
}

impl TrustConfig {
    /// Builds the signer this configuration describes
    pub fn signer(&self) -> TrustTokenSigner {
        match &self.secret {
            Some(secret) => TrustTokenSigner::new(secret.clone(), self.rotate_monthly),
            None => TrustTokenSigner::unconfigured(),
        }
    }

    /// Validate trust configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(secret) = &self.secret {
            if secret.expose_secret().len() < 16 {
                return Err(ValidationError::TrustSecretTooShort);
            }
        }
        Ok(())
    }
}
