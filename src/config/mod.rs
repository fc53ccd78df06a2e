//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment
//! variables using the `config` and `dotenvy` crates. Configuration is
//! loaded with the `TRUSTGATE` prefix and nested values use double
//! underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use trustgate::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! let signer = config.trust.signer();
//! ```

mod error;
mod sequence;
mod throttle;
mod trust;
mod verification;

pub use error::{ConfigError, ValidationError};
pub use sequence::SequenceConfig;
pub use throttle::ThrottleSettings;
pub use trust::TrustConfig;
pub use verification::VerificationConfig;

use serde::Deserialize;

/// Root application configuration
///
/// Every section has working defaults except the trust secret, which is
/// deliberately optional: without it the signer fails closed instead of
/// the process refusing to start.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    /// Trust-token signing (secret, rotation)
    #[serde(default)]
    pub trust: TrustConfig,

    /// Sequence counter naming and code formatting
    #[serde(default)]
    pub sequence: SequenceConfig,

    /// Verification token issuance
    #[serde(default)]
    pub verification: VerificationConfig,

    /// Per-email issuance throttling
    #[serde(default)]
    pub throttle: ThrottleSettings,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `TRUSTGATE` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `TRUSTGATE__TRUST__SECRET=...` -> `trust.secret = ...`
    /// - `TRUSTGATE__SEQUENCE__WIDTH=8` -> `sequence.width = 8`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into the expected
    /// types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("TRUSTGATE")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.trust.validate()?;
        self.sequence.validate()?;
        self.verification.validate()?;
        self.throttle.validate()?;
        Ok(())
    }
}
