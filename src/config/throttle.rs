//! Issuance throttle configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Per-email issuance throttle configuration
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ThrottleSettings {
    /// Maximum issuances per email per window
    #[serde(default = "default_max_per_window")]
    pub max_per_window: u32,

    /// Window span in seconds
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,
}

impl ThrottleSettings {
    /// Validate throttle configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.max_per_window == 0 {
            return Err(ValidationError::InvalidThrottleLimit);
        }
        if self.window_secs == 0 {
            return Err(ValidationError::InvalidThrottleWindow);
        }
        Ok(())
    }
}

impl Default for ThrottleSettings {
    fn default() -> Self {
        Self {
            max_per_window: default_max_per_window(),
            window_secs: default_window_secs(),
        }
    }
}

fn default_max_per_window() -> u32 {
    5
}

fn default_window_secs() -> u64 {
    3_600
}
