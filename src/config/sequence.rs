//! Sequence code configuration

use serde::Deserialize;

use crate::application::handlers::verification::IssueSettings;

use super::error::ValidationError;

/// Sequence counter and code formatting configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SequenceConfig {
    /// Counter name allocations draw from
    #[serde(default = "default_counter_name")]
    pub counter_name: String,

    /// Prefix on formatted sequence codes
    #[serde(default = "default_prefix")]
    pub prefix: String,

    /// Zero-pad width for formatted sequence codes
    #[serde(default = "default_width")]
    pub width: usize,
}

impl SequenceConfig {
    /// Converts into the issue handler's settings
    pub fn issue_settings(&self) -> IssueSettings {
        IssueSettings {
            counter_name: self.counter_name.clone(),
            sequence_prefix: self.prefix.clone(),
            sequence_width: self.width,
        }
    }

    /// Validate sequence configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.counter_name.trim().is_empty() {
            return Err(ValidationError::EmptyCounterName);
        }
        // u64 tops out at 20 digits; keep the pad inside that.
        if self.width == 0 || self.width > 19 {
            return Err(ValidationError::InvalidSequenceWidth);
        }
        Ok(())
    }
}

impl Default for SequenceConfig {
    fn default() -> Self {
        Self {
            counter_name: default_counter_name(),
            prefix: default_prefix(),
            width: default_width(),
        }
    }
}

fn default_counter_name() -> String {
    "newsletter_seq".to_string()
}

fn default_prefix() -> String {
    "N".to_string()
}

fn default_width() -> usize {
    6
}
