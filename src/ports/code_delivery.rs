//! Code delivery port.
//!
//! The capability interface for handing an issued code to whatever channel
//! reaches the user (email, SMS, ...). Collaborators implement this trait
//! explicitly; wiring `NoopDelivery` is the construction-time way to opt
//! out. The core fires delivery and forgets: retries and failure handling
//! belong to the channel, and a delivery failure never rolls back the
//! issuance it was handed.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::foundation::EmailAddress;

/// What the delivery channel receives for one issued code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeDeliveryRequest {
    /// Recipient address.
    pub email: EmailAddress,

    /// Display name captured at signup.
    pub name: String,

    /// The human code the user will type or click.
    pub code: String,

    /// The subscriber's sequence code, for the message body.
    pub sequence_code: String,

    /// Hex signature to embed in the confirm link.
    pub signature: String,
}

/// Port for delivering verification codes.
#[async_trait]
pub trait CodeDelivery: Send + Sync {
    /// Hands one code to the channel.
    async fn deliver(&self, request: CodeDeliveryRequest) -> Result<(), DeliveryError>;
}

/// Errors a delivery channel can report.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeliveryError {
    /// The channel cannot be reached right now.
    #[error("delivery channel unavailable: {0}")]
    ChannelUnavailable(String),

    /// The channel refused this recipient or payload.
    #[error("delivery rejected: {0}")]
    Rejected(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_delivery_is_object_safe() {
        fn _accepts_dyn(_delivery: &dyn CodeDelivery) {}
    }

    #[test]
    fn delivery_errors_display_reason() {
        let err = DeliveryError::ChannelUnavailable("smtp timeout".to_string());
        assert!(format!("{}", err).contains("smtp timeout"));
    }
}
