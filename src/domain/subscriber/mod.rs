//! Subscriber lifecycle - the record and its state machine.

mod errors;
mod events;
mod record;
mod status;

pub use errors::SubscriberError;
pub use events::{
    SubscriberResubscribed, SubscriberSubscribed, SubscriberUnsubscribed, SubscriberVerified,
};
pub use record::{ConfirmOutcome, SubscriberRecord};
pub use status::SubscriberStatus;
