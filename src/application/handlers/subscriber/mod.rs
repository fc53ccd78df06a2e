//! Subscriber lifecycle command handlers.

mod resubscribe;
mod unsubscribe;

pub use resubscribe::{ResubscribeCommand, ResubscribeHandler, ResubscribeResult};
pub use unsubscribe::{UnsubscribeCommand, UnsubscribeHandler, UnsubscribeResult};
