//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, the state machine trait, error
//! types, and event infrastructure that form the vocabulary of the
//! trustgate domain.

mod email;
mod errors;
mod events;
mod identity;
mod ids;
mod member;
mod state_machine;
mod timestamp;

pub use email::EmailAddress;
pub use errors::{DomainError, ErrorCode, ValidationError};
pub use events::{DomainEvent, EventEnvelope, EventId, EventMetadata};
pub use identity::Identity;
pub use ids::{SubscriberId, TokenId};
pub use member::MemberId;
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
