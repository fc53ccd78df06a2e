//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `SequenceAllocator` - atomic, gap-free counter allocation
//! - `VerificationTokenRepository` - token persistence with atomic consume
//! - `SubscriberRepository` - subscriber persistence with optimistic locking
//! - `EventPublisher` - domain event publication
//! - `CodeDelivery` - capability interface for code delivery channels
//! - `IssuanceThrottle` - per-email issuance rate bounding

mod code_delivery;
mod event_publisher;
mod issuance_throttle;
mod sequence_allocator;
mod subscriber_repository;
mod verification_repository;

pub use code_delivery::{CodeDelivery, CodeDeliveryRequest, DeliveryError};
pub use event_publisher::EventPublisher;
pub use issuance_throttle::{IssuanceThrottle, ThrottleDecision};
pub use sequence_allocator::{SequenceAllocator, SequenceError};
pub use subscriber_repository::SubscriberRepository;
pub use verification_repository::VerificationTokenRepository;
