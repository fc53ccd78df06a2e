//! Adapters - implementations of the ports.
//!
//! Everything here is in-memory: the concurrency guarantees the ports
//! demand (linearizable counters, compare-and-swap consume, optimistic
//! subscriber locking) are expressed with process-local primitives.
//! Database-backed adapters drop in behind the same traits.

pub mod memory;
pub mod throttle;

pub use memory::{
    InMemoryEventBus, InMemorySequenceAllocator, InMemorySubscriberRepository,
    InMemoryVerificationTokenRepository, NoopDelivery, RecordingDelivery,
};
pub use throttle::{InMemoryIssuanceThrottle, ThrottleConfig};
