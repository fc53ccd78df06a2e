//! In-memory adapters for tests and single-process deployments.

mod delivery;
mod event_bus;
mod sequence;
mod subscriber;
mod verification;

pub use delivery::{NoopDelivery, RecordingDelivery};
pub use event_bus::InMemoryEventBus;
pub use sequence::InMemorySequenceAllocator;
pub use subscriber::InMemorySubscriberRepository;
pub use verification::InMemoryVerificationTokenRepository;
