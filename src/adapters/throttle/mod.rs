//! Issuance throttle adapters.

mod in_memory;

pub use in_memory::{InMemoryIssuanceThrottle, ThrottleConfig};
