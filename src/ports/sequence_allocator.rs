//! Sequence allocator port.
//!
//! Hands out monotonically increasing, gap-free counter values per named
//! counter. The human-readable rendering lives in
//! `domain::sequence::SequenceCode`; this port only owns allocation.

use async_trait::async_trait;

pub use crate::domain::sequence::SequenceError;

/// Port for atomic sequence allocation.
///
/// Implementations must make `next` linearizable per counter name: a
/// single atomic increment primitive, never read-modify-write without
/// mutual exclusion. Two concurrent callers must never observe the same
/// value, and no value may be skipped.
#[async_trait]
pub trait SequenceAllocator: Send + Sync {
    /// Atomically increments the named counter and returns the *new* value.
    ///
    /// # Errors
    ///
    /// - `CounterUnavailable` - the backing storage cannot be reached.
    ///   Callers must not fall back to a non-atomic increment: a duplicate
    ///   sequence code would break the token lookups keyed on it.
    async fn next(&self, counter_name: &str, increment_by: u64) -> Result<u64, SequenceError>;
}
