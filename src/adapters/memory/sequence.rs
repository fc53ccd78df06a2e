//! In-memory sequence allocator.
//!
//! Linearizable per counter name: every `next` holds the one lock over the
//! counter map, so concurrent callers serialize and the returned values are
//! distinct and contiguous. Suitable for tests and single-process
//! deployments; a database-backed allocator drops in behind the same port.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;

use crate::domain::sequence::SequenceError;
use crate::ports::SequenceAllocator;

/// In-memory, mutex-serialized counter map.
#[derive(Debug, Default)]
pub struct InMemorySequenceAllocator {
    counters: Mutex<HashMap<String, u64>>,
    unavailable: AtomicBool,
}

impl InMemorySequenceAllocator {
    /// Creates an allocator with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an allocator with a counter pre-seeded, for picking up an
    /// existing sequence.
    pub fn with_counter(name: impl Into<String>, value: u64) -> Self {
        let allocator = Self::new();
        allocator
            .counters
            .try_lock()
            .expect("no contention during construction")
            .insert(name.into(), value);
        allocator
    }

    /// Simulates backend loss: every subsequent `next` fails with
    /// `CounterUnavailable` until restored.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Returns the current value of a counter without incrementing.
    pub async fn current(&self, counter_name: &str) -> u64 {
        let counters = self.counters.lock().await;
        counters.get(counter_name).copied().unwrap_or(0)
    }
}

#[async_trait]
impl SequenceAllocator for InMemorySequenceAllocator {
    async fn next(&self, counter_name: &str, increment_by: u64) -> Result<u64, SequenceError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(SequenceError::CounterUnavailable(
                "in-memory allocator marked unavailable".to_string(),
            ));
        }

        let mut counters = self.counters.lock().await;
        let counter = counters.entry(counter_name.to_string()).or_insert(0);
        *counter += increment_by;
        Ok(*counter)
    }
}
