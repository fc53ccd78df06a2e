//! Delivery adapters: the explicit opt-out and the test recorder.

use async_trait::async_trait;
use std::sync::RwLock;

use crate::ports::{CodeDelivery, CodeDeliveryRequest, DeliveryError};

/// Delivery adapter that delivers nothing.
///
/// Wiring this in is the construction-time decision *not* to deliver codes
/// (e.g. an import pipeline that verifies addresses out of band). Absence
/// of a channel is configuration, never a runtime existence check.
#[derive(Debug, Default)]
pub struct NoopDelivery;

impl NoopDelivery {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CodeDelivery for NoopDelivery {
    async fn deliver(&self, _request: CodeDeliveryRequest) -> Result<(), DeliveryError> {
        Ok(())
    }
}

/// Delivery adapter that records every request, for test assertions.
#[derive(Debug, Default)]
pub struct RecordingDelivery {
    deliveries: RwLock<Vec<CodeDeliveryRequest>>,
    fail: bool,
}

impl RecordingDelivery {
    /// Creates a recorder that accepts every request.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a recorder whose channel is down: every request is recorded
    /// and then rejected.
    pub fn failing() -> Self {
        Self {
            deliveries: RwLock::new(Vec::new()),
            fail: true,
        }
    }

    /// Returns all recorded requests.
    pub fn deliveries(&self) -> Vec<CodeDeliveryRequest> {
        self.deliveries
            .read()
            .expect("RecordingDelivery: lock poisoned")
            .clone()
    }

    /// Returns count of recorded requests.
    pub fn delivery_count(&self) -> usize {
        self.deliveries
            .read()
            .expect("RecordingDelivery: lock poisoned")
            .len()
    }
}

#[async_trait]
impl CodeDelivery for RecordingDelivery {
    async fn deliver(&self, request: CodeDeliveryRequest) -> Result<(), DeliveryError> {
        self.deliveries
            .write()
            .expect("RecordingDelivery: lock poisoned")
            .push(request);

        if self.fail {
            return Err(DeliveryError::ChannelUnavailable(
                "simulated channel outage".to_string(),
            ));
        }
        Ok(())
    }
}
