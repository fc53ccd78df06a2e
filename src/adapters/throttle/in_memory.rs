//! In-memory issuance throttle.
//!
//! Fixed-window counter per email with explicit eviction: every `check`
//! first drops windows whose span has elapsed, so the map never
//! accumulates stale entries. Not suitable for multi-server deployments;
//! a shared-store implementation drops in behind the same port.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, EmailAddress, Timestamp};
use crate::ports::{IssuanceThrottle, ThrottleDecision};

/// Throttle window settings.
#[derive(Debug, Clone, Copy)]
pub struct ThrottleConfig {
    /// Maximum issuances per email per window.
    pub max_per_window: u32,
    /// Window span in seconds.
    pub window_secs: u64,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            max_per_window: 5,
            window_secs: 3_600,
        }
    }
}

/// State for a single email's window.
#[derive(Debug, Clone)]
struct WindowState {
    /// Issuances in the current window.
    count: u32,
    /// When the current window started (unix seconds).
    window_start: u64,
}

/// In-memory fixed-window issuance throttle.
#[derive(Debug)]
pub struct InMemoryIssuanceThrottle {
    config: ThrottleConfig,
    windows: RwLock<HashMap<String, WindowState>>,
}

impl InMemoryIssuanceThrottle {
    /// Creates a throttle with the given window settings.
    pub fn new(config: ThrottleConfig) -> Self {
        Self {
            config,
            windows: RwLock::new(HashMap::new()),
        }
    }

    /// Creates a throttle with default settings.
    pub fn with_defaults() -> Self {
        Self::new(ThrottleConfig::default())
    }

    fn now_secs() -> u64 {
        Timestamp::now().as_unix_secs()
    }

    /// Eviction policy: a window is dead once its span has elapsed.
    fn evict_expired(windows: &mut HashMap<String, WindowState>, now: u64, window_secs: u64) {
        windows.retain(|_, state| now < state.window_start + window_secs);
    }
}

#[async_trait]
impl IssuanceThrottle for InMemoryIssuanceThrottle {
    async fn check(&self, email: &EmailAddress) -> Result<ThrottleDecision, DomainError> {
        let now = Self::now_secs();
        let mut windows = self.windows.write().await;

        Self::evict_expired(&mut windows, now, self.config.window_secs);

        let state = windows
            .entry(email.as_str().to_string())
            .or_insert_with(|| WindowState {
                count: 0,
                window_start: now,
            });

        if state.count >= self.config.max_per_window {
            let retry_after =
                (state.window_start + self.config.window_secs).saturating_sub(now) as u32;
            return Ok(ThrottleDecision::Denied {
                limit: self.config.max_per_window,
                retry_after_secs: retry_after.max(1),
            });
        }

        state.count += 1;
        Ok(ThrottleDecision::Allowed {
            remaining: self.config.max_per_window - state.count,
        })
    }

    async fn reset(&self, email: &EmailAddress) -> Result<(), DomainError> {
        let mut windows = self.windows.write().await;
        windows.remove(email.as_str());
        Ok(())
    }
}
