//! Fixed-window rate limiter for upstream provider quotas
//!
//! Bounds calls to a single upstream provider to a fixed number per window.
//! Acquisition never fails: when the quota is exhausted the caller is
//! suspended until the window rolls over. One limiter instance serves one
//! provider; instances are injected, never shared across providers.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

use crate::config::RateLimitConfig;

/// Quota usage within the current window
#[derive(Debug)]
struct Window {
    started: Instant,
    used: u32,
}

/// Fixed-window token limiter
///
/// Thread-safe; concurrent callers contend for the same quota through an
/// internal mutex and are admitted in lock-acquisition order.
#[derive(Debug)]
pub struct RateLimiter {
    max_requests: u32,
    window: Duration,
    state: Mutex<Option<Window>>,
}

impl RateLimiter {
    /// Create a rate limiter with the given quota
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            // A zero quota would never admit any caller
            max_requests: config.max_requests.max(1),
            window: Duration::from_secs(config.window_secs),
            state: Mutex::new(None),
        }
    }

    /// Create a rate limiter with the default quota
    pub fn with_defaults() -> Self {
        Self::new(RateLimitConfig::default())
    }

    /// Acquire one unit of quota, waiting as long as necessary
    ///
    /// Returns once a slot is available; consumes one unit on return. When
    /// the window is exhausted this sleeps out the remainder and re-checks,
    /// so it suspends the caller but never errors.
    pub async fn acquire(&self) {
        loop {
            let wait = {
                let mut state = self.state.lock().await;
                let now = Instant::now();

                match state.as_mut() {
                    None => {
                        *state = Some(Window {
                            started: now,
                            used: 1,
                        });
                        return;
                    }
                    Some(window) if now.duration_since(window.started) >= self.window => {
                        *state = Some(Window {
                            started: now,
                            used: 1,
                        });
                        return;
                    }
                    Some(window) if window.used < self.max_requests => {
                        window.used += 1;
                        return;
                    }
                    Some(window) => self.window - now.duration_since(window.started),
                }
            };

            debug!(
                wait_ms = wait.as_millis() as u64,
                "Provider quota exhausted, waiting for window"
            );
            tokio::time::sleep(wait).await;
        }
    }

    /// Quota size per window
    pub fn max_requests(&self) -> u32 {
        self.max_requests
    }
}
