//! Bounded retry with exponential backoff
//!
//! An operation is attempted up to `max_attempts` times. After a failed
//! attempt the executor sleeps for the current delay, doubles it (no jitter)
//! and tries again. Terminal errors (already-exists, not-found) and the final
//! attempt's error are returned immediately, without sleeping. The last
//! error is always returned, never dropped.
//!
//! Only one attempt of a given call is in flight at a time: the caller
//! awaits the whole loop.

use crate::events::{ClientEvent, EventSink, TracingSink};
use context_core::Result;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Default attempt budget
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
/// Default delay before the first retry, in milliseconds
pub const DEFAULT_INITIAL_DELAY_MS: u64 = 1000;

/// Retry budget and backoff
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total attempts including the first (default: 3)
    pub max_attempts: u32,
    /// Delay before the first retry in milliseconds (default: 1000)
    pub initial_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            initial_delay_ms: DEFAULT_INITIAL_DELAY_MS,
        }
    }
}

impl RetryPolicy {
    /// Create a policy. `max_attempts` is clamped to at least 1.
    pub fn new(max_attempts: u32, initial_delay: Duration) -> Self {
        RetryPolicy {
            max_attempts: max_attempts.max(1),
            initial_delay_ms: initial_delay.as_millis() as u64,
        }
    }

    /// Delay before the first retry
    pub fn initial_delay(&self) -> Duration {
        Duration::from_millis(self.initial_delay_ms)
    }
}

/// Runs remote operations under a [`RetryPolicy`]
#[derive(Clone)]
pub struct RetryExecutor {
    policy: RetryPolicy,
    sink: Arc<dyn EventSink>,
}

impl Default for RetryExecutor {
    fn default() -> Self {
        RetryExecutor::new(RetryPolicy::default(), Arc::new(TracingSink))
    }
}

impl RetryExecutor {
    /// Create an executor reporting to `sink`
    pub fn new(policy: RetryPolicy, sink: Arc<dyn EventSink>) -> Self {
        RetryExecutor { policy, sink }
    }

    /// The policy in use
    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Run `op` under the default policy. `name` labels events.
    pub async fn execute<T, F, Fut>(&self, name: &str, op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        self.execute_with(name, self.policy, op).await
    }

    /// Run `op` under an explicit policy
    pub async fn execute_with<T, F, Fut>(&self, name: &str, policy: RetryPolicy, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let max_attempts = policy.max_attempts.max(1);
        let mut delay = policy.initial_delay();
        let mut attempt = 1;

        loop {
            self.sink.emit(ClientEvent::Attempt {
                operation: name.to_string(),
                attempt,
                max_attempts,
            });

            match op().await {
                Ok(value) => {
                    self.sink.emit(ClientEvent::Succeeded {
                        operation: name.to_string(),
                        attempts: attempt,
                    });
                    return Ok(value);
                }
                Err(e) => {
                    let terminal = e.is_terminal();
                    if terminal || attempt >= max_attempts {
                        self.sink.emit(ClientEvent::Failed {
                            operation: name.to_string(),
                            attempts: attempt,
                            error: e.to_string(),
                            terminal,
                        });
                        return Err(e);
                    }

                    self.sink.emit(ClientEvent::Retrying {
                        operation: name.to_string(),
                        attempt,
                        delay,
                        error: e.to_string(),
                    });
                    tokio::time::sleep(delay).await;
                    delay = delay.saturating_mul(2);
                    attempt += 1;
                }
            }
        }
    }
}
