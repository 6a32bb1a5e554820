//! Outbound-call gating for rate-limited model APIs.
//!
//! One [`RateLimiter`] and one [`KeyRotator`] exist per external provider and are
//! shared across workers through `Arc`. Every read-modify-write happens inside a
//! single mutex critical section, so two workers can never both be granted the
//! same interval or advance the rotation index inconsistently.

use std::collections::HashSet;
use std::fmt;
use std::num::NonZeroU32;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use crate::error::{MLError, MLResult};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    // A panicking holder cannot leave these states half-written.
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Strict single-token limiter: one grant per `60 / max_rpm` seconds, no burst.
#[derive(Debug)]
pub struct RateLimiter {
    interval: Duration,
    last_grant: Mutex<Option<Instant>>,
}

impl RateLimiter {
    pub fn new(max_requests_per_minute: NonZeroU32) -> Self {
        Self {
            interval: Duration::from_secs(60) / max_requests_per_minute.get(),
            last_grant: Mutex::new(None),
        }
    }

    /// Minimum spacing between two grants.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Non-blocking. Grants (and records the grant) only if the interval has
    /// elapsed since the previous grant.
    pub fn try_acquire(&self) -> bool {
        let mut last = lock(&self.last_grant);
        let now = Instant::now();
        let ready = match *last {
            None => true,
            Some(prev) => now.saturating_duration_since(prev) >= self.interval,
        };
        if ready {
            *last = Some(now);
        }
        ready
    }

    /// Blocks the calling thread until its slot arrives. Returns the granted instant.
    pub fn wait_acquire(&self) -> Instant {
        let slot = self.reserve();
        let now = Instant::now();
        if slot > now {
            let wait = slot - now;
            tracing::debug!("Rate limiter: sleeping {:.2}s", wait.as_secs_f64());
            std::thread::sleep(wait);
        }
        slot
    }

    /// Async variant of [`wait_acquire`](Self::wait_acquire) for tokio workers.
    pub async fn acquire(&self) -> Instant {
        let slot = self.reserve();
        let now = Instant::now();
        if slot > now {
            let wait = slot - now;
            tracing::debug!("Rate limiter: waiting {:.2}s", wait.as_secs_f64());
            tokio::time::sleep(wait).await;
        }
        slot
    }

    /// Claim the next free slot atomically. Waiters queue behind each other
    /// instead of racing for the same instant.
    fn reserve(&self) -> Instant {
        let mut last = lock(&self.last_grant);
        let now = Instant::now();
        let slot = match *last {
            None => now,
            Some(prev) => (prev + self.interval).max(now),
        };
        *last = Some(slot);
        slot
    }
}

struct RotationState {
    failed: HashSet<String>,
    index: usize,
}

/// Round-robin API key selection with failure tracking.
pub struct KeyRotator {
    keys: Vec<String>,
    state: Mutex<RotationState>,
}

impl KeyRotator {
    pub fn new(keys: Vec<String>) -> Self {
        let keys: Vec<String> = keys
            .into_iter()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .collect();
        if keys.is_empty() {
            tracing::warn!("KeyRotator initialized with no keys");
        }
        Self {
            keys,
            state: Mutex::new(RotationState {
                failed: HashSet::new(),
                index: 0,
            }),
        }
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn failed_count(&self) -> usize {
        lock(&self.state).failed.len()
    }

    /// Next key among the non-failed ones. When every key has failed the failure
    /// set is cleared and rotation resumes over the full pool.
    pub fn get_next(&self) -> MLResult<String> {
        if self.keys.is_empty() {
            return Err(MLError::NoKeysConfigured);
        }

        let mut state = lock(&self.state);

        if self.keys.iter().all(|k| state.failed.contains(k)) {
            tracing::warn!(
                "All {} API keys marked as failed, resetting failure list",
                self.keys.len()
            );
            state.failed.clear();
        }

        let available: Vec<&String> = self
            .keys
            .iter()
            .filter(|k| !state.failed.contains(*k))
            .collect();

        let idx = state.index % available.len();
        let key = available[idx].clone();
        state.index = idx + 1;
        Ok(key)
    }

    pub fn mark_failed(&self, key: &str) {
        let mut state = lock(&self.state);
        if !self.keys.iter().any(|k| k == key) {
            return;
        }
        state.failed.insert(key.to_string());
        tracing::warn!(
            "API key marked as failed (ending ...{}). {}/{} keys failed.",
            key_suffix(key),
            state.failed.len(),
            self.keys.len()
        );
    }
}

impl fmt::Debug for KeyRotator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyRotator")
            .field("keys", &self.keys.len())
            .field("failed", &self.failed_count())
            .finish()
    }
}

/// Last four characters, for logs.
pub fn key_suffix(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() >= 4 {
        chars[chars.len() - 4..].iter().collect()
    } else {
        "****".to_string()
    }
}
