//! Rate Limiting Infrastructure
//!
//! Tracks the rate limit of an upstream service as it is reported through
//! paired response headers (`<family>-remaining` / `<family>-reset`).
//!
//! The tracker does not meter requests itself. It only mirrors what the
//! upstream says: once a `-remaining` header drops to `"0"`, the sibling
//! `-reset` header tells how many seconds to hold off, and callers wait that
//! long (plus a one second safety buffer) before trying again.
//!
//! One tracker is created at startup and shared by every client through an
//! `Arc`. All counters are atomics, so concurrent fan-out requests can
//! observe and update it without a lock.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use http::{HeaderMap, StatusCode};
use serde::Serialize;

/// Seconds added to every wait so the retry lands after the reset boundary.
pub const SAFETY_BUFFER_SECS: u64 = 1;

/// Suspension seam used by [`RateLimitTracker::wait_remaining_time`].
///
/// Production code uses [`TokioSleeper`]; tests plug in a recording clock so
/// nothing actually sleeps.
#[trait_variant::make(Sleeper: Send)]
pub trait LocalSleeper {
    async fn sleep(&self, duration: Duration);
}

/// Non-blocking timer suspension on the Tokio runtime.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Find the reset time announced by the first exhausted header family.
///
/// Scans headers in iteration order. The first header named `*-remaining`
/// whose value is exactly `"0"` decides the outcome: its sibling (the name
/// with `remaining` replaced by `reset`) is read as whole seconds. Returns
/// 0 when no family is exhausted, or when the sibling is missing or not a
/// non-negative integer.
pub fn get_reset_time(headers: &HeaderMap) -> u64 {
    for (name, value) in headers {
        let name = name.as_str();
        if !name.ends_with("-remaining") || value.as_bytes() != b"0" {
            continue;
        }

        let sibling = name.replace("remaining", "reset");
        let reset = headers
            .get(sibling.as_str())
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok());

        return match reset {
            Some(secs) => secs,
            None => {
                tracing::warn!(
                    header = name,
                    sibling = %sibling,
                    "Exhausted rate limit header without a readable reset time"
                );
                0
            }
        };
    }
    0
}

/// Read-only view of the tracker for the monitoring endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RateLimitSnapshot {
    /// Seconds until the upstream limit resets (0 when not limited)
    pub current: u64,
    /// Total seconds spent waiting
    pub total: u64,
    /// Largest reset time ever observed
    pub max: u64,
    /// Number of limited responses observed
    pub triggered: u64,
}

/// Process-wide upstream rate limit state.
#[derive(Debug)]
pub struct RateLimitTracker<S = TokioSleeper> {
    remaining_time: AtomicU64,
    max_time: AtomicU64,
    triggered: AtomicU64,
    waited_time: AtomicU64,
    safety_buffer: u64,
    sleeper: S,
}

impl RateLimitTracker<TokioSleeper> {
    pub fn new() -> Self {
        Self::with_sleeper(TokioSleeper)
    }
}

impl Default for RateLimitTracker<TokioSleeper> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> RateLimitTracker<S> {
    pub fn with_sleeper(sleeper: S) -> Self {
        Self {
            remaining_time: AtomicU64::new(0),
            max_time: AtomicU64::new(0),
            triggered: AtomicU64::new(0),
            waited_time: AtomicU64::new(0),
            safety_buffer: SAFETY_BUFFER_SECS,
            sleeper,
        }
    }

    /// Update the tracker from one upstream response and report whether the
    /// caller is now rate limited.
    ///
    /// Non-200 responses never count as limited and leave the state alone.
    /// A 200 without an exhausted header family clears a previous limit.
    pub fn determine_if_limited(&self, status: StatusCode, headers: &HeaderMap) -> bool {
        if status != StatusCode::OK {
            return false;
        }

        let new_time = get_reset_time(headers);
        if new_time == 0 {
            if self.limited() {
                self.remaining_time.store(0, Ordering::SeqCst);
                tracing::info!("Upstream rate limit cleared");
            }
            return self.limited();
        }

        self.remaining_time.fetch_max(new_time, Ordering::SeqCst);
        self.max_time.fetch_max(new_time, Ordering::SeqCst);
        let triggered = self.triggered.fetch_add(1, Ordering::SeqCst) + 1;

        tracing::warn!(
            reset_in_secs = new_time,
            triggered,
            "Upstream rate limit reached"
        );
        true
    }

    pub fn limited(&self) -> bool {
        self.remaining_time() > 0
    }

    pub fn remaining_time(&self) -> u64 {
        self.remaining_time.load(Ordering::SeqCst)
    }

    pub fn max_time(&self) -> u64 {
        self.max_time.load(Ordering::SeqCst)
    }

    pub fn triggered(&self) -> u64 {
        self.triggered.load(Ordering::SeqCst)
    }

    pub fn waited_time(&self) -> u64 {
        self.waited_time.load(Ordering::SeqCst)
    }

    pub fn safety_buffer(&self) -> u64 {
        self.safety_buffer
    }

    pub fn sleeper(&self) -> &S {
        &self.sleeper
    }

    pub fn snapshot(&self) -> RateLimitSnapshot {
        RateLimitSnapshot {
            current: self.remaining_time(),
            total: self.waited_time(),
            max: self.max_time(),
            triggered: self.triggered(),
        }
    }
}

impl<S: Sleeper> RateLimitTracker<S> {
    /// Suspend for the remaining reset time plus the safety buffer.
    ///
    /// Afterwards the waited duration is added to the running total and the
    /// remaining time is zeroed. Returns `true` when no longer limited.
    pub async fn wait_remaining_time(&self) -> bool {
        let wait_secs = self.remaining_time() + self.safety_buffer;

        tracing::info!(wait_secs, "Waiting for upstream rate limit to reset");
        self.sleeper.sleep(Duration::from_secs(wait_secs)).await;

        self.waited_time.fetch_add(wait_secs, Ordering::SeqCst);
        self.remaining_time.store(0, Ordering::SeqCst);
        !self.limited()
    }
}
