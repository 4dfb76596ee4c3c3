//! Core dual-window rate limiter implementation.

use std::future::Future;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::{self, Instant};
use tracing::{trace, warn};

use crate::config::QuotaConfig;
use crate::error::{Result, TokengateError};

use super::ledger::QuotaLedger;

/// The trailing interval over which both quotas are measured.
pub const QUOTA_WINDOW: Duration = Duration::from_secs(60);

/// Safety margin added to every computed wait, so a waiter does not wake on
/// the exact expiry instant and lose to clock-resolution races.
const DEFAULT_SAFETY_MARGIN: Duration = Duration::from_millis(100);

/// A rate limiter enforcing two independent sliding 60-second quotas: a
/// request count and a token (weight) budget.
///
/// `admit` blocks (asynchronously) until both quotas have room, so callers
/// experience quota pressure as latency rather than errors. The limiter is
/// thread-safe and is shared behind an `Arc` by every caller hitting the
/// same upstream resource.
pub struct RateLimiter {
    /// Maximum admitted requests per window
    requests_per_minute: u32,
    /// Maximum admitted token weight per window
    tokens_per_minute: u64,
    /// Margin added to every computed wait
    safety_margin: Duration,
    /// Admission record, guarded so purge-check-record is a critical section
    ledger: Mutex<QuotaLedger>,
}

/// Snapshot of current window usage, for logging and introspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaUsage {
    /// Requests admitted within the trailing window
    pub requests: u32,
    /// Token weight admitted within the trailing window
    pub tokens: u64,
}

impl RateLimiter {
    /// Create a new rate limiter with the default safety margin.
    ///
    /// `requests_per_minute` must be at least 1; a zero request quota can
    /// never admit anything.
    pub fn new(requests_per_minute: u32, tokens_per_minute: u64) -> Self {
        assert!(
            requests_per_minute > 0,
            "requests_per_minute must be at least 1"
        );
        Self {
            requests_per_minute,
            tokens_per_minute,
            safety_margin: DEFAULT_SAFETY_MARGIN,
            ledger: Mutex::new(QuotaLedger::new(QUOTA_WINDOW)),
        }
    }

    /// Create a rate limiter from a quota configuration.
    pub fn from_config(config: &QuotaConfig) -> Self {
        let mut limiter = Self::new(config.requests_per_minute, config.tokens_per_minute);
        limiter.safety_margin = Duration::from_millis(config.safety_margin_ms);
        limiter
    }

    /// Block until an operation of the given token weight may proceed, then
    /// record it against both quotas.
    ///
    /// Fails immediately with [`TokengateError::QuotaUnsatisfiable`] when
    /// `weight` exceeds the whole window's token capacity: no amount of
    /// waiting frees enough room, so sleeping would retry forever. Every
    /// other wait is bounded, because the oldest ledger entry always ages
    /// out within the window.
    pub async fn admit(&self, weight: u64) -> Result<()> {
        if weight > self.tokens_per_minute {
            return Err(TokengateError::QuotaUnsatisfiable {
                weight,
                capacity: self.tokens_per_minute,
            });
        }

        loop {
            let retry_at = {
                let mut ledger = self.ledger.lock();
                let now = Instant::now();
                ledger.purge(now);

                let count_free = ledger.request_count() < self.requests_per_minute as usize;
                let weight_free = ledger.token_sum() + weight <= self.tokens_per_minute;

                if count_free && weight_free {
                    ledger.record(now, weight);
                    trace!(
                        weight,
                        requests_in_window = ledger.request_count(),
                        tokens_in_window = ledger.token_sum(),
                        "Request admitted"
                    );
                    return Ok(());
                }

                // Wait for the oldest entry of whichever quota is exhausted
                // to age out. The lock is dropped across the sleep, and both
                // conditions are re-checked together on the next pass, so a
                // slot freed on one axis never bypasses the other.
                let mut deadline = now;
                if !count_free {
                    if let Some(oldest) = ledger.oldest_request() {
                        deadline = deadline.max(oldest + QUOTA_WINDOW);
                    }
                }
                if !weight_free {
                    if let Some(oldest) = ledger.oldest_spend() {
                        deadline = deadline.max(oldest + QUOTA_WINDOW);
                    }
                }
                let retry_at = deadline + self.safety_margin;

                warn!(
                    weight,
                    wait_secs = retry_at.duration_since(now).as_secs_f64(),
                    "Quota exhausted, waiting for window headroom"
                );
                retry_at
            };

            time::sleep_until(retry_at).await;
        }
    }

    /// Like [`admit`](Self::admit), but give up once `deadline` passes.
    ///
    /// On expiry this returns [`TokengateError::DeadlineExceeded`] and the
    /// ledger is left unmodified: an admission is only ever recorded at the
    /// instant `admit` returns successfully.
    pub async fn admit_by(&self, weight: u64, deadline: Instant) -> Result<()> {
        match time::timeout_at(deadline, self.admit(weight)).await {
            Ok(outcome) => outcome,
            Err(_) => Err(TokengateError::DeadlineExceeded),
        }
    }

    /// Admit an operation of the given weight, then run it.
    ///
    /// The operation's output is returned unchanged; quota pressure shows up
    /// only as latency before the operation starts. `admit` is called
    /// exactly once per invocation.
    pub async fn invoke<F, Fut, T>(&self, weight: u64, operation: F) -> Result<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        self.admit(weight).await?;
        Ok(operation().await)
    }

    /// Current usage within the trailing window.
    pub fn usage(&self) -> QuotaUsage {
        let mut ledger = self.ledger.lock();
        ledger.purge(Instant::now());
        QuotaUsage {
            requests: ledger.request_count() as u32,
            tokens: ledger.token_sum(),
        }
    }

    /// The configured request quota.
    pub fn requests_per_minute(&self) -> u32 {
        self.requests_per_minute
    }

    /// The configured token quota.
    pub fn tokens_per_minute(&self) -> u64 {
        self.tokens_per_minute
    }
}
