//! Per-resource admission ledger.

use std::collections::VecDeque;
use std::time::Duration;

use tokio::time::Instant;

/// Mutable record of recent admissions against one rate-limited resource.
///
/// Two logs are kept in lockstep, oldest first: one timestamp per admitted
/// request and one `(timestamp, weight)` pair per token spend. A single
/// admission contributes exactly one entry to each. Entries self-expire by
/// aging out of the trailing window; callers run `purge` before every
/// admission decision so stale entries never count against either quota.
pub(crate) struct QuotaLedger {
    /// Trailing interval over which entries count
    window: Duration,
    /// Timestamps of admitted requests
    request_log: VecDeque<Instant>,
    /// Token spends of admitted requests
    spend_log: VecDeque<(Instant, u64)>,
    /// Running sum of `spend_log` weights
    tokens_in_window: u64,
}

impl QuotaLedger {
    pub(crate) fn new(window: Duration) -> Self {
        Self {
            window,
            request_log: VecDeque::new(),
            spend_log: VecDeque::new(),
            tokens_in_window: 0,
        }
    }

    /// Drop every entry that has aged out of the window as of `now`.
    ///
    /// The window is the half-open trailing interval `(now - window, now]`:
    /// an entry timestamped exactly `window` ago no longer counts.
    pub(crate) fn purge(&mut self, now: Instant) {
        let Some(horizon) = now.checked_sub(self.window) else {
            return;
        };
        while let Some(&ts) = self.request_log.front() {
            if ts > horizon {
                break;
            }
            self.request_log.pop_front();
        }
        while let Some(&(ts, weight)) = self.spend_log.front() {
            if ts > horizon {
                break;
            }
            self.tokens_in_window -= weight;
            self.spend_log.pop_front();
        }
    }

    /// Record one admission in both logs.
    pub(crate) fn record(&mut self, now: Instant, weight: u64) {
        self.request_log.push_back(now);
        self.spend_log.push_back((now, weight));
        self.tokens_in_window += weight;
    }

    /// Number of requests currently in the window.
    pub(crate) fn request_count(&self) -> usize {
        self.request_log.len()
    }

    /// Sum of token weights currently in the window.
    pub(crate) fn token_sum(&self) -> u64 {
        self.tokens_in_window
    }

    /// Timestamp of the oldest surviving request entry.
    pub(crate) fn oldest_request(&self) -> Option<Instant> {
        self.request_log.front().copied()
    }

    /// Timestamp of the oldest surviving spend entry.
    pub(crate) fn oldest_spend(&self) -> Option<Instant> {
        self.spend_log.front().map(|&(ts, _)| ts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_secs(60);

    // An instant far enough from process start that `now - window` is valid.
    fn base() -> Instant {
        Instant::now() + Duration::from_secs(3600)
    }

    #[test]
    fn test_record_updates_both_logs() {
        let mut ledger = QuotaLedger::new(WINDOW);
        let t0 = base();

        ledger.record(t0, 40);
        ledger.record(t0 + Duration::from_secs(1), 60);

        assert_eq!(ledger.request_count(), 2);
        assert_eq!(ledger.token_sum(), 100);
        assert_eq!(ledger.oldest_request(), Some(t0));
        assert_eq!(ledger.oldest_spend(), Some(t0));
    }

    #[test]
    fn test_purge_drops_expired_entries() {
        let mut ledger = QuotaLedger::new(WINDOW);
        let t0 = base();

        ledger.record(t0, 40);
        ledger.record(t0 + Duration::from_secs(30), 60);

        ledger.purge(t0 + Duration::from_secs(61));

        assert_eq!(ledger.request_count(), 1);
        assert_eq!(ledger.token_sum(), 60);
        assert_eq!(ledger.oldest_request(), Some(t0 + Duration::from_secs(30)));
    }

    #[test]
    fn test_entry_exactly_at_window_boundary_is_expired() {
        let mut ledger = QuotaLedger::new(WINDOW);
        let t0 = base();

        ledger.record(t0, 40);
        ledger.purge(t0 + WINDOW);

        assert_eq!(ledger.request_count(), 0);
        assert_eq!(ledger.token_sum(), 0);
    }

    #[test]
    fn test_entry_inside_window_survives_purge() {
        let mut ledger = QuotaLedger::new(WINDOW);
        let t0 = base();

        ledger.record(t0, 40);
        ledger.purge(t0 + Duration::from_secs(59));

        assert_eq!(ledger.request_count(), 1);
        assert_eq!(ledger.token_sum(), 40);
    }

    #[test]
    fn test_purge_near_clock_origin_is_a_noop() {
        let mut ledger = QuotaLedger::new(Duration::from_secs(u64::MAX / 2));
        let now = Instant::now();

        ledger.record(now, 10);
        ledger.purge(now);

        assert_eq!(ledger.request_count(), 1);
    }

    #[test]
    fn test_zero_weight_entry_still_counts_as_a_request() {
        let mut ledger = QuotaLedger::new(WINDOW);
        let t0 = base();

        ledger.record(t0, 0);

        assert_eq!(ledger.request_count(), 1);
        assert_eq!(ledger.token_sum(), 0);
    }
}
