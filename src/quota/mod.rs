//! Quota accounting and admission gating.

mod gate;
mod ledger;
mod limiter;

pub use gate::AdmissionControl;
pub use limiter::{QuotaUsage, RateLimiter, QUOTA_WINDOW};
