//! Admission trait for abstracting over limiter implementations.

use async_trait::async_trait;

use crate::error::Result;

use super::limiter::RateLimiter;

/// Trait for admission-control implementations.
///
/// Callers that funnel work through a limiter can depend on this trait
/// instead of the concrete [`RateLimiter`], which keeps admission mockable
/// in their own tests.
#[async_trait]
pub trait AdmissionControl: Send + Sync {
    /// Block until an operation of the given token weight may proceed.
    async fn admit(&self, weight: u64) -> Result<()>;
}

#[async_trait]
impl AdmissionControl for RateLimiter {
    async fn admit(&self, weight: u64) -> Result<()> {
        RateLimiter::admit(self, weight).await
    }
}
