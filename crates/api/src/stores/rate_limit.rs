//! Fixed-window rate limiting.

use anyhow::Result;
use async_trait::async_trait;

/// Rate limiter trait for checking and incrementing counters.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Increment the counter for `key` and compare against `limit`. The
    /// first increment in a window arms the TTL; later increments ride the
    /// existing window. The count is never decremented on rejection.
    async fn check_simple(&self, key: &str, limit: i64, ttl_secs: u64) -> Result<RateLimitResult>;

    /// Drop the counter for `key`, restarting its window on next use.
    /// Called after successful verification so a correct login never leaves
    /// a user one attempt away from lockout.
    async fn clear(&self, key: &str) -> Result<()>;
}

/// Result of a rate limit check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateLimitResult {
    /// Under the limit, includes current count.
    Allowed(i64),
    /// Over the limit, includes current count.
    Exceeded(i64),
}

impl RateLimitResult {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateLimitResult::Allowed(_))
    }
}

/// Checks a limit, failing open when the counter store is unavailable:
/// availability of the primary action wins over strict limiting. Returns
/// whether the action may proceed.
pub async fn check_fail_open(
    limiter: &dyn RateLimiter,
    key: &str,
    limit: i64,
    ttl_secs: u64,
) -> bool {
    match limiter.check_simple(key, limit, ttl_secs).await {
        Ok(RateLimitResult::Allowed(_)) => true,
        Ok(RateLimitResult::Exceeded(count)) => {
            tracing::warn!(key, count, "rate limit exceeded");
            false
        }
        Err(err) => {
            tracing::warn!(key, error = ?err, "rate limit store unavailable, failing open");
            true
        }
    }
}

/// Redis implementation of RateLimiter.
#[derive(Clone)]
pub struct RedisRateLimiter {
    client: redis::Client,
}

impl RedisRateLimiter {
    pub fn new(client: redis::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RateLimiter for RedisRateLimiter {
    async fn check_simple(&self, key: &str, limit: i64, ttl_secs: u64) -> Result<RateLimitResult> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        let count: i64 = redis::cmd("INCR").arg(key).query_async(&mut conn).await?;

        if count == 1 {
            let _: () = redis::cmd("EXPIRE")
                .arg(key)
                .arg(ttl_secs)
                .query_async(&mut conn)
                .await?;
        }

        if count > limit {
            Ok(RateLimitResult::Exceeded(count))
        } else {
            Ok(RateLimitResult::Allowed(count))
        }
    }

    async fn clear(&self, key: &str) -> Result<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        let _: () = redis::cmd("DEL").arg(key).query_async(&mut conn).await?;
        Ok(())
    }
}
