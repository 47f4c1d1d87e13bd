//! Ephemeral stores.
//!
//! This module contains traits and implementations for ephemeral data
//! storage. All data stored here has automatic TTL-based expiration.
//! Every trait has two implementations: Redis for deployments, and an
//! in-process TTL map selected when Redis is unconfigured (local
//! development only - never shared across processes).
//!
//! ## Stores
//!
//! - **rate_limit** - Fixed-window counters for code/verify/generate actions
//! - **login_codes** - Hashed login codes (15 min TTL, one per identity)
//! - **sessions** - Hashed bearer tokens mapped to principals (30 day TTL)
//! - **lesson_cache** - Generated lessons per theme (3 day TTL)
//!
//! ## Redis Key Patterns
//!
//! ```text
//! ratelimit:code:{email}       → Code request counter
//! ratelimit:verify:{email}     → Verify attempt counter
//! ratelimit:generate:{user_id} → Daily generation counter
//! login-code:{identity_hash}   → LoginCode JSON
//! session:{token_hash}         → Principal JSON
//! lessons:v1:{theme_hash}      → Vec<Lesson> JSON
//! ```

mod lesson_cache;
mod login_codes;
mod memory;
mod rate_limit;
mod sessions;

pub use lesson_cache::{LessonCache, RedisLessonCache, theme_cache_key};
pub use login_codes::{LoginCodeStore, RedisLoginCodeStore};
pub use memory::{MemoryLessonCache, MemoryLoginCodeStore, MemoryRateLimiter, MemorySessionStore};
pub use rate_limit::{RateLimitResult, RateLimiter, RedisRateLimiter, check_fail_open};
pub use sessions::{RedisSessionStore, SessionStore};

#[cfg(test)]
pub use lesson_cache::MockLessonCache;
#[cfg(test)]
pub use login_codes::MockLoginCodeStore;
#[cfg(test)]
pub use rate_limit::MockRateLimiter;
#[cfg(test)]
pub use sessions::MockSessionStore;

use std::sync::Arc;

/// Collection of all ephemeral stores.
#[derive(Clone)]
pub struct Stores {
    pub rate_limiter: Arc<dyn RateLimiter>,
    pub login_codes: Arc<dyn LoginCodeStore>,
    pub sessions: Arc<dyn SessionStore>,
    pub lesson_cache: Arc<dyn LessonCache>,
}

impl Stores {
    /// Redis-backed stores for deployments.
    pub fn redis(client: redis::Client) -> Self {
        Self {
            rate_limiter: Arc::new(RedisRateLimiter::new(client.clone())),
            login_codes: Arc::new(RedisLoginCodeStore::new(client.clone())),
            sessions: Arc::new(RedisSessionStore::new(client.clone())),
            lesson_cache: Arc::new(RedisLessonCache::new(client)),
        }
    }

    /// In-process stores for development without Redis. Non-durable and
    /// invisible to other processes.
    pub fn in_memory() -> Self {
        Self {
            rate_limiter: Arc::new(MemoryRateLimiter::new()),
            login_codes: Arc::new(MemoryLoginCodeStore::new()),
            sessions: Arc::new(MemorySessionStore::new()),
            lesson_cache: Arc::new(MemoryLessonCache::new()),
        }
    }
}
