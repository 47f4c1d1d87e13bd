//! Generated-lesson cache.
//!
//! Pure optimization: a repeated theme within the TTL reuses the previous
//! generation instead of paying for another model call. Callers treat every
//! error here as non-fatal.

use anyhow::Result;
use async_trait::async_trait;
use redis::AsyncCommands;
use shared::lesson::Lesson;

use crate::crypto::sha256_hex;

/// Cache format version, bumped whenever the lesson JSON shape changes so
/// stale entries from older builds are never deserialized.
const CACHE_VERSION: &str = "v1";

/// TTL for cached generations (3 days).
pub const LESSON_CACHE_TTL_SECS: u64 = 3 * 24 * 60 * 60;

/// Cache key for a normalized theme: version tag plus a truncated hash so
/// arbitrary user text never lands in the keyspace.
pub fn theme_cache_key(normalized_theme: &str) -> String {
    let digest = sha256_hex(normalized_theme.as_bytes());
    format!("lessons:{}:{}", CACHE_VERSION, &digest[..16])
}

/// Store for cached lesson generations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LessonCache: Send + Sync {
    /// Health check - verify store connectivity.
    async fn health_check(&self) -> Result<bool>;

    /// Get cached lessons for a normalized theme.
    async fn get(&self, normalized_theme: &str) -> Result<Option<Vec<Lesson>>>;

    /// Cache lessons for a normalized theme.
    async fn set(&self, normalized_theme: &str, lessons: &[Lesson]) -> Result<()>;
}

/// Redis implementation of LessonCache.
#[derive(Clone)]
pub struct RedisLessonCache {
    client: redis::Client,
}

impl RedisLessonCache {
    pub fn new(client: redis::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl LessonCache for RedisLessonCache {
    async fn health_check(&self) -> Result<bool> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let result: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(result == "PONG")
    }

    async fn get(&self, normalized_theme: &str) -> Result<Option<Vec<Lesson>>> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let key = theme_cache_key(normalized_theme);

        let json: Option<String> = conn.get(&key).await?;

        match json {
            Some(j) => Ok(Some(serde_json::from_str(&j)?)),
            None => Ok(None),
        }
    }

    async fn set(&self, normalized_theme: &str, lessons: &[Lesson]) -> Result<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let key = theme_cache_key(normalized_theme);

        let _: () = conn
            .set_ex(&key, serde_json::to_string(lessons)?, LESSON_CACHE_TTL_SECS)
            .await?;
        Ok(())
    }
}
