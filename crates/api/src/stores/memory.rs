//! In-process store implementations.
//!
//! Selected at startup when Redis is unconfigured. State lives in a mutex'd
//! map with explicit expiry bookkeeping - nothing survives a restart and
//! nothing is visible to other processes, which is fine for the local
//! development flows these back.
//!
//! Internal methods take an explicit `now` so expiry behavior is testable
//! without sleeping; the trait impls pass `Instant::now()`.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::Result;
use async_trait::async_trait;
use shared::lesson::Lesson;

use crate::models::{LoginCode, Principal};

use super::{
    LessonCache, LoginCodeStore, RateLimitResult, RateLimiter, SessionStore,
    lesson_cache::theme_cache_key,
};

struct TtlEntry {
    value: String,
    expires_at: Instant,
}

/// String map with per-entry expiry.
#[derive(Default)]
struct TtlMap {
    entries: Mutex<HashMap<String, TtlEntry>>,
}

impl TtlMap {
    fn set_at(&self, key: &str, value: String, ttl: Duration, now: Instant) {
        let mut entries = self.entries.lock().unwrap();
        entries.insert(
            key.to_string(),
            TtlEntry {
                value,
                expires_at: now + ttl,
            },
        );
    }

    fn get_at(&self, key: &str, now: Instant) -> Option<String> {
        let mut entries = self.entries.lock().unwrap();

        match entries.get(key) {
            Some(entry) if entry.expires_at > now => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    fn remove(&self, key: &str) -> bool {
        self.entries.lock().unwrap().remove(key).is_some()
    }
}

struct Counter {
    count: i64,
    expires_at: Instant,
}

/// Fixed-window counters in process memory.
#[derive(Default)]
pub struct MemoryRateLimiter {
    counters: Mutex<HashMap<String, Counter>>,
}

impl MemoryRateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    fn incr_at(&self, key: &str, ttl: Duration, now: Instant) -> i64 {
        let mut counters = self.counters.lock().unwrap();

        let counter = counters.entry(key.to_string()).or_insert_with(|| Counter {
            count: 0,
            expires_at: now + ttl,
        });

        // A lapsed window restarts from scratch, matching EXPIRE semantics
        if counter.expires_at <= now {
            counter.count = 0;
            counter.expires_at = now + ttl;
        }

        counter.count += 1;
        counter.count
    }
}

#[async_trait]
impl RateLimiter for MemoryRateLimiter {
    async fn check_simple(&self, key: &str, limit: i64, ttl_secs: u64) -> Result<RateLimitResult> {
        let count = self.incr_at(key, Duration::from_secs(ttl_secs), Instant::now());

        if count > limit {
            Ok(RateLimitResult::Exceeded(count))
        } else {
            Ok(RateLimitResult::Allowed(count))
        }
    }

    async fn clear(&self, key: &str) -> Result<()> {
        self.counters.lock().unwrap().remove(key);
        Ok(())
    }
}

/// Login codes in process memory.
#[derive(Default)]
pub struct MemoryLoginCodeStore {
    map: TtlMap,
}

impl MemoryLoginCodeStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LoginCodeStore for MemoryLoginCodeStore {
    async fn put(&self, identity_hash: &str, record: &LoginCode, ttl_secs: u64) -> Result<()> {
        self.map.set_at(
            identity_hash,
            serde_json::to_string(record)?,
            Duration::from_secs(ttl_secs),
            Instant::now(),
        );
        Ok(())
    }

    async fn get(&self, identity_hash: &str) -> Result<Option<LoginCode>> {
        match self.map.get_at(identity_hash, Instant::now()) {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    async fn delete(&self, identity_hash: &str) -> Result<bool> {
        Ok(self.map.remove(identity_hash))
    }
}

/// Sessions in process memory.
#[derive(Default)]
pub struct MemorySessionStore {
    map: TtlMap,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn put(&self, token_hash: &str, principal: &Principal, ttl_secs: u64) -> Result<()> {
        self.map.set_at(
            token_hash,
            serde_json::to_string(principal)?,
            Duration::from_secs(ttl_secs),
            Instant::now(),
        );
        Ok(())
    }

    async fn get(&self, token_hash: &str) -> Result<Option<Principal>> {
        match self.map.get_at(token_hash, Instant::now()) {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    async fn delete(&self, token_hash: &str) -> Result<bool> {
        Ok(self.map.remove(token_hash))
    }
}

/// Lesson cache in process memory.
#[derive(Default)]
pub struct MemoryLessonCache {
    map: TtlMap,
}

impl MemoryLessonCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LessonCache for MemoryLessonCache {
    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    async fn get(&self, normalized_theme: &str) -> Result<Option<Vec<Lesson>>> {
        let key = theme_cache_key(normalized_theme);

        match self.map.get_at(&key, Instant::now()) {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    async fn set(&self, normalized_theme: &str, lessons: &[Lesson]) -> Result<()> {
        let key = theme_cache_key(normalized_theme);

        self.map.set_at(
            &key,
            serde_json::to_string(lessons)?,
            Duration::from_secs(super::lesson_cache::LESSON_CACHE_TTL_SECS),
            Instant::now(),
        );
        Ok(())
    }
}
