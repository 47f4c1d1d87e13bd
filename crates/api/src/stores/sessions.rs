//! Session storage.
//!
//! Bearer tokens are hashed before storage, same reasoning as login codes:
//! a dumped store must not contain usable credentials.

use anyhow::Result;
use async_trait::async_trait;
use redis::AsyncCommands;

use crate::models::Principal;

/// Store for session records.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Store a principal keyed by the hashed token.
    async fn put(&self, token_hash: &str, principal: &Principal, ttl_secs: u64) -> Result<()>;

    /// Resolve a hashed token to its principal.
    async fn get(&self, token_hash: &str) -> Result<Option<Principal>>;

    /// Delete a session (returns true if it existed).
    async fn delete(&self, token_hash: &str) -> Result<bool>;
}

/// Redis implementation of SessionStore.
#[derive(Clone)]
pub struct RedisSessionStore {
    client: redis::Client,
}

impl RedisSessionStore {
    pub fn new(client: redis::Client) -> Self {
        Self { client }
    }

    fn session_key(token_hash: &str) -> String {
        format!("session:{}", token_hash)
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn put(&self, token_hash: &str, principal: &Principal, ttl_secs: u64) -> Result<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let key = Self::session_key(token_hash);

        let _: () = conn
            .set_ex(&key, serde_json::to_string(principal)?, ttl_secs)
            .await?;
        Ok(())
    }

    async fn get(&self, token_hash: &str) -> Result<Option<Principal>> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let key = Self::session_key(token_hash);

        let json: Option<String> = conn.get(&key).await?;

        match json {
            Some(j) => Ok(Some(serde_json::from_str(&j)?)),
            None => Ok(None),
        }
    }

    async fn delete(&self, token_hash: &str) -> Result<bool> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let key = Self::session_key(token_hash);

        let deleted: i64 = conn.del(&key).await?;
        Ok(deleted > 0)
    }
}
