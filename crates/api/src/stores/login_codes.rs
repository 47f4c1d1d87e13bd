//! Login-code storage.
//!
//! One record per identity, keyed by the SHA-256 of the normalized email.
//! Storing a new code overwrites any prior one, so reissuing always
//! invalidates the previous code. Records carry an absolute expiry
//! timestamp in addition to the store TTL so verification can reject and
//! purge stale records even if the store keeps them around.

use anyhow::Result;
use async_trait::async_trait;
use redis::AsyncCommands;

use crate::models::LoginCode;

/// Store for login-code records.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoginCodeStore: Send + Sync {
    /// Store a code record for an identity with TTL, replacing any prior one.
    async fn put(&self, identity_hash: &str, record: &LoginCode, ttl_secs: u64) -> Result<()>;

    /// Get the code record for an identity.
    async fn get(&self, identity_hash: &str) -> Result<Option<LoginCode>>;

    /// Delete the code record for an identity (returns true if it existed).
    async fn delete(&self, identity_hash: &str) -> Result<bool>;
}

/// Redis implementation of LoginCodeStore.
#[derive(Clone)]
pub struct RedisLoginCodeStore {
    client: redis::Client,
}

impl RedisLoginCodeStore {
    pub fn new(client: redis::Client) -> Self {
        Self { client }
    }

    fn code_key(identity_hash: &str) -> String {
        format!("login-code:{}", identity_hash)
    }
}

#[async_trait]
impl LoginCodeStore for RedisLoginCodeStore {
    async fn put(&self, identity_hash: &str, record: &LoginCode, ttl_secs: u64) -> Result<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let key = Self::code_key(identity_hash);

        let _: () = conn
            .set_ex(&key, serde_json::to_string(record)?, ttl_secs)
            .await?;
        Ok(())
    }

    async fn get(&self, identity_hash: &str) -> Result<Option<LoginCode>> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let key = Self::code_key(identity_hash);

        let json: Option<String> = conn.get(&key).await?;

        match json {
            Some(j) => Ok(Some(serde_json::from_str(&j)?)),
            None => Ok(None),
        }
    }

    async fn delete(&self, identity_hash: &str) -> Result<bool> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let key = Self::code_key(identity_hash);

        let deleted: i64 = conn.del(&key).await?;
        Ok(deleted > 0)
    }
}
