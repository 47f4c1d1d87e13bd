use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub verified_at: Option<DateTime<Utc>>,
}

/// Session record stored in Redis, keyed by the hashed bearer token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Principal {
    pub user_id: Uuid,
    pub email: String,
    pub created_at: i64,
}

/// Login-code record stored in Redis, keyed by the hashed identity. Only the
/// hash of the code is stored; `expires_at` is an absolute unix timestamp so
/// staleness can be checked independently of the store's TTL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginCode {
    pub code_hash: String,
    pub expires_at: i64,
}
