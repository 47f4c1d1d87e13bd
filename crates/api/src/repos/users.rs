//! User persistence.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::User;

/// Repository for user rows.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepo: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Inserts a user row for the given email.
    async fn create(&self, email: &str) -> Result<User>;

    /// Stamps the user's latest successful verification.
    async fn mark_verified(&self, id: Uuid) -> Result<()>;
}

/// Postgres implementation of UserRepo.
#[derive(Clone)]
pub struct PgUserRepo {
    pool: PgPool,
}

impl PgUserRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepo for PgUserRepo {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    async fn create(&self, email: &str) -> Result<User> {
        let user = sqlx::query_as::<_, User>("INSERT INTO users (email) VALUES ($1) RETURNING *")
            .bind(email)
            .fetch_one(&self.pool)
            .await?;

        Ok(user)
    }

    async fn mark_verified(&self, id: Uuid) -> Result<()> {
        sqlx::query("UPDATE users SET verified_at = now() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
