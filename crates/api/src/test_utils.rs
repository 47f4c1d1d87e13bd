//! Shared test utilities for API handler tests.
//!
//! Provides mock factories and a flexible `TestStateBuilder` for
//! constructing `AppState` instances with only the mocks needed for each
//! test.
//!
//! ## Usage
//!
//! ```ignore
//! use crate::test_utils::{TestStateBuilder, mock_user};
//!
//! let mut users = MockUserRepo::new();
//! users.expect_find_by_email().returning(|_| Ok(Some(mock_user("alice@example.com"))));
//!
//! let state = TestStateBuilder::new()
//!     .with_user_repo(users)
//!     .build();
//! ```

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::config::Config;
use crate::models::User;
use crate::repos::{MockUserRepo, Repos};
use crate::services::{EmailSender, LessonGenerator, MockEmailSender, MockLessonGenerator};
use crate::state::AppState;
use crate::stores::{
    MockLessonCache, MockLoginCodeStore, MockRateLimiter, MockSessionStore, Stores,
};

/// Creates a test configuration with dummy values.
pub fn test_config() -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 3000,
        database_url: "postgres://test".to_string(),
        redis_url: None,
        smtp_url: None,
        resend_api_key: None,
        gemini_api_key: "AIzaSyTestCredential0000".to_string(),
        gemini_model: "gemini-2.0-flash".to_string(),
        blocked_themes: None,
        env: "test".to_string(),
        sentry_dsn: None,
    }
}

/// Creates a mock verified user with the given email.
pub fn mock_user(email: &str) -> User {
    User {
        id: Uuid::new_v4(),
        email: email.to_string(),
        created_at: Utc::now(),
        verified_at: Some(Utc::now()),
    }
}

/// Builder for constructing test `AppState` with custom mocks.
///
/// Uses default (empty) mocks for any repo/store/service not explicitly set,
/// so tests only configure what they actually exercise.
pub struct TestStateBuilder {
    user_repo: Option<MockUserRepo>,
    rate_limiter: Option<MockRateLimiter>,
    login_code_store: Option<MockLoginCodeStore>,
    session_store: Option<MockSessionStore>,
    lesson_cache: Option<MockLessonCache>,
    email_sender: Option<MockEmailSender>,
    lesson_generator: Option<MockLessonGenerator>,
}

impl TestStateBuilder {
    pub fn new() -> Self {
        Self {
            user_repo: None,
            rate_limiter: None,
            login_code_store: None,
            session_store: None,
            lesson_cache: None,
            email_sender: None,
            lesson_generator: None,
        }
    }

    pub fn with_user_repo(mut self, repo: MockUserRepo) -> Self {
        self.user_repo = Some(repo);
        self
    }

    pub fn with_rate_limiter(mut self, limiter: MockRateLimiter) -> Self {
        self.rate_limiter = Some(limiter);
        self
    }

    pub fn with_login_code_store(mut self, store: MockLoginCodeStore) -> Self {
        self.login_code_store = Some(store);
        self
    }

    pub fn with_session_store(mut self, store: MockSessionStore) -> Self {
        self.session_store = Some(store);
        self
    }

    pub fn with_lesson_cache(mut self, cache: MockLessonCache) -> Self {
        self.lesson_cache = Some(cache);
        self
    }

    pub fn with_email_sender(mut self, sender: MockEmailSender) -> Self {
        self.email_sender = Some(sender);
        self
    }

    pub fn with_lesson_generator(mut self, generator: MockLessonGenerator) -> Self {
        self.lesson_generator = Some(generator);
        self
    }

    /// Builds the `AppState` using configured mocks or defaults. The pool is
    /// lazy and never connects - handlers under test go through the repos.
    pub fn build(self) -> AppState {
        let repos = Repos {
            users: Arc::new(self.user_repo.unwrap_or_else(MockUserRepo::new)),
        };

        let stores = Stores {
            rate_limiter: Arc::new(self.rate_limiter.unwrap_or_else(MockRateLimiter::new)),
            login_codes: Arc::new(
                self.login_code_store
                    .unwrap_or_else(MockLoginCodeStore::new),
            ),
            sessions: Arc::new(self.session_store.unwrap_or_else(MockSessionStore::new)),
            lesson_cache: Arc::new(self.lesson_cache.unwrap_or_else(MockLessonCache::new)),
        };

        let email = Arc::new(self.email_sender.unwrap_or_else(MockEmailSender::new))
            as Arc<dyn EmailSender>;
        let generator = Arc::new(
            self.lesson_generator
                .unwrap_or_else(MockLessonGenerator::new),
        ) as Arc<dyn LessonGenerator>;

        let database = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgres://test")
            .expect("lazy pool");

        AppState {
            config: test_config(),
            database,
            repos,
            stores,
            email,
            generator,
        }
    }
}

impl Default for TestStateBuilder {
    fn default() -> Self {
        Self::new()
    }
}
