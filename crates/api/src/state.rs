use std::sync::Arc;

use sqlx::PgPool;

use crate::{
    config::Config,
    repos::Repos,
    services::{EmailSender, LessonGenerator},
    stores::Stores,
};

#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Config,
    /// Postgres pool (used directly only by the health check).
    pub database: PgPool,
    /// Database repositories.
    pub repos: Repos,
    /// Ephemeral stores (Redis, or in-process when Redis is unconfigured).
    pub stores: Stores,
    /// Email sender.
    pub email: Arc<dyn EmailSender>,
    /// Themed lesson generator.
    pub generator: Arc<dyn LessonGenerator>,
}
