//! Lesson listing and AI-backed themed generation.
//!
//! The default set is bundled and public. Themed generation requires a
//! session, burns a model call on cache miss, and treats the cache as a
//! pure optimization: cache failures never fail the request.

use axum::{
    Json, Router, debug_handler,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use garde::Validate;
use shared::api::{GenerateLessonsPayload, LessonsResponse, ThemePolicy};
use shared::lesson::{Lesson, default_lessons};

use crate::{
    error::AppError,
    middleware::auth::AuthUser,
    services::normalize_theme,
    state::AppState,
    stores::check_fail_open,
};

/// 20 generations per user per day.
const GENERATE_LIMIT: i64 = 20;
const GENERATE_WINDOW_SECS: u64 = 24 * 60 * 60;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_lessons))
        .route("/generate", post(generate_lessons))
}

#[debug_handler]
async fn list_lessons() -> Json<Vec<Lesson>> {
    Json(default_lessons())
}

#[debug_handler]
async fn generate_lessons(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<GenerateLessonsPayload>,
) -> Result<impl IntoResponse, AppError> {
    let policy = ThemePolicy::from_list(state.config.blocked_themes.as_deref());
    payload
        .validate_with(&policy)
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let theme = normalize_theme(&payload.theme);

    let limit_key = format!("ratelimit:generate:{}", user.id);
    if !check_fail_open(
        state.stores.rate_limiter.as_ref(),
        &limit_key,
        GENERATE_LIMIT,
        GENERATE_WINDOW_SECS,
    )
    .await
    {
        return Err(AppError::External(
            StatusCode::TOO_MANY_REQUESTS,
            "Too many generation requests. Try again tomorrow.",
        ));
    }

    match state.stores.lesson_cache.get(&theme).await {
        Ok(Some(lessons)) => {
            tracing::info!(user_id = %user.id, theme = %theme, "serving cached lessons");
            return Ok(Json(LessonsResponse { lessons }));
        }
        Ok(None) => {}
        Err(err) => {
            tracing::warn!(theme = %theme, error = ?err, "lesson cache read failed");
        }
    }

    // Internal errors surface as a generic 500; the retry/backoff happens
    // inside the generator
    let lessons = state.generator.themed_lessons(&theme).await?;

    if let Err(err) = state.stores.lesson_cache.set(&theme, &lessons).await {
        tracing::warn!(theme = %theme, error = ?err, "lesson cache write failed");
    }

    tracing::info!(user_id = %user.id, theme = %theme, count = lessons.len(), "lessons generated");

    Ok(Json(LessonsResponse { lessons }))
}
