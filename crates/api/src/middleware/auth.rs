//! Session authentication middleware.
//!
//! Usage: Add `AuthUser` as an extractor parameter to require authentication.
//! The bearer token is hashed and resolved against the session store.
//!
//! ```ignore
//! async fn my_handler(user: AuthUser, ...) -> ... {
//!     // user.id and user.email are available here
//! }
//! ```

use axum::{
    Json, RequestPartsExt,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use uuid::Uuid;

use crate::{crypto, state::AppState};

/// Authenticated user resolved from a valid session token.
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
    /// Hash of the presented token, kept so logout can delete the session.
    pub session_key: String,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|_| AuthError::MissingToken)?;

        let session_key = crypto::sha256_hex(bearer.token().as_bytes());

        let principal = state
            .stores
            .sessions
            .get(&session_key)
            .await
            .map_err(|e| {
                tracing::error!("session lookup error: {:?}", e);
                AuthError::InvalidToken
            })?
            .ok_or(AuthError::InvalidToken)?;

        Ok(AuthUser {
            id: principal.user_id,
            email: principal.email,
            session_key,
        })
    }
}

pub enum AuthError {
    MissingToken,
    InvalidToken,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthError::MissingToken => (StatusCode::UNAUTHORIZED, "Missing authorization token"),
            AuthError::InvalidToken => (StatusCode::UNAUTHORIZED, "Invalid or expired token"),
        };

        let body = serde_json::json!({ "error": message });

        (status, Json(body)).into_response()
    }
}
