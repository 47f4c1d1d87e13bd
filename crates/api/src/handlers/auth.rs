//! Email-based passwordless authentication.
//!
//! Flow:
//! 1. User requests a code via POST /auth/code with their email
//! 2. A 6-digit code is generated, hashed (SHA256), and stored keyed by the
//!    hashed identity with an absolute expiry
//! 3. The plaintext code is emailed to the user (or logged in dev mode)
//! 4. User submits email + code to POST /auth/verify
//! 5. Code hashes are compared in constant time; on match the user is
//!    created/verified and a session token is returned
//!
//! Security notes:
//! - Codes are hashed before storage (store compromise doesn't leak valid codes)
//! - Codes expire after 15 minutes and are single use
//! - Reissuing overwrites the prior record, so only the newest code verifies
//! - All verification failures return the same "Invalid code" message
//! - Rate limiting fails open: a down counter store never blocks login

use axum::{
    Json, Router, debug_handler,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::Utc;
use garde::Validate;
use shared::api::{MeResponse, RequestCodePayload, VerifyCodePayload, VerifyCodeResponse};

use crate::{
    crypto,
    error::AppError,
    middleware::auth::AuthUser,
    models::{LoginCode, Principal},
    state::AppState,
    stores::check_fail_open,
};

/// Codes live for 15 minutes.
const CODE_TTL_SECS: u64 = 15 * 60;
/// 5 code requests per hour per email.
const CODE_LIMIT: i64 = 5;
const CODE_WINDOW_SECS: u64 = 3600;
/// 10 verify attempts per 15 minutes per email.
const VERIFY_LIMIT: i64 = 10;
const VERIFY_WINDOW_SECS: u64 = 15 * 60;
/// Sessions live for 30 days.
const SESSION_TTL_SECS: u64 = 30 * 24 * 60 * 60;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/code", post(request_code))
        .route("/verify", post(verify_code))
        .route("/me", get(get_me))
        .route("/logout", post(logout))
}

/// Identities are compared and keyed case-insensitively.
fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

#[debug_handler]
async fn request_code(
    State(state): State<AppState>,
    Json(payload): Json<RequestCodePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let email = normalize_email(&payload.email);

    let limit_key = format!("ratelimit:code:{}", email);
    if !check_fail_open(
        state.stores.rate_limiter.as_ref(),
        &limit_key,
        CODE_LIMIT,
        CODE_WINDOW_SECS,
    )
    .await
    {
        return Err(AppError::External(
            StatusCode::TOO_MANY_REQUESTS,
            "Too many code requests. Try again later.",
        ));
    }

    let code = crypto::login_code();

    // Store only the hash, keyed by the hashed identity. Overwrites any
    // prior record, so reissuing invalidates the previous code.
    let record = LoginCode {
        code_hash: crypto::sha256_hex(code.as_bytes()),
        expires_at: Utc::now().timestamp() + CODE_TTL_SECS as i64,
    };
    state
        .stores
        .login_codes
        .put(&crypto::sha256_hex(email.as_bytes()), &record, CODE_TTL_SECS)
        .await?;

    state.email.send_login_code(&email, &code).await?;

    tracing::info!(email = %email, "login code requested");

    Ok(Json(serde_json::json!({ "ok": true })))
}

#[debug_handler]
async fn verify_code(
    State(state): State<AppState>,
    Json(payload): Json<VerifyCodePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let email = normalize_email(&payload.email);

    let limit_key = format!("ratelimit:verify:{}", email);
    if !check_fail_open(
        state.stores.rate_limiter.as_ref(),
        &limit_key,
        VERIFY_LIMIT,
        VERIFY_WINDOW_SECS,
    )
    .await
    {
        return Err(AppError::External(
            StatusCode::TOO_MANY_REQUESTS,
            "Too many verification attempts. Try again later.",
        ));
    }

    let identity_hash = crypto::sha256_hex(email.as_bytes());

    let record = match state.stores.login_codes.get(&identity_hash).await? {
        Some(record) => record,
        None => {
            tracing::warn!(email = %email, "verification failed: no code on record");
            return Err(AppError::External(StatusCode::BAD_REQUEST, "Invalid code"));
        }
    };

    // The store's TTL usually handles this, but the absolute expiry is
    // authoritative: a stale record is treated as absent and purged.
    if record.expires_at <= Utc::now().timestamp() {
        state.stores.login_codes.delete(&identity_hash).await?;
        tracing::warn!(email = %email, "verification failed: code expired");
        return Err(AppError::External(StatusCode::BAD_REQUEST, "Invalid code"));
    }

    let submitted_hash = crypto::sha256_hex(payload.code.as_bytes());
    if !crypto::constant_time_eq(submitted_hash.as_bytes(), record.code_hash.as_bytes()) {
        tracing::warn!(email = %email, "verification failed: code mismatch");
        return Err(AppError::External(StatusCode::BAD_REQUEST, "Invalid code"));
    }

    // Single use: delete before minting the session
    state.stores.login_codes.delete(&identity_hash).await?;

    // A correct login shouldn't leave the user one attempt from lockout.
    // Counter store failures stay non-fatal here too.
    if let Err(err) = state.stores.rate_limiter.clear(&limit_key).await {
        tracing::warn!(email = %email, error = ?err, "failed to clear verify counter");
    }

    // Create the user on verify (not on code request) so unverified emails
    // are never stored
    let user = match state.repos.users.find_by_email(&email).await? {
        Some(user) => user,
        None => state.repos.users.create(&email).await?,
    };
    state.repos.users.mark_verified(user.id).await?;

    let token = crypto::session_token();
    let principal = Principal {
        user_id: user.id,
        email: email.clone(),
        created_at: Utc::now().timestamp(),
    };
    state
        .stores
        .sessions
        .put(
            &crypto::sha256_hex(token.as_bytes()),
            &principal,
            SESSION_TTL_SECS,
        )
        .await?;

    tracing::info!(user_id = %user.id, email = %email, "user verified");

    Ok(Json(VerifyCodeResponse { token, email }))
}

async fn get_me(user: AuthUser) -> Json<MeResponse> {
    Json(MeResponse {
        id: user.id,
        email: user.email,
    })
}

#[debug_handler]
async fn logout(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    state.stores.sessions.delete(&user.session_key).await?;

    tracing::info!(user_id = %user.id, "signed out");

    Ok(StatusCode::OK)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repos::MockUserRepo;
    use crate::services::MockEmailSender;
    use crate::stores::{
        MockLoginCodeStore, MockRateLimiter, MockSessionStore, RateLimitResult,
    };
    use crate::test_utils::{TestStateBuilder, mock_user};
    use http_body_util::BodyExt;

    fn allowed_limiter() -> MockRateLimiter {
        let mut limiter = MockRateLimiter::new();
        limiter
            .expect_check_simple()
            .returning(|_, _, _| Ok(RateLimitResult::Allowed(1)));
        limiter.expect_clear().returning(|_| Ok(()));
        limiter
    }

    fn code_payload(email: &str) -> RequestCodePayload {
        RequestCodePayload {
            email: email.to_string(),
        }
    }

    fn verify_payload(email: &str, code: &str) -> VerifyCodePayload {
        VerifyCodePayload {
            email: email.to_string(),
            code: code.to_string(),
        }
    }

    fn valid_record(code: &str) -> LoginCode {
        LoginCode {
            code_hash: crypto::sha256_hex(code.as_bytes()),
            expires_at: Utc::now().timestamp() + 900,
        }
    }

    #[tokio::test]
    async fn request_code_stores_hash_and_sends_email() {
        let identity_hash = crypto::sha256_hex(b"alice@example.com");

        let mut codes = MockLoginCodeStore::new();
        codes
            .expect_put()
            .withf(move |identity, record, ttl| {
                identity == identity_hash
                    // Only the hash is stored, never the 6-digit code
                    && record.code_hash.len() == 64
                    && *ttl == CODE_TTL_SECS
            })
            .returning(|_, _, _| Ok(()));

        let mut email = MockEmailSender::new();
        email
            .expect_send_login_code()
            .withf(|to, code| {
                to == "alice@example.com"
                    && code.len() == 6
                    && code.chars().all(|c| c.is_ascii_digit())
            })
            .returning(|_, _| Ok(()));

        let state = TestStateBuilder::new()
            .with_rate_limiter(allowed_limiter())
            .with_login_code_store(codes)
            .with_email_sender(email)
            .build();

        let result = request_code(State(state), Json(code_payload("Alice@Example.com")))
            .await
            .unwrap();

        assert_eq!(result.into_response().status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn request_code_rejects_invalid_email() {
        let state = TestStateBuilder::new().build();

        let result = request_code(State(state), Json(code_payload("not-an-email"))).await;

        let Err(AppError::Validation(_)) = result else {
            panic!("Expected validation error");
        };
    }

    #[tokio::test]
    async fn request_code_rejects_when_rate_limited() {
        let mut limiter = MockRateLimiter::new();
        limiter
            .expect_check_simple()
            .returning(|_, _, _| Ok(RateLimitResult::Exceeded(6)));

        let state = TestStateBuilder::new().with_rate_limiter(limiter).build();

        let result = request_code(State(state), Json(code_payload("alice@example.com"))).await;

        let Err(AppError::External(status, _)) = result else {
            panic!("Expected external error");
        };
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    }

    #[tokio::test]
    async fn request_code_fails_open_when_limiter_store_is_down() {
        let mut limiter = MockRateLimiter::new();
        limiter
            .expect_check_simple()
            .returning(|_, _, _| Err(anyhow::anyhow!("connection refused")));

        let mut codes = MockLoginCodeStore::new();
        codes.expect_put().returning(|_, _, _| Ok(()));

        let mut email = MockEmailSender::new();
        email.expect_send_login_code().returning(|_, _| Ok(()));

        let state = TestStateBuilder::new()
            .with_rate_limiter(limiter)
            .with_login_code_store(codes)
            .with_email_sender(email)
            .build();

        let result = request_code(State(state), Json(code_payload("alice@example.com")))
            .await
            .unwrap();

        assert_eq!(result.into_response().status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn verify_code_rejects_when_no_code_on_record() {
        let mut codes = MockLoginCodeStore::new();
        codes.expect_get().returning(|_| Ok(None));

        let state = TestStateBuilder::new()
            .with_rate_limiter(allowed_limiter())
            .with_login_code_store(codes)
            .build();

        let result = verify_code(
            State(state),
            Json(verify_payload("alice@example.com", "123456")),
        )
        .await;

        let Err(AppError::External(status, msg)) = result else {
            panic!("Expected external error");
        };
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(msg, "Invalid code");
    }

    #[tokio::test]
    async fn verify_code_purges_expired_records() {
        let mut codes = MockLoginCodeStore::new();
        codes.expect_get().returning(|_| {
            Ok(Some(LoginCode {
                code_hash: crypto::sha256_hex(b"123456"),
                expires_at: Utc::now().timestamp() - 1,
            }))
        });
        // The stale record must be deleted as a side effect
        codes.expect_delete().times(1).returning(|_| Ok(true));

        let state = TestStateBuilder::new()
            .with_rate_limiter(allowed_limiter())
            .with_login_code_store(codes)
            .build();

        let result = verify_code(
            State(state),
            Json(verify_payload("alice@example.com", "123456")),
        )
        .await;

        let Err(AppError::External(status, msg)) = result else {
            panic!("Expected external error");
        };
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(msg, "Invalid code");
    }

    #[tokio::test]
    async fn verify_code_rejects_wrong_code_without_consuming_it() {
        let mut codes = MockLoginCodeStore::new();
        codes.expect_get().returning(|_| Ok(Some(valid_record("123456"))));
        // No expect_delete: deleting on mismatch would let an attacker
        // invalidate the legitimate user's code

        let state = TestStateBuilder::new()
            .with_rate_limiter(allowed_limiter())
            .with_login_code_store(codes)
            .build();

        let result = verify_code(
            State(state),
            Json(verify_payload("alice@example.com", "654321")),
        )
        .await;

        let Err(AppError::External(status, msg)) = result else {
            panic!("Expected external error");
        };
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(msg, "Invalid code");
    }

    #[tokio::test]
    async fn verify_code_rejects_when_rate_limited() {
        let mut limiter = MockRateLimiter::new();
        limiter
            .expect_check_simple()
            .returning(|_, _, _| Ok(RateLimitResult::Exceeded(11)));

        let state = TestStateBuilder::new().with_rate_limiter(limiter).build();

        let result = verify_code(
            State(state),
            Json(verify_payload("alice@example.com", "123456")),
        )
        .await;

        let Err(AppError::External(status, _)) = result else {
            panic!("Expected external error");
        };
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    }

    #[tokio::test]
    async fn verify_code_consumes_code_and_returns_session_token() {
        let user = mock_user("alice@example.com");

        let mut codes = MockLoginCodeStore::new();
        codes.expect_get().returning(|_| Ok(Some(valid_record("123456"))));
        codes.expect_delete().times(1).returning(|_| Ok(true));

        let mut limiter = MockRateLimiter::new();
        limiter
            .expect_check_simple()
            .returning(|_, _, _| Ok(RateLimitResult::Allowed(1)));
        limiter
            .expect_clear()
            .withf(|key| key == "ratelimit:verify:alice@example.com")
            .times(1)
            .returning(|_| Ok(()));

        let mut users = MockUserRepo::new();
        let found = user.clone();
        users
            .expect_find_by_email()
            .returning(move |_| Ok(Some(found.clone())));
        users.expect_mark_verified().returning(|_| Ok(()));

        let mut sessions = MockSessionStore::new();
        sessions
            .expect_put()
            .withf(|token_hash, principal, ttl| {
                token_hash.len() == 64
                    && principal.email == "alice@example.com"
                    && *ttl == SESSION_TTL_SECS
            })
            .returning(|_, _, _| Ok(()));

        let state = TestStateBuilder::new()
            .with_rate_limiter(limiter)
            .with_login_code_store(codes)
            .with_user_repo(users)
            .with_session_store(sessions)
            .build();

        let response = verify_code(
            State(state),
            Json(verify_payload("alice@example.com", "123456")),
        )
        .await
        .unwrap()
        .into_response();

        assert_eq!(response.status(), StatusCode::OK);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: VerifyCodeResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body.email, "alice@example.com");
        assert_eq!(body.token.len(), 64);
    }

    #[tokio::test]
    async fn verify_code_creates_user_on_first_login() {
        let user = mock_user("new@example.com");

        let mut codes = MockLoginCodeStore::new();
        codes.expect_get().returning(|_| Ok(Some(valid_record("123456"))));
        codes.expect_delete().returning(|_| Ok(true));

        let mut users = MockUserRepo::new();
        users.expect_find_by_email().returning(|_| Ok(None));
        let created = user.clone();
        users
            .expect_create()
            .withf(|email| email == "new@example.com")
            .times(1)
            .returning(move |_| Ok(created.clone()));
        users.expect_mark_verified().returning(|_| Ok(()));

        let mut sessions = MockSessionStore::new();
        sessions.expect_put().returning(|_, _, _| Ok(()));

        let state = TestStateBuilder::new()
            .with_rate_limiter(allowed_limiter())
            .with_login_code_store(codes)
            .with_user_repo(users)
            .with_session_store(sessions)
            .build();

        let response = verify_code(
            State(state),
            Json(verify_payload("new@example.com", "123456")),
        )
        .await
        .unwrap()
        .into_response();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn logout_deletes_the_session() {
        let mut sessions = MockSessionStore::new();
        sessions
            .expect_delete()
            .withf(|key| key == "session-hash")
            .times(1)
            .returning(|_| Ok(true));

        let state = TestStateBuilder::new().with_session_store(sessions).build();

        let user = AuthUser {
            id: uuid::Uuid::new_v4(),
            email: "alice@example.com".into(),
            session_key: "session-hash".into(),
        };

        let result = logout(user, State(state)).await.unwrap();
        assert_eq!(result.into_response().status(), StatusCode::OK);
    }

    #[test]
    fn emails_normalize_to_trimmed_lowercase() {
        assert_eq!(normalize_email(" Alice@Example.COM "), "alice@example.com");
    }
}
