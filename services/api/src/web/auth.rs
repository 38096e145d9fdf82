//! services/api/src/web/auth.rs
//!
//! Authentication endpoints for signup, login, logout, the current user and password changes.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Extension, Json,
};
use chrono::{Duration, Utc};
use promptt_core::{
    domain::{AuthSession, MIN_PASSWORD_LEN},
    ports::PortError,
    protocol::{AuthResponseBody, CredentialsBody, ErrorBody, PasswordChangeBody},
};
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::web::{middleware::session_token, state::AppState};

const SESSION_DAYS: i64 = 30;

type AuthError = (StatusCode, String);

//=========================================================================================
// Helpers
//=========================================================================================

fn session_cookie(token: &str) -> String {
    format!(
        "session={}; HttpOnly; Secure; SameSite=Lax; Path=/; Max-Age={}",
        token,
        Duration::days(SESSION_DAYS).num_seconds()
    )
}

/// Issues and stores a fresh login session for `user_id`.
async fn open_session(state: &AppState, user_id: Uuid) -> Result<AuthSession, AuthError> {
    let session = AuthSession {
        token: Uuid::new_v4().to_string(),
        user_id,
        expires_at: Utc::now() + Duration::days(SESSION_DAYS),
    };
    state
        .db
        .create_auth_session(&session.token, session.user_id, session.expires_at)
        .await
        .map_err(|e| {
            error!("Failed to create auth session: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to create session".to_string())
        })?;
    Ok(session)
}

fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err((
            StatusCode::BAD_REQUEST,
            format!("Password must be at least {} characters", MIN_PASSWORD_LEN),
        ));
    }
    Ok(())
}

fn validate_credentials(req: &CredentialsBody) -> Result<String, AuthError> {
    let email = req.email.trim().to_ascii_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err((StatusCode::BAD_REQUEST, "A valid email is required".to_string()));
    }
    validate_password(&req.password)?;
    Ok(email)
}

fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| {
            error!("Failed to hash password: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to hash password".to_string())
        })
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /auth/signup - Create a new user account
#[utoipa::path(
    post,
    path = "/auth/signup",
    request_body = CredentialsBody,
    responses(
        (status = 201, description = "User created successfully", body = AuthResponseBody),
        (status = 400, description = "Invalid request"),
        (status = 409, description = "Email already registered"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn signup_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CredentialsBody>,
) -> Result<impl IntoResponse, AuthError> {
    let email = validate_credentials(&req)?;

    // 1. Hash the password
    let password_hash = hash_password(&req.password)?;

    // 2. Create user in database
    let user = state
        .db
        .create_user_with_email(&email, &password_hash)
        .await
        .map_err(|e| match e {
            PortError::Rejected(message) => (StatusCode::CONFLICT, message),
            other => {
                error!("Failed to create user: {:?}", other);
                (StatusCode::INTERNAL_SERVER_ERROR, "Failed to create user".to_string())
            }
        })?;

    // 3. Open a session and hand it back as cookie and body
    let session = open_session(&state, user.id).await?;
    info!("New user signed up: {}", user.id);

    let response = AuthResponseBody {
        user_id: user.id,
        email: user.email,
        token: Some(session.token.clone()),
    };
    Ok((
        StatusCode::CREATED,
        [(header::SET_COOKIE, session_cookie(&session.token))],
        Json(response),
    ))
}

/// POST /auth/login - Login with existing account
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = CredentialsBody,
    responses(
        (status = 200, description = "Login successful", body = AuthResponseBody),
        (status = 401, description = "Invalid credentials"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CredentialsBody>,
) -> Result<impl IntoResponse, AuthError> {
    let email = req.email.trim().to_ascii_lowercase();

    // 1. Get user by email
    let user_creds = state.db.get_user_by_email(&email).await.map_err(|e| {
        error!("Failed to get user: {:?}", e);
        (StatusCode::UNAUTHORIZED, "Invalid email or password".to_string())
    })?;

    // 2. Verify password
    let parsed_hash = PasswordHash::new(&user_creds.hashed_password).map_err(|e| {
        error!("Failed to parse password hash: {:?}", e);
        (StatusCode::INTERNAL_SERVER_ERROR, "Authentication error".to_string())
    })?;

    let valid = Argon2::default()
        .verify_password(req.password.as_bytes(), &parsed_hash)
        .is_ok();

    if !valid {
        return Err((StatusCode::UNAUTHORIZED, "Invalid email or password".to_string()));
    }

    // 3. Open a session
    let session = open_session(&state, user_creds.user_id).await?;

    let response = AuthResponseBody {
        user_id: user_creds.user_id,
        email: Some(user_creds.email),
        token: Some(session.token.clone()),
    };
    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, session_cookie(&session.token))],
        Json(response),
    ))
}

/// POST /auth/logout - Logout and invalidate session
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses(
        (status = 200, description = "Logout successful"),
        (status = 401, description = "No active session")
    )
)]
pub async fn logout_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AuthError> {
    let token = session_token(&headers)
        .ok_or((StatusCode::UNAUTHORIZED, "No session found".to_string()))?;

    state.db.delete_auth_session(&token).await.map_err(|e| {
        error!("Failed to delete auth session: {:?}", e);
        (StatusCode::INTERNAL_SERVER_ERROR, "Failed to logout".to_string())
    })?;

    let cookie = "session=; HttpOnly; Secure; SameSite=Lax; Path=/; Max-Age=0";
    Ok((StatusCode::OK, [(header::SET_COOKIE, cookie.to_string())]))
}

/// GET /auth/me - The user behind the current session
#[utoipa::path(
    get,
    path = "/auth/me",
    responses(
        (status = 200, description = "Current user", body = AuthResponseBody),
        (status = 401, description = "Not signed in")
    )
)]
pub async fn me_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
) -> Result<Json<AuthResponseBody>, AuthError> {
    let user = state.db.get_user_by_id(user_id).await.map_err(|e| {
        error!("Failed to load user {}: {:?}", user_id, e);
        (StatusCode::UNAUTHORIZED, "Unknown user".to_string())
    })?;
    Ok(Json(AuthResponseBody {
        user_id: user.id,
        email: user.email,
        token: None,
    }))
}

/// POST /auth/password - Set a new password for the signed-in user
#[utoipa::path(
    post,
    path = "/auth/password",
    request_body = PasswordChangeBody,
    responses(
        (status = 204, description = "Password updated"),
        (status = 400, description = "Password too short or confirmation mismatch", body = ErrorBody),
        (status = 401, description = "Not signed in")
    )
)]
pub async fn change_password_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    body: Result<Json<PasswordChangeBody>, JsonRejection>,
) -> Result<StatusCode, (StatusCode, Json<ErrorBody>)> {
    let as_json = |(status, message): AuthError| (status, Json(ErrorBody::new(message)));

    let Json(req) = body.map_err(|e| {
        warn!("Rejected password change body: {}", e);
        as_json((StatusCode::BAD_REQUEST, "Invalid request body".to_string()))
    })?;
    if req.confirm_password.as_deref().is_some_and(|c| c != req.password) {
        return Err(as_json((StatusCode::BAD_REQUEST, "Passwords do not match".to_string())));
    }
    validate_password(&req.password).map_err(as_json)?;

    let password_hash = hash_password(&req.password).map_err(as_json)?;
    state
        .db
        .update_password(user_id, &password_hash)
        .await
        .map_err(|e| {
            error!("Failed to update password for {}: {:?}", user_id, e);
            as_json((StatusCode::INTERNAL_SERVER_ERROR, "Failed to update password".to_string()))
        })?;

    info!("User {} changed their password", user_id);
    Ok(StatusCode::NO_CONTENT)
}
