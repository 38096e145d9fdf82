//! services/api/src/web/middleware.rs
//!
//! Authentication middleware for protecting routes, and the CORS policy
//! shared by every route.

use axum::{
    extract::{Request, State},
    http::{
        header::{self, AUTHORIZATION, CONTENT_TYPE},
        HeaderMap, HeaderName, Method, StatusCode,
    },
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, warn};
use uuid::Uuid;

use crate::web::state::AppState;

/// Pulls the session token from the `session` cookie or an `Authorization: Bearer` header.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    let from_cookie = headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|cookies| {
            cookies
                .split(';')
                .find_map(|c| c.trim().strip_prefix("session="))
                .filter(|t| !t.is_empty())
                .map(str::to_string)
        });

    from_cookie.or_else(|| {
        headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
    })
}

/// Resolves the caller when a token is presented. No token means anonymous;
/// a stale or unknown token is rejected rather than silently downgraded.
pub async fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<Option<Uuid>, StatusCode> {
    let Some(token) = session_token(headers) else {
        return Ok(None);
    };
    state
        .db
        .validate_auth_session(&token)
        .await
        .map(Some)
        .map_err(|e| {
            warn!("Rejected session token: {:?}", e);
            StatusCode::UNAUTHORIZED
        })
}

/// Middleware that validates the session token and extracts the user_id.
///
/// If valid, inserts the user_id into request extensions for handlers to use.
/// If invalid or missing, returns 401 Unauthorized.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let token = session_token(req.headers()).ok_or(StatusCode::UNAUTHORIZED)?;

    let user_id = state
        .db
        .validate_auth_session(&token)
        .await
        .map_err(|e| {
            error!("Failed to validate auth session: {:?}", e);
            StatusCode::UNAUTHORIZED
        })?;

    req.extensions_mut().insert(user_id);
    Ok(next.run(req).await)
}

/// Any origin may call the API; browsers may send the listed headers.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            AUTHORIZATION,
            HeaderName::from_static("x-client-info"),
            HeaderName::from_static("apikey"),
            CONTENT_TYPE,
        ])
}
