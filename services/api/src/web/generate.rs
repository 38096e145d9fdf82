//! services/api/src/web/generate.rs
//!
//! The generation gateway: `POST /generate-prompt`. Stateless apart from the
//! per-owner daily counter applied to authenticated callers.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use chrono::Utc;
use promptt_core::{
    domain::{usage_day, Category, GenerationRequest},
    ports::PortError,
    protocol::{ErrorBody, GenerateRequestBody, GenerateResponseBody},
};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::web::{middleware::authenticate, state::AppState};

type GatewayError = (StatusCode, Json<ErrorBody>);

fn reject(status: StatusCode, message: impl Into<String>) -> GatewayError {
    (status, Json(ErrorBody::new(message)))
}

/// Generate an optimized prompt for a goal.
#[utoipa::path(
    post,
    path = "/generate-prompt",
    request_body = GenerateRequestBody,
    responses(
        (status = 200, description = "Prompt generated", body = GenerateResponseBody),
        (status = 400, description = "Missing goal, unknown category or missing API key", body = ErrorBody),
        (status = 401, description = "Session token presented but not valid"),
        (status = 429, description = "Daily prompt limit reached", body = ErrorBody),
        (status = 502, description = "Upstream model error", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn generate_prompt_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Result<Json<GenerateRequestBody>, JsonRejection>,
) -> Result<Json<GenerateResponseBody>, GatewayError> {
    let Json(body) = body.map_err(|e| {
        warn!("Rejected generate-prompt body: {}", e);
        reject(StatusCode::BAD_REQUEST, "Invalid request body")
    })?;

    let category = match body.category.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => Some(
            raw.parse::<Category>()
                .map_err(|e| reject(StatusCode::BAD_REQUEST, e.to_string()))?,
        ),
    };
    let request = GenerationRequest::new(&body.goal, category)
        .ok_or_else(|| reject(StatusCode::BAD_REQUEST, "Goal is required"))?;

    let owner = authenticate(&state, &headers)
        .await
        .map_err(|status| reject(status, "Invalid session"))?;

    // A signed-in caller claims a slot before the model is called.
    let day = usage_day(Utc::now());
    if let Some(owner_id) = owner {
        let reserved = state
            .db
            .try_reserve_daily_usage(owner_id, day, state.config.daily_prompt_limit)
            .await
            .map_err(|e| {
                error!("Failed to reserve daily usage for {}: {:?}", owner_id, e);
                reject(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            })?;
        if !reserved {
            info!("User {} reached the daily limit", owner_id);
            return Err(reject(StatusCode::TOO_MANY_REQUESTS, "Daily prompt limit reached"));
        }
    }

    let outcome = state
        .generator
        .generate_prompt(&request, body.api_key.as_deref())
        .await;

    // Only a delivered prompt keeps its slot.
    let delivered = matches!(&outcome, Ok(text) if !text.is_empty());
    if let Some(owner_id) = owner.filter(|_| !delivered) {
        if let Err(e) = state.db.release_daily_usage(owner_id, day).await {
            error!("Failed to release daily usage for {}: {:?}", owner_id, e);
        }
    }

    let generated = outcome.map_err(|e| match e {
        PortError::Unauthorized => reject(StatusCode::BAD_REQUEST, "API key is required"),
        PortError::Rejected(message) => reject(StatusCode::BAD_GATEWAY, message),
        other => {
            error!("Error in generate-prompt: {:?}", other);
            reject(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        }
    })?;

    Ok(Json(GenerateResponseBody {
        generated_prompt: Some(generated),
    }))
}

/// Answers a bare `OPTIONS` with an empty 200. Real pre-flights are answered by the CORS layer.
pub async fn preflight_handler() -> StatusCode {
    StatusCode::OK
}
