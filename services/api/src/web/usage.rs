//! services/api/src/web/usage.rs

use axum::{extract::State, http::StatusCode, Extension, Json};
use chrono::Utc;
use promptt_core::{
    domain::{usage_day, DailyUsage},
    protocol::{ErrorBody, UsageBody},
};
use std::sync::Arc;
use tracing::error;
use uuid::Uuid;

use crate::web::state::AppState;

/// Today's (UTC) generation count for the caller.
#[utoipa::path(
    get,
    path = "/usage",
    responses(
        (status = 200, description = "Authoritative daily usage", body = UsageBody),
        (status = 401, description = "Not signed in")
    )
)]
pub async fn usage_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
) -> Result<Json<UsageBody>, (StatusCode, Json<ErrorBody>)> {
    let day = usage_day(Utc::now());
    let used = state.db.get_daily_usage(user_id, day).await.map_err(|e| {
        error!("Failed to read daily usage for {}: {:?}", user_id, e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorBody::new("Failed to read usage")),
        )
    })?;
    let usage = DailyUsage {
        owner_id: user_id,
        day,
        used,
        limit: state.config.daily_prompt_limit,
    };
    Ok(Json(UsageBody::from(&usage)))
}
