//! services/api/src/web/prompts.rs
//!
//! The record store routes. Every query is scoped by the authenticated caller,
//! so another owner's record is indistinguishable from a missing one.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use promptt_core::{
    domain::{Category, NewPromptRecord},
    ports::PortError,
    protocol::{CreatePromptBody, CreatedBody, ErrorBody, FavoritePatchBody, PromptRecordBody},
};
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::web::state::AppState;

type RouteError = (StatusCode, Json<ErrorBody>);

fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, RouteError> {
    body.map(|Json(value)| value).map_err(|e| {
        warn!("Rejected prompt body: {}", e);
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorBody::new("Invalid request body")),
        )
    })
}

fn store_error(context: &str, e: PortError) -> RouteError {
    match e {
        PortError::NotFound(message) => (StatusCode::NOT_FOUND, Json(ErrorBody::new(message))),
        other => {
            error!("{}: {:?}", context, other);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody::new(context)),
            )
        }
    }
}

/// Save a generated prompt for the caller.
#[utoipa::path(
    post,
    path = "/prompts",
    request_body = CreatePromptBody,
    responses(
        (status = 201, description = "Prompt saved", body = CreatedBody),
        (status = 400, description = "Invalid payload", body = ErrorBody),
        (status = 401, description = "Not signed in")
    )
)]
pub async fn create_prompt_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    body: Result<Json<CreatePromptBody>, JsonRejection>,
) -> Result<impl IntoResponse, RouteError> {
    let body = json_body(body)?;
    if body.goal.trim().is_empty() || body.generated_text.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorBody::new("goal and generatedText are required")),
        ));
    }
    let category = match body.category.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => Some(raw.parse::<Category>().map_err(|e| {
            (StatusCode::BAD_REQUEST, Json(ErrorBody::new(e.to_string())))
        })?),
    };

    let record = NewPromptRecord {
        owner_id: user_id,
        goal: body.goal,
        generated_text: body.generated_text,
        category,
        is_favorite: body.is_favorite,
    };
    let id = state
        .prompts
        .insert_prompt(record)
        .await
        .map_err(|e| store_error("Failed to save prompt", e))?;

    info!("User {} saved prompt {}", user_id, id);
    Ok((StatusCode::CREATED, Json(CreatedBody { id })))
}

/// List the caller's prompts, newest first.
#[utoipa::path(
    get,
    path = "/prompts",
    responses(
        (status = 200, description = "The caller's prompt history", body = [PromptRecordBody]),
        (status = 401, description = "Not signed in")
    )
)]
pub async fn list_prompts_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
) -> Result<Json<Vec<PromptRecordBody>>, RouteError> {
    let mut records = state
        .prompts
        .list_prompts(user_id)
        .await
        .map_err(|e| store_error("Failed to load prompt history", e))?;
    records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(Json(records.into_iter().map(PromptRecordBody::from).collect()))
}

/// Set or clear the favorite flag.
#[utoipa::path(
    patch,
    path = "/prompts/{id}",
    request_body = FavoritePatchBody,
    params(("id" = Uuid, Path, description = "Prompt id")),
    responses(
        (status = 204, description = "Updated"),
        (status = 400, description = "Invalid payload", body = ErrorBody),
        (status = 404, description = "No such prompt for this user", body = ErrorBody),
        (status = 401, description = "Not signed in")
    )
)]
pub async fn update_favorite_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(id): Path<Uuid>,
    body: Result<Json<FavoritePatchBody>, JsonRejection>,
) -> Result<StatusCode, RouteError> {
    let body = json_body(body)?;
    state
        .prompts
        .set_favorite(id, user_id, body.is_favorite)
        .await
        .map_err(|e| store_error("Failed to update favorite status", e))?;
    Ok(StatusCode::NO_CONTENT)
}

/// Delete a prompt. There is no soft delete.
#[utoipa::path(
    delete,
    path = "/prompts/{id}",
    params(("id" = Uuid, Path, description = "Prompt id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "No such prompt for this user", body = ErrorBody),
        (status = 401, description = "Not signed in")
    )
)]
pub async fn delete_prompt_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, RouteError> {
    state
        .prompts
        .delete_prompt(id, user_id)
        .await
        .map_err(|e| store_error("Failed to delete prompt", e))?;
    info!("User {} deleted prompt {}", user_id, id);
    Ok(StatusCode::NO_CONTENT)
}
