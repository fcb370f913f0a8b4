//! Checkpoint endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::{
    error::AppResult,
    models::checkpoint::{Checkpoint, CreateCheckpoint, UpdateCheckpoint},
};

use super::AuthenticatedUser;

/// List all checkpoints
#[utoipa::path(
    get,
    path = "/checkpoints",
    tag = "checkpoints",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "List of checkpoints", body = Vec<Checkpoint>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_checkpoints(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
) -> AppResult<Json<Vec<Checkpoint>>> {
    let checkpoints = state.services.checkpoints.list().await?;
    Ok(Json(checkpoints))
}

/// Get checkpoint by ID
#[utoipa::path(
    get,
    path = "/checkpoints/{id}",
    tag = "checkpoints",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Checkpoint ID")
    ),
    responses(
        (status = 200, description = "Checkpoint details", body = Checkpoint),
        (status = 404, description = "Checkpoint not found")
    )
)]
pub async fn get_checkpoint(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Checkpoint>> {
    let checkpoint = state.services.checkpoints.get_by_id(id).await?;
    Ok(Json(checkpoint))
}

/// Create a checkpoint. Short code and QR payload are generated.
#[utoipa::path(
    post,
    path = "/checkpoints",
    tag = "checkpoints",
    security(("bearer_auth" = [])),
    request_body = CreateCheckpoint,
    responses(
        (status = 201, description = "Checkpoint created", body = Checkpoint),
        (status = 400, description = "Invalid input"),
        (status = 403, description = "Insufficient permissions")
    )
)]
pub async fn create_checkpoint(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(data): Json<CreateCheckpoint>,
) -> AppResult<(StatusCode, Json<Checkpoint>)> {
    claims.require_admin()?;
    data.validate()?;

    let created = state.services.checkpoints.create(&data).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Update a checkpoint
#[utoipa::path(
    put,
    path = "/checkpoints/{id}",
    tag = "checkpoints",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Checkpoint ID")
    ),
    request_body = UpdateCheckpoint,
    responses(
        (status = 200, description = "Checkpoint updated", body = Checkpoint),
        (status = 400, description = "Invalid input"),
        (status = 403, description = "Insufficient permissions"),
        (status = 404, description = "Checkpoint not found")
    )
)]
pub async fn update_checkpoint(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(data): Json<UpdateCheckpoint>,
) -> AppResult<Json<Checkpoint>> {
    claims.require_admin()?;
    data.validate()?;

    let updated = state.services.checkpoints.update(id, &data).await?;
    Ok(Json(updated))
}

/// Delete a checkpoint without recorded scans
#[utoipa::path(
    delete,
    path = "/checkpoints/{id}",
    tag = "checkpoints",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Checkpoint ID")
    ),
    responses(
        (status = 204, description = "Checkpoint deleted"),
        (status = 403, description = "Insufficient permissions"),
        (status = 404, description = "Checkpoint not found"),
        (status = 409, description = "Checkpoint has recorded scans")
    )
)]
pub async fn delete_checkpoint(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    claims.require_admin()?;

    state.services.checkpoints.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
