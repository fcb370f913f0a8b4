//! Staff endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::{
    error::AppResult,
    models::user::{CreateUser, UpdateUser, User, UserQuery, UserStats},
};

use super::AuthenticatedUser;

/// List staff members
#[utoipa::path(
    get,
    path = "/users",
    tag = "users",
    security(("bearer_auth" = [])),
    params(UserQuery),
    responses(
        (status = 200, description = "List of staff members", body = Vec<User>),
        (status = 403, description = "Insufficient permissions")
    )
)]
pub async fn list_users(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<UserQuery>,
) -> AppResult<Json<Vec<User>>> {
    let users = state.services.users.list(&claims, &query).await?;
    Ok(Json(users))
}

/// Get staff member by ID
#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "users",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Staff member ID")
    ),
    responses(
        (status = 200, description = "Staff member details", body = User),
        (status = 403, description = "Insufficient permissions"),
        (status = 404, description = "Staff member not found")
    )
)]
pub async fn get_user(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<User>> {
    let user = state.services.users.get_by_id(&claims, id).await?;
    Ok(Json(user))
}

/// Create a staff member
#[utoipa::path(
    post,
    path = "/users",
    tag = "users",
    security(("bearer_auth" = [])),
    request_body = CreateUser,
    responses(
        (status = 201, description = "Staff member created", body = User),
        (status = 400, description = "Invalid input"),
        (status = 403, description = "Insufficient permissions"),
        (status = 409, description = "Email already in use")
    )
)]
pub async fn create_user(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(data): Json<CreateUser>,
) -> AppResult<(StatusCode, Json<User>)> {
    claims.require_admin()?;
    data.validate()?;

    let created = state.services.users.create(&claims, &data).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Update a staff member. Only administrators may change roles.
#[utoipa::path(
    put,
    path = "/users/{id}",
    tag = "users",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Staff member ID")
    ),
    request_body = UpdateUser,
    responses(
        (status = 200, description = "Staff member updated", body = User),
        (status = 400, description = "Invalid input"),
        (status = 403, description = "Insufficient permissions"),
        (status = 404, description = "Staff member not found"),
        (status = 409, description = "Email already in use")
    )
)]
pub async fn update_user(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(data): Json<UpdateUser>,
) -> AppResult<Json<User>> {
    data.validate()?;

    let updated = state.services.users.update(&claims, id, &data).await?;
    Ok(Json(updated))
}

/// Delete a staff member without recorded activity
#[utoipa::path(
    delete,
    path = "/users/{id}",
    tag = "users",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Staff member ID")
    ),
    responses(
        (status = 204, description = "Staff member deleted"),
        (status = 400, description = "Cannot delete own account"),
        (status = 403, description = "Insufficient permissions"),
        (status = 404, description = "Staff member not found"),
        (status = 409, description = "Staff member has recorded scans or patrols")
    )
)]
pub async fn delete_user(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.services.users.delete(&claims, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Activity counters of a staff member
#[utoipa::path(
    get,
    path = "/users/{id}/stats",
    tag = "users",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Staff member ID")
    ),
    responses(
        (status = 200, description = "Scan and patrol counters", body = UserStats),
        (status = 403, description = "Insufficient permissions"),
        (status = 404, description = "Staff member not found")
    )
)]
pub async fn user_stats(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<UserStats>> {
    let stats = state.services.users.stats(&claims, id).await?;
    Ok(Json(stats))
}
