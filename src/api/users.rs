use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::extract::RequireAdmin;
use super::{
    ApiError, ApiResponse, AppState, AssignedRouterDto, AssignmentDto, IncludeInactiveQuery,
    LimitQuery, LoginHistoryDto, MessageResponse, UserDto,
};
use crate::services::NewUser;

const MIN_PASSWORD_LEN: usize = 8;
const DEFAULT_HISTORY_LIMIT: u64 = 50;
const MAX_HISTORY_LIMIT: u64 = 500;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub role: String,
    pub email: Option<String>,
    pub full_name: Option<String>,
}

#[derive(Deserialize)]
pub struct SetPasswordRequest {
    pub password: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignRouterRequest {
    #[serde(default, alias = "router_id")]
    pub router_id: String,
    pub notes: Option<String>,
}

#[derive(Serialize)]
pub struct RevokedSessions {
    pub revoked: u64,
}

fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(body)| body)
        .map_err(|e| ApiError::validation(e.body_text()))
}

fn check_password_length(password: &str) -> Result<(), ApiError> {
    if password.len() < MIN_PASSWORD_LEN {
        return Err(ApiError::validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

async fn ensure_user_exists(state: &AppState, user_id: i32) -> Result<(), ApiError> {
    state
        .credentials()
        .get_user_by_id(user_id)
        .await?
        .map(|_| ())
        .ok_or_else(|| ApiError::not_found("User", user_id))
}

/// GET /users
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    RequireAdmin(_): RequireAdmin,
    Query(query): Query<IncludeInactiveQuery>,
) -> Result<Json<ApiResponse<Vec<UserDto>>>, ApiError> {
    let users = state
        .credentials()
        .list_users(query.include_inactive)
        .await?;

    Ok(Json(ApiResponse::success(
        users.into_iter().map(UserDto::from).collect(),
    )))
}

/// POST /users
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    RequireAdmin(admin): RequireAdmin,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let payload = json_body(payload)?;

    if payload.username.is_empty() || payload.password.is_empty() || payload.role.is_empty() {
        return Err(ApiError::validation(
            "Username, password and role are required",
        ));
    }
    check_password_length(&payload.password)?;

    let user = state
        .credentials()
        .create_user(
            NewUser {
                username: payload.username,
                password: payload.password,
                role: payload.role,
                email: payload.email,
                full_name: payload.full_name,
            },
            admin.account_id(),
        )
        .await?;

    Ok(Json(ApiResponse::success(user.into())))
}

/// GET /users/{id}
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    RequireAdmin(_): RequireAdmin,
    Path(user_id): Path<i32>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let user = state
        .credentials()
        .get_user_by_id(user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User", user_id))?;

    Ok(Json(ApiResponse::success(user.into())))
}

/// POST /users/{id}/deactivate
///
/// Sessions issued before deactivation stay valid until they expire or are
/// revoked through `DELETE /users/{id}/sessions`.
pub async fn deactivate_user(
    State(state): State<Arc<AppState>>,
    RequireAdmin(_): RequireAdmin,
    Path(user_id): Path<i32>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let user = state.credentials().deactivate_user(user_id).await?;
    Ok(Json(ApiResponse::success(user.into())))
}

/// POST /users/{id}/reactivate
pub async fn reactivate_user(
    State(state): State<Arc<AppState>>,
    RequireAdmin(_): RequireAdmin,
    Path(user_id): Path<i32>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let user = state.credentials().reactivate_user(user_id).await?;
    Ok(Json(ApiResponse::success(user.into())))
}

/// PUT /users/{id}/password
pub async fn set_password(
    State(state): State<Arc<AppState>>,
    RequireAdmin(_): RequireAdmin,
    Path(user_id): Path<i32>,
    payload: Result<Json<SetPasswordRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let payload = json_body(payload)?;
    check_password_length(&payload.password)?;

    state
        .credentials()
        .change_password(user_id, &payload.password)
        .await?;

    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Password updated",
    ))))
}

/// DELETE /users/{id}/sessions
pub async fn revoke_sessions(
    State(state): State<Arc<AppState>>,
    RequireAdmin(_): RequireAdmin,
    Path(user_id): Path<i32>,
) -> Result<Json<ApiResponse<RevokedSessions>>, ApiError> {
    ensure_user_exists(&state, user_id).await?;
    let revoked = state.sessions().revoke_all_for_user(user_id).await?;
    Ok(Json(ApiResponse::success(RevokedSessions { revoked })))
}

/// GET /users/{id}/login-history
pub async fn login_history(
    State(state): State<Arc<AppState>>,
    RequireAdmin(_): RequireAdmin,
    Path(user_id): Path<i32>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<ApiResponse<Vec<LoginHistoryDto>>>, ApiError> {
    ensure_user_exists(&state, user_id).await?;

    let limit = query
        .limit
        .unwrap_or(DEFAULT_HISTORY_LIMIT)
        .clamp(1, MAX_HISTORY_LIMIT);
    let entries = state.audit().recent_for_user(user_id, limit).await?;

    Ok(Json(ApiResponse::success(
        entries.into_iter().map(LoginHistoryDto::from).collect(),
    )))
}

/// GET /users/{id}/routers
pub async fn list_assigned_routers(
    State(state): State<Arc<AppState>>,
    RequireAdmin(_): RequireAdmin,
    Path(user_id): Path<i32>,
) -> Result<Json<ApiResponse<Vec<AssignedRouterDto>>>, ApiError> {
    ensure_user_exists(&state, user_id).await?;
    let rows = state.assignments().list_for_user(user_id).await?;

    Ok(Json(ApiResponse::success(
        rows.into_iter().map(AssignedRouterDto::from).collect(),
    )))
}

/// POST /users/{id}/routers
pub async fn assign_router(
    State(state): State<Arc<AppState>>,
    RequireAdmin(admin): RequireAdmin,
    Path(user_id): Path<i32>,
    payload: Result<Json<AssignRouterRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<AssignmentDto>>, ApiError> {
    let payload = json_body(payload)?;

    let assignment = state
        .assignments()
        .assign(
            user_id,
            payload.router_id.trim(),
            admin.account_id(),
            payload.notes,
        )
        .await?;

    Ok(Json(ApiResponse::success(assignment.into())))
}

/// DELETE /users/{id}/routers/{router_id}
pub async fn unassign_router(
    State(state): State<Arc<AppState>>,
    RequireAdmin(_): RequireAdmin,
    Path((user_id, router_id)): Path<(i32, String)>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state.assignments().unassign(user_id, &router_id).await?;

    Ok(Json(ApiResponse::success(MessageResponse::new(format!(
        "Router {router_id} unassigned"
    )))))
}
