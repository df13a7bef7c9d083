use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

use super::extract::{ClientMeta, RequireAuth, bearer_token};
use super::{ApiError, ApiResponse, AppState, MessageResponse, PrincipalDto, SessionUserDto};

const MIN_PASSWORD_LEN: usize = 8;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub session_token: String,
    pub expires_at: DateTime<Utc>,
    pub user: SessionUserDto,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogoutRequest {
    pub session_token: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /session/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    ClientMeta(client): ClientMeta,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(payload) = payload.map_err(|e| ApiError::validation(e.body_text()))?;

    if payload.username.is_empty() || payload.password.is_empty() {
        return Err(ApiError::validation("Username and password are required"));
    }

    let user = state
        .credentials()
        .authenticate_user(&payload.username, &payload.password, &client)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid username or password".to_string()))?;

    let issued = state.sessions().issue(&user).await?;

    info!(
        event = "login",
        user_id = user.id,
        username = %user.username,
        "User logged in"
    );

    Ok(Json(LoginResponse {
        session_token: issued.token,
        expires_at: issued.expires_at,
        user: user.into(),
    }))
}

/// POST /session/logout
///
/// Always succeeds. The token comes from the body, or the bearer header when
/// the body has none.
pub async fn logout(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    payload: Result<Json<LogoutRequest>, JsonRejection>,
) -> Json<serde_json::Value> {
    let token = payload
        .ok()
        .and_then(|Json(body)| body.session_token)
        .filter(|t| !t.is_empty())
        .or_else(|| bearer_token(&headers).map(str::to_string));

    if let Some(token) = token
        && let Err(e) = state.sessions().revoke(&token).await
    {
        warn!(error = %e, "Logout could not delete the session");
    }

    Json(json!({ "success": true }))
}

/// GET /session/verify
pub async fn verify(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let session = match bearer_token(&headers) {
        Some(token) => state.sessions().verify(token).await?,
        None => None,
    };

    let response = match session {
        Some(session) => (
            StatusCode::OK,
            Json(json!({ "valid": true, "expiresAt": session.expires_at })),
        ),
        None => (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "valid": false, "error": "Invalid or expired session" })),
        ),
    };

    Ok(response.into_response())
}

/// GET /session/me
pub async fn me(RequireAuth(principal): RequireAuth) -> Json<ApiResponse<PrincipalDto>> {
    Json(ApiResponse::success(principal.into()))
}

/// PUT /session/password
pub async fn change_password(
    State(state): State<Arc<AppState>>,
    RequireAuth(principal): RequireAuth,
    payload: Result<Json<ChangePasswordRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let Json(payload) = payload.map_err(|e| ApiError::validation(e.body_text()))?;

    if payload.new_password.len() < MIN_PASSWORD_LEN {
        return Err(ApiError::validation(format!(
            "New password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    if payload.current_password == payload.new_password {
        return Err(ApiError::validation(
            "New password must be different from current password",
        ));
    }

    let credentials = state.credentials();
    if !credentials
        .verify_password(principal.id, &payload.current_password)
        .await?
    {
        return Err(ApiError::validation("Current password is incorrect"));
    }

    credentials
        .change_password(principal.id, &payload.new_password)
        .await?;

    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Password changed successfully",
    ))))
}
