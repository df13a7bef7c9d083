use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

use super::extract::{RequireAdmin, RequireAuth, RouterScoped};
use super::{ApiError, ApiResponse, AppState, PrincipalDto, RouterDto};
use crate::db::RouterRegistration;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRouterRequest {
    #[serde(default)]
    pub name: String,
    pub location: Option<String>,
    pub serial_number: Option<String>,
}

/// Result of a scoped lookup: who was let in, for which router, and the
/// router record if one is registered.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouterAccessDto {
    pub router_id: Option<String>,
    pub principal: PrincipalDto,
    pub router: Option<RouterDto>,
}

async fn access_view(state: &AppState, scoped: RouterScoped) -> Result<RouterAccessDto, ApiError> {
    let router = match scoped.router_id.as_deref() {
        Some(router_id) => state.assignments().get_router(router_id).await?,
        None => None,
    };

    Ok(RouterAccessDto {
        router_id: scoped.router_id,
        principal: scoped.principal.into(),
        router: router.map(RouterDto::from),
    })
}

/// GET /routers
///
/// Admins see every router; guests see the routers assigned to them.
pub async fn list_routers(
    State(state): State<Arc<AppState>>,
    RequireAuth(principal): RequireAuth,
) -> Result<Json<ApiResponse<Vec<RouterDto>>>, ApiError> {
    let routers = state.assignments().list_routers().await?;

    let visible: Vec<RouterDto> = if principal.is_admin() {
        routers.into_iter().map(RouterDto::from).collect()
    } else {
        let assigned: HashSet<String> = state
            .assignments()
            .list_for_user(principal.id)
            .await?
            .into_iter()
            .map(|a| a.router_id)
            .collect();

        routers
            .into_iter()
            .filter(|r| assigned.contains(&r.id))
            .map(RouterDto::from)
            .collect()
    };

    Ok(Json(ApiResponse::success(visible)))
}

/// GET /routers/{router_id}
pub async fn get_router(
    State(state): State<Arc<AppState>>,
    scoped: RouterScoped,
) -> Result<Json<ApiResponse<RouterDto>>, ApiError> {
    let router_id = scoped
        .router_id
        .ok_or_else(|| ApiError::validation("Router ID is required"))?;

    let router = state
        .assignments()
        .get_router(&router_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Router", &router_id))?;

    Ok(Json(ApiResponse::success(router.into())))
}

/// GET /routers/status?router_id=
pub async fn router_status(
    State(state): State<Arc<AppState>>,
    scoped: RouterScoped,
) -> Result<Json<ApiResponse<RouterAccessDto>>, ApiError> {
    Ok(Json(ApiResponse::success(access_view(&state, scoped).await?)))
}

/// POST /routers/lookup with `{"routerId": ...}` or `{"router_id": ...}`
pub async fn lookup_router(
    State(state): State<Arc<AppState>>,
    scoped: RouterScoped,
) -> Result<Json<ApiResponse<RouterAccessDto>>, ApiError> {
    Ok(Json(ApiResponse::success(access_view(&state, scoped).await?)))
}

/// PUT /routers/{router_id}
pub async fn register_router(
    State(state): State<Arc<AppState>>,
    RequireAdmin(_): RequireAdmin,
    Path(router_id): Path<String>,
    payload: Result<Json<RegisterRouterRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<RouterDto>>, ApiError> {
    let Json(payload) = payload.map_err(|e| ApiError::validation(e.body_text()))?;

    let router = state
        .assignments()
        .register_router(
            &router_id,
            RouterRegistration {
                name: payload.name,
                location: payload.location,
                serial_number: payload.serial_number,
            },
        )
        .await?;

    Ok(Json(ApiResponse::success(router.into())))
}
