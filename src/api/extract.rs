//! Request extractors that run the access gate and hand handlers an
//! immutable [`Principal`].

use std::collections::HashMap;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{ConnectInfo, FromRequest, FromRequestParts, Path, Query, Request},
    http::{HeaderMap, Uri, header, request::Parts},
};

use super::{ApiError, AppState};
use crate::domain::{ClientInfo, Principal};

const MAX_SCOPED_BODY_BYTES: usize = 64 * 1024;

/// Token from `Authorization: Bearer <token>`.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value
        .strip_prefix("Bearer ")
        .or_else(|| value.strip_prefix("bearer "))?
        .trim();

    (!token.is_empty()).then_some(token)
}

fn record_principal(principal: &Principal) {
    tracing::Span::current().record("user_id", principal.id);
}

/// Any authenticated caller.
pub struct RequireAuth(pub Principal);

impl FromRequestParts<Arc<AppState>> for RequireAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let principal = state
            .gate()
            .require_auth(bearer_token(&parts.headers))
            .await?;
        record_principal(&principal);
        Ok(Self(principal))
    }
}

/// An authenticated admin.
pub struct RequireAdmin(pub Principal);

impl FromRequestParts<Arc<AppState>> for RequireAdmin {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let principal = state
            .gate()
            .require_admin(bearer_token(&parts.headers))
            .await?;
        record_principal(&principal);
        Ok(Self(principal))
    }
}

/// A caller entitled to the router named by the request.
///
/// The router id is taken from the `router_id` path parameter, then a
/// `routerId`/`router_id` field of a JSON body, then the `router_id` query
/// parameter, trimmed. The consumed body is kept in `body` for the handler.
pub struct RouterScoped {
    pub principal: Principal,
    pub router_id: Option<String>,
    pub body: Bytes,
}

impl FromRequest<Arc<AppState>> for RouterScoped {
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &Arc<AppState>) -> Result<Self, Self::Rejection> {
        let (mut parts, body) = req.into_parts();

        let from_path = Path::<HashMap<String, String>>::from_request_parts(&mut parts, state)
            .await
            .ok()
            .and_then(|Path(params)| params.get("router_id").cloned());

        let body = match axum::body::to_bytes(body, MAX_SCOPED_BODY_BYTES).await {
            Ok(body) => body,
            Err(_) => {
                // Missing or bad sessions are reported as 401 ahead of body errors.
                state.gate().require_auth(bearer_token(&parts.headers)).await?;
                return Err(ApiError::validation(
                    "Request body is too large or unreadable",
                ));
            }
        };

        let router_id = from_path
            .or_else(|| router_id_from_body(&body))
            .or_else(|| router_id_from_query(&parts.uri))
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty());

        let principal = state
            .gate()
            .require_router_access(bearer_token(&parts.headers), router_id.as_deref())
            .await?;
        record_principal(&principal);

        Ok(Self {
            principal,
            router_id,
            body,
        })
    }
}

fn router_id_from_body(body: &[u8]) -> Option<String> {
    if body.is_empty() {
        return None;
    }

    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    ["routerId", "router_id"]
        .iter()
        .find_map(|key| match value.get(*key)? {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
}

fn router_id_from_query(uri: &Uri) -> Option<String> {
    let Query(params) = Query::<HashMap<String, String>>::try_from_uri(uri).ok()?;
    params.get("router_id").cloned()
}

/// Caller address and user agent for the login audit.
///
/// `X-Forwarded-For` (first hop) wins over `X-Real-IP`, which wins over the
/// socket peer address.
pub struct ClientMeta(pub ClientInfo);

impl<S: Send + Sync> FromRequestParts<S> for ClientMeta {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header_value = |name: &str| {
            parts
                .headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
        };

        let ip_address = header_value("x-forwarded-for")
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .or_else(|| header_value("x-real-ip"))
            .map(str::to_string)
            .or_else(|| {
                parts
                    .extensions
                    .get::<ConnectInfo<SocketAddr>>()
                    .map(|ConnectInfo(addr)| addr.ip().to_string())
            });

        let user_agent = header_value("user-agent").map(str::to_string);

        Ok(Self(ClientInfo {
            ip_address,
            user_agent,
        }))
    }
}
