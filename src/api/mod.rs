use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::{get, post, put},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::services::{
    AccessGate, AuditLog, CredentialStore, RouterAssignmentRegistry, SessionManager,
};
use crate::state::SharedState;

mod error;
pub mod extract;
mod observability;
mod routers;
mod session;
mod types;
mod users;

pub use error::ApiError;
pub use types::*;

use metrics_exporter_prometheus::PrometheusHandle;

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,

    pub start_time: std::time::Instant,

    pub prometheus_handle: Option<PrometheusHandle>,
}

impl AppState {
    #[must_use]
    pub fn new(shared: Arc<SharedState>, prometheus_handle: Option<PrometheusHandle>) -> Arc<Self> {
        Arc::new(Self {
            shared,
            start_time: std::time::Instant::now(),
            prometheus_handle,
        })
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.shared.config
    }

    #[must_use]
    pub fn store(&self) -> &crate::db::Store {
        &self.shared.store
    }

    #[must_use]
    pub fn credentials(&self) -> &Arc<dyn CredentialStore> {
        &self.shared.credentials
    }

    #[must_use]
    pub fn sessions(&self) -> &SessionManager {
        &self.shared.sessions
    }

    #[must_use]
    pub fn audit(&self) -> &AuditLog {
        &self.shared.audit
    }

    #[must_use]
    pub fn assignments(&self) -> &Arc<dyn RouterAssignmentRegistry> {
        &self.shared.assignments
    }

    #[must_use]
    pub fn gate(&self) -> &AccessGate {
        &self.shared.gate
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors_origins = state.config().server.cors_allowed_origins.clone();

    let cors_layer = if cors_origins.iter().any(|o| o == "*") {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .merge(session_routes())
        .merge(user_routes())
        .merge(router_routes())
        .route("/metrics", get(observability::get_metrics))
        .route("/health", get(observability::health))
        .with_state(state)
        .layer(middleware::from_fn(observability::logging_middleware))
        .layer(middleware::from_fn(observability::security_headers_middleware))
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
}

fn session_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/session/login", post(session::login))
        .route("/session/logout", post(session::logout))
        .route("/session/verify", get(session::verify))
        .route("/session/me", get(session::me))
        .route("/session/password", put(session::change_password))
}

fn user_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/users", get(users::list_users).post(users::create_user))
        .route("/users/{id}", get(users::get_user))
        .route("/users/{id}/deactivate", post(users::deactivate_user))
        .route("/users/{id}/reactivate", post(users::reactivate_user))
        .route("/users/{id}/password", put(users::set_password))
        .route(
            "/users/{id}/sessions",
            axum::routing::delete(users::revoke_sessions),
        )
        .route("/users/{id}/login-history", get(users::login_history))
        .route(
            "/users/{id}/routers",
            get(users::list_assigned_routers).post(users::assign_router),
        )
        .route(
            "/users/{id}/routers/{router_id}",
            axum::routing::delete(users::unassign_router),
        )
}

fn router_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/routers", get(routers::list_routers))
        .route("/routers/status", get(routers::router_status))
        .route("/routers/lookup", post(routers::lookup_router))
        .route(
            "/routers/{router_id}",
            get(routers::get_router).put(routers::register_router),
        )
}
