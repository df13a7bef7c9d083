//! The single authorization decision point for protected routes.
//!
//! Each check verifies the session and returns the caller's [`Principal`].
//! In bypass mode every check succeeds with a fixed admin principal.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::AuthMode;
use crate::domain::{Principal, Role};
use crate::services::assignment_registry::RouterAssignmentRegistry;
use crate::services::error::AuthError;
use crate::services::session_manager::SessionManager;

#[derive(Clone)]
pub struct AccessGate {
    sessions: SessionManager,
    assignments: Arc<dyn RouterAssignmentRegistry>,
    mode: AuthMode,
    fallback: Principal,
}

impl AccessGate {
    #[must_use]
    pub fn new(
        sessions: SessionManager,
        assignments: Arc<dyn RouterAssignmentRegistry>,
        mode: AuthMode,
        bypass_username: &str,
    ) -> Self {
        if mode.is_bypass() {
            warn!(
                principal = bypass_username,
                "Authentication is BYPASSED: every protected route is open as admin"
            );
        }

        Self {
            sessions,
            assignments,
            mode,
            fallback: Principal {
                id: 0,
                username: bypass_username.to_string(),
                role: Role::Admin,
            },
        }
    }

    #[must_use]
    pub const fn mode(&self) -> AuthMode {
        self.mode
    }

    /// Any valid session.
    pub async fn require_auth(&self, token: Option<&str>) -> Result<Principal, AuthError> {
        if self.mode.is_bypass() {
            return Ok(self.fallback.clone());
        }

        let Some(token) = token.filter(|t| !t.is_empty()) else {
            return Err(deny_unauthenticated("Missing session token"));
        };

        match self.sessions.verify(token).await? {
            Some(session) => Ok(session.principal),
            None => Err(deny_unauthenticated("Invalid or expired session")),
        }
    }

    /// A valid session whose role is admin.
    pub async fn require_admin(&self, token: Option<&str>) -> Result<Principal, AuthError> {
        let principal = self.require_auth(token).await?;
        if principal.is_admin() {
            Ok(principal)
        } else {
            Err(deny_forbidden(&principal, "Admin access required"))
        }
    }

    /// A valid session with access to `router_id`. Admins skip the
    /// assignment lookup; guests must name a router they are assigned to.
    pub async fn require_router_access(
        &self,
        token: Option<&str>,
        router_id: Option<&str>,
    ) -> Result<Principal, AuthError> {
        let principal = self.require_auth(token).await?;
        if principal.is_admin() {
            return Ok(principal);
        }

        let Some(router_id) = router_id.map(str::trim).filter(|id| !id.is_empty()) else {
            return Err(AuthError::validation("Router ID is required"));
        };

        if self.assignments.has_access(principal.id, router_id).await? {
            debug!(user_id = principal.id, router_id, "Router access granted");
            Ok(principal)
        } else {
            Err(deny_forbidden(
                &principal,
                &format!("No access to router {router_id}"),
            ))
        }
    }
}

fn deny_unauthenticated(reason: &str) -> AuthError {
    metrics::counter!("fleetgate_access_denied_total", "status" => "401").increment(1);
    AuthError::unauthenticated(reason)
}

fn deny_forbidden(principal: &Principal, reason: &str) -> AuthError {
    metrics::counter!("fleetgate_access_denied_total", "status" => "403").increment(1);
    debug!(user_id = principal.id, username = %principal.username, reason, "Access denied");
    AuthError::forbidden(reason)
}
