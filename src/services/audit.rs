//! Append-only login audit.
//!
//! Writes are best-effort: a failed insert is logged and dropped so it can
//! never fail the login it describes.

use tracing::warn;

use crate::db::{LoginHistoryEntry, Store};
use crate::domain::ClientInfo;
use crate::services::error::AuthError;

/// One authentication attempt as seen by the credential store.
#[derive(Debug, Clone, Copy)]
pub struct LoginAttempt<'a> {
    pub user_id: Option<i32>,
    pub username: &'a str,
    pub client: &'a ClientInfo,
    pub success: bool,
}

#[derive(Clone)]
pub struct AuditLog {
    store: Store,
}

impl AuditLog {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    /// Record an attempt. Never returns an error.
    pub async fn record(&self, attempt: LoginAttempt<'_>) {
        let outcome = if attempt.success { "success" } else { "failure" };
        metrics::counter!("fleetgate_login_attempts_total", "outcome" => outcome).increment(1);

        if let Err(e) = self
            .store
            .add_login_history(
                attempt.user_id,
                attempt.username,
                attempt.client.ip_address.as_deref(),
                attempt.client.user_agent.as_deref(),
                attempt.success,
            )
            .await
        {
            warn!(
                event = "audit_write_failed",
                username = attempt.username,
                success = attempt.success,
                error = %e,
                "Failed to record login attempt"
            );
        }
    }

    /// Most recent attempts for one account, newest first.
    pub async fn recent_for_user(
        &self,
        user_id: i32,
        limit: u64,
    ) -> Result<Vec<LoginHistoryEntry>, AuthError> {
        Ok(self.store.recent_login_history(user_id, limit).await?)
    }
}
