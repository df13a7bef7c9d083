//! Opaque bearer sessions backed by the `user_sessions` table.
//!
//! Only the SHA-256 of a token is stored. Verification, logout and the
//! periodic sweep can all delete the same row; each treats a missing row as
//! success.

use std::future::Future;

use chrono::{DateTime, TimeDelta, Utc};
use tracing::{debug, info, warn};

use crate::db::{Store, StoreError, StoreResult, User};
use crate::domain::Principal;
use crate::entities::user_sessions;
use crate::services::error::AuthError;
use crate::services::token::{generate_session_token, hash_session_token};

/// Returned once at login; the raw token is not recoverable afterwards.
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// A live session resolved from a presented token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedSession {
    pub principal: Principal,
    pub expires_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct SessionManager {
    store: Store,
    lifetime: TimeDelta,
}

impl SessionManager {
    #[must_use]
    pub const fn new(store: Store, lifetime: TimeDelta) -> Self {
        Self { store, lifetime }
    }

    #[must_use]
    pub const fn lifetime(&self) -> TimeDelta {
        self.lifetime
    }

    /// Creates a session for `user`, snapshotting its username and role.
    pub async fn issue(&self, user: &User) -> Result<IssuedSession, AuthError> {
        let token = generate_session_token();
        let now = Utc::now();
        let expires_at = now + self.lifetime;

        let row = user_sessions::Model {
            session_token_hash: hash_session_token(&token),
            user_id: user.id,
            username: user.username.clone(),
            role: user.role,
            created_at: now,
            last_seen_at: now,
            expires_at,
        };

        let written = self
            .with_schema_retry("issue", || self.store.insert_session(row.clone()))
            .await?;

        if written == 0 {
            // A 256-bit collision; the existing row is left untouched.
            warn!(user_id = user.id, "Session token hash collided with an existing row");
        }

        metrics::counter!("fleetgate_sessions_issued_total").increment(1);
        debug!(user_id = user.id, %expires_at, "Session issued");

        Ok(IssuedSession { token, expires_at })
    }

    /// Resolves a token to its session. Expired rows are deleted on sight.
    ///
    /// A valid lookup schedules a detached `last_seen_at` update. It is never
    /// awaited or retried, and its errors are only logged.
    pub async fn verify(&self, token: &str) -> Result<Option<VerifiedSession>, AuthError> {
        let token_hash = hash_session_token(token);
        let hash = token_hash.as_str();

        let Some(row) = self
            .with_schema_retry("verify", move || self.store.find_session(hash))
            .await?
        else {
            return Ok(None);
        };

        let now = Utc::now();
        if row.expires_at <= now {
            self.with_schema_retry("expire", move || self.store.delete_session(hash))
                .await?;
            debug!(user_id = row.user_id, "Expired session removed during verification");
            return Ok(None);
        }

        self.spawn_touch(token_hash, now);

        Ok(Some(VerifiedSession {
            principal: Principal {
                id: row.user_id,
                username: row.username,
                role: row.role,
            },
            expires_at: row.expires_at,
        }))
    }

    /// Deletes the session for `token`. Unknown tokens are not an error.
    pub async fn revoke(&self, token: &str) -> Result<(), AuthError> {
        let token_hash = hash_session_token(token);
        let hash = token_hash.as_str();

        let removed = self
            .with_schema_retry("revoke", move || self.store.delete_session(hash))
            .await?;

        debug!(removed, "Session revoked");
        Ok(())
    }

    /// Deletes every session belonging to a user. Returns how many went.
    pub async fn revoke_all_for_user(&self, user_id: i32) -> Result<u64, AuthError> {
        let removed = self
            .with_schema_retry("revoke_all", || {
                self.store.delete_sessions_for_user(user_id)
            })
            .await?;

        if removed > 0 {
            info!(user_id, removed, "Revoked all sessions for user");
        }
        Ok(removed)
    }

    /// Deletes every row with `expires_at < now`.
    pub async fn sweep_expired(&self) -> Result<u64, AuthError> {
        let now = Utc::now();
        let removed = self
            .with_schema_retry("sweep", || self.store.delete_expired_sessions(now))
            .await?;

        metrics::counter!("fleetgate_sessions_swept_total").increment(removed);
        Ok(removed)
    }

    fn spawn_touch(&self, token_hash: String, at: DateTime<Utc>) {
        let store = self.store.clone();
        tokio::spawn(async move {
            if let Err(e) = store.touch_session(&token_hash, at).await {
                debug!(error = %e, "Failed to update session last_seen_at");
            }
        });
    }

    /// Runs `op`; if the session table is missing, creates it and runs `op`
    /// exactly once more. Every other error is returned unchanged.
    async fn with_schema_retry<T, F, Fut>(&self, operation: &'static str, op: F) -> Result<T, AuthError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = StoreResult<T>>,
    {
        match op().await {
            Err(StoreError::SchemaMissing(detail)) => {
                warn!(
                    operation,
                    detail = %detail,
                    "Session table missing; creating it and retrying once"
                );
                self.store.create_session_schema().await?;
                Ok(op().await?)
            }
            other => Ok(other?),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Role;
    use crate::test_support::{guest_row, memory_store};
    use sea_orm::{ConnectionTrait, EntityTrait, PaginatorTrait};

    async fn manager_with_user(lifetime: TimeDelta) -> (SessionManager, User) {
        let store = memory_store().await;
        let user = store.insert_user(guest_row("alice")).await.unwrap();
        (SessionManager::new(store, lifetime), user)
    }

    async fn session_count(manager: &SessionManager) -> u64 {
        user_sessions::Entity::find()
            .count(&manager.store.conn)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn issued_token_verifies_with_snapshot_principal() {
        let (manager, user) = manager_with_user(TimeDelta::hours(168)).await;

        let issued = manager.issue(&user).await.unwrap();
        assert_eq!(issued.token.len(), 64);

        let verified = manager.verify(&issued.token).await.unwrap().unwrap();
        assert_eq!(verified.principal.id, user.id);
        assert_eq!(verified.principal.username, "alice");
        assert_eq!(verified.principal.role, Role::Guest);
        assert_eq!(verified.expires_at, issued.expires_at);
    }

    #[tokio::test]
    async fn raw_token_is_never_stored() {
        let (manager, user) = manager_with_user(TimeDelta::hours(1)).await;
        let issued = manager.issue(&user).await.unwrap();

        let rows = user_sessions::Entity::find()
            .all(&manager.store.conn)
            .await
            .unwrap();

        assert_eq!(rows.len(), 1);
        assert_ne!(rows[0].session_token_hash, issued.token);
        assert_eq!(rows[0].session_token_hash, hash_session_token(&issued.token));
    }

    #[tokio::test]
    async fn verify_bumps_last_seen_in_the_background() {
        let (manager, user) = manager_with_user(TimeDelta::hours(1)).await;
        let issued = manager.issue(&user).await.unwrap();
        let hash = hash_session_token(&issued.token);

        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        assert!(manager.verify(&issued.token).await.unwrap().is_some());

        let mut row = manager.store.find_session(&hash).await.unwrap().unwrap();
        for _ in 0..50 {
            if row.last_seen_at > row.created_at {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
            row = manager.store.find_session(&hash).await.unwrap().unwrap();
        }

        assert!(row.last_seen_at > row.created_at);
    }

    #[tokio::test]
    async fn unknown_token_is_invalid() {
        let (manager, _) = manager_with_user(TimeDelta::hours(1)).await;
        assert!(manager.verify("not-a-real-token").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn expired_session_is_deleted_on_verify() {
        let (manager, user) = manager_with_user(TimeDelta::seconds(-1)).await;
        let issued = manager.issue(&user).await.unwrap();
        assert_eq!(session_count(&manager).await, 1);

        assert!(manager.verify(&issued.token).await.unwrap().is_none());
        assert_eq!(session_count(&manager).await, 0);

        // Second lookup finds nothing and is still just "invalid".
        assert!(manager.verify(&issued.token).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn revoke_is_idempotent() {
        let (manager, user) = manager_with_user(TimeDelta::hours(1)).await;
        let issued = manager.issue(&user).await.unwrap();

        manager.revoke(&issued.token).await.unwrap();
        manager.revoke(&issued.token).await.unwrap();
        manager.revoke("never-issued").await.unwrap();

        assert!(manager.verify(&issued.token).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn sweep_removes_only_expired_rows() {
        let store = memory_store().await;
        let user = store.insert_user(guest_row("alice")).await.unwrap();
        let short = SessionManager::new(store.clone(), TimeDelta::seconds(-60));
        let long = SessionManager::new(store, TimeDelta::hours(1));

        short.issue(&user).await.unwrap();
        short.issue(&user).await.unwrap();
        let live = long.issue(&user).await.unwrap();

        assert_eq!(long.sweep_expired().await.unwrap(), 2);
        assert_eq!(long.sweep_expired().await.unwrap(), 0);
        assert!(long.verify(&live.token).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn revoke_all_for_user_clears_every_session() {
        let (manager, user) = manager_with_user(TimeDelta::hours(1)).await;
        let first = manager.issue(&user).await.unwrap();
        let second = manager.issue(&user).await.unwrap();

        assert_eq!(manager.revoke_all_for_user(user.id).await.unwrap(), 2);
        assert!(manager.verify(&first.token).await.unwrap().is_none());
        assert!(manager.verify(&second.token).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn missing_session_table_is_recreated_once() {
        let (manager, user) = manager_with_user(TimeDelta::hours(1)).await;
        manager
            .store
            .conn
            .execute_unprepared("DROP TABLE user_sessions")
            .await
            .unwrap();

        let issued = manager.issue(&user).await.unwrap();
        assert!(manager.verify(&issued.token).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn verify_self_heals_when_table_is_missing() {
        let (manager, _) = manager_with_user(TimeDelta::hours(1)).await;
        manager
            .store
            .conn
            .execute_unprepared("DROP TABLE user_sessions")
            .await
            .unwrap();

        assert!(manager.verify("anything").await.unwrap().is_none());
        assert_eq!(session_count(&manager).await, 0);
    }

    #[tokio::test]
    async fn other_storage_errors_are_not_retried() {
        let store = memory_store().await;
        let user = store.insert_user(guest_row("alice")).await.unwrap();
        let manager = SessionManager::new(store.clone(), TimeDelta::hours(1));
        store.conn.clone().close().await.unwrap();

        let err = manager.issue(&user).await.unwrap_err();
        assert!(matches!(err, AuthError::Infrastructure(_)));
    }
}
