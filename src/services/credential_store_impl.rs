//! `SeaORM` implementation of the `CredentialStore` trait.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::OnceCell;
use tracing::{info, warn};

use crate::db::{NewUserRow, Store, StoreError, User};
use crate::domain::{ClientInfo, Role};
use crate::services::audit::{AuditLog, LoginAttempt};
use crate::services::credential_store::{CredentialStore, NewUser};
use crate::services::error::AuthError;
use crate::services::password::{PasswordPolicy, verify_password};

pub struct SeaOrmCredentialStore {
    store: Store,
    audit: AuditLog,
    policy: PasswordPolicy,
    /// Hash of a fixed password under `policy`, verified against when the
    /// account is absent or inactive so every failed login pays the same cost.
    dummy_hash: OnceCell<String>,
}

const DUMMY_PASSWORD: &str = "fleetgate-unmatched-password";

impl SeaOrmCredentialStore {
    #[must_use]
    pub fn new(store: Store, audit: AuditLog, policy: PasswordPolicy) -> Self {
        Self {
            store,
            audit,
            policy,
            dummy_hash: OnceCell::new(),
        }
    }

    async fn verify_against_dummy(&self, password: &str) {
        let hash = match self
            .dummy_hash
            .get_or_try_init(|| self.policy.hash(DUMMY_PASSWORD))
            .await
        {
            Ok(hash) => hash,
            Err(e) => {
                warn!(error = %e, "Failed to prepare dummy password hash");
                return;
            }
        };

        if let Err(e) = verify_password(hash, password).await {
            warn!(error = %e, "Dummy password verification failed");
        }
    }

    async fn record(&self, user_id: Option<i32>, username: &str, client: &ClientInfo, success: bool) {
        self.audit
            .record(LoginAttempt {
                user_id,
                username,
                client,
                success,
            })
            .await;
    }

    async fn set_active(&self, user_id: i32, is_active: bool) -> Result<User, AuthError> {
        let user = self
            .store
            .set_user_active(user_id, is_active)
            .await?
            .ok_or_else(|| AuthError::not_found("User", user_id))?;

        info!(
            user_id,
            username = %user.username,
            is_active,
            "Account activation changed"
        );
        Ok(user)
    }
}

fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[async_trait]
impl CredentialStore for SeaOrmCredentialStore {
    async fn create_user(
        &self,
        new_user: NewUser,
        created_by: Option<i32>,
    ) -> Result<User, AuthError> {
        let role: Role = new_user.role.parse().map_err(AuthError::Validation)?;

        if new_user.username.trim().is_empty() {
            return Err(AuthError::validation("Username is required"));
        }
        if new_user.username.trim() != new_user.username {
            return Err(AuthError::validation(
                "Username cannot start or end with whitespace",
            ));
        }
        if new_user.password.is_empty() {
            return Err(AuthError::validation("Password is required"));
        }

        if self
            .store
            .get_user_by_username(&new_user.username)
            .await?
            .is_some()
        {
            return Err(AuthError::Conflict(format!(
                "Username '{}' already exists",
                new_user.username
            )));
        }

        let password_hash = self.policy.hash(&new_user.password).await?;

        let row = NewUserRow {
            username: new_user.username.clone(),
            password_hash,
            role,
            email: normalize_optional(new_user.email),
            full_name: normalize_optional(new_user.full_name),
            created_by,
        };

        let user = self.store.insert_user(row).await.map_err(|e| match e {
            StoreError::UniqueViolation(_) => AuthError::Conflict(format!(
                "Username '{}' already exists",
                new_user.username
            )),
            other => other.into(),
        })?;

        info!(
            user_id = user.id,
            username = %user.username,
            role = %user.role,
            created_by = ?created_by,
            "User created"
        );

        Ok(user)
    }

    async fn authenticate_user(
        &self,
        username: &str,
        password: &str,
        client: &ClientInfo,
    ) -> Result<Option<User>, AuthError> {
        let Some((user, password_hash)) = self.store.get_user_with_password(username).await? else {
            self.verify_against_dummy(password).await;
            self.record(None, username, client, false).await;
            return Ok(None);
        };

        if !user.is_active {
            self.verify_against_dummy(password).await;
            self.record(Some(user.id), username, client, false).await;
            return Ok(None);
        }

        let matches = match verify_password(&password_hash, password).await {
            Ok(matches) => matches,
            Err(e) => {
                warn!(user_id = user.id, error = %e, "Stored password hash is unusable");
                false
            }
        };

        if !matches {
            self.record(Some(user.id), username, client, false).await;
            return Ok(None);
        }

        let now = Utc::now();
        self.store.touch_user_last_login(user.id, now).await?;
        self.record(Some(user.id), username, client, true).await;

        Ok(Some(User {
            last_login: Some(now),
            ..user
        }))
    }

    async fn change_password(&self, user_id: i32, new_password: &str) -> Result<(), AuthError> {
        if new_password.is_empty() {
            return Err(AuthError::validation("Password is required"));
        }

        let password_hash = self.policy.hash(new_password).await?;

        if !self
            .store
            .update_user_password_hash(user_id, password_hash)
            .await?
        {
            return Err(AuthError::not_found("User", user_id));
        }

        info!(user_id, "Password changed");
        Ok(())
    }

    async fn verify_password(&self, user_id: i32, password: &str) -> Result<bool, AuthError> {
        let password_hash = self
            .store
            .get_user_password_hash(user_id)
            .await?
            .ok_or_else(|| AuthError::not_found("User", user_id))?;

        verify_password(&password_hash, password).await
    }

    async fn deactivate_user(&self, user_id: i32) -> Result<User, AuthError> {
        self.set_active(user_id, false).await
    }

    async fn reactivate_user(&self, user_id: i32) -> Result<User, AuthError> {
        self.set_active(user_id, true).await
    }

    async fn list_users(&self, include_inactive: bool) -> Result<Vec<User>, AuthError> {
        Ok(self.store.list_users(include_inactive).await?)
    }

    async fn get_user_by_id(&self, user_id: i32) -> Result<Option<User>, AuthError> {
        Ok(self.store.get_user_by_id(user_id).await?)
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, AuthError> {
        Ok(self.store.get_user_by_username(username).await?)
    }
}
