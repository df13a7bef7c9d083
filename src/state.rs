use std::sync::Arc;

use tracing::{info, warn};

use crate::config::Config;
use crate::db::Store;
use crate::services::{
    AccessGate, AuditLog, CredentialStore, NewUser, PasswordPolicy, RouterAssignmentRegistry,
    SeaOrmAssignmentRegistry, SeaOrmCredentialStore, SessionManager,
};

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<Config>,

    pub store: Store,

    pub credentials: Arc<dyn CredentialStore>,

    pub sessions: SessionManager,

    pub audit: AuditLog,

    pub assignments: Arc<dyn RouterAssignmentRegistry>,

    pub gate: AccessGate,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_url,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        Ok(Self::with_store(config, store))
    }

    /// Wires every service over an already-open store.
    #[must_use]
    pub fn with_store(config: Config, store: Store) -> Self {
        let audit = AuditLog::new(store.clone());

        let credentials: Arc<dyn CredentialStore> = Arc::new(SeaOrmCredentialStore::new(
            store.clone(),
            audit.clone(),
            PasswordPolicy::from(&config.security),
        ));

        let sessions = SessionManager::new(store.clone(), config.sessions.lifetime());

        let assignments: Arc<dyn RouterAssignmentRegistry> =
            Arc::new(SeaOrmAssignmentRegistry::new(store.clone()));

        let gate = AccessGate::new(
            sessions.clone(),
            assignments.clone(),
            config.security.auth_mode,
            &config.security.bypass_username,
        );

        Self {
            config: Arc::new(config),
            store,
            credentials,
            sessions,
            audit,
            assignments,
            gate,
        }
    }

    /// Creates the configured admin when no accounts exist yet.
    pub async fn bootstrap_admin(&self) -> anyhow::Result<()> {
        if self.store.count_users().await? > 0 {
            return Ok(());
        }

        let bootstrap = &self.config.bootstrap;
        let (Some(username), Some(password)) =
            (&bootstrap.admin_username, &bootstrap.admin_password)
        else {
            warn!(
                "No user accounts exist. Create one with `fleetgate create-user <name> --role admin`"
            );
            return Ok(());
        };

        let user = self
            .credentials
            .create_user(
                NewUser {
                    username: username.clone(),
                    password: password.clone(),
                    role: "admin".to_string(),
                    email: None,
                    full_name: None,
                },
                None,
            )
            .await?;

        info!(user_id = user.id, username = %user.username, "Bootstrap admin created");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::memory_store;

    fn config_with_bootstrap() -> Config {
        let mut config = Config::default();
        config.security.argon2_memory_cost_kib = 1024;
        config.security.argon2_time_cost = 1;
        config.bootstrap.admin_username = Some("root".to_string());
        config.bootstrap.admin_password = Some("correct-horse-battery".to_string());
        config
    }

    #[tokio::test]
    async fn bootstrap_creates_admin_once() {
        let state = SharedState::with_store(config_with_bootstrap(), memory_store().await);

        state.bootstrap_admin().await.unwrap();
        state.bootstrap_admin().await.unwrap();

        let users = state.credentials.list_users(true).await.unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].username, "root");
        assert!(users[0].role == crate::domain::Role::Admin);
    }

    #[tokio::test]
    async fn bootstrap_without_credentials_creates_nothing() {
        let state = SharedState::with_store(Config::default(), memory_store().await);

        state.bootstrap_admin().await.unwrap();

        assert_eq!(state.store.count_users().await.unwrap(), 0);
    }
}
