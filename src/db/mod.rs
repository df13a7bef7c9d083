use anyhow::Result;
use chrono::{DateTime, Utc};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::entities::user_sessions;

pub mod error;
pub mod migrator;
pub mod repositories;
pub mod schema;

pub use error::{StoreError, StoreResult};
pub use repositories::assignment::{AssignedRouter, Assignment};
pub use repositories::login_history::LoginHistoryEntry;
pub use repositories::router::{Router, RouterRegistration};
pub use repositories::user::{NewUserRow, User};

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        let in_memory = db_url.contains(":memory:");

        if !in_memory {
            let path_str = db_url.trim_start_matches("sqlite://").trim_start_matches("sqlite:");
            let path_str = path_str.split('?').next().unwrap_or(path_str);
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        if in_memory {
            // Every pooled connection to `:memory:` opens its own empty database.
            opt.max_connections(1).min_connections(1);
        } else {
            opt.max_connections(max_connections)
                .min_connections(min_connections)
                .idle_timeout(Duration::from_secs(300))
                .max_lifetime(Duration::from_secs(600));
        }
        opt.connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn session_repo(&self) -> repositories::session::SessionRepository {
        repositories::session::SessionRepository::new(self.conn.clone())
    }

    fn login_history_repo(&self) -> repositories::login_history::LoginHistoryRepository {
        repositories::login_history::LoginHistoryRepository::new(self.conn.clone())
    }

    fn router_repo(&self) -> repositories::router::RouterRepository {
        repositories::router::RouterRepository::new(self.conn.clone())
    }

    fn assignment_repo(&self) -> repositories::assignment::AssignmentRepository {
        repositories::assignment::AssignmentRepository::new(self.conn.clone())
    }

    // Users

    pub async fn insert_user(&self, row: NewUserRow) -> StoreResult<User> {
        self.user_repo().insert(row).await
    }

    pub async fn get_user_by_id(&self, id: i32) -> StoreResult<Option<User>> {
        self.user_repo().get_by_id(id).await
    }

    pub async fn get_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        self.user_repo().get_by_username(username).await
    }

    pub async fn get_user_with_password(
        &self,
        username: &str,
    ) -> StoreResult<Option<(User, String)>> {
        self.user_repo()
            .get_by_username_with_password(username)
            .await
    }

    pub async fn get_user_password_hash(&self, id: i32) -> StoreResult<Option<String>> {
        self.user_repo().get_password_hash(id).await
    }

    pub async fn list_users(&self, include_inactive: bool) -> StoreResult<Vec<User>> {
        self.user_repo().list(include_inactive).await
    }

    pub async fn count_users(&self) -> StoreResult<u64> {
        self.user_repo().count().await
    }

    pub async fn update_user_password_hash(&self, id: i32, hash: String) -> StoreResult<bool> {
        self.user_repo().update_password_hash(id, hash).await
    }

    pub async fn set_user_active(&self, id: i32, is_active: bool) -> StoreResult<Option<User>> {
        self.user_repo().set_active(id, is_active).await
    }

    pub async fn touch_user_last_login(&self, id: i32, at: DateTime<Utc>) -> StoreResult<()> {
        self.user_repo().touch_last_login(id, at).await
    }

    // Sessions

    pub async fn insert_session(&self, row: user_sessions::Model) -> StoreResult<u64> {
        self.session_repo().insert_ignore(row).await
    }

    pub async fn find_session(&self, token_hash: &str) -> StoreResult<Option<user_sessions::Model>> {
        self.session_repo().find(token_hash).await
    }

    pub async fn delete_session(&self, token_hash: &str) -> StoreResult<u64> {
        self.session_repo().delete(token_hash).await
    }

    pub async fn delete_sessions_for_user(&self, user_id: i32) -> StoreResult<u64> {
        self.session_repo().delete_for_user(user_id).await
    }

    pub async fn delete_expired_sessions(&self, now: DateTime<Utc>) -> StoreResult<u64> {
        self.session_repo().delete_expired(now).await
    }

    pub async fn touch_session(&self, token_hash: &str, at: DateTime<Utc>) -> StoreResult<()> {
        self.session_repo().touch(token_hash, at).await
    }

    pub async fn create_session_schema(&self) -> StoreResult<()> {
        self.session_repo().create_schema().await
    }

    // Login history

    pub async fn add_login_history(
        &self,
        user_id: Option<i32>,
        username: &str,
        ip_address: Option<&str>,
        user_agent: Option<&str>,
        success: bool,
    ) -> StoreResult<()> {
        self.login_history_repo()
            .add(user_id, username, ip_address, user_agent, success)
            .await
    }

    pub async fn recent_login_history(
        &self,
        user_id: i32,
        limit: u64,
    ) -> StoreResult<Vec<LoginHistoryEntry>> {
        self.login_history_repo()
            .recent_for_user(user_id, limit)
            .await
    }

    // Routers

    pub async fn upsert_router(
        &self,
        id: &str,
        registration: RouterRegistration,
    ) -> StoreResult<Router> {
        self.router_repo().upsert(id, registration).await
    }

    pub async fn get_router(&self, id: &str) -> StoreResult<Option<Router>> {
        self.router_repo().get(id).await
    }

    pub async fn list_routers(&self) -> StoreResult<Vec<Router>> {
        self.router_repo().list().await
    }

    // Assignments

    pub async fn upsert_assignment(
        &self,
        user_id: i32,
        router_id: &str,
        assigned_by: Option<i32>,
        notes: Option<String>,
    ) -> StoreResult<Assignment> {
        self.assignment_repo()
            .upsert(user_id, router_id, assigned_by, notes)
            .await
    }

    pub async fn delete_assignment(&self, user_id: i32, router_id: &str) -> StoreResult<u64> {
        self.assignment_repo().delete(user_id, router_id).await
    }

    pub async fn list_assignments_for_user(&self, user_id: i32) -> StoreResult<Vec<AssignedRouter>> {
        self.assignment_repo().list_for_user(user_id).await
    }

    pub async fn has_active_assignment(&self, user_id: i32, router_id: &str) -> StoreResult<bool> {
        self.assignment_repo()
            .exists_for_active_user(user_id, router_id)
            .await
    }
}
