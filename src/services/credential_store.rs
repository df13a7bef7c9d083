//! Domain service owning user identity and password material.
//!
//! No other module reads or writes password hashes.

use crate::db::User;
use crate::domain::ClientInfo;
use crate::services::error::AuthError;

/// Input for [`CredentialStore::create_user`]. `role` is the raw role name
/// so that unknown roles surface as [`AuthError::Validation`].
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub role: String,
    pub email: Option<String>,
    pub full_name: Option<String>,
}

/// Domain service trait for credentials.
#[async_trait::async_trait]
pub trait CredentialStore: Send + Sync {
    /// Creates an account with an argon2 hash of `password`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Conflict`] if the username exists and
    /// [`AuthError::Validation`] for an unknown role or empty fields.
    async fn create_user(&self, new_user: NewUser, created_by: Option<i32>)
    -> Result<User, AuthError>;

    /// Checks a username/password pair and records the attempt.
    ///
    /// Unknown user, inactive account and wrong password all yield `Ok(None)`.
    /// Only storage failures are errors.
    async fn authenticate_user(
        &self,
        username: &str,
        password: &str,
        client: &ClientInfo,
    ) -> Result<Option<User>, AuthError>;

    /// Re-hashes and overwrites the password. Callers gate who may do this.
    async fn change_password(&self, user_id: i32, new_password: &str) -> Result<(), AuthError>;

    /// Checks `password` against the stored hash of an account.
    async fn verify_password(&self, user_id: i32, password: &str) -> Result<bool, AuthError>;

    /// Sets `is_active = false`. Existing sessions are left alone.
    async fn deactivate_user(&self, user_id: i32) -> Result<User, AuthError>;

    async fn reactivate_user(&self, user_id: i32) -> Result<User, AuthError>;

    async fn list_users(&self, include_inactive: bool) -> Result<Vec<User>, AuthError>;

    async fn get_user_by_id(&self, user_id: i32) -> Result<Option<User>, AuthError>;

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, AuthError>;
}
