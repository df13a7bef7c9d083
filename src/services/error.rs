//! Error taxonomy shared by the authentication services.

use thiserror::Error;

use crate::db::StoreError;

#[derive(Debug, Error)]
pub enum AuthError {
    /// Malformed or missing input.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// No, invalid or expired session; failed login.
    #[error("Authentication required: {0}")]
    Authentication(String),

    /// Valid session, insufficient role or missing assignment.
    #[error("Forbidden: {0}")]
    Authorization(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Storage unavailable or schema missing after repair.
    #[error("Infrastructure error: {0}")]
    Infrastructure(String),
}

impl AuthError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn unauthenticated(msg: impl Into<String>) -> Self {
        Self::Authentication(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Authorization(msg.into())
    }

    pub fn not_found(resource: &str, id: impl std::fmt::Display) -> Self {
        Self::NotFound(format!("{resource} {id} not found"))
    }
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        Self::Infrastructure(err.to_string())
    }
}

impl From<tokio::task::JoinError> for AuthError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Infrastructure(format!("Background task failed: {err}"))
    }
}
