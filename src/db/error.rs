//! Storage-boundary error type.
//!
//! Vendor error codes are inspected here and nowhere else: callers match on
//! [`StoreError::SchemaMissing`] instead of backend-specific strings.

use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The statement referenced a table that does not exist yet.
    #[error("Schema missing: {0}")]
    SchemaMissing(String),

    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("Foreign key constraint violated: {0}")]
    ForeignKeyViolation(String),

    #[error("Database error: {0}")]
    Backend(DbErr),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl From<DbErr> for StoreError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(msg)) => return Self::UniqueViolation(msg),
            Some(SqlErr::ForeignKeyConstraintViolation(msg)) => {
                return Self::ForeignKeyViolation(msg);
            }
            _ => {}
        }

        let message = err.to_string();
        if is_missing_relation(&message) {
            Self::SchemaMissing(message)
        } else {
            Self::Backend(err)
        }
    }
}

/// SQLite reports `no such table`, Postgres reports SQLSTATE 42P01
/// (`relation "x" does not exist`).
fn is_missing_relation(message: &str) -> bool {
    message.contains("no such table")
        || message.contains("42P01")
        || (message.contains("relation \"") && message.contains("does not exist"))
}
