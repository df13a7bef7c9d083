//! Domain service for user-to-router assignments and the router catalog
//! they point at.

use crate::db::{AssignedRouter, Assignment, Router, RouterRegistration};
use crate::services::error::AuthError;

/// Domain service trait for router assignments.
#[async_trait::async_trait]
pub trait RouterAssignmentRegistry: Send + Sync {
    /// Grants `user_id` access to `router_id`. Repeating the call overwrites
    /// `assigned_by`, `assigned_at` and `notes`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::NotFound`] if the user or the router is unknown.
    async fn assign(
        &self,
        user_id: i32,
        router_id: &str,
        assigned_by: Option<i32>,
        notes: Option<String>,
    ) -> Result<Assignment, AuthError>;

    /// Removes the grant. Absent rows are not an error.
    async fn unassign(&self, user_id: i32, router_id: &str) -> Result<(), AuthError>;

    /// Assignments joined with router display fields, most recent first.
    async fn list_for_user(&self, user_id: i32) -> Result<Vec<AssignedRouter>, AuthError>;

    /// False for unknown or inactive users, never an error for them.
    async fn has_access(&self, user_id: i32, router_id: &str) -> Result<bool, AuthError>;

    /// Creates or updates a router record.
    async fn register_router(
        &self,
        router_id: &str,
        registration: RouterRegistration,
    ) -> Result<Router, AuthError>;

    async fn get_router(&self, router_id: &str) -> Result<Option<Router>, AuthError>;

    async fn list_routers(&self) -> Result<Vec<Router>, AuthError>;
}
