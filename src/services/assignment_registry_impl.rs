//! `SeaORM` implementation of the `RouterAssignmentRegistry` trait.

use async_trait::async_trait;
use tracing::info;

use crate::db::{AssignedRouter, Assignment, Router, RouterRegistration, Store, StoreError};
use crate::services::assignment_registry::RouterAssignmentRegistry;
use crate::services::error::AuthError;

pub struct SeaOrmAssignmentRegistry {
    store: Store,
}

impl SeaOrmAssignmentRegistry {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }
}

fn validate_router_id(router_id: &str) -> Result<(), AuthError> {
    if router_id.trim().is_empty() {
        return Err(AuthError::validation("Router ID is required"));
    }
    Ok(())
}

#[async_trait]
impl RouterAssignmentRegistry for SeaOrmAssignmentRegistry {
    async fn assign(
        &self,
        user_id: i32,
        router_id: &str,
        assigned_by: Option<i32>,
        notes: Option<String>,
    ) -> Result<Assignment, AuthError> {
        validate_router_id(router_id)?;

        if self.store.get_user_by_id(user_id).await?.is_none() {
            return Err(AuthError::not_found("User", user_id));
        }
        if self.store.get_router(router_id).await?.is_none() {
            return Err(AuthError::not_found("Router", router_id));
        }

        // A concurrent delete can still slip between the checks and the write.
        let assignment = self
            .store
            .upsert_assignment(user_id, router_id, assigned_by, notes)
            .await
            .map_err(|e| match e {
                StoreError::ForeignKeyViolation(_) => {
                    AuthError::NotFound(format!("User {user_id} or router {router_id} not found"))
                }
                other => other.into(),
            })?;

        info!(
            user_id,
            router_id,
            assigned_by = ?assigned_by,
            "Router assigned"
        );

        Ok(assignment)
    }

    async fn unassign(&self, user_id: i32, router_id: &str) -> Result<(), AuthError> {
        let removed = self.store.delete_assignment(user_id, router_id).await?;
        if removed > 0 {
            info!(user_id, router_id, "Router unassigned");
        }
        Ok(())
    }

    async fn list_for_user(&self, user_id: i32) -> Result<Vec<AssignedRouter>, AuthError> {
        Ok(self.store.list_assignments_for_user(user_id).await?)
    }

    async fn has_access(&self, user_id: i32, router_id: &str) -> Result<bool, AuthError> {
        Ok(self.store.has_active_assignment(user_id, router_id).await?)
    }

    async fn register_router(
        &self,
        router_id: &str,
        registration: RouterRegistration,
    ) -> Result<Router, AuthError> {
        validate_router_id(router_id)?;
        if registration.name.trim().is_empty() {
            return Err(AuthError::validation("Router name is required"));
        }

        let router = self.store.upsert_router(router_id, registration).await?;
        info!(router_id, name = %router.name, "Router registered");
        Ok(router)
    }

    async fn get_router(&self, router_id: &str) -> Result<Option<Router>, AuthError> {
        Ok(self.store.get_router(router_id).await?)
    }

    async fn list_routers(&self) -> Result<Vec<Router>, AuthError> {
        Ok(self.store.list_routers().await?)
    }
}
