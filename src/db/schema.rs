//! Table and index definitions shared by the migrator and the session
//! store's on-demand schema repair.

use sea_orm::sea_query::{Index, IndexCreateStatement, TableCreateStatement};
use sea_orm::{DatabaseBackend, EntityTrait, Schema};

use crate::entities::{
    prelude::*, user_login_history, user_router_assignments, user_sessions,
};

fn table<E: EntityTrait>(backend: DatabaseBackend, entity: E) -> TableCreateStatement {
    Schema::new(backend)
        .create_table_from_entity(entity)
        .if_not_exists()
        .to_owned()
}

#[must_use]
pub fn users_table(backend: DatabaseBackend) -> TableCreateStatement {
    table(backend, Users)
}

#[must_use]
pub fn routers_table(backend: DatabaseBackend) -> TableCreateStatement {
    table(backend, Routers)
}

#[must_use]
pub fn login_history_table(backend: DatabaseBackend) -> TableCreateStatement {
    table(backend, UserLoginHistory)
}

#[must_use]
pub fn login_history_indexes() -> Vec<IndexCreateStatement> {
    vec![
        Index::create()
            .if_not_exists()
            .name("idx_user_login_history_user_id")
            .table(UserLoginHistory)
            .col(user_login_history::Column::UserId)
            .to_owned(),
        Index::create()
            .if_not_exists()
            .name("idx_user_login_history_login_at")
            .table(UserLoginHistory)
            .col(user_login_history::Column::LoginAt)
            .to_owned(),
    ]
}

#[must_use]
pub fn assignments_table(backend: DatabaseBackend) -> TableCreateStatement {
    table(backend, UserRouterAssignments)
}

#[must_use]
pub fn assignment_indexes() -> Vec<IndexCreateStatement> {
    vec![
        Index::create()
            .if_not_exists()
            .name("idx_user_router_assignments_router_id")
            .table(UserRouterAssignments)
            .col(user_router_assignments::Column::RouterId)
            .to_owned(),
    ]
}

#[must_use]
pub fn sessions_table(backend: DatabaseBackend) -> TableCreateStatement {
    table(backend, UserSessions)
}

#[must_use]
pub fn session_indexes() -> Vec<IndexCreateStatement> {
    vec![
        Index::create()
            .if_not_exists()
            .name("idx_user_sessions_user_id")
            .table(UserSessions)
            .col(user_sessions::Column::UserId)
            .to_owned(),
        Index::create()
            .if_not_exists()
            .name("idx_user_sessions_expires_at")
            .table(UserSessions)
            .col(user_sessions::Column::ExpiresAt)
            .to_owned(),
    ]
}
