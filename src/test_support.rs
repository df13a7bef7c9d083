//! Fixtures shared by unit tests.

use crate::db::{NewUserRow, RouterRegistration, Store};
use crate::domain::Role;
use crate::services::{AuditLog, NewUser, PasswordPolicy, SeaOrmCredentialStore};

/// A parseable argon2id hash; no test logs in with it.
const PLACEHOLDER_HASH: &str =
    "$argon2id$v=19$m=1024,t=1,p=1$c29tZXNhbHRzb21lc2FsdA$0Q0vqk9nQvyt+6v2aG4U3a1Qz3m6b4l0wZb3Qe2uV1E";

pub async fn memory_store() -> Store {
    Store::new("sqlite::memory:")
        .await
        .expect("in-memory store should open")
}

/// Cheap argon2 parameters so hashing does not dominate test time.
pub const fn fast_policy() -> PasswordPolicy {
    PasswordPolicy {
        memory_cost_kib: 1024,
        time_cost: 1,
        parallelism: 1,
    }
}

fn row(username: &str, role: Role) -> NewUserRow {
    NewUserRow {
        username: username.to_string(),
        password_hash: PLACEHOLDER_HASH.to_string(),
        role,
        email: None,
        full_name: None,
        created_by: None,
    }
}

pub fn guest_row(username: &str) -> NewUserRow {
    row(username, Role::Guest)
}

pub fn admin_row(username: &str) -> NewUserRow {
    row(username, Role::Admin)
}

pub fn new_user(username: &str, password: &str, role: &str) -> NewUser {
    NewUser {
        username: username.to_string(),
        password: password.to_string(),
        role: role.to_string(),
        email: None,
        full_name: None,
    }
}

pub fn credential_store(store: &Store) -> SeaOrmCredentialStore {
    SeaOrmCredentialStore::new(store.clone(), AuditLog::new(store.clone()), fast_policy())
}

pub async fn register_router(store: &Store, router_id: &str) {
    store
        .upsert_router(
            router_id,
            RouterRegistration {
                name: format!("Router {router_id}"),
                location: None,
                serial_number: None,
            },
        )
        .await
        .expect("router should register");
}
