pub mod access_gate;
pub mod assignment_registry;
pub mod assignment_registry_impl;
pub mod audit;
pub mod credential_store;
pub mod credential_store_impl;
pub mod error;
pub mod password;
pub mod session_manager;
pub mod sweeper;
pub mod token;

pub use access_gate::AccessGate;
pub use assignment_registry::RouterAssignmentRegistry;
pub use assignment_registry_impl::SeaOrmAssignmentRegistry;
pub use audit::{AuditLog, LoginAttempt};
pub use credential_store::{CredentialStore, NewUser};
pub use credential_store_impl::SeaOrmCredentialStore;
pub use error::AuthError;
pub use password::PasswordPolicy;
pub use session_manager::{IssuedSession, SessionManager, VerifiedSession};
pub use sweeper::{SessionSweeper, SweeperHandle};
