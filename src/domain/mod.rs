//! Identity values passed between the access gate and route handlers.

use serde::Serialize;

pub use crate::entities::users::Role;

/// The authenticated caller, produced by the access gate and handed to
/// handlers by value. Never mutated after construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    pub id: i32,
    pub username: String,
    pub role: Role,
}

impl Principal {
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self.role, Role::Admin)
    }

    /// The backing account id, or `None` for the bypass principal.
    #[must_use]
    pub const fn account_id(&self) -> Option<i32> {
        if self.id > 0 { Some(self.id) } else { None }
    }
}

/// Request metadata recorded alongside login attempts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientInfo {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

impl ClientInfo {
    #[must_use]
    pub fn new(ip_address: Option<&str>, user_agent: Option<&str>) -> Self {
        Self {
            ip_address: ip_address.map(str::to_string),
            user_agent: user_agent.map(str::to_string),
        }
    }
}
