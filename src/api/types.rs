use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::db::{AssignedRouter, Assignment, LoginHistoryEntry, Router, User};
use crate::domain::{Principal, Role};

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub id: i32,
    pub username: String,
    pub role: Role,
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub is_active: bool,
    pub created_by: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            role: user.role,
            email: user.email,
            full_name: user.full_name,
            is_active: user.is_active,
            created_by: user.created_by,
            created_at: user.created_at,
            last_login: user.last_login,
        }
    }
}

/// The `user` object embedded in a login response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUserDto {
    pub id: i32,
    pub username: String,
    pub role: Role,
    pub email: Option<String>,
    pub full_name: Option<String>,
}

impl From<User> for SessionUserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            role: user.role,
            email: user.email,
            full_name: user.full_name,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PrincipalDto {
    pub id: i32,
    pub username: String,
    pub role: Role,
}

impl From<Principal> for PrincipalDto {
    fn from(principal: Principal) -> Self {
        Self {
            id: principal.id,
            username: principal.username,
            role: principal.role,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouterDto {
    pub id: String,
    pub name: String,
    pub location: Option<String>,
    pub serial_number: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Router> for RouterDto {
    fn from(router: Router) -> Self {
        Self {
            id: router.id,
            name: router.name,
            location: router.location,
            serial_number: router.serial_number,
            created_at: router.created_at,
            updated_at: router.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentDto {
    pub user_id: i32,
    pub router_id: String,
    pub assigned_by: Option<i32>,
    pub assigned_at: DateTime<Utc>,
    pub notes: Option<String>,
}

impl From<Assignment> for AssignmentDto {
    fn from(assignment: Assignment) -> Self {
        Self {
            user_id: assignment.user_id,
            router_id: assignment.router_id,
            assigned_by: assignment.assigned_by,
            assigned_at: assignment.assigned_at,
            notes: assignment.notes,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignedRouterDto {
    pub router_id: String,
    pub router_name: Option<String>,
    pub location: Option<String>,
    pub serial_number: Option<String>,
    pub assigned_by: Option<i32>,
    pub assigned_at: DateTime<Utc>,
    pub notes: Option<String>,
}

impl From<AssignedRouter> for AssignedRouterDto {
    fn from(row: AssignedRouter) -> Self {
        Self {
            router_id: row.router_id,
            router_name: row.router_name,
            location: row.location,
            serial_number: row.serial_number,
            assigned_by: row.assigned_by,
            assigned_at: row.assigned_at,
            notes: row.notes,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginHistoryDto {
    pub id: i64,
    pub username: String,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub success: bool,
    pub login_at: DateTime<Utc>,
}

impl From<LoginHistoryEntry> for LoginHistoryDto {
    fn from(entry: LoginHistoryEntry) -> Self {
        Self {
            id: entry.id,
            username: entry.username,
            ip_address: entry.ip_address,
            user_agent: entry.user_agent,
            success: entry.success,
            login_at: entry.login_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct IncludeInactiveQuery {
    #[serde(default)]
    pub include_inactive: bool,
}

#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<u64>,
}
