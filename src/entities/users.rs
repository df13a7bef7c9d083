use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Coarse permission class of an account.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[sea_orm(string_value = "admin")]
    Admin,

    #[sea_orm(string_value = "guest")]
    Guest,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Guest => "guest",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "guest" => Ok(Self::Guest),
            other => Err(format!("Unknown role '{other}', expected 'admin' or 'guest'")),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Case-sensitive login name
    #[sea_orm(unique)]
    pub username: String,

    /// Argon2id password hash, never leaves the credential store
    pub password_hash: String,

    pub role: Role,

    pub email: Option<String>,

    pub full_name: Option<String>,

    pub is_active: bool,

    /// Admin who created the account, `None` for bootstrap accounts
    pub created_by: Option<i32>,

    pub created_at: DateTimeUtc,

    pub last_login: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::user_sessions::Entity")]
    UserSessions,
    #[sea_orm(has_many = "super::user_router_assignments::Entity")]
    UserRouterAssignments,
}

impl Related<super::user_sessions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserSessions.def()
    }
}

impl Related<super::user_router_assignments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserRouterAssignments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
