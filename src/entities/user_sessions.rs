use sea_orm::entity::prelude::*;

use super::users::Role;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "user_sessions")]
pub struct Model {
    /// Hex SHA-256 of the bearer token; the raw token is never stored
    #[sea_orm(primary_key, auto_increment = false)]
    pub session_token_hash: String,

    pub user_id: i32,

    /// Snapshot taken at issuance
    pub username: String,

    /// Snapshot taken at issuance
    pub role: Role,

    pub created_at: DateTimeUtc,

    pub last_seen_at: DateTimeUtc,

    pub expires_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Users,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
