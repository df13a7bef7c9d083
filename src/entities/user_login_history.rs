use sea_orm::entity::prelude::*;

/// Append-only record of a login attempt.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "user_login_history")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    /// Null when the submitted username matched no account
    pub user_id: Option<i32>,

    /// Username as submitted, even if no account matched
    pub username: String,

    pub ip_address: Option<String>,

    pub user_agent: Option<String>,

    pub success: bool,

    pub login_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "Cascade",
        on_delete = "SetNull"
    )]
    Users,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
