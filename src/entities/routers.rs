use sea_orm::entity::prelude::*;

/// Display projection of a fleet router. Rows are owned by the telemetry
/// layer; this crate reads them and offers a register/upsert path.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "routers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub name: String,

    pub location: Option<String>,

    pub serial_number: Option<String>,

    pub created_at: DateTimeUtc,

    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::user_router_assignments::Entity")]
    UserRouterAssignments,
}

impl Related<super::user_router_assignments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserRouterAssignments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
