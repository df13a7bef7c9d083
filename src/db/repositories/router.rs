use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{DatabaseConnection, EntityTrait, QueryOrder, Set};

use crate::db::error::StoreResult;
use crate::entities::routers;

pub use crate::entities::routers::Model as Router;

/// Fields supplied when a router is registered or renamed.
#[derive(Debug, Clone, Default)]
pub struct RouterRegistration {
    pub name: String,
    pub location: Option<String>,
    pub serial_number: Option<String>,
}

pub struct RouterRepository {
    conn: DatabaseConnection,
}

impl RouterRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn upsert(&self, id: &str, registration: RouterRegistration) -> StoreResult<Router> {
        let now = Utc::now();
        let active = routers::ActiveModel {
            id: Set(id.to_string()),
            name: Set(registration.name),
            location: Set(registration.location),
            serial_number: Set(registration.serial_number),
            created_at: Set(now),
            updated_at: Set(now),
        };

        routers::Entity::insert(active)
            .on_conflict(
                OnConflict::column(routers::Column::Id)
                    .update_columns([
                        routers::Column::Name,
                        routers::Column::Location,
                        routers::Column::SerialNumber,
                        routers::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(&self.conn)
            .await?;

        let router = routers::Entity::find_by_id(id.to_string())
            .one(&self.conn)
            .await?
            .ok_or_else(|| {
                sea_orm::DbErr::RecordNotFound(format!("router {id} vanished after upsert"))
            })?;

        Ok(router)
    }

    pub async fn get(&self, id: &str) -> StoreResult<Option<Router>> {
        Ok(routers::Entity::find_by_id(id.to_string())
            .one(&self.conn)
            .await?)
    }

    pub async fn list(&self) -> StoreResult<Vec<Router>> {
        Ok(routers::Entity::find()
            .order_by_asc(routers::Column::Id)
            .all(&self.conn)
            .await?)
    }
}
