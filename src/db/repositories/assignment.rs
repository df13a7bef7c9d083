use chrono::{DateTime, Utc};
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, RelationTrait, Set,
};
use sea_orm::JoinType;

use crate::db::error::StoreResult;
use crate::entities::{routers, user_router_assignments, users};

pub use crate::entities::user_router_assignments::Model as Assignment;

/// Assignment joined with the router's display fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignedRouter {
    pub router_id: String,
    pub router_name: Option<String>,
    pub location: Option<String>,
    pub serial_number: Option<String>,
    pub assigned_by: Option<i32>,
    pub assigned_at: DateTime<Utc>,
    pub notes: Option<String>,
}

pub struct AssignmentRepository {
    conn: DatabaseConnection,
}

impl AssignmentRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Insert or overwrite the (user, router) row; the latest call wins.
    pub async fn upsert(
        &self,
        user_id: i32,
        router_id: &str,
        assigned_by: Option<i32>,
        notes: Option<String>,
    ) -> StoreResult<Assignment> {
        let active = user_router_assignments::ActiveModel {
            user_id: Set(user_id),
            router_id: Set(router_id.to_string()),
            assigned_by: Set(assigned_by),
            assigned_at: Set(Utc::now()),
            notes: Set(notes),
        };

        user_router_assignments::Entity::insert(active)
            .on_conflict(
                OnConflict::columns([
                    user_router_assignments::Column::UserId,
                    user_router_assignments::Column::RouterId,
                ])
                .update_columns([
                    user_router_assignments::Column::AssignedBy,
                    user_router_assignments::Column::AssignedAt,
                    user_router_assignments::Column::Notes,
                ])
                .to_owned(),
            )
            .exec_without_returning(&self.conn)
            .await?;

        let row = user_router_assignments::Entity::find_by_id((user_id, router_id.to_string()))
            .one(&self.conn)
            .await?
            .ok_or_else(|| {
                sea_orm::DbErr::RecordNotFound(format!(
                    "assignment {user_id}/{router_id} vanished after upsert"
                ))
            })?;

        Ok(row)
    }

    pub async fn delete(&self, user_id: i32, router_id: &str) -> StoreResult<u64> {
        let result =
            user_router_assignments::Entity::delete_by_id((user_id, router_id.to_string()))
                .exec(&self.conn)
                .await?;

        Ok(result.rows_affected)
    }

    pub async fn list_for_user(&self, user_id: i32) -> StoreResult<Vec<AssignedRouter>> {
        let rows = user_router_assignments::Entity::find()
            .filter(user_router_assignments::Column::UserId.eq(user_id))
            .find_also_related(routers::Entity)
            .order_by_desc(user_router_assignments::Column::AssignedAt)
            .order_by_asc(user_router_assignments::Column::RouterId)
            .all(&self.conn)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(assignment, router)| AssignedRouter {
                router_id: assignment.router_id,
                router_name: router.as_ref().map(|r| r.name.clone()),
                location: router.as_ref().and_then(|r| r.location.clone()),
                serial_number: router.and_then(|r| r.serial_number),
                assigned_by: assignment.assigned_by,
                assigned_at: assignment.assigned_at,
                notes: assignment.notes,
            })
            .collect())
    }

    /// True only when the row exists and its user is active.
    pub async fn exists_for_active_user(&self, user_id: i32, router_id: &str) -> StoreResult<bool> {
        let count = user_router_assignments::Entity::find()
            .join(
                JoinType::InnerJoin,
                user_router_assignments::Relation::Users.def(),
            )
            .filter(user_router_assignments::Column::UserId.eq(user_id))
            .filter(user_router_assignments::Column::RouterId.eq(router_id))
            .filter(users::Column::IsActive.eq(true))
            .count(&self.conn)
            .await?;

        Ok(count > 0)
    }
}
