use chrono::{DateTime, Utc};
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};

use crate::db::error::StoreResult;
use crate::db::schema;
use crate::entities::user_sessions;

pub struct SessionRepository {
    conn: DatabaseConnection,
}

impl SessionRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Insert a session row, ignoring a primary-key collision. Returns the
    /// number of rows written (0 on collision).
    pub async fn insert_ignore(&self, row: user_sessions::Model) -> StoreResult<u64> {
        let active = user_sessions::ActiveModel {
            session_token_hash: Set(row.session_token_hash),
            user_id: Set(row.user_id),
            username: Set(row.username),
            role: Set(row.role),
            created_at: Set(row.created_at),
            last_seen_at: Set(row.last_seen_at),
            expires_at: Set(row.expires_at),
        };

        let written = user_sessions::Entity::insert(active)
            .on_conflict(
                OnConflict::column(user_sessions::Column::SessionTokenHash)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.conn)
            .await?;

        Ok(written)
    }

    pub async fn find(&self, token_hash: &str) -> StoreResult<Option<user_sessions::Model>> {
        Ok(user_sessions::Entity::find_by_id(token_hash.to_string())
            .one(&self.conn)
            .await?)
    }

    /// Idempotent: deleting an absent row is not an error.
    pub async fn delete(&self, token_hash: &str) -> StoreResult<u64> {
        let result = user_sessions::Entity::delete_by_id(token_hash.to_string())
            .exec(&self.conn)
            .await?;

        Ok(result.rows_affected)
    }

    pub async fn delete_for_user(&self, user_id: i32) -> StoreResult<u64> {
        let result = user_sessions::Entity::delete_many()
            .filter(user_sessions::Column::UserId.eq(user_id))
            .exec(&self.conn)
            .await?;

        Ok(result.rows_affected)
    }

    pub async fn delete_expired(&self, now: DateTime<Utc>) -> StoreResult<u64> {
        let result = user_sessions::Entity::delete_many()
            .filter(user_sessions::Column::ExpiresAt.lt(now))
            .exec(&self.conn)
            .await?;

        Ok(result.rows_affected)
    }

    pub async fn touch(&self, token_hash: &str, at: DateTime<Utc>) -> StoreResult<()> {
        user_sessions::Entity::update_many()
            .col_expr(user_sessions::Column::LastSeenAt, Expr::value(at))
            .filter(user_sessions::Column::SessionTokenHash.eq(token_hash))
            .exec(&self.conn)
            .await?;

        Ok(())
    }

    /// Create the sessions table and its indexes if they are absent.
    pub async fn create_schema(&self) -> StoreResult<()> {
        let backend = self.conn.get_database_backend();

        self.conn
            .execute(backend.build(&schema::sessions_table(backend)))
            .await?;
        for index in schema::session_indexes() {
            self.conn.execute(backend.build(&index)).await?;
        }

        Ok(())
    }
}
