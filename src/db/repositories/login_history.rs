use chrono::Utc;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};

use crate::db::error::StoreResult;
use crate::entities::{prelude::*, user_login_history};

pub use crate::entities::user_login_history::Model as LoginHistoryEntry;

pub struct LoginHistoryRepository {
    conn: DatabaseConnection,
}

impl LoginHistoryRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn add(
        &self,
        user_id: Option<i32>,
        username: &str,
        ip_address: Option<&str>,
        user_agent: Option<&str>,
        success: bool,
    ) -> StoreResult<()> {
        let active_model = user_login_history::ActiveModel {
            user_id: Set(user_id),
            username: Set(username.to_string()),
            ip_address: Set(ip_address.map(str::to_string)),
            user_agent: Set(user_agent.map(str::to_string)),
            success: Set(success),
            login_at: Set(Utc::now()),
            ..Default::default()
        };

        UserLoginHistory::insert(active_model)
            .exec_without_returning(&self.conn)
            .await?;
        Ok(())
    }

    pub async fn recent_for_user(
        &self,
        user_id: i32,
        limit: u64,
    ) -> StoreResult<Vec<LoginHistoryEntry>> {
        let items = UserLoginHistory::find()
            .filter(user_login_history::Column::UserId.eq(user_id))
            .order_by_desc(user_login_history::Column::LoginAt)
            .order_by_desc(user_login_history::Column::Id)
            .limit(limit)
            .all(&self.conn)
            .await?;

        Ok(items)
    }
}
