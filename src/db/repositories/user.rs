use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::Serialize;

use crate::db::error::StoreResult;
use crate::entities::users::{self, Role};

/// User data returned from repository (without sensitive password hash)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
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

impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            role: model.role,
            email: model.email,
            full_name: model.full_name,
            is_active: model.is_active,
            created_by: model.created_by,
            created_at: model.created_at,
            last_login: model.last_login,
        }
    }
}

/// Insert payload; `password_hash` must already be hashed.
#[derive(Debug, Clone)]
pub struct NewUserRow {
    pub username: String,
    pub password_hash: String,
    pub role: Role,
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub created_by: Option<i32>,
}

pub struct UserRepository {
    conn: DatabaseConnection,
}

impl UserRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn insert(&self, row: NewUserRow) -> StoreResult<User> {
        let active = users::ActiveModel {
            username: Set(row.username),
            password_hash: Set(row.password_hash),
            role: Set(row.role),
            email: Set(row.email),
            full_name: Set(row.full_name),
            is_active: Set(true),
            created_by: Set(row.created_by),
            created_at: Set(Utc::now()),
            last_login: Set(None),
            ..Default::default()
        };

        let model = active.insert(&self.conn).await?;
        Ok(User::from(model))
    }

    pub async fn get_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let user = users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.conn)
            .await?;

        Ok(user.map(User::from))
    }

    /// Get user by username together with the stored password hash
    pub async fn get_by_username_with_password(
        &self,
        username: &str,
    ) -> StoreResult<Option<(User, String)>> {
        let user = users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.conn)
            .await?;

        Ok(user.map(|u| {
            let password_hash = u.password_hash.clone();
            (User::from(u), password_hash)
        }))
    }

    pub async fn get_password_hash(&self, id: i32) -> StoreResult<Option<String>> {
        let user = users::Entity::find_by_id(id).one(&self.conn).await?;
        Ok(user.map(|u| u.password_hash))
    }

    pub async fn get_by_id(&self, id: i32) -> StoreResult<Option<User>> {
        let user = users::Entity::find_by_id(id).one(&self.conn).await?;
        Ok(user.map(User::from))
    }

    pub async fn list(&self, include_inactive: bool) -> StoreResult<Vec<User>> {
        let mut query = users::Entity::find().order_by_asc(users::Column::Username);

        if !include_inactive {
            query = query.filter(users::Column::IsActive.eq(true));
        }

        let users = query.all(&self.conn).await?;
        Ok(users.into_iter().map(User::from).collect())
    }

    pub async fn count(&self) -> StoreResult<u64> {
        Ok(users::Entity::find().count(&self.conn).await?)
    }

    /// Returns `false` when no row matched.
    pub async fn update_password_hash(&self, id: i32, password_hash: String) -> StoreResult<bool> {
        let Some(user) = users::Entity::find_by_id(id).one(&self.conn).await? else {
            return Ok(false);
        };

        let mut active: users::ActiveModel = user.into();
        active.password_hash = Set(password_hash);
        active.update(&self.conn).await?;

        Ok(true)
    }

    pub async fn set_active(&self, id: i32, is_active: bool) -> StoreResult<Option<User>> {
        let Some(user) = users::Entity::find_by_id(id).one(&self.conn).await? else {
            return Ok(None);
        };

        let mut active: users::ActiveModel = user.into();
        active.is_active = Set(is_active);
        let model = active.update(&self.conn).await?;

        Ok(Some(User::from(model)))
    }

    pub async fn touch_last_login(&self, id: i32, at: DateTime<Utc>) -> StoreResult<()> {
        users::Entity::update_many()
            .col_expr(
                users::Column::LastLogin,
                sea_orm::sea_query::Expr::value(Some(at)),
            )
            .filter(users::Column::Id.eq(id))
            .exec(&self.conn)
            .await?;

        Ok(())
    }
}
